//! Static exchange evaluation.

use super::bitboard::{bit, Bitboard};
use super::mv::Move;
use super::position::Position;
use super::Piece;

/// Exchange values indexed by piece discriminant; the king is effectively
/// never captured.
pub const SEE_PIECE_VALUES: [i32; 7] = [0, 100, 325, 330, 500, 900, 9999];

impl Position {
    /// Material outcome of `m` and the best-play recaptures on its target
    /// square, from the mover's point of view.
    pub fn see(&self, m: Move) -> i32 {
        if m.is_none() || m.is_null() { return 0; }
        let target = if m.is_en_passant() { Some(Piece::Pawn) } else { self.piece_kind_at(m.to()) };
        self.see_squares(m.from(), m.to(), m.piece(), target)
    }

    pub fn see_squares(&self, from: u8, to: u8, moved: Piece, target: Option<Piece>) -> i32 {
        let t = self.tables();
        let may_xray: Bitboard = self.pawns | self.bishops | self.rooks | self.queens;
        let mut all = self.all();
        let mut attacks = t.attackers_to(self, to, all);
        let mut from_bb = bit(from);
        let mut piece = moved;
        let mut gain = [0i32; 34];
        let mut d = 0usize;
        gain[0] = target.map_or(0, |p| SEE_PIECE_VALUES[p.index()]);

        loop {
            let side = if d & 1 == 0 { self.others() } else { self.mines() };
            d += 1;
            gain[d] = SEE_PIECE_VALUES[piece.index()] - gain[d - 1];
            attacks &= !from_bb;
            all &= !from_bb;
            if from_bb & may_xray != 0 { attacks |= t.xray_attackers(self, to, all); }

            let mut next = 0;
            for p in Piece::ALL {
                let candidates = attacks & self.piece_bb(p) & side;
                if candidates != 0 {
                    piece = p;
                    next = candidates & candidates.wrapping_neg();
                    break;
                }
            }
            if next == 0 || d + 1 >= gain.len() { break; }
            from_bb = next;
        }

        while d > 1 {
            d -= 1;
            gain[d - 1] = -(-gain[d - 1]).max(gain[d]);
        }
        gain[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefended_pawn_is_won_outright() {
        // White rook takes an undefended pawn on a7
        let mut p = Position::from_fen("4k3/p7/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let m = p.parse_move("Rxa7");
        assert_eq!(p.see(m), 100);
    }
}
