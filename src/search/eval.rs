use crate::board::bitboard::Squares;
use crate::board::{Color, Piece, Position};

const PAWN: i32 = 100;
const KNIGHT: i32 = 320;
const BISHOP: i32 = 330;
const ROOK: i32 = 500;
const QUEEN: i32 = 900;

/// Static position scoring in centipawns, from the side to move's
/// perspective.
pub trait Evaluator: Send {
    fn evaluate(&mut self, pos: &Position) -> i32;
}

// Tables read like a diagram from white's side: a8 first, h1 last.
#[rustfmt::skip]
const PAWN_SQ: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
    50, 50, 50, 50, 50, 50, 50, 50,
    10, 10, 20, 30, 30, 20, 10, 10,
     5,  5, 10, 25, 25, 10,  5,  5,
     0,  0,  0, 20, 20,  0,  0,  0,
     5, -5,-10,  0,  0,-10, -5,  5,
     5, 10, 10,-20,-20, 10, 10,  5,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const KNIGHT_SQ: [i32; 64] = [
    -50,-40,-30,-30,-30,-30,-40,-50,
    -40,-20,  0,  0,  0,  0,-20,-40,
    -30,  0, 10, 15, 15, 10,  0,-30,
    -30,  5, 15, 20, 20, 15,  5,-30,
    -30,  0, 15, 20, 20, 15,  0,-30,
    -30,  5, 10, 15, 15, 10,  5,-30,
    -40,-20,  0,  5,  5,  0,-20,-40,
    -50,-40,-30,-30,-30,-30,-40,-50,
];

#[rustfmt::skip]
const BISHOP_SQ: [i32; 64] = [
    -20,-10,-10,-10,-10,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5, 10, 10,  5,  0,-10,
    -10,  5,  5, 10, 10,  5,  5,-10,
    -10,  0, 10, 10, 10, 10,  0,-10,
    -10, 10, 10, 10, 10, 10, 10,-10,
    -10,  5,  0,  0,  0,  0,  5,-10,
    -20,-10,-10,-10,-10,-10,-10,-20,
];

#[rustfmt::skip]
const ROOK_SQ: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
     5, 10, 10, 10, 10, 10, 10,  5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
     0,  0,  0,  5,  5,  0,  0,  0,
];

#[rustfmt::skip]
const QUEEN_SQ: [i32; 64] = [
    -20,-10,-10, -5, -5,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5,  5,  5,  5,  0,-10,
     -5,  0,  5,  5,  5,  5,  0, -5,
      0,  0,  5,  5,  5,  5,  0, -5,
    -10,  5,  5,  5,  5,  5,  0,-10,
    -10,  0,  5,  0,  0,  0,  0,-10,
    -20,-10,-10, -5, -5,-10,-10,-20,
];

#[rustfmt::skip]
const KING_MIDDLE_SQ: [i32; 64] = [
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -20,-30,-30,-40,-40,-30,-30,-20,
    -10,-20,-20,-20,-20,-20,-20,-10,
     20, 20,  0,  0,  0,  0, 20, 20,
     20, 30, 10,  0,  0, 10, 30, 20,
];

#[rustfmt::skip]
const KING_END_SQ: [i32; 64] = [
    -50,-40,-30,-20,-20,-30,-40,-50,
    -30,-20,-10,  0,  0,-10,-20,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-30,  0,  0,  0,  0,-30,-30,
    -50,-30,-30,-30,-30,-30,-30,-50,
];

// Table index for a square as seen by `color`.
#[inline]
fn table_index(color: Color, sq: u8) -> usize {
    match color {
        Color::White => 63 - sq as usize,
        Color::Black => (sq ^ 7) as usize,
    }
}

/// Material plus piece-square tables, with the king table switching to its
/// endgame form once queens are gone or left without support.
#[derive(Clone, Copy, Debug, Default)]
pub struct PieceSquareEvaluator;

impl PieceSquareEvaluator {
    /// Score with positive values favouring white.
    pub fn white_score(&self, pos: &Position) -> i32 {
        let mut pieces = [0i32; 2];
        let mut pawns = [0i32; 2];
        let mut pcsq = [0i32; 2];
        let mut king_middle = [0i32; 2];
        let mut king_end = [0i32; 2];
        let mut has_queen = [false; 2];

        for color in [Color::White, Color::Black] {
            let c = color.index();
            for sq in Squares(pos.color_bb(color)) {
                let i = table_index(color, sq);
                match pos.piece_kind_at(sq) {
                    Some(Piece::Pawn) => {
                        pawns[c] += PAWN;
                        pcsq[c] += PAWN_SQ[i];
                    }
                    Some(Piece::Knight) => {
                        pieces[c] += KNIGHT;
                        pcsq[c] += KNIGHT_SQ[i];
                    }
                    Some(Piece::Bishop) => {
                        pieces[c] += BISHOP;
                        pcsq[c] += BISHOP_SQ[i];
                    }
                    Some(Piece::Rook) => {
                        pieces[c] += ROOK;
                        pcsq[c] += ROOK_SQ[i];
                    }
                    Some(Piece::Queen) => {
                        pieces[c] += QUEEN;
                        pcsq[c] += QUEEN_SQ[i];
                        has_queen[c] = true;
                    }
                    Some(Piece::King) => {
                        king_middle[c] += KING_MIDDLE_SQ[i];
                        king_end[c] += KING_END_SQ[i];
                    }
                    None => {}
                }
            }
        }

        let mut score = pawns[0] - pawns[1] + pieces[0] - pieces[1] + pcsq[0] - pcsq[1];
        let endgame = (0..2).all(|c| !has_queen[c] || pieces[c] <= QUEEN + BISHOP);
        score += if endgame { king_end[0] - king_end[1] } else { king_middle[0] - king_middle[1] };
        score
    }
}

impl Evaluator for PieceSquareEvaluator {
    fn evaluate(&mut self, pos: &Position) -> i32 {
        let s = self.white_score(pos);
        if pos.is_white_to_move() { s } else { -s }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_position_is_balanced() {
        let p = Position::startpos();
        assert_eq!(PieceSquareEvaluator.evaluate(&p), 0);
    }

    #[test]
    fn mirrored_positions_score_opposite() {
        let w = Position::from_fen("4k3/8/8/8/3N4/8/8/4K3 w - - 0 1").unwrap();
        let b = Position::from_fen("4k3/8/8/3n4/8/8/8/4K3 b - - 0 1").unwrap();
        let mut e = PieceSquareEvaluator;
        assert_eq!(e.evaluate(&w), e.evaluate(&b));
        assert!(e.evaluate(&w) > 300);
    }
}
