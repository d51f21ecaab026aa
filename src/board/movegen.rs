//! Pseudo-legal move generation, check detection and the legal-move cache.
//!
//! Generated moves carry their gives-check flag. Legality (own king left
//! in check, castling through attacked squares) is settled by
//! [`Position::apply_move`].

use super::bitboard::{bit, lsb, Bitboard, Squares, RANK_1, RANK_2, RANK_7, RANK_8};
use super::mv::{Move, MoveKind};
use super::position::{castle_for, Position, FLAGS_EN_PASSANT};
use super::{Color, Piece};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenKind {
    /// Captures, every capture-promotion and pushes promoting to a queen.
    Tactical,
    /// Everything else: quiet moves, castling and push underpromotions.
    Quiet,
    All,
}

const UNDER_PROMOTIONS: [MoveKind; 3] = [MoveKind::PromoteKnight, MoveKind::PromoteRook, MoveKind::PromoteBishop];
const ALL_PROMOTIONS: [MoveKind; 4] =
    [MoveKind::PromoteQueen, MoveKind::PromoteKnight, MoveKind::PromoteRook, MoveKind::PromoteBishop];

impl Position {
    pub fn generate(&self, kind: GenKind, out: &mut Vec<Move>) {
        self.generate_with(kind, !0, &mut |m| out.push(m));
    }

    /// Feeds every pseudo-legal move of pieces on `from_mask` to `f`.
    pub fn generate_with<F: FnMut(Move)>(&self, kind: GenKind, from_mask: Bitboard, f: &mut F) {
        let us = self.side_to_move();
        let mines = self.mines();
        let others = self.others();
        let all = self.all();
        let tactical = kind != GenKind::Quiet;
        let quiet = kind != GenKind::Tactical;
        let t = self.tables();
        let mut emit = |from: u8, to: u8, piece: Piece, capture: bool, mk: MoveKind| {
            let m = Move::new(from, to, piece, capture, mk);
            f(m.with_check(self.gives_check(m)));
        };

        let ep = self.flags & FLAGS_EN_PASSANT;
        let (last_rank, start_rank) = if us == Color::White { (RANK_8, RANK_2) } else { (RANK_1, RANK_7) };
        for from in Squares(self.pawns & mines & from_mask) {
            let captures = if tactical { t.pawn(us, from) & (others | ep) } else { 0 };
            for to in Squares(captures) {
                if bit(to) & last_rank != 0 {
                    for mk in ALL_PROMOTIONS { emit(from, to, Piece::Pawn, true, mk); }
                } else if bit(to) & ep != 0 {
                    emit(from, to, Piece::Pawn, true, MoveKind::EnPassant);
                } else {
                    emit(from, to, Piece::Pawn, true, MoveKind::Normal);
                }
            }
            let push = if us == Color::White { from + 8 } else { from - 8 };
            if bit(push) & all != 0 { continue; }
            if bit(push) & last_rank != 0 {
                if tactical { emit(from, push, Piece::Pawn, false, MoveKind::PromoteQueen); }
                if quiet {
                    for mk in UNDER_PROMOTIONS { emit(from, push, Piece::Pawn, false, mk); }
                }
            } else if quiet {
                emit(from, push, Piece::Pawn, false, MoveKind::Normal);
                if bit(from) & start_rank != 0 {
                    let double = if us == Color::White { from + 16 } else { from - 16 };
                    if bit(double) & all == 0 { emit(from, double, Piece::Pawn, false, MoveKind::Normal); }
                }
            }
        }

        let targets = match kind {
            GenKind::Tactical => others,
            GenKind::Quiet => !all,
            GenKind::All => !mines,
        };
        let pieces = [
            (Piece::Knight, self.knights),
            (Piece::Bishop, self.bishops),
            (Piece::Rook, self.rooks),
            (Piece::Queen, self.queens),
            (Piece::King, self.kings),
        ];
        for (piece, bb) in pieces {
            for from in Squares(bb & mines & from_mask) {
                let attacks = match piece {
                    Piece::Knight => t.knight(from),
                    Piece::Bishop => t.bishop(from, all),
                    Piece::Rook => t.rook(from, all),
                    Piece::Queen => t.queen(from, all),
                    _ => t.king(from),
                };
                for to in Squares(attacks & targets) { emit(from, to, piece, bit(to) & others != 0, MoveKind::Normal); }
            }
        }

        if quiet {
            for mk in [MoveKind::CastleKing, MoveKind::CastleQueen] {
                let c = castle_for(us, mk);
                if self.flags & c.right != 0
                    && all & c.empty == 0
                    && self.kings & mines & from_mask & bit(c.king_from) != 0
                    && self.rooks & mines & bit(c.rook_from) != 0
                {
                    emit(c.king_from, c.king_to, Piece::King, false, mk);
                }
            }
        }
    }

    /// Whether `m` attacks the enemy king once played, directly or by
    /// uncovering a slider.
    pub fn gives_check(&self, m: Move) -> bool {
        if m.is_none() || m.is_null() { return false; }
        let us = self.side_to_move();
        let king = self.kings & self.color_bb(us.flip());
        if king == 0 { return false; }
        let ksq = lsb(king);
        let t = self.tables();
        let (from, to) = (m.from(), m.to());
        let mut occ = (self.all() & !bit(from)) | bit(to);
        let mut moved = bit(from);
        if m.is_en_passant() {
            occ &= !bit(if us == Color::White { to - 8 } else { to + 8 });
        }
        if m.is_castling() {
            let c = castle_for(us, m.kind());
            occ = (occ & !bit(c.rook_from)) | bit(c.rook_to);
            moved |= bit(c.rook_from);
            if t.rook(c.rook_to, occ) & king != 0 { return true; }
        }
        let direct = match m.promotion().unwrap_or(m.piece()) {
            Piece::Pawn => t.pawn(us, to),
            Piece::Knight => t.knight(to),
            Piece::Bishop => t.bishop(to, occ),
            Piece::Rook => t.rook(to, occ),
            Piece::Queen => t.queen(to, occ),
            Piece::King => 0,
        };
        if direct & king != 0 { return true; }
        let ours = self.color_bb(us) & !moved;
        t.bishop(ksq, occ) & (self.bishops | self.queens) & ours != 0
            || t.rook(ksq, occ) & (self.rooks | self.queens) & ours != 0
    }

    /// Legal moves of the side to move, cached until the hash changes.
    pub fn legal_moves(&mut self) -> Vec<Move> {
        if self.legal_key != Some(self.key) {
            let mut pseudo = Vec::with_capacity(64);
            self.generate(GenKind::All, &mut pseudo);
            let mut legal = Vec::with_capacity(pseudo.len());
            for m in pseudo {
                if self.apply_move(m) {
                    self.undo_move();
                    legal.push(m);
                }
            }
            self.legal_cache = legal;
            self.legal_key = Some(self.key);
        }
        self.legal_cache.clone()
    }

    pub fn is_move_legal(&mut self, m: Move) -> bool { self.legal_moves().iter().any(|l| l.same_as(m)) }

    /// The generated form of `m` (check flag recomputed) if it is
    /// pseudo-legal here.
    pub fn pseudo_legal(&self, m: Move) -> Option<Move> {
        if m.is_none() || m.is_null() || self.mines() & bit(m.from()) == 0 { return None; }
        let mut found = None;
        self.generate_with(GenKind::All, bit(m.from()), &mut |g| {
            if g.same_as(m) { found = Some(g); }
        });
        found
    }

    /// Legal move between two squares; promotions default to a queen.
    /// `NONE` when there is no such move.
    pub fn move_from_squares(&mut self, from: u8, to: u8, promotion: Option<Piece>) -> Move {
        let want = promotion.unwrap_or(Piece::Queen);
        self.legal_moves()
            .into_iter()
            .find(|m| m.from() == from && m.to() == to && m.promotion().map_or(true, |p| p == want))
            .unwrap_or(Move::NONE)
    }
}
