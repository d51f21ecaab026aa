use std::sync::Arc;

use super::attacks::AttackTables;
use super::bitboard::{bit, file_of, lsb, popcount, Bitboard, Squares, RANK_7, RANK_2};
use super::mv::{Move, MoveKind};
use super::zobrist::{piece_key, EXCLUSION_KEY, KEYS};
use super::{Color, Piece};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Plies of history kept from the loaded position onwards.
pub const MAX_MOVES: usize = 1024;

pub const FLAG_TURN: u64 = 0x01;
pub const FLAG_WHITE_KINGSIDE: u64 = 0x02;
pub const FLAG_WHITE_QUEENSIDE: u64 = 0x04;
pub const FLAG_BLACK_KINGSIDE: u64 = 0x08;
pub const FLAG_BLACK_QUEENSIDE: u64 = 0x10;
pub const FLAG_CHECK: u64 = 0x20;
pub const FLAGS_CASTLING: u64 = 0x1e;
/// En-passant targets live on the 3rd and 6th ranks.
pub const FLAGS_EN_PASSANT: u64 = 0x0000_ff00_00ff_0000;

const CASTLING_FLAGS: [u64; 4] = [FLAG_WHITE_KINGSIDE, FLAG_WHITE_QUEENSIDE, FLAG_BLACK_KINGSIDE, FLAG_BLACK_QUEENSIDE];

pub(crate) struct Castle {
    pub right: u64,
    pub king_from: u8,
    pub king_to: u8,
    pub rook_from: u8,
    pub rook_to: u8,
    /// Squares between king and rook.
    pub empty: Bitboard,
    /// King start, crossing and destination squares.
    pub safe: [u8; 3],
}

pub(crate) const CASTLES: [Castle; 4] = [
    Castle { right: FLAG_WHITE_KINGSIDE, king_from: 3, king_to: 1, rook_from: 0, rook_to: 2, empty: 0x06, safe: [3, 2, 1] },
    Castle { right: FLAG_WHITE_QUEENSIDE, king_from: 3, king_to: 5, rook_from: 7, rook_to: 4, empty: 0x70, safe: [3, 4, 5] },
    Castle {
        right: FLAG_BLACK_KINGSIDE,
        king_from: 59,
        king_to: 57,
        rook_from: 56,
        rook_to: 58,
        empty: 0x06 << 56,
        safe: [59, 58, 57],
    },
    Castle {
        right: FLAG_BLACK_QUEENSIDE,
        king_from: 59,
        king_to: 61,
        rook_from: 63,
        rook_to: 60,
        empty: 0x70 << 56,
        safe: [59, 60, 61],
    },
];

pub(crate) fn castle_for(color: Color, kind: MoveKind) -> &'static Castle {
    let side = if kind == MoveKind::CastleQueen { 1 } else { 0 };
    &CASTLES[color.index() * 2 + side]
}

// Castling rights lost when a move starts or ends on `sq`.
fn rights_touched(sq: u8) -> u64 {
    match sq {
        0 => FLAG_WHITE_KINGSIDE,
        3 => FLAG_WHITE_KINGSIDE | FLAG_WHITE_QUEENSIDE,
        7 => FLAG_WHITE_QUEENSIDE,
        56 => FLAG_BLACK_KINGSIDE,
        59 => FLAG_BLACK_KINGSIDE | FLAG_BLACK_QUEENSIDE,
        63 => FLAG_BLACK_QUEENSIDE,
        _ => 0,
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Snapshot {
    pub white: Bitboard,
    pub black: Bitboard,
    pub pawns: Bitboard,
    pub knights: Bitboard,
    pub bishops: Bitboard,
    pub rooks: Bitboard,
    pub queens: Bitboard,
    pub kings: Bitboard,
    pub flags: u64,
    pub fifty: u32,
    pub key: [u64; 2],
    /// Move played from this position, `NONE` for the current one.
    pub mv: Move,
}

/// Mutable board state owned by one search thread.
#[derive(Clone)]
pub struct Position {
    tables: Arc<AttackTables>,
    pub(crate) white: Bitboard,
    pub(crate) black: Bitboard,
    pub(crate) pawns: Bitboard,
    pub(crate) knights: Bitboard,
    pub(crate) bishops: Bitboard,
    pub(crate) rooks: Bitboard,
    pub(crate) queens: Bitboard,
    pub(crate) kings: Bitboard,
    pub(crate) flags: u64,
    pub(crate) fifty: u32,
    pub(crate) key: [u64; 2],
    pub(crate) initial_move_number: usize,
    pub(crate) move_number: usize,
    pub(crate) out_book_move: usize,
    pub(crate) initial_fen: String,
    pub(crate) history: Vec<Snapshot>,
    pub(crate) legal_key: Option<[u64; 2]>,
    pub(crate) legal_cache: Vec<Move>,
}

impl Position {
    /// Start position over the given tables.
    pub fn new(tables: Arc<AttackTables>) -> Self {
        let mut pos = Self::empty(tables);
        pos.white = 0x0000_0000_0000_ffff;
        pos.black = 0xffff_0000_0000_0000;
        pos.pawns = 0x00ff_0000_0000_ff00;
        pos.knights = 0x4200_0000_0000_0042;
        pos.bishops = 0x2400_0000_0000_0024;
        pos.rooks = 0x8100_0000_0000_0081;
        pos.queens = 0x1000_0000_0000_0010;
        pos.kings = 0x0800_0000_0000_0008;
        pos.flags = FLAGS_CASTLING;
        pos.initial_fen = START_FEN.to_string();
        pos.key = pos.compute_keys();
        pos.reset_history();
        pos
    }

    pub(crate) fn empty(tables: Arc<AttackTables>) -> Self {
        Self {
            tables,
            white: 0,
            black: 0,
            pawns: 0,
            knights: 0,
            bishops: 0,
            rooks: 0,
            queens: 0,
            kings: 0,
            flags: 0,
            fifty: 0,
            key: [0; 2],
            initial_move_number: 0,
            move_number: 0,
            out_book_move: usize::MAX,
            initial_fen: String::new(),
            history: vec![Snapshot::default(); MAX_MOVES],
            legal_key: None,
            legal_cache: Vec::with_capacity(64),
        }
    }

    /// Start position with freshly built tables.
    pub fn startpos() -> Self { Self::new(Arc::new(AttackTables::new())) }

    pub fn tables(&self) -> &AttackTables { &self.tables }

    pub fn shared_tables(&self) -> Arc<AttackTables> { Arc::clone(&self.tables) }

    #[inline] pub fn white(&self) -> Bitboard { self.white }
    #[inline] pub fn black(&self) -> Bitboard { self.black }
    #[inline] pub fn pawns(&self) -> Bitboard { self.pawns }
    #[inline] pub fn knights(&self) -> Bitboard { self.knights }
    #[inline] pub fn bishops(&self) -> Bitboard { self.bishops }
    #[inline] pub fn rooks(&self) -> Bitboard { self.rooks }
    #[inline] pub fn queens(&self) -> Bitboard { self.queens }
    #[inline] pub fn kings(&self) -> Bitboard { self.kings }
    #[inline] pub fn all(&self) -> Bitboard { self.white | self.black }

    #[inline]
    pub fn color_bb(&self, c: Color) -> Bitboard { if c == Color::White { self.white } else { self.black } }

    /// Pieces of the side to move.
    #[inline]
    pub fn mines(&self) -> Bitboard { self.color_bb(self.side_to_move()) }

    #[inline]
    pub fn others(&self) -> Bitboard { self.color_bb(self.side_to_move().flip()) }

    #[inline]
    pub fn piece_bb(&self, p: Piece) -> Bitboard {
        match p {
            Piece::Pawn => self.pawns,
            Piece::Knight => self.knights,
            Piece::Bishop => self.bishops,
            Piece::Rook => self.rooks,
            Piece::Queen => self.queens,
            Piece::King => self.kings,
        }
    }

    fn piece_bb_mut(&mut self, p: Piece) -> &mut Bitboard {
        match p {
            Piece::Pawn => &mut self.pawns,
            Piece::Knight => &mut self.knights,
            Piece::Bishop => &mut self.bishops,
            Piece::Rook => &mut self.rooks,
            Piece::Queen => &mut self.queens,
            Piece::King => &mut self.kings,
        }
    }

    pub fn piece_kind_at(&self, sq: u8) -> Option<Piece> {
        let b = bit(sq);
        if self.all() & b == 0 { return None; }
        Piece::ALL.into_iter().find(|&p| self.piece_bb(p) & b != 0)
    }

    pub fn piece_at(&self, sq: u8) -> Option<(Color, Piece)> {
        let p = self.piece_kind_at(sq)?;
        let c = if self.white & bit(sq) != 0 { Color::White } else { Color::Black };
        Some((c, p))
    }

    #[inline]
    pub fn side_to_move(&self) -> Color { if self.flags & FLAG_TURN == 0 { Color::White } else { Color::Black } }

    #[inline]
    pub fn is_white_to_move(&self) -> bool { self.flags & FLAG_TURN == 0 }

    #[inline]
    pub fn in_check(&self) -> bool { self.flags & FLAG_CHECK != 0 }

    #[inline]
    pub fn flags(&self) -> u64 { self.flags }

    pub fn can_castle(&self, right: u64) -> bool { self.flags & right & FLAGS_CASTLING != 0 }

    pub fn en_passant_square(&self) -> Option<u8> {
        let ep = self.flags & FLAGS_EN_PASSANT;
        if ep == 0 { None } else { Some(lsb(ep)) }
    }

    #[inline]
    pub fn fifty(&self) -> u32 { self.fifty }

    /// Plies since the start of the game.
    #[inline]
    pub fn move_number(&self) -> usize { self.move_number }

    #[inline]
    pub fn initial_move_number(&self) -> usize { self.initial_move_number }

    pub fn initial_fen(&self) -> &str { &self.initial_fen }

    /// Primary hash.
    #[inline]
    pub fn key(&self) -> u64 { self.key[0] ^ self.key[1] }

    /// Secondary hash used to verify cache hits.
    #[inline]
    pub fn key2(&self) -> u64 { self.key[0].rotate_left(32) ^ self.key[1] }

    #[inline]
    pub fn exclusion_key(&self) -> u64 { self.key() ^ EXCLUSION_KEY }

    pub fn key_words(&self) -> [u64; 2] { self.key }

    /// Whether `c` still has something other than pawns and king.
    pub fn has_non_pawn_material(&self, c: Color) -> bool {
        (self.knights | self.bishops | self.rooks | self.queens) & self.color_bb(c) != 0
    }

    /// Whether either side has a pawn one step from promotion.
    pub fn has_pawn_on_seventh(&self) -> bool {
        self.pawns & ((self.white & RANK_7) | (self.black & RANK_2)) != 0
    }

    /// Hash computed from scratch; equals [`Position::key_words`] whenever the
    /// incremental updates are correct.
    pub fn compute_keys(&self) -> [u64; 2] {
        let mut k = [0u64; 2];
        for sq in Squares(self.all()) {
            if let Some((c, p)) = self.piece_at(sq) { k[c.index()] ^= piece_key(c, p, sq); }
        }
        if self.is_white_to_move() { k[0] ^= KEYS.white_move; }
        for (i, &right) in CASTLING_FLAGS.iter().enumerate() {
            if self.flags & right != 0 { k[i / 2] ^= KEYS.castling[i]; }
        }
        if let Some(ep) = self.en_passant_square() {
            k[self.side_to_move().flip().index()] ^= KEYS.en_passant[file_of(ep) as usize];
        }
        k
    }

    fn toggle(&mut self, c: Color, p: Piece, sq: u8) {
        let b = bit(sq);
        *self.piece_bb_mut(p) ^= b;
        if c == Color::White { self.white ^= b; } else { self.black ^= b; }
        self.key[c.index()] ^= piece_key(c, p, sq);
    }

    fn snapshot(&self, mv: Move) -> Snapshot {
        Snapshot {
            white: self.white,
            black: self.black,
            pawns: self.pawns,
            knights: self.knights,
            bishops: self.bishops,
            rooks: self.rooks,
            queens: self.queens,
            kings: self.kings,
            flags: self.flags,
            fifty: self.fifty,
            key: self.key,
            mv,
        }
    }

    fn restore(&mut self, s: &Snapshot) {
        self.white = s.white;
        self.black = s.black;
        self.pawns = s.pawns;
        self.knights = s.knights;
        self.bishops = s.bishops;
        self.rooks = s.rooks;
        self.queens = s.queens;
        self.kings = s.kings;
        self.flags = s.flags;
        self.fifty = s.fifty;
        self.key = s.key;
    }

    pub(crate) fn reset_history(&mut self) {
        self.history[0] = self.snapshot(Move::NONE);
        self.legal_key = None;
    }

    /// Plays `m`. Returns false and leaves the position untouched when the
    /// move is not playable here or leaves the mover's king attacked.
    ///
    /// Panics once more than `MAX_MOVES` plies have been played since the
    /// loaded position.
    pub fn apply_move(&mut self, m: Move) -> bool {
        if m.is_none() { return false; }
        let idx = self.move_number - self.initial_move_number;
        assert!(idx + 1 < MAX_MOVES, "move history exhausted at ply {}", self.move_number);
        self.history[idx] = self.snapshot(m);
        self.fifty += 1;
        self.move_number += 1;

        let us = self.side_to_move();
        let them = us.flip();
        let ep = self.flags & FLAGS_EN_PASSANT;
        if ep != 0 {
            self.key[them.index()] ^= KEYS.en_passant[file_of(lsb(ep)) as usize];
            self.flags &= !FLAGS_EN_PASSANT;
        }

        if m.is_null() {
            self.flags ^= FLAG_TURN;
            self.flags &= !FLAG_CHECK;
            self.key[0] ^= KEYS.white_move;
            return true;
        }

        let (from, to) = (m.from(), m.to());
        let piece = m.piece();
        if self.piece_at(from) != Some((us, piece)) || self.color_bb(us) & bit(to) != 0 {
            self.undo_move();
            return false;
        }
        let capture_ok = if m.is_en_passant() {
            piece == Piece::Pawn && ep == bit(to)
        } else {
            m.is_capture() == (self.color_bb(them) & bit(to) != 0)
        };
        if !capture_ok {
            self.undo_move();
            return false;
        }
        if m.is_castling() {
            let c = castle_for(us, m.kind());
            let blocked = self.flags & c.right == 0
                || self.all() & c.empty != 0
                || from != c.king_from
                || to != c.king_to
                || c.safe.iter().any(|&s| self.tables.is_square_attacked(self, s, them));
            if blocked {
                self.undo_move();
                return false;
            }
        }

        if m.is_capture() {
            let (victim_sq, victim) = if m.is_en_passant() {
                (if us == Color::White { to - 8 } else { to + 8 }, Piece::Pawn)
            } else {
                match self.piece_kind_at(to) {
                    Some(p) => (to, p),
                    None => {
                        self.undo_move();
                        return false;
                    }
                }
            };
            self.toggle(them, victim, victim_sq);
            self.fifty = 0;
        }

        self.toggle(us, piece, from);
        self.toggle(us, m.promotion().unwrap_or(piece), to);

        if piece == Piece::Pawn {
            self.fifty = 0;
            if from.abs_diff(to) == 16 {
                let ep_sq = (from + to) / 2;
                if self.tables.pawn(us, ep_sq) & self.pawns & self.color_bb(them) != 0 {
                    self.flags |= bit(ep_sq);
                    self.key[us.index()] ^= KEYS.en_passant[file_of(ep_sq) as usize];
                }
            }
        }

        if m.is_castling() {
            let c = castle_for(us, m.kind());
            self.toggle(us, Piece::Rook, c.rook_from);
            self.toggle(us, Piece::Rook, c.rook_to);
        }

        let lost = (rights_touched(from) | rights_touched(to)) & self.flags & FLAGS_CASTLING;
        if lost != 0 {
            for (i, &right) in CASTLING_FLAGS.iter().enumerate() {
                if lost & right != 0 { self.key[i / 2] ^= KEYS.castling[i]; }
            }
            self.flags &= !lost;
        }

        self.flags ^= FLAG_TURN;
        self.key[0] ^= KEYS.white_move;

        if self.tables.king_attacked(self, us) {
            self.undo_move();
            return false;
        }
        if self.tables.king_attacked(self, them) { self.flags |= FLAG_CHECK; } else { self.flags &= !FLAG_CHECK; }
        true
    }

    /// Takes back the last move. No-op at the starting ply.
    pub fn undo_move(&mut self) {
        if self.move_number > self.initial_move_number { self.undo_move_to(self.move_number - 1); }
    }

    /// Rewinds to ply `n`. No-op when `n` is before the starting ply or not
    /// behind the current one.
    pub fn undo_move_to(&mut self, n: usize) {
        if n < self.initial_move_number || n >= self.move_number { return; }
        let s = self.history[n - self.initial_move_number];
        self.restore(&s);
        self.move_number = n;
    }

    /// Move that led to the current position, `NONE` at the starting ply.
    pub fn last_move(&self) -> Move {
        if self.move_number == self.initial_move_number { return Move::NONE; }
        self.history[self.move_number - 1 - self.initial_move_number].mv
    }

    /// Moves played since the loaded position, oldest first.
    pub fn game_moves(&self) -> Vec<Move> {
        self.history[..self.move_number - self.initial_move_number].iter().map(|s| s.mv).collect()
    }

    pub fn moves_uci(&self) -> String {
        self.game_moves().iter().map(|m| m.to_uci()).collect::<Vec<_>>().join(" ")
    }

    /// Fifty-move rule, repetition or insufficient mating material.
    pub fn is_draw(&self) -> bool {
        if self.fifty >= 100 { return true; }

        let start = self.initial_move_number.max(self.move_number.saturating_sub(self.fifty as usize));
        let mut repetitions = 0;
        for i in start..self.move_number {
            if self.history[i - self.initial_move_number].key == self.key {
                repetitions += 1;
                if repetitions >= 2 { return true; }
            }
        }

        if self.pawns | self.rooks | self.queens == 0 {
            let (b, n) = (popcount(self.bishops), popcount(self.knights));
            if b == 0 && n <= 1 || n == 0 && b == 1 { return true; }
            let one_side = self.knights & self.white == self.knights || self.knights & self.black == self.knights;
            if b == 0 && n == 2 && one_side { return true; }
        }
        false
    }

    /// 0 while the game goes on, +1 when white has mated, -1 when black has,
    /// 99 for any draw.
    pub fn is_endgame(&mut self) -> i32 {
        if self.legal_moves().is_empty() {
            if !self.in_check() { return 99; }
            return if self.is_white_to_move() { -1 } else { 1 };
        }
        if self.is_draw() { 99 } else { 0 }
    }

    pub fn is_using_book(&self) -> bool { self.out_book_move > self.move_number }

    pub fn set_out_book_move(&mut self, ply: usize) { self.out_book_move = ply; }

    /// Ply at which the book last missed, `None` when it has not.
    pub fn out_book_move(&self) -> Option<usize> { (self.out_book_move != usize::MAX).then_some(self.out_book_move) }
}

impl std::fmt::Debug for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Position").field("fen", &self.fen()).field("ply", &self.move_number).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_position_matches_its_fen() {
        let built = Position::startpos();
        let parsed = Position::from_fen(START_FEN).unwrap();
        assert_eq!(built.fen(), START_FEN);
        assert_eq!(built.key_words(), parsed.key_words());
        assert_eq!((built.all(), built.flags(), built.fifty()), (parsed.all(), parsed.flags(), parsed.fifty()));
        assert_eq!(built.initial_fen(), START_FEN);
    }

    #[test]
    fn castle_masks_cover_the_right_squares() {
        // f1 and g1
        assert_eq!(CASTLES[0].empty, bit(2) | bit(1));
        // b1, c1 and d1
        assert_eq!(CASTLES[1].empty, bit(6) | bit(5) | bit(4));
        assert_eq!(CASTLES[3].empty, bit(62) | bit(61) | bit(60));
    }

    #[test]
    fn start_position_hash_matches_scratch() {
        let p = Position::startpos();
        assert_eq!(p.key_words(), p.compute_keys());
        assert!(!p.in_check());
        assert_eq!(p.move_number(), 0);
    }
}
