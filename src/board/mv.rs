use std::fmt;

use super::bitboard::square_name;
use super::Piece;

const TO_SHIFT: u32 = 0;
const FROM_SHIFT: u32 = 6;
const PIECE_SHIFT: u32 = 12;
const CAPTURE_BIT: u32 = 1 << 15;
const KIND_SHIFT: u32 = 16;
const CHECK_BIT: u32 = 1 << 19;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Normal = 0,
    CastleKing = 1,
    CastleQueen = 2,
    EnPassant = 3,
    PromoteQueen = 4,
    PromoteKnight = 5,
    PromoteBishop = 6,
    PromoteRook = 7,
}

impl MoveKind {
    fn from_bits(b: u32) -> MoveKind {
        match b & 7 {
            1 => MoveKind::CastleKing,
            2 => MoveKind::CastleQueen,
            3 => MoveKind::EnPassant,
            4 => MoveKind::PromoteQueen,
            5 => MoveKind::PromoteKnight,
            6 => MoveKind::PromoteBishop,
            7 => MoveKind::PromoteRook,
            _ => MoveKind::Normal,
        }
    }

    pub fn promotion(piece: Piece) -> Option<MoveKind> {
        match piece {
            Piece::Queen => Some(MoveKind::PromoteQueen),
            Piece::Knight => Some(MoveKind::PromoteKnight),
            Piece::Bishop => Some(MoveKind::PromoteBishop),
            Piece::Rook => Some(MoveKind::PromoteRook),
            _ => None,
        }
    }
}

/// A move packed into 20 bits: destination, origin, moved piece, capture
/// flag, [`MoveKind`] and a gives-check flag.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Move(u32);

impl Move {
    pub const NONE: Move = Move(0);
    /// Passes the turn; only used by null-move pruning.
    pub const NULL: Move = Move(u32::MAX);

    pub fn new(from: u8, to: u8, piece: Piece, capture: bool, kind: MoveKind) -> Move {
        let mut raw = (to as u32) << TO_SHIFT
            | (from as u32) << FROM_SHIFT
            | (piece as u32) << PIECE_SHIFT
            | (kind as u32) << KIND_SHIFT;
        if capture { raw |= CAPTURE_BIT; }
        Move(raw)
    }

    #[inline]
    pub fn from_raw(raw: u32) -> Move { Move(raw) }

    #[inline]
    pub fn raw(self) -> u32 { self.0 }

    #[inline]
    pub fn is_none(self) -> bool { self.0 == 0 }

    #[inline]
    pub fn is_null(self) -> bool { self == Move::NULL }

    #[inline]
    pub fn to(self) -> u8 { ((self.0 >> TO_SHIFT) & 63) as u8 }

    #[inline]
    pub fn from(self) -> u8 { ((self.0 >> FROM_SHIFT) & 63) as u8 }

    /// Moved piece. Meaningless for `NONE` and `NULL`, which report a pawn.
    #[inline]
    pub fn piece(self) -> Piece { Piece::from_index((self.0 >> PIECE_SHIFT) & 7).unwrap_or(Piece::Pawn) }

    #[inline]
    pub fn kind(self) -> MoveKind { MoveKind::from_bits(self.0 >> KIND_SHIFT) }

    #[inline]
    pub fn is_capture(self) -> bool { self.0 & CAPTURE_BIT != 0 && !self.is_null() }

    #[inline]
    pub fn gives_check(self) -> bool { self.0 & CHECK_BIT != 0 && !self.is_null() }

    #[inline]
    pub fn with_check(self, check: bool) -> Move {
        if check { Move(self.0 | CHECK_BIT) } else { Move(self.0 & !CHECK_BIT) }
    }

    /// Same move with the check flag cleared, for comparing moves built by
    /// different paths.
    #[inline]
    pub fn base(self) -> Move { if self.is_null() { self } else { Move(self.0 & !CHECK_BIT) } }

    #[inline]
    pub fn same_as(self, other: Move) -> bool { self.base() == other.base() }

    pub fn promotion(self) -> Option<Piece> {
        if self.is_null() { return None; }
        match self.kind() {
            MoveKind::PromoteQueen => Some(Piece::Queen),
            MoveKind::PromoteKnight => Some(Piece::Knight),
            MoveKind::PromoteBishop => Some(Piece::Bishop),
            MoveKind::PromoteRook => Some(Piece::Rook),
            _ => None,
        }
    }

    #[inline]
    pub fn is_promotion(self) -> bool { self.promotion().is_some() }

    #[inline]
    pub fn is_castling(self) -> bool {
        !self.is_null() && matches!(self.kind(), MoveKind::CastleKing | MoveKind::CastleQueen)
    }

    #[inline]
    pub fn is_en_passant(self) -> bool { !self.is_null() && self.kind() == MoveKind::EnPassant }

    /// Captures and promotions.
    #[inline]
    pub fn is_tactical(self) -> bool { self.is_capture() || self.is_promotion() }

    /// Pawn move landing on the 6th rank or beyond, seen from the mover.
    pub fn is_pawn_push_678(self, white: bool) -> bool {
        !self.is_null() && self.piece() == Piece::Pawn && if white { self.to() >= 40 } else { self.to() < 24 }
    }

    pub fn to_uci(self) -> String {
        if self.is_none() { return "none".to_string(); }
        if self.is_null() { return "0000".to_string(); }
        let mut s = square_name(self.from());
        s.push_str(&square_name(self.to()));
        if let Some(p) = self.promotion() { s.push(p.letter().to_ascii_lowercase()); }
        s
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.to_uci()) }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Move({})", self.to_uci()) }
}
