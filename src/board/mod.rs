//! Bitboard position with incremental hashing, magic attack tables and move text.
//!
//! Squares are numbered with bit 0 = h1 and bit 63 = a8, so the file of a
//! square is `7 - (sq & 7)` counted from the a-file and its rank is `sq >> 3`.

pub mod attacks;
pub mod bitboard;
pub mod fen;
pub mod magic;
pub mod movegen;
pub mod mv;
pub mod notation;
pub mod position;
pub mod see;
pub mod zobrist;

pub use attacks::{AttackTables, MagicAttacks, RayAttacks, SliderAttacks};
pub use fen::{FenError, GameError};
pub use mv::{Move, MoveKind};
pub use notation::MoveParseError;
pub use position::{Position, MAX_MOVES, START_FEN};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    #[inline]
    pub fn index(self) -> usize { self as usize }

    #[inline]
    pub fn flip(self) -> Color {
        match self { Color::White => Color::Black, Color::Black => Color::White }
    }
}

/// Piece kinds. The discriminants are the values packed into a [`Move`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Piece {
    Pawn = 1,
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
    King = 6,
}

impl Piece {
    pub const ALL: [Piece; 6] = [Piece::Pawn, Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen, Piece::King];

    #[inline]
    pub fn index(self) -> usize { self as usize }

    pub fn from_index(i: u32) -> Option<Piece> {
        match i {
            1 => Some(Piece::Pawn),
            2 => Some(Piece::Knight),
            3 => Some(Piece::Bishop),
            4 => Some(Piece::Rook),
            5 => Some(Piece::Queen),
            6 => Some(Piece::King),
            _ => None,
        }
    }

    /// Upper-case SAN/FEN letter (`P` for pawns).
    pub fn letter(self) -> char {
        match self {
            Piece::Pawn => 'P',
            Piece::Knight => 'N',
            Piece::Bishop => 'B',
            Piece::Rook => 'R',
            Piece::Queen => 'Q',
            Piece::King => 'K',
        }
    }

    pub fn from_letter(c: char) -> Option<Piece> {
        match c.to_ascii_uppercase() {
            'P' => Some(Piece::Pawn),
            'N' => Some(Piece::Knight),
            'B' => Some(Piece::Bishop),
            'R' => Some(Piece::Rook),
            'Q' => Some(Piece::Queen),
            'K' => Some(Piece::King),
            _ => None,
        }
    }
}
