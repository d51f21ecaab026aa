//! FEN reading and writing, including the continuation rule that keeps game
//! history when a caller feeds successive positions of the same game.

use thiserror::Error;

use super::bitboard::{bit, file_of, parse_square, rank_of, square, square_name, Bitboard};
use super::mv::Move;
use super::notation::MoveParseError;
use super::position::{
    Position, CASTLES, FLAGS_EN_PASSANT, FLAG_BLACK_KINGSIDE, FLAG_BLACK_QUEENSIDE, FLAG_CHECK, FLAG_TURN,
    FLAG_WHITE_KINGSIDE, FLAG_WHITE_QUEENSIDE,
};
use super::{Color, Piece};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("empty FEN")]
    Empty,
    #[error("bad piece placement: {0}")]
    Board(String),
    #[error("bad side to move: {0}")]
    SideToMove(String),
    #[error("bad castling field: {0}")]
    Castling(String),
    #[error("bad en-passant square: {0}")]
    EnPassant(String),
    #[error("bad move counter: {0}")]
    Counter(String),
    #[error("each side needs exactly one king")]
    Kings,
}

/// Why a position plus move list could not be loaded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error(transparent)]
    Fen(#[from] FenError),
    #[error(transparent)]
    Move(#[from] MoveParseError),
}

#[derive(Default)]
struct ParsedFen {
    white: Bitboard,
    black: Bitboard,
    pieces: [Bitboard; 7],
    flags: u64,
    fifty: u32,
    move_number: usize,
}

fn parse_board(field: &str, out: &mut ParsedFen) -> Result<(), FenError> {
    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() != 8 { return Err(FenError::Board(field.to_string())); }
    for (i, row) in ranks.iter().enumerate() {
        let rank = 7 - i as u8;
        let mut file = 0u8;
        for c in row.chars() {
            if let Some(d) = c.to_digit(10) {
                file += d as u8;
                continue;
            }
            let piece = Piece::from_letter(c).ok_or_else(|| FenError::Board(field.to_string()))?;
            if file > 7 || piece == Piece::Pawn && (rank == 0 || rank == 7) { return Err(FenError::Board(field.to_string())); }
            let b = bit(square(file, rank));
            out.pieces[piece.index()] |= b;
            if c.is_ascii_uppercase() { out.white |= b; } else { out.black |= b; }
            file += 1;
        }
        if file != 8 { return Err(FenError::Board(field.to_string())); }
    }
    let kings = out.pieces[Piece::King.index()];
    if (kings & out.white).count_ones() != 1 || (kings & out.black).count_ones() != 1 { return Err(FenError::Kings); }
    Ok(())
}

impl ParsedFen {
    fn parse(fen: &str, pos: &Position) -> Result<ParsedFen, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.is_empty() { return Err(FenError::Empty); }
        let mut p = ParsedFen::default();
        parse_board(fields[0], &mut p)?;

        match fields.get(1).copied().unwrap_or("w") {
            "w" => {}
            "b" => p.flags |= FLAG_TURN,
            other => return Err(FenError::SideToMove(other.to_string())),
        }

        let castling = fields.get(2).copied().unwrap_or("-");
        if castling != "-" {
            for c in castling.chars() {
                let (right, idx) = match c {
                    'K' => (FLAG_WHITE_KINGSIDE, 0),
                    'Q' => (FLAG_WHITE_QUEENSIDE, 1),
                    'k' => (FLAG_BLACK_KINGSIDE, 2),
                    'q' => (FLAG_BLACK_QUEENSIDE, 3),
                    _ => return Err(FenError::Castling(castling.to_string())),
                };
                // Rights without king and rook on their home squares are dropped.
                let side = if idx < 2 { p.white } else { p.black };
                let castle = &CASTLES[idx];
                let kings = p.pieces[Piece::King.index()];
                let rooks = p.pieces[Piece::Rook.index()];
                if kings & side & bit(castle.king_from) != 0 && rooks & side & bit(castle.rook_from) != 0 {
                    p.flags |= right;
                }
            }
        }

        let ep = fields.get(3).copied().unwrap_or("-");
        if ep != "-" {
            let sq = parse_square(ep).ok_or_else(|| FenError::EnPassant(ep.to_string()))?;
            if bit(sq) & FLAGS_EN_PASSANT == 0 { return Err(FenError::EnPassant(ep.to_string())); }
            // Only kept when a pawn of the side to move can actually take.
            let to_move = if p.flags & FLAG_TURN == 0 { Color::White } else { Color::Black };
            let pushed_by = to_move.flip();
            let right_rank = if to_move == Color::White { rank_of(sq) == 5 } else { rank_of(sq) == 2 };
            let mover = if to_move == Color::White { p.white } else { p.black };
            if right_rank && pos.tables().pawn(pushed_by, sq) & p.pieces[Piece::Pawn.index()] & mover != 0 {
                p.flags |= bit(sq);
            }
        }

        if let Some(f) = fields.get(4) {
            p.fifty = f.parse().map_err(|_| FenError::Counter(f.to_string()))?;
        }
        let black = usize::from(p.flags & FLAG_TURN != 0);
        let full: usize = match fields.get(5) {
            Some(f) => f.parse().map_err(|_| FenError::Counter(f.to_string()))?,
            None => 1,
        };
        p.move_number = (full.saturating_sub(1) << 1) + black;
        Ok(p)
    }

    fn same_board(&self, pos: &Position) -> bool {
        self.white == pos.white
            && self.black == pos.black
            && self.pieces[Piece::Pawn.index()] == pos.pawns
            && self.pieces[Piece::Knight.index()] == pos.knights
            && self.pieces[Piece::Bishop.index()] == pos.bishops
            && self.pieces[Piece::Rook.index()] == pos.rooks
            && self.pieces[Piece::Queen.index()] == pos.queens
            && self.pieces[Piece::King.index()] == pos.kings
            && self.flags & FLAG_TURN == pos.flags & FLAG_TURN
    }
}

impl Position {
    /// Position with fresh tables from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Position, FenError> {
        let mut pos = Position::empty(std::sync::Arc::new(super::AttackTables::new()));
        pos.set_fen(fen)?;
        Ok(pos)
    }

    pub fn set_fen(&mut self, fen: &str) -> Result<(), FenError> { self.set_fen_with_last_move(fen, None) }

    /// Loads `fen`. When it is the position after `last_move` from the
    /// current one, or an earlier position of the current game, history is
    /// kept so repetitions across the two are still seen.
    pub fn set_fen_with_last_move(&mut self, fen: &str, last_move: Option<Move>) -> Result<(), FenError> {
        let parsed = ParsedFen::parse(fen, self)?;
        let has_board = self.kings != 0;

        if has_board {
            match last_move {
                Some(m) if self.move_number + 1 == parsed.move_number => {
                    self.apply_move(m);
                }
                _ => {
                    if parsed.move_number < self.move_number { self.undo_move_to(parsed.move_number.max(self.initial_move_number)); }
                }
            }
        }

        if has_board && parsed.same_board(self) {
            if self.move_number < self.out_book_move { self.out_book_move = usize::MAX; }
            return Ok(());
        }

        self.white = parsed.white;
        self.black = parsed.black;
        self.pawns = parsed.pieces[Piece::Pawn.index()];
        self.knights = parsed.pieces[Piece::Knight.index()];
        self.bishops = parsed.pieces[Piece::Bishop.index()];
        self.rooks = parsed.pieces[Piece::Rook.index()];
        self.queens = parsed.pieces[Piece::Queen.index()];
        self.kings = parsed.pieces[Piece::King.index()];
        self.flags = parsed.flags;
        self.fifty = parsed.fifty;
        self.initial_move_number = parsed.move_number;
        self.move_number = parsed.move_number;
        self.out_book_move = usize::MAX;
        self.initial_fen = fen.trim().to_string();
        self.key = self.compute_keys();
        if self.tables().king_attacked(self, self.side_to_move()) { self.flags |= FLAG_CHECK; }
        self.reset_history();
        Ok(())
    }

    /// Loads `fen` and plays `moves` (UCI or SAN) on it. When this replays
    /// the current game from its start, the out-of-book mark is kept as long
    /// as the moves leading to it are unchanged. On a bad move the position
    /// is left after the last good one.
    pub fn set_game<S: AsRef<str>>(&mut self, fen: &str, moves: &[S]) -> Result<(), GameError> {
        let mark = self.out_book_move;
        let previous = (self.initial_fen == fen.trim()).then(|| (self.initial_move_number, self.game_moves()));
        self.set_fen(fen)?;
        for text in moves {
            let text = text.as_ref();
            let m = self.try_parse_move(text)?;
            if !self.apply_move(m) { return Err(MoveParseError::Illegal(text.to_string()).into()); }
        }
        if let Some((base, previous)) = previous {
            if mark != usize::MAX && base == self.initial_move_number && mark >= base {
                let shared = mark - base;
                let now = self.game_moves();
                if previous.len() >= shared && now.len() >= shared && previous[..shared] == now[..shared] {
                    self.out_book_move = mark;
                }
            }
        }
        Ok(())
    }

    pub fn fen(&self) -> String {
        let mut s = String::with_capacity(90);
        for rank in (0..8u8).rev() {
            let mut empty = 0;
            for file in 0..8u8 {
                match self.piece_at(square(file, rank)) {
                    Some((c, p)) => {
                        if empty > 0 {
                            s.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        let l = p.letter();
                        s.push(if c == Color::White { l } else { l.to_ascii_lowercase() });
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 { s.push(char::from(b'0' + empty)); }
            if rank > 0 { s.push('/'); }
        }
        s.push_str(if self.is_white_to_move() { " w " } else { " b " });
        let before = s.len();
        for (right, c) in [(FLAG_WHITE_KINGSIDE, 'K'), (FLAG_WHITE_QUEENSIDE, 'Q'), (FLAG_BLACK_KINGSIDE, 'k'), (FLAG_BLACK_QUEENSIDE, 'q')] {
            if self.flags & right != 0 { s.push(c); }
        }
        if s.len() == before { s.push('-'); }
        s.push(' ');
        match self.en_passant_square() {
            Some(sq) => s.push_str(&square_name(sq)),
            None => s.push('-'),
        }
        s.push_str(&format!(" {} {}", self.fifty, (self.move_number >> 1) + 1));
        s
    }
}

/// File letter of a square, used by move text.
pub(crate) fn file_char(sq: u8) -> char { (b'a' + file_of(sq)) as char }
