//! Move text: UCI long algebraic and Standard Algebraic Notation.

use thiserror::Error;

use super::bitboard::{file_of, parse_square, rank_of, square_name};
use super::fen::file_char;
use super::mv::{Move, MoveKind};
use super::position::Position;
use super::Piece;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    #[error("malformed move text: {0}")]
    Malformed(String),
    #[error("illegal move: {0}")]
    Illegal(String),
}

impl Position {
    /// Parses UCI or SAN text into a legal move, `NONE` when it is malformed
    /// or not legal here.
    pub fn parse_move(&mut self, text: &str) -> Move { self.try_parse_move(text).unwrap_or(Move::NONE) }

    pub fn try_parse_move(&mut self, text: &str) -> Result<Move, MoveParseError> {
        let malformed = || MoveParseError::Malformed(text.to_string());
        let illegal = || MoveParseError::Illegal(text.to_string());
        let mut s: String = text
            .trim()
            .chars()
            .filter(|c| !matches!(c, '+' | '#' | 'x' | '-' | '=' | '!' | '?'))
            .map(|c| if c == '0' || c == 'o' { 'O' } else { c })
            .collect();

        let white = self.is_white_to_move();
        if s == "OO" || s == "OOO" {
            let (from, to) = match (white, s.len()) {
                (true, 2) => (3, 1),
                (true, _) => (3, 5),
                (false, 2) => (59, 57),
                (false, _) => (59, 61),
            };
            let m = self.move_from_squares(from, to, None);
            return if m.is_castling() { Ok(m) } else { Err(illegal()) };
        }

        let mut promotion = None;
        if s.len() >= 3 {
            let bytes = s.as_bytes();
            let last = bytes[bytes.len() - 1] as char;
            if bytes[bytes.len() - 2].is_ascii_digit() && "qnbrQNBR".contains(last) {
                promotion = Piece::from_letter(last);
                s.pop();
            }
        }
        if s.len() < 2 || !s.is_ascii() { return Err(malformed()); }
        let (prefix, dest) = s.split_at(s.len() - 2);
        let to = parse_square(dest).ok_or_else(malformed)?;

        if prefix.len() == 2 && prefix.as_bytes()[0].is_ascii_lowercase() {
            if let Some(from) = parse_square(prefix) {
                let m = self.move_from_squares(from, to, promotion);
                return if m.is_none() { Err(illegal()) } else { Ok(m) };
            }
        }

        let (piece, disambiguation) = match prefix.chars().next() {
            Some(c) if c.is_ascii_uppercase() => (Piece::from_letter(c).ok_or_else(malformed)?, &prefix[1..]),
            _ => (Piece::Pawn, prefix),
        };
        let mut file = None;
        let mut rank = None;
        for c in disambiguation.chars() {
            match c {
                'a'..='h' => file = Some(c as u8 - b'a'),
                '1'..='8' => rank = Some(c as u8 - b'1'),
                _ => return Err(malformed()),
            }
        }
        let want_promotion = match promotion {
            Some(p) => Some(p),
            None if piece == Piece::Pawn && (rank_of(to) == 0 || rank_of(to) == 7) => Some(Piece::Queen),
            None => None,
        };
        self.legal_moves()
            .into_iter()
            .find(|m| {
                m.piece() == piece
                    && m.to() == to
                    && m.promotion() == want_promotion
                    && !m.is_castling()
                    && file.map_or(true, |f| file_of(m.from()) == f)
                    && rank.map_or(true, |r| rank_of(m.from()) == r)
            })
            .ok_or_else(illegal)
    }

    /// SAN for a legal move, `"none"` otherwise.
    pub fn to_san(&mut self, m: Move) -> String {
        let legal = self.legal_moves();
        let Some(m) = legal.iter().copied().find(|l| l.same_as(m)) else { return "none".to_string() };

        let mut s = String::with_capacity(8);
        match m.kind() {
            MoveKind::CastleKing => s.push_str("O-O"),
            MoveKind::CastleQueen => s.push_str("O-O-O"),
            _ => {
                let (from, to) = (m.from(), m.to());
                if m.piece() == Piece::Pawn {
                    if m.is_capture() {
                        s.push(file_char(from));
                        s.push('x');
                    }
                } else {
                    s.push(m.piece().letter());
                    let rivals: Vec<Move> = legal
                        .iter()
                        .copied()
                        .filter(|o| o.piece() == m.piece() && o.to() == to && o.from() != from)
                        .collect();
                    if !rivals.is_empty() {
                        let same_file = rivals.iter().any(|o| file_of(o.from()) == file_of(from));
                        let same_rank = rivals.iter().any(|o| rank_of(o.from()) == rank_of(from));
                        if !same_file {
                            s.push(file_char(from));
                        } else if !same_rank {
                            s.push((b'1' + rank_of(from)) as char);
                        } else {
                            s.push_str(&square_name(from));
                        }
                    }
                    if m.is_capture() { s.push('x'); }
                }
                s.push_str(&square_name(to));
                if let Some(p) = m.promotion() {
                    s.push('=');
                    s.push(p.letter());
                }
            }
        }

        if self.apply_move(m) {
            if self.in_check() { s.push(if self.legal_moves().is_empty() { '#' } else { '+' }); }
            self.undo_move();
        }
        s
    }

    /// SAN of every move played since the loaded position.
    pub fn moves_san(&self) -> Vec<String> {
        let moves = self.game_moves();
        let mut replay = self.clone();
        replay.undo_move_to(self.initial_move_number);
        let mut out = Vec::with_capacity(moves.len());
        for m in moves {
            out.push(replay.to_san(m));
            if !replay.apply_move(m) { break; }
        }
        out
    }
}
