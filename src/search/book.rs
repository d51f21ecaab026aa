use log::debug;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::board::{Move, Position, START_FEN};

/// Source of prepared moves consulted before searching.
pub trait Book: Send {
    /// A legal move for `pos`, or `None` when the position is not covered.
    fn lookup(&mut self, pos: &mut Position) -> Option<Move>;
}

/// A named opening as a sequence of UCI moves from the standard start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningLine {
    pub name: String,
    pub moves: Vec<String>,
}

impl OpeningLine {
    pub fn new(name: &str, moves: &str) -> Self {
        Self { name: name.to_string(), moves: moves.split_whitespace().map(String::from).collect() }
    }
}

const BUILTIN_LINES: &[(&str, &str)] = &[
    ("Italian Game", "e2e4 e7e5 g1f3 b8c6 f1c4 f8c5 e1g1 g8f6"),
    ("Ruy Lopez", "e2e4 e7e5 g1f3 b8c6 f1b5 a7a6 b5a4 g8f6"),
    ("Scotch Game", "e2e4 e7e5 g1f3 b8c6 d2d4 e5d4 f3d4 f8c5"),
    ("Sicilian Dragon", "e2e4 c7c5 g1f3 d7d6 d2d4 c5d4 f3d4 g8f6"),
    ("French Defense", "e2e4 e7e6 d2d4 d7d5 b1c3 f8b4 e4e5 c7c5"),
    ("Caro-Kann Defense", "e2e4 c7c6 d2d4 d7d5 b1c3 d5e4 c3e4 c8f5"),
    ("Scandinavian Defense", "e2e4 d7d5 e4d5 d8d5 b1c3 d5a5 d2d4 g8f6"),
    ("Queen's Gambit Declined", "d2d4 d7d5 c2c4 e7e6 b1c3 g8f6 c1g5 f8e7"),
    ("King's Indian Defense", "d2d4 g8f6 c2c4 g7g6 b1c3 f8g7 e2e4 d7d6"),
    ("Nimzo-Indian Defense", "d2d4 g8f6 c2c4 e7e6 b1c3 f8b4 e2e3 e8g8"),
    ("Queen's Indian Defense", "d2d4 g8f6 c2c4 e7e6 g1f3 b7b6 g2g3 c8b7"),
    ("Catalan Opening", "d2d4 g8f6 c2c4 e7e6 g2g3 d7d5 f1g2 f8e7"),
    ("English Opening", "c2c4 e7e5 b1c3 g8f6 g2g3 d7d5 c4d5 f6d5"),
];

/// Book built from opening lines: any line whose prefix matches the game so
/// far proposes its next move, and one of the proposals is picked at random.
pub struct OpeningBook {
    lines: Vec<OpeningLine>,
    rng: SmallRng,
}

impl OpeningBook {
    pub fn new(lines: Vec<OpeningLine>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => SmallRng::seed_from_u64(s),
            None => SmallRng::from_entropy(),
        };
        Self { lines, rng }
    }

    pub fn builtin(seed: Option<u64>) -> Self {
        Self::new(BUILTIN_LINES.iter().map(|(n, m)| OpeningLine::new(n, m)).collect(), seed)
    }

    /// Lines from a JSON array of `{ "name": .., "moves": [..] }`.
    pub fn from_json(text: &str, seed: Option<u64>) -> serde_json::Result<Self> {
        Ok(Self::new(serde_json::from_str(text)?, seed))
    }

    pub fn lines(&self) -> &[OpeningLine] { &self.lines }

    /// Distinct next moves offered for a game given as UCI moves.
    pub fn candidates(&self, played: &[String]) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for line in &self.lines {
            if line.moves.len() > played.len() && line.moves[..played.len()] == *played {
                let next = line.moves[played.len()].as_str();
                if !out.contains(&next) { out.push(next); }
            }
        }
        out
    }
}

impl Book for OpeningBook {
    fn lookup(&mut self, pos: &mut Position) -> Option<Move> {
        if pos.initial_fen() != START_FEN { return None; }
        let played: Vec<String> = pos.game_moves().iter().map(|m| m.to_uci()).collect();
        let candidates: Vec<String> = self.candidates(&played).into_iter().map(String::from).collect();
        let choice = candidates.choose(&mut self.rng)?.clone();
        let m = pos.parse_move(&choice);
        if m.is_none() { return None; }
        debug!("book move {} after {} plies", choice, played.len());
        Some(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_matching_lines_only() {
        let mut book = OpeningBook::builtin(Some(7));
        let mut p = Position::startpos();
        let first = book.lookup(&mut p).unwrap();
        assert!(["e2e4", "d2d4", "c2c4"].contains(&first.to_uci().as_str()));

        for text in ["e2e4", "c7c5"] {
            let m = p.parse_move(text);
            assert!(p.apply_move(m));
        }
        assert_eq!(book.lookup(&mut p).unwrap().to_uci(), "g1f3");

        let m = p.parse_move("a2a3");
        assert!(p.apply_move(m));
        assert!(book.lookup(&mut p).is_none());
    }

    #[test]
    fn lines_from_json() {
        let book = OpeningBook::from_json(r#"[{"name": "Bird", "moves": ["f2f4", "d7d5"]}]"#, Some(1)).unwrap();
        assert_eq!(book.candidates(&[]), vec!["f2f4"]);
        assert!(book.candidates(&["f2f4".to_string(), "d7d5".to_string()]).is_empty());
    }
}
