use std::fmt;

use crate::board::Move;
use crate::search::tt::Bound;
use crate::search::{MATE_SCORE, MATE_THRESHOLD};

/// Progress report for one root result. `Display` renders the body of a
/// UCI `info` line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchInfo {
    pub depth: u32,
    pub seldepth: u32,
    pub score: i32,
    /// `Some(Lower)` / `Some(Upper)` when the score only bounds the true
    /// value (aspiration fail-high / fail-low).
    pub bound: Option<Bound>,
    pub nodes: u64,
    pub time_ms: u64,
    pub hashfull: u32,
    pub nps: u64,
    pub pv: Vec<Move>,
}

impl SearchInfo {
    pub fn is_mate(&self) -> bool { self.score.abs() > MATE_THRESHOLD }

    /// Moves (not plies) to mate; negative when the engine is being mated.
    pub fn mate_in(&self) -> i32 {
        let moves = (MATE_SCORE - self.score.abs() + 1) / 2;
        if self.score < 0 { -moves } else { moves }
    }
}

impl fmt::Display for SearchInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "depth {}", self.depth)?;
        if self.seldepth != 0 { write!(f, " seldepth {}", self.seldepth)?; }
        if self.is_mate() {
            write!(f, " score mate {}", self.mate_in())?;
        } else {
            write!(f, " score cp {}", self.score)?;
        }
        match self.bound {
            Some(Bound::Lower) => f.write_str(" lowerbound")?,
            Some(Bound::Upper) => f.write_str(" upperbound")?,
            _ => {}
        }
        write!(f, " nodes {} time {}", self.nodes, self.time_ms)?;
        if self.hashfull != 0 { write!(f, " hashfull {}", self.hashfull)?; }
        if self.nps != 0 { write!(f, " nps {}", self.nps)?; }
        if !self.pv.is_empty() {
            f.write_str(" pv")?;
            for m in &self.pv { write!(f, " {}", m)?; }
        }
        Ok(())
    }
}

/// Receives search progress and the final decision.
pub trait SearchObserver {
    fn info(&mut self, info: &SearchInfo);
    fn best_move(&mut self, best: Move, ponder: Move);
}

/// Observer that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl SearchObserver for LogObserver {
    fn info(&mut self, info: &SearchInfo) { log::debug!("info {}", info); }

    fn best_move(&mut self, best: Move, ponder: Move) { log::debug!("bestmove {} ponder {}", best, ponder); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_mate_and_bounds() {
        let info = SearchInfo { depth: 3, score: MATE_SCORE - 3, nodes: 42, time_ms: 1, ..Default::default() };
        assert_eq!(info.to_string(), "depth 3 score mate 2 nodes 42 time 1");
        let info = SearchInfo { depth: 4, score: -MATE_SCORE + 2, ..Default::default() };
        assert_eq!(info.mate_in(), -1);
        let info = SearchInfo { depth: 7, seldepth: 11, score: -35, bound: Some(Bound::Upper), ..Default::default() };
        assert_eq!(info.to_string(), "depth 7 seldepth 11 score cp -35 upperbound nodes 0 time 0");
    }
}
