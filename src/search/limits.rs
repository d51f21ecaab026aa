use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_MOVES_TO_GO: u64 = 40;

/// What a single `go` may spend. Times are in milliseconds; `None` or
/// `false` means the limit is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchLimits {
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub winc: Option<u64>,
    pub binc: Option<u64>,
    pub movestogo: Option<u64>,
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
    pub movetime: Option<u64>,
    pub infinite: bool,
    pub ponder: bool,
}

impl SearchLimits {
    pub fn depth(depth: u32) -> Self { Self { depth: Some(depth), ..Self::default() } }

    pub fn movetime(ms: u64) -> Self { Self { movetime: Some(ms), ..Self::default() } }

    pub fn nodes(nodes: u64) -> Self { Self { nodes: Some(nodes), ..Self::default() } }

    /// True when the budget comes from the clock, so the search may stop
    /// early once another iteration is unlikely to finish.
    pub fn manage_time(&self) -> bool {
        !self.infinite && !self.ponder && self.movetime.is_none() && (self.wtime.is_some() || self.btime.is_some())
    }

    /// Budget for this move; `None` means unbounded. Panic mode triples the
    /// clock share, never beyond half the remaining time.
    pub fn move_time(&self, is_white: bool, panic: bool) -> Option<Duration> {
        if self.infinite || self.ponder { return None; }
        if let Some(ms) = self.movetime { return Some(Duration::from_millis(ms)); }
        let (time, inc) = if is_white { (self.wtime, self.winc) } else { (self.btime, self.binc) };
        let time = time?;
        let mtg = self.movestogo.filter(|&m| m > 0).unwrap_or(DEFAULT_MOVES_TO_GO);
        let mut ms = time / mtg + inc.unwrap_or(0);
        if panic { ms = (ms * 3).min(time / 2); }
        Some(Duration::from_millis(ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_share_plus_increment() {
        let l = SearchLimits { wtime: Some(40_000), winc: Some(500), btime: Some(20_000), ..Default::default() };
        assert_eq!(l.move_time(true, false), Some(Duration::from_millis(1_500)));
        assert_eq!(l.move_time(false, false), Some(Duration::from_millis(500)));
        assert!(l.manage_time());
    }

    #[test]
    fn panic_is_capped_at_half_the_clock() {
        let l = SearchLimits { wtime: Some(1_000), movestogo: Some(1), ..Default::default() };
        assert_eq!(l.move_time(true, true), Some(Duration::from_millis(500)));
    }

    #[test]
    fn fixed_and_unbounded() {
        assert_eq!(SearchLimits::movetime(250).move_time(false, true), Some(Duration::from_millis(250)));
        assert_eq!(SearchLimits { infinite: true, wtime: Some(10), ..Default::default() }.move_time(true, false), None);
        assert_eq!(SearchLimits::depth(5).move_time(true, false), None);
        assert!(!SearchLimits::movetime(250).manage_time());
    }
}
