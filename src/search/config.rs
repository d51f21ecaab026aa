use serde::{Deserialize, Serialize};

pub const MIN_ELO: i32 = 500;
pub const MAX_ELO: i32 = 2100;

/// Engine tuning that persists across searches. Loadable from JSON; any
/// missing field takes its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Transposition table size in megabytes.
    pub tt_mb: usize,
    /// Positive values avoid draws, negative values seek them.
    pub contempt: i32,
    /// Root errors per mille; 0 plays at full strength.
    pub rand: u32,
    pub use_book: bool,
    /// Percentage of searches that consult the book while in book.
    pub book_knowledge: u32,
    /// Seed for the skill and book randomness; `None` seeds from entropy.
    pub seed: Option<u64>,
    pub null_move: bool,
    pub static_null_move: bool,
    pub razoring: bool,
    pub iid: bool,
    pub lmr: bool,
    pub futility: bool,
    pub singular_extension: bool,
    pub aspiration: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            tt_mb: 64,
            contempt: 90,
            rand: 0,
            use_book: true,
            book_knowledge: 100,
            seed: None,
            null_move: true,
            static_null_move: true,
            razoring: true,
            iid: true,
            lmr: true,
            futility: true,
            singular_extension: true,
            aspiration: true,
        }
    }
}

impl SearchConfig {
    pub fn from_json(text: &str) -> serde_json::Result<Self> { serde_json::from_str(text) }

    /// Weakens play to roughly `elo` (clamped to 500..=2100): more root
    /// errors and less book knowledge.
    pub fn set_elo(&mut self, elo: i32) {
        let elo = elo.clamp(MIN_ELO, MAX_ELO);
        self.rand = (900 - (elo - MIN_ELO) * 900 / (MAX_ELO - MIN_ELO)) as u32;
        self.book_knowledge = ((elo - MIN_ELO) * 100 / (MAX_ELO - MIN_ELO)) as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elo_maps_to_errors_and_knowledge() {
        let mut c = SearchConfig::default();
        c.set_elo(2100);
        assert_eq!((c.rand, c.book_knowledge), (0, 100));
        c.set_elo(500);
        assert_eq!((c.rand, c.book_knowledge), (900, 0));
        c.set_elo(1300);
        assert_eq!((c.rand, c.book_knowledge), (450, 50));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c = SearchConfig::from_json(r#"{"contempt": 0, "lmr": false}"#).unwrap();
        assert_eq!(c.contempt, 0);
        assert!(!c.lmr);
        assert_eq!(c.tt_mb, 64);
    }
}
