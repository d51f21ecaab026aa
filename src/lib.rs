//! Kestrel: a bitboard chess engine core.
//!
//! [`board`] holds the position, attack tables and move text; [`search`]
//! the transposition table, move ordering and the alpha-beta driver.

pub mod board;
pub mod perft;
pub mod search;
pub mod uci;

pub use board::{Move, Position};
pub use search::alphabeta::{SearchEngine, SearchResult};
pub use search::config::SearchConfig;
pub use search::limits::SearchLimits;
