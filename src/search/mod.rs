//! Iterative-deepening alpha-beta search and its collaborators.
//!
//! Depths inside the search are counted in fractions of a ply ([`PLY`]
//! units) so extensions and reductions can be finer than one move.

pub mod alphabeta;
pub mod book;
pub mod config;
pub mod eval;
pub mod history;
pub mod info;
pub mod limits;
pub mod movepick;
pub mod tt;
pub mod worker;

/// Depth units per ply.
pub const PLY: i32 = 2;
pub const MAX_DEPTH: usize = 64;
pub const MATE_SCORE: i32 = 30_000;
/// Scores at or beyond this magnitude are mate distances.
pub const MATE_THRESHOLD: i32 = MATE_SCORE - MAX_DEPTH as i32;
pub const KNOWN_WIN: i32 = 20_000;
