use log::debug;

use crate::board::zobrist::EXCLUSION_KEY;
use crate::board::{Move, Position};
use crate::search::MATE_THRESHOLD;

/// Depth recorded for quiescence nodes that also tried checking moves.
pub const DEPTH_QS_CHECKS: i32 = 1;
/// Depth recorded for captures-only quiescence nodes.
pub const DEPTH_QS_NO_CHECKS: i32 = 0;

const MAX_PROBES: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    /// Fail high: the true score is at least `score`.
    Lower,
    /// Fail low: the true score is at most `score`.
    Upper,
    /// Only the static evaluation is meaningful.
    Eval,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry {
    pub key: u64,
    pub mv: Move,
    pub score: i32,
    pub eval: i32,
    pub depth: i32,
    pub bound: Bound,
    pub gen: u8,
}

impl Entry {
    /// Whether this entry alone settles a node searched to `depth` with
    /// window `(alpha, beta)`.
    pub fn cuts_off(&self, depth: i32, alpha: i32, beta: i32) -> bool {
        if self.depth < depth { return false; }
        match self.bound {
            Bound::Exact => true,
            Bound::Upper => self.score <= alpha,
            Bound::Lower => self.score >= beta,
            Bound::Eval => false,
        }
    }

    /// Tightens a static evaluation with the searched bound, when it is
    /// informative in that direction.
    pub fn refine(&self, eval: i32) -> i32 {
        match self.bound {
            Bound::Exact => self.score,
            Bound::Upper if self.score < eval => self.score,
            Bound::Lower if self.score > eval => self.score,
            _ => eval,
        }
    }
}

#[derive(Clone, Copy, Default)]
struct Slot(Option<Entry>);

/// Multi-probe transposition table keyed by the position's 128-bit hash.
///
/// The top bits of the primary key pick a run of `MAX_PROBES` slots; the
/// secondary key is stored and compared on probe. Mate scores are kept
/// relative to the node that stored them and translated back with the
/// probing ply.
pub struct TranspositionCache {
    slots: Vec<Slot>,
    size_bits: u32,
    gen: u8,
}

impl TranspositionCache {
    pub fn new(mb: usize) -> Self {
        let mut tt = Self { slots: Vec::new(), size_bits: 0, gen: 0 };
        tt.resize(mb);
        tt
    }

    /// Reallocates to the largest power-of-two slot count fitting in `mb`
    /// megabytes, dropping all entries.
    pub fn resize(&mut self, mb: usize) {
        let bytes = mb.max(1).saturating_mul(1024 * 1024);
        let fit = (bytes / std::mem::size_of::<Slot>()).max(MAX_PROBES);
        let size_bits = usize::BITS - 1 - fit.leading_zeros();
        self.slots = vec![Slot::default(); 1usize << size_bits];
        self.size_bits = size_bits;
        self.gen = 0;
        debug!("transposition table: {} slots ({} MB requested)", self.slots.len(), mb);
    }

    pub fn capacity(&self) -> usize { self.slots.len() }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = Slot::default());
        self.gen = 0;
    }

    /// Called once per search so older entries become replaceable.
    pub fn new_generation(&mut self) { self.gen = self.gen.wrapping_add(1); }

    pub fn generation(&self) -> u8 { self.gen }

    fn keys(pos: &Position, exclusion: bool) -> (u64, u64) {
        if exclusion {
            (pos.exclusion_key(), pos.key2() ^ EXCLUSION_KEY)
        } else {
            (pos.key(), pos.key2())
        }
    }

    #[inline]
    fn start(&self, index_key: u64) -> usize { (index_key >> (64 - self.size_bits)) as usize }

    /// Looks the position up; mate scores come back relative to the root
    /// given the node's distance `ply` from it.
    pub fn probe(&self, pos: &Position, ply: usize, exclusion: bool) -> Option<Entry> {
        let (index_key, verify) = Self::keys(pos, exclusion);
        let start = self.start(index_key);
        let end = (start + MAX_PROBES).min(self.slots.len());
        let mut e = self.slots[start..end].iter().filter_map(|s| s.0).find(|e| e.key == verify)?;
        e.score = score_from_tt(e.score, ply);
        Some(e)
    }

    /// Stores a search result, with the bound derived from where `score`
    /// fell relative to the original window.
    #[allow(clippy::too_many_arguments)]
    pub fn save(
        &mut self,
        pos: &Position,
        ply: usize,
        depth: i32,
        mv: Move,
        score: i32,
        alpha: i32,
        beta: i32,
        eval: i32,
        exclusion: bool,
    ) {
        let bound = if score <= alpha {
            Bound::Upper
        } else if score >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        self.store(pos, bound, depth, mv, score, eval, ply, exclusion);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn store(
        &mut self,
        pos: &Position,
        bound: Bound,
        depth: i32,
        mv: Move,
        score: i32,
        eval: i32,
        ply: usize,
        exclusion: bool,
    ) {
        let (index_key, verify) = Self::keys(pos, exclusion);
        let start = self.start(index_key);
        let end = (start + MAX_PROBES).min(self.slots.len());

        let mut target = None;
        let mut old_gen = None;
        let mut not_exact = None;
        for i in start..end {
            match self.slots[i].0 {
                None => {
                    target = Some(i);
                    break;
                }
                Some(e) if e.key == verify => {
                    target = Some(i);
                    break;
                }
                Some(e) => {
                    if old_gen.is_none() && e.gen != self.gen { old_gen = Some(i); }
                    if not_exact.is_none() && e.bound != Bound::Exact { not_exact = Some(i); }
                }
            }
        }
        let Some(i) = target.or(old_gen).or(not_exact) else { return };

        self.slots[i].0 = Some(Entry {
            key: verify,
            mv: if mv.is_null() { Move::NONE } else { mv.base() },
            score: score_to_tt(score, ply),
            eval,
            depth: depth.max(0),
            bound,
            gen: self.gen,
        });
    }

    /// Occupancy of the current generation, per mille of the first 1000
    /// slots.
    pub fn hash_full(&self) -> u32 {
        let n = self.slots.len().min(1000);
        let used = self.slots[..n].iter().filter(|s| matches!(s.0, Some(e) if e.gen == self.gen)).count();
        (used * 1000 / n.max(1)) as u32
    }
}

impl Default for TranspositionCache {
    fn default() -> Self { Self::new(16) }
}

#[inline]
fn score_to_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE_THRESHOLD {
        score + ply as i32
    } else if score <= -MATE_THRESHOLD {
        score - ply as i32
    } else {
        score
    }
}

#[inline]
fn score_from_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE_THRESHOLD {
        score - ply as i32
    } else if score <= -MATE_THRESHOLD {
        score + ply as i32
    } else {
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::MATE_SCORE;

    #[test]
    fn capacity_is_a_power_of_two() {
        let tt = TranspositionCache::new(3);
        assert!(tt.capacity().is_power_of_two());
        assert!(tt.capacity() * std::mem::size_of::<Slot>() <= 3 * 1024 * 1024);
    }

    #[test]
    fn mate_scores_are_node_relative() {
        assert_eq!(score_from_tt(score_to_tt(MATE_SCORE - 7, 4), 2), MATE_SCORE - 5);
        assert_eq!(score_from_tt(score_to_tt(-MATE_SCORE + 9, 3), 3), -MATE_SCORE + 9);
        assert_eq!(score_to_tt(150, 12), 150);
    }

    #[test]
    fn bound_checks() {
        let e = Entry { key: 1, mv: Move::NONE, score: 40, eval: 10, depth: 6, bound: Bound::Lower, gen: 0 };
        assert!(e.cuts_off(6, 0, 40));
        assert!(!e.cuts_off(8, 0, 40));
        assert!(!e.cuts_off(6, 0, 50));
        assert_eq!(e.refine(10), 40);
        assert_eq!(e.refine(60), 60);
    }
}
