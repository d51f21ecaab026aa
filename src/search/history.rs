use crate::board::Move;

/// History heuristic: how often a quiet (piece, destination) pair caused a
/// beta cutoff.
#[derive(Clone)]
pub struct HistoryTable {
    scores: [[i32; 64]; 7],
}

impl Default for HistoryTable {
    fn default() -> Self { Self::new() }
}

impl HistoryTable {
    pub fn new() -> Self { Self { scores: [[0; 64]; 7] } }

    pub fn clear(&mut self) { self.scores = [[0; 64]; 7]; }

    #[inline]
    pub fn score(&self, m: Move) -> i32 { self.scores[m.piece().index()][m.to() as usize] }

    /// Counts a cutoff by a quiet move; captures and promotions are ignored.
    pub fn record_cutoff(&mut self, m: Move) {
        if m.is_none() || m.is_null() || m.is_tactical() { return; }
        let v = &mut self.scores[m.piece().index()][m.to() as usize];
        *v += 1;
        if *v >= i32::MAX - 1 {
            for row in self.scores.iter_mut() {
                for s in row.iter_mut() { *s >>= 1; }
            }
        }
    }
}

/// Two killer slots for one ply.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Killers(pub [Move; 2]);

impl Killers {
    pub fn push(&mut self, m: Move) {
        if m.is_none() || m.is_null() || m.is_tactical() { return; }
        if !m.same_as(self.0[0]) {
            self.0[1] = self.0[0];
            self.0[0] = m;
        }
    }

    pub fn contains(&self, m: Move) -> bool { !m.is_none() && (m.same_as(self.0[0]) || m.same_as(self.0[1])) }

    pub fn clear(&mut self) { self.0 = [Move::NONE; 2]; }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{MoveKind, Piece};

    #[test]
    fn killers_shift_and_skip_duplicates() {
        let a = Move::new(1, 18, Piece::Knight, false, MoveKind::Normal);
        let b = Move::new(6, 21, Piece::Knight, false, MoveKind::Normal);
        let mut k = Killers::default();
        k.push(a);
        k.push(a);
        assert_eq!(k.0, [a, Move::NONE]);
        k.push(b);
        assert_eq!(k.0, [b, a]);
        k.push(Move::new(1, 18, Piece::Knight, true, MoveKind::Normal));
        assert_eq!(k.0, [b, a]);
    }

    #[test]
    fn history_ignores_tactical_moves() {
        let mut h = HistoryTable::new();
        let quiet = Move::new(11, 27, Piece::Pawn, false, MoveKind::Normal);
        h.record_cutoff(quiet);
        h.record_cutoff(Move::new(11, 20, Piece::Pawn, true, MoveKind::Normal));
        assert_eq!(h.score(quiet), 1);
        assert_eq!(h.score(Move::new(12, 20, Piece::Pawn, false, MoveKind::Normal)), 0);
    }
}
