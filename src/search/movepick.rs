use crate::board::movegen::GenKind;
use crate::board::{Move, Piece, Position};
use crate::search::history::HistoryTable;

// MVV/LVA weights, indexed by piece discriminant
const VICTIM: [i32; 7] = [0, 100, 325, 330, 500, 975, 10000];
const AGGRESSOR: [i32; 7] = [0, 10, 32, 33, 50, 97, 99];
const QUEEN_PROMOTION_BONUS: i32 = 975;
const UNDER_PROMOTION_SCORE: i32 = i32::MIN + 1;

/// Which moves a node wants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenMode {
    All,
    /// Quiescence: captures and promotions.
    CapturesPromos,
    /// Quiescence at its first ply: also quiet checks that do not lose
    /// material.
    CapturesPromosChecks,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    TtMove,
    GenCaptures,
    GoodCaptures,
    EqualCaptures,
    GenQuiets,
    Killer1,
    Killer2,
    Quiets,
    BadCaptures,
    End,
}

/// Staged move picker for one node. Each phase generates and scores its
/// moves only when reached; buffers are reused between nodes.
pub struct MoveOrderer {
    phase: Phase,
    mode: GenMode,
    evasion: bool,
    tt_move: Move,
    killers: [Move; 2],
    found_killers: [Move; 2],
    good: Vec<(Move, i32)>,
    equal: Vec<(Move, i32)>,
    bad: Vec<(Move, i32)>,
    quiets: Vec<(Move, i32)>,
    scratch: Vec<Move>,
    last_move: Move,
    last_see: Option<i32>,
}

impl Default for MoveOrderer {
    fn default() -> Self { Self::new() }
}

impl MoveOrderer {
    pub fn new() -> Self {
        Self {
            phase: Phase::End,
            mode: GenMode::All,
            evasion: false,
            tt_move: Move::NONE,
            killers: [Move::NONE; 2],
            found_killers: [Move::NONE; 2],
            good: Vec::with_capacity(32),
            equal: Vec::with_capacity(16),
            bad: Vec::with_capacity(16),
            quiets: Vec::with_capacity(64),
            scratch: Vec::with_capacity(64),
            last_move: Move::NONE,
            last_see: None,
        }
    }

    /// Starts a new node. When the side to move is in check every evasion
    /// is enumerated regardless of `mode`.
    pub fn reset(&mut self, pos: &Position, tt_move: Move, killers: [Move; 2], mode: GenMode) {
        self.phase = Phase::TtMove;
        self.mode = mode;
        self.evasion = pos.in_check();
        self.tt_move = tt_move;
        self.killers = killers;
        self.found_killers = [Move::NONE; 2];
        self.good.clear();
        self.equal.clear();
        self.bad.clear();
        self.quiets.clear();
        self.last_move = Move::NONE;
        self.last_see = None;
    }

    pub fn phase(&self) -> Phase { self.phase }

    pub fn is_evasion(&self) -> bool { self.evasion }

    #[inline]
    fn full(&self) -> bool { self.mode == GenMode::All || self.evasion }

    /// SEE of the move most recently returned by [`next`](Self::next).
    pub fn last_move_see(&mut self, pos: &Position) -> i32 {
        if let Some(s) = self.last_see { return s; }
        let s = pos.see(self.last_move);
        self.last_see = Some(s);
        s
    }

    /// The next move to try, or `Move::NONE` when every phase is spent.
    pub fn next(&mut self, pos: &Position, history: &HistoryTable) -> Move {
        loop {
            match self.phase {
                Phase::TtMove => {
                    self.phase = Phase::GenCaptures;
                    let Some(m) = pos.pseudo_legal(self.tt_move) else {
                        self.tt_move = Move::NONE;
                        continue;
                    };
                    self.tt_move = m;
                    let see = if m.is_capture() || !self.full() { Some(pos.see(m)) } else { None };
                    if !self.full() {
                        let s = see.unwrap_or(0);
                        let wanted = m.promotion() == Some(Piece::Queen)
                            || (m.is_capture() && s >= 0)
                            || (self.mode == GenMode::CapturesPromosChecks && m.gives_check() && s >= 0);
                        if !wanted { continue; }
                    }
                    return self.yield_move(m, see);
                }
                Phase::GenCaptures => {
                    self.generate_captures(pos);
                    self.phase = Phase::GoodCaptures;
                }
                Phase::GoodCaptures => {
                    if let Some((m, _)) = pick_best(&mut self.good) { return self.yield_move(m, None); }
                    self.phase = Phase::EqualCaptures;
                }
                Phase::EqualCaptures => {
                    if let Some((m, _)) = pick_best(&mut self.equal) { return self.yield_move(m, Some(0)); }
                    self.phase = Phase::GenQuiets;
                }
                Phase::GenQuiets => {
                    if self.full() {
                        self.generate_quiets(pos, history);
                        self.phase = Phase::Killer1;
                    } else if self.mode == GenMode::CapturesPromosChecks {
                        self.generate_quiet_checks(pos);
                        self.phase = Phase::Quiets;
                    } else {
                        self.phase = Phase::End;
                    }
                }
                Phase::Killer1 => {
                    self.phase = Phase::Killer2;
                    if !self.found_killers[0].is_none() { return self.yield_move(self.found_killers[0], None); }
                }
                Phase::Killer2 => {
                    self.phase = Phase::Quiets;
                    if !self.found_killers[1].is_none() { return self.yield_move(self.found_killers[1], None); }
                }
                Phase::Quiets => {
                    if let Some((m, _)) = pick_best(&mut self.quiets) { return self.yield_move(m, None); }
                    self.phase = if self.full() { Phase::BadCaptures } else { Phase::End };
                }
                Phase::BadCaptures => {
                    if let Some((m, score)) = pick_best(&mut self.bad) {
                        let see = if score == UNDER_PROMOTION_SCORE { None } else { Some(score) };
                        return self.yield_move(m, see);
                    }
                    self.phase = Phase::End;
                }
                Phase::End => return Move::NONE,
            }
        }
    }

    fn yield_move(&mut self, m: Move, see: Option<i32>) -> Move {
        self.last_move = m;
        self.last_see = see;
        m
    }

    fn generate_captures(&mut self, pos: &Position) {
        self.scratch.clear();
        pos.generate(GenKind::Tactical, &mut self.scratch);
        for &m in &self.scratch {
            if m.same_as(self.tt_move) { continue; }
            let promotion = m.promotion();
            if matches!(promotion, Some(p) if p != Piece::Queen) {
                self.bad.push((m, UNDER_PROMOTION_SCORE));
                continue;
            }
            let victim = if m.is_en_passant() { Some(Piece::Pawn) } else { pos.piece_kind_at(m.to()) };
            let mut score = victim.map_or(0, |v| VICTIM[v.index()]) - AGGRESSOR[m.piece().index()];
            if promotion == Some(Piece::Queen) {
                score += QUEEN_PROMOTION_BONUS;
                self.good.push((m, score));
                continue;
            }
            let see = pos.see(m);
            if see > 0 {
                self.good.push((m, score));
            } else if see == 0 {
                self.equal.push((m, score));
            } else if self.full() {
                self.bad.push((m, see));
            }
        }
    }

    fn generate_quiets(&mut self, pos: &Position, history: &HistoryTable) {
        self.scratch.clear();
        pos.generate(GenKind::Quiet, &mut self.scratch);
        for &m in &self.scratch {
            if m.same_as(self.tt_move) { continue; }
            if let Some(k) = self.killers.iter().position(|&k| !k.is_none() && m.same_as(k)) {
                self.found_killers[k] = m;
                continue;
            }
            let score = if m.is_promotion() { UNDER_PROMOTION_SCORE } else { history.score(m) };
            self.quiets.push((m, score));
        }
    }

    fn generate_quiet_checks(&mut self, pos: &Position) {
        self.scratch.clear();
        pos.generate(GenKind::Quiet, &mut self.scratch);
        for &m in &self.scratch {
            if !m.gives_check() || m.is_promotion() || m.same_as(self.tt_move) { continue; }
            let see = pos.see(m);
            if see >= 0 { self.quiets.push((m, see)); }
        }
    }
}

// Removes and returns the highest-scored entry; ties keep generation order.
fn pick_best(list: &mut Vec<(Move, i32)>) -> Option<(Move, i32)> {
    let mut best = 0;
    for i in 1..list.len() {
        if list[i].1 > list[best].1 { best = i; }
    }
    if list.is_empty() { None } else { Some(list.remove(best)) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(pos: &Position, o: &mut MoveOrderer) -> Vec<Move> {
        let h = HistoryTable::new();
        let mut out = Vec::new();
        loop {
            let m = o.next(pos, &h);
            if m.is_none() { break; }
            out.push(m);
        }
        out
    }

    #[test]
    fn yields_every_pseudo_legal_move_once() {
        let mut p = Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1").unwrap();
        let mut all = Vec::new();
        p.generate(GenKind::All, &mut all);
        let tt = p.parse_move("e2a6");
        let mut o = MoveOrderer::new();
        o.reset(&p, tt, [Move::NONE; 2], GenMode::All);
        let got = drain(&p, &mut o);
        assert_eq!(got.len(), all.len());
        assert!(got[0].same_as(tt));
        for m in &all { assert_eq!(got.iter().filter(|g| g.same_as(*m)).count(), 1); }
    }

    #[test]
    fn quiescence_skips_quiets() {
        let p = Position::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let mut o = MoveOrderer::new();
        o.reset(&p, Move::NONE, [Move::NONE; 2], GenMode::CapturesPromos);
        let got = drain(&p, &mut o);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].to_uci(), "e4d5");
    }
}
