use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::board::{Move, Piece, Position};
use crate::search::book::{Book, OpeningBook};
use crate::search::config::SearchConfig;
use crate::search::eval::{Evaluator, PieceSquareEvaluator};
use crate::search::history::{HistoryTable, Killers};
use crate::search::info::{SearchInfo, SearchObserver};
use crate::search::limits::SearchLimits;
use crate::search::movepick::{GenMode, MoveOrderer};
use crate::search::tt::{Bound, Entry, TranspositionCache, DEPTH_QS_CHECKS, DEPTH_QS_NO_CHECKS};
use crate::search::{KNOWN_WIN, MATE_SCORE, MATE_THRESHOLD, MAX_DEPTH, PLY};

const LMR_DEPTHS_NOT_REDUCED: i32 = 3 * PLY;
const RAZOR_DEPTH: i32 = 4 * PLY;
const RAZOR_MARGIN: i32 = 325;
const FUTILITY_MARGIN: i32 = 100;
const FUTILITY_MARGIN_AGGRESSIVE: i32 = 150;
const FUTILITY_MARGIN_QS: i32 = 80;
const IID_MARGIN: i32 = 300;
const SINGULAR_MARGIN: i32 = 50;
// Indexed by NodeKind
const IID_DEPTH: [i32; 3] = [5 * PLY, 5 * PLY, 8 * PLY];
const SINGULAR_DEPTH: [i32; 3] = [6 * PLY, 6 * PLY, 8 * PLY];
const ASPIRATION_WINDOWS: [i32; 6] = [10, 25, 150, 400, 550, 1025];
const PANIC_DROP: i32 = 100;
const POLL_MASK: u64 = 1023;
const MAX_PV: usize = 256;

// Futility values of captured pieces, by piece discriminant
const FUTILITY_PIECE: [i32; 7] = [0, 100, 325, 325, 500, 975, 0];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Root = 0,
    Pv = 1,
    Null = 2,
}

/// Raised when a stop request, the deadline or the node budget interrupts
/// the tree; the caller falls back to the best root move found so far.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchAborted;

/// Requests another thread makes of a running search. Raised flags stay
/// raised until [`SearchSignals::arm`], so a request sent just after a `go`
/// still reaches that search.
#[derive(Debug, Default)]
pub struct SearchSignals {
    stop: AtomicBool,
    ponderhit: AtomicBool,
}

impl SearchSignals {
    /// Makes the running (or next) search return its best move so far.
    pub fn stop(&self) { self.stop.store(true, Ordering::Relaxed); }

    /// The expected move was played: a ponder search switches to the clock.
    pub fn ponderhit(&self) { self.ponderhit.store(true, Ordering::Relaxed); }

    /// Clears both requests ahead of a new search.
    pub fn arm(&self) {
        self.stop.store(false, Ordering::Relaxed);
        self.ponderhit.store(false, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool { self.stop.load(Ordering::Relaxed) }

    fn take_ponderhit(&self) -> bool { self.ponderhit.swap(false, Ordering::Relaxed) }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Move,
    pub ponder_move: Move,
    pub score: i32,
    /// Last iteration started, in plies.
    pub depth: u32,
    pub nodes: u64,
    pub pv: Vec<Move>,
}

/// Per-ply node state, allocated once for the whole engine lifetime.
pub struct SearchFrame {
    pub current: Move,
    pub tt_move: Move,
    pub killers: Killers,
    pub static_eval: i32,
    pub orderer: MoveOrderer,
}

impl SearchFrame {
    fn new() -> Self {
        Self {
            current: Move::NONE,
            tt_move: Move::NONE,
            killers: Killers::default(),
            static_eval: -MATE_SCORE,
            orderer: MoveOrderer::new(),
        }
    }

    fn clear(&mut self) {
        self.current = Move::NONE;
        self.tt_move = Move::NONE;
        self.killers.clear();
        self.static_eval = -MATE_SCORE;
    }
}

/// Iterative-deepening principal variation search over one [`Position`].
pub struct SearchEngine {
    pos: Position,
    config: SearchConfig,
    tt: TranspositionCache,
    evaluator: Box<dyn Evaluator>,
    book: Option<Box<dyn Book>>,
    observer: Option<Box<dyn SearchObserver + Send>>,
    history: HistoryTable,
    frames: Vec<SearchFrame>,
    pv_reductions: Vec<[i32; 64]>,
    non_pv_reductions: Vec<[i32; 64]>,
    signals: Arc<SearchSignals>,
    rng: SmallRng,

    limits: SearchLimits,
    start: Instant,
    deadline: Option<Instant>,
    node_limit: u64,
    depth_limit: u32,
    nodes: u64,
    seldepth: usize,
    initial_ply: usize,
    depth: u32,
    root_score: i32,
    best_move: Move,
    best_score: i32,
    ponder_move: Move,
    pv: Vec<Move>,
    found_one_move: bool,
    panic: bool,
    engine_is_white: bool,
}

impl SearchEngine {
    pub fn new(config: SearchConfig) -> Self { Self::with_evaluator(config, Box::new(PieceSquareEvaluator)) }

    pub fn with_evaluator(config: SearchConfig, evaluator: Box<dyn Evaluator>) -> Self {
        let mut pv_reductions = vec![[0i32; 64]; 64];
        let mut non_pv_reductions = vec![[0i32; 64]; 64];
        for d in 1..64 {
            for m in 1..64 {
                let x = (d as f64).ln() * (m as f64).ln();
                let pv = 0.5 + x / 6.0;
                let non_pv = 0.5 + x / 3.0;
                pv_reductions[d][m] = if pv >= 1.0 { (pv * PLY as f64).floor() as i32 } else { 0 };
                non_pv_reductions[d][m] = if non_pv >= 1.0 { (non_pv * PLY as f64).floor() as i32 } else { 0 };
            }
        }
        let rng = match config.seed {
            Some(s) => SmallRng::seed_from_u64(s),
            None => SmallRng::from_entropy(),
        };
        let book: Option<Box<dyn Book>> = Some(Box::new(OpeningBook::builtin(config.seed)));
        Self {
            pos: Position::startpos(),
            tt: TranspositionCache::new(config.tt_mb),
            config,
            evaluator,
            book,
            observer: None,
            history: HistoryTable::new(),
            frames: (0..MAX_DEPTH).map(|_| SearchFrame::new()).collect(),
            pv_reductions,
            non_pv_reductions,
            signals: Arc::new(SearchSignals::default()),
            rng,
            limits: SearchLimits::default(),
            start: Instant::now(),
            deadline: None,
            node_limit: u64::MAX,
            depth_limit: MAX_DEPTH as u32,
            nodes: 0,
            seldepth: 0,
            initial_ply: 0,
            depth: 1,
            root_score: 0,
            best_move: Move::NONE,
            best_score: -MATE_SCORE,
            ponder_move: Move::NONE,
            pv: Vec::new(),
            found_one_move: false,
            panic: false,
            engine_is_white: true,
        }
    }

    pub fn position(&self) -> &Position { &self.pos }

    pub fn position_mut(&mut self) -> &mut Position { &mut self.pos }

    pub fn set_position(&mut self, pos: Position) { self.pos = pos; }

    pub fn config(&self) -> &SearchConfig { &self.config }

    pub fn set_config(&mut self, config: SearchConfig) {
        if config.tt_mb != self.config.tt_mb { self.tt.resize(config.tt_mb); }
        if config.seed != self.config.seed {
            if let Some(s) = config.seed { self.rng = SmallRng::seed_from_u64(s); }
        }
        self.config = config;
    }

    pub fn set_book(&mut self, book: Option<Box<dyn Book>>) { self.book = book; }

    pub fn set_observer(&mut self, observer: Option<Box<dyn SearchObserver + Send>>) { self.observer = observer; }

    pub fn tt(&self) -> &TranspositionCache { &self.tt }

    pub fn nodes(&self) -> u64 { self.nodes }

    /// Handle for steering a search from another thread. Whoever starts
    /// searches is responsible for calling `arm` before each one.
    pub fn signals(&self) -> Arc<SearchSignals> { Arc::clone(&self.signals) }

    /// Forgets everything learned from previous games.
    pub fn new_game(&mut self) {
        self.tt.clear();
        self.history.clear();
        self.frames.iter_mut().for_each(SearchFrame::clear);
        self.pos = Position::new(self.pos.shared_tables());
    }

    #[inline]
    fn ply(&self) -> usize { self.pos.move_number() - self.initial_ply }

    fn reduction(&self, kind: NodeKind, depth: i32, moves_done: usize) -> i32 {
        let d = ((depth / PLY) as usize).min(63);
        let m = moves_done.min(63);
        if kind == NodeKind::Null { self.non_pv_reductions[d][m] } else { self.pv_reductions[d][m] }
    }

    fn draw_score(&self, ply: usize) -> i32 {
        if ply & 1 == 0 { -self.config.contempt } else { self.config.contempt }
    }

    fn endgame_score(&self, ply: usize) -> i32 {
        if self.pos.in_check() { mated_in(ply) } else { self.draw_score(ply) }
    }

    fn tt_usable(&self, e: &Entry, depth: i32, alpha: i32, beta: i32) -> bool {
        e.gen == self.tt.generation() && e.cuts_off(depth, alpha, beta)
    }

    // Static eval, reusing the one cached with the position when present.
    fn static_eval(&mut self, entry: Option<Entry>, ply: usize) -> i32 {
        if let Some(e) = entry { return e.eval; }
        let eval = self.evaluator.evaluate(&self.pos);
        self.tt.store(&self.pos, Bound::Eval, 0, Move::NONE, 0, eval, ply, false);
        eval
    }

    fn check_limits(&mut self) -> Result<(), SearchAborted> {
        if self.nodes >= self.node_limit { return Err(SearchAborted); }
        if self.nodes & POLL_MASK == 0 {
            if self.signals.is_stopped() { return Err(SearchAborted); }
            self.poll_ponderhit();
            if self.deadline.map_or(false, |d| Instant::now() >= d) { return Err(SearchAborted); }
        }
        Ok(())
    }

    // A confirmed ponder search keeps its tree and start time but now runs
    // on the clock.
    fn poll_ponderhit(&mut self) {
        if self.limits.ponder && self.signals.take_ponderhit() {
            self.limits.ponder = false;
            self.set_limits(self.panic);
            debug!("ponderhit after {} ms, deadline {:?}", self.start.elapsed().as_millis(), self.deadline.map(|d| d - self.start));
        }
    }

    fn set_limits(&mut self, panic: bool) {
        self.node_limit = self.limits.nodes.unwrap_or(u64::MAX);
        self.depth_limit = self.limits.depth.unwrap_or(MAX_DEPTH as u32).clamp(1, MAX_DEPTH as u32);
        self.deadline = self.limits.move_time(self.engine_is_white, panic).map(|t| self.start + t);
    }

    /// Runs a full search from the current position and reports the result
    /// to the observer. The position is back at its starting ply afterwards.
    pub fn go(&mut self, limits: SearchLimits) -> SearchResult {
        self.limits = limits;
        let finished = self.prepare();
        if !finished {
            loop {
                match self.iterate() {
                    Ok(false) => self.depth += 1,
                    Ok(true) => break,
                    Err(SearchAborted) => {
                        debug!("search aborted at depth {}", self.depth);
                        break;
                    }
                }
            }
        }
        self.finish()
    }

    // Resets per-search state; true when the move is already decided.
    fn prepare(&mut self) -> bool {
        self.start = Instant::now();
        self.panic = false;
        self.engine_is_white = self.pos.is_white_to_move();
        self.set_limits(false);
        self.found_one_move = false;
        self.nodes = 0;
        self.seldepth = 0;
        self.best_move = Move::NONE;
        self.best_score = -MATE_SCORE;
        self.ponder_move = Move::NONE;
        self.pv.clear();
        self.initial_ply = self.pos.move_number();
        self.frames.iter_mut().for_each(SearchFrame::clear);
        self.depth = 1;
        info!("search start: {} ({:?})", self.pos.fen(), self.limits);

        if self.pos.legal_moves().is_empty() {
            self.best_score = self.endgame_score(0);
            return true;
        }

        if self.config.use_book && self.pos.is_using_book() {
            let knowledge = self.config.book_knowledge;
            if knowledge >= 100 || self.rng.gen_range(0..100) < knowledge {
                if let Some(book) = self.book.as_mut() {
                    match book.lookup(&mut self.pos) {
                        Some(m) => {
                            debug!("move {} found in book", m);
                            self.best_move = m;
                            self.best_score = 0;
                            self.pv = vec![m];
                            return true;
                        }
                        None => {
                            debug!("position out of book");
                            let ply = self.pos.move_number();
                            self.pos.set_out_book_move(ply);
                        }
                    }
                }
            }
        }

        let entry = self.tt.probe(&self.pos, 0, false);
        self.root_score = if self.pos.in_check() { 0 } else { self.static_eval(entry, 0) };
        self.tt.new_generation();
        false
    }

    // One iteration with aspiration windows; true when the search is done.
    fn iterate(&mut self) -> Result<bool, SearchAborted> {
        self.seldepth = 0;
        let initial = self.root_score;
        let previous = self.root_score;
        let mut fail_low = 0usize;
        let mut fail_high = 0usize;
        let (mut alpha, mut beta) = if self.config.aspiration {
            ((initial - ASPIRATION_WINDOWS[0]).max(-MATE_SCORE), (initial + ASPIRATION_WINDOWS[0]).min(MATE_SCORE))
        } else {
            (-MATE_SCORE - 1, MATE_SCORE + 1)
        };
        let t1 = Instant::now();

        loop {
            self.root_score = self.search(NodeKind::Root, self.depth as i32 * PLY, alpha, beta, false, Move::NONE)?;
            if self.root_score <= alpha {
                fail_low += 1;
                alpha = match ASPIRATION_WINDOWS.get(fail_low) {
                    Some(w) if initial - w > -MATE_SCORE => initial - w,
                    _ => -MATE_SCORE - 1,
                };
            } else if self.root_score >= beta {
                fail_high += 1;
                beta = match ASPIRATION_WINDOWS.get(fail_high) {
                    Some(w) if initial + w < MATE_SCORE => initial + w,
                    _ => MATE_SCORE + 1,
                };
            } else {
                break;
            }
        }

        let t2 = Instant::now();
        debug!(
            "depth {} score {} best {} nodes {} ({} fail low, {} fail high)",
            self.depth, self.root_score, self.best_move, self.nodes, fail_low, fail_high
        );
        if self.depth <= 6 {
            self.notify(self.best_move, self.best_score, alpha, beta);
        } else if !self.panic && self.root_score < previous - PANIC_DROP {
            debug!("score dropped from {} to {}, extending time", previous, self.root_score);
            self.panic = true;
            self.set_limits(true);
        }

        self.poll_ponderhit();
        let iteration = t2.duration_since(t1);
        let out_of_time = self.deadline.map_or(false, |d| t2 + iteration * 2 > d);
        Ok((self.limits.manage_time() && (self.root_score.abs() > MATE_THRESHOLD || out_of_time))
            || self.depth as usize >= MAX_DEPTH
            || self.depth >= self.depth_limit
            || self.root_score.abs() == MATE_SCORE
            || self.signals.is_stopped())
    }

    fn finish(&mut self) -> SearchResult {
        let initial = self.initial_ply;
        self.pos.undo_move_to(initial);
        if !self.best_move.is_none() && self.pv.first() != Some(&self.best_move) {
            self.pv = self.extract_pv(self.best_move);
        }
        self.ponder_move = self.pv.get(1).copied().unwrap_or(Move::NONE);
        info!(
            "search stop: best {} ponder {} score {} depth {} nodes {} in {} ms",
            self.best_move,
            self.ponder_move,
            self.best_score,
            self.depth,
            self.nodes,
            self.start.elapsed().as_millis()
        );
        if let Some(o) = self.observer.as_mut() {
            if !self.best_move.is_none() { o.best_move(self.best_move, self.ponder_move); }
        }
        SearchResult {
            best_move: self.best_move,
            ponder_move: self.ponder_move,
            score: self.best_score,
            depth: self.depth,
            nodes: self.nodes,
            pv: self.pv.clone(),
        }
    }

    fn notify(&mut self, m: Move, score: i32, alpha: i32, beta: i32) {
        self.pv = self.extract_pv(m);
        self.ponder_move = self.pv.get(1).copied().unwrap_or(Move::NONE);
        let elapsed = self.start.elapsed();
        let info = SearchInfo {
            depth: self.depth,
            seldepth: self.seldepth as u32,
            score,
            bound: if score <= alpha {
                Some(Bound::Upper)
            } else if score >= beta {
                Some(Bound::Lower)
            } else {
                None
            },
            nodes: self.nodes,
            time_ms: elapsed.as_millis() as u64,
            hashfull: self.tt.hash_full(),
            nps: nps(self.nodes, elapsed),
            pv: self.pv.clone(),
        };
        match self.observer.as_mut() {
            Some(o) => o.info(&info),
            None => debug!("info {}", info),
        }
    }

    /// Principal variation read back from the table, starting with `first`.
    pub fn extract_pv(&mut self, first: Move) -> Vec<Move> {
        let mut pv = Vec::new();
        if first.is_none() || !self.pos.apply_move(first) { return pv; }
        pv.push(first);
        let mut seen: Vec<u64> = Vec::new();
        while pv.len() < MAX_PV {
            let Some(e) = self.tt.probe(&self.pos, pv.len(), false) else { break };
            if e.mv.is_none() || seen.contains(&self.pos.key()) { break; }
            seen.push(self.pos.key());
            let Some(m) = self.pos.pseudo_legal(e.mv) else { break };
            if !self.pos.apply_move(m) { break; }
            pv.push(m);
            if matches!(self.pos.is_endgame(), 1 | -1) { break; }
        }
        for _ in 0..pv.len() { self.pos.undo_move(); }
        pv
    }

    fn search_or_qs(&mut self, kind: NodeKind, depth: i32, alpha: i32, beta: i32) -> Result<i32, SearchAborted> {
        if depth < PLY { self.qsearch(0, alpha, beta) } else { self.search(kind, depth, alpha, beta, true, Move::NONE) }
    }

    /// Quiescence: captures and promotions (plus checks at its first ply on
    /// PV nodes), with stand pat and futility pruning.
    pub fn qsearch(&mut self, qsdepth: u32, mut alpha: i32, mut beta: i32) -> Result<i32, SearchAborted> {
        self.nodes += 1;
        if self.found_one_move { self.check_limits()?; }
        let ply = self.ply();

        if self.pos.is_draw() { return Ok(self.draw_score(ply)); }

        alpha = alpha.max(mated_in(ply));
        beta = beta.min(mate_in(ply + 1));
        if alpha >= beta { return Ok(alpha); }

        let is_pv = beta - alpha > 1;
        let checks = is_pv && qsdepth == 0;
        let tt_depth = if checks { DEPTH_QS_CHECKS } else { DEPTH_QS_NO_CHECKS };

        let entry = self.tt.probe(&self.pos, ply, false);
        let mut tt_move = Move::NONE;
        if let Some(e) = entry {
            if !is_pv && self.tt_usable(&e, tt_depth, alpha, beta) { return Ok(e.score); }
            tt_move = e.mv;
        }

        let in_check = self.pos.in_check();
        let mut best_score = alpha;
        let mut best_move = Move::NONE;
        let mut static_eval = -MATE_SCORE;
        let mut eval = -MATE_SCORE;
        let mut futility_base = -MATE_SCORE;

        // Stand pat
        if !in_check {
            static_eval = self.static_eval(entry, ply);
            eval = entry.map_or(static_eval, |e| e.refine(static_eval));
            best_score = best_score.max(eval);
            if best_score >= beta {
                if entry.is_none() {
                    self.tt.store(&self.pos, Bound::Lower, DEPTH_QS_CHECKS, Move::NONE, best_score, static_eval, ply, false);
                }
                return Ok(best_score);
            }
            futility_base = eval + FUTILITY_MARGIN_QS;
        }

        if ply >= MAX_DEPTH - 1 { return Ok(if in_check { self.draw_score(ply) } else { eval }); }

        let mode = if checks { GenMode::CapturesPromosChecks } else { GenMode::CapturesPromos };
        self.frames[ply].orderer.reset(&self.pos, tt_move, [Move::NONE; 2], mode);
        let white = self.pos.is_white_to_move();
        let mut any_legal = false;

        loop {
            let m = self.frames[ply].orderer.next(&self.pos, &self.history);
            if m.is_none() { break; }

            if self.config.futility
                && !in_check
                && !is_pv
                && !m.gives_check()
                && !m.same_as(tt_move)
                && !m.is_pawn_push_678(white)
                && futility_base > -KNOWN_WIN
            {
                let victim = if m.is_en_passant() { Some(Piece::Pawn) } else { self.pos.piece_kind_at(m.to()) };
                let futility_value = futility_base + victim.map_or(0, |p| FUTILITY_PIECE[p.index()]);
                if futility_value < beta {
                    best_score = best_score.max(futility_value);
                    continue;
                }
                if futility_base < beta && self.frames[ply].orderer.last_move_see(&self.pos) <= 0 {
                    best_score = best_score.max(futility_base);
                    continue;
                }
            }

            if !self.pos.apply_move(m) { continue; }
            any_legal = true;
            let score = -self.qsearch(qsdepth + 1, -beta, -best_score)?;
            self.pos.undo_move();

            if score > best_score {
                best_score = score;
                best_move = m;
                if score >= beta { break; }
            }
        }

        if in_check && !any_legal { return Ok(mated_in(ply)); }
        self.tt.save(&self.pos, ply, tt_depth, best_move, best_score, alpha, beta, static_eval, false);
        Ok(best_score)
    }

    /// Root, PV and null-window search. `depth` is in [`PLY`] units;
    /// `excluded` skips one move for singular-extension verification.
    pub fn search(
        &mut self,
        kind: NodeKind,
        depth: i32,
        mut alpha: i32,
        mut beta: i32,
        allow_null: bool,
        excluded: Move,
    ) -> Result<i32, SearchAborted> {
        self.nodes += 1;
        if kind != NodeKind::Root && self.found_one_move { self.check_limits()?; }
        let ply = self.ply();
        if kind != NodeKind::Null && ply > self.seldepth { self.seldepth = ply; }

        if kind != NodeKind::Root && self.pos.is_draw() { return Ok(self.draw_score(ply)); }

        // Mate distance pruning
        alpha = alpha.max(mated_in(ply));
        beta = beta.min(mate_in(ply + 1));
        if alpha >= beta { return Ok(alpha); }

        let exclusion = !excluded.is_none();
        let entry = self.tt.probe(&self.pos, ply, exclusion);
        let mut tt_move = Move::NONE;
        if let Some(e) = entry {
            if kind != NodeKind::Root && self.tt_usable(&e, depth, alpha, beta) { return Ok(e.score); }
            tt_move = e.mv;
        }

        let in_check = self.pos.in_check();
        let us = self.pos.side_to_move();
        let mut mate_threat = false;
        let mut futility_prune = false;
        let mut futility_value = -MATE_SCORE;
        let mut static_eval = -MATE_SCORE;
        let mut eval = -MATE_SCORE;

        if !in_check {
            let eval_entry = if !exclusion || entry.is_some() { entry } else { self.tt.probe(&self.pos, ply, false) };
            static_eval = self.static_eval(eval_entry, ply);
            eval = entry.map_or(static_eval, |e| e.refine(static_eval));
        }

        if ply >= MAX_DEPTH - 1 { return Ok(if in_check { self.draw_score(ply) } else { eval }); }

        if !in_check {
            // Razoring
            if kind == NodeKind::Null
                && self.config.razoring
                && tt_move.is_none()
                && allow_null
                && depth < RAZOR_DEPTH
                && beta.abs() < MATE_THRESHOLD
                && eval + RAZOR_MARGIN < beta
                && !self.pos.has_pawn_on_seventh()
            {
                if depth <= PLY { return self.qsearch(0, alpha, beta); }
                let rbeta = beta - RAZOR_MARGIN;
                let v = self.qsearch(0, rbeta - 1, rbeta)?;
                if v < rbeta { return Ok(v); }
            }

            // Static null move
            if kind == NodeKind::Null
                && self.config.static_null_move
                && allow_null
                && depth < RAZOR_DEPTH
                && beta.abs() < MATE_THRESHOLD
                && eval.abs() < KNOWN_WIN
                && eval - FUTILITY_MARGIN >= beta
                && self.pos.has_non_pawn_material(us)
            {
                return Ok(eval - FUTILITY_MARGIN);
            }

            // Null move with verification and mate threat detection
            if kind == NodeKind::Null
                && self.config.null_move
                && allow_null
                && depth >= 2 * PLY
                && beta.abs() < MATE_THRESHOLD
                && eval >= beta
                && self.pos.has_non_pawn_material(us)
            {
                let r = 3 * PLY + depth / 4;
                self.pos.apply_move(Move::NULL);
                let score = if depth - r < PLY {
                    -self.qsearch(0, -beta, -beta + 1)?
                } else {
                    -self.search(NodeKind::Null, depth - r, -beta, -beta + 1, false, Move::NONE)?
                };
                self.pos.undo_move();

                if score >= beta {
                    let score = if score >= MATE_THRESHOLD { beta } else { score };
                    if depth < 12 * PLY {
                        return Ok(score);
                    }
                    let verified = if depth - r < PLY {
                        self.qsearch(0, beta - 1, beta)?
                    } else {
                        self.search(NodeKind::Null, depth - r, beta - 1, beta, false, Move::NONE)?
                    };
                    if verified >= beta { return Ok(score); }
                } else if score <= -MATE_THRESHOLD {
                    mate_threat = true;
                }
            }

            // Internal iterative deepening for an ordering move
            if self.config.iid
                && tt_move.is_none()
                && depth >= IID_DEPTH[kind as usize]
                && allow_null
                && (kind != NodeKind::Null || static_eval + IID_MARGIN > beta)
                && !exclusion
            {
                let d = if kind == NodeKind::Pv { depth - 2 * PLY } else { depth / 2 };
                self.search(kind, d, alpha, beta, false, Move::NONE)?;
                if let Some(e) = self.tt.probe(&self.pos, ply, false) { tt_move = e.mv; }
            }

            if kind == NodeKind::Null && self.config.futility {
                if depth <= PLY {
                    futility_value = static_eval + FUTILITY_MARGIN;
                    futility_prune = futility_value < beta;
                } else if depth <= 2 * PLY {
                    futility_value = static_eval + FUTILITY_MARGIN_AGGRESSIVE;
                    futility_prune = futility_value < beta;
                }
            }
        }

        // Singular extension: the stored fail-high move stands alone if
        // every sibling fails well below its score.
        let mut singular = false;
        if let Some(e) = entry {
            if kind != NodeKind::Root
                && self.config.singular_extension
                && !exclusion
                && !tt_move.is_none()
                && tt_move.same_as(e.mv)
                && depth >= SINGULAR_DEPTH[kind as usize]
                && e.bound == Bound::Lower
                && e.depth >= depth - 3 * PLY
                && e.score.abs() < KNOWN_WIN
            {
                if let Some(m) = self.pos.pseudo_legal(tt_move) {
                    let se_beta = e.score - SINGULAR_MARGIN;
                    let score = self.search(kind, depth / 2, se_beta - 1, se_beta, false, m)?;
                    singular = score < se_beta;
                }
            }
        }

        let killers = self.frames[ply].killers;
        self.frames[ply].tt_move = tt_move;
        self.frames[ply].static_eval = static_eval;
        self.frames[ply].orderer.reset(&self.pos, tt_move, killers.0, GenMode::All);
        let white = self.pos.is_white_to_move();

        let mut moves_done = 0usize;
        let mut any_move = false;
        let mut best_score = -MATE_SCORE;
        let mut best_move = Move::NONE;

        loop {
            let m = self.frames[ply].orderer.next(&self.pos, &self.history);
            if m.is_none() { break; }
            if m.same_as(excluded) { continue; }

            let mut extension = 0;
            if m.gives_check() && self.frames[ply].orderer.last_move_see(&self.pos) >= 0 { extension += PLY; }
            if mate_threat { extension += PLY; }
            if singular && m.same_as(tt_move) { extension += PLY; }
            let extension = extension.min(PLY);

            let important = kind == NodeKind::Root
                || extension != 0
                || self.frames[ply].orderer.is_evasion()
                || m.gives_check()
                || m.is_capture()
                || m.is_pawn_push_678(white)
                || m.is_castling()
                || m.same_as(tt_move)
                || killers.contains(m);

            if futility_prune && best_score > -KNOWN_WIN && !important {
                any_move = true;
                if futility_value <= alpha && futility_value > best_score { best_score = futility_value; }
                continue;
            }

            if !self.pos.apply_move(m) { continue; }
            any_move = true;
            moves_done += 1;
            self.frames[ply].current = m;

            let low = alpha.max(best_score);
            let new_depth = depth + extension - PLY;
            let score = if kind != NodeKind::Null && moves_done == 1 {
                -self.search_or_qs(NodeKind::Pv, new_depth, -beta, -low)?
            } else {
                let mut full = true;
                let mut score = -MATE_SCORE;
                if self.config.lmr && depth >= LMR_DEPTHS_NOT_REDUCED && !important {
                    let r = self.reduction(kind, depth, moves_done);
                    if r > 0 {
                        score = -self.search_or_qs(NodeKind::Null, depth - r - PLY, -low - 1, -low)?;
                        full = score > low;
                    }
                }
                if full {
                    score = -self.search_or_qs(NodeKind::Null, new_depth, -low - 1, -low)?;
                    if kind != NodeKind::Null && score > low && (kind == NodeKind::Root || score < beta) {
                        score = -self.search_or_qs(NodeKind::Pv, new_depth, -beta, -low)?;
                    }
                }
                score
            };
            self.pos.undo_move();

            if score > best_score
                && (kind != NodeKind::Root
                    || self.config.rand == 0
                    || best_score == -MATE_SCORE
                    || self.rng.gen_range(0..1000) >= self.config.rand)
            {
                best_move = m;
                best_score = score;
                if kind == NodeKind::Root {
                    self.best_move = m;
                    self.best_score = score;
                    self.found_one_move = true;
                    if depth > 6 * PLY { self.notify(m, score, alpha, beta); }
                }
            }

            if score >= beta { break; }
        }

        // Checkmate or stalemate
        if !exclusion && !any_move { best_score = self.endgame_score(ply); }
        if best_score == -MATE_SCORE { best_score = mated_in(ply); }

        if best_score >= beta && !exclusion && !best_move.is_none() {
            self.frames[ply].killers.push(best_move);
            self.history.record_cutoff(best_move);
        }

        self.tt.save(&self.pos, ply, depth, best_move, best_score, alpha, beta, static_eval, exclusion);
        Ok(best_score)
    }
}

#[inline]
fn mated_in(ply: usize) -> i32 { -MATE_SCORE + ply as i32 }

#[inline]
fn mate_in(ply: usize) -> i32 { MATE_SCORE - ply as i32 }

fn nps(nodes: u64, elapsed: Duration) -> u64 { nodes * 1000 / (elapsed.as_millis() as u64 + 1) }
