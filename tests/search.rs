use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use kestrel::board::{Move, Position, START_FEN};
use kestrel::search::alphabeta::{SearchEngine, SearchResult};
use kestrel::search::config::SearchConfig;
use kestrel::search::info::{SearchInfo, SearchObserver};
use kestrel::search::limits::SearchLimits;
use kestrel::search::MATE_SCORE;

fn config() -> SearchConfig { SearchConfig { tt_mb: 4, use_book: false, seed: Some(7), ..SearchConfig::default() } }

fn search(fen: &str, limits: SearchLimits) -> SearchResult {
    let mut e = SearchEngine::new(config());
    e.set_position(Position::from_fen(fen).unwrap());
    e.go(limits)
}

#[test]
fn finds_back_rank_mate_in_one() {
    let r = search("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", SearchLimits::depth(3));
    assert_eq!(r.best_move.to_uci(), "a1a8");
    assert_eq!(r.score, MATE_SCORE - 1);
}

#[test]
fn finds_scholars_mate() {
    let r = search("r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4", SearchLimits::depth(4));
    assert_eq!(r.best_move.to_uci(), "h5f7");
    assert_eq!(r.score, MATE_SCORE - 1);
}

#[test]
fn rook_mate_in_two() {
    let r = search("7k/8/5K2/8/8/8/8/R7 w - - 0 1", SearchLimits::depth(5));
    assert_eq!(r.score, MATE_SCORE - 3);
    assert!(["f6g6", "f6f7"].contains(&r.best_move.to_uci().as_str()), "{}", r.best_move);
}

#[test]
fn takes_the_hanging_queen() {
    let r = search("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1", SearchLimits::depth(4));
    assert_eq!(r.best_move.to_uci(), "d1d5");
    assert!(r.score > 300);
}

#[test]
fn no_move_when_already_mated_or_stalemated() {
    let mated = search("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1", SearchLimits::depth(3));
    assert!(mated.best_move.is_none());
    assert_eq!(mated.score, -MATE_SCORE);

    let stalemate = search("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", SearchLimits::depth(3));
    assert!(stalemate.best_move.is_none());
}

#[test]
fn principal_variation_starts_with_best_move() {
    let r = search("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1", SearchLimits::depth(4));
    assert!(!r.best_move.is_none());
    assert_eq!(r.pv.first(), Some(&r.best_move));
    if r.pv.len() > 1 { assert_eq!(r.ponder_move, r.pv[1]); }

    let mut p = Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1").unwrap();
    for &m in &r.pv { assert!(p.apply_move(m), "pv move {m} should be legal"); }
}

#[test]
fn node_budget_is_respected() {
    let r = search("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1", SearchLimits::nodes(20_000));
    assert!(r.nodes <= 20_001, "searched {} nodes", r.nodes);
    assert!(!r.best_move.is_none());
}

#[test]
fn movetime_is_respected() {
    let t0 = Instant::now();
    let r = search("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1", SearchLimits::movetime(200));
    assert!(t0.elapsed() < Duration::from_secs(2));
    assert!(!r.best_move.is_none());
}

#[test]
fn opening_book_answers_the_start_position() {
    let mut e = SearchEngine::new(SearchConfig { use_book: true, tt_mb: 4, seed: Some(3), ..SearchConfig::default() });
    let r = e.go(SearchLimits::depth(8));
    assert!(["e2e4", "d2d4", "c2c4"].contains(&r.best_move.to_uci().as_str()));
    assert_eq!(r.nodes, 0);
}

#[test]
fn book_miss_is_remembered_when_the_game_is_replayed() {
    let mut e = SearchEngine::new(SearchConfig { use_book: true, tt_mb: 4, seed: Some(3), ..SearchConfig::default() });
    e.position_mut().set_game(START_FEN, &["a2a3"]).unwrap();
    assert!(e.go(SearchLimits::depth(2)).nodes > 0);
    assert_eq!(e.position().out_book_move(), Some(1));

    e.position_mut().set_game(START_FEN, &["a2a3", "e7e5", "b2b3"]).unwrap();
    assert_eq!(e.position().out_book_move(), Some(1));
    assert!(!e.position().is_using_book());
    assert!(e.go(SearchLimits::depth(2)).nodes > 0);
}

#[derive(Default)]
struct Recorder {
    infos: Vec<SearchInfo>,
    best: Option<(Move, Move)>,
}

struct Shared(Arc<Mutex<Recorder>>);

impl SearchObserver for Shared {
    fn info(&mut self, info: &SearchInfo) {
        if let Ok(mut r) = self.0.lock() { r.infos.push(info.clone()); }
    }

    fn best_move(&mut self, best: Move, ponder: Move) {
        if let Ok(mut r) = self.0.lock() { r.best = Some((best, ponder)); }
    }
}

#[test]
fn observer_sees_each_iteration_and_the_decision() {
    let rec = Arc::new(Mutex::new(Recorder::default()));
    let mut e = SearchEngine::new(config());
    e.set_observer(Some(Box::new(Shared(Arc::clone(&rec)))));
    let r = e.go(SearchLimits::depth(4));

    let rec = rec.lock().unwrap();
    let depths: Vec<u32> = rec.infos.iter().map(|i| i.depth).collect();
    assert_eq!(depths, vec![1, 2, 3, 4]);
    assert!(rec.infos.iter().all(|i| !i.pv.is_empty()));
    assert_eq!(rec.best.map(|(b, _)| b), Some(r.best_move));
}

#[test]
fn limited_strength_still_plays_legal_moves() {
    let mut cfg = config();
    cfg.set_elo(600);
    let mut e = SearchEngine::new(cfg);
    e.set_position(Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1").unwrap());
    let r = e.go(SearchLimits::depth(3));
    assert!(e.position_mut().is_move_legal(r.best_move));
}

#[test]
fn searches_continue_a_game() {
    let mut e = SearchEngine::new(config());
    for _ in 0..4 {
        let r = e.go(SearchLimits::depth(3));
        assert!(!r.best_move.is_none());
        assert!(e.position_mut().apply_move(r.best_move));
    }
    assert_eq!(e.position().game_moves().len(), 4);
}
