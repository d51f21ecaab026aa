use std::thread;
use std::time::{Duration, Instant};

use kestrel::search::alphabeta::SearchEngine;
use kestrel::search::config::SearchConfig;
use kestrel::search::limits::SearchLimits;
use kestrel::search::worker::{Command, Event, SearchWorker};
use kestrel::uci::{parse_go, parse_position};

const WAIT: Duration = Duration::from_secs(30);

fn worker() -> SearchWorker {
    SearchWorker::spawn(SearchEngine::new(SearchConfig { tt_mb: 4, use_book: false, seed: Some(5), ..SearchConfig::default() }))
}

#[test]
fn position_then_go_reports_a_mate() {
    let w = worker();
    let (fen, moves) = parse_position("fen 6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
    assert!(w.set_position(fen, moves));
    assert!(w.go(parse_go("depth 3")));

    let mut infos = 0;
    let best = loop {
        match w.recv_timeout(WAIT).expect("worker answers") {
            Event::Info(info) => {
                infos += 1;
                assert!(info.depth >= 1);
            }
            Event::BestMove { best, .. } => break best,
        }
    };
    assert!(infos > 0);
    assert_eq!(best.to_uci(), "a1a8");
    w.quit();
}

#[test]
fn moves_after_startpos_are_applied() {
    let w = worker();
    let (fen, moves) = parse_position("startpos moves e2e4 e7e5 g1f3 b8c6 f1c4 g8f6 f3g5 d7d5 e4d5").unwrap();
    w.set_position(fen, moves);
    w.go(SearchLimits::depth(3));
    let (best, _) = w.wait_best_move(WAIT).unwrap();
    assert!(!best.is_none());
    // Black to move after exd5: the reply must be a black piece's move.
    let from_rank = best.to_uci().as_bytes()[1];
    assert!(from_rank >= b'5', "{best}");
    w.quit();
}

#[test]
fn mated_position_answers_null_move() {
    let w = worker();
    w.set_position(Some("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1".to_string()), vec![]);
    w.go(SearchLimits::depth(2));
    let (best, ponder) = w.wait_best_move(WAIT).unwrap();
    assert!(best.is_none());
    assert!(ponder.is_none());
    w.quit();
}

#[test]
fn commands_after_reconfiguration_still_work() {
    let w = worker();
    let mut cfg = SearchConfig { tt_mb: 2, use_book: false, ..SearchConfig::default() };
    cfg.set_elo(1500);
    assert!(w.send(Command::SetConfig(cfg)));
    assert!(w.send(Command::NewGame));
    w.go(SearchLimits::depth(2));
    let (best, _) = w.wait_best_move(WAIT).unwrap();
    assert!(!best.is_none());
}

#[test]
fn ponder_search_runs_on_the_clock_after_ponderhit() {
    let w = worker();
    w.set_position(None, vec!["e2e4".to_string()]);
    // 20s / 40 moves: half a second once the ponder move is confirmed.
    assert!(w.go(parse_go("ponder wtime 20000 btime 20000")));

    thread::sleep(Duration::from_millis(700));
    while let Ok(ev) = w.events().try_recv() {
        assert!(!matches!(ev, Event::BestMove { .. }), "ponder search ended on its own");
    }

    let hit = Instant::now();
    w.ponderhit();
    let (best, _) = w.wait_best_move(WAIT).unwrap();
    assert!(!best.is_none());
    assert!(hit.elapsed() < Duration::from_secs(3), "{:?}", hit.elapsed());
    w.quit();
}

#[test]
fn ponderhit_is_ignored_by_a_normal_search() {
    let w = worker();
    assert!(w.go(SearchLimits::depth(4)));
    w.ponderhit();
    let (best, _) = w.wait_best_move(WAIT).unwrap();
    assert!(!best.is_none());
    w.quit();
}
