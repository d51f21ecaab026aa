use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kestrel::search::alphabeta::SearchEngine;
use kestrel::search::config::SearchConfig;
use kestrel::search::limits::SearchLimits;

fn bench_search(c: &mut Criterion) {
    let config = SearchConfig { tt_mb: 16, use_book: false, seed: Some(1), ..SearchConfig::default() };
    let mut engine = SearchEngine::new(config);
    c.bench_function("search_depth_5_startpos", |ben| {
        ben.iter(|| {
            engine.new_game();
            let r = engine.go(black_box(SearchLimits::depth(5)));
            black_box(r.nodes)
        })
    });

    c.bench_function("qsearch_kiwipete", |ben| {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        engine.new_game();
        let _ = engine.position_mut().set_fen(fen);
        ben.iter(|| black_box(engine.qsearch(0, -30_000, 30_000)))
    });
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
