use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kestrel::board::Position;
use kestrel::perft::perft;

fn bench_perft(c: &mut Criterion) {
    let mut start = Position::startpos();
    c.bench_function("perft_4_startpos", |ben| ben.iter(|| perft(black_box(&mut start), 4)));

    let mut kiwi = Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
        .expect("valid FEN");
    c.bench_function("perft_3_kiwipete", |ben| ben.iter(|| perft(black_box(&mut kiwi), 3)));
}

criterion_group!(benches, bench_perft);
criterion_main!(benches);
