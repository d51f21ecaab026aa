use anyhow::{Context, Result};
use clap::Parser;
use kestrel::board::START_FEN;
use kestrel::search::alphabeta::SearchEngine;
use kestrel::search::config::SearchConfig;
use kestrel::search::limits::SearchLimits;
use std::time::Instant;

const BENCH_FENS: &[&str] = &[
    START_FEN,
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
    "6k1/5ppp/8/8/8/8/5PPP/3R2K1 w - - 0 1",
];

#[derive(Parser, Debug)]
#[command(name = "kestrel-bench", version, about = "Benchmark Kestrel search NPS")]
struct Args {
    /// FEN string or 'startpos'; defaults to the built-in suite
    #[arg(long)]
    fen: Option<String>,

    /// Movetime in milliseconds (ignored if depth is set)
    #[arg(long, default_value_t = 1000)]
    movetime: u64,

    /// Fixed search depth (overrides movetime when > 0)
    #[arg(long, default_value_t = 0)]
    depth: u32,

    /// Transposition table size in MB
    #[arg(long, default_value_t = 64)]
    hash_mb: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let fens: Vec<String> = match &args.fen {
        Some(f) if f == "startpos" => vec![START_FEN.to_string()],
        Some(f) => vec![f.clone()],
        None => BENCH_FENS.iter().map(|s| s.to_string()).collect(),
    };

    let config = SearchConfig { tt_mb: args.hash_mb, use_book: false, seed: Some(1), ..SearchConfig::default() };
    let mut engine = SearchEngine::new(config);
    let mut total_nodes = 0u64;
    let t0 = Instant::now();
    for fen in &fens {
        engine.new_game();
        engine.position_mut().set_fen(fen).with_context(|| format!("invalid FEN: {fen}"))?;
        let limits = if args.depth > 0 { SearchLimits::depth(args.depth) } else { SearchLimits::movetime(args.movetime) };
        let res = engine.go(limits);
        println!(
            "fen: {fen}\n  best={} score={} depth={} nodes={}",
            res.best_move, res.score, res.depth, res.nodes
        );
        total_nodes += res.nodes;
    }
    let dt = t0.elapsed().as_secs_f64();
    println!("total nodes={} elapsed={:.3}s nps={:.0}", total_nodes, dt, total_nodes as f64 / dt.max(f64::EPSILON));
    Ok(())
}
