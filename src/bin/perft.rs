use anyhow::{Context, Result};
use kestrel::board::{Position, START_FEN};
use kestrel::perft::{divide, perft};

#[derive(clap::Parser, Debug)]
#[command(name = "perft", about = "Perft driver for Kestrel")]
struct Args {
    /// Search depth
    #[arg(value_name = "DEPTH")]
    depth: u32,
    /// FEN string or "startpos"
    #[arg(value_name = "FEN", default_value = "startpos")]
    fen: String,
    /// Number of threads for root-split
    #[arg(long, default_value_t = 1)]
    threads: usize,
    /// Print the node count under each root move
    #[arg(long, default_value_t = false)]
    divide: bool,
    /// Report elapsed time and NPS
    #[arg(long, default_value_t = false)]
    nps: bool,
}

fn main() -> Result<()> {
    use clap::Parser;
    use rayon::prelude::*;
    use std::time::Instant;

    env_logger::init();
    let args = Args::parse();
    let fen = if args.fen == "startpos" { START_FEN } else { args.fen.as_str() };
    let mut base = Position::from_fen(fen).with_context(|| format!("invalid FEN: {fen}"))?;

    if args.divide {
        let mut total = 0u64;
        for (m, n) in divide(&mut base, args.depth) {
            println!("{m}: {n}");
            total += n;
        }
        println!("nodes: {total}");
        return Ok(());
    }

    let pool = rayon::ThreadPoolBuilder::new().num_threads(args.threads.max(1)).build()?;
    let depth = args.depth;
    let (nodes, dt) = pool.install(|| {
        let t0 = Instant::now();
        let nodes = if args.threads <= 1 || depth == 0 {
            perft(&mut base, depth)
        } else {
            let root_moves = base.legal_moves();
            root_moves
                .par_iter()
                .map(|&mv| {
                    let mut p = base.clone();
                    p.apply_move(mv);
                    perft(&mut p, depth - 1)
                })
                .sum()
        };
        (nodes, t0.elapsed().as_secs_f64())
    });

    if args.nps { println!("nodes: {nodes} elapsed: {:.3}s nps: {:.1}", dt, nodes as f64 / dt.max(f64::EPSILON)); }
    else { println!("nodes: {nodes}"); }
    Ok(())
}
