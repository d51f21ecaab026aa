use anyhow::Result;
use clap::Parser;
use kestrel::search::config::SearchConfig;
use kestrel::uci::UciEngine;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Kestrel UCI chess engine", long_about = None)]
struct Args {
    /// JSON file with engine settings; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Transposition table size in MB (overrides the config file)
    #[arg(long)]
    hash: Option<usize>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => SearchConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => SearchConfig::default(),
    };
    if let Some(mb) = args.hash { config.tt_mb = mb; }
    let mut engine = UciEngine::new(config);
    engine.run_loop();
    Ok(())
}
