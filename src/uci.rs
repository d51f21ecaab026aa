use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use log::warn;

use crate::search::alphabeta::SearchEngine;
use crate::search::config::SearchConfig;
use crate::search::limits::SearchLimits;
use crate::search::worker::{Command, Event, SearchWorker};

const POLL: Duration = Duration::from_millis(5);

/// Reads `go` arguments; unknown tokens are skipped.
pub fn parse_go(args: &str) -> SearchLimits {
    let mut limits = SearchLimits::default();
    let mut tokens = args.split_whitespace();
    while let Some(tok) = tokens.next() {
        let mut num = || tokens.next().and_then(|s| s.parse::<i64>().ok()).map(|v| v.max(0) as u64);
        match tok {
            "wtime" => limits.wtime = num(),
            "btime" => limits.btime = num(),
            "winc" => limits.winc = num(),
            "binc" => limits.binc = num(),
            "movestogo" => limits.movestogo = num(),
            "depth" => limits.depth = num().map(|d| d as u32),
            "nodes" => limits.nodes = num(),
            "movetime" => limits.movetime = num(),
            "infinite" => limits.infinite = true,
            "ponder" => limits.ponder = true,
            _ => {}
        }
    }
    limits
}

/// Reads `position` arguments into an optional FEN and the move list.
pub fn parse_position(args: &str) -> Option<(Option<String>, Vec<String>)> {
    let (setup, moves) = match args.split_once(" moves") {
        Some((s, m)) => (s.trim(), m.split_whitespace().map(String::from).collect()),
        None => (args.trim(), Vec::new()),
    };
    if setup == "startpos" {
        Some((None, moves))
    } else {
        setup.strip_prefix("fen ").map(|fen| (Some(fen.trim().to_string()), moves))
    }
}

pub struct UciEngine {
    worker: SearchWorker,
    config: SearchConfig,
}

impl Default for UciEngine {
    fn default() -> Self { Self::new(SearchConfig::default()) }
}

impl UciEngine {
    pub fn new(config: SearchConfig) -> Self {
        let worker = SearchWorker::spawn(SearchEngine::new(config.clone()));
        Self { worker, config }
    }

    fn cmd_uci(&self) {
        println!("id name Kestrel {}", env!("CARGO_PKG_VERSION"));
        println!("id author the Kestrel authors");
        println!("option name Hash type spin default {} min 1 max 16384", self.config.tt_mb);
        println!("option name Contempt type spin default {} min -300 max 300", self.config.contempt);
        println!("option name OwnBook type check default {}", self.config.use_book);
        println!("option name UCI_LimitStrength type check default false");
        println!("option name UCI_Elo type spin default 2100 min 500 max 2100");
        println!("uciok");
    }

    fn cmd_setoption(&mut self, args: &str) {
        let Some(rest) = args.strip_prefix("name ") else { return };
        let (name, value) = match rest.split_once(" value ") {
            Some((n, v)) => (n.trim(), v.trim()),
            None => (rest.trim(), ""),
        };
        match name.to_ascii_lowercase().as_str() {
            "hash" => match value.parse() {
                Ok(mb) => self.config.tt_mb = mb,
                Err(_) => warn!("bad Hash value: {}", value),
            },
            "contempt" => match value.parse() {
                Ok(c) => self.config.contempt = c,
                Err(_) => warn!("bad Contempt value: {}", value),
            },
            "ownbook" => self.config.use_book = value == "true",
            "uci_limitstrength" if value != "true" => self.config.rand = 0,
            "uci_limitstrength" => {}
            "uci_elo" => match value.parse() {
                Ok(elo) => self.config.set_elo(elo),
                Err(_) => warn!("bad UCI_Elo value: {}", value),
            },
            _ => {
                warn!("unknown option: {}", name);
                return;
            }
        }
        self.worker.send(Command::SetConfig(self.config.clone()));
    }

    fn cmd_position(&mut self, args: &str) {
        match parse_position(args) {
            Some((fen, moves)) => {
                self.worker.set_position(fen, moves);
            }
            None => warn!("malformed position command: {}", args),
        }
    }

    fn print_event(ev: Event) {
        match ev {
            Event::Info(info) => println!("info {}", info),
            Event::BestMove { best, ponder } if ponder.is_none() => println!("bestmove {}", uci_move(best)),
            Event::BestMove { best, ponder } => println!("bestmove {} ponder {}", uci_move(best), ponder),
        }
        let _ = io::stdout().flush();
    }

    // Handles one line; false on quit.
    fn handle(&mut self, line: &str) -> bool {
        let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
        match cmd {
            "uci" => self.cmd_uci(),
            "isready" => println!("readyok"),
            "ucinewgame" => {
                self.worker.send(Command::NewGame);
            }
            "setoption" => self.cmd_setoption(rest),
            "position" => self.cmd_position(rest),
            "go" => {
                self.worker.go(parse_go(rest));
            }
            "stop" => self.worker.stop(),
            "ponderhit" => self.worker.ponderhit(),
            "quit" => return false,
            _ => warn!("unknown command: {}", line),
        }
        let _ = io::stdout().flush();
        true
    }

    pub fn run_loop(&mut self) {
        let (tx, lines) = mpsc::channel::<String>();
        thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() { break; }
            }
        });
        loop {
            while let Ok(ev) = self.worker.events().try_recv() { Self::print_event(ev); }
            match lines.recv_timeout(POLL) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() && !self.handle(line) { break; }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.worker.stop();
    }
}

fn uci_move(m: crate::board::Move) -> String { if m.is_none() { "0000".to_string() } else { m.to_uci() } }
