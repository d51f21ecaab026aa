//! A search engine running on its own thread, driven over channels.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, warn};

use crate::board::{Move, START_FEN};
use crate::search::alphabeta::{SearchEngine, SearchSignals};
use crate::search::config::SearchConfig;
use crate::search::info::{SearchInfo, SearchObserver};
use crate::search::limits::SearchLimits;

#[derive(Debug, Clone)]
pub enum Command {
    Go(SearchLimits),
    /// `fen: None` is the standard start position; `moves` are UCI or SAN.
    SetPosition { fen: Option<String>, moves: Vec<String> },
    SetConfig(SearchConfig),
    NewGame,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Info(SearchInfo),
    /// `best` is `Move::NONE` when the position has no legal move.
    BestMove { best: Move, ponder: Move },
}

struct ChannelObserver(Sender<Event>);

impl SearchObserver for ChannelObserver {
    fn info(&mut self, info: &SearchInfo) { let _ = self.0.send(Event::Info(info.clone())); }

    fn best_move(&mut self, best: Move, ponder: Move) { let _ = self.0.send(Event::BestMove { best, ponder }); }
}

pub struct SearchWorker {
    commands: Sender<Command>,
    events: Receiver<Event>,
    signals: Arc<SearchSignals>,
    handle: Option<JoinHandle<()>>,
}

impl SearchWorker {
    /// Moves `engine` onto a new thread that serves commands until `Quit`
    /// or until the worker is dropped.
    pub fn spawn(mut engine: SearchEngine) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (ev_tx, ev_rx) = mpsc::channel::<Event>();
        let signals = engine.signals();
        engine.set_observer(Some(Box::new(ChannelObserver(ev_tx.clone()))));
        let handle = thread::spawn(move || serve(engine, cmd_rx, ev_tx));
        Self { commands: cmd_tx, events: ev_rx, signals, handle: Some(handle) }
    }

    /// False once the worker thread has exited.
    pub fn send(&self, cmd: Command) -> bool { self.commands.send(cmd).is_ok() }

    /// Queues a search. Stop and ponderhit requests made after this call
    /// apply to it even if the thread has not picked it up yet.
    pub fn go(&self, limits: SearchLimits) -> bool {
        self.signals.arm();
        self.send(Command::Go(limits))
    }

    pub fn set_position(&self, fen: Option<String>, moves: Vec<String>) -> bool {
        self.send(Command::SetPosition { fen, moves })
    }

    /// Asks a running search to return its best move now.
    pub fn stop(&self) { self.signals.stop(); }

    /// Turns a running ponder search into a normal timed one.
    pub fn ponderhit(&self) { self.signals.ponderhit(); }

    pub fn events(&self) -> &Receiver<Event> { &self.events }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<Event> {
        match self.events.recv_timeout(timeout) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Blocks until the next best move, discarding progress events.
    pub fn wait_best_move(&self, timeout: Duration) -> Option<(Move, Move)> {
        loop {
            match self.recv_timeout(timeout)? {
                Event::BestMove { best, ponder } => return Some((best, ponder)),
                Event::Info(_) => {}
            }
        }
    }

    pub fn quit(mut self) { self.shutdown(); }

    fn shutdown(&mut self) {
        self.stop();
        let _ = self.commands.send(Command::Quit);
        if let Some(h) = self.handle.take() {
            if h.join().is_err() { warn!("search thread panicked"); }
        }
    }
}

impl Drop for SearchWorker {
    fn drop(&mut self) { self.shutdown(); }
}

fn serve(mut engine: SearchEngine, commands: Receiver<Command>, events: Sender<Event>) {
    while let Ok(cmd) = commands.recv() {
        match cmd {
            Command::Go(limits) => {
                let result = engine.go(limits);
                if result.best_move.is_none() {
                    let _ = events.send(Event::BestMove { best: Move::NONE, ponder: Move::NONE });
                }
            }
            Command::SetPosition { fen, moves } => {
                if let Err(e) = engine.position_mut().set_game(fen.as_deref().unwrap_or(START_FEN), moves.as_slice()) {
                    warn!("rejected position: {}", e);
                }
            }
            Command::SetConfig(config) => engine.set_config(config),
            Command::NewGame => engine.new_game(),
            Command::Quit => break,
        }
    }
    debug!("search thread exiting");
}
