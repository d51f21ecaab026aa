use crate::board::movegen::GenKind;
use crate::board::{Move, Position};

// Make/unmake perft over pseudo-legal moves; apply_move rejects the illegal ones.
pub fn perft(pos: &mut Position, depth: u32) -> u64 {
    if depth == 0 { return 1; }
    let mut moves = Vec::with_capacity(64);
    pos.generate(GenKind::All, &mut moves);
    let mut nodes = 0u64;
    for m in moves {
        if pos.apply_move(m) {
            nodes += perft(pos, depth - 1);
            pos.undo_move();
        }
    }
    nodes
}

/// Per-root-move counts, in generation order.
pub fn divide(pos: &mut Position, depth: u32) -> Vec<(Move, u64)> {
    if depth == 0 { return Vec::new(); }
    pos.legal_moves()
        .into_iter()
        .map(|m| {
            pos.apply_move(m);
            let n = perft(pos, depth - 1);
            pos.undo_move();
            (m, n)
        })
        .collect()
}
