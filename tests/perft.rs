use kestrel::board::Position;
use kestrel::perft::{divide, perft};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const ENDGAME: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
const PROMOTIONS: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";

fn cozy_perft(board: &cozy_chess::Board, depth: u32) -> u64 {
    if depth == 0 { return 1; }
    let mut nodes = 0u64;
    board.generate_moves(|moves| {
        for m in moves {
            let mut child = board.clone();
            child.play(m);
            nodes += cozy_perft(&child, depth - 1);
        }
        false
    });
    nodes
}

#[test]
fn perft_startpos_small_depths() {
    let mut p = Position::startpos();
    assert_eq!(perft(&mut p, 1), 20);
    assert_eq!(perft(&mut p, 2), 400);
    assert_eq!(perft(&mut p, 3), 8902);
    assert_eq!(perft(&mut p, 4), 197281);
}

#[test]
fn perft_kiwipete() {
    let mut p = Position::from_fen(KIWIPETE).unwrap();
    assert_eq!(perft(&mut p, 1), 48);
    assert_eq!(perft(&mut p, 2), 2039);
    assert_eq!(perft(&mut p, 3), 97862);
}

#[test]
fn perft_rook_endgame() {
    let mut p = Position::from_fen(ENDGAME).unwrap();
    assert_eq!(perft(&mut p, 1), 14);
    assert_eq!(perft(&mut p, 2), 191);
    assert_eq!(perft(&mut p, 3), 2812);
    assert_eq!(perft(&mut p, 4), 43238);
}

#[test]
fn perft_promotions_and_castling() {
    let mut p = Position::from_fen(PROMOTIONS).unwrap();
    assert_eq!(perft(&mut p, 1), 6);
    assert_eq!(perft(&mut p, 2), 264);
    assert_eq!(perft(&mut p, 3), 9467);
}

#[test]
fn perft_agrees_with_reference_generator() {
    let fens = [
        KIWIPETE,
        ENDGAME,
        PROMOTIONS,
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
        "8/8/8/2k5/3Pp3/8/8/4K3 b - d3 0 1",
    ];
    for fen in fens {
        let mut p = Position::from_fen(fen).unwrap();
        let reference = cozy_chess::Board::from_fen(fen, false).unwrap();
        assert_eq!(perft(&mut p, 3), cozy_perft(&reference, 3), "{fen}");
    }
}

#[test]
fn divide_sums_to_perft_and_restores_position() {
    let mut p = Position::from_fen(KIWIPETE).unwrap();
    let fen = p.fen();
    let split = divide(&mut p, 2);
    assert_eq!(split.len(), 48);
    assert_eq!(split.iter().map(|(_, n)| n).sum::<u64>(), 2039);
    assert_eq!(p.fen(), fen);
}
