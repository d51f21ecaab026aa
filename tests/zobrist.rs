use kestrel::board::{Position, START_FEN};

fn play(p: &mut Position, moves: &str) {
    for text in moves.split_whitespace() {
        let m = p.parse_move(text);
        assert!(p.apply_move(m), "{text} should be legal in {}", p.fen());
    }
}

type Snapshot = ([u64; 8], u64, u32, [u64; 2]);

fn snapshot(p: &Position) -> Snapshot {
    (
        [p.white(), p.black(), p.pawns(), p.knights(), p.bishops(), p.rooks(), p.queens(), p.kings()],
        p.flags(),
        p.fifty(),
        p.key_words(),
    )
}

#[test]
fn incremental_keys_match_scratch_computation() {
    // En passant on f6, a promotion capturing on h8, black's king walk
    // dropping both rights, then white castling.
    let line = "e2e4 d7d5 e4e5 f7f5 e5f6 g8h6 f6g7 e8f7 g7h8q b8c6 g1f3 c8e6 f1c4 d5c4 e1g1";
    let mut p = Position::startpos();
    let mut before = Vec::new();
    for text in line.split_whitespace() {
        before.push((text, snapshot(&p)));
        let m = p.parse_move(text);
        assert!(p.apply_move(m), "{text} should be legal in {}", p.fen());
        assert_eq!(p.key_words(), p.compute_keys(), "after {text}");
    }
    assert_eq!(p.fen(), "r2q1b1Q/ppp1pk1p/2n1b2n/8/2p5/5N2/PPPP1PPP/RNBQ1RK1 b - - 1 8");
    while let Some((text, expected)) = before.pop() {
        p.undo_move();
        assert_eq!(snapshot(&p), expected, "undoing {text}");
        assert_eq!(p.key_words(), p.compute_keys(), "undoing {text}");
    }
    assert_eq!(p.fen(), START_FEN);
}

#[test]
fn transpositions_share_a_key() {
    let mut a = Position::startpos();
    let mut b = Position::startpos();
    play(&mut a, "g1f3 g8f6 e2e4");
    play(&mut b, "e2e4 g8f6 g1f3");
    assert_eq!(a.key(), b.key());
    assert_eq!(a.key2(), b.key2());
}

#[test]
fn unusable_en_passant_does_not_change_the_key() {
    let mut pushed = Position::startpos();
    play(&mut pushed, "e2e4");
    let loaded = Position::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1").unwrap();
    assert_eq!(pushed.key(), loaded.key());
    assert_eq!(pushed.en_passant_square(), None);
}

#[test]
fn side_castling_and_en_passant_change_the_key() {
    let white = Position::from_fen("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
    let black = Position::from_fen("4k3/8/8/8/8/8/8/R3K2R b KQ - 0 1").unwrap();
    let no_castle = Position::from_fen("4k3/8/8/8/8/8/8/R3K2R w - - 0 1").unwrap();
    assert_ne!(white.key(), black.key());
    assert_ne!(white.key(), no_castle.key());

    let with_ep = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").unwrap();
    let without_ep = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - - 0 2").unwrap();
    assert_eq!(with_ep.en_passant_square().map(kestrel::board::bitboard::square_name).as_deref(), Some("d6"));
    assert_ne!(with_ep.key(), without_ep.key());
}

#[test]
fn null_move_flips_side_only() {
    let mut p = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    let before = p.key();
    assert!(p.apply_move(kestrel::board::Move::NULL));
    assert_ne!(p.key(), before);
    assert_eq!(p.key_words(), p.compute_keys());
    p.undo_move();
    assert_eq!(p.key(), before);
}
