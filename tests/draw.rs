use kestrel::board::Position;

fn pos(fen: &str) -> Position { Position::from_fen(fen).unwrap() }

#[test]
fn insufficient_material() {
    assert!(pos("8/8/8/4k3/8/8/8/4K3 w - - 0 1").is_draw());
    assert!(pos("8/8/8/4k3/8/8/8/2B1K3 w - - 0 1").is_draw());
    assert!(pos("8/8/8/4k3/8/8/8/1N2K3 b - - 0 1").is_draw());
    assert!(pos("8/8/8/4k3/8/8/8/1N2KN2 w - - 0 1").is_draw());

    assert!(!pos("8/8/8/4k3/8/8/8/R3K3 w - - 0 1").is_draw());
    assert!(!pos("8/8/8/4k3/8/8/8/2B1KB2 w - - 0 1").is_draw());
    assert!(!pos("8/8/3n4/4k3/8/8/8/1N2KN2 w - - 0 1").is_draw());
    assert!(!pos("8/8/8/4k3/8/8/4P3/4K3 w - - 0 1").is_draw());
}

#[test]
fn fifty_move_rule() {
    assert!(pos("8/8/8/4k3/8/8/8/R3K3 w - - 100 80").is_draw());
    assert!(!pos("8/8/8/4k3/8/8/8/R3K3 w - - 99 80").is_draw());
}

#[test]
fn threefold_repetition() {
    let mut p = Position::startpos();
    let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
    for text in shuffle {
        let m = p.parse_move(text);
        assert!(p.apply_move(m));
        assert!(!p.is_draw());
    }
    for (i, text) in shuffle.iter().enumerate() {
        let m = p.parse_move(text);
        assert!(p.apply_move(m));
        assert_eq!(p.is_draw(), i == 3, "after {text}");
    }
}

#[test]
fn irreversible_move_breaks_repetition() {
    let mut p = Position::startpos();
    for text in ["g1f3", "g8f6", "f3g1", "f6g8", "e2e4", "e7e5", "g1f3", "g8f6", "f3g1", "f6g8"] {
        let m = p.parse_move(text);
        assert!(p.apply_move(m));
    }
    assert!(!p.is_draw());
}

#[test]
fn game_end_classification() {
    assert_eq!(pos("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").is_endgame(), 99);
    assert_eq!(pos("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1").is_endgame(), 1);
    assert_eq!(pos("6k1/8/8/8/8/8/5PPP/3r2K1 w - - 0 1").is_endgame(), -1);
    assert_eq!(pos("8/8/8/4k3/8/8/8/2B1K3 w - - 0 1").is_endgame(), 99);
    assert_eq!(Position::startpos().is_endgame(), 0);
}
