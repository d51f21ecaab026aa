use kestrel::board::Position;

fn see_of(fen: &str, mv: &str) -> i32 {
    let mut p = Position::from_fen(fen).unwrap();
    let m = p.parse_move(mv);
    assert!(!m.is_none(), "{mv} should be legal in {fen}");
    p.see(m)
}

#[test]
fn rook_takes_pawn_defended_by_king() {
    assert!(see_of("6k1/2R4p/6p1/8/6K1/6P1/8/8 w - - 3 38", "c7h7") < 0);
}

#[test]
fn bishop_wins_hanging_queen() {
    assert!(see_of("4k3/8/8/8/5Q2/8/8/2b4K b - - 0 1", "c1f4") > 400);
}

#[test]
fn queen_takes_pawn_defended_by_pawn() {
    assert_eq!(see_of("4k3/1p6/p7/8/8/8/8/Q3K3 w - - 0 1", "a1a6"), 100 - 900);
}

#[test]
fn battery_behind_the_first_attacker_counts() {
    // Rxd5 exd5 Rxd5 nets a pawn minus the exchange.
    assert_eq!(see_of("4k3/8/4p3/3p4/8/8/3R4/3RK3 w - - 0 1", "d2d5"), -300);
}

#[test]
fn en_passant_and_quiet_moves() {
    assert_eq!(see_of("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2", "e5d6"), 100);
    assert_eq!(see_of("4k3/8/8/8/8/8/8/R3K3 w - - 0 1", "a1a5"), 0);
}

#[test]
fn quiet_move_onto_attacked_square_loses_the_piece() {
    assert_eq!(see_of("4k3/8/8/3p4/8/8/8/1N2K3 w - - 0 1", "b1c3"), 0);
    // Now a pawn on d4 can take the knight on c3.
    assert!(see_of("4k3/8/8/8/3p4/8/8/1N2K3 w - - 0 1", "b1c3") < 0);
}
