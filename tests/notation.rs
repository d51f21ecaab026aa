use kestrel::board::{MoveParseError, Position};
use pretty_assertions::assert_eq;

fn san(fen: &str, mv: &str) -> String {
    let mut p = Position::from_fen(fen).unwrap();
    let m = p.parse_move(mv);
    assert!(!m.is_none(), "{mv} should parse in {fen}");
    p.to_san(m)
}

#[test]
fn san_disambiguates_by_file_then_rank() {
    assert_eq!(san("4k3/8/8/8/8/8/4K3/R6R w - - 0 1", "a1d1"), "Rad1");
    assert_eq!(san("4k3/8/8/8/R7/8/8/R3K3 w - - 0 1", "a1a2"), "R1a2");
    assert_eq!(san("4k3/8/8/8/8/2N1N3/8/4K3 w - - 0 1", "c3d5"), "Ncd5");
}

#[test]
fn san_promotions_checks_and_mates() {
    assert_eq!(san("8/4P1k1/8/8/8/8/8/4K3 w - - 0 1", "e7e8q"), "e8=Q");
    assert_eq!(san("8/4P1k1/8/8/8/8/8/4K3 w - - 0 1", "e7e8n"), "e8=N+");
    assert_eq!(san("4k3/8/8/8/8/8/8/R3K3 w - - 0 1", "a1a8"), "Ra8+");
    assert_eq!(san("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", "a1a8"), "Ra8#");
    assert_eq!(san("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2", "e5d6"), "exd6");
}

#[test]
fn parses_san_variants() {
    let mut p = Position::from_fen("8/4P1k1/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    assert_eq!(p.parse_move("e8=Q").to_uci(), "e7e8q");
    assert_eq!(p.parse_move("e8Q").to_uci(), "e7e8q");
    assert_eq!(p.parse_move("e8").to_uci(), "e7e8q");
    assert_eq!(p.parse_move("e8=R+").to_uci(), "e7e8r");

    let mut p = Position::from_fen("4k3/8/8/8/8/2N1N3/8/4K3 w - - 0 1").unwrap();
    assert_eq!(p.parse_move("Ncd5").to_uci(), "c3d5");
    assert_eq!(p.parse_move("Ne3d5").to_uci(), "e3d5");
}

#[test]
fn parse_errors_are_typed() {
    let mut p = Position::startpos();
    assert!(matches!(p.try_parse_move("e5"), Err(MoveParseError::Illegal(_))));
    assert!(matches!(p.try_parse_move("e2e5"), Err(MoveParseError::Illegal(_))));
    assert!(matches!(p.try_parse_move("!"), Err(MoveParseError::Malformed(_))));
}

#[test]
fn game_record_in_san() {
    let mut p = Position::startpos();
    for text in ["e4", "e5", "Nf3", "Nc6", "Bb5", "a6", "O-O"] {
        let m = p.parse_move(text);
        assert!(p.apply_move(m), "{text}");
    }
    assert_eq!(p.moves_san(), vec!["e4", "e5", "Nf3", "Nc6", "Bb5", "a6", "O-O"]);
    assert_eq!(p.moves_uci(), "e2e4 e7e5 g1f3 b8c6 f1b5 a7a6 e1g1");
}
