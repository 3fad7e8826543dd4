use pgn_tree::{read_game, read_games, Config};

fn mainline_sans(game: &pgn_tree::Game) -> Vec<String> {
    game.mainline().filter_map(|node| node.san()).collect()
}

#[test]
fn test_round_trip_preserves_mainline() {
    for pgn in [
        "[Event \"T\"]\n\n1. e4 e5 2. Nf3 Nc6 3. Bb5 1-0",
        "1. e4 e5 (1... c5 2. Nf3 (2. d4 cxd4) d6) 2. Nf3 Nc6 *",
        "1. d4 {queen pawn} d5 2. c4! dxc4?? 3. Nf3 1/2-1/2",
        "1. f3 e5 2. g4 Qh4# 0-1",
    ] {
        let game = read_game(pgn).expect("valid pgn");
        let exported = game.to_pgn();
        let reread = read_game(&exported).expect("own output reads back");
        assert_eq!(mainline_sans(&reread), mainline_sans(&game), "for {:?}", pgn);
        assert!(reread.errors().is_empty());
    }
}

#[test]
fn test_round_trip_preserves_variations() {
    let game = read_game("1. e4 e5 (1... c5) (1... e6 2. d4) 2. Nf3 *").expect("valid pgn");
    let reread = read_game(&game.to_pgn()).expect("own output reads back");

    let e4 = reread.root().next().expect("e4");
    let sans: Vec<String> = e4.variations().iter().filter_map(|v| v.san()).collect();
    assert_eq!(sans, ["e5", "c5", "e6"]);
    assert_eq!(
        e4.variations()[2].next().and_then(|n| n.san()),
        Some("d4".to_owned())
    );
}

#[test]
fn test_round_trip_preserves_annotations() {
    let pgn = "1. e4 {[%clk 0:03:00] [%eval 0.33] sharp} e5 {[%cal Gg8f6]} *";
    let game = read_game(pgn).expect("valid pgn");
    let reread = read_game(&game.to_pgn()).expect("own output reads back");

    let e4 = reread.root().next().expect("e4");
    assert_eq!(e4.clock(), Some(180.0));
    assert_eq!(e4.eval(), Some(0.33));
    assert_eq!(e4.comment().as_deref(), Some("sharp"));

    let e5 = e4.next().expect("e5");
    assert_eq!(e5.arrows().len(), 1);
}

#[test]
fn test_round_trip_preserves_headers_and_fen() {
    let pgn = "[Event \"Odds game\"]\n\
               [FEN \"r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3\"]\n\n\
               3. Bb5 a6 4. Ba4 Nf6 *";
    let game = read_game(pgn).expect("valid pgn");
    let reread = read_game(&game.to_pgn()).expect("own output reads back");

    assert_eq!(reread.headers().event(), Some("Odds game"));
    assert_eq!(
        reread.headers().fen(),
        Some("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3")
    );
    assert_eq!(mainline_sans(&reread), ["Bb5", "a6", "Ba4", "Nf6"]);
    assert_eq!(reread.starting_board().fullmoves(), 3);
}

#[test]
fn test_round_trip_of_concatenated_games() {
    let pgn = "[Event \"One\"]\n\n1. e4 e5 1-0\n\n[Event \"Two\"]\n\n1. d4 d5 0-1\n";
    let games = read_games(pgn);
    assert_eq!(games.len(), 2);

    let concatenated = games
        .iter()
        .map(|game| game.to_pgn())
        .collect::<Vec<_>>()
        .join("\n\n");
    let reread = read_games(&concatenated);

    assert_eq!(reread.len(), 2);
    assert_eq!(reread[0].headers().event(), Some("One"));
    assert_eq!(reread[1].headers().event(), Some("Two"));
    assert_eq!(mainline_sans(&reread[1]), ["d4", "d5"]);
}

#[test]
fn test_escaped_tag_values_round_trip() {
    let mut game = pgn_tree::Game::new();
    game.set_header("Event", "An \"odd\" \\ name");

    let reread = read_game(&game.to_pgn()).expect("own output reads back");
    assert_eq!(reread.headers().event(), Some("An \"odd\" \\ name"));
}

#[test]
fn test_starting_comment_round_trip() {
    let game = read_game("1. e4 e5 ({The Sicilian} 1... c5) *").expect("valid pgn");
    let reread = read_game(&game.to_pgn()).expect("own output reads back");

    let e4 = reread.root().next().expect("e4");
    let c5 = e4.variations()[1].clone();
    assert_eq!(c5.starting_comment().as_deref(), Some("The Sicilian"));
}

#[test]
fn test_game_comment_round_trip() {
    let game = read_game("{Annotated by hand} 1. e4 *").expect("valid pgn");
    let reread = read_game(&game.to_pgn()).expect("own output reads back");
    assert_eq!(reread.root().comment().as_deref(), Some("Annotated by hand"));
}

#[test]
fn test_column_wrapping_breaks_at_whitespace() {
    let game = read_game(
        "1. e4 c5 2. Nf3 d6 3. d4 cxd4 4. Nxd4 Nf6 5. Nc3 a6 6. Be2 e5 7. Nb3 Be7 \
         8. O-O O-O 9. Kh1 Qc7 10. a4 b6 11. Be3 Bb7 12. f3 Nbd7 *",
    )
    .expect("valid pgn");

    let movetext = game.to_pgn_with(&Config {
        headers: false,
        columns: Some(24),
        ..Config::default()
    });

    assert!(movetext.lines().count() > 1);
    for line in movetext.lines() {
        assert!(line.len() <= 24, "line too long: {:?}", line);
        assert!(!line.starts_with(' '));
        assert!(!line.ends_with(' '));
    }

    let reread = read_game(&movetext).expect("wrapped output reads back");
    assert_eq!(mainline_sans(&reread).len(), 24);
}

#[test]
fn test_result_appended() {
    let game = read_game("[Result \"1-0\"]\n\n1. e4 e5").expect("valid pgn");
    assert!(game.to_pgn().ends_with("1. e4 e5 1-0"));
}
