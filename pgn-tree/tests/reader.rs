use pgn_tree::{read_game, read_games};
use shako::{Black, White};

#[test]
fn test_empty_input_yields_no_game() {
    assert!(read_game("").is_none());
    assert!(read_game("   \n \t ").is_none());
    assert!(read_games("").is_empty());
}

#[test]
fn test_headers_mainline_and_final_position() {
    let game = read_game("[Event \"T\"]\n\n1. e4 e5 2. Nf3 Nc6 3. Bb5 1-0")
        .expect("valid pgn");

    assert_eq!(game.headers().get("Event"), Some("T"));
    assert_eq!(game.headers().result(), "1-0");

    let sans: Vec<String> = game.mainline().filter_map(|node| node.san()).collect();
    assert_eq!(sans, ["e4", "e5", "Nf3", "Nc6", "Bb5"]);

    let ucis: Vec<String> = game.mainline_moves().map(|m| m.uci()).collect();
    assert_eq!(ucis, ["e2e4", "e7e5", "g1f3", "b8c6", "f1b5"]);

    let board = game.end().board();
    assert_eq!(board.turn(), Black);
    assert_eq!(board.fullmoves(), 3);
    assert!(game.errors().is_empty());
}

#[test]
fn test_variations_branch_before_the_move() {
    let game = read_game("1. e4 e5 (1... c5 2. Nf3) 2. Nf3 *").expect("valid pgn");

    let root = game.root();
    assert_eq!(root.variations().len(), 1);

    let e4 = root.next().expect("e4");
    let children = e4.variations();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0].san().as_deref(), Some("e5"));
    assert_eq!(children[1].san().as_deref(), Some("c5"));

    assert!(children[0].is_mainline());
    assert!(!children[1].is_mainline());
    assert!(!children[1].is_end());
    assert_eq!(children[1].variations()[0].san().as_deref(), Some("Nf3"));
}

#[test]
fn test_nested_variation_structure() {
    let game = read_game(
        "1. e4 e5 (1... c5 2. Nf3 (2. d4 cxd4) d6) 2. Nf3 Nc6 (2... Nf6 3. Nxe5 (3. Bc4 Nxe4)) 3. Bb5 *",
    )
    .expect("valid pgn");

    assert!(game.errors().is_empty());
    assert!(game.count_nodes() >= 12);

    let e4 = game.root().next().expect("e4");
    let children = e4.variations();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0].san().as_deref(), Some("e5"));
    assert_eq!(children[1].san().as_deref(), Some("c5"));

    // The variation attached to the inner Nf3 becomes its sibling under c5.
    let c5 = &children[1];
    let c5_children = c5.variations();
    assert_eq!(c5_children.len(), 2);
    assert_eq!(c5_children[0].san().as_deref(), Some("Nf3"));
    assert_eq!(c5_children[1].san().as_deref(), Some("d4"));
    assert_eq!(c5_children[0].next().and_then(|n| n.san()), Some("d6".to_owned()));
    assert_eq!(c5_children[1].next().and_then(|n| n.san()), Some("cxd4".to_owned()));

    let nc6 = game
        .root()
        .next()
        .and_then(|n| n.next())
        .and_then(|n| n.next())
        .and_then(|n| n.next())
        .expect("Nc6");
    assert_eq!(nc6.san().as_deref(), Some("Nc6"));
    let nc6_parent_children = nc6.parent().expect("Nf3").variations();
    assert_eq!(nc6_parent_children.len(), 2);
    assert_eq!(nc6_parent_children[1].san().as_deref(), Some("Nf6"));
}

#[test]
fn test_promotion_order_of_variations() {
    let game = read_game("1. e4 e5 (1... c5) (1... d5) *").expect("valid pgn");

    let e4 = game.root().next().expect("e4");
    let sans = |node: &pgn_tree::GameNode| -> Vec<String> {
        node.variations()
            .iter()
            .filter_map(|child| child.san())
            .collect()
    };
    assert_eq!(sans(&e4), ["e5", "c5", "d5"]);

    let d5 = e4.variations()[2].clone();
    d5.promote();
    assert_eq!(sans(&e4), ["e5", "d5", "c5"]);

    let c5 = e4.variations()[2].clone();
    assert_eq!(c5.san().as_deref(), Some("c5"));
    c5.promote_to_main();
    assert_eq!(sans(&e4), ["c5", "e5", "d5"]);
}

#[test]
fn test_fen_header_game() {
    let game = read_game(
        "[FEN \"r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3\"]\n\n\
         3. Bb5 a6 4. Ba4 Nf6 *",
    )
    .expect("valid pgn");

    let board = game.starting_board();
    assert_eq!(board.turn(), White);
    assert_eq!(board.fullmoves(), 3);

    let sans: Vec<String> = game.mainline().filter_map(|node| node.san()).collect();
    assert_eq!(sans, ["Bb5", "a6", "Ba4", "Nf6"]);
    assert!(game.errors().is_empty());

    assert_eq!(
        game.root().fen(),
        "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3"
    );
}

#[test]
fn test_nags_from_decorations() {
    let game = read_game("1. e4! e5?? 2. Nf3 *").expect("valid pgn");

    let e4 = game.root().next().expect("e4");
    assert_eq!(e4.nags(), vec![pgn_tree::Nag(1)]);

    let e5 = e4.next().expect("e5");
    assert_eq!(e5.nags(), vec![pgn_tree::Nag(4)]);
}

#[test]
fn test_root_comment() {
    let game = read_game("{Before first move} 1. e4 *").expect("valid pgn");

    assert_eq!(game.root().comment().as_deref(), Some("Before first move"));
    let e4 = game.root().next().expect("e4");
    assert_eq!(e4.comment(), None);
}

#[test]
fn test_clock_eval_arrows() {
    let game = read_game(
        "1. e4 {[%clk 0:03:00] [%eval 0.33]} e5 {[%cal Gg8f6,Rb8c6] [%csl Re4]} *",
    )
    .expect("valid pgn");

    let e4 = game.root().next().expect("e4");
    assert_eq!(e4.clock(), Some(180.0));
    assert_eq!(e4.eval(), Some(0.33));

    let e5 = e4.next().expect("e5");
    assert_eq!(e5.arrows().len(), 2);
    assert_eq!(e5.arrows()[0].color, 'G');
    assert_eq!(e5.shapes().len(), 1);
    assert_eq!(e5.shapes()[0].color, 'R');
}

#[test]
fn test_two_games_in_order() {
    let pgn = "[Event \"One\"]\n\n1. e4 e5 1-0\n\n[Event \"Two\"]\n\n1. d4 d5 0-1\n";
    let games = read_games(pgn);

    assert_eq!(games.len(), 2);
    assert_eq!(games[0].headers().event(), Some("One"));
    assert_eq!(games[1].headers().event(), Some("Two"));
    assert_eq!(games[0].headers().result(), "1-0");
    assert_eq!(games[1].headers().result(), "0-1");
}

#[test]
fn test_mainline_length_matches_moves() {
    let game = read_game("1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 4. Ba4 Nf6 5. O-O Be7 *")
        .expect("valid pgn");
    assert_eq!(game.mainline().count(), 10);
    assert_eq!(game.count_nodes(), 11);
}

#[test]
fn test_node_fen_matches_replay() {
    let game = read_game("1. e4 c5 2. Nf3 d6 3. d4 cxd4 4. Nxd4 Nf6 *").expect("valid pgn");

    let mut board = game.starting_board();
    for node in game.mainline() {
        board.push(node.prev_move().expect("a move")).expect("legal");
        assert_eq!(node.fen(), board.fen());
    }
}

#[test]
fn test_san_matches_parent_rendering() {
    let game = read_game("1. e4 e5 (1... c5 2. Nf3 d6) 2. Nf3 Nc6 3. Bb5 *")
        .expect("valid pgn");

    fn check(node: &pgn_tree::GameNode) {
        if let (Some(parent), Some(m)) = (node.parent(), node.prev_move()) {
            assert_eq!(node.san(), Some(parent.board().san(&m)));
        }
        for child in node.variations() {
            check(&child);
        }
    }
    check(&game.root());
}

#[test]
fn test_checkmate_game() {
    let game = read_game("1. f3 e5 2. g4 Qh4# 0-1").expect("valid pgn");
    assert!(game.end().board().is_checkmate());
    assert_eq!(game.end().san().as_deref(), Some("Qh4#"));
}

#[test]
fn test_variation_with_unreadable_first_move() {
    let game = read_game("1. e4 e5 (1... Qh4 2. g3) 2. Nf3 *").expect("valid pgn");

    // The broken variation is dropped, the error names the pre-variation
    // position.
    assert_eq!(game.errors().len(), 1);
    assert_eq!(game.errors()[0].san, "Qh4");
    assert!(game.errors()[0].fen.contains(" b "));

    let e4 = game.root().next().expect("e4");
    assert_eq!(e4.variations().len(), 1);

    let sans: Vec<String> = game.mainline().filter_map(|node| node.san()).collect();
    assert_eq!(sans, ["e4", "e5", "Nf3"]);
}

#[test]
fn test_null_move() {
    let game = read_game("1. e4 -- 2. d4 *").expect("valid pgn");

    let sans: Vec<String> = game.mainline().filter_map(|node| node.san()).collect();
    assert_eq!(sans, ["e4", "--", "d4"]);

    let ucis: Vec<String> = game.mainline_moves().map(|m| m.uci()).collect();
    assert_eq!(ucis, ["e2e4", "0000", "d2d4"]);
    assert!(game.errors().is_empty());
}

#[test]
fn test_castling_and_long_castling() {
    let game = read_game(
        "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 4. Ba4 Nf6 5. O-O Be7 6. d4 b5 7. Bb3 d6 8. c3 O-O *",
    )
    .expect("valid pgn");
    assert!(game.errors().is_empty());

    let ucis: Vec<String> = game.mainline_moves().map(|m| m.uci()).collect();
    assert!(ucis.contains(&"e1g1".to_owned()));
    assert!(ucis.contains(&"e8g8".to_owned()));
}

#[test]
fn test_ply_and_move_numbers() {
    let game = read_game("1. e4 e5 2. Nf3 *").expect("valid pgn");

    let nodes: Vec<pgn_tree::GameNode> = game.mainline().collect();
    assert_eq!(game.root().ply(), 0);
    assert_eq!(nodes[0].ply(), 1);
    assert_eq!(nodes[1].ply(), 2);
    assert_eq!(nodes[2].ply(), 3);
    assert_eq!(nodes[2].move_number(), 2);
}
