use shako::{Board, Move, Square};

#[test]
fn test_standard_first_moves() {
    let board = Board::new();
    let moves = board.legal_moves();

    let mut expected: Vec<String> = Vec::new();
    for file in b'a'..=b'h' {
        expected.push(format!("{}2{}3", file as char, file as char));
        expected.push(format!("{}2{}4", file as char, file as char));
    }
    for uci in ["b1a3", "b1c3", "g1f3", "g1h3"] {
        expected.push(uci.to_owned());
    }
    expected.sort();

    let mut found: Vec<String> = moves.iter().map(|m| m.uci()).collect();
    found.sort();

    assert_eq!(found, expected);
}

#[test]
fn test_fen_round_trip_is_identity() {
    let mut board = Board::new();
    for san in ["e4", "c5", "Nf3", "d6", "d4", "cxd4", "Nxd4", "Nf6", "Nc3", "a6"] {
        board.push_san(san).expect("legal");
    }

    let fen = board.fen();
    let mut copy = board.copy();
    copy.set_fen(&fen).expect("own fen is valid");

    assert_eq!(copy.fen(), fen);
    assert_eq!(copy.turn(), board.turn());
    assert_eq!(copy.castling_rights(), board.castling_rights());
    assert_eq!(copy.ep_square(), board.ep_square());
    assert_eq!(copy.halfmove_clock(), board.halfmove_clock());
    assert_eq!(copy.fullmoves(), board.fullmoves());
}

#[test]
fn test_push_pop_restores_state() {
    let sans = [
        "e4", "e5", "Nf3", "Nc6", "Bb5", "a6", "Ba4", "Nf6", "O-O", "Be7",
        "Re1", "b5", "Bb3", "d6", "c3", "O-O", "h3", "Nb8", "d4", "Nbd7",
    ];

    let mut board = Board::new();
    for san in sans {
        let before = board.fen();
        let m = board.parse_san(san).expect("legal");

        board.push(m).expect("legal move applies");
        board.pop().expect("stack is not empty");
        assert_eq!(board.fen(), before);

        board.push_san(san).expect("legal");
    }
}

#[test]
fn test_push_pop_every_legal_move_deep() {
    // Positions with castling, en passant and promotions available.
    for fen in [
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
    ] {
        let mut board = Board::from_fen(fen).expect("valid fen");
        let before = board.fen();

        for m in board.legal_moves() {
            board.push(m).expect("legal move applies");
            board.pop().expect("stack is not empty");
            assert_eq!(board.fen(), before, "restoring after {} in {}", m, fen);
        }
    }
}

#[test]
fn test_checkmate_implies_check() {
    for fen in [
        "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
        "r1bqkbnr/ppp2Qpp/2np4/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4",
        "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1",
    ] {
        let board = Board::from_fen(fen).expect("valid fen");
        if board.is_checkmate() {
            assert!(board.is_check());
        }
        if board.is_stalemate() {
            assert!(!board.is_check());
        }
        assert!(board.is_checkmate() || board.is_stalemate() || !board.legal_moves().is_empty());
    }
}

#[test]
fn test_castling_blocked_by_attack() {
    let castle = Move::Normal { from: Square::E1, to: Square::G1, promotion: None };

    // A bishop attacks the f1 transit square.
    let board = Board::from_fen("4k3/8/8/8/8/2b5/8/4K2R w K - 0 1").expect("valid fen");
    assert!(!board.legal_moves().contains(&castle));

    // Same position without the bishop.
    let board = Board::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").expect("valid fen");
    assert!(board.legal_moves().contains(&castle));
}

#[test]
fn test_fifty_move_rule() {
    let board =
        Board::from_fen("4k3/8/8/8/8/8/4R3/4K3 w - - 100 80").expect("valid fen");
    assert!(board.is_game_over());
    assert!(!board.is_checkmate());
    assert!(!board.legal_moves().is_empty());
}

#[test]
fn test_uci_round_trip_for_legal_moves() {
    let mut board = Board::new();
    for san in ["e4", "e5", "Nf3", "Nc6", "Bb5"] {
        board.push_san(san).expect("legal");
    }

    for m in board.legal_moves() {
        assert_eq!(m.uci().parse::<Move>().expect("valid uci"), m);
    }
}
