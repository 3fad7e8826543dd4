//! Building game trees from PGN text.

use shako::{Board, Move, Role, Square};

use crate::comment::Annotations;
use crate::game::{Game, GameError};
use crate::node::GameNode;
use crate::parser::{self, RawGame, RawMove, RawNotation};

/// Reads the first game of the PGN text.
///
/// Returns `None` for empty input and for input the lexer cannot make
/// sense of. Unresolvable moves do not prevent a `Game` from being
/// returned; they are collected in [`Game::errors()`].
///
/// # Example
///
/// ```
/// use pgn_tree::read_game;
///
/// let game = read_game("1. e4 e5 2. Nf3 Nc6 *").expect("valid pgn");
/// assert_eq!(game.count_nodes(), 5);
/// assert!(read_game("").is_none());
/// ```
pub fn read_game(pgn: &str) -> Option<Game> {
    match parser::parse_game(pgn) {
        Ok(Some(raw)) => Some(build_game(raw)),
        _ => None,
    }
}

/// Reads all games of the PGN text, in source order. Returns an empty
/// vector if the input cannot be tokenized.
pub fn read_games(pgn: &str) -> Vec<Game> {
    parser::parse_games(pgn)
        .map(|games| games.into_iter().map(build_game).collect())
        .unwrap_or_default()
}

/// Builds a game tree from a flat parse structure.
///
/// A variation attached to a move means "instead of this move"; its line
/// therefore branches from the position *before* the move and its first
/// node becomes a following sibling of the move's node, not a child.
pub fn build_game(raw: RawGame) -> Game {
    let mut game = Game::new();

    for (name, value) in &raw.tags {
        // The upstream parser may add a synthetic "messages" tag.
        if name == "messages" {
            continue;
        }
        game.set_header(name, value);
    }

    // The terminating result token fills in for a missing Result tag; an
    // explicit tag wins.
    if let Some(result) = &raw.result {
        if game.headers().result() == "*" {
            game.set_header("Result", result);
        }
    }

    if let Some(text) = &raw.game_comment {
        let (annotations, rest) = Annotations::extract(text);
        let root = game.root();
        if !rest.is_empty() {
            root.set_comment(&rest);
        }
        root.set_arrows(annotations.arrows);
        root.set_shapes(annotations.shapes);
    }

    let mut errors = Vec::new();
    let mut board = game.starting_board();
    build_line(&mut errors, &game.root(), &mut board, &raw.moves, false);

    for error in errors {
        game.push_error(error);
    }

    game
}

fn build_line(
    errors: &mut Vec<GameError>,
    parent: &GameNode,
    board: &mut Board,
    moves: &[RawMove],
    is_variation: bool,
) {
    let mut parent = parent.clone();

    for (index, raw) in moves.iter().enumerate() {
        // Sibling variations branch from the position before this move.
        let fen_before = board.fen();

        let m = match resolve(board, &raw.notation) {
            Ok(m) => m,
            Err(error) => {
                errors.push(GameError {
                    message: error.to_string(),
                    san: raw.notation.san.clone(),
                    fen: fen_before,
                    move_number: Some(board.fullmoves()),
                });
                // A variation whose first move is unreadable is omitted
                // as a whole. Otherwise skip this move and its variations
                // and keep trying the following moves of the line.
                if is_variation && index == 0 {
                    return;
                }
                continue;
            }
        };

        let node = parent.add_variation(m);
        if let Some(comment) = &raw.comment_before {
            node.set_starting_comment(comment);
        }
        if let Some(comment) = &raw.comment_after {
            node.set_comment(comment);
        }
        node.set_nags(raw.nags.iter().copied());
        node.set_clock(raw.annotations.clock);
        node.set_eval(raw.annotations.eval);
        node.set_arrows(raw.annotations.arrows.iter().copied());
        node.set_shapes(raw.annotations.shapes.iter().copied());

        if let Err(error) = board.push(m) {
            // Drops and other unplayable moves stay in the tree as leaves.
            errors.push(GameError {
                message: error.to_string(),
                san: raw.notation.san.clone(),
                fen: fen_before.clone(),
                move_number: Some(board.fullmoves()),
            });
        }

        for variation in &raw.variations {
            let mut variation_board = match Board::from_fen(&fen_before) {
                Ok(board) => board,
                Err(_) => continue,
            };
            build_line(errors, &parent, &mut variation_board, variation, true);
        }

        parent = node;
    }
}

fn resolve(board: &Board, notation: &RawNotation) -> Result<Move, shako::SanError> {
    match board.parse_san(&notation.san) {
        Ok(m) => Ok(m),
        Err(error) => fallback(board, notation).ok_or(error),
    }
}

/// Matches the decomposed notation against the legal moves: destination
/// from `col`/`row`, piece from `fig`, origin constraints from `disc`,
/// promotion from `promotion`. Only a sole survivor counts.
fn fallback(board: &Board, notation: &RawNotation) -> Option<Move> {
    if notation.drop {
        return None;
    }

    let col = notation.col?;
    let row = notation.row?;
    let to = Square::from_coords(col as u8 - b'a', row as u8 - b'1')?;

    let role = match notation.fig {
        Some(fig) => Role::from_char(fig)?,
        None => Role::Pawn,
    };
    let promotion = notation.promotion.and_then(Role::from_char);

    let mut survivors = board.legal_moves().into_iter().filter(|m| {
        let from = match m.from() {
            Some(from) => from,
            None => return false,
        };
        if m.to() != Some(to) || board.is_castling(m) || m.promotion() != promotion {
            return false;
        }
        if board.piece_at(from).map_or(true, |piece| piece.role != role) {
            return false;
        }
        if let Some(disc) = &notation.disc {
            for ch in disc.chars() {
                let matches = match ch {
                    'a'..='h' => from.file() == ch as u8 - b'a',
                    '1'..='8' => from.rank() == ch as u8 - b'1',
                    _ => false,
                };
                if !matches {
                    return false;
                }
            }
        }
        true
    });

    let survivor = survivors.next()?;
    if survivors.next().is_some() {
        None
    } else {
        Some(survivor)
    }
}
