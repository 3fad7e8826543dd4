//! A complete game: the root of the tree, the tag pairs, and the errors
//! collected while reading.

use std::error::Error;
use std::fmt;

use shako::Board;

use crate::headers::Headers;
use crate::node::{GameNode, Mainline, MainlineMoves};

/// A move that could not be resolved while building a game tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameError {
    /// What went wrong.
    pub message: String,
    /// The offending notation as written in the source.
    pub san: String,
    /// The position the move was read in.
    pub fen: String,
    /// The fullmove number at the time of failure.
    pub move_number: Option<u32>,
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.move_number {
            Some(n) => write!(f, "{}: {} (move {}, {})", self.message, self.san, n, self.fen),
            None => write!(f, "{}: {} ({})", self.message, self.san, self.fen),
        }
    }
}

impl Error for GameError {}

/// A game: the root node of the tree together with [`Headers`] and the
/// [`GameError`]s encountered while reading.
///
/// The starting position is taken from the `FEN` tag when present.
///
/// # Example
///
/// ```
/// use pgn_tree::read_game;
///
/// let game = read_game("1. e4 e5 2. Nf3 Nc6 3. Bb5 *").expect("valid pgn");
///
/// let sans: Vec<String> = game.mainline().filter_map(|node| node.san()).collect();
/// assert_eq!(sans, ["e4", "e5", "Nf3", "Nc6", "Bb5"]);
/// ```
#[derive(Debug)]
pub struct Game {
    root: GameNode,
    headers: Headers,
    errors: Vec<GameError>,
}

impl Default for Game {
    fn default() -> Game {
        Game::new()
    }
}

impl Game {
    /// An empty game with default headers and the standard starting
    /// position.
    pub fn new() -> Game {
        Game {
            root: GameNode::new_root(),
            headers: Headers::default(),
            errors: Vec::new(),
        }
    }

    /// A handle to the root node.
    pub fn root(&self) -> GameNode {
        self.root.clone()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Sets a tag pair. Setting `FEN` also changes the starting position
    /// of the tree and invalidates all cached boards.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers.set(name, value);
        if name == "FEN" {
            self.root.set_starting_fen(Some(value));
        }
    }

    /// Removes a tag pair, returning its value.
    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        let value = self.headers.remove(name);
        if name == "FEN" {
            self.root.set_starting_fen(None);
        }
        value
    }

    /// The errors collected while reading the game.
    pub fn errors(&self) -> &[GameError] {
        &self.errors
    }

    pub(crate) fn push_error(&mut self, error: GameError) {
        self.errors.push(error);
    }

    /// The starting position of the game: the `FEN` tag if present and
    /// valid, the standard initial position otherwise.
    pub fn starting_board(&self) -> Board {
        self.root
            .starting_fen()
            .and_then(|fen| Board::from_fen(&fen).ok())
            .unwrap_or_default()
    }

    /// The final node of the mainline.
    pub fn end(&self) -> GameNode {
        self.root.end()
    }

    /// Iterates over the mainline nodes.
    pub fn mainline(&self) -> Mainline {
        self.root.mainline()
    }

    /// Iterates over the mainline moves.
    pub fn mainline_moves(&self) -> MainlineMoves {
        self.root.mainline_moves()
    }

    /// Counts the nodes of the whole tree, including the root.
    pub fn count_nodes(&self) -> usize {
        self.root.count_nodes()
    }
}
