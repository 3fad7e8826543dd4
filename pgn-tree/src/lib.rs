//! Read and write chess games in PGN notation as navigable game trees.
//!
//! [`read_game()`] turns PGN text into a [`Game`]: a tree of [`GameNode`]s
//! carrying moves, comments, NAGs, clock and eval annotations, arrows and
//! shapes. Every node can materialize its full position as a
//! [`shako::Board`]. [`Game::to_pgn()`] writes the tree back out.
//!
//! A variation in the source — `1. e4 e5 (1... c5)` — means "instead of
//! the preceding move"; in the tree it becomes a *sibling* of that move:
//! the `e4` node has the children `e5` and `c5`.
//!
//! # Examples
//!
//! Read a game and walk the mainline:
//!
//! ```
//! use pgn_tree::read_game;
//!
//! let game = read_game("[Event \"T\"]\n\n1. e4 e5 2. Nf3 Nc6 3. Bb5 1-0")
//!     .expect("valid pgn");
//!
//! assert_eq!(game.headers().event(), Some("T"));
//!
//! let sans: Vec<String> = game.mainline().filter_map(|node| node.san()).collect();
//! assert_eq!(sans, ["e4", "e5", "Nf3", "Nc6", "Bb5"]);
//! ```
//!
//! Inspect variations and positions:
//!
//! ```
//! use pgn_tree::read_game;
//!
//! let game = read_game("1. e4 e5 (1... c5 2. Nf3) *").expect("valid pgn");
//!
//! let e4 = game.root().next().expect("e4");
//! let children = e4.variations();
//! assert_eq!(children.len(), 2);
//!
//! let c5 = &children[1];
//! assert_eq!(c5.san().as_deref(), Some("c5"));
//! assert!(c5.board().fen().starts_with("rnbqkbnr/pp1ppppp/8/2p5/4P3/8"));
//! ```
//!
//! Unreadable moves do not abort reading; they are collected on the game:
//!
//! ```
//! use pgn_tree::read_game;
//!
//! let game = read_game("1. e4 e9 *").expect("valid pgn");
//! assert_eq!(game.errors().len(), 1);
//! assert_eq!(game.errors()[0].san, "e9");
//! ```

pub use shako;

mod game;
mod node;
mod reader;
mod writer;

pub mod comment;
pub mod headers;
pub mod nag;
pub mod parser;

pub use crate::comment::{Annotations, Arrow, Shape};
pub use crate::game::{Game, GameError};
pub use crate::headers::Headers;
pub use crate::nag::{InvalidNag, Nag};
pub use crate::node::{GameNode, Mainline, MainlineMoves};
pub use crate::parser::{parse_game, parse_games, PgnSyntaxError, RawGame, RawMove, RawNotation};
pub use crate::reader::{build_game, read_game, read_games};
pub use crate::writer::Config;
