//! Writing games back to PGN.

use shako::{Board, Move};

use crate::comment::Annotations;
use crate::game::Game;
use crate::node::GameNode;

/// PGN export options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Wrap the movetext at this column, breaking at whitespace. `None`
    /// keeps it on a single line.
    pub columns: Option<usize>,
    /// Whether to write the tag pair section.
    pub headers: bool,
    /// Whether to write variations.
    pub variations: bool,
    /// Whether to write comments, annotations and NAGs.
    pub comments: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            columns: Some(80),
            headers: true,
            variations: true,
            comments: true,
        }
    }
}

struct TokenWriter {
    out: String,
    line_len: usize,
    columns: Option<usize>,
}

impl TokenWriter {
    fn new(columns: Option<usize>) -> TokenWriter {
        TokenWriter { out: String::new(), line_len: 0, columns }
    }

    fn token(&mut self, token: &str) {
        if self.line_len > 0 {
            if self.columns.map_or(false, |columns| self.line_len + 1 + token.len() > columns) {
                self.out.push('\n');
                self.line_len = 0;
            } else {
                self.out.push(' ');
                self.line_len += 1;
            }
        }
        self.out.push_str(token);
        self.line_len += token.len();
    }

    fn finish(self) -> String {
        self.out
    }
}

fn comment_token(node: &GameNode) -> Option<String> {
    let annotations = Annotations {
        clock: node.clock(),
        eval: node.eval(),
        arrows: node.arrows(),
        shapes: node.shapes(),
    };

    let mut inner = annotations.render();
    if let Some(comment) = node.comment() {
        if !inner.is_empty() {
            inner.push(' ');
        }
        inner.push_str(&comment);
    }

    if inner.is_empty() {
        None
    } else {
        Some(format!("{{ {} }}", inner))
    }
}

fn write_move(
    w: &mut TokenWriter,
    board: &Board,
    node: &GameNode,
    m: Move,
    force_number: bool,
    config: &Config,
) -> bool {
    if board.turn().is_white() {
        w.token(&format!("{}.", board.fullmoves()));
    } else if force_number {
        w.token(&format!("{}...", board.fullmoves()));
    }

    w.token(&board.san(&m));

    let mut wrote_comment = false;
    if config.comments {
        for nag in node.nags() {
            w.token(&nag.to_string());
        }
        if let Some(comment) = comment_token(node) {
            w.token(&comment);
            wrote_comment = true;
        }
    }
    wrote_comment
}

fn write_line(
    w: &mut TokenWriter,
    board: &mut Board,
    parent: &GameNode,
    mut force_number: bool,
    config: &Config,
) {
    let mut parent = parent.clone();

    loop {
        let children = parent.variations();
        let main = match children.first() {
            Some(main) => main.clone(),
            None => break,
        };
        let m = match main.prev_move() {
            Some(m) => m,
            None => break,
        };

        let mut interrupted = write_move(w, board, &main, m, force_number, config);

        if config.variations {
            for variation in &children[1..] {
                let vm = match variation.prev_move() {
                    Some(vm) => vm,
                    None => continue,
                };

                w.token("(");
                if config.comments {
                    if let Some(comment) = variation.starting_comment() {
                        w.token(&format!("{{ {} }}", comment));
                    }
                }

                let mut variation_board = board.copy();
                let wrote_comment =
                    write_move(w, &variation_board, variation, vm, true, config);
                let _ = variation_board.push(vm);
                write_line(w, &mut variation_board, variation, wrote_comment, config);
                w.token(")");

                interrupted = true;
            }
        }

        let _ = board.push(m);
        force_number = interrupted;
        parent = main;
    }
}

impl Game {
    /// Exports the game as PGN with the default [`Config`].
    ///
    /// # Example
    ///
    /// ```
    /// use pgn_tree::read_game;
    ///
    /// let game = read_game("1. e4 e5 (1... c5) *").expect("valid pgn");
    /// assert_eq!(game.to_pgn().lines().last(), Some("1. e4 e5 ( 1... c5 ) *"));
    /// ```
    pub fn to_pgn(&self) -> String {
        self.to_pgn_with(&Config::default())
    }

    /// Exports the game as PGN: escaped `[Tag "value"]` lines, a blank
    /// line, then the movetext ending with the result token.
    pub fn to_pgn_with(&self, config: &Config) -> String {
        let mut out = String::new();

        if config.headers {
            out.push_str(&self.headers().to_string());
            out.push('\n');
        }

        let mut w = TokenWriter::new(config.columns);

        let root = self.root();
        if config.comments {
            if let Some(comment) = comment_token(&root) {
                w.token(&comment);
            }
        }

        let mut board = self.starting_board();
        write_line(&mut w, &mut board, &root, true, config);

        w.token(self.headers().result());

        out.push_str(&w.finish());
        out
    }
}
