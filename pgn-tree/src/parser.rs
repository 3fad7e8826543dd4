//! The lexical PGN parser.
//!
//! Turns PGN text into the flat parse structure the tree builder consumes:
//! tag pairs, a linear move list, and per-move nested variation lists. Moves
//! are not resolved against a board here; [`crate::read_game`] does that
//! while building the tree.

use std::error::Error;
use std::fmt;

use crate::comment::Annotations;
use crate::nag::Nag;

/// Error for PGN text that cannot be tokenized at all, e.g. an unterminated
/// comment or tag. Per-move problems never raise this; they surface as
/// [`crate::GameError`]s on the built game.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PgnSyntaxError {
    message: &'static str,
    /// Byte offset into the input.
    pub offset: usize,
}

impl fmt::Display for PgnSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}", self.message, self.offset)
    }
}

impl Error for PgnSyntaxError {}

/// A game as a flat parse structure.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawGame {
    /// Tag pairs in source order, with escapes decoded.
    pub tags: Vec<(String, String)>,
    /// Comment text before the first move.
    pub game_comment: Option<String>,
    /// The mainline moves.
    pub moves: Vec<RawMove>,
    /// The terminating result token, if any.
    pub result: Option<String>,
}

/// A single move with its annotations and the variations that follow it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawMove {
    pub notation: RawNotation,
    /// Comment in front of the move (the starting comment of a variation).
    pub comment_before: Option<String>,
    /// Comment text after the move, with annotation commands removed.
    pub comment_after: Option<String>,
    pub nags: Vec<Nag>,
    /// Clock, eval, arrow and shape annotations from the comments.
    pub annotations: Annotations,
    /// Variation lines alternative to the *next* mainline move, in source
    /// order.
    pub variations: Vec<Vec<RawMove>>,
}

/// The notation of a single move, both as written and decomposed into the
/// parts used for fallback matching.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawNotation {
    /// The notation as written, without `!`/`?` decorations.
    pub san: String,
    /// The piece letter (`K`, `Q`, `R`, `B` or `N`), if any.
    pub fig: Option<char>,
    /// The destination file, if any.
    pub col: Option<char>,
    /// The destination rank, if any.
    pub row: Option<char>,
    /// Disambiguation text in front of the destination.
    pub disc: Option<String>,
    /// The promotion piece letter, if any.
    pub promotion: Option<char>,
    /// Whether the notation is a drop like `P@e4`.
    pub drop: bool,
}

/// Parses the first game of the input.
///
/// Returns `Ok(None)` for input without any game.
///
/// # Errors
///
/// Returns [`PgnSyntaxError`] if the input cannot be tokenized.
pub fn parse_game(pgn: &str) -> Result<Option<RawGame>, PgnSyntaxError> {
    Lexer::new(pgn).next_game()
}

/// Parses all games of the input, in source order.
///
/// # Errors
///
/// Returns [`PgnSyntaxError`] if the input cannot be tokenized.
pub fn parse_games(pgn: &str) -> Result<Vec<RawGame>, PgnSyntaxError> {
    let mut lexer = Lexer::new(pgn);
    let mut games = Vec::new();
    while let Some(game) = lexer.next_game()? {
        games.push(game);
    }
    Ok(games)
}

struct ParsedLine {
    moves: Vec<RawMove>,
    /// Comments before the first move of the line.
    leading: Vec<String>,
    result: Option<String>,
}

struct Lexer<'a> {
    input: &'a [u8],
    text: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Lexer<'a> {
        let mut lexer = Lexer { input: text.as_bytes(), text, pos: 0 };
        if lexer.input.starts_with(b"\xef\xbb\xbf") {
            lexer.pos = 3;
        }
        lexer
    }

    fn err(&self, message: &'static str) -> PgnSyntaxError {
        PgnSyntaxError { message, offset: self.pos }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn skip_line(&mut self) {
        match memchr::memchr(b'\n', &self.input[self.pos..]) {
            Some(delta) => self.pos += delta + 1,
            None => self.pos = self.input.len(),
        }
    }

    /// Skips whitespace, `%` escape lines and `;` line comments.
    fn skip_junk(&mut self) {
        while let Some(ch) = self.peek() {
            match ch {
                b' ' | b'\t' | b'\r' | b'\n' => self.pos += 1,
                b'%' | b';' => self.skip_line(),
                _ => break,
            }
        }
    }

    fn next_game(&mut self) -> Result<Option<RawGame>, PgnSyntaxError> {
        self.skip_junk();
        if self.pos >= self.input.len() {
            return Ok(None);
        }

        let tags = self.tags()?;
        let line = self.line(0)?;

        if tags.is_empty() && line.moves.is_empty() && line.leading.is_empty() && line.result.is_none() {
            return Ok(None);
        }

        Ok(Some(RawGame {
            tags,
            game_comment: if line.leading.is_empty() {
                None
            } else {
                Some(line.leading.join(" "))
            },
            moves: line.moves,
            result: line.result,
        }))
    }

    fn tags(&mut self) -> Result<Vec<(String, String)>, PgnSyntaxError> {
        let mut tags = Vec::new();

        loop {
            self.skip_junk();
            if self.peek() != Some(b'[') {
                return Ok(tags);
            }
            self.pos += 1;
            self.skip_junk();

            let name_start = self.pos;
            while self
                .peek()
                .map_or(false, |ch| ch.is_ascii_alphanumeric() || ch == b'_')
            {
                self.pos += 1;
            }
            if self.pos == name_start {
                return Err(self.err("expected tag name"));
            }
            let name = self.text[name_start..self.pos].to_owned();

            self.skip_junk();
            if self.peek() != Some(b'"') {
                return Err(self.err("expected tag value"));
            }
            self.pos += 1;

            let mut value = String::new();
            loop {
                match self.peek() {
                    Some(b'"') => {
                        self.pos += 1;
                        break;
                    }
                    Some(b'\\') => {
                        // A backslash escapes a quote or another backslash.
                        match self.input.get(self.pos + 1) {
                            Some(&ch) if ch == b'"' || ch == b'\\' => {
                                value.push(ch as char);
                                self.pos += 2;
                            }
                            _ => {
                                value.push('\\');
                                self.pos += 1;
                            }
                        }
                    }
                    Some(b'\n') | None => return Err(self.err("unterminated tag value")),
                    Some(_) => {
                        let start = self.pos;
                        while let Some(ch) = self.peek() {
                            if ch == b'"' || ch == b'\\' || ch == b'\n' {
                                break;
                            }
                            self.pos += 1;
                        }
                        value.push_str(&self.text[start..self.pos]);
                    }
                }
            }

            self.skip_junk();
            if self.peek() != Some(b']') {
                return Err(self.err("expected closing bracket"));
            }
            self.pos += 1;

            tags.push((name, value));
        }
    }

    fn comment(&mut self) -> Result<&'a str, PgnSyntaxError> {
        debug_assert_eq!(self.peek(), Some(b'{'));
        self.pos += 1;
        match memchr::memchr(b'}', &self.input[self.pos..]) {
            Some(delta) => {
                let text = &self.text[self.pos..self.pos + delta];
                self.pos += delta + 1;
                Ok(text.trim())
            }
            None => Err(self.err("unterminated comment")),
        }
    }

    fn token(&mut self) -> &'a str {
        let start = self.pos;
        self.pos += 1;
        while let Some(ch) = self.peek() {
            match ch {
                b' ' | b'\t' | b'\r' | b'\n' | b'{' | b'}' | b'(' | b')' | b'[' | b']'
                | b';' | b'$' => break,
                _ => self.pos += 1,
            }
        }
        &self.text[start..self.pos]
    }

    fn line(&mut self, depth: usize) -> Result<ParsedLine, PgnSyntaxError> {
        let mut moves: Vec<RawMove> = Vec::new();
        let mut leading: Vec<String> = Vec::new();
        let mut result = None;

        loop {
            self.skip_junk();

            let ch = match self.peek() {
                Some(ch) => ch,
                None => {
                    if depth > 0 {
                        return Err(self.err("unterminated variation"));
                    }
                    break;
                }
            };

            match ch {
                b'[' if depth == 0 => break,
                b'{' => {
                    let text = self.comment()?;
                    match moves.last_mut() {
                        Some(last) => {
                            let (annotations, rest) = Annotations::extract(text);
                            last.annotations.absorb(annotations);
                            if !rest.is_empty() {
                                match last.comment_after.as_mut() {
                                    Some(comment) => {
                                        comment.push(' ');
                                        comment.push_str(&rest);
                                    }
                                    None => last.comment_after = Some(rest),
                                }
                            }
                        }
                        None => leading.push(text.to_owned()),
                    }
                }
                b'(' => {
                    self.pos += 1;
                    let variation = self.line(depth + 1)?;
                    if let Some(last) = moves.last_mut() {
                        if !variation.moves.is_empty() {
                            let mut line = variation.moves;
                            if !variation.leading.is_empty() {
                                line[0].comment_before = Some(variation.leading.join(" "));
                            }
                            last.variations.push(line);
                        }
                    }
                }
                b')' => {
                    self.pos += 1;
                    if depth > 0 {
                        break;
                    }
                    // A stray closing parenthesis; skip it.
                }
                b'}' => {
                    // A stray closing brace; skip it.
                    self.pos += 1;
                }
                b'$' => {
                    let token = self.token();
                    if let (Some(last), Ok(nag)) =
                        (moves.last_mut(), Nag::from_ascii(token.as_bytes()))
                    {
                        last.nags.push(nag);
                    }
                }
                _ => {
                    let token = self.token();

                    if token == "*" || token == "1-0" || token == "0-1" || token == "1/2-1/2" {
                        if depth == 0 {
                            result = Some(token.to_owned());
                            break;
                        }
                        continue;
                    }

                    if token.chars().all(|c| matches!(c, '!' | '?')) {
                        if let (Some(last), Ok(nag)) =
                            (moves.last_mut(), Nag::from_ascii(token.as_bytes()))
                        {
                            last.nags.push(nag);
                        }
                        continue;
                    }

                    if let Some(san) = strip_move_number(token) {
                        if san.is_empty() {
                            continue;
                        }
                        self.push_move(san, depth, &mut moves, &mut leading);
                    } else {
                        self.push_move(token, depth, &mut moves, &mut leading);
                    }
                }
            }
        }

        Ok(ParsedLine { moves, leading, result })
    }

    fn push_move(
        &self,
        token: &str,
        depth: usize,
        moves: &mut Vec<RawMove>,
        leading: &mut Vec<String>,
    ) {
        let (notation, nags) = decompose(token);
        let mut raw = RawMove { notation, nags, ..RawMove::default() };

        // Comments in front of the first move of a variation become its
        // starting comment. At the top level they are the game comment.
        if moves.is_empty() && depth > 0 && !leading.is_empty() {
            raw.comment_before = Some(leading.join(" "));
            leading.clear();
        }

        moves.push(raw);
    }
}

/// Splits a leading move number (`1.`, `23...`) off a token. Returns the
/// remainder, or `None` if the token is no move number at all.
fn strip_move_number(token: &str) -> Option<&str> {
    let digits = token.len() - token.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    let dots = token[digits..].len() - token[digits..].trim_start_matches('.').len();

    if digits == token.len() {
        // A bare move number without dots.
        Some("")
    } else if digits > 0 && dots > 0 {
        Some(&token[digits + dots..])
    } else if digits == 0 && dots > 0 && dots == token.len() {
        // Continuation dots on their own.
        Some("")
    } else {
        None
    }
}

/// Decomposes a SAN token into the raw notation record, splitting trailing
/// `!`/`?` decorations off into NAGs.
fn decompose(token: &str) -> (RawNotation, Vec<Nag>) {
    let mut nags = Vec::new();

    let trimmed = token.trim_end_matches(|c| matches!(c, '!' | '?'));
    if trimmed.len() < token.len() {
        if let Ok(nag) = Nag::from_ascii(token[trimmed.len()..].as_bytes()) {
            nags.push(nag);
        }
    }

    let mut notation = RawNotation { san: trimmed.to_owned(), ..RawNotation::default() };
    let core = trimmed.trim_end_matches(|c| matches!(c, '+' | '#'));

    if core == "--" || core == "Z0" || core.starts_with("O-O") || core.starts_with("0-0") {
        return (notation, nags);
    }

    if let Some(at) = core.find('@') {
        notation.drop = true;
        if at == 1 {
            notation.fig = core.chars().next().filter(char::is_ascii_uppercase);
        }
        let mut dest = core[at + 1..].chars();
        notation.col = dest.next().filter(|c| ('a'..='h').contains(c));
        notation.row = dest.next().filter(|c| ('1'..='8').contains(c));
        return (notation, nags);
    }

    let (core, promotion) = match core.find('=') {
        Some(idx) => (&core[..idx], core[idx + 1..].chars().next()),
        None => (core, None),
    };
    notation.promotion = promotion;

    if core.len() >= 2 && core.is_ascii() {
        let bytes = core.as_bytes();
        let col = bytes[core.len() - 2] as char;
        let row = bytes[core.len() - 1] as char;
        if ('a'..='h').contains(&col) && ('1'..='8').contains(&row) {
            notation.col = Some(col);
            notation.row = Some(row);

            let mut prefix = &core[..core.len() - 2];
            if let Some(first) = prefix.chars().next() {
                if matches!(first, 'K' | 'Q' | 'R' | 'B' | 'N') {
                    notation.fig = Some(first);
                    prefix = &prefix[1..];
                }
            }
            let prefix = prefix.strip_suffix('x').unwrap_or(prefix);
            if !prefix.is_empty() {
                notation.disc = Some(prefix.to_owned());
            }
        }
    }

    (notation, nags)
}
