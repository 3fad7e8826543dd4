//! Embedded comment annotations: clocks, evaluations, arrows and shapes.
//!
//! Comments can carry commands in the form `[%clk 0:01:30]`,
//! `[%eval -0.32]`, `[%cal Ga1b2,Rc3c4]` and `[%csl Ra1]`.
//! [`Annotations::extract()`] separates them from the surrounding text.

use std::fmt;

use shako::Square;

fn is_annotation_color(ch: char) -> bool {
    matches!(ch, 'R' | 'G' | 'B' | 'Y')
}

/// An arrow drawn on the board, like `Ga1b2` in a `[%cal ...]` command.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Arrow {
    pub color: char,
    pub tail: Square,
    pub head: Square,
}

impl Arrow {
    /// Tries to parse an arrow from a five character code.
    pub fn from_ascii(s: &[u8]) -> Option<Arrow> {
        if s.len() == 5 && is_annotation_color(s[0] as char) {
            Some(Arrow {
                color: s[0] as char,
                tail: Square::from_ascii(&s[1..3]).ok()?,
                head: Square::from_ascii(&s[3..5]).ok()?,
            })
        } else {
            None
        }
    }
}

impl fmt::Display for Arrow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.color, self.tail, self.head)
    }
}

/// A highlighted square, like `Ra1` in a `[%csl ...]` command.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Shape {
    pub color: char,
    pub square: Square,
}

impl Shape {
    /// Tries to parse a shape from a three character code.
    pub fn from_ascii(s: &[u8]) -> Option<Shape> {
        if s.len() == 3 && is_annotation_color(s[0] as char) {
            Some(Shape {
                color: s[0] as char,
                square: Square::from_ascii(&s[1..3]).ok()?,
            })
        } else {
            None
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.color, self.square)
    }
}

/// Parses clock text in `h:mm:ss`, `mm:ss` or `s` form into seconds.
pub fn parse_clock(text: &str) -> Option<f64> {
    let mut parts = text.split(':').rev();

    let seconds: f64 = parts.next()?.parse().ok()?;
    if seconds < 0.0 {
        return None;
    }

    let mut total = seconds;
    let mut scale = 60.0;
    for part in parts {
        if scale > 3600.0 {
            // More fields than h:mm:ss.
            return None;
        }
        let value: u32 = btoi::btou(part.as_bytes()).ok()?;
        total += f64::from(value) * scale;
        scale *= 60.0;
    }

    Some(total)
}

/// Formats seconds as `h:mm:ss`, keeping a fractional part if there is one.
pub fn format_clock(seconds: f64) -> String {
    let whole = seconds.max(0.0);
    let hours = (whole / 3600.0).floor();
    let minutes = ((whole - hours * 3600.0) / 60.0).floor();
    let secs = whole - hours * 3600.0 - minutes * 60.0;

    if secs.fract() == 0.0 {
        format!("{}:{:02}:{:02}", hours as u32, minutes as u32, secs as u32)
    } else {
        format!("{}:{:02}:{:04.1}", hours as u32, minutes as u32, secs)
    }
}

/// Structured annotations carried by a comment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Annotations {
    pub clock: Option<f64>,
    pub eval: Option<f64>,
    pub arrows: Vec<Arrow>,
    pub shapes: Vec<Shape>,
}

impl Annotations {
    pub fn is_empty(&self) -> bool {
        self.clock.is_none() && self.eval.is_none() && self.arrows.is_empty() && self.shapes.is_empty()
    }

    /// Extracts annotation commands from comment text.
    ///
    /// Returns the annotations and the text with the commands removed.
    /// Unknown commands are left in the text.
    ///
    /// # Example
    ///
    /// ```
    /// use pgn_tree::Annotations;
    ///
    /// let (annotations, text) = Annotations::extract("[%clk 0:01:30] good");
    /// assert_eq!(annotations.clock, Some(90.0));
    /// assert_eq!(text, "good");
    /// ```
    pub fn extract(text: &str) -> (Annotations, String) {
        let mut annotations = Annotations::default();
        let mut rest = String::with_capacity(text.len());

        let bytes = text.as_bytes();
        let mut pos = 0;

        while pos < bytes.len() {
            let open = match memchr::memchr(b'[', &bytes[pos..]) {
                Some(delta) => pos + delta,
                None => break,
            };

            let close = match memchr::memchr(b']', &bytes[open..]) {
                Some(delta) => open + delta,
                None => break,
            };

            let recognized = bytes.get(open + 1) == Some(&b'%')
                && annotations.parse_command(&text[open + 2..close]);

            if recognized {
                rest.push_str(&text[pos..open]);
            } else {
                rest.push_str(&text[pos..close + 1]);
            }
            pos = close + 1;
        }

        rest.push_str(&text[pos..]);

        let cleaned = rest.split_whitespace().collect::<Vec<_>>().join(" ");
        (annotations, cleaned)
    }

    fn parse_command(&mut self, command: &str) -> bool {
        let mut words = command.split_whitespace();
        let name = match words.next() {
            Some(name) => name,
            None => return false,
        };
        let args = words.collect::<Vec<_>>().join(" ");

        // A command whose argument does not parse is not recognized, so
        // that the original text stays in the comment.
        match name {
            "clk" => match parse_clock(args.trim()) {
                Some(clock) => {
                    self.clock = Some(clock);
                    true
                }
                None => false,
            },
            "eval" => match args.trim().parse() {
                Ok(eval) => {
                    self.eval = Some(eval);
                    true
                }
                Err(_) => false,
            },
            "cal" => {
                let before = self.arrows.len();
                self.arrows
                    .extend(args.split(',').filter_map(|code| Arrow::from_ascii(code.trim().as_bytes())));
                self.arrows.len() > before
            }
            "csl" => {
                let before = self.shapes.len();
                self.shapes
                    .extend(args.split(',').filter_map(|code| Shape::from_ascii(code.trim().as_bytes())));
                self.shapes.len() > before
            }
            _ => false,
        }
    }

    /// Merges annotations from a later comment of the same move. Scalar
    /// values are overwritten, arrows and shapes accumulate.
    pub(crate) fn absorb(&mut self, other: Annotations) {
        if other.clock.is_some() {
            self.clock = other.clock;
        }
        if other.eval.is_some() {
            self.eval = other.eval;
        }
        self.arrows.extend(other.arrows);
        self.shapes.extend(other.shapes);
    }

    /// Renders the annotations back into command form, e.g.
    /// `[%clk 0:01:30] [%cal Ga1b2]`.
    pub(crate) fn render(&self) -> String {
        let mut out = String::new();

        if let Some(clock) = self.clock {
            out.push_str(&format!("[%clk {}]", format_clock(clock)));
        }
        if let Some(eval) = self.eval {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&format!("[%eval {}]", eval));
        }
        if !self.arrows.is_empty() {
            if !out.is_empty() {
                out.push(' ');
            }
            let codes: Vec<String> = self.arrows.iter().map(Arrow::to_string).collect();
            out.push_str(&format!("[%cal {}]", codes.join(",")));
        }
        if !self.shapes.is_empty() {
            if !out.is_empty() {
                out.push(' ');
            }
            let codes: Vec<String> = self.shapes.iter().map(Shape::to_string).collect();
            out.push_str(&format!("[%csl {}]", codes.join(",")));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_clock("0:01:30"), Some(90.0));
        assert_eq!(parse_clock("1:00:00"), Some(3600.0));
        assert_eq!(parse_clock("4:31"), Some(271.0));
        assert_eq!(parse_clock("17"), Some(17.0));
        assert_eq!(parse_clock("0:00:01.5"), Some(1.5));
        assert_eq!(parse_clock("x"), None);
        assert_eq!(parse_clock("1:2:3:4"), None);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(90.0), "0:01:30");
        assert_eq!(format_clock(3661.0), "1:01:01");
        assert_eq!(format_clock(1.5), "0:00:01.5");
    }

    #[test]
    fn test_extract() {
        let (annotations, text) =
            Annotations::extract("before [%clk 0:01:30] [%eval -0.32] after");
        assert_eq!(annotations.clock, Some(90.0));
        assert_eq!(annotations.eval, Some(-0.32));
        assert_eq!(text, "before after");
    }

    #[test]
    fn test_extract_arrows_and_shapes() {
        let (annotations, text) = Annotations::extract("[%cal Ga1b2,Rc3c4][%csl Ra1,Gb2]");
        assert_eq!(annotations.arrows.len(), 2);
        assert_eq!(annotations.arrows[0].color, 'G');
        assert_eq!(annotations.arrows[0].tail, Square::A1);
        assert_eq!(annotations.arrows[0].head, Square::B2);
        assert_eq!(annotations.shapes.len(), 2);
        assert_eq!(annotations.shapes[1].square, Square::B2);
        assert_eq!(text, "");
    }

    #[test]
    fn test_unknown_commands_kept() {
        let (annotations, text) = Annotations::extract("[%emt 0:00:03] hm");
        assert!(annotations.is_empty());
        assert_eq!(text, "[%emt 0:00:03] hm");
    }

    #[test]
    fn test_malformed_commands_kept() {
        let (annotations, text) = Annotations::extract("[%clk x] [%eval x] hm");
        assert!(annotations.is_empty());
        assert_eq!(text, "[%clk x] [%eval x] hm");

        let (annotations, text) = Annotations::extract("[%cal xyz] [%csl Zz9]");
        assert!(annotations.is_empty());
        assert_eq!(text, "[%cal xyz] [%csl Zz9]");
    }

    #[test]
    fn test_round_trip() {
        let (annotations, _) = Annotations::extract("[%clk 0:01:30] [%cal Ga1b2]");
        assert_eq!(annotations.render(), "[%clk 0:01:30] [%cal Ga1b2]");
    }
}
