//! The ordered key/value store for PGN tags.

use std::fmt;

/// PGN tag pairs in source order.
///
/// New games start with the Seven Tag Roster filled with placeholder
/// values; tags set afterwards keep their insertion order.
///
/// # Example
///
/// ```
/// use pgn_tree::Headers;
///
/// let mut headers = Headers::default();
/// headers.set("Event", "Casual game");
/// assert_eq!(headers.get("Event"), Some("Casual game"));
/// assert_eq!(headers.result(), "*");
/// ```
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Headers {
    pairs: Vec<(String, String)>,
}

impl Default for Headers {
    fn default() -> Headers {
        let mut headers = Headers::empty();
        headers.set("Event", "?");
        headers.set("Site", "?");
        headers.set("Date", "????.??.??");
        headers.set("Round", "?");
        headers.set("White", "?");
        headers.set("Black", "?");
        headers.set("Result", "*");
        headers
    }
}

impl Headers {
    /// A store without any tags, not even the Seven Tag Roster.
    pub fn empty() -> Headers {
        Headers { pairs: Vec::new() }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets a tag, replacing the value in place if the tag exists.
    pub fn set(&mut self, name: &str, value: &str) {
        match self.pairs.iter_mut().find(|(key, _)| key == name) {
            Some((_, old)) => *old = value.to_owned(),
            None => self.pairs.push((name.to_owned(), value.to_owned())),
        }
    }

    /// Removes a tag, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.pairs.iter().position(|(key, _)| key == name)?;
        Some(self.pairs.remove(index).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn event(&self) -> Option<&str> {
        self.get("Event")
    }

    pub fn site(&self) -> Option<&str> {
        self.get("Site")
    }

    pub fn date(&self) -> Option<&str> {
        self.get("Date")
    }

    pub fn white(&self) -> Option<&str> {
        self.get("White")
    }

    pub fn black(&self) -> Option<&str> {
        self.get("Black")
    }

    /// The `Result` tag, defaulting to `*`.
    pub fn result(&self) -> &str {
        self.get("Result").unwrap_or("*")
    }

    /// The `FEN` tag with the starting position, if any.
    pub fn fen(&self) -> Option<&str> {
        self.get("FEN")
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            writeln!(f, "[{} \"{}\"]", name, value.replace('\\', "\\\\").replace('"', "\\\""))?;
        }
        Ok(())
    }
}
