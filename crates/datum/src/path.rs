//! Qualified anchor names.

use std::fmt;

/// A reference path: `part.anchor` for part-scoped anchors, `anchor` for
/// top-level custom anchors.
///
/// The text splits at the first `.`; neither side may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReferencePath {
    text: String,
    split: Option<usize>,
}

impl ReferencePath {
    /// Parse a path, returning `None` for empty text or empty segments.
    pub fn parse(text: &str) -> Option<Self> {
        if text.is_empty() || text.chars().any(char::is_whitespace) {
            return None;
        }
        let split = text.find('.');
        if let Some(i) = split {
            if i == 0 || i + 1 == text.len() {
                return None;
            }
        }
        Some(Self {
            text: text.to_string(),
            split,
        })
    }

    /// `part.name`.
    pub fn scoped(part: &str, name: &str) -> Self {
        Self {
            text: format!("{part}.{name}"),
            split: Some(part.len()),
        }
    }

    /// The part this path is scoped to, if any.
    pub fn part(&self) -> Option<&str> {
        self.split.map(|i| &self.text[..i])
    }

    /// The anchor's local name.
    pub fn name(&self) -> &str {
        match self.split {
            Some(i) => &self.text[i + 1..],
            None => &self.text,
        }
    }

    /// The full path text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether the path is part-scoped.
    pub fn is_scoped(&self) -> bool {
        self.split.is_some()
    }
}

impl fmt::Display for ReferencePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
