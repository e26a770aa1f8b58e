//! Source location tracking for tokens and error messages.

use std::fmt;

use serde::Serialize;

/// A location in source text (byte offset, line, column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Location {
    /// Byte offset from start of file
    pub offset: usize,
    /// Line number (1-indexed)
    pub line: u32,
    /// Column number (1-indexed, in characters not bytes)
    pub column: u32,
}

impl Location {
    /// Create a location from its parts.
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self { offset, line, column }
    }

    /// The first character of a file.
    pub fn start() -> Self {
        Self::new(0, 1, 1)
    }

    /// The location reached after consuming `text` from here.
    pub fn advance(self, text: &str) -> Self {
        let newlines = text.bytes().filter(|&b| b == b'\n').count() as u32;
        let column = match text.rfind('\n') {
            Some(i) => text[i + 1..].chars().count() as u32 + 1,
            None => self.column + text.chars().count() as u32,
        };

        Self {
            offset: self.offset + text.len(),
            line: self.line + newlines,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span in source text (start and end locations).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    /// Start location (inclusive)
    pub start: Location,
    /// End location (exclusive)
    pub end: Location,
}

impl Span {
    /// Create a span between two locations.
    pub fn new(start: Location, end: Location) -> Self {
        Self { start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_across_lines() {
        let loc = Location::start().advance("hello\nwo");

        assert_eq!(loc, Location::new(8, 2, 3));
    }

    #[test]
    fn test_advance_counts_characters_not_bytes() {
        let loc = Location::start().advance("é=");

        assert_eq!(loc.offset, 3);
        assert_eq!(loc.column, 3);
    }
}
