//! Source location tracking for error reporting
//!
//! Locations in IR text are 1-based line/column pairs. The lexer keeps a
//! `SourceTracker` and stamps every token with a `SourceSpan`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A location in IR text (line and column are 1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Location `n` columns to the right on the same line
    pub fn offset_columns(self, n: u32) -> Self {
        Self {
            line: self.line,
            column: self.column + n,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span in IR text (from start to end location)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl SourceSpan {
    pub fn new(start: SourceLocation, end: SourceLocation) -> Self {
        Self { start, end }
    }

    /// Create a span from a single location
    pub fn from_location(location: SourceLocation) -> Self {
        Self {
            start: location,
            end: location,
        }
    }
}

/// Line/column bookkeeping for a character cursor
#[derive(Debug, Clone)]
pub struct SourceTracker {
    line: u32,
    column: u32,
}

impl SourceTracker {
    pub fn new() -> Self {
        Self { line: 1, column: 1 }
    }

    /// Get current location
    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }

    /// Advance by one character
    pub fn advance(&mut self, ch: char) {
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    /// Create a span from a start location to current location
    pub fn span_from(&self, start: SourceLocation) -> SourceSpan {
        SourceSpan::new(start, self.location())
    }
}

impl Default for SourceTracker {
    fn default() -> Self {
        Self::new()
    }
}
