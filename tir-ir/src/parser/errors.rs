//! Parse error types for the IR parser
//!
//! Every parse error is reported to callers as `IrError::Syntax` with the
//! location of the offending token.

use thiserror::Error;
use tir_common::{IrError, SourceLocation};
use crate::lexer::Token;

/// Parse error types specific to the parser
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    #[error("expected {expected}, found '{found}'")]
    UnexpectedToken { expected: String, found: Token },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEndOfFile { expected: String, location: SourceLocation },

    #[error("use of undefined value %{name}")]
    UndefinedValue { name: String, location: SourceLocation },

    #[error("redefinition of value %{name}")]
    Redefinition { name: String, location: SourceLocation },

    #[error("{message}")]
    Invalid { message: String, location: SourceLocation },
}

impl ParseError {
    pub fn invalid(message: impl Into<String>, location: SourceLocation) -> Self {
        ParseError::Invalid { message: message.into(), location }
    }

    pub fn location(&self) -> SourceLocation {
        match self {
            ParseError::UnexpectedToken { found, .. } => found.span.start,
            ParseError::UnexpectedEndOfFile { location, .. }
            | ParseError::UndefinedValue { location, .. }
            | ParseError::Redefinition { location, .. }
            | ParseError::Invalid { location, .. } => *location,
        }
    }
}

impl From<ParseError> for IrError {
    fn from(err: ParseError) -> Self {
        IrError::syntax(err.to_string(), err.location())
    }
}
