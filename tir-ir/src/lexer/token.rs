//! Token definitions for the IR lexer

use std::fmt;
use tir_common::SourceSpan;
use crate::ir::Storage;

/// IR token types
#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    /// `%0`, `%A` (stored without the sigil)
    ValueName(String),
    /// `@matmul` (stored without the sigil)
    SymbolName(String),
    /// Bare identifiers and dotted operation names: `func.func`, `private`, `ins`
    Identifier(String),
    /// `tensor<...>` / `memref<...>`; `body` is the text between the angle brackets
    ShapedType { storage: Storage, body: String },

    // Delimiters
    LeftParen,      // (
    RightParen,     // )
    LeftBrace,      // {
    RightBrace,     // }
    Colon,          // :
    Comma,          // ,
    Equal,          // =
    Arrow,          // ->

    EndOfFile,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::ValueName(name) => write!(f, "%{name}"),
            TokenType::SymbolName(name) => write!(f, "@{name}"),
            TokenType::Identifier(name) => write!(f, "{name}"),
            TokenType::ShapedType { storage, body } => write!(f, "{}<{body}>", storage.keyword()),
            TokenType::LeftParen => write!(f, "("),
            TokenType::RightParen => write!(f, ")"),
            TokenType::LeftBrace => write!(f, "{{"),
            TokenType::RightBrace => write!(f, "}}"),
            TokenType::Colon => write!(f, ":"),
            TokenType::Comma => write!(f, ","),
            TokenType::Equal => write!(f, "="),
            TokenType::Arrow => write!(f, "->"),
            TokenType::EndOfFile => write!(f, "end of input"),
        }
    }
}

/// A token with location information
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub span: SourceSpan,
}

impl Token {
    pub fn new(token_type: TokenType, span: SourceSpan) -> Self {
        Self { token_type, span }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token_type)
    }
}
