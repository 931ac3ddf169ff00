//! IR Lexer
//!
//! Tokenizes IR text. Whitespace and newlines only separate tokens, and
//! `//` comments run to the end of the line. Shaped types are lexed as a
//! single token so that `128x64xf32` is never split into number and
//! identifier pieces.

pub mod token;

pub use token::{Token, TokenType};

use tir_common::{IrError, IrResult, SourceLocation, SourceTracker};
use crate::ir::{is_symbol_char, Storage};

/// IR Lexer
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    tracker: SourceTracker,
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '.' | '$')
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            tracker: SourceTracker::new(),
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current_char()?;
        self.position += 1;
        self.tracker.advance(ch);
        Some(ch)
    }

    fn current_location(&self) -> SourceLocation {
        self.tracker.location()
    }

    /// Skip whitespace, newlines and `//` comments
    fn skip_trivia(&mut self) {
        loop {
            match self.current_char() {
                Some(ch) if ch.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_char(1) == Some('/') => {
                    while let Some(ch) = self.current_char() {
                        if ch == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn read_while(&mut self, accept: impl Fn(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(ch) = self.current_char() {
            if !accept(ch) {
                break;
            }
            text.push(ch);
            self.advance();
        }
        text
    }

    /// `%name` or `@name` after the sigil has been consumed
    fn tokenize_suffix_id(&mut self, sigil: char, start: SourceLocation) -> IrResult<String> {
        let name = self.read_while(is_symbol_char);
        if name.is_empty() {
            return Err(IrError::syntax(format!("expected a name after '{sigil}'"), start));
        }
        Ok(name)
    }

    fn tokenize_identifier(&mut self, start: SourceLocation) -> IrResult<TokenType> {
        let identifier = self.read_while(is_identifier_char);
        let storage = match identifier.as_str() {
            "tensor" => Storage::Tensor,
            "memref" => Storage::MemRef,
            _ => return Ok(TokenType::Identifier(identifier)),
        };
        if self.current_char() != Some('<') {
            return Ok(TokenType::Identifier(identifier));
        }

        self.advance();
        let body = self.read_while(|ch| ch != '>' && ch != '\n');
        if self.advance() != Some('>') {
            return Err(IrError::syntax(
                format!("unterminated {identifier} type, expected '>'"),
                start,
            ));
        }
        Ok(TokenType::ShapedType { storage, body })
    }

    /// Get next token
    pub fn next_token(&mut self) -> IrResult<Token> {
        self.skip_trivia();
        let start = self.current_location();

        let token_type = match self.current_char() {
            None => TokenType::EndOfFile,
            Some(ch) if ch.is_alphabetic() || ch == '_' => self.tokenize_identifier(start)?,
            Some(sigil @ ('%' | '@')) => {
                self.advance();
                let name = self.tokenize_suffix_id(sigil, start)?;
                if sigil == '%' {
                    TokenType::ValueName(name)
                } else {
                    TokenType::SymbolName(name)
                }
            }
            Some('-') if self.peek_char(1) == Some('>') => {
                self.advance();
                self.advance();
                TokenType::Arrow
            }
            Some('(') => {
                self.advance();
                TokenType::LeftParen
            }
            Some(')') => {
                self.advance();
                TokenType::RightParen
            }
            Some('{') => {
                self.advance();
                TokenType::LeftBrace
            }
            Some('}') => {
                self.advance();
                TokenType::RightBrace
            }
            Some(':') => {
                self.advance();
                TokenType::Colon
            }
            Some(',') => {
                self.advance();
                TokenType::Comma
            }
            Some('=') => {
                self.advance();
                TokenType::Equal
            }
            Some(ch) => {
                return Err(IrError::syntax(format!("unexpected character '{ch}'"), start));
            }
        };

        Ok(Token::new(token_type, self.tracker.span_from(start)))
    }

    /// Tokenize entire input; the last token is always `EndOfFile`
    pub fn tokenize(&mut self) -> IrResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = matches!(token.token_type, TokenType::EndOfFile);
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }
}
