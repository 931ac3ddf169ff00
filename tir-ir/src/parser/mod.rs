//! IR Recursive Descent Parser
//!
//! Parses the textual form produced by the printer back into a `Module`.
//! The parser works on the token stream with one token of lookahead and
//! builds the module through the same checked construction calls as
//! hand-written builder code, so a parsed module satisfies every invariant
//! a built one does. Model violations (shape mismatches, duplicate symbols,
//! ...) surface as their own error kinds; everything about the text itself
//! is an `IrError::Syntax` carrying a line and column.

pub mod errors;
pub mod types;
pub mod operations;

use log::debug;
use std::collections::{HashMap, VecDeque};
use tir_common::{IrResult, SourceLocation, SourceSpan};
use crate::ir::{make_function_type, BlockId, Module, TensorType, ValueId, Visibility};
use crate::lexer::{Lexer, Token, TokenType};

pub use errors::ParseError;

/// Parse IR text into a verified module.
pub fn parse_module(text: &str) -> IrResult<Module> {
    let tokens = Lexer::new(text).tokenize()?;
    debug!("lexed {} tokens", tokens.len());
    Parser::new(tokens).parse_module()
}

/// Value names visible inside one function body
#[derive(Default)]
pub(crate) struct ValueScope {
    names: HashMap<String, ValueId>,
}

impl ValueScope {
    pub(crate) fn define(&mut self, name: String, value: ValueId, location: SourceLocation) -> Result<(), ParseError> {
        if self.names.contains_key(&name) {
            return Err(ParseError::Redefinition { name, location });
        }
        self.names.insert(name, value);
        Ok(())
    }

    pub(crate) fn lookup(&self, name: &str, location: SourceLocation) -> Result<ValueId, ParseError> {
        self.names.get(name).copied().ok_or_else(|| ParseError::UndefinedValue {
            name: name.to_string(),
            location,
        })
    }
}

/// Error for `token` when `expected` was wanted
pub(crate) fn unexpected(token: Token, expected: &str) -> ParseError {
    if matches!(token.token_type, TokenType::EndOfFile) {
        ParseError::UnexpectedEndOfFile {
            expected: expected.to_string(),
            location: token.span.start,
        }
    } else {
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: token,
        }
    }
}

/// IR Parser
pub struct Parser {
    pub(crate) tokens: VecDeque<Token>,
    pub(crate) module: Module,
    eof: Token,
}

impl Parser {
    /// Create a new parser over a token stream ending in `EndOfFile`
    pub fn new(tokens: Vec<Token>) -> Self {
        let eof_location = tokens
            .last()
            .map(|t| t.span.end)
            .unwrap_or_else(|| SourceLocation::new(1, 1));
        Self {
            tokens: tokens.into(),
            module: Module::new(),
            eof: Token::new(TokenType::EndOfFile, SourceSpan::from_location(eof_location)),
        }
    }

    /// Peek at current token without consuming
    pub(crate) fn peek(&self) -> &Token {
        self.tokens.front().unwrap_or(&self.eof)
    }

    /// Get current token and advance; stays on `EndOfFile` once reached
    pub(crate) fn advance_token(&mut self) -> Token {
        if self.check(&TokenType::EndOfFile) {
            return self.eof.clone();
        }
        self.tokens.pop_front().unwrap_or_else(|| self.eof.clone())
    }

    /// Check if current token matches expected type
    pub(crate) fn check(&self, token_type: &TokenType) -> bool {
        std::mem::discriminant(&self.peek().token_type) == std::mem::discriminant(token_type)
    }

    /// Check for a specific bare identifier
    pub(crate) fn check_keyword(&self, keyword: &str) -> bool {
        matches!(&self.peek().token_type, TokenType::Identifier(name) if name == keyword)
    }

    /// Consume token if it matches expected type
    pub(crate) fn match_token(&mut self, token_type: &TokenType) -> bool {
        if self.check(token_type) {
            self.advance_token();
            true
        } else {
            false
        }
    }

    /// Expect and consume a specific token type
    pub(crate) fn expect(&mut self, token_type: TokenType, context: &str) -> Result<Token, ParseError> {
        if self.check(&token_type) {
            Ok(self.advance_token())
        } else {
            let token = self.advance_token();
            Err(unexpected(token, &format!("'{token_type}' in {context}")))
        }
    }

    /// Expect a specific bare identifier such as `ins` or `func.func`
    pub(crate) fn expect_keyword(&mut self, keyword: &str) -> Result<SourceLocation, ParseError> {
        if self.check_keyword(keyword) {
            Ok(self.advance_token().span.start)
        } else {
            let token = self.advance_token();
            Err(unexpected(token, &format!("'{keyword}'")))
        }
    }

    pub(crate) fn expect_identifier(&mut self, context: &str) -> Result<(String, SourceLocation), ParseError> {
        let token = self.advance_token();
        match token.token_type {
            TokenType::Identifier(name) => Ok((name, token.span.start)),
            _ => Err(unexpected(token, context)),
        }
    }

    pub(crate) fn expect_value_name(&mut self) -> Result<(String, SourceLocation), ParseError> {
        let token = self.advance_token();
        match token.token_type {
            TokenType::ValueName(name) => Ok((name, token.span.start)),
            _ => Err(unexpected(token, "a value name")),
        }
    }

    pub(crate) fn expect_symbol_name(&mut self) -> Result<(String, SourceLocation), ParseError> {
        let token = self.advance_token();
        match token.token_type {
            TokenType::SymbolName(name) => Ok((name, token.span.start)),
            _ => Err(unexpected(token, "a symbol name")),
        }
    }

    /// Get current location for error reporting
    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().span.start
    }

    /// Parse a complete module and verify it
    pub fn parse_module(mut self) -> IrResult<Module> {
        if !self.check_keyword("builtin.module") {
            self.expect_keyword("module")?;
        } else {
            self.advance_token();
        }
        let name = if self.check(&TokenType::SymbolName(String::new())) {
            Some(self.expect_symbol_name()?.0)
        } else {
            None
        };
        self.module = match name {
            Some(name) => Module::with_name(name)?,
            None => Module::new(),
        };

        self.expect(TokenType::LeftBrace, "module")?;
        while !self.check(&TokenType::RightBrace) {
            self.parse_function()?;
        }
        self.expect(TokenType::RightBrace, "module")?;
        self.expect(TokenType::EndOfFile, "module")?;

        self.module.verify()?;
        debug!("parsed module with {} functions", self.module.function_count());
        Ok(self.module)
    }

    /// Parse `func.func [private|public] @name(%a: T, ...) [-> results] { ... }`
    fn parse_function(&mut self) -> IrResult<()> {
        self.expect_keyword("func.func")?;
        let visibility = if self.check_keyword("private") {
            self.advance_token();
            Visibility::Private
        } else {
            if self.check_keyword("public") {
                self.advance_token();
            }
            Visibility::Public
        };
        let (name, _) = self.expect_symbol_name()?;

        let block = self.module.create_block();
        let mut scope = ValueScope::default();
        let inputs = self.parse_arguments(block, &mut scope)?;
        let results = if self.match_token(&TokenType::Arrow) {
            self.parse_result_types()?
        } else {
            Vec::new()
        };

        self.expect(TokenType::LeftBrace, "function body")?;
        while !self.check(&TokenType::RightBrace) {
            if self.check(&TokenType::EndOfFile) {
                self.expect(TokenType::RightBrace, "function body")?;
            }
            self.parse_operation(block, &mut scope)?;
        }
        self.expect(TokenType::RightBrace, "function body")?;

        let region = self.module.create_region();
        self.module.append_block(region, block)?;
        let func = self
            .module
            .create_func(name.as_str(), visibility, make_function_type(inputs, results), region)?;
        self.module.add_function(func)?;
        debug!("parsed function @{}", name);
        Ok(())
    }

    /// Parse `(%a: T, ...)`, declaring each argument on `block`
    fn parse_arguments(&mut self, block: BlockId, scope: &mut ValueScope) -> IrResult<Vec<TensorType>> {
        self.expect(TokenType::LeftParen, "function arguments")?;
        let mut inputs = Vec::new();
        if !self.check(&TokenType::RightParen) {
            loop {
                let (name, location) = self.expect_value_name()?;
                self.expect(TokenType::Colon, "function argument")?;
                let ty = self.parse_type()?;
                let value = self.module.add_block_argument(block, ty.clone())?;
                scope.define(name, value, location)?;
                inputs.push(ty);
                if !self.match_token(&TokenType::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenType::RightParen, "function arguments")?;
        Ok(inputs)
    }
}
