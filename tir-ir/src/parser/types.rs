//! Type parsing
//!
//! Shaped types arrive from the lexer as one token; the body between the
//! angle brackets is split on `x` into dimensions followed by the element
//! type.

use tir_common::{IrResult, SourceLocation};
use crate::ir::{dim_from_size, Dim, ElementType, Storage, TensorType};
use crate::lexer::TokenType;
use super::{unexpected, ParseError, Parser};

impl Parser {
    /// Parse `tensor<...>` or `memref<...>`
    pub(crate) fn parse_type(&mut self) -> IrResult<TensorType> {
        let token = self.advance_token();
        match &token.token_type {
            TokenType::ShapedType { storage, body } => {
                // Body starts after `tensor<` / `memref<`
                let offset = storage.keyword().len() as u32 + 1;
                parse_shaped_body(*storage, body, token.span.start.offset_columns(offset))
            }
            _ => Err(unexpected(token.clone(), "a tensor or memref type").into()),
        }
    }

    /// Parse a result type list: `T`, `()` or `(T, T, ...)`
    pub(crate) fn parse_result_types(&mut self) -> IrResult<Vec<TensorType>> {
        if !self.match_token(&TokenType::LeftParen) {
            return Ok(vec![self.parse_type()?]);
        }
        let mut types = Vec::new();
        if !self.check(&TokenType::RightParen) {
            loop {
                types.push(self.parse_type()?);
                if !self.match_token(&TokenType::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenType::RightParen, "result type list")?;
        Ok(types)
    }
}

/// Parse `128x?xf32` where `location` is the position of the first character.
pub(crate) fn parse_shaped_body(storage: Storage, body: &str, location: SourceLocation) -> IrResult<TensorType> {
    let mut parts: Vec<(u32, &str)> = Vec::new();
    let mut offset = 0u32;
    for part in body.split('x') {
        parts.push((offset, part));
        offset += part.chars().count() as u32 + 1;
    }

    // split() always yields at least one piece
    let (element_offset, element_text) = parts.pop().unwrap_or((0, ""));
    let element = ElementType::from_keyword(element_text.trim()).ok_or_else(|| {
        ParseError::invalid(
            format!("unknown element type '{element_text}' in {}<{body}>", storage.keyword()),
            location.offset_columns(element_offset),
        )
    })?;

    let mut shape = Vec::with_capacity(parts.len());
    for (axis, (part_offset, text)) in parts.into_iter().enumerate() {
        let text = text.trim();
        let dim = if text == "?" {
            Dim::Dynamic
        } else if let Ok(size) = text.parse::<u64>() {
            Dim::Static(size)
        } else if let Ok(size) = text.parse::<i64>() {
            // Only negative sizes get here
            dim_from_size(axis, size)?
        } else {
            return Err(ParseError::invalid(
                format!("invalid dimension '{text}' in {}<{body}>", storage.keyword()),
                location.offset_columns(part_offset),
            )
            .into());
        };
        shape.push(dim);
    }

    Ok(TensorType::new(storage, shape, element))
}
