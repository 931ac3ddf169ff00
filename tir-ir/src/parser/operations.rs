//! Operation parsing
//!
//! One operation per statement:
//!
//! ```text
//! %2 = tensor.empty() : tensor<128x256xf32>
//! %3 = linalg.matmul ins(%0, %1 : T0, T1) outs(%2 : T2) -> T2
//! func.return %3 : T2
//! ```

use tir_common::{IrResult, SourceLocation};
use crate::ir::{BlockId, OpId, Storage, ValueId};
use crate::lexer::TokenType;
use super::{ParseError, Parser, ValueScope};

impl Parser {
    /// Parse one operation, append it to `block` and bind its result names.
    pub(crate) fn parse_operation(&mut self, block: BlockId, scope: &mut ValueScope) -> IrResult<()> {
        let mut bound: Vec<(String, SourceLocation)> = Vec::new();
        if self.check(&TokenType::ValueName(String::new())) {
            loop {
                bound.push(self.expect_value_name()?);
                if !self.match_token(&TokenType::Comma) {
                    break;
                }
            }
            self.expect(TokenType::Equal, "result binding")?;
        }

        let (keyword, location) = self.expect_identifier("an operation name")?;
        let op = match keyword.as_str() {
            "tensor.empty" => self.parse_tensor_empty(location)?,
            "linalg.matmul" => self.parse_matmul(scope, location)?,
            "func.return" => self.parse_return(scope)?,
            other => {
                return Err(ParseError::invalid(format!("unknown operation '{other}'"), location).into());
            }
        };

        let results = self.module.operation(op).results().to_vec();
        if bound.len() != results.len() {
            return Err(ParseError::invalid(
                format!("{keyword} produces {} results but {} names are bound", results.len(), bound.len()),
                location,
            )
            .into());
        }

        self.module.append_operation(block, op)?;
        for ((name, name_location), value) in bound.into_iter().zip(results) {
            scope.define(name, value, name_location)?;
        }
        Ok(())
    }

    /// `tensor.empty() : tensor<...>`
    fn parse_tensor_empty(&mut self, location: SourceLocation) -> IrResult<OpId> {
        self.expect(TokenType::LeftParen, "tensor.empty")?;
        self.expect(TokenType::RightParen, "tensor.empty")?;
        self.expect(TokenType::Colon, "tensor.empty")?;
        let ty = self.parse_type()?;
        if ty.storage != Storage::Tensor {
            return Err(ParseError::invalid(format!("tensor.empty cannot produce {ty}"), location).into());
        }
        Ok(self.module.create_tensor_alloc(ty.shape, ty.element))
    }

    /// `linalg.matmul ins(%a, %b : Ta, Tb) outs(%c : Tc) [-> T]`
    fn parse_matmul(&mut self, scope: &ValueScope, location: SourceLocation) -> IrResult<OpId> {
        self.expect_keyword("ins")?;
        self.expect(TokenType::LeftParen, "linalg.matmul inputs")?;
        let inputs = self.parse_typed_operands(scope)?;
        self.expect(TokenType::RightParen, "linalg.matmul inputs")?;

        self.expect_keyword("outs")?;
        self.expect(TokenType::LeftParen, "linalg.matmul outputs")?;
        let outputs = self.parse_typed_operands(scope)?;
        self.expect(TokenType::RightParen, "linalg.matmul outputs")?;

        let (lhs, rhs, dest) = match (inputs.as_slice(), outputs.as_slice()) {
            ([lhs, rhs], [dest]) => (*lhs, *rhs, *dest),
            _ => {
                return Err(ParseError::invalid(
                    format!(
                        "linalg.matmul takes 2 inputs and 1 output, found {} and {}",
                        inputs.len(),
                        outputs.len()
                    ),
                    location,
                )
                .into());
            }
        };
        let op = self.module.create_matmul(lhs, rhs, dest)?;

        if self.match_token(&TokenType::Arrow) {
            let declared = self.parse_result_types()?;
            let results = self.module.operation(op).results();
            if declared.len() != results.len() {
                return Err(ParseError::invalid(
                    format!("linalg.matmul yields {} results, {} declared", results.len(), declared.len()),
                    location,
                )
                .into());
            }
            for (ty, &result) in declared.iter().zip(results) {
                ty.ensure_same(self.module.value_type(result), "linalg.matmul")?;
            }
        }
        Ok(op)
    }

    /// `func.return [%a, ... : T, ...]`
    fn parse_return(&mut self, scope: &ValueScope) -> IrResult<OpId> {
        let operands = if self.check(&TokenType::ValueName(String::new())) {
            self.parse_typed_operands(scope)?
        } else {
            Vec::new()
        };
        Ok(self.module.create_return(operands))
    }

    /// `%a, %b : Ta, Tb`; every annotation must equal the value's type
    fn parse_typed_operands(&mut self, scope: &ValueScope) -> IrResult<Vec<ValueId>> {
        let mut operands: Vec<(String, ValueId, SourceLocation)> = Vec::new();
        loop {
            let (name, location) = self.expect_value_name()?;
            let value = scope.lookup(&name, location)?;
            operands.push((name, value, location));
            if !self.match_token(&TokenType::Comma) {
                break;
            }
        }

        self.expect(TokenType::Colon, "operand types")?;
        for (index, (name, value, location)) in operands.iter().enumerate() {
            if index > 0 {
                self.expect(TokenType::Comma, "operand types")?;
            }
            let type_location = self.current_location();
            let annotated = self.parse_type()?;
            let actual = self.module.value_type(*value);
            if &annotated != actual {
                return Err(ParseError::invalid(
                    format!("%{name} (defined at {location}) has type {actual}, annotated as {annotated}"),
                    type_location,
                )
                .into());
            }
        }

        Ok(operands.into_iter().map(|(_, value, _)| value).collect())
    }
}
