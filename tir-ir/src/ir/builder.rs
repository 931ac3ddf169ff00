//! IR Builder
//!
//! Provides utilities for constructing IR programmatically: create an
//! entry block, append operations at the insertion point, then wrap the
//! block into a function.

use log::debug;
use tir_common::{IrError, IrResult};
use crate::ir::{check_symbol_name, BlockId, Dim, ElementType, FunctionType, Module, OpId, TensorType, ValueId, Visibility};

/// Builder appending operations to an insertion block of a borrowed module
pub struct IrBuilder<'m> {
    module: &'m mut Module,
    insertion_block: Option<BlockId>,
}

impl<'m> IrBuilder<'m> {
    pub fn new(module: &'m mut Module) -> Self {
        Self {
            module,
            insertion_block: None,
        }
    }

    pub fn module(&self) -> &Module {
        self.module
    }

    /// Create a detached block with one argument per type and insert into it.
    pub fn create_entry_block(&mut self, arg_types: &[TensorType]) -> IrResult<(BlockId, Vec<ValueId>)> {
        let block = self.module.create_block();
        let args = arg_types
            .iter()
            .map(|ty| self.module.add_block_argument(block, ty.clone()))
            .collect::<IrResult<Vec<_>>>()?;
        self.insertion_block = Some(block);
        Ok((block, args))
    }

    fn current_block(&self) -> IrResult<BlockId> {
        self.insertion_block.ok_or_else(|| IrError::InvalidParent {
            message: "builder has no insertion block".to_string(),
        })
    }

    fn insert(&mut self, op: OpId) -> IrResult<OpId> {
        let block = self.current_block()?;
        self.module.append_operation(block, op)?;
        Ok(op)
    }

    /// Append `tensor.empty` and return its result.
    pub fn tensor_empty(&mut self, shape: Vec<Dim>, element: ElementType) -> IrResult<ValueId> {
        self.current_block()?;
        let op = self.module.create_tensor_alloc(shape, element);
        self.insert(op)?;
        Ok(self.module.operation(op).results()[0])
    }

    /// Append `linalg.matmul`. Tensor destinations yield a result; buffers do not.
    pub fn matmul(&mut self, lhs: ValueId, rhs: ValueId, dest: ValueId) -> IrResult<Option<ValueId>> {
        self.current_block()?;
        let op = self.module.create_matmul(lhs, rhs, dest)?;
        self.insert(op)?;
        Ok(self.module.operation(op).result())
    }

    /// Append `func.return`.
    pub fn func_return(&mut self, operands: Vec<ValueId>) -> IrResult<OpId> {
        self.current_block()?;
        let op = self.module.create_return(operands);
        self.insert(op)
    }

    /// Wrap `entry` into a new region and function and add it to the module.
    ///
    /// The signature and symbol are checked before `entry` is attached, so a
    /// failure leaves the block free for another attempt.
    pub fn define_function(
        &mut self,
        name: &str,
        visibility: Visibility,
        signature: FunctionType,
        entry: BlockId,
    ) -> IrResult<OpId> {
        check_symbol_name(name)?;
        self.module.check_block(entry)?;
        if self.module.lookup_function(name).is_some() {
            return Err(IrError::DuplicateSymbol { name: name.to_string() });
        }
        if self.module.block(entry).parent().is_some() {
            return Err(IrError::AlreadyAttached { entity: entry.to_string() });
        }
        self.module.check_arguments(name, entry, &signature.inputs)?;

        let region = self.module.create_region();
        self.module.append_block(region, entry)?;
        let op = self.module.create_func(name, visibility, signature, region)?;
        self.module.add_function(op)?;
        debug!("defined function @{} ({} operations)", name, self.module.block(entry).operations().len());

        if self.insertion_block == Some(entry) {
            self.insertion_block = None;
        }
        Ok(op)
    }
}
