//! Module
//!
//! The module owns every value, operation, block and region in arenas and
//! hands out copyable ids. Parent links implement the single-owner tree:
//! an entity can be attached once and never moved.
//!
//! Entities are created detached (`create_*`) and then attached
//! (`append_block`, `append_operation`, `add_function`). Every attach
//! validates before it mutates, so a failed call leaves the attached tree
//! exactly as it was. Ids handed to those calls are checked against the
//! arenas; the plain accessors (`value`, `operation`, ...) index directly
//! and panic on an id this module never minted.

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tir_common::{IrError, IrResult};
use crate::ir::{
    verify_matmul, Block, BlockId, Dim, ElementType, FunctionType, OpId, OpKind, OpParent,
    Operation, Region, RegionId, TensorType, Use, Value, ValueDef, ValueId, Visibility,
};

/// Characters the text form reads back after `@`
pub fn is_symbol_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '.' | '$' | '-')
}

/// Reject function and module names that would not survive a print/parse round trip.
pub fn check_symbol_name(name: &str) -> IrResult<()> {
    if name.is_empty() {
        return Err(IrError::InvalidSymbol {
            name: String::new(),
            message: "symbol names cannot be empty".to_string(),
        });
    }
    match name.chars().find(|&ch| !is_symbol_char(ch)) {
        Some(ch) => Err(IrError::InvalidSymbol {
            name: name.to_string(),
            message: format!("character {ch:?} cannot appear in a symbol"),
        }),
        None => Ok(()),
    }
}

fn ensure_known(arena_len: usize, index: usize, entity: impl fmt::Display) -> IrResult<()> {
    if index < arena_len {
        Ok(())
    } else {
        Err(IrError::UnknownEntity { entity: entity.to_string() })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    name: Option<String>,
    values: Vec<Value>,
    operations: Vec<Operation>,
    blocks: Vec<Block>,
    regions: Vec<Region>,
    /// Top-level `func.func` operations in insertion order
    functions: Vec<OpId>,
    symbols: HashMap<String, OpId>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    /// Module printed as `builtin.module @name`
    pub fn with_name(name: impl Into<String>) -> IrResult<Self> {
        let name = name.into();
        check_symbol_name(&name)?;
        Ok(Self {
            name: Some(name),
            ..Self::default()
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn value(&self, id: ValueId) -> &Value {
        &self.values[id.index()]
    }

    pub fn value_type(&self, id: ValueId) -> &TensorType {
        &self.values[id.index()].ty
    }

    pub fn operation(&self, id: OpId) -> &Operation {
        &self.operations[id.index()]
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.index()]
    }

    pub fn region(&self, id: RegionId) -> &Region {
        &self.regions[id.index()]
    }

    pub(crate) fn check_value(&self, id: ValueId) -> IrResult<()> {
        ensure_known(self.values.len(), id.index(), id)
    }

    pub(crate) fn check_operation(&self, id: OpId) -> IrResult<()> {
        ensure_known(self.operations.len(), id.index(), id)
    }

    pub(crate) fn check_block(&self, id: BlockId) -> IrResult<()> {
        ensure_known(self.blocks.len(), id.index(), id)
    }

    pub(crate) fn check_region(&self, id: RegionId) -> IrResult<()> {
        ensure_known(self.regions.len(), id.index(), id)
    }

    pub fn create_block(&mut self) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(Block::new());
        id
    }

    pub fn create_region(&mut self) -> RegionId {
        let id = RegionId(self.regions.len() as u32);
        self.regions.push(Region::new());
        id
    }

    /// Declare the next argument of `block`.
    ///
    /// Arguments are fixed once the block holds operations or belongs to a
    /// function body.
    pub fn add_block_argument(&mut self, block: BlockId, ty: TensorType) -> IrResult<ValueId> {
        self.check_block(block)?;
        let data = &self.blocks[block.index()];
        if !data.is_empty() {
            return Err(IrError::ArgumentsFrozen {
                block: block.to_string(),
                message: "block already contains operations".to_string(),
            });
        }
        if let Some(owner) = data.parent.and_then(|region| self.regions[region.index()].parent) {
            return Err(IrError::ArgumentsFrozen {
                block: block.to_string(),
                message: format!("block is the body of {owner}"),
            });
        }

        let index = data.arguments.len();
        let value = self.push_value(ty, ValueDef::BlockArgument { block, index });
        self.blocks[block.index()].arguments.push(value);
        Ok(value)
    }

    /// Attach a detached block to a region.
    pub fn append_block(&mut self, region: RegionId, block: BlockId) -> IrResult<()> {
        self.check_region(region)?;
        self.check_block(block)?;
        if self.blocks[block.index()].parent.is_some() {
            return Err(IrError::AlreadyAttached { entity: block.to_string() });
        }
        if !self.regions[region.index()].blocks.is_empty() {
            return Err(IrError::InvalidParent {
                message: format!("{region} already holds its entry block"),
            });
        }

        self.regions[region.index()].blocks.push(block);
        self.blocks[block.index()].parent = Some(region);
        Ok(())
    }

    fn push_value(&mut self, ty: TensorType, def: ValueDef) -> ValueId {
        let id = ValueId(self.values.len() as u32);
        self.values.push(Value::new(ty, def));
        id
    }

    /// Create a detached operation, minting one result value per result type.
    fn push_operation(&mut self, kind: OpKind, operands: Vec<ValueId>, result_types: Vec<TensorType>) -> OpId {
        let op = OpId(self.operations.len() as u32);
        let results = result_types
            .into_iter()
            .enumerate()
            .map(|(index, ty)| self.push_value(ty, ValueDef::OpResult { op, index }))
            .collect();
        self.operations.push(Operation {
            kind,
            operands,
            results,
            parent: None,
        });
        op
    }

    /// `tensor.empty`: an uninitialized destination tensor.
    pub fn create_tensor_alloc(&mut self, shape: Vec<Dim>, element: ElementType) -> OpId {
        let ty = TensorType::tensor(shape, element);
        self.push_operation(OpKind::TensorAlloc, Vec::new(), vec![ty])
    }

    /// `linalg.matmul` in destination-passing style.
    pub fn create_matmul(&mut self, lhs: ValueId, rhs: ValueId, dest: ValueId) -> IrResult<OpId> {
        for operand in [lhs, rhs, dest] {
            self.check_value(operand)?;
        }
        let results = verify_matmul(self.value_type(lhs), self.value_type(rhs), self.value_type(dest))?;
        Ok(self.push_operation(OpKind::MatMul, vec![lhs, rhs, dest], results))
    }

    /// `func.return`. Placement and operands are checked when it is appended.
    pub fn create_return(&mut self, operands: Vec<ValueId>) -> OpId {
        self.push_operation(OpKind::Return, operands, Vec::new())
    }

    /// `func.func` owning `body`, whose entry block arguments must match
    /// `signature.inputs`.
    pub fn create_func(
        &mut self,
        name: impl Into<String>,
        visibility: Visibility,
        signature: FunctionType,
        body: RegionId,
    ) -> IrResult<OpId> {
        let name = name.into();
        check_symbol_name(&name)?;
        self.check_region(body)?;
        let region = &self.regions[body.index()];
        if region.parent.is_some() {
            return Err(IrError::AlreadyAttached { entity: body.to_string() });
        }
        let entry = region
            .entry_block()
            .ok_or_else(|| IrError::signature_mismatch(&name, "body region has no entry block"))?;
        self.check_arguments(&name, entry, &signature.inputs)?;

        let op = self.push_operation(
            OpKind::FuncDefine { name, visibility, signature, body },
            Vec::new(),
            Vec::new(),
        );
        self.regions[body.index()].parent = Some(op);
        Ok(op)
    }

    pub(crate) fn check_arguments(&self, name: &str, entry: BlockId, inputs: &[TensorType]) -> IrResult<()> {
        let arguments = &self.blocks[entry.index()].arguments;
        if arguments.len() != inputs.len() {
            return Err(IrError::signature_mismatch(
                name,
                format!(
                    "entry block has {} arguments, signature declares {} inputs",
                    arguments.len(),
                    inputs.len()
                ),
            ));
        }
        for (index, (&arg, input)) in arguments.iter().zip(inputs).enumerate() {
            let actual = self.value_type(arg);
            if actual != input {
                return Err(IrError::signature_mismatch(
                    name,
                    format!("argument {index} has type {actual}, signature declares {input}"),
                ));
            }
        }
        Ok(())
    }

    /// Attach a detached operation at the end of `block`.
    ///
    /// Every operand must be defined earlier in the same block and must not
    /// have been moved into a tensor `linalg.matmul` destination.
    pub fn append_operation(&mut self, block: BlockId, op: OpId) -> IrResult<()> {
        self.check_block(block)?;
        self.check_operation(op)?;
        let data = &self.operations[op.index()];
        if data.parent.is_some() {
            return Err(IrError::AlreadyAttached {
                entity: format!("{op} ({})", data.name()),
            });
        }
        if let OpKind::FuncDefine { name, .. } = &data.kind {
            return Err(IrError::InvalidParent {
                message: format!("func.func @{name} belongs to a module, not a block"),
            });
        }
        if let Some(last) = self.blocks[block.index()].last_operation() {
            if self.operations[last.index()].kind.is_terminator() {
                return Err(IrError::MisplacedTerminator {
                    message: format!("cannot append {} after func.return in {block}", data.name()),
                });
            }
        }
        for (slot, &operand) in data.operands.iter().enumerate() {
            self.check_value(operand)?;
            self.check_dominance(block, operand, data.name(), slot)?;
            if let Some(consumer) = self.values[operand.index()].consumed_by {
                return Err(IrError::ValueConsumed {
                    message: format!(
                        "operand {slot} of {} reads {operand}, which was moved into the destination of {consumer}",
                        data.name()
                    ),
                });
            }
        }

        let operands = data.operands.clone();
        let moved = self.moved_destination(op);
        for (slot, &operand) in operands.iter().enumerate() {
            self.values[operand.index()].uses.push(Use { op, operand: slot });
        }
        if let Some(dest) = moved {
            self.values[dest.index()].consumed_by = Some(op);
        }
        self.operations[op.index()].parent = Some(OpParent::Block(block));
        self.blocks[block.index()].operations.push(op);
        trace!("appended {} ({}) to {}", op, self.operations[op.index()].name(), block);
        Ok(())
    }

    /// Tensor destinations are moved into the matmul; buffers are written in place.
    fn moved_destination(&self, op: OpId) -> Option<ValueId> {
        let data = &self.operations[op.index()];
        match (&data.kind, data.operands.as_slice()) {
            (OpKind::MatMul, [_, _, dest]) if !self.value_type(*dest).is_buffer() => Some(*dest),
            _ => None,
        }
    }

    fn check_dominance(&self, block: BlockId, value: ValueId, op_name: &str, slot: usize) -> IrResult<()> {
        let defined_here = match self.values[value.index()].def {
            ValueDef::BlockArgument { block: owner, .. } => owner == block,
            ValueDef::OpResult { op: producer, .. } => {
                self.operations[producer.index()].parent == Some(OpParent::Block(block))
            }
        };
        if defined_here {
            Ok(())
        } else {
            Err(IrError::Dominance {
                message: format!("operand {slot} of {op_name} uses {value}, which is not defined earlier in {block}"),
            })
        }
    }

    /// Attach a `func.func` to the module, registering its symbol.
    pub fn add_function(&mut self, op: OpId) -> IrResult<()> {
        self.check_operation(op)?;
        let data = &self.operations[op.index()];
        let name = match &data.kind {
            OpKind::FuncDefine { name, .. } => name.clone(),
            other => {
                return Err(IrError::InvalidParent {
                    message: format!("only func.func can be added to a module, found {}", other.name()),
                })
            }
        };
        if data.parent.is_some() {
            return Err(IrError::AlreadyAttached { entity: format!("func.func @{name}") });
        }
        if self.symbols.contains_key(&name) {
            return Err(IrError::DuplicateSymbol { name });
        }

        debug!("adding function @{} to module", name);
        self.operations[op.index()].parent = Some(OpParent::Module);
        self.symbols.insert(name, op);
        self.functions.push(op);
        Ok(())
    }

    /// Top-level functions in insertion order
    pub fn functions(&self) -> impl Iterator<Item = FunctionRef<'_>> + '_ {
        self.functions.iter().filter_map(move |&op| FunctionRef::new(self, op))
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn lookup_function(&self, name: &str) -> Option<FunctionRef<'_>> {
        let op = *self.symbols.get(name)?;
        FunctionRef::new(self, op)
    }

    /// Check the invariants that may be deferred while a body is built:
    /// every function body ends in `func.return` yielding the declared results.
    pub fn verify(&self) -> IrResult<()> {
        for func in self.functions() {
            self.verify_function(&func)?;
        }
        Ok(())
    }

    fn verify_function(&self, func: &FunctionRef<'_>) -> IrResult<()> {
        let name = func.name();
        let entry = func
            .entry_block()
            .ok_or_else(|| IrError::signature_mismatch(name, "body region has no entry block"))?;
        self.check_arguments(name, entry, &func.signature().inputs)?;

        let terminator = self
            .block(entry)
            .last_operation()
            .filter(|&op| self.operation(op).kind.is_terminator())
            .ok_or_else(|| IrError::MissingTerminator { function: name.to_string() })?;

        let returned = self.operation(terminator).operands();
        let expected = &func.signature().results;
        if returned.len() != expected.len() {
            return Err(IrError::signature_mismatch(
                name,
                format!(
                    "func.return yields {} values, signature declares {} results",
                    returned.len(),
                    expected.len()
                ),
            ));
        }
        for (index, (&value, expected)) in returned.iter().zip(expected).enumerate() {
            let actual = self.value_type(value);
            if actual != expected {
                return Err(IrError::signature_mismatch(
                    name,
                    format!("result {index} has type {actual}, signature declares {expected}"),
                ));
            }
        }
        Ok(())
    }
}

/// Borrowed view of one `func.func` in a module
#[derive(Debug, Clone, Copy)]
pub struct FunctionRef<'m> {
    module: &'m Module,
    op: OpId,
    name: &'m str,
    visibility: Visibility,
    signature: &'m FunctionType,
    body: RegionId,
}

impl<'m> FunctionRef<'m> {
    fn new(module: &'m Module, op: OpId) -> Option<Self> {
        match &module.operation(op).kind {
            OpKind::FuncDefine { name, visibility, signature, body } => Some(Self {
                module,
                op,
                name,
                visibility: *visibility,
                signature,
                body: *body,
            }),
            _ => None,
        }
    }

    pub fn op(&self) -> OpId {
        self.op
    }

    pub fn name(&self) -> &'m str {
        self.name
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn signature(&self) -> &'m FunctionType {
        self.signature
    }

    pub fn body(&self) -> RegionId {
        self.body
    }

    pub fn entry_block(&self) -> Option<BlockId> {
        self.module.region(self.body).entry_block()
    }

    pub fn arguments(&self) -> &'m [ValueId] {
        match self.entry_block() {
            Some(block) => self.module.block(block).arguments(),
            None => &[],
        }
    }

    pub fn operations(&self) -> &'m [OpId] {
        match self.entry_block() {
            Some(block) => self.module.block(block).operations(),
            None => &[],
        }
    }
}
