//! IR Value Representations
//!
//! SSA values are owned by their definition site (a block argument slot or
//! an operation result slot) and referenced everywhere else by `ValueId`.

use serde::{Deserialize, Serialize};
use std::fmt;
use crate::ir::{BlockId, OpId, TensorType};

/// Index of a value in its module's value arena.
///
/// Only valid within the `Module` that minted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ValueId(pub(crate) u32);

impl ValueId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "value #{}", self.0)
    }
}

/// Where a value is defined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueDef {
    BlockArgument { block: BlockId, index: usize },
    OpResult { op: OpId, index: usize },
}

/// One operand slot reading a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Use {
    pub op: OpId,
    pub operand: usize,
}

/// Per-value data kept in the module arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Value {
    pub(crate) ty: TensorType,
    pub(crate) def: ValueDef,
    /// Operand slots of attached operations, in attachment order
    pub(crate) uses: Vec<Use>,
    /// Set when an attached `linalg.matmul` takes this tensor as its destination
    pub(crate) consumed_by: Option<OpId>,
}

impl Value {
    pub(crate) fn new(ty: TensorType, def: ValueDef) -> Self {
        Self {
            ty,
            def,
            uses: Vec::new(),
            consumed_by: None,
        }
    }

    pub fn ty(&self) -> &TensorType {
        &self.ty
    }

    pub fn def(&self) -> ValueDef {
        self.def
    }

    pub fn uses(&self) -> &[Use] {
        &self.uses
    }

    pub fn consumed_by(&self) -> Option<OpId> {
        self.consumed_by
    }
}
