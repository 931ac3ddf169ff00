//! Blocks and Regions
//!
//! A block is an argument list plus an ordered operation list; a region is
//! an ordered list of blocks owned by one operation.

use serde::{Deserialize, Serialize};
use std::fmt;
use crate::ir::{OpId, ValueId};

/// Index of a block in its module's block arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockId(pub(crate) u32);

impl BlockId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block #{}", self.0)
    }
}

/// Index of a region in its module's region arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegionId(pub(crate) u32);

impl RegionId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region #{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub(crate) arguments: Vec<ValueId>,
    pub(crate) operations: Vec<OpId>,
    pub(crate) parent: Option<RegionId>,
}

impl Block {
    pub(crate) fn new() -> Self {
        Self {
            arguments: Vec::new(),
            operations: Vec::new(),
            parent: None,
        }
    }

    pub fn arguments(&self) -> &[ValueId] {
        &self.arguments
    }

    pub fn operations(&self) -> &[OpId] {
        &self.operations
    }

    pub fn parent(&self) -> Option<RegionId> {
        self.parent
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn last_operation(&self) -> Option<OpId> {
        self.operations.last().copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub(crate) blocks: Vec<BlockId>,
    pub(crate) parent: Option<OpId>,
}

impl Region {
    pub(crate) fn new() -> Self {
        Self {
            blocks: Vec::new(),
            parent: None,
        }
    }

    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    pub fn parent(&self) -> Option<OpId> {
        self.parent
    }

    /// Regions hold a single block; it is the entry block.
    pub fn entry_block(&self) -> Option<BlockId> {
        self.blocks.first().copied()
    }
}
