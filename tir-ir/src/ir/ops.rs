//! Operations
//!
//! The closed set of operation kinds and their construction-time type rules.

use serde::{Deserialize, Serialize};
use std::fmt;
use tir_common::{IrError, IrResult};
use crate::ir::{BlockId, Dim, FunctionType, RegionId, Storage, TensorType, ValueId};

/// Index of an operation in its module's operation arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OpId(pub(crate) u32);

impl OpId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operation #{}", self.0)
    }
}

/// Symbol visibility of a function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

/// Kind-specific part of an operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OpKind {
    /// `func.func`: a named function owning its body region
    FuncDefine {
        name: String,
        visibility: Visibility,
        signature: FunctionType,
        body: RegionId,
    },
    /// `tensor.empty`: uninitialized destination tensor
    TensorAlloc,
    /// `linalg.matmul`: operands are `[lhs, rhs, dest]`
    MatMul,
    /// `func.return`: block terminator
    Return,
}

impl OpKind {
    /// Textual operation name
    pub fn name(&self) -> &'static str {
        match self {
            OpKind::FuncDefine { .. } => "func.func",
            OpKind::TensorAlloc => "tensor.empty",
            OpKind::MatMul => "linalg.matmul",
            OpKind::Return => "func.return",
        }
    }

    pub fn is_terminator(&self) -> bool {
        matches!(self, OpKind::Return)
    }
}

/// Where an operation is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpParent {
    Block(BlockId),
    Module,
}

/// Operation data kept in the module arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub(crate) kind: OpKind,
    pub(crate) operands: Vec<ValueId>,
    pub(crate) results: Vec<ValueId>,
    pub(crate) parent: Option<OpParent>,
}

impl Operation {
    pub fn kind(&self) -> &OpKind {
        &self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn operands(&self) -> &[ValueId] {
        &self.operands
    }

    pub fn results(&self) -> &[ValueId] {
        &self.results
    }

    pub fn parent(&self) -> Option<OpParent> {
        self.parent
    }

    /// The single result of a value-producing operation
    pub fn result(&self) -> Option<ValueId> {
        match self.results.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }
}

const MATMUL: &str = "linalg.matmul";

fn dims2(ty: &TensorType, role: &str) -> IrResult<(Dim, Dim)> {
    match ty.shape.as_slice() {
        [rows, cols] => Ok((*rows, *cols)),
        _ => Err(IrError::shape_mismatch(
            MATMUL,
            format!("{role} must be rank 2, found {ty}"),
        )),
    }
}

/// Check `lhs x rhs -> dest` and return the result types.
///
/// Tensor destinations produce one result of the destination type; buffer
/// destinations are written in place and produce no result.
pub fn verify_matmul(lhs: &TensorType, rhs: &TensorType, dest: &TensorType) -> IrResult<Vec<TensorType>> {
    if lhs.storage != rhs.storage || lhs.storage != dest.storage {
        return Err(IrError::storage_mismatch(
            MATMUL,
            format!("operands {lhs}, {rhs} and {dest} mix tensors and buffers"),
        ));
    }
    if lhs.element != rhs.element || lhs.element != dest.element {
        return Err(IrError::element_mismatch(
            MATMUL,
            format!("operands have element types {}, {} and {}", lhs.element, rhs.element, dest.element),
        ));
    }

    let (m, k) = dims2(lhs, "lhs")?;
    let (k2, n) = dims2(rhs, "rhs")?;
    let (dest_m, dest_n) = dims2(dest, "dest")?;

    if !k.is_compatible(k2) {
        return Err(IrError::shape_mismatch(
            MATMUL,
            format!("inner dimensions {k} and {k2} differ ({lhs} x {rhs})"),
        ));
    }
    if !dest_m.is_compatible(m) || !dest_n.is_compatible(n) {
        return Err(IrError::shape_mismatch(
            MATMUL,
            format!("destination {dest} does not match product shape [{m}, {n}]"),
        ));
    }

    Ok(match dest.storage {
        Storage::Tensor => vec![dest.clone()],
        Storage::MemRef => Vec::new(),
    })
}
