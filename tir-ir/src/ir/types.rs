//! IR Type System
//!
//! Element types, shaped tensor/buffer types and function signatures.
//! All types are plain values compared structurally.

use serde::{Deserialize, Serialize};
use std::fmt;
use tir_common::{IrError, IrResult};

/// Scalar element kind of a shaped type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    F16,
    F32,
    F64,
    I32,
    I64,
}

impl ElementType {
    /// Parse the textual spelling (`f32`, `i64`, ...)
    pub fn from_keyword(text: &str) -> Option<Self> {
        match text {
            "f16" => Some(ElementType::F16),
            "f32" => Some(ElementType::F32),
            "f64" => Some(ElementType::F64),
            "i32" => Some(ElementType::I32),
            "i64" => Some(ElementType::I64),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            ElementType::F16 => "f16",
            ElementType::F32 => "f32",
            ElementType::F64 => "f64",
            ElementType::I32 => "i32",
            ElementType::I64 => "i64",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// One dimension of a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dim {
    Static(u64),
    /// Size unknown until a later stage; printed as `?`
    Dynamic,
}

impl Dim {
    /// A dynamic dimension matches any size
    pub fn is_compatible(self, other: Dim) -> bool {
        match (self, other) {
            (Dim::Dynamic, _) | (_, Dim::Dynamic) => true,
            (Dim::Static(a), Dim::Static(b)) => a == b,
        }
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dim::Static(size) => write!(f, "{size}"),
            Dim::Dynamic => write!(f, "?"),
        }
    }
}

/// Whether a shaped type is an immutable tensor value or a mutable buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Storage {
    Tensor,
    MemRef,
}

impl Storage {
    pub fn keyword(&self) -> &'static str {
        match self {
            Storage::Tensor => "tensor",
            Storage::MemRef => "memref",
        }
    }
}

/// Shaped, element-typed tensor or buffer type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TensorType {
    pub storage: Storage,
    pub shape: Vec<Dim>,
    pub element: ElementType,
}

impl TensorType {
    pub fn new(storage: Storage, shape: Vec<Dim>, element: ElementType) -> Self {
        Self { storage, shape, element }
    }

    /// Tensor type from explicit dimensions
    pub fn tensor(shape: Vec<Dim>, element: ElementType) -> Self {
        Self::new(Storage::Tensor, shape, element)
    }

    /// Buffer type from explicit dimensions
    pub fn memref(shape: Vec<Dim>, element: ElementType) -> Self {
        Self::new(Storage::MemRef, shape, element)
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn is_buffer(&self) -> bool {
        self.storage == Storage::MemRef
    }

    /// Fail with the most specific mismatch between `self` (expected) and `actual`.
    pub fn ensure_same(&self, actual: &TensorType, op: &str) -> IrResult<()> {
        if self.storage != actual.storage {
            return Err(IrError::storage_mismatch(
                op,
                format!("expected {}, found {}", self, actual),
            ));
        }
        if self.element != actual.element {
            return Err(IrError::element_mismatch(
                op,
                format!("expected {}, found {}", self, actual),
            ));
        }
        if self.shape != actual.shape {
            return Err(IrError::shape_mismatch(
                op,
                format!("expected {}, found {}", self, actual),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for TensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<", self.storage.keyword())?;
        for dim in &self.shape {
            write!(f, "{dim}x")?;
        }
        write!(f, "{}>", self.element)
    }
}

/// Ordered inputs and results of a function
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionType {
    pub inputs: Vec<TensorType>,
    pub results: Vec<TensorType>,
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, input) in self.inputs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{input}")?;
        }
        write!(f, ") -> ")?;
        write_result_types(f, &self.results)
    }
}

/// Writes `t`, `(t0, t1)` or `()` for a result list.
pub(crate) fn write_result_types(f: &mut impl fmt::Write, results: &[TensorType]) -> fmt::Result {
    if results.len() == 1 {
        return write!(f, "{}", results[0]);
    }
    write!(f, "(")?;
    for (i, result) in results.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{result}")?;
    }
    write!(f, ")")
}

/// Static dimension `axis` of `size`; negative sizes are an invalid shape.
pub fn dim_from_size(axis: usize, size: i64) -> IrResult<Dim> {
    u64::try_from(size).map(Dim::Static).map_err(|_| IrError::InvalidShape {
        message: format!("dimension {axis} has negative size {size}; use Dim::Dynamic for unknown sizes"),
    })
}

fn dims_from_sizes(sizes: &[i64]) -> IrResult<Vec<Dim>> {
    sizes
        .iter()
        .enumerate()
        .map(|(axis, &size)| dim_from_size(axis, size))
        .collect()
}

/// Build a tensor type from concrete sizes. Negative sizes are rejected.
pub fn make_tensor_type(sizes: &[i64], element: ElementType) -> IrResult<TensorType> {
    Ok(TensorType::tensor(dims_from_sizes(sizes)?, element))
}

/// Build a buffer type from concrete sizes. Negative sizes are rejected.
pub fn make_memref_type(sizes: &[i64], element: ElementType) -> IrResult<TensorType> {
    Ok(TensorType::memref(dims_from_sizes(sizes)?, element))
}

pub fn make_function_type(inputs: Vec<TensorType>, results: Vec<TensorType>) -> FunctionType {
    FunctionType { inputs, results }
}
