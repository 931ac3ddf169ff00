//! Tensor IR - Intermediate Representation
//!
//! A small typed IR for tensor programs: shaped tensor and buffer types,
//! SSA values, and the `func.func`, `tensor.empty`, `linalg.matmul` and
//! `func.return` operations arranged as module -> function -> region ->
//! block -> operation. Modules can be built programmatically, printed to
//! an MLIR-style text form and parsed back.

pub mod ir;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod samples;

pub use ir::{
    check_symbol_name, make_function_type, make_memref_type, make_tensor_type, Dim, ElementType, FunctionRef,
    FunctionType, IrBuilder, Module, OpId, OpKind, Storage, TensorType, ValueId, Visibility,
};
pub use parser::parse_module;
pub use printer::{print_module, ModulePrinter};
pub use tir_common::{IrError, IrResult, SourceLocation};
