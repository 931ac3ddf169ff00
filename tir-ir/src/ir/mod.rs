//! Typed tensor IR
//!
//! ## Architecture
//!
//! - `types` - Element, shaped and function types
//! - `values` - SSA values, definition sites and use lists
//! - `ops` - Operation kinds and their type rules
//! - `blocks` - Blocks and regions
//! - `module` - Arena-owning module, attachment and verification
//! - `builder` - Insertion-point construction helpers
//! - `equivalence` - Structural comparison of modules

pub use self::types::{
    dim_from_size, make_function_type, make_memref_type, make_tensor_type, Dim, ElementType, FunctionType,
    Storage, TensorType,
};
pub use self::values::{Use, Value, ValueDef, ValueId};
pub use self::ops::{verify_matmul, OpId, OpKind, OpParent, Operation, Visibility};
pub use self::blocks::{Block, BlockId, Region, RegionId};
pub use self::module::{check_symbol_name, is_symbol_char, FunctionRef, Module};
pub use self::builder::IrBuilder;

pub(crate) use self::types::write_result_types;

mod types;
mod values;
mod ops;
mod blocks;
mod module;
mod builder;
mod equivalence;
