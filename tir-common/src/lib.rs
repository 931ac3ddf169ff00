//! Tensor IR - Common Types and Utilities
//! 
//! This crate contains the error taxonomy and source location types
//! shared by the IR library and the command-line driver.

pub mod error;
pub mod source_loc;

pub use error::{IrError, IrResult};
pub use source_loc::{SourceLocation, SourceSpan, SourceTracker};
