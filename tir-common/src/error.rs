//! Error handling for the tensor IR
//!
//! This module defines the single error type returned by every fallible
//! builder, verifier, printer and parser entry point.

use crate::source_loc::SourceLocation;
use thiserror::Error;

/// Result alias used throughout the IR crates
pub type IrResult<T> = Result<T, IrError>;

/// Every way an IR construction, verification or parse can fail.
///
/// Failures are reported at the point of violation and never leave the
/// attached module tree partially modified.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IrError {
    #[error("invalid shape: {message}")]
    InvalidShape { message: String },

    #[error("signature mismatch in @{function}: {message}")]
    SignatureMismatch { function: String, message: String },

    #[error("duplicate symbol @{name}")]
    DuplicateSymbol { name: String },

    #[error("invalid symbol name {name:?}: {message}")]
    InvalidSymbol { name: String, message: String },

    #[error("shape mismatch in {op}: {message}")]
    ShapeMismatch { op: String, message: String },

    #[error("element type mismatch in {op}: {message}")]
    ElementTypeMismatch { op: String, message: String },

    #[error("storage mismatch in {op}: {message}")]
    StorageMismatch { op: String, message: String },

    #[error("misplaced terminator: {message}")]
    MisplacedTerminator { message: String },

    #[error("missing terminator: body of @{function} does not end with func.return")]
    MissingTerminator { function: String },

    #[error("{entity} is already attached to a parent")]
    AlreadyAttached { entity: String },

    #[error("invalid parent: {message}")]
    InvalidParent { message: String },

    #[error("cannot declare arguments on {block}: {message}")]
    ArgumentsFrozen { block: String, message: String },

    #[error("dominance violation: {message}")]
    Dominance { message: String },

    #[error("use of consumed value: {message}")]
    ValueConsumed { message: String },

    #[error("{entity} does not belong to this module")]
    UnknownEntity { entity: String },

    #[error("syntax error at {location}: {message}")]
    Syntax {
        location: SourceLocation,
        message: String,
    },
}

impl IrError {
    /// Create a syntax error at a location
    pub fn syntax(message: impl Into<String>, location: SourceLocation) -> Self {
        IrError::Syntax {
            location,
            message: message.into(),
        }
    }

    /// Create a shape mismatch error for an operation
    pub fn shape_mismatch(op: &str, message: impl Into<String>) -> Self {
        IrError::ShapeMismatch {
            op: op.to_string(),
            message: message.into(),
        }
    }

    /// Create an element type mismatch error for an operation
    pub fn element_mismatch(op: &str, message: impl Into<String>) -> Self {
        IrError::ElementTypeMismatch {
            op: op.to_string(),
            message: message.into(),
        }
    }

    /// Create a storage mismatch error for an operation
    pub fn storage_mismatch(op: &str, message: impl Into<String>) -> Self {
        IrError::StorageMismatch {
            op: op.to_string(),
            message: message.into(),
        }
    }

    pub fn signature_mismatch(function: &str, message: impl Into<String>) -> Self {
        IrError::SignatureMismatch {
            function: function.to_string(),
            message: message.into(),
        }
    }

    /// Source location for syntax errors, `None` for model violations
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            IrError::Syntax { location, .. } => Some(location),
            _ => None,
        }
    }
}
