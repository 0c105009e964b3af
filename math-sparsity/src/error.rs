//! Error types for sparsity pattern and sparse QR operations.
//!
//! Every error carries the offending value together with the bound or
//! relationship it violated. Nothing is recovered internally: errors are
//! returned to the caller at the point of detection.

use thiserror::Error;

/// Errors that can occur while building, transforming or factorizing
/// sparse structures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SparsityError {
    /// Shape, length or ordering relationship between arguments is violated.
    #[error("{context}: invalid argument: {message}")]
    InvalidArgument {
        /// Operation that rejected the arguments
        context: &'static str,
        /// Description of the violated relationship
        message: String,
    },

    /// An index exceeds the declared extent of the matrix.
    #[error("{context}: {what} index {index} at position {position} is out of range (must be < {bound})")]
    OutOfRange {
        /// Operation that rejected the index
        context: &'static str,
        /// Kind of index ("row", "column", ...)
        what: &'static str,
        /// Position of the offending entry in the input sequence
        position: usize,
        /// The offending index
        index: usize,
        /// Exclusive upper bound
        bound: usize,
    },

    /// A documented variant that has no implementation.
    #[error("{feature}: not implemented")]
    NotImplemented {
        /// Name of the unimplemented variant
        feature: &'static str,
    },

    /// The triangular factor has an exactly zero diagonal entry.
    #[error("triangular factor is singular: zero diagonal in column {column}")]
    SingularFactor {
        /// Column with the zero pivot
        column: usize,
    },
}

/// A specialized `Result` type for sparsity operations.
pub type Result<T> = std::result::Result<T, SparsityError>;

impl SparsityError {
    pub(crate) fn invalid(context: &'static str, message: impl Into<String>) -> Self {
        SparsityError::InvalidArgument {
            context,
            message: message.into(),
        }
    }

    pub(crate) fn out_of_range(
        context: &'static str,
        what: &'static str,
        position: usize,
        index: usize,
        bound: usize,
    ) -> Self {
        SparsityError::OutOfRange {
            context,
            what,
            position,
            index,
            bound,
        }
    }

    /// Returns `true` if this is an argument error.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, SparsityError::InvalidArgument { .. })
    }

    /// Returns `true` if this is an index bound error.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, SparsityError::OutOfRange { .. })
    }

    /// Returns `true` if the requested variant is not implemented.
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, SparsityError::NotImplemented { .. })
    }
}
