//! Sparsity patterns and a sparse Householder QR kernel
//!
//! This crate provides an immutable compressed-row sparsity pattern with the
//! constructors and structural transforms needed to assemble sparse
//! matrices, plus a numeric sparse QR factorization driven by a precomputed
//! symbolic analysis.
//!
//! # Features
//!
//! - **Patterns**: [`Sparsity`] in compressed row storage with dense,
//!   diagonal, triangular and banded constructors
//! - **Triplet assembly**: unordered `(row, col)` lists with duplicates,
//!   plus the mapping needed to move a value payload along
//! - **Transforms**: transpose, reshape, vectorize, lower part
//! - **Sparse QR**: allocation-free numeric kernel ([`qr_numeric`]) and an
//!   owning wrapper with least-squares solve ([`SparseQr`])
//! - **Generic Scalar Types**: `f64` and `f32`
//!
//! # Example
//!
//! ```
//! use math_audio_sparsity::Sparsity;
//!
//! // Unordered entries with one duplicate
//! let rows = [2, 0, 1, 0];
//! let cols = [1, 0, 1, 0];
//! let (sp, mapping) = Sparsity::from_triplets(3, 2, &rows, &cols, false)?;
//!
//! assert_eq!(sp.nnz(), 3);
//! assert_eq!(sp.row_offset(), &[0, 1, 2, 3]);
//! assert_eq!(mapping.len(), sp.nnz());
//! # Ok::<(), math_audio_sparsity::SparsityError>(())
//! ```

pub mod blas_helpers;
pub mod error;
pub mod qr;
pub mod sparsity;
pub mod traits;

// Re-export main types
pub use error::{Result, SparsityError};
pub use sparsity::{Sparsity, permute_nonzeros};
pub use traits::RealField;

// Re-export the QR factorization
pub use qr::{QrConfig, QrSymbolic, QrWorkspace, SparseQr, apply_qt, qr_numeric};
