//! Numeric sparse QR factorization
//!
//! Householder QR of a sparse matrix `A` (`nrow × ncol`, `nrow >= ncol`)
//! given a precomputed symbolic analysis. The factorization produces
//!
//! - `V`: Householder vectors, one per column, stored explicitly,
//! - `R`: the upper triangular factor,
//! - `beta`: one scale factor per reflector,
//!
//! such that `Qᵀ P A = R` with `Q = H_0 H_1 ⋯ H_{ncol-1}` and
//! `H_k = I - beta_k v_k v_kᵀ`. `P` is the row permutation given by `pinv`.
//!
//! The kernel itself ([`qr_numeric`]) is allocation-free: the caller owns
//! every buffer. [`SparseQr`] wraps it with owned storage and a solver.

mod factor;
mod numeric;
mod symbolic;

pub use factor::{QrConfig, SparseQr, apply_qt};
pub use numeric::{QrWorkspace, qr_numeric};
pub use symbolic::QrSymbolic;
