//! Sparsity patterns
//!
//! This module provides the compressed-row [`Sparsity`] type, its
//! constructors, structural transforms, and helpers to move numeric payloads
//! in lockstep with the structure.

mod construct;
mod numeric;
mod pattern;
mod transform;

pub use numeric::permute_nonzeros;
pub use pattern::Sparsity;
