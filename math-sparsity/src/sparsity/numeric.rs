//! Numeric payloads carried alongside a pattern
//!
//! A sparse matrix is a [`Sparsity`] plus a slice of values, one per
//! structural non-zero, in the pattern's row-major order.

use super::pattern::Sparsity;
use crate::error::{Result, SparsityError};
use ndarray::Array2;
use num_traits::Zero;

impl Sparsity {
    /// Scatter the non-zeros into a dense matrix.
    pub fn densify<T: Copy + Zero>(&self, nz: &[T]) -> Result<Array2<T>> {
        check_payload("densify", self, nz.len())?;
        let mut dense = Array2::from_elem((self.nrow(), self.ncol()), T::zero());
        for r in 0..self.nrow() {
            for k in self.row_range(r) {
                dense[[r, self.col_index()[k]]] = nz[k];
            }
        }
        Ok(dense)
    }

    /// Gather the entries of `dense` that are structural non-zeros.
    ///
    /// Values of `dense` outside the pattern are ignored.
    pub fn sparsify<T: Copy>(&self, dense: &Array2<T>) -> Result<Vec<T>> {
        if dense.dim() != self.shape() {
            return Err(SparsityError::invalid(
                "sparsify",
                format!(
                    "dense matrix is {:?}, pattern is {:?}",
                    dense.dim(),
                    self.shape()
                ),
            ));
        }
        let mut nz = Vec::with_capacity(self.nnz());
        for r in 0..self.nrow() {
            for &c in self.row(r) {
                nz.push(dense[[r, c]]);
            }
        }
        Ok(nz)
    }
}

/// Reorder a payload in lockstep with a structural transform:
/// `out[k] = nz[mapping[k]]`.
pub fn permute_nonzeros<T: Copy>(nz: &[T], mapping: &[usize]) -> Result<Vec<T>> {
    mapping
        .iter()
        .enumerate()
        .map(|(k, &src)| {
            nz.get(src).copied().ok_or_else(|| {
                SparsityError::out_of_range("permute_nonzeros", "mapping", k, src, nz.len())
            })
        })
        .collect()
}

fn check_payload(context: &'static str, sp: &Sparsity, len: usize) -> Result<()> {
    if len != sp.nnz() {
        return Err(SparsityError::invalid(
            context,
            format!("payload has {len} values, pattern has {} non-zeros", sp.nnz()),
        ));
    }
    Ok(())
}
