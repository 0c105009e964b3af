//! Structural transforms of a pattern

use super::pattern::Sparsity;
use crate::error::{Result, SparsityError};

impl Sparsity {
    /// Reinterpret the pattern as an `n × m` matrix with the same row-major
    /// element order.
    ///
    /// Fails unless `n * m == nrow * ncol`, or if either count overflows.
    pub fn reshape(&self, n: usize, m: usize) -> Result<Sparsity> {
        let numel = self.numel()?;
        if n.checked_mul(m) != Some(numel) {
            return Err(SparsityError::invalid(
                "reshape",
                format!(
                    "number of elements must remain the same: input has shape {} x {} = {}, \
                     requested {n} x {m}",
                    self.nrow(),
                    self.ncol(),
                    numel
                ),
            ));
        }

        let ncol = self.ncol();
        let mut rows = Vec::with_capacity(self.nnz());
        let mut cols = Vec::with_capacity(self.nnz());
        for r in 0..self.nrow() {
            for &c in self.row(r) {
                let z = c + r * ncol;
                rows.push(z / m);
                cols.push(z % m);
            }
        }

        log::trace!("reshape {}x{} -> {n}x{m}", self.nrow(), ncol);
        Sparsity::triplet(n, m, &rows, &cols, false)
    }

    /// Column vector `numel × 1` holding the same elements.
    pub fn vectorize(&self) -> Result<Sparsity> {
        self.reshape(self.numel()?, 1)
    }

    /// Entries on or below the diagonal (`row >= col`).
    pub fn lower_part(&self) -> Result<Sparsity> {
        let row = self.get_row();
        let col = self.col_index();

        let n = row.iter().zip(col).filter(|(r, c)| r >= c).count();
        let mut new_row = Vec::with_capacity(n);
        let mut new_col = Vec::with_capacity(n);
        for (&r, &c) in row.iter().zip(col) {
            if r >= c {
                new_row.push(r);
                new_col.push(c);
            }
        }

        Sparsity::from_explicit_nonzeros(&new_row, &new_col, self.nrow(), self.ncol(), true)
    }

    /// Positions of the non-zeros on or below the diagonal.
    ///
    /// Same filter as [`Sparsity::lower_part`], but the source indices are
    /// returned so a numeric payload can be extracted or injected in place.
    pub fn lower_nonzero_indices(&self) -> Vec<usize> {
        self.get_row()
            .into_iter()
            .zip(self.col_index())
            .enumerate()
            .filter(|(_, (r, c))| r >= *c)
            .map(|(k, _)| k)
            .collect()
    }

    /// Row-major index `col + row * ncol` of every non-zero in the equivalent
    /// dense matrix.
    ///
    /// Fails when the element count overflows; every index is then below
    /// `numel` and the arithmetic cannot overflow.
    pub fn dense_linear_indices(&self) -> Result<Vec<usize>> {
        self.numel()?;
        let ncol = self.ncol();
        Ok(self
            .get_row()
            .into_iter()
            .zip(self.col_index())
            .map(|(r, &c)| c + r * ncol)
            .collect())
    }
}
