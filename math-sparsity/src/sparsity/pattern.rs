//! Compressed-row sparsity pattern
//!
//! A pattern stores:
//! - `row_offset`: index into `col_index` where each row starts
//!   (`row_offset[nrow] = nnz`)
//! - `col_index`: column of each structural non-zero, strictly increasing
//!   within a row

use crate::error::{Result, SparsityError};
use std::ops::Range;

/// Structural non-zero pattern of an `nrow × ncol` matrix in compressed-row form.
///
/// Patterns are immutable once built. Transforms return a new pattern together
/// with a `mapping` where `mapping[k]` is the source non-zero that output
/// non-zero `k` came from, so numeric payloads can follow the structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sparsity {
    nrow: usize,
    ncol: usize,
    row_offset: Vec<usize>,
    col_index: Vec<usize>,
}

impl Sparsity {
    /// Create a pattern from raw compressed-row components.
    ///
    /// Fails if `row_offset` is not a valid offset array for `col_index`, if a
    /// column is out of range, or if a row is not strictly column-sorted.
    pub fn new(
        nrow: usize,
        ncol: usize,
        row_offset: Vec<usize>,
        col_index: Vec<usize>,
    ) -> Result<Self> {
        const CTX: &str = "Sparsity::new";
        if row_offset.len() != nrow + 1 {
            return Err(SparsityError::invalid(
                CTX,
                format!(
                    "row_offset has {} entries, expected nrow + 1 = {}",
                    row_offset.len(),
                    nrow + 1
                ),
            ));
        }
        if row_offset[0] != 0 || row_offset[nrow] != col_index.len() {
            return Err(SparsityError::invalid(
                CTX,
                format!(
                    "row_offset must run from 0 to nnz = {}, got {}..{}",
                    col_index.len(),
                    row_offset[0],
                    row_offset[nrow]
                ),
            ));
        }
        if let Some(r) = row_offset.windows(2).position(|w| w[0] > w[1]) {
            return Err(SparsityError::invalid(
                CTX,
                format!("row_offset decreases at row {r}"),
            ));
        }
        if let Some((k, &c)) = col_index.iter().enumerate().find(|&(_, &c)| c >= ncol) {
            return Err(SparsityError::out_of_range(CTX, "column", k, c, ncol));
        }

        let sp = Self::from_parts(nrow, ncol, row_offset, col_index);
        if !sp.columns_sequential(true) {
            return Err(SparsityError::invalid(
                CTX,
                "columns must be strictly increasing within each row",
            ));
        }
        Ok(sp)
    }

    /// Assemble without validation; callers guarantee the invariants.
    pub(crate) fn from_parts(
        nrow: usize,
        ncol: usize,
        row_offset: Vec<usize>,
        col_index: Vec<usize>,
    ) -> Self {
        debug_assert_eq!(row_offset.len(), nrow + 1);
        debug_assert_eq!(row_offset[nrow], col_index.len());
        Self {
            nrow,
            ncol,
            row_offset,
            col_index,
        }
    }

    /// Number of rows
    pub fn nrow(&self) -> usize {
        self.nrow
    }

    /// Number of columns
    pub fn ncol(&self) -> usize {
        self.ncol
    }

    /// `(nrow, ncol)`
    pub fn shape(&self) -> (usize, usize) {
        (self.nrow, self.ncol)
    }

    /// Number of structural non-zeros
    pub fn nnz(&self) -> usize {
        self.col_index.len()
    }

    /// Number of elements of the equivalent dense matrix.
    ///
    /// Fails when `nrow * ncol` does not fit in a `usize`.
    pub fn numel(&self) -> Result<usize> {
        self.nrow.checked_mul(self.ncol).ok_or_else(|| {
            SparsityError::invalid(
                "numel",
                format!(
                    "shape {} x {} has more elements than a usize can count",
                    self.nrow, self.ncol
                ),
            )
        })
    }

    /// Row offsets, length `nrow + 1`
    pub fn row_offset(&self) -> &[usize] {
        &self.row_offset
    }

    /// Column index of every non-zero
    pub fn col_index(&self) -> &[usize] {
        &self.col_index
    }

    /// Range of non-zero positions belonging to row `r`
    pub fn row_range(&self, r: usize) -> Range<usize> {
        self.row_offset[r]..self.row_offset[r + 1]
    }

    /// Columns of row `r`
    pub fn row(&self, r: usize) -> &[usize] {
        &self.col_index[self.row_range(r)]
    }

    /// Row index of every non-zero (expansion of `row_offset`)
    pub fn get_row(&self) -> Vec<usize> {
        let mut row = Vec::with_capacity(self.nnz());
        for r in 0..self.nrow {
            row.extend(std::iter::repeat_n(r, self.row_offset[r + 1] - self.row_offset[r]));
        }
        row
    }

    /// Position of entry `(r, c)` among the non-zeros, if structurally present
    pub fn get_nz(&self, r: usize, c: usize) -> Option<usize> {
        if r >= self.nrow {
            return None;
        }
        let start = self.row_offset[r];
        self.row(r).binary_search(&c).ok().map(|k| start + k)
    }

    /// Whether `(r, c)` is a structural non-zero
    pub fn has_nz(&self, r: usize, c: usize) -> bool {
        self.get_nz(r, c).is_some()
    }

    /// Every entry is structurally non-zero
    pub fn is_dense(&self) -> bool {
        self.numel().is_ok_and(|n| n == self.nnz())
    }

    /// No structural non-zeros
    pub fn is_empty(&self) -> bool {
        self.nnz() == 0
    }

    pub fn is_square(&self) -> bool {
        self.nrow == self.ncol
    }

    /// Check whether columns increase within each row.
    ///
    /// With `strictly`, repeated columns (duplicates) also fail the check.
    pub fn columns_sequential(&self, strictly: bool) -> bool {
        (0..self.nrow).all(|r| {
            self.row(r).windows(2).all(|w| {
                if strictly {
                    w[0] < w[1]
                } else {
                    w[0] <= w[1]
                }
            })
        })
    }

    /// Structural transpose.
    ///
    /// Bucket sort of the non-zeros by column. The sort is stable, so the rows
    /// of the result are sorted whenever the non-zeros of `self` are visited in
    /// row order, which they always are. Applying it twice therefore sorts the
    /// columns of each row of any pattern whose rows are merely grouped.
    pub fn transpose(&self) -> (Sparsity, Vec<usize>) {
        let nnz = self.nnz();

        let mut offset = vec![0usize; self.ncol + 1];
        for &c in &self.col_index {
            offset[c + 1] += 1;
        }
        for c in 0..self.ncol {
            offset[c + 1] += offset[c];
        }

        let mut cursor = offset.clone();
        let mut col_index = vec![0usize; nnz];
        let mut mapping = vec![0usize; nnz];
        for r in 0..self.nrow {
            for k in self.row_range(r) {
                let c = self.col_index[k];
                let dst = cursor[c];
                cursor[c] += 1;
                col_index[dst] = r;
                mapping[dst] = k;
            }
        }

        log::trace!("transpose {}x{} (nnz = {nnz})", self.nrow, self.ncol);
        (
            Sparsity::from_parts(self.ncol, self.nrow, offset, col_index),
            mapping,
        )
    }

    /// Collapse repeated columns within each (column-sorted) row.
    ///
    /// The surviving entry takes the mapping of the last duplicate, so after
    /// a stable sort the last occurrence in the input wins.
    pub(crate) fn remove_duplicates(self, mapping: &mut Vec<usize>) -> Sparsity {
        debug_assert_eq!(mapping.len(), self.nnz());
        let mut row_offset = Vec::with_capacity(self.nrow + 1);
        let mut col_index = Vec::with_capacity(self.nnz());
        let mut nz = 0usize;
        row_offset.push(0);
        for r in 0..self.nrow {
            let start = nz;
            for k in self.row_range(r) {
                let c = self.col_index[k];
                if nz > start && col_index[nz - 1] == c {
                    mapping[nz - 1] = mapping[k];
                } else {
                    col_index.push(c);
                    mapping[nz] = mapping[k];
                    nz += 1;
                }
            }
            row_offset.push(nz);
        }
        mapping.truncate(nz);
        Sparsity::from_parts(self.nrow, self.ncol, row_offset, col_index)
    }
}
