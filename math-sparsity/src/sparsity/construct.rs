//! Pattern constructors
//!
//! Structured patterns (dense, diagonal, triangular, band) are produced with
//! direct offset arithmetic. Patterns built from caller-supplied index sets
//! validate every index before it is used, since those sets are usually
//! derived rather than written by hand.

use super::pattern::Sparsity;
use crate::error::{Result, SparsityError};

impl Sparsity {
    /// All `n × m` entries are non-zero.
    pub fn dense(n: usize, m: usize) -> Self {
        let row_offset = (0..=n).map(|r| r * m).collect();
        let col_index = (0..n).flat_map(|_| 0..m).collect();
        Self::from_parts(n, m, row_offset, col_index)
    }

    /// No structural non-zeros.
    pub fn sparse(n: usize, m: usize) -> Self {
        Self::from_parts(n, m, vec![0; n + 1], Vec::new())
    }

    /// Lower triangle of an `n × n` matrix, diagonal included.
    pub fn lower_triangular(n: usize) -> Self {
        let mut row_offset = Vec::with_capacity(n + 1);
        let mut col_index = Vec::with_capacity(n * (n + 1) / 2);
        row_offset.push(0);
        for r in 0..n {
            col_index.extend(0..=r);
            row_offset.push(col_index.len());
        }
        Self::from_parts(n, n, row_offset, col_index)
    }

    /// `n × n` diagonal.
    pub fn diagonal(n: usize) -> Self {
        Self::from_parts(n, n, (0..=n).collect(), (0..n).collect())
    }

    /// A single diagonal of an `n × n` matrix: entries with `col - row == p`.
    ///
    /// `p > 0` selects a super-diagonal, `p < 0` a sub-diagonal.
    pub fn band(n: usize, p: isize) -> Result<Self> {
        let shift = p.unsigned_abs();
        if shift >= n {
            return Err(SparsityError::invalid(
                "band",
                format!("band position |{p}| must be smaller than the size {n}"),
            ));
        }

        let nc = n - shift;
        let first_col = if p > 0 { shift } else { 0 };
        let col_index = (0..nc).map(|i| i + first_col).collect();

        // Row r holds an entry iff r + min(p, 0) lies in [0, nc).
        let lead = if p < 0 { shift } else { 0 };
        let row_offset = (0..=n)
            .map(|r| r.saturating_sub(lead).min(nc))
            .collect();

        Ok(Self::from_parts(n, n, row_offset, col_index))
    }

    /// Two-sided band of half-bandwidth `p` around the diagonal.
    ///
    /// Whether the band should be symmetric or asymmetric is undecided, so
    /// this always fails with [`SparsityError::NotImplemented`].
    pub fn banded(_n: usize, _p: usize) -> Result<Self> {
        Err(SparsityError::NotImplemented { feature: "banded" })
    }

    /// Cartesian product pattern: `(r, c)` is non-zero for every `r` in
    /// `rows` and every `c` in `cols`.
    ///
    /// Rows not listed get no entries. If either list is not strictly
    /// increasing the result is normalized through [`Sparsity::triplet`].
    pub fn from_row_col_product(
        rows: &[usize],
        cols: &[usize],
        nrow: usize,
        ncol: usize,
    ) -> Result<Self> {
        const CTX: &str = "from_row_col_product";
        check_bounds(CTX, "row", rows, nrow)?;
        check_bounds(CTX, "column", cols, ncol)?;

        if !is_strictly_increasing(rows) || !is_strictly_increasing(cols) {
            log::debug!("{CTX}: unsorted index lists, normalizing through triplets");
            let (tr, tc): (Vec<usize>, Vec<usize>) = rows
                .iter()
                .flat_map(|&r| cols.iter().map(move |&c| (r, c)))
                .unzip();
            return Self::triplet(nrow, ncol, &tr, &tc, false);
        }

        let mut col_index = Vec::with_capacity(rows.len() * cols.len());
        for _ in rows {
            col_index.extend_from_slice(cols);
        }

        let mut row_offset = vec![0usize; nrow + 1];
        let mut cnt = 0;
        let mut z = 0;
        for &r in rows {
            while z < r {
                z += 1;
                row_offset[z] = cnt;
            }
            cnt += cols.len();
            z = r + 1;
            row_offset[z] = cnt;
        }
        while z < nrow {
            z += 1;
            row_offset[z] = cnt;
        }

        Ok(Self::from_parts(nrow, ncol, row_offset, col_index))
    }

    /// Pattern from explicit non-zero coordinates given in row-major order.
    ///
    /// `rows[k], cols[k]` is the k-th non-zero. The coordinates must already
    /// be sorted by row, then by column, without repetition; only that
    /// (`monotone == true`) form is supported.
    pub fn from_explicit_nonzeros(
        rows: &[usize],
        cols: &[usize],
        nrow: usize,
        ncol: usize,
        monotone: bool,
    ) -> Result<Self> {
        const CTX: &str = "from_explicit_nonzeros";
        if rows.len() != cols.len() {
            return Err(SparsityError::invalid(
                CTX,
                format!(
                    "row and col must have the same length, got {} and {}",
                    rows.len(),
                    cols.len()
                ),
            ));
        }
        if !monotone {
            return Err(SparsityError::NotImplemented {
                feature: "from_explicit_nonzeros with monotone = false",
            });
        }
        check_coordinates(CTX, rows, cols, nrow, ncol)?;

        for k in 1..rows.len() {
            let prev = (rows[k - 1], cols[k - 1]);
            let cur = (rows[k], cols[k]);
            if cur <= prev {
                return Err(SparsityError::invalid(
                    CTX,
                    format!(
                        "entry {k} {cur:?} does not follow entry {} {prev:?} in row-major order",
                        k - 1
                    ),
                ));
            }
        }

        // Cumulative count replayed row by row; unlisted rows repeat the
        // previous count.
        let mut row_offset = vec![0usize; nrow + 1];
        let mut z = 0;
        for (cnt, &r) in rows.iter().enumerate() {
            while z < r {
                z += 1;
                row_offset[z] = cnt;
            }
            row_offset[r + 1] = cnt + 1;
        }
        while z < nrow {
            z += 1;
            row_offset[z] = rows.len();
        }

        Ok(Self::from_parts(nrow, ncol, row_offset, cols.to_vec()))
    }

    /// Pattern from unordered, possibly repeated `(row, col)` coordinates.
    ///
    /// Returns the pattern and the mapping from output non-zeros to input
    /// positions. When `sorted_columns` is `false` the columns are sorted by a
    /// double transpose and duplicates are collapsed, the last occurrence
    /// winning in the mapping. When `true`, the caller promises strictly
    /// sorted columns within each row and a violation is an error.
    pub fn from_triplets(
        nrow: usize,
        ncol: usize,
        rows: &[usize],
        cols: &[usize],
        sorted_columns: bool,
    ) -> Result<(Self, Vec<usize>)> {
        const CTX: &str = "from_triplets";
        if rows.len() != cols.len() {
            return Err(SparsityError::invalid(
                CTX,
                format!(
                    "inconsistent lengths: {} rows and {} cols",
                    rows.len(),
                    cols.len()
                ),
            ));
        }
        check_coordinates(CTX, rows, cols, nrow, ncol)?;

        // Number of elements on each row
        let mut row_offset = vec![0usize; nrow + 1];
        for &r in rows {
            row_offset[r + 1] += 1;
        }
        for r in 0..nrow {
            row_offset[r + 1] += row_offset[r];
        }

        // Scatter, using a copy of the offsets as write cursors
        let mut cursor = row_offset.clone();
        let mut col_index = vec![0usize; cols.len()];
        let mut mapping = vec![0usize; cols.len()];
        for (k, (&r, &c)) in rows.iter().zip(cols.iter()).enumerate() {
            let dst = cursor[r];
            cursor[r] += 1;
            mapping[dst] = k;
            col_index[dst] = c;
        }

        let mut sp = Self::from_parts(nrow, ncol, row_offset, col_index);

        if sorted_columns {
            if !sp.columns_sequential(true) {
                return Err(SparsityError::invalid(
                    CTX,
                    "sorted_columns was requested but a row is not strictly column-sorted",
                ));
            }
            return Ok((sp, mapping));
        }

        if !sp.columns_sequential(false) {
            log::debug!("{CTX}: sorting {} entries by double transpose", sp.nnz());

            let (sp_t, mut trans_mapping) = sp.transpose();
            for m in trans_mapping.iter_mut() {
                *m = mapping[*m];
            }

            let (sorted, mut back_mapping) = sp_t.transpose();
            for m in back_mapping.iter_mut() {
                *m = trans_mapping[*m];
            }

            sp = sorted;
            mapping = back_mapping;
        }

        if !sp.columns_sequential(true) {
            let before = sp.nnz();
            sp = sp.remove_duplicates(&mut mapping);
            log::debug!("{CTX}: removed {} duplicate entries", before - sp.nnz());
            debug_assert!(sp.columns_sequential(true));
        }

        Ok((sp, mapping))
    }

    /// [`Sparsity::from_triplets`] without the mapping.
    pub fn triplet(
        nrow: usize,
        ncol: usize,
        rows: &[usize],
        cols: &[usize],
        sorted_columns: bool,
    ) -> Result<Self> {
        Self::from_triplets(nrow, ncol, rows, cols, sorted_columns).map(|(sp, _)| sp)
    }
}

fn check_bounds(
    context: &'static str,
    what: &'static str,
    indices: &[usize],
    bound: usize,
) -> Result<()> {
    match indices.iter().enumerate().find(|&(_, &i)| i >= bound) {
        Some((k, &i)) => Err(SparsityError::out_of_range(context, what, k, i, bound)),
        None => Ok(()),
    }
}

/// Bounds check of paired coordinates, reporting the first bad entry.
fn check_coordinates(
    context: &'static str,
    rows: &[usize],
    cols: &[usize],
    nrow: usize,
    ncol: usize,
) -> Result<()> {
    for (k, (&r, &c)) in rows.iter().zip(cols).enumerate() {
        if r >= nrow {
            return Err(SparsityError::out_of_range(context, "row", k, r, nrow));
        }
        if c >= ncol {
            return Err(SparsityError::out_of_range(context, "column", k, c, ncol));
        }
    }
    Ok(())
}

fn is_strictly_increasing(indices: &[usize]) -> bool {
    indices.windows(2).all(|w| w[0] < w[1])
}
