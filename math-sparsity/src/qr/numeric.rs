//! Numeric sparse QR kernel
//!
//! Left-looking Householder QR driven by a precomputed column elimination
//! tree. For each column, the rows of R that need updating are discovered by
//! walking the tree upward from the leftmost column of every non-zero row, so
//! the work is proportional to the fill-in instead of to `nrow_ext * ncol`.

use super::symbolic::QrSymbolic;
use crate::blas_helpers::{house, sparse_axpy, sparse_dot};
use crate::error::{Result, SparsityError};
use crate::traits::RealField;

/// Marker value for a node not yet visited in any column
const NONE: usize = usize::MAX;

/// Caller-owned scratch space for [`qr_numeric`].
///
/// Holds a dense vector `x` of length `nrow_ext` and an integer vector of
/// length `ncol + nrow_ext` split into the path stack and the per-row
/// "last column visited" markers. Allocate once and reuse across
/// factorizations with the same dimensions.
#[derive(Debug, Clone)]
pub struct QrWorkspace<T: RealField> {
    x: Vec<T>,
    iw: Vec<usize>,
}

impl<T: RealField> QrWorkspace<T> {
    /// Workspace sized for `symbolic`
    pub fn new(symbolic: &QrSymbolic) -> Self {
        Self::with_dims(symbolic.nrow_ext(), symbolic.ncol())
    }

    /// Workspace for `nrow_ext` working rows and `ncol` columns
    pub fn with_dims(nrow_ext: usize, ncol: usize) -> Self {
        Self {
            x: vec![T::zero(); nrow_ext],
            iw: vec![NONE; ncol + nrow_ext],
        }
    }

    fn check(&self, symbolic: &QrSymbolic) -> Result<()> {
        let nrow_ext = symbolic.nrow_ext();
        let ncol = symbolic.ncol();
        if self.x.len() < nrow_ext || self.iw.len() < ncol + nrow_ext {
            return Err(SparsityError::invalid(
                "qr_numeric",
                format!(
                    "workspace holds {} reals and {} integers, need {nrow_ext} and {}",
                    self.x.len(),
                    self.iw.len(),
                    ncol + nrow_ext
                ),
            ));
        }
        Ok(())
    }
}

/// Compute the numeric sparse QR factorization of A.
///
/// `nz_a` holds the values of A aligned with `symbolic.a()`. On success
/// `nz_v` holds the Householder vectors (aligned with `symbolic.v()`), `nz_r`
/// the triangular factor (aligned with `symbolic.r()`) and `beta[c]` the
/// scale of reflector `c`, so that `H_c = I - beta[c] v_c v_cᵀ` and
/// `H_{ncol-1} ⋯ H_0 P A = [R; 0]` where `P` is the row permutation `pinv`.
///
/// Only buffer sizes are checked. The tree, leftmost columns and permutation
/// are trusted; inconsistent inputs give meaningless numbers, not an error.
/// The one structural failure detected on the way is a row of R found by the
/// tree walk that `symbolic.r()` does not contain.
pub fn qr_numeric<T: RealField>(
    symbolic: &QrSymbolic,
    nz_a: &[T],
    workspace: &mut QrWorkspace<T>,
    nz_v: &mut [T],
    nz_r: &mut [T],
    beta: &mut [T],
) -> Result<()> {
    factorize_columns(symbolic, nz_a, workspace, nz_v, nz_r, beta, 0)
}

/// [`qr_numeric`] with progress logged every `print_interval` columns
/// (0 disables).
pub(crate) fn factorize_columns<T: RealField>(
    symbolic: &QrSymbolic,
    nz_a: &[T],
    workspace: &mut QrWorkspace<T>,
    nz_v: &mut [T],
    nz_r: &mut [T],
    beta: &mut [T],
    print_interval: usize,
) -> Result<()> {
    const CTX: &str = "qr_numeric";
    let ncol = symbolic.ncol();
    let nrow_ext = symbolic.nrow_ext();
    let (a, v, r) = (symbolic.a(), symbolic.v(), symbolic.r());
    let (parent, leftmost, pinv) = (symbolic.parent(), symbolic.leftmost(), symbolic.pinv());

    for (what, got, expected) in [
        ("values of A", nz_a.len(), a.nnz()),
        ("values of V", nz_v.len(), v.nnz()),
        ("values of R", nz_r.len(), r.nnz()),
        ("beta", beta.len(), ncol),
    ] {
        if got != expected {
            return Err(SparsityError::invalid(
                CTX,
                format!("{what} has length {got}, expected {expected}"),
            ));
        }
    }
    workspace.check(symbolic)?;

    let x = &mut workspace.x[..nrow_ext];
    let (stack, marker) = workspace.iw.split_at_mut(ncol);
    let marker = &mut marker[..nrow_ext];

    x.fill(T::zero());
    marker.fill(NONE);
    nz_r.fill(T::zero());

    let v_rows = v.col_index();
    let a_rows = a.col_index();

    for c in 0..ncol {
        // V(:,c) always holds the diagonal
        marker[c] = c;
        let mut v_count = 1usize;
        let mut top = ncol;

        for k in a.row_range(c) {
            let i = a_rows[k];

            // Walk up the tree from leftmost[i] until a node already
            // reached in this column.
            let mut len = 0;
            let mut node = leftmost[i];
            while marker[node] != c {
                stack[len] = node;
                len += 1;
                marker[node] = c;
                match parent[node] {
                    Some(p) => node = p,
                    None => break,
                }
            }
            // Path goes in front of the previous ones, leaf first
            while len > 0 {
                top -= 1;
                len -= 1;
                stack[top] = stack[len];
            }

            let w = pinv[i];
            x[w] = nz_a[k];
            if w > c && marker[w] != c {
                v_count += 1;
                marker[w] = c;
            }
        }

        for t in top..ncol {
            let row = stack[t];

            // x -= v * beta * (v' x)
            let range = v.row_range(row);
            let rows = &v_rows[range.clone()];
            let vals = &nz_v[range];
            let tau = sparse_dot(vals, rows, x) * beta[row];
            sparse_axpy(-tau, vals, rows, x);

            let pos = r.get_nz(c, row).ok_or_else(|| {
                SparsityError::invalid(
                    CTX,
                    format!("pattern of R lacks entry ({row}, {c}) reached by the elimination tree"),
                )
            })?;
            nz_r[pos] = x[row];
            x[row] = T::zero();

            if parent[row] == Some(c) {
                for &r2 in rows {
                    if marker[r2] != c {
                        marker[r2] = c;
                        v_count += 1;
                    }
                }
            }
        }

        // Gather V(:,c) = x
        let range = v.row_range(c);
        debug_assert!(
            v_count <= range.len(),
            "column {c} of V reaches {v_count} rows but its pattern holds {}",
            range.len()
        );
        for k in range.clone() {
            let row = v_rows[k];
            nz_v[k] = x[row];
            x[row] = T::zero();
        }

        // R(c,c) = norm(x)
        let (s, b) = house(&mut nz_v[range]);
        beta[c] = b;
        let pos = r.get_nz(c, c).ok_or_else(|| {
            SparsityError::invalid(CTX, format!("pattern of R lacks diagonal entry ({c}, {c})"))
        })?;
        nz_r[pos] = s;

        if print_interval > 0 && (c + 1) % print_interval == 0 {
            log::info!(
                "sparse QR column {}/{}: |R(c,c)| = {:.6e}",
                c + 1,
                ncol,
                s.to_f64().unwrap_or(0.0)
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparsity::Sparsity;
    use approx::assert_relative_eq;
    use ndarray::{Array2, array};

    /// A = [2 . . 1]
    ///     [. 3 . 1]
    ///     [. . 4 1]
    ///     [1 1 . 5]
    ///
    /// Column elimination tree 0 -> 1 -> 3, 2 -> 3, identity row order.
    fn arrowhead() -> (QrSymbolic, Vec<f64>, Array2<f64>) {
        let dense = array![
            [2.0, 0.0, 0.0, 1.0],
            [0.0, 3.0, 0.0, 1.0],
            [0.0, 0.0, 4.0, 1.0],
            [1.0, 1.0, 0.0, 5.0],
        ];
        let a = Sparsity::new(
            4,
            4,
            vec![0, 2, 4, 5, 9],
            vec![0, 3, 1, 3, 2, 0, 1, 2, 3],
        )
        .expect("pattern of A");
        let v = Sparsity::new(4, 4, vec![0, 2, 4, 5, 6], vec![0, 3, 1, 3, 2, 3])
            .expect("pattern of V");
        let r = Sparsity::new(4, 4, vec![0, 1, 3, 4, 8], vec![0, 0, 1, 2, 0, 1, 2, 3])
            .expect("pattern of R");
        let nz_a = a.sparsify(&dense.t().to_owned()).expect("values of A");

        let symbolic = QrSymbolic::new(
            a,
            v,
            r,
            vec![Some(1), Some(3), Some(3), None],
            vec![0, 1, 2, 0],
            vec![0, 1, 2, 3],
        )
        .expect("consistent dimensions");
        (symbolic, nz_a, dense)
    }

    #[test]
    fn test_arrowhead_rtr_equals_ata() {
        let (symbolic, nz_a, dense) = arrowhead();
        assert!(symbolic.validate().is_ok());

        let mut ws = QrWorkspace::new(&symbolic);
        let mut nz_v = vec![0.0; symbolic.v().nnz()];
        let mut nz_r = vec![0.0; symbolic.r().nnz()];
        let mut beta = vec![0.0; symbolic.ncol()];
        qr_numeric(&symbolic, &nz_a, &mut ws, &mut nz_v, &mut nz_r, &mut beta)
            .expect("factorization succeeds");

        // symbolic.r() is Rᵀ in row-compressed form
        let r = symbolic.r().densify(&nz_r).expect("dense R").t().to_owned();
        let rtr = r.t().dot(&r);
        let ata = dense.t().dot(&dense);
        for i in 0..4 {
            for j in 0..4 {
                assert_relative_eq!(rtr[[i, j]], ata[[i, j]], epsilon = 1e-10);
            }
            assert!(r[[i, i]] >= 0.0);
        }
    }

    #[test]
    fn test_workspace_is_clean_after_call() {
        let (symbolic, nz_a, _) = arrowhead();
        let mut ws = QrWorkspace::new(&symbolic);
        let mut nz_v = vec![0.0; symbolic.v().nnz()];
        let mut nz_r = vec![0.0; symbolic.r().nnz()];
        let mut beta = vec![0.0; symbolic.ncol()];

        qr_numeric(&symbolic, &nz_a, &mut ws, &mut nz_v, &mut nz_r, &mut beta)
            .expect("first call");
        assert!(ws.x.iter().all(|&xi| xi == 0.0));

        let first = nz_r.clone();
        qr_numeric(&symbolic, &nz_a, &mut ws, &mut nz_v, &mut nz_r, &mut beta)
            .expect("second call");
        for (a, b) in first.iter().zip(nz_r.iter()) {
            assert_relative_eq!(*a, *b);
        }
    }

    #[test]
    fn test_diagonal_matrix() {
        let n = 3;
        let symbolic = QrSymbolic::new(
            Sparsity::diagonal(n),
            Sparsity::diagonal(n),
            Sparsity::diagonal(n),
            vec![None; n],
            (0..n).collect(),
            (0..n).collect(),
        )
        .expect("consistent dimensions");

        let nz_a = [-2.0_f64, 3.0, 0.5];
        let mut ws = QrWorkspace::new(&symbolic);
        let mut nz_v = vec![0.0; n];
        let mut nz_r = vec![0.0; n];
        let mut beta = vec![0.0; n];
        qr_numeric(&symbolic, &nz_a, &mut ws, &mut nz_v, &mut nz_r, &mut beta)
            .expect("factorization succeeds");

        assert_eq!(nz_r, vec![2.0, 3.0, 0.5]);
        assert_eq!(beta, vec![2.0, 0.0, 0.0]);
        assert_eq!(nz_v, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_buffer_size_mismatch() {
        let (symbolic, nz_a, _) = arrowhead();
        let mut ws = QrWorkspace::new(&symbolic);
        let mut nz_v = vec![0.0; symbolic.v().nnz()];
        let mut nz_r = vec![0.0; symbolic.r().nnz() - 1];
        let mut beta = vec![0.0; symbolic.ncol()];
        let err = qr_numeric(&symbolic, &nz_a, &mut ws, &mut nz_v, &mut nz_r, &mut beta)
            .unwrap_err();
        assert!(err.to_string().contains("values of R"));

        let mut small = QrWorkspace::<f64>::with_dims(2, 2);
        let mut nz_r = vec![0.0; symbolic.r().nnz()];
        let err = qr_numeric(&symbolic, &nz_a, &mut small, &mut nz_v, &mut nz_r, &mut beta)
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_missing_r_entry() {
        let (full, nz_a, _) = arrowhead();
        // Drop R(1,3) from the pattern
        let r = Sparsity::new(4, 4, vec![0, 1, 3, 4, 7], vec![0, 0, 1, 2, 0, 2, 3])
            .expect("pattern of R");
        let symbolic = QrSymbolic::new(
            full.a().clone(),
            full.v().clone(),
            r,
            full.parent().to_vec(),
            full.leftmost().to_vec(),
            full.pinv().to_vec(),
        )
        .expect("consistent dimensions");

        let mut ws = QrWorkspace::new(&symbolic);
        let mut nz_v = vec![0.0; symbolic.v().nnz()];
        let mut nz_r = vec![0.0; symbolic.r().nnz()];
        let mut beta = vec![0.0; symbolic.ncol()];
        let err = qr_numeric(&symbolic, &nz_a, &mut ws, &mut nz_v, &mut nz_r, &mut beta)
            .unwrap_err();
        assert!(err.to_string().contains("(1, 3)"));
    }
}
