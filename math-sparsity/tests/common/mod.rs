//! Shared helpers for the integration tests
//!
//! Builds a symbolic analysis for a dense test matrix with a zero-free
//! diagonal: natural row order, the column elimination tree of AᵀA, and
//! over-estimated patterns for V (full lower trapezoid) and R (full upper
//! triangle). The kernel zero-fills R and gathers V over its pattern, so
//! extra structural entries simply hold zeros.

#![allow(dead_code)]

use math_audio_sparsity::{QrSymbolic, Sparsity};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random `nrow × ncol` matrix (`nrow >= ncol`) with a zero-free diagonal
/// and at least one non-zero in every row.
pub fn random_matrix(seed: u64, nrow: usize, ncol: usize, density: f64) -> Array2<f64> {
    assert!(nrow >= ncol);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut dense = Array2::<f64>::zeros((nrow, ncol));

    for i in 0..nrow {
        for j in 0..ncol {
            if rng.random_bool(density) {
                dense[[i, j]] = rng.random_range(-0.5_f64..0.5);
            }
        }
    }
    for j in 0..ncol {
        let sign: f64 = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        dense[[j, j]] = sign * rng.random_range(2.0_f64..3.0);
    }
    for i in ncol..nrow {
        if dense.row(i).iter().all(|&x| x == 0.0) {
            let j = rng.random_range(0..ncol);
            dense[[i, j]] = rng.random_range(0.5_f64..1.0);
        }
    }
    dense
}

/// Column elimination tree of AᵀA, computed from the column-compressed
/// pattern of A without forming AᵀA.
pub fn column_etree(a: &Sparsity) -> Vec<Option<usize>> {
    let ncol = a.nrow();
    let nrow = a.ncol();
    let mut parent = vec![None; ncol];
    let mut ancestor: Vec<Option<usize>> = vec![None; ncol];
    let mut prev: Vec<Option<usize>> = vec![None; nrow];

    for k in 0..ncol {
        for &row in a.row(k) {
            // Climb from the previous column touching this row, compressing
            // the path onto k.
            let mut node = prev[row];
            while let Some(i) = node {
                if i >= k {
                    break;
                }
                let next = ancestor[i];
                ancestor[i] = Some(k);
                if next.is_none() {
                    parent[i] = Some(k);
                }
                node = next;
            }
            prev[row] = Some(k);
        }
    }
    parent
}

/// Symbolic analysis of `dense` in natural row order, and its values
/// aligned with the pattern of A.
pub fn symbolic_for(dense: &Array2<f64>) -> (QrSymbolic, Vec<f64>) {
    let nrow = dense.nrows();
    symbolic_with_row_order(dense, |_, _| ((0..nrow).collect(), nrow))
}

/// Symbolic analysis of `dense` with the row order of [`pivot_row_order`]
/// and `spare` unused working rows.
pub fn symbolic_pivoted(dense: &Array2<f64>, spare: usize) -> (QrSymbolic, Vec<f64>) {
    symbolic_with_row_order(dense, |parent, leftmost| {
        pivot_row_order(parent, leftmost, spare)
    })
}

fn symbolic_with_row_order<F>(dense: &Array2<f64>, row_order: F) -> (QrSymbolic, Vec<f64>)
where
    F: FnOnce(&[Option<usize>], &[usize]) -> (Vec<usize>, usize),
{
    let (nrow, ncol) = dense.dim();

    let mut rows = Vec::new();
    let mut cols = Vec::new();
    for ((i, j), &x) in dense.indexed_iter() {
        if x != 0.0 {
            rows.push(i);
            cols.push(j);
        }
    }
    // Column-compressed A is the row-compressed pattern of Aᵀ
    let a = Sparsity::triplet(ncol, nrow, &cols, &rows, false).expect("pattern of A");
    let nz_a = a.sparsify(&dense.t().to_owned()).expect("values of A");

    let parent = column_etree(&a);
    let leftmost: Vec<usize> = (0..nrow)
        .map(|i| {
            (0..ncol)
                .find(|&j| dense[[i, j]] != 0.0)
                .expect("every row has a non-zero")
        })
        .collect();
    let (pinv, nrow_ext) = row_order(&parent, &leftmost);

    let mut v_offset = vec![0];
    let mut v_index = Vec::new();
    for c in 0..ncol {
        v_index.extend(c..nrow_ext);
        v_offset.push(v_index.len());
    }
    let v = Sparsity::new(ncol, nrow_ext, v_offset, v_index).expect("pattern of V");
    let r = Sparsity::lower_triangular(ncol);

    let symbolic = QrSymbolic::new(a, v, r, parent, leftmost, pinv)
        .expect("consistent symbolic analysis");
    (symbolic, nz_a)
}

/// Row order in the manner of CSparse `cs_vcount`.
///
/// Working row `k < ncol` goes to the first queued row whose leftmost column
/// is `k`; the rest of that queue moves to the front of the parent's queue.
/// A column with an empty queue gets a fictitious working row. Rows left
/// over fill the working space from the bottom up, above `spare` unused
/// rows, so the order is never the identity when `nrow > ncol`.
pub fn pivot_row_order(
    parent: &[Option<usize>],
    leftmost: &[usize],
    spare: usize,
) -> (Vec<usize>, usize) {
    let ncol = parent.len();
    let nrow = leftmost.len();

    let mut queue: Vec<Vec<usize>> = vec![Vec::new(); ncol];
    for (i, &k) in leftmost.iter().enumerate() {
        queue[k].push(i);
    }

    let mut pinv: Vec<Option<usize>> = vec![None; nrow];
    let mut fictitious = 0;
    for k in 0..ncol {
        let mut rows = std::mem::take(&mut queue[k]);
        if rows.is_empty() {
            fictitious += 1;
            continue;
        }
        let first = rows.remove(0);
        pinv[first] = Some(k);
        if let Some(p) = parent[k] {
            rows.append(&mut queue[p]);
            queue[p] = rows;
        }
    }

    let nrow_ext = nrow + fictitious + spare;
    let mut next = nrow_ext;
    let pinv = pinv
        .into_iter()
        .map(|w| {
            w.unwrap_or_else(|| {
                next -= 1;
                next
            })
        })
        .collect();
    (pinv, nrow_ext)
}

/// Dense upper triangular R from its column-compressed values.
pub fn dense_r(symbolic: &QrSymbolic, nz_r: &[f64]) -> Array2<f64> {
    symbolic
        .r()
        .densify(nz_r)
        .expect("values of R")
        .t()
        .to_owned()
}

pub fn assert_matrix_close(a: &Array2<f64>, b: &Array2<f64>, tol: f64) {
    assert_eq!(a.dim(), b.dim());
    for ((idx, &x), &y) in a.indexed_iter().zip(b.iter()) {
        assert!(
            (x - y).abs() <= tol * (1.0 + y.abs()),
            "entry {:?}: {} vs {}",
            idx,
            x,
            y
        );
    }
}
