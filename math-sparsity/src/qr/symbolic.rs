//! Symbolic input of the sparse QR kernel
//!
//! The elimination tree, leftmost columns, row permutation and the patterns
//! of V and R come from a symbolic analysis performed elsewhere. This module
//! only bundles them, checks that their dimensions agree, and offers an
//! opt-in consistency check.

use crate::error::{Result, SparsityError};
use crate::sparsity::Sparsity;

/// Symbolic structure consumed by [`qr_numeric`](super::qr_numeric).
///
/// The three patterns are column-compressed: each is stored as the
/// row-compressed pattern of its transpose, so `a().row(c)` lists the row
/// indices of column `c` of A. For an `nrow × ncol` matrix A:
///
/// - `a` is `ncol × nrow` (the transpose of A's pattern),
/// - `v` is `ncol × nrow_ext`: column `c` of V starts at its diagonal row `c`,
/// - `r` is `ncol × ncol`: column `c` of R ends at its diagonal row `c`,
/// - `parent[c]` is the parent of column `c` in the column elimination tree,
/// - `leftmost[i]` is the smallest column with a non-zero in row `i` of A,
/// - `pinv[i]` is the working row (in `0..nrow_ext`) of original row `i`.
#[derive(Debug, Clone)]
pub struct QrSymbolic {
    a: Sparsity,
    v: Sparsity,
    r: Sparsity,
    parent: Vec<Option<usize>>,
    leftmost: Vec<usize>,
    pinv: Vec<usize>,
}

impl QrSymbolic {
    /// Bundle the symbolic inputs, checking only that dimensions agree.
    ///
    /// The contents of `parent`, `leftmost` and `pinv` are trusted; see
    /// [`QrSymbolic::validate`] for the full check.
    pub fn new(
        a: Sparsity,
        v: Sparsity,
        r: Sparsity,
        parent: Vec<Option<usize>>,
        leftmost: Vec<usize>,
        pinv: Vec<usize>,
    ) -> Result<Self> {
        const CTX: &str = "QrSymbolic::new";
        let ncol = a.nrow();
        let nrow = a.ncol();
        let nrow_ext = v.ncol();

        let mismatch = |what: &str, got: String, expected: String| {
            SparsityError::invalid(CTX, format!("{what} is {got}, expected {expected}"))
        };

        if v.nrow() != ncol {
            return Err(mismatch(
                "pattern of V",
                format!("{:?}", v.shape()),
                format!("{ncol} columns"),
            ));
        }
        if r.shape() != (ncol, ncol) {
            return Err(mismatch(
                "pattern of R",
                format!("{:?}", r.shape()),
                format!("{:?}", (ncol, ncol)),
            ));
        }
        if nrow_ext < nrow || nrow_ext < ncol {
            return Err(mismatch(
                "row count of V",
                nrow_ext.to_string(),
                format!("at least max(nrow, ncol) = {}", nrow.max(ncol)),
            ));
        }
        if parent.len() != ncol {
            return Err(mismatch("parent length", parent.len().to_string(), ncol.to_string()));
        }
        if leftmost.len() != nrow {
            return Err(mismatch("leftmost length", leftmost.len().to_string(), nrow.to_string()));
        }
        if pinv.len() != nrow {
            return Err(mismatch("pinv length", pinv.len().to_string(), nrow.to_string()));
        }

        Ok(Self {
            a,
            v,
            r,
            parent,
            leftmost,
            pinv,
        })
    }

    /// Check that the symbolic arrays are consistent with each other.
    ///
    /// The kernel never calls this. It verifies that the tree points strictly
    /// upward, that `leftmost` holds columns bounding every row of A from
    /// below, that `pinv` is injective into `0..nrow_ext`, and that V and R
    /// columns have their diagonal where the kernel expects it.
    ///
    /// It also checks that V(:,c) holds every working row below the
    /// diagonal that column `c` can fill: the rows of A(:,c), and the rows of
    /// V(:,r) for each child `r` of `c`. A V pattern missing one of them
    /// would leave that row of the workspace dirty.
    pub fn validate(&self) -> Result<()> {
        const CTX: &str = "QrSymbolic::validate";
        let ncol = self.ncol();
        let nrow_ext = self.nrow_ext();

        for (c, p) in self.parent.iter().enumerate() {
            if let Some(p) = *p {
                if p <= c || p >= ncol {
                    return Err(SparsityError::invalid(
                        CTX,
                        format!("parent of column {c} is {p}, expected a column in {}..{ncol}", c + 1),
                    ));
                }
            }
        }

        if let Some((i, &l)) = self.leftmost.iter().enumerate().find(|&(_, &l)| l >= ncol) {
            return Err(SparsityError::out_of_range(CTX, "leftmost", i, l, ncol));
        }
        for c in 0..ncol {
            for &i in self.a.row(c) {
                if self.leftmost[i] > c {
                    return Err(SparsityError::invalid(
                        CTX,
                        format!(
                            "leftmost[{i}] = {} but row {i} has a non-zero in column {c}",
                            self.leftmost[i]
                        ),
                    ));
                }
            }
        }

        let mut seen = vec![false; nrow_ext];
        for (i, &w) in self.pinv.iter().enumerate() {
            if w >= nrow_ext {
                return Err(SparsityError::out_of_range(CTX, "pinv", i, w, nrow_ext));
            }
            if std::mem::replace(&mut seen[w], true) {
                return Err(SparsityError::invalid(
                    CTX,
                    format!("pinv maps two rows to working row {w}"),
                ));
            }
        }

        for c in 0..ncol {
            if self.v.row(c).first() != Some(&c) {
                return Err(SparsityError::invalid(
                    CTX,
                    format!("column {c} of V must start at its diagonal"),
                ));
            }
            if self.r.row(c).last() != Some(&c) {
                return Err(SparsityError::invalid(
                    CTX,
                    format!("column {c} of R must end at its diagonal"),
                ));
            }
        }

        let missing = |c: usize, w: usize| {
            SparsityError::invalid(
                CTX,
                format!("column {c} of V lacks working row {w}, which the column fills"),
            )
        };
        for c in 0..ncol {
            for &i in self.a.row(c) {
                let w = self.pinv[i];
                if w > c && !self.v.has_nz(c, w) {
                    return Err(missing(c, w));
                }
            }
        }
        for (r, p) in self.parent.iter().enumerate() {
            if let Some(p) = *p {
                if let Some(&w) = self.v.row(r).iter().find(|&&w| w > p && !self.v.has_nz(p, w)) {
                    return Err(missing(p, w));
                }
            }
        }

        Ok(())
    }

    /// Number of columns of A
    pub fn ncol(&self) -> usize {
        self.a.nrow()
    }

    /// Number of rows of A
    pub fn nrow(&self) -> usize {
        self.a.ncol()
    }

    /// Number of working rows (rows of V), at least `max(nrow, ncol)`
    pub fn nrow_ext(&self) -> usize {
        self.v.ncol()
    }

    /// Column-compressed pattern of A
    pub fn a(&self) -> &Sparsity {
        &self.a
    }

    /// Column-compressed pattern of the Householder vectors
    pub fn v(&self) -> &Sparsity {
        &self.v
    }

    /// Column-compressed pattern of the triangular factor
    pub fn r(&self) -> &Sparsity {
        &self.r
    }

    /// Parent of each column in the column elimination tree
    pub fn parent(&self) -> &[Option<usize>] {
        &self.parent
    }

    /// Smallest column of each original row of A
    pub fn leftmost(&self) -> &[usize] {
        &self.leftmost
    }

    /// Working row of each original row of A
    pub fn pinv(&self) -> &[usize] {
        &self.pinv
    }
}
