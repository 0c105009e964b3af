//! Owning wrapper around the QR kernel
//!
//! [`SparseQr`] allocates the factor buffers and workspace once for a given
//! [`QrSymbolic`] and reuses them for every refactorization, which is the
//! usual pattern inside an outer iterative solve. It also applies Qᵀ and
//! solves least-squares problems with the computed factors.

use super::numeric::{QrWorkspace, factorize_columns};
use super::symbolic::QrSymbolic;
use crate::blas_helpers::{sparse_axpy, sparse_dot};
use crate::error::{Result, SparsityError};
use crate::traits::RealField;
use ndarray::Array1;

/// Sparse QR configuration
#[derive(Debug, Clone, Default)]
pub struct QrConfig {
    /// Run [`QrSymbolic::validate`] when the factorization is set up
    pub validate_symbolic: bool,
    /// Log progress every N columns (0 = no output)
    pub print_interval: usize,
}

/// Apply `Qᵀ = H_{ncol-1} ⋯ H_0` in place to `y`, a vector in the working
/// row space (length `nrow_ext`).
pub fn apply_qt<T: RealField>(
    symbolic: &QrSymbolic,
    nz_v: &[T],
    beta: &[T],
    y: &mut [T],
) -> Result<()> {
    let v = symbolic.v();
    if nz_v.len() != v.nnz() || beta.len() != symbolic.ncol() || y.len() != symbolic.nrow_ext() {
        return Err(SparsityError::invalid(
            "apply_qt",
            format!(
                "got {} values of V, {} betas and a vector of length {}; expected {}, {} and {}",
                nz_v.len(),
                beta.len(),
                y.len(),
                v.nnz(),
                symbolic.ncol(),
                symbolic.nrow_ext()
            ),
        ));
    }

    for c in 0..symbolic.ncol() {
        let range = v.row_range(c);
        let rows = &v.col_index()[range.clone()];
        let vals = &nz_v[range];
        let tau = sparse_dot(vals, rows, y) * beta[c];
        sparse_axpy(-tau, vals, rows, y);
    }
    Ok(())
}

/// Sparse QR factorization with owned factors and workspace.
#[derive(Debug, Clone)]
pub struct SparseQr<'a, T: RealField> {
    symbolic: &'a QrSymbolic,
    config: QrConfig,
    workspace: QrWorkspace<T>,
    v: Vec<T>,
    r: Vec<T>,
    beta: Vec<T>,
    factorized: bool,
}

impl<'a, T: RealField> SparseQr<'a, T> {
    /// Allocate factors and workspace for `symbolic`.
    pub fn new(symbolic: &'a QrSymbolic, config: QrConfig) -> Result<Self> {
        if config.validate_symbolic {
            symbolic.validate()?;
        }
        Ok(Self {
            symbolic,
            config,
            workspace: QrWorkspace::new(symbolic),
            v: vec![T::zero(); symbolic.v().nnz()],
            r: vec![T::zero(); symbolic.r().nnz()],
            beta: vec![T::zero(); symbolic.ncol()],
            factorized: false,
        })
    }

    /// Factorize A, given its values aligned with `symbolic.a()`.
    pub fn factorize(&mut self, nz_a: &[T]) -> Result<()> {
        self.factorized = false;
        factorize_columns(
            self.symbolic,
            nz_a,
            &mut self.workspace,
            &mut self.v,
            &mut self.r,
            &mut self.beta,
            self.config.print_interval,
        )?;
        self.factorized = true;

        log::debug!(
            "sparse QR: {} x {} (working rows {}), nnz(V) = {}, nnz(R) = {}",
            self.symbolic.nrow(),
            self.symbolic.ncol(),
            self.symbolic.nrow_ext(),
            self.v.len(),
            self.r.len()
        );
        Ok(())
    }

    /// Symbolic analysis the factors are aligned with
    pub fn symbolic(&self) -> &'a QrSymbolic {
        self.symbolic
    }

    /// Householder vectors, aligned with `symbolic().v()`
    pub fn v(&self) -> &[T] {
        &self.v
    }

    /// Triangular factor, aligned with `symbolic().r()`
    pub fn r(&self) -> &[T] {
        &self.r
    }

    /// Householder scale factors, one per column
    pub fn beta(&self) -> &[T] {
        &self.beta
    }

    /// Apply Qᵀ in place to a vector in the working row space
    pub fn apply_qt(&self, y: &mut [T]) -> Result<()> {
        self.ensure_factorized("apply_qt")?;
        apply_qt(self.symbolic, &self.v, &self.beta, y)
    }

    /// Solve `min ‖A x - b‖₂` for A with full column rank.
    ///
    /// `b` is indexed by the original rows of A.
    pub fn solve(&self, b: &Array1<T>) -> Result<Array1<T>> {
        const CTX: &str = "SparseQr::solve";
        self.ensure_factorized(CTX)?;
        let sym = self.symbolic;
        if b.len() != sym.nrow() {
            return Err(SparsityError::invalid(
                CTX,
                format!("right-hand side has length {}, expected {}", b.len(), sym.nrow()),
            ));
        }

        let mut y = vec![T::zero(); sym.nrow_ext()];
        for (i, &bi) in b.iter().enumerate() {
            y[sym.pinv()[i]] = bi;
        }
        apply_qt(sym, &self.v, &self.beta, &mut y)?;

        // Back substitution, column by column
        let r = sym.r();
        for c in (0..sym.ncol()).rev() {
            let diag = r
                .get_nz(c, c)
                .map(|k| self.r[k])
                .filter(|d| *d != T::zero())
                .ok_or(SparsityError::SingularFactor { column: c })?;
            y[c] /= diag;
            let yc = y[c];
            for k in r.row_range(c) {
                let row = r.col_index()[k];
                if row != c {
                    y[row] -= self.r[k] * yc;
                }
            }
        }

        y.truncate(sym.ncol());
        Ok(Array1::from_vec(y))
    }

    fn ensure_factorized(&self, context: &'static str) -> Result<()> {
        if !self.factorized {
            return Err(SparsityError::invalid(
                context,
                "no successful factorization to use",
            ));
        }
        Ok(())
    }
}
