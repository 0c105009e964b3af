//! Vector kernels used by the sparse QR
//!
//! Only what the factorization needs: an inner product and an axpy over a
//! sparse index set (a Householder vector stored as values + row indices),
//! and the Householder generator itself.

use crate::traits::RealField;

/// Compute Σ values[k] * x[rows[k]]
#[inline]
pub fn sparse_dot<T: RealField>(values: &[T], rows: &[usize], x: &[T]) -> T {
    debug_assert_eq!(values.len(), rows.len());
    let mut sum = T::zero();
    for (&v, &r) in values.iter().zip(rows.iter()) {
        sum += v * x[r];
    }
    sum
}

/// Compute x[rows[k]] += alpha * values[k]
#[inline]
pub fn sparse_axpy<T: RealField>(alpha: T, values: &[T], rows: &[usize], x: &mut [T]) {
    debug_assert_eq!(values.len(), rows.len());
    for (&v, &r) in values.iter().zip(rows.iter()) {
        x[r] += alpha * v;
    }
}

/// Generate a Householder reflector in place.
///
/// On entry `v` holds a vector whose first entry is the pivot. On exit `v`
/// holds the reflector direction and the returned pair is `(s, beta)` with
/// `(I - beta v vᵀ) x = s e₁` and `s = ‖x‖₂ >= 0`.
///
/// When the tail is already zero, `v` becomes `e₁` and `beta` is either 0
/// (pivot positive, identity) or 2 (pivot non-positive, sign flip).
pub fn house<T: RealField>(v: &mut [T]) -> (T, T) {
    let Some((head, tail)) = v.split_first_mut() else {
        return (T::zero(), T::zero());
    };

    let mut sigma = T::zero();
    for t in tail.iter() {
        sigma += t.norm_sqr();
    }

    let x0 = *head;
    if sigma == T::zero() {
        let beta = if x0 <= T::zero() {
            T::one() + T::one()
        } else {
            T::zero()
        };
        *head = T::one();
        (x0.abs(), beta)
    } else {
        let s = (x0.norm_sqr() + sigma).sqrt();
        *head = if x0 <= T::zero() {
            x0 - s
        } else {
            -sigma / (x0 + s)
        };
        let beta = -T::one() / (s * *head);
        (s, beta)
    }
}
