//! Pairwise squared Euclidean distances from Gram matrix algebra
//!
//! ||x_i - x_j||² = ||x_i||² + ||x_j||² - 2 * x_i^T * x_j
//!
//! The norms come from the column sums of the squared feature matrix and the
//! inner products from a single `X^T * X` product, so no per-pair loop over
//! samples is needed.

use crate::linalg::MatrixOps;
use ndarray::{Array2, ArrayView2};

/// Squared distances between all columns of `x` (`n_samples x n_samples`)
///
/// The diagonal is exactly zero unless the sample has NaN or infinite
/// features, in which case it stays NaN. Off-diagonal entries are not
/// clamped, so rounding can leave tiny negative values for near-identical
/// samples, and NaN features propagate.
pub fn squared_distances(ops: &dyn MatrixOps, x: ArrayView2<'_, f32>) -> Array2<f32> {
    let norms = ops.column_sums(ops.square(x).view());
    let inner = ops.matmul(x.t(), x);

    let mut distances = ops.broadcast_add(norms.view(), norms.view());
    distances.scaled_add(-2.0, &inner);

    // x_i - x_i is zero; the algebraic form only gets there up to rounding
    distances
        .diag_mut()
        .mapv_inplace(|d| if d.is_nan() { d } else { 0.0 });
    distances
}
