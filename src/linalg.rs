//! Dense matrix operations used by the kernel computations
//!
//! Kernels are written against the [`MatrixOps`] trait so the linear algebra
//! backend can be swapped; [`NdarrayOps`] is the default implementation.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Matrix primitives needed to derive pairwise squared distances
pub trait MatrixOps: Send + Sync {
    /// Elementwise square
    fn square(&self, x: ArrayView2<'_, f32>) -> Array2<f32>;

    /// Sum of each column
    fn column_sums(&self, x: ArrayView2<'_, f32>) -> Array1<f32>;

    /// Matrix product `a * b`
    fn matmul(&self, a: ArrayView2<'_, f32>, b: ArrayView2<'_, f32>) -> Array2<f32>;

    /// Outer sum: `out[i, j] = col[i] + row[j]`
    fn broadcast_add(&self, col: ArrayView1<'_, f32>, row: ArrayView1<'_, f32>) -> Array2<f32>;

    /// Upper triangle including the diagonal, row by row
    fn upper_triangle(&self, m: ArrayView2<'_, f32>) -> Vec<f32>;
}

/// [`MatrixOps`] backed by `ndarray`
#[derive(Debug, Clone, Copy, Default)]
pub struct NdarrayOps;

impl NdarrayOps {
    pub fn new() -> Self {
        Self
    }
}

impl MatrixOps for NdarrayOps {
    fn square(&self, x: ArrayView2<'_, f32>) -> Array2<f32> {
        x.mapv(|v| v * v)
    }

    fn column_sums(&self, x: ArrayView2<'_, f32>) -> Array1<f32> {
        x.sum_axis(Axis(0))
    }

    fn matmul(&self, a: ArrayView2<'_, f32>, b: ArrayView2<'_, f32>) -> Array2<f32> {
        a.dot(&b)
    }

    fn broadcast_add(&self, col: ArrayView1<'_, f32>, row: ArrayView1<'_, f32>) -> Array2<f32> {
        let col = col.insert_axis(Axis(1));
        let row = row.insert_axis(Axis(0));
        &col + &row
    }

    fn upper_triangle(&self, m: ArrayView2<'_, f32>) -> Vec<f32> {
        let n = m.nrows();
        let mut values = Vec::with_capacity(n * (n + 1) / 2);
        for (i, row) in m.outer_iter().enumerate() {
            values.extend(row.iter().skip(i));
        }
        values
    }
}
