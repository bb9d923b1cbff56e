//! Linear kernel implementation

use crate::core::{FeatureMatrix, KernelSpec, Result, TriangularVector};
use crate::kernel::{squared_distances, Kernel};
use crate::linalg::MatrixOps;

/// "Linear" kernel: K(x, y) = ||x||² + ||y||² - 2 * x^T * y
///
/// Despite the name this is the squared Euclidean distance, not the plain
/// inner product. Stored results are keyed as the linear kernel, and
/// consumers rely on these values, so the formula stays as it is.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearKernel;

impl LinearKernel {
    /// Create a new linear kernel
    pub fn new() -> Self {
        Self
    }
}

impl Kernel for LinearKernel {
    fn spec(&self) -> KernelSpec {
        KernelSpec::Linear
    }

    fn upper_with(&self, ops: &dyn MatrixOps, x: &FeatureMatrix) -> Result<TriangularVector> {
        let distances = squared_distances(ops, x.view());
        TriangularVector::new(x.n_samples(), ops.upper_triangle(distances.view()))
    }
}
