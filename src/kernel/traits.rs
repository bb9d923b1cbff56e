//! Kernel trait definition

use crate::core::{FeatureMatrix, KernelSpec, Result, TriangularVector};
use crate::linalg::{MatrixOps, NdarrayOps};

/// Kernel whose Gram matrix can be computed over a whole feature matrix
///
/// Implementations return only the upper triangle (diagonal included) in
/// the row-by-row order of [`TriangularVector`], so results of different
/// kernels line up entry by entry.
pub trait Kernel: Send + Sync {
    /// Identity and parameters of this kernel
    fn spec(&self) -> KernelSpec;

    /// Compute the upper triangle of the Gram matrix with the given backend
    fn upper_with(&self, ops: &dyn MatrixOps, x: &FeatureMatrix) -> Result<TriangularVector>;

    /// Compute the upper triangle of the Gram matrix with [`NdarrayOps`]
    fn upper(&self, x: &FeatureMatrix) -> Result<TriangularVector> {
        self.upper_with(&NdarrayOps, x)
    }
}
