//! RBF (Radial Basis Function) kernel implementation
//!
//! The RBF kernel is defined as: K(x, y) = exp(-γ * ||x - y||²)
//! where γ (gamma) is a hyperparameter that controls the kernel width.

use crate::core::{FeatureMatrix, GramError, KernelSpec, Result, TriangularVector};
use crate::kernel::{squared_distances, Kernel};
use crate::linalg::MatrixOps;

/// RBF (Radial Basis Function) kernel: K(x, y) = exp(-γ * ||x - y||²)
///
/// The gamma parameter controls the "reach" of each sample:
/// - High gamma: only close points are similar
/// - Low gamma: distant points stay similar
///
/// Gamma values are usually swept on a log scale, see [`crate::sweep`].
#[derive(Debug, Clone, Copy)]
pub struct RBFKernel {
    gamma: f64,
}

impl RBFKernel {
    /// Create a new RBF kernel with specified gamma parameter
    ///
    /// # Panics
    /// Panics if gamma is not positive and finite
    pub fn new(gamma: f64) -> Self {
        match Self::try_new(gamma) {
            Ok(kernel) => kernel,
            Err(_) => panic!("Gamma must be positive, got: {}", gamma),
        }
    }

    /// Create a new RBF kernel, rejecting non-positive or non-finite gamma
    pub fn try_new(gamma: f64) -> Result<Self> {
        if !(gamma.is_finite() && gamma > 0.0) {
            return Err(GramError::InvalidParameter(format!(
                "Gamma must be positive, got: {gamma}"
            )));
        }
        Ok(Self { gamma })
    }

    /// Get the gamma parameter
    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl Kernel for RBFKernel {
    fn spec(&self) -> KernelSpec {
        KernelSpec::Rbf { gamma: self.gamma }
    }

    fn upper_with(&self, ops: &dyn MatrixOps, x: &FeatureMatrix) -> Result<TriangularVector> {
        let distances = squared_distances(ops, x.view());
        let values = ops
            .upper_triangle(distances.view())
            .into_iter()
            .map(|d| (-self.gamma * d as f64).exp() as f32)
            .collect();
        TriangularVector::new(x.n_samples(), values)
    }
}
