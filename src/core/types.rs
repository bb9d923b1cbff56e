//! Core type definitions for Gram matrix precomputation

use crate::core::{GramError, Result};
use ndarray::{Array2, ArrayView1, ArrayView2, ShapeBuilder};
use serde::{Deserialize, Serialize};

/// Dense feature matrix, one sample per column
///
/// Values are stored column-major (`n_features` rows by `n_samples`
/// columns), so the feature vector of each sample is contiguous in memory.
/// The matrix is never mutated after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureMatrix {
    values: Array2<f32>,
}

impl FeatureMatrix {
    /// Create a matrix from column-major data
    ///
    /// `data.len()` must equal `n_features * n_samples`.
    pub fn new(n_features: usize, n_samples: usize, data: Vec<f32>) -> Result<Self> {
        let expected = n_features
            .checked_mul(n_samples)
            .ok_or_else(|| GramError::InvalidDataset("matrix dimensions overflow".to_string()))?;
        if data.len() != expected {
            return Err(GramError::DimensionMismatch {
                expected,
                actual: data.len(),
            });
        }

        let values = Array2::from_shape_vec((n_features, n_samples).f(), data)
            .map_err(|e| GramError::InvalidDataset(e.to_string()))?;
        Ok(Self { values })
    }

    /// Create a matrix from per-sample feature vectors
    ///
    /// Every sample must have the same number of features.
    pub fn from_samples(samples: &[Vec<f32>]) -> Result<Self> {
        let n_features = samples.first().map(|s| s.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(n_features * samples.len());
        for sample in samples {
            if sample.len() != n_features {
                return Err(GramError::DimensionMismatch {
                    expected: n_features,
                    actual: sample.len(),
                });
            }
            data.extend_from_slice(sample);
        }
        Self::new(n_features, samples.len(), data)
    }

    /// Number of features (rows)
    pub fn n_features(&self) -> usize {
        self.values.nrows()
    }

    /// Number of samples (columns)
    pub fn n_samples(&self) -> usize {
        self.values.ncols()
    }

    /// Check if the matrix holds no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Feature vector of sample `i`
    ///
    /// # Panics
    /// Panics if `i >= n_samples()`
    pub fn sample(&self, i: usize) -> ArrayView1<'_, f32> {
        self.values.column(i)
    }

    /// View of the whole matrix (`n_features x n_samples`)
    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.values.view()
    }

    /// Iterate over the stored values in column-major order
    pub fn iter_column_major(&self) -> impl Iterator<Item = &f32> + '_ {
        // The transpose iterates logically row by row, which is the
        // column-major order of the stored matrix.
        self.values.t().into_iter()
    }
}

/// Upper triangle of a symmetric matrix, diagonal included
///
/// Entries are ordered row by row: `(0,0), (0,1), .., (0,n-1), (1,1), ..`,
/// which gives `n * (n + 1) / 2` values for `n` samples.
#[derive(Clone, Debug, PartialEq)]
pub struct TriangularVector {
    n_samples: usize,
    values: Vec<f32>,
}

impl TriangularVector {
    /// Wrap already ordered values, checking the length
    pub fn new(n_samples: usize, values: Vec<f32>) -> Result<Self> {
        let expected = triangular_len(n_samples);
        if values.len() != expected {
            return Err(GramError::DimensionMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self { n_samples, values })
    }

    /// Wrap a flat vector, inferring the number of samples from its length
    pub fn from_flat(values: Vec<f32>) -> Result<Self> {
        let n_samples = samples_for_len(values.len()).ok_or_else(|| {
            GramError::InvalidDataset(format!(
                "{} values do not form an upper triangle",
                values.len()
            ))
        })?;
        Ok(Self { n_samples, values })
    }

    /// Number of samples of the originating square matrix
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Position of entry `(i, j)`; symmetric in its arguments
    ///
    /// # Panics
    /// Panics if either index is out of range
    pub fn index_of(&self, i: usize, j: usize) -> usize {
        assert!(
            i < self.n_samples && j < self.n_samples,
            "index ({i}, {j}) out of range for {} samples",
            self.n_samples
        );
        let (i, j) = if i <= j { (i, j) } else { (j, i) };
        i * (2 * self.n_samples - i + 1) / 2 + (j - i)
    }

    /// Entry `(i, j)` of the symmetric matrix
    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.values[self.index_of(i, j)]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.values
    }
}

/// Full symmetric Gram matrix
#[derive(Clone, Debug, PartialEq)]
pub struct GramMatrix {
    values: Array2<f32>,
}

impl GramMatrix {
    /// Rebuild the full matrix by mirroring an upper triangle
    pub fn from_upper(upper: &TriangularVector) -> Self {
        let n = upper.n_samples();
        let mut values = Array2::zeros((n, n));
        let mut pos = 0;
        for i in 0..n {
            for j in i..n {
                let v = upper.values[pos];
                values[[i, j]] = v;
                values[[j, i]] = v;
                pos += 1;
            }
        }
        Self { values }
    }

    pub fn n_samples(&self) -> usize {
        self.values.nrows()
    }

    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.values[[i, j]]
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.values.view()
    }

    /// Extract the upper triangle again
    pub fn upper(&self) -> TriangularVector {
        let n = self.n_samples();
        let mut values = Vec::with_capacity(triangular_len(n));
        for i in 0..n {
            for j in i..n {
                values.push(self.values[[i, j]]);
            }
        }
        TriangularVector {
            n_samples: n,
            values,
        }
    }
}

/// Kernel identity and parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KernelSpec {
    /// Squared Euclidean distance, stored under the "linear" kernel name
    Linear,
    /// exp(-gamma * squared distance)
    Rbf { gamma: f64 },
}

impl KernelSpec {
    /// Kernel type tag used in storage keys
    pub fn tag(&self) -> &'static str {
        match self {
            KernelSpec::Linear => "KernelType.LINEAR",
            KernelSpec::Rbf { .. } => "KernelType.RBF",
        }
    }
}

/// Configuration of the RBF bandwidth sweep
///
/// Gamma values are `base^v` for `v = start, start + step, ..` while
/// `v < stop + step`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// First exponent
    pub start: f64,
    /// Last exponent (the sweep may overshoot it by less than one step)
    pub stop: f64,
    /// Exponent increment, must be positive
    pub step: f64,
    /// Base raised to each exponent
    pub base: f64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            start: -25.0,
            stop: 5.0,
            step: 1.0,
            base: 2.0,
        }
    }
}

/// Number of upper-triangle entries for `n` samples
pub fn triangular_len(n: usize) -> usize {
    n * (n + 1) / 2
}

fn samples_for_len(len: usize) -> Option<usize> {
    // Start from the float estimate and correct for rounding.
    let estimate = (((8.0 * len as f64 + 1.0).sqrt() - 1.0) / 2.0) as usize;
    (estimate.saturating_sub(1)..=estimate + 1).find(|&n| triangular_len(n) == len)
}
