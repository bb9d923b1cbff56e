//! High-level API for Gram matrix precomputation
//!
//! This module ties the pieces together: fingerprint the input once, store
//! the linear (squared distance) triangle, then one RBF triangle per gamma of
//! the bandwidth sweep.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rgram::api::GramPrecompute;
//! use rgram::store::JsonlStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let x = rgram::data::load_matrix("features.csv".as_ref(), "data")?;
//! let mut store = JsonlStore::create("gram.jsonl")?;
//!
//! let summary = GramPrecompute::new()
//!     .with_step(1.0)
//!     .run(&x, &mut store)?;
//! for key in &summary.keys {
//!     println!("key: {key}");
//! }
//! # Ok(())
//! # }
//! ```

use crate::cache::{DataFingerprint, StorageKey};
use crate::core::{FeatureMatrix, GramError, KernelSpec, Result, ResultStore, SweepConfig};
use crate::kernel::{Kernel, LinearKernel, RBFKernel};
use crate::linalg::{MatrixOps, NdarrayOps};
use log::{debug, info};
use std::collections::HashSet;

/// Gram matrix precomputation with builder pattern
pub struct GramPrecompute<O: MatrixOps = NdarrayOps> {
    config: SweepConfig,
    ops: O,
}

impl GramPrecompute<NdarrayOps> {
    /// Create a precomputation with the default sweep and `ndarray` backend
    pub fn new() -> Self {
        Self {
            config: SweepConfig::default(),
            ops: NdarrayOps::new(),
        }
    }
}

impl Default for GramPrecompute<NdarrayOps> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: MatrixOps> GramPrecompute<O> {
    /// Create a precomputation using a custom matrix backend
    pub fn with_ops(ops: O) -> Self {
        Self {
            config: SweepConfig::default(),
            ops,
        }
    }

    /// Replace the whole sweep configuration
    pub fn with_config(mut self, config: SweepConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the exponent increment of the sweep
    pub fn with_step(mut self, step: f64) -> Self {
        self.config.step = step;
        self
    }

    /// Set the first and last exponent of the sweep
    pub fn with_range(mut self, start: f64, stop: f64) -> Self {
        self.config.start = start;
        self.config.stop = stop;
        self
    }

    /// Set the base raised to each exponent
    pub fn with_base(mut self, base: f64) -> Self {
        self.config.base = base;
        self
    }

    /// Current sweep configuration
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Compute and store every triangle for `x`
    ///
    /// Writes happen in order: the linear triangle first, then RBF triangles
    /// by increasing exponent. Nothing is rolled back on failure; keys
    /// written before the error stay in the store.
    pub fn run<S: ResultStore + ?Sized>(
        &self,
        x: &FeatureMatrix,
        store: &mut S,
    ) -> Result<PrecomputeSummary> {
        self.run_with(x, store, |_| {})
    }

    /// Like [`GramPrecompute::run`], calling `on_key` with each key right
    /// before its triangle is computed and written
    pub fn run_with<S, F>(
        &self,
        x: &FeatureMatrix,
        store: &mut S,
        mut on_key: F,
    ) -> Result<PrecomputeSummary>
    where
        S: ResultStore + ?Sized,
        F: FnMut(&StorageKey),
    {
        // Validate the sweep before touching the store
        let gammas = self.config.gammas()?;
        let kernels = gammas
            .iter()
            .map(|&gamma| RBFKernel::try_new(gamma))
            .collect::<Result<Vec<_>>>()?;

        let fingerprint = DataFingerprint::of(x);
        info!(
            "Data fingerprint {fingerprint} ({} samples, {} features)",
            x.n_samples(),
            x.n_features()
        );

        let namespace = fingerprint.to_hex();
        if !store.has_namespace(&namespace) {
            store.create_namespace(&namespace)?;
        }

        let mut summary = PrecomputeSummary {
            fingerprint,
            gammas,
            keys: Vec::with_capacity(kernels.len() + 1),
        };
        let mut seen = HashSet::new();

        let linear = LinearKernel::new();
        let all_kernels = std::iter::once(&linear as &dyn Kernel)
            .chain(kernels.iter().map(|kernel| kernel as &dyn Kernel));
        for kernel in all_kernels {
            let key = StorageKey::build(&fingerprint, &kernel.spec());
            if !seen.insert(key.clone()) {
                return Err(GramError::KeyCollision(key.to_string()));
            }

            info!("key: {key}");
            on_key(&key);
            let upper = kernel.upper_with(&self.ops, x)?;
            debug!("Writing {} values to {key}", upper.len());
            store.write(&key, upper.as_slice())?;
            summary.keys.push(key);
        }

        store.flush()?;
        info!("Stored {} Gram matrix triangles", summary.keys.len());
        Ok(summary)
    }
}

/// Outcome of one precomputation run
#[derive(Debug, Clone)]
pub struct PrecomputeSummary {
    /// Fingerprint of the input, also the namespace of every key
    pub fingerprint: DataFingerprint,
    /// RBF gammas in the order they were stored
    pub gammas: Vec<f64>,
    /// Keys in write order, linear first
    pub keys: Vec<StorageKey>,
}

impl PrecomputeSummary {
    /// Kernel of each stored key, in write order
    pub fn specs(&self) -> impl Iterator<Item = KernelSpec> + '_ {
        std::iter::once(KernelSpec::Linear).chain(
            self.gammas
                .iter()
                .map(|&gamma| KernelSpec::Rbf { gamma }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use approx::assert_abs_diff_eq;

    fn two_samples() -> FeatureMatrix {
        // Columns (0, 0) and (1, 1)
        FeatureMatrix::new(2, 2, vec![0.0, 0.0, 1.0, 1.0]).unwrap()
    }

    #[test]
    fn test_precompute_end_to_end() {
        let x = two_samples();
        let mut store = MemoryStore::new();

        let summary = GramPrecompute::new().with_step(30.0).run(&x, &mut store).unwrap();

        assert_eq!(summary.gammas, vec![2f64.powi(-25), 32.0]);
        assert_eq!(summary.keys.len(), 3);
        assert_eq!(store.len(), 3);

        let linear = store.get(&summary.keys[0]).unwrap();
        assert_eq!(linear, &[0.0f32, 2.0, 0.0][..]);

        let small = store.get(&summary.keys[1]).unwrap();
        assert_eq!(small[0], 1.0);
        assert_abs_diff_eq!(small[1], (1.0 - 2.0 * 2f64.powi(-25)) as f32, epsilon = 1e-6);
        assert_eq!(small[2], 1.0);

        let large = store.get(&summary.keys[2]).unwrap();
        assert_eq!(large, &[1.0, (-64.0f64).exp() as f32, 1.0]);
    }

    #[test]
    fn test_precompute_key_layout() {
        let x = two_samples();
        let mut store = MemoryStore::new();
        let summary = GramPrecompute::new().with_step(30.0).run(&x, &mut store).unwrap();

        let fp = DataFingerprint::of(&x).to_hex();
        let keys: Vec<&str> = summary.keys.iter().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                format!("/{fp}/KernelType.LINEAR_0_0_0"),
                format!("/{fp}/KernelType.RBF_2.980232238769531e-08_0_0"),
                format!("/{fp}/KernelType.RBF_32_0_0"),
            ]
        );
        assert_eq!(store.namespaces().collect::<Vec<_>>(), vec![fp.as_str()]);
    }

    #[test]
    fn test_precompute_keys_unique() {
        let x = FeatureMatrix::from_samples(&[vec![1.0, 2.0], vec![0.5, -1.0], vec![3.0, 3.0]]).unwrap();
        let mut store = MemoryStore::new();
        let summary = GramPrecompute::new().with_step(0.5).run(&x, &mut store).unwrap();

        let unique: HashSet<_> = summary.keys.iter().collect();
        assert_eq!(summary.gammas.len(), 61);
        assert_eq!(unique.len(), summary.gammas.len() + 1);
        assert_eq!(store.len(), unique.len());
        assert!(summary
            .keys
            .iter()
            .all(|k| k.namespace() == summary.fingerprint.to_hex()));
    }

    #[test]
    fn test_precompute_gammas_increasing() {
        let x = two_samples();
        let mut store = MemoryStore::new();
        let summary = GramPrecompute::new().with_step(3.0).run(&x, &mut store).unwrap();

        assert!(summary.gammas.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(summary.specs().count(), summary.keys.len());
    }

    #[test]
    fn test_precompute_rbf_diagonal() {
        let samples: Vec<Vec<f32>> = (0..6)
            .map(|i| (0..4).map(|j| ((i * 4 + j) as f32 * 0.7).cos() * 3.0).collect())
            .collect();
        let x = FeatureMatrix::from_samples(&samples).unwrap();
        let mut store = MemoryStore::new();
        let summary = GramPrecompute::new().with_step(2.0).run(&x, &mut store).unwrap();

        for (key, spec) in summary.keys.iter().zip(summary.specs()) {
            if let KernelSpec::Rbf { .. } = spec {
                let upper = crate::core::TriangularVector::from_flat(store.get(key).unwrap().to_vec()).unwrap();
                for i in 0..6 {
                    assert_abs_diff_eq!(upper.get(i, i), 1.0, epsilon = f32::EPSILON);
                }
            }
        }
    }

    #[test]
    fn test_precompute_invalid_step_leaves_store_untouched() {
        let x = two_samples();
        let mut store = MemoryStore::new();

        let result = GramPrecompute::new().with_step(0.0).run(&x, &mut store);
        assert!(matches!(result, Err(GramError::InvalidParameter(_))));
        assert_eq!(store.namespaces().count(), 0);
    }

    #[test]
    fn test_precompute_rejects_rerun_into_same_store() {
        let x = two_samples();
        let mut store = MemoryStore::new();
        let precompute = GramPrecompute::new().with_step(30.0);

        precompute.run(&x, &mut store).unwrap();
        assert!(matches!(
            precompute.run(&x, &mut store),
            Err(GramError::Storage(_))
        ));
    }

    #[test]
    fn test_precompute_key_collision() {
        // Exponents 1e-17 apart render to the same 16 digit gamma
        let x = two_samples();
        let mut store = MemoryStore::new();
        let result = GramPrecompute::new()
            .with_range(0.0, 4e-17)
            .with_step(1e-17)
            .run(&x, &mut store);

        assert!(matches!(result, Err(GramError::KeyCollision(_))));
    }

    #[test]
    fn test_precompute_reports_keys_in_write_order() {
        let x = two_samples();
        let mut store = MemoryStore::new();
        let mut reported = Vec::new();

        let summary = GramPrecompute::new()
            .with_step(30.0)
            .run_with(&x, &mut store, |key| reported.push(key.clone()))
            .unwrap();

        assert_eq!(reported, summary.keys);
    }

    #[test]
    fn test_precompute_reports_keys_written_before_failure() {
        let x = two_samples();
        let mut store = MemoryStore::new();
        let mut reported = Vec::new();

        let result = GramPrecompute::new()
            .with_range(0.0, 4e-17)
            .with_step(1e-17)
            .run_with(&x, &mut store, |key| reported.push(key.to_string()));

        assert!(matches!(result, Err(GramError::KeyCollision(_))));
        assert_eq!(reported.len(), 2);
        assert!(reported[0].ends_with("/KernelType.LINEAR_0_0_0"));
        assert!(reported[1].ends_with("/KernelType.RBF_1_0_0"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_precompute_reports_key_of_failed_write() {
        let x = two_samples();
        let linear = StorageKey::build(&DataFingerprint::of(&x), &KernelSpec::Linear);
        let mut store = MemoryStore::new();
        store.create_namespace(linear.namespace()).unwrap();
        store.write(&linear, &[0.0]).unwrap();

        let mut reported = Vec::new();
        let result = GramPrecompute::new()
            .with_step(30.0)
            .run_with(&x, &mut store, |key| reported.push(key.clone()));

        assert!(matches!(result, Err(GramError::Storage(_))));
        assert_eq!(reported, vec![linear]);
    }

    #[test]
    fn test_precompute_empty_dataset() {
        let x = FeatureMatrix::new(3, 0, Vec::new()).unwrap();
        let mut store = MemoryStore::new();
        let summary = GramPrecompute::new().with_step(30.0).run(&x, &mut store).unwrap();

        assert_eq!(
            summary.fingerprint.to_hex(),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
        assert!(summary.keys.iter().all(|k| store.get(k).unwrap().is_empty()));
    }

    #[test]
    fn test_precompute_builder() {
        let precompute = GramPrecompute::new()
            .with_range(-3.0, 3.0)
            .with_step(0.5)
            .with_base(10.0);

        let config = precompute.config();
        assert_eq!(config.start, -3.0);
        assert_eq!(config.stop, 3.0);
        assert_eq!(config.step, 0.5);
        assert_eq!(config.base, 10.0);
    }
}
