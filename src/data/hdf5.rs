//! HDF5 feature matrix loader

use crate::core::{FeatureMatrix, GramError, Result};
use log::debug;
use std::path::Path;

/// Load the dataset `name` from an HDF5 file
///
/// A two-dimensional dataset is read as `[n_samples, n_features]` in
/// row-major order, which is the column-major layout of the feature
/// matrix. A one-dimensional dataset is a single sample.
pub fn from_file<P: AsRef<Path>>(path: P, name: &str) -> Result<FeatureMatrix> {
    let path = path.as_ref();
    let file = hdf5::File::open(path)?;
    let dataset = file.dataset(name).map_err(|e| {
        GramError::InvalidDataset(format!("{path:?} has no dataset {name:?}: {e}"))
    })?;

    let shape = dataset.shape();
    let (n_samples, n_features) = match shape.as_slice() {
        [n_samples, n_features] => (*n_samples, *n_features),
        [n_features] => (1, *n_features),
        _ => {
            return Err(GramError::InvalidDataset(format!(
                "dataset {name:?} must be one or two dimensional, got shape {shape:?}"
            )))
        }
    };

    let data = dataset.read_raw::<f32>()?;
    debug!("Read {n_samples} samples with {n_features} features from {path:?}");
    FeatureMatrix::new(n_features, n_samples, data)
}
