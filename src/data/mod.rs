//! Feature matrix loading
//!
//! Input files are recognised by extension: CSV (`.csv`, `.txt`) is always
//! available, HDF5 (`.h5`, `.hdf5`) needs the `hdf5` cargo feature.

pub mod csv;
#[cfg(feature = "hdf5")]
pub mod hdf5;

use crate::core::{FeatureMatrix, Result};
use log::{info, warn};
use std::path::Path;

/// Name of the input array read from container formats
pub const DEFAULT_DATASET: &str = "data";

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Hdf5,
}

/// Pick the input format from the file extension
pub fn detect_format(path: &Path) -> InputFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("h5") | Some("hdf5") => InputFormat::Hdf5,
        Some("csv") | Some("txt") => InputFormat::Csv,
        Some(_) => {
            warn!("Unknown file extension, assuming CSV format");
            InputFormat::Csv
        }
        None => {
            warn!("No file extension, assuming CSV format");
            InputFormat::Csv
        }
    }
}

/// Load the feature matrix stored in `path`
///
/// `dataset` names the array inside container formats and is ignored for
/// CSV input.
pub fn load_matrix(path: &Path, dataset: &str) -> Result<FeatureMatrix> {
    let format = detect_format(path);
    info!("Loading {path:?} as {format:?}");

    let matrix = match format {
        InputFormat::Csv => csv::from_file(path)?,
        #[cfg(feature = "hdf5")]
        InputFormat::Hdf5 => self::hdf5::from_file(path, dataset)?,
        #[cfg(not(feature = "hdf5"))]
        InputFormat::Hdf5 => {
            return Err(crate::core::GramError::InvalidDataset(format!(
                "cannot read dataset {dataset:?} from {path:?}: built without HDF5 support (enable the `hdf5` feature)"
            )))
        }
    };

    info!(
        "Loaded {} samples with {} features",
        matrix.n_samples(),
        matrix.n_features()
    );
    Ok(matrix)
}
