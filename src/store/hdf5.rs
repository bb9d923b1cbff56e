//! HDF5 result container
//!
//! Each namespace is an HDF5 group under the root, and each key a
//! one-dimensional `f32` dataset inside its group.

use crate::cache::StorageKey;
use crate::core::{GramError, Result, ResultStore};
use crate::store::ensure_writable;
use log::debug;
use std::path::Path;

/// Result store backed by an HDF5 file
///
/// The file is closed when the store is dropped.
pub struct Hdf5Store {
    file: hdf5::File,
}

impl Hdf5Store {
    /// Open the container, truncating it or appending to it
    pub fn open<P: AsRef<Path>>(path: P, truncate: bool) -> Result<Self> {
        let path = path.as_ref();
        let file = if truncate {
            hdf5::File::create(path)?
        } else {
            hdf5::File::append(path)?
        };
        debug!("Opened HDF5 container {path:?} (truncate: {truncate})");
        Ok(Self { file })
    }
}

impl ResultStore for Hdf5Store {
    fn create_namespace(&mut self, name: &str) -> Result<()> {
        if self.has_namespace(name) {
            return Err(GramError::Storage(format!(
                "namespace {name} already exists"
            )));
        }
        self.file.create_group(name)?;
        Ok(())
    }

    fn has_namespace(&self, name: &str) -> bool {
        self.file.link_exists(name)
    }

    fn write(&mut self, key: &StorageKey, data: &[f32]) -> Result<()> {
        ensure_writable(&*self, key)?;
        let dataset = self
            .file
            .new_dataset::<f32>()
            .shape(data.len())
            .create(key.as_str())?;
        dataset.write_raw(data)?;
        Ok(())
    }

    fn contains(&self, key: &StorageKey) -> bool {
        self.has_namespace(key.namespace()) && self.file.link_exists(key.as_str())
    }

    fn read(&mut self, key: &StorageKey) -> Result<Option<Vec<f32>>> {
        if !self.contains(key) {
            return Ok(None);
        }
        let data = self.file.dataset(key.as_str())?.read_raw::<f32>()?;
        Ok(Some(data))
    }

    fn flush(&mut self) -> Result<()> {
        self.file.flush()?;
        Ok(())
    }
}
