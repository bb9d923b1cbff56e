//! Result store implementations
//!
//! - [`MemoryStore`]: in-process map, used by tests and the Gram cache
//! - [`JsonlStore`]: JSON Lines container file
//! - `Hdf5Store`: HDF5 container file (cargo feature `hdf5`)

#[cfg(feature = "hdf5")]
pub mod hdf5;
pub mod jsonl;
pub mod memory;

#[cfg(feature = "hdf5")]
pub use self::hdf5::Hdf5Store;
pub use self::jsonl::JsonlStore;
pub use self::memory::MemoryStore;

use crate::cache::StorageKey;
use crate::core::{GramError, Result, ResultStore};
use log::warn;
use std::path::Path;

/// Default output container name
#[cfg(feature = "hdf5")]
pub const DEFAULT_OUTPUT: &str = "gram.h5";
/// Default output container name
#[cfg(not(feature = "hdf5"))]
pub const DEFAULT_OUTPUT: &str = "gram.jsonl";

/// On-disk container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFormat {
    Jsonl,
    Hdf5,
}

impl StoreFormat {
    /// Pick the container format from the file extension
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("h5") | Some("hdf5") => StoreFormat::Hdf5,
            Some("jsonl") | Some("json") => StoreFormat::Jsonl,
            _ => {
                warn!("Unknown output extension for {path:?}, writing JSON Lines");
                StoreFormat::Jsonl
            }
        }
    }
}

/// Open the container at `path` in the format matching its extension
///
/// With `truncate` any existing file is replaced, otherwise new keys are
/// appended to it.
pub fn open_store(path: &Path, truncate: bool) -> Result<Box<dyn ResultStore>> {
    match StoreFormat::detect(path) {
        StoreFormat::Jsonl => Ok(Box::new(JsonlStore::open(path, truncate)?)),
        #[cfg(feature = "hdf5")]
        StoreFormat::Hdf5 => Ok(Box::new(Hdf5Store::open(path, truncate)?)),
        #[cfg(not(feature = "hdf5"))]
        StoreFormat::Hdf5 => Err(GramError::Storage(format!(
            "cannot write {path:?}: built without HDF5 support (enable the `hdf5` feature)"
        ))),
    }
}

/// Check that `key` can be written: its namespace exists and it is new
pub(crate) fn ensure_writable<S: ResultStore + ?Sized>(store: &S, key: &StorageKey) -> Result<()> {
    if !store.has_namespace(key.namespace()) {
        return Err(GramError::Storage(format!(
            "namespace {} does not exist",
            key.namespace()
        )));
    }
    if store.contains(key) {
        return Err(GramError::Storage(format!("{key} already exists")));
    }
    Ok(())
}
