//! Core traits for Gram matrix precomputation

use crate::cache::StorageKey;
use crate::core::Result;

/// Hierarchical key to array persistence
///
/// Keys have the form `/<namespace>/<name>`. A namespace must be created
/// before anything is written under it, and a key can only be written once.
/// Implementations release their underlying resources on drop.
pub trait ResultStore {
    /// Create the group that will hold all keys of one dataset
    fn create_namespace(&mut self, name: &str) -> Result<()>;

    /// Check whether a namespace exists
    fn has_namespace(&self, name: &str) -> bool;

    /// Store one flat array under `key`
    fn write(&mut self, key: &StorageKey, data: &[f32]) -> Result<()>;

    /// Check whether `key` has been written
    fn contains(&self, key: &StorageKey) -> bool;

    /// Read back the array stored under `key`, if any
    fn read(&mut self, key: &StorageKey) -> Result<Option<Vec<f32>>>;

    /// Push buffered writes to durable storage
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: ResultStore + ?Sized> ResultStore for &mut S {
    fn create_namespace(&mut self, name: &str) -> Result<()> {
        (**self).create_namespace(name)
    }

    fn has_namespace(&self, name: &str) -> bool {
        (**self).has_namespace(name)
    }

    fn write(&mut self, key: &StorageKey, data: &[f32]) -> Result<()> {
        (**self).write(key, data)
    }

    fn contains(&self, key: &StorageKey) -> bool {
        (**self).contains(key)
    }

    fn read(&mut self, key: &StorageKey) -> Result<Option<Vec<f32>>> {
        (**self).read(key)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

impl<S: ResultStore + ?Sized> ResultStore for Box<S> {
    fn create_namespace(&mut self, name: &str) -> Result<()> {
        (**self).create_namespace(name)
    }

    fn has_namespace(&self, name: &str) -> bool {
        (**self).has_namespace(name)
    }

    fn write(&mut self, key: &StorageKey, data: &[f32]) -> Result<()> {
        (**self).write(key, data)
    }

    fn contains(&self, key: &StorageKey) -> bool {
        (**self).contains(key)
    }

    fn read(&mut self, key: &StorageKey) -> Result<Option<Vec<f32>>> {
        (**self).read(key)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}
