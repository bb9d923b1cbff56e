//! In-memory result store

use crate::cache::StorageKey;
use crate::core::{GramError, Result, ResultStore};
use crate::store::ensure_writable;
use std::collections::{BTreeMap, BTreeSet};

/// Result store kept entirely in memory
///
/// Keys iterate in lexicographic order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    namespaces: BTreeSet<String>,
    datasets: BTreeMap<StorageKey, Vec<f32>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored array for `key`
    pub fn get(&self, key: &StorageKey) -> Option<&[f32]> {
        self.datasets.get(key).map(Vec::as_slice)
    }

    /// All stored keys
    pub fn keys(&self) -> impl Iterator<Item = &StorageKey> + '_ {
        self.datasets.keys()
    }

    /// All created namespaces
    pub fn namespaces(&self) -> impl Iterator<Item = &str> + '_ {
        self.namespaces.iter().map(String::as_str)
    }

    /// Number of stored arrays
    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

impl ResultStore for MemoryStore {
    fn create_namespace(&mut self, name: &str) -> Result<()> {
        if !self.namespaces.insert(name.to_string()) {
            return Err(GramError::Storage(format!(
                "namespace {name} already exists"
            )));
        }
        Ok(())
    }

    fn has_namespace(&self, name: &str) -> bool {
        self.namespaces.contains(name)
    }

    fn write(&mut self, key: &StorageKey, data: &[f32]) -> Result<()> {
        ensure_writable(&*self, key)?;
        self.datasets.insert(key.clone(), data.to_vec());
        Ok(())
    }

    fn contains(&self, key: &StorageKey) -> bool {
        self.datasets.contains_key(key)
    }

    fn read(&mut self, key: &StorageKey) -> Result<Option<Vec<f32>>> {
        Ok(self.datasets.get(key).cloned())
    }
}
