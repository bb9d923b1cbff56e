//! Content-addressed Gram matrix cache
//!
//! Gram matrices are addressed by the fingerprint of the input data plus the
//! kernel parameters (see [`StorageKey`]). [`GramCache`] keeps recently used
//! full matrices in an LRU cache in front of a [`ResultStore`], which only
//! holds upper triangles.

pub mod fingerprint;
pub mod key;

pub use self::fingerprint::*;
pub use self::key::*;

use crate::core::{FeatureMatrix, GramMatrix, KernelSpec, Result, ResultStore, TriangularVector};
use crate::kernel::kernel_for;
use log::debug;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Read-through cache of full Gram matrices
///
/// A lookup checks the in-memory LRU first, then the store. On a miss in
/// both, the triangle is computed, written to the store and expanded.
pub struct GramCache<S: ResultStore> {
    store: S,
    cache: LruCache<StorageKey, Arc<GramMatrix>>,
    hits: u64,
    misses: u64,
    loads: u64,
}

impl<S: ResultStore> GramCache<S> {
    /// Create a cache holding up to `capacity` full matrices
    pub fn new(store: S, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            store,
            cache: LruCache::new(capacity),
            hits: 0,
            misses: 0,
            loads: 0,
        }
    }

    /// Full Gram matrix of `x` under `spec`
    pub fn get_gram(&mut self, x: &FeatureMatrix, spec: &KernelSpec) -> Result<Arc<GramMatrix>> {
        let fingerprint = DataFingerprint::of(x);
        self.get_gram_with_fingerprint(x, &fingerprint, spec)
    }

    /// Like [`GramCache::get_gram`] with the fingerprint of `x` already known
    pub fn get_gram_with_fingerprint(
        &mut self,
        x: &FeatureMatrix,
        fingerprint: &DataFingerprint,
        spec: &KernelSpec,
    ) -> Result<Arc<GramMatrix>> {
        let key = StorageKey::build(fingerprint, spec);
        if let Some(gram) = self.cache.get(&key) {
            self.hits += 1;
            return Ok(Arc::clone(gram));
        }
        self.misses += 1;

        let upper = match self.store.read(&key)? {
            Some(values) => {
                debug!("Loaded {key} from store");
                self.loads += 1;
                TriangularVector::new(x.n_samples(), values)?
            }
            None => {
                debug!("Computing {key}");
                let upper = kernel_for(spec)?.upper(x)?;
                if !self.store.has_namespace(key.namespace()) {
                    self.store.create_namespace(key.namespace())?;
                }
                self.store.write(&key, upper.as_slice())?;
                upper
            }
        };

        let gram = Arc::new(GramMatrix::from_upper(&upper));
        self.cache.put(key, Arc::clone(&gram));
        Ok(gram)
    }

    /// Get cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            loads: self.loads,
            capacity: self.cache.cap().get(),
            size: self.cache.len(),
        }
    }

    /// Drop all cached matrices; the store is untouched
    pub fn clear(&mut self) {
        self.cache.clear();
        self.hits = 0;
        self.misses = 0;
        self.loads = 0;
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give back the underlying store
    pub fn into_inner(self) -> S {
        self.store
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Misses answered by the store without recomputing
    pub loads: u64,
    pub capacity: usize,
    pub size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn two_samples() -> FeatureMatrix {
        FeatureMatrix::new(2, 2, vec![0.0, 0.0, 1.0, 1.0]).unwrap()
    }

    #[test]
    fn test_gram_cache_computes_and_stores() {
        let x = two_samples();
        let mut cache = GramCache::new(MemoryStore::new(), 4);

        let gram = cache.get_gram(&x, &KernelSpec::Linear).unwrap();
        assert_eq!(gram.get(0, 1), 2.0);
        assert_eq!(gram.get(1, 0), 2.0);

        let key = StorageKey::build(&DataFingerprint::of(&x), &KernelSpec::Linear);
        assert_eq!(cache.store().get(&key), Some(&[0.0f32, 2.0, 0.0][..]));
        assert_eq!(cache.stats().misses, 1);
        assert_eq!(cache.stats().loads, 0);
    }

    #[test]
    fn test_gram_cache_hits() {
        let x = two_samples();
        let spec = KernelSpec::Rbf { gamma: 0.5 };
        let mut cache = GramCache::new(MemoryStore::new(), 4);

        let first = cache.get_gram(&x, &spec).unwrap();
        let second = cache.get_gram(&x, &spec).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.hit_rate(), 0.5);
    }

    #[test]
    fn test_gram_cache_loads_from_store() {
        let x = two_samples();
        let mut cache = GramCache::new(MemoryStore::new(), 4);
        cache.get_gram(&x, &KernelSpec::Linear).unwrap();

        // A fresh cache over the same store finds the stored triangle
        let mut cache = GramCache::new(cache.into_inner(), 4);
        let gram = cache.get_gram(&x, &KernelSpec::Linear).unwrap();

        assert_eq!(gram.get(0, 1), 2.0);
        assert_eq!(cache.stats().loads, 1);
        assert_eq!(cache.store().len(), 1);
    }

    #[test]
    fn test_gram_cache_lru_eviction() {
        let x = two_samples();
        let mut cache = GramCache::new(MemoryStore::new(), 1);

        cache.get_gram(&x, &KernelSpec::Linear).unwrap();
        cache.get_gram(&x, &KernelSpec::Rbf { gamma: 1.0 }).unwrap();
        // Evicted from memory, reloaded from the store
        cache.get_gram(&x, &KernelSpec::Linear).unwrap();

        let stats = cache.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 3);
        assert_eq!(stats.loads, 1);
        assert_eq!(stats.size, 1);
        assert_eq!(cache.store().len(), 2);
    }

    #[test]
    fn test_gram_cache_rejects_mismatched_store_entry() {
        let x = two_samples();
        let fingerprint = DataFingerprint::of(&x);
        let key = StorageKey::build(&fingerprint, &KernelSpec::Linear);

        let mut store = MemoryStore::new();
        store.create_namespace(key.namespace()).unwrap();
        store.write(&key, &[1.0]).unwrap();

        let mut cache = GramCache::new(store, 2);
        assert!(cache.get_gram(&x, &KernelSpec::Linear).is_err());
    }

    #[test]
    fn test_gram_cache_clear() {
        let x = two_samples();
        let mut cache = GramCache::new(MemoryStore::new(), 0);
        assert_eq!(cache.stats().capacity, 1);

        cache.get_gram(&x, &KernelSpec::Linear).unwrap();
        cache.clear();

        assert_eq!(cache.stats().size, 0);
        assert_eq!(cache.stats().misses, 0);
        assert_eq!(cache.store().len(), 1);
    }
}
