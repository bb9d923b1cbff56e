//! Precomputation of kernel Gram matrices
//!
//! Given a feature matrix, computes the squared-distance ("linear") matrix
//! and a log-spaced sweep of RBF Gram matrices, and stores their upper
//! triangles in a container addressed by the MD5 fingerprint of the data.

pub mod api;
pub mod cache;
pub mod core;
pub mod data;
pub mod kernel;
pub mod linalg;
pub mod store;
pub mod sweep;

// Re-export main types for convenience
pub use crate::api::{GramPrecompute, PrecomputeSummary};
pub use crate::cache::{CacheStats, DataFingerprint, GramCache, StorageKey};
pub use crate::core::error::{GramError, Result};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::kernel::{Kernel, LinearKernel, RBFKernel};
pub use crate::store::{open_store, JsonlStore, MemoryStore};
pub use crate::sweep::logrange;

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
