//! Content fingerprint of a feature matrix

use crate::core::FeatureMatrix;
use std::fmt;

/// Bytes hashed per call into the digest context
const CHUNK_BYTES: usize = 64 * 1024;

/// 128-bit MD5 digest of the raw matrix values
///
/// The digest covers every `f32` as little-endian bytes, in column-major
/// order, without padding. Equal matrices always share a fingerprint, and
/// the fingerprint is the namespace of every key derived from the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataFingerprint([u8; 16]);

impl DataFingerprint {
    /// Fingerprint the contents of `x`
    pub fn of(x: &FeatureMatrix) -> Self {
        let mut context = md5::Context::new();
        let mut buffer = Vec::with_capacity(CHUNK_BYTES);
        for value in x.iter_column_major() {
            buffer.extend_from_slice(&value.to_le_bytes());
            if buffer.len() >= CHUNK_BYTES {
                context.consume(&buffer);
                buffer.clear();
            }
        }
        context.consume(&buffer);
        Self(context.compute().0)
    }

    /// Fingerprint an arbitrary byte string
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(md5::compute(bytes).0)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// 32 lowercase hex characters
    pub fn to_hex(&self) -> String {
        format!("{:x}", md5::Digest(self.0))
    }
}

impl fmt::Display for DataFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", md5::Digest(self.0))
    }
}
