//! Versioned binary snapshot format.
//!
//! # Format
//!
//! ```text
//! [MAGIC: 4 bytes] [VERSION: 4 bytes, little-endian] [POSTCARD PAYLOAD]
//! ```
//!
//! The header makes a snapshot self-identifying: a file written by another
//! tool, or by an incompatible release, is rejected before the payload is
//! touched.

use super::Encoding;
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;

/// Magic header identifying a cache snapshot.
pub const SNAPSHOT_MAGIC: [u8; 4] = *b"CVLT";

/// Current snapshot format version. Bump on any incompatible layout change.
pub const SNAPSHOT_VERSION: u32 = 1;

const HEADER_LEN: usize = SNAPSHOT_MAGIC.len() + std::mem::size_of::<u32>();

/// Compact binary encoding backed by `postcard`. This is the default
/// encoding of a cache.
#[derive(Clone, Copy, Debug, Default)]
pub struct BinaryEncoding;

impl BinaryEncoding {
    pub fn new() -> Self {
        BinaryEncoding
    }
}

impl<K, V> Encoding<K, V> for BinaryEncoding
where
    K: Serialize + DeserializeOwned + Eq + Hash,
    V: Serialize + DeserializeOwned,
{
    fn encode(&self, data: &HashMap<K, V>) -> Result<Vec<u8>> {
        let payload = postcard::to_allocvec(data)
            .map_err(|e| Error::SerializationError(format!("postcard encode failed: {}", e)))?;

        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
        bytes.extend_from_slice(&SNAPSHOT_MAGIC);
        bytes.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> Result<HashMap<K, V>> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::InvalidCacheEntry(format!(
                "snapshot is {} bytes, shorter than the {}-byte header",
                bytes.len(),
                HEADER_LEN
            )));
        }

        let (magic, rest) = bytes.split_at(SNAPSHOT_MAGIC.len());
        if magic != SNAPSHOT_MAGIC {
            return Err(Error::InvalidCacheEntry(format!(
                "bad magic header {:?}",
                magic
            )));
        }

        let (version, payload) = rest.split_at(std::mem::size_of::<u32>());
        let mut version_bytes = [0u8; 4];
        version_bytes.copy_from_slice(version);
        let found = u32::from_le_bytes(version_bytes);
        if found != SNAPSHOT_VERSION {
            return Err(Error::VersionMismatch {
                expected: SNAPSHOT_VERSION,
                found,
            });
        }

        postcard::from_bytes(payload)
            .map_err(|e| Error::DeserializationError(format!("postcard decode failed: {}", e)))
    }

    fn name(&self) -> &'static str {
        "binary"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HashMap<String, u64> {
        let mut map = HashMap::new();
        map.insert("alpha".to_string(), 1);
        map.insert("beta".to_string(), u64::MAX);
        map
    }

    fn codec() -> &'static dyn Encoding<String, u64> {
        &BinaryEncoding
    }

    #[test]
    fn test_header_layout() {
        let bytes = codec().encode(&sample()).expect("Failed to encode");
        assert_eq!(&bytes[..4], b"CVLT");
        assert_eq!(&bytes[4..8], &1u32.to_le_bytes());
    }

    #[test]
    fn test_round_trip() {
        let bytes = codec().encode(&sample()).expect("Failed to encode");
        let decoded = codec().decode(&bytes).expect("Failed to decode");
        assert_eq!(decoded, sample());
    }

    #[test]
    fn test_empty_map_round_trip() {
        let empty = HashMap::new();
        let bytes = codec().encode(&empty).expect("Failed to encode");
        assert_eq!(bytes.len(), HEADER_LEN + 1);
        assert!(codec().decode(&bytes).expect("Failed to decode").is_empty());
    }

    #[test]
    fn test_truncated_header() {
        let err = codec().decode(b"CVL").expect_err("Expected failure");
        assert!(matches!(err, Error::InvalidCacheEntry(_)));
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = codec().encode(&sample()).expect("Failed to encode");
        bytes[0] = b'X';
        let err = codec().decode(&bytes).expect_err("Expected failure");
        assert!(matches!(err, Error::InvalidCacheEntry(_)));
    }

    #[test]
    fn test_version_mismatch() {
        let mut bytes = codec().encode(&sample()).expect("Failed to encode");
        bytes[4..8].copy_from_slice(&9u32.to_le_bytes());
        let err = codec().decode(&bytes).expect_err("Expected failure");
        assert_eq!(
            err,
            Error::VersionMismatch {
                expected: 1,
                found: 9
            }
        );
    }

    #[test]
    fn test_corrupted_payload() {
        let mut bytes = SNAPSHOT_MAGIC.to_vec();
        bytes.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
        // Claims two entries, provides none.
        bytes.push(2);
        let err = codec().decode(&bytes).expect_err("Expected failure");
        assert!(matches!(err, Error::DeserializationError(_)));
    }
}
