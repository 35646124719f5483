//! Encoding strategies turning the whole cache mapping into bytes and back.
//!
//! Every strategy works on the complete mapping: a flush always serializes
//! a full snapshot, never a delta.
//!
//! | Strategy          | Crate        | Notes                                |
//! |-------------------|--------------|--------------------------------------|
//! | [`BinaryEncoding`] | `postcard`   | Default. Versioned envelope.         |
//! | [`JsonEncoding`]   | `serde_json` | Compact or pretty.                   |
//! | [`YamlEncoding`]   | `serde_yaml` | Feature `yaml`.                      |
//! | [`TomlEncoding`]   | `toml`       | Feature `toml`. String keys only.    |

use crate::error::Result;
use std::collections::HashMap;

mod binary;
mod text;

pub use binary::{BinaryEncoding, SNAPSHOT_MAGIC, SNAPSHOT_VERSION};
pub use text::JsonEncoding;
#[cfg(feature = "toml")]
pub use text::TomlEncoding;
#[cfg(feature = "yaml")]
pub use text::YamlEncoding;

/// Converts a full key-value mapping to and from a byte sequence.
///
/// Implementations must be safe to call from several threads at once:
/// `Cache::store` encodes under a shared lock, so two explicit flushes may
/// run concurrently. Each call should allocate its own output buffer.
pub trait Encoding<K, V>: Send + Sync {
    /// Serialize the entire mapping.
    ///
    /// # Errors
    /// Returns `Error::SerializationError` if the mapping cannot be
    /// represented in the target format.
    fn encode(&self, data: &HashMap<K, V>) -> Result<Vec<u8>>;

    /// Rebuild a full mapping from bytes produced by [`Encoding::encode`].
    ///
    /// # Errors
    /// Returns `Error::DeserializationError` on malformed input, or an
    /// envelope error (`InvalidCacheEntry`, `VersionMismatch`) for formats
    /// that carry one.
    fn decode(&self, bytes: &[u8]) -> Result<HashMap<K, V>>;

    /// Short human-readable format name, used in log lines.
    fn name(&self) -> &'static str;
}
