//! Structured-text encodings: JSON, YAML and TOML.

use super::Encoding;
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;

/// JSON encoding backed by `serde_json`.
///
/// Non-string keys are written as JSON strings and parsed back, so integer
/// keys survive a round trip.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonEncoding {
    /// Indent output for human consumption.
    pub pretty: bool,
}

impl JsonEncoding {
    pub fn compact() -> Self {
        JsonEncoding { pretty: false }
    }

    pub fn pretty() -> Self {
        JsonEncoding { pretty: true }
    }
}

impl<K, V> Encoding<K, V> for JsonEncoding
where
    K: Serialize + DeserializeOwned + Eq + Hash,
    V: Serialize + DeserializeOwned,
{
    fn encode(&self, data: &HashMap<K, V>) -> Result<Vec<u8>> {
        let encoded = if self.pretty {
            serde_json::to_vec_pretty(data)
        } else {
            serde_json::to_vec(data)
        };
        encoded.map_err(|e| Error::SerializationError(format!("JSON encode failed: {}", e)))
    }

    fn decode(&self, bytes: &[u8]) -> Result<HashMap<K, V>> {
        serde_json::from_slice(bytes)
            .map_err(|e| Error::DeserializationError(format!("JSON decode failed: {}", e)))
    }

    fn name(&self) -> &'static str {
        if self.pretty {
            "json-pretty"
        } else {
            "json"
        }
    }
}

/// YAML encoding backed by `serde_yaml`.
#[cfg(feature = "yaml")]
#[derive(Clone, Copy, Debug, Default)]
pub struct YamlEncoding;

#[cfg(feature = "yaml")]
impl<K, V> Encoding<K, V> for YamlEncoding
where
    K: Serialize + DeserializeOwned + Eq + Hash,
    V: Serialize + DeserializeOwned,
{
    fn encode(&self, data: &HashMap<K, V>) -> Result<Vec<u8>> {
        serde_yaml::to_string(data)
            .map(String::into_bytes)
            .map_err(|e| Error::SerializationError(format!("YAML encode failed: {}", e)))
    }

    fn decode(&self, bytes: &[u8]) -> Result<HashMap<K, V>> {
        serde_yaml::from_slice(bytes)
            .map_err(|e| Error::DeserializationError(format!("YAML decode failed: {}", e)))
    }

    fn name(&self) -> &'static str {
        "yaml"
    }
}

/// TOML encoding backed by the `toml` crate.
///
/// TOML tables only admit string keys; encoding a mapping whose keys
/// serialize as anything else fails with `Error::SerializationError`.
#[cfg(feature = "toml")]
#[derive(Clone, Copy, Debug, Default)]
pub struct TomlEncoding {
    pub pretty: bool,
}

#[cfg(feature = "toml")]
impl<K, V> Encoding<K, V> for TomlEncoding
where
    K: Serialize + DeserializeOwned + Eq + Hash,
    V: Serialize + DeserializeOwned,
{
    fn encode(&self, data: &HashMap<K, V>) -> Result<Vec<u8>> {
        let encoded = if self.pretty {
            toml::to_string_pretty(data)
        } else {
            toml::to_string(data)
        };
        encoded
            .map(String::into_bytes)
            .map_err(|e| Error::SerializationError(format!("TOML encode failed: {}", e)))
    }

    fn decode(&self, bytes: &[u8]) -> Result<HashMap<K, V>> {
        let text = std::str::from_utf8(bytes).map_err(|e| {
            Error::DeserializationError(format!("TOML snapshot is not UTF-8: {}", e))
        })?;
        toml::from_str(text)
            .map_err(|e| Error::DeserializationError(format!("TOML decode failed: {}", e)))
    }

    fn name(&self) -> &'static str {
        "toml"
    }
}
