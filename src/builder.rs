//! Cache configuration and fluent builder.

use crate::backend::PersistenceBackend;
use crate::cache::Cache;
use crate::encoding::Encoding;
use crate::error::Result;
use crate::observability::DiagnosticSink;
use crate::policy::FlushPolicy;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Explicit cache configuration.
///
/// Every field is optional; `None` falls back to the default:
///
/// | Field         | Default                                      |
/// |---------------|----------------------------------------------|
/// | `persistence` | [`DiscardBackend`](crate::backend::DiscardBackend) |
/// | `policy`      | [`FlushPolicy::Never`]                       |
/// | `encoding`    | [`BinaryEncoding`](crate::encoding::BinaryEncoding) |
/// | `sink`        | none                                         |
pub struct CacheConfig<K, V> {
    pub persistence: Option<Box<dyn PersistenceBackend>>,
    pub policy: Option<FlushPolicy>,
    pub encoding: Option<Box<dyn Encoding<K, V>>>,
    pub sink: Option<Arc<dyn DiagnosticSink>>,
}

impl<K, V> Default for CacheConfig<K, V> {
    fn default() -> Self {
        CacheConfig {
            persistence: None,
            policy: None,
            encoding: None,
            sink: None,
        }
    }
}

impl<K, V> CacheConfig<K, V> {
    /// Reject configurations that can never behave as intended.
    ///
    /// # Errors
    /// Returns `Error::ConfigError` for a batched policy of size zero.
    pub fn validate(&self) -> Result<()> {
        match &self.policy {
            Some(policy) => policy.validate(),
            None => Ok(()),
        }
    }
}

impl<K, V> fmt::Debug for CacheConfig<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field(
                "persistence",
                &self.persistence.as_ref().map(|p| p.name()),
            )
            .field("policy", &self.policy)
            .field("encoding", &self.encoding.as_ref().map(|e| e.name()))
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

/// Fluent builder for [`Cache`].
///
/// # Example
///
/// ```
/// use cache_vault::{Cache, FlushPolicy};
/// use cache_vault::backend::MemoryBackend;
/// use cache_vault::encoding::JsonEncoding;
///
/// let backend = MemoryBackend::new();
/// let cache: Cache<String, u32> = Cache::builder()
///     .with_persistence(backend.clone())
///     .with_policy(FlushPolicy::Always)
///     .with_encoding(JsonEncoding::compact())
///     .build()
///     .expect("valid configuration");
///
/// cache.put("visits".to_string(), 1);
/// assert_eq!(backend.snapshot(), Some(br#"{"visits":1}"#.to_vec()));
/// ```
pub struct CacheBuilder<K, V> {
    config: CacheConfig<K, V>,
}

impl<K, V> Default for CacheBuilder<K, V> {
    fn default() -> Self {
        CacheBuilder {
            config: CacheConfig::default(),
        }
    }
}

impl<K, V> CacheBuilder<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the persistence backend.
    pub fn with_persistence<B>(mut self, backend: B) -> Self
    where
        B: PersistenceBackend + 'static,
    {
        self.config.persistence = Some(Box::new(backend));
        self
    }

    /// Set the flush policy.
    pub fn with_policy(mut self, policy: FlushPolicy) -> Self {
        self.config.policy = Some(policy);
        self
    }

    /// Set the encoding strategy.
    pub fn with_encoding<E>(mut self, encoding: E) -> Self
    where
        E: Encoding<K, V> + 'static,
    {
        self.config.encoding = Some(Box::new(encoding));
        self
    }

    /// Attach a diagnostic sink.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.config.sink = Some(sink);
        self
    }

    /// Return the accumulated configuration without building.
    pub fn into_config(self) -> CacheConfig<K, V> {
        self.config
    }
}

impl<K, V> CacheBuilder<K, V>
where
    K: Serialize + DeserializeOwned + Eq + Hash + 'static,
    V: Serialize + DeserializeOwned + 'static,
{
    /// Validate the configuration and build the cache.
    ///
    /// # Errors
    /// Returns `Error::ConfigError` if the configuration is invalid.
    pub fn build(self) -> Result<Cache<K, V>> {
        Cache::new(self.config)
    }
}

impl<K, V> fmt::Debug for CacheBuilder<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheBuilder")
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::encoding::JsonEncoding;
    use crate::error::Error;
    use crate::observability::StatsSink;

    #[test]
    fn test_default_config_is_empty() {
        let config: CacheConfig<String, u32> = CacheConfig::default();
        assert!(config.persistence.is_none());
        assert!(config.policy.is_none());
        assert!(config.encoding.is_none());
        assert!(config.sink.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_collects_options() {
        let config: CacheConfig<String, u32> = CacheBuilder::new()
            .with_persistence(MemoryBackend::new())
            .with_policy(FlushPolicy::batched(2))
            .with_encoding(JsonEncoding::pretty())
            .with_sink(Arc::new(StatsSink::new()))
            .into_config();

        assert_eq!(config.persistence.as_ref().map(|p| p.name()), Some("memory"));
        assert_eq!(config.policy, Some(FlushPolicy::batched(2)));
        assert_eq!(
            config.encoding.as_ref().map(|e| e.name()),
            Some("json-pretty")
        );
        assert!(config.sink.is_some());
    }

    #[test]
    fn test_builder_rejects_zero_batch() {
        let result: Result<Cache<String, u32>> = CacheBuilder::new()
            .with_policy(FlushPolicy::batched(0))
            .build();
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_config_debug_names_components() {
        let config: CacheConfig<String, u32> = CacheBuilder::new()
            .with_persistence(MemoryBackend::new())
            .into_config();
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("Some(\"memory\")"));
        assert!(rendered.contains("has_sink: false"));
    }
}
