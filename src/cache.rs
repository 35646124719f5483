//! Cache core: the in-memory mapping and its flush orchestration.

use crate::backend::{DiscardBackend, PersistenceBackend};
use crate::builder::{CacheBuilder, CacheConfig};
use crate::encoding::{BinaryEncoding, Encoding};
use crate::error::Result;
use crate::observability::{DiagnosticSink, FlushReason};
use crate::policy::FlushPolicy;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Instant;

/// State guarded by the cache lock. The policy lives next to the mapping so
/// that advancing it is ordered with the mutation it accounts for.
struct CacheState<K, V> {
    store: HashMap<K, V>,
    policy: FlushPolicy,
}

/// Thread-safe key-value cache with pluggable snapshot persistence.
///
/// Reads (`get`, `len`, `keys`, ...) take a shared lock; mutations (`put`,
/// `replace`, `delete`, `clear`, `load`) take the exclusive lock. After every
/// mutation the [`FlushPolicy`] is consulted, and when it fires the whole
/// mapping is encoded and written to the backend while the exclusive lock is
/// still held.
///
/// Flush failures during a mutation are logged and reported to the
/// [`DiagnosticSink`] but never fail the mutation itself: the in-memory state
/// is authoritative. Call [`Cache::store`] to persist with error reporting.
///
/// # Example
///
/// ```
/// use cache_vault::Cache;
///
/// let cache: Cache<String, u64> = Cache::default();
/// assert!(cache.put("a".to_string(), 1));
/// assert!(!cache.put("a".to_string(), 2));
/// assert_eq!(cache.get("a"), Some(1));
/// assert_eq!(cache.replace("a".to_string(), 3), Some(1));
/// assert_eq!(cache.delete("a"), Some(3));
/// assert!(cache.is_empty());
/// ```
pub struct Cache<K, V> {
    state: RwLock<CacheState<K, V>>,
    persistence: Box<dyn PersistenceBackend>,
    encoding: Box<dyn Encoding<K, V>>,
    sink: Option<Arc<dyn DiagnosticSink>>,
}

impl<K, V> Cache<K, V>
where
    K: Serialize + DeserializeOwned + Eq + Hash + 'static,
    V: Serialize + DeserializeOwned + 'static,
{
    /// Create a cache from an explicit configuration, filling in defaults
    /// for omitted fields.
    ///
    /// # Errors
    /// Returns `Error::ConfigError` if the configuration is invalid.
    pub fn new(config: CacheConfig<K, V>) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(config))
    }

    fn assemble(config: CacheConfig<K, V>) -> Self {
        let cache = Cache {
            state: RwLock::new(CacheState {
                store: HashMap::new(),
                policy: config.policy.unwrap_or_default(),
            }),
            persistence: config
                .persistence
                .unwrap_or_else(|| Box::new(DiscardBackend) as Box<dyn PersistenceBackend>),
            encoding: config
                .encoding
                .unwrap_or_else(|| Box::new(BinaryEncoding) as Box<dyn Encoding<K, V>>),
            sink: config.sink,
        };

        info!(
            "✓ Cache initialized (backend: {}, encoding: {}, policy: {})",
            cache.persistence.name(),
            cache.encoding.name(),
            cache.state.read().policy
        );
        cache
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Serialize + DeserializeOwned + Eq + Hash + 'static,
    V: Serialize + DeserializeOwned + 'static,
{
    /// Discard backend, never-flush policy, binary encoding, no sink.
    fn default() -> Self {
        Self::assemble(CacheConfig::default())
    }
}

impl<K, V> Cache<K, V> {
    /// Start a fluent [`CacheBuilder`].
    pub fn builder() -> CacheBuilder<K, V> {
        CacheBuilder::new()
    }
}

impl<K: Eq + Hash, V> Cache<K, V> {
    /// Insert `value` under `key` only if the key is absent.
    ///
    /// Returns `true` if the value was inserted. An existing value is never
    /// overwritten, and only an actual insertion counts as a mutation for
    /// the flush policy.
    pub fn put(&self, key: K, value: V) -> bool {
        let mut state = self.state.write();
        if state.store.contains_key(&key) {
            debug!("PUT skipped, key already present");
            return false;
        }
        state.store.insert(key, value);
        self.flush_on_mutation(&mut state);
        true
    }

    /// Insert or overwrite `value` under `key`, returning the previous value.
    pub fn replace(&self, key: K, value: V) -> Option<V> {
        let mut state = self.state.write();
        let previous = state.store.insert(key, value);
        self.flush_on_mutation(&mut state);
        debug!("REPLACE (previous present: {})", previous.is_some());
        previous
    }

    /// Remove `key`, returning its value if it was present.
    ///
    /// The flush policy advances even when the key was absent.
    pub fn delete<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut state = self.state.write();
        let removed = state.store.remove(key);
        // Counts as a mutation even when nothing was removed.
        self.flush_on_mutation(&mut state);
        debug!("DELETE (present: {})", removed.is_some());
        removed
    }

    /// Remove every entry.
    pub fn clear(&self) {
        let mut state = self.state.write();
        let dropped = state.store.len();
        state.store.clear();
        self.flush_on_mutation(&mut state);
        debug!("CLEAR ({} entries dropped)", dropped);
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.state.read().store.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.state.read().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().store.is_empty()
    }

    /// Persist the whole mapping now, regardless of the flush policy.
    ///
    /// Runs under the shared lock: concurrent readers proceed, writers wait.
    /// The policy counter is left untouched.
    ///
    /// # Errors
    /// - `Error::SerializationError`: the mapping cannot be encoded
    /// - `Error::IoError`: the backend write failed
    pub fn store(&self) -> Result<()> {
        debug!("» Persisting cache");
        let state = self.state.read();
        self.flush_locked(&state.store, FlushReason::Explicit)
    }

    /// Replace the whole mapping with the snapshot held by the backend.
    ///
    /// The current contents are discarded, not merged. On failure the
    /// mapping is left unchanged. Loading does not advance the flush policy.
    ///
    /// # Errors
    /// - `Error::IoError` / `Error::UnsupportedOperation`: the backend has
    ///   no readable snapshot
    /// - `Error::DeserializationError`, `Error::InvalidCacheEntry`,
    ///   `Error::VersionMismatch`: the snapshot cannot be decoded
    pub fn load(&self) -> Result<()> {
        debug!("» Loading cache from {} backend", self.persistence.name());
        let timer = Instant::now();
        let mut state = self.state.write();

        let loaded = self
            .persistence
            .read()
            .and_then(|bytes| self.encoding.decode(&bytes));

        match loaded {
            Ok(store) => {
                let entries = store.len();
                state.store = store;
                if let Some(sink) = &self.sink {
                    sink.record_load(entries, timer.elapsed());
                }
                info!(
                    "✓ Cache loaded {} entries in {:?}",
                    entries,
                    timer.elapsed()
                );
                Ok(())
            }
            Err(e) => {
                error!("✗ Cache load failed: {}", e);
                if let Some(sink) = &self.sink {
                    sink.record_load_error(&e);
                }
                Err(e)
            }
        }
    }

    /// Consult the policy after a mutation; caller holds the exclusive lock.
    fn flush_on_mutation(&self, state: &mut CacheState<K, V>) {
        if !state.policy.trigger() {
            return;
        }
        if let Err(e) = self.flush_locked(&state.store, FlushReason::Policy) {
            warn!("⚠ Policy flush failed, in-memory state kept: {}", e);
        }
    }

    /// Encode and write `store`. Caller holds at least the shared lock.
    fn flush_locked(&self, store: &HashMap<K, V>, reason: FlushReason) -> Result<()> {
        let timer = Instant::now();
        let written = self.encoding.encode(store).and_then(|bytes| {
            self.persistence.write(&bytes)?;
            Ok(bytes.len())
        });

        match written {
            Ok(bytes) => {
                if let Some(sink) = &self.sink {
                    sink.record_flush(reason, store.len(), bytes, timer.elapsed());
                }
                debug!(
                    "✓ Flushed {} entries ({} bytes, {:?}) to {} backend",
                    store.len(),
                    bytes,
                    reason,
                    self.persistence.name()
                );
                Ok(())
            }
            Err(e) => {
                error!(
                    "✗ Flush to {} backend failed ({:?}): {}",
                    self.persistence.name(),
                    reason,
                    e
                );
                if let Some(sink) = &self.sink {
                    sink.record_flush_error(reason, &e);
                }
                Err(e)
            }
        }
    }
}

impl<K: Eq + Hash + Clone, V> Cache<K, V> {
    /// Snapshot of the current keys, in no particular order.
    pub fn keys(&self) -> Vec<K> {
        self.state.read().store.keys().cloned().collect()
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Cache<K, V> {
    /// Clone of the value stored under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.state.read().store.get(key).cloned()
    }

    /// Snapshot of all entries taken under a single shared lock.
    pub fn entries(&self) -> Vec<(K, V)> {
        self.state
            .read()
            .store
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Copy every entry of `other` into this cache with [`Cache::put`]
    /// semantics: keys already present here keep their current value.
    ///
    /// `other` is snapshotted first and its lock released before any entry is
    /// inserted, so the two caches are never locked at the same time. Each
    /// insertion counts as a mutation for this cache's flush policy.
    /// Merging a cache into itself inserts nothing and succeeds.
    pub fn merge(&self, other: &Cache<K, V>) -> Result<()> {
        let incoming = other.entries();
        let offered = incoming.len();
        let inserted = incoming
            .into_iter()
            .map(|(k, v)| self.put(k, v))
            .filter(|inserted| *inserted)
            .count();

        debug!(
            "✓ Merged {} of {} entries from source cache",
            inserted, offered
        );
        Ok(())
    }

    /// Pull every entry of `other` into this cache. Same semantics as
    /// [`Cache::merge`].
    pub fn pull(&self, other: &Cache<K, V>) -> Result<()> {
        self.merge(other)
    }
}

impl<K, V> fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("Cache")
            .field("len", &state.store.len())
            .field("policy", &state.policy)
            .field("persistence", &self.persistence.name())
            .field("encoding", &self.encoding.name())
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}
