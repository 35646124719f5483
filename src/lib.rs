//! # cache-vault
//!
//! A generic, thread-safe, in-process key-value cache with pluggable snapshot
//! persistence.
//!
//! ## Features
//!
//! - **Generic:** Any `K: Eq + Hash` key and any value type
//! - **Pluggable Persistence:** File, console, in-memory or discard backends
//! - **Pluggable Encoding:** Versioned binary (postcard), JSON, YAML, TOML
//! - **Flush Policies:** Persist on every mutation, every N mutations, or only on demand
//! - **Whole-Snapshot Durability:** Every flush writes the complete mapping
//! - **Observability:** `log` integration and an injectable diagnostic sink
//!
//! ## Quick Start
//!
//! ```no_run
//! use cache_vault::{Cache, FlushPolicy};
//! use cache_vault::backend::FileBackend;
//! use cache_vault::encoding::JsonEncoding;
//!
//! let cache: Cache<String, u64> = Cache::builder()
//!     .with_persistence(FileBackend::new("counters.json"))
//!     .with_encoding(JsonEncoding::pretty())
//!     .with_policy(FlushPolicy::batched(10))
//!     .build()?;
//!
//! // Restore the previous run. A missing file just means a cold start.
//! if let Err(e) = cache.load() {
//!     eprintln!("starting empty: {}", e);
//! }
//!
//! cache.put("requests".to_string(), 0);
//! cache.replace("requests".to_string(), 1);
//!
//! // Persist on shutdown, surfacing any error.
//! cache.store()?;
//! # Ok::<(), cache_vault::Error>(())
//! ```

#[macro_use]
extern crate log;

pub mod backend;
pub mod builder;
pub mod cache;
pub mod encoding;
pub mod error;
pub mod observability;
pub mod policy;

// Re-exports for convenience
pub use backend::PersistenceBackend;
pub use builder::{CacheBuilder, CacheConfig};
pub use cache::Cache;
pub use encoding::Encoding;
pub use error::{Error, Result};
pub use observability::DiagnosticSink;
pub use policy::FlushPolicy;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
