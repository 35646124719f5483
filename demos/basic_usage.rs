//! Basic usage of the cache with file persistence.

use cache_vault::backend::FileBackend;
use cache_vault::encoding::JsonEncoding;
use cache_vault::observability::StatsSink;
use cache_vault::{Cache, FlushPolicy, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Example value: a user profile
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
struct Profile {
    name: String,
    email: String,
    logins: u32,
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let path = std::env::temp_dir().join("cache-vault-demo.json");
    let stats = Arc::new(StatsSink::new());

    println!("=== Writing profiles (flush every 2 mutations) ===");
    let cache: Cache<String, Profile> = Cache::builder()
        .with_persistence(FileBackend::new(&path))
        .with_encoding(JsonEncoding::pretty())
        .with_policy(FlushPolicy::batched(2))
        .with_sink(stats.clone())
        .build()?;

    cache.put(
        "u1".to_string(),
        Profile {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            logins: 1,
        },
    );
    cache.put(
        "u2".to_string(),
        Profile {
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            logins: 4,
        },
    );

    // Existing keys are never overwritten by put...
    let inserted = cache.put(
        "u1".to_string(),
        Profile {
            name: "Impostor".to_string(),
            email: "nobody@example.com".to_string(),
            logins: 0,
        },
    );
    println!("  put over existing key inserted: {}", inserted);

    // ...but replace does.
    if let Some(mut profile) = cache.get("u1") {
        profile.logins += 1;
        let previous = cache.replace("u1".to_string(), profile);
        println!("  replaced u1, previous logins: {:?}", previous.map(|p| p.logins));
    }

    cache.store()?;
    println!("  snapshot written to {}", path.display());
    println!("  flush stats: {:?}", stats.snapshot());

    println!("\n=== Restoring into a fresh cache ===");
    let restored: Cache<String, Profile> = Cache::builder()
        .with_persistence(FileBackend::new(&path))
        .with_encoding(JsonEncoding::pretty())
        .build()?;
    restored.load()?;

    let mut keys = restored.keys();
    keys.sort();
    for key in keys {
        println!("  {} -> {:?}", key, restored.get(&key));
    }
    assert_eq!(restored.get("u1"), cache.get("u1"));

    Ok(())
}
