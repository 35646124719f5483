//! Flush policies deciding when a mutation is persisted.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Decides, once per mutating cache operation, whether the whole cache
/// should be flushed to its persistence backend right now.
///
/// The policy has no visibility into whether the mutation changed anything:
/// deleting an absent key still counts as a mutation.
///
/// # Example
///
/// ```
/// use cache_vault::FlushPolicy;
///
/// let mut policy = FlushPolicy::batched(2);
/// assert!(!policy.trigger());
/// assert!(policy.trigger());
/// assert!(!policy.trigger());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FlushPolicy {
    /// Flush on every mutation.
    Always,

    /// Never flush implicitly; only explicit `store()` calls persist.
    #[default]
    Never,

    /// Flush on every `size`-th mutation.
    Batched {
        /// Number of mutations per flush.
        size: usize,
        /// Mutations seen since the last flush.
        count: usize,
    },
}

impl FlushPolicy {
    /// Create a batched policy flushing every `size` mutations.
    pub fn batched(size: usize) -> Self {
        FlushPolicy::Batched { size, count: 0 }
    }

    /// Record one mutation and report whether a flush is due.
    pub fn trigger(&mut self) -> bool {
        match self {
            FlushPolicy::Always => true,
            FlushPolicy::Never => false,
            FlushPolicy::Batched { size, count } => {
                *count += 1;
                if *count == *size {
                    *count = 0;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Check that the policy can ever trigger as configured.
    pub fn validate(&self) -> Result<()> {
        match self {
            FlushPolicy::Batched { size: 0, .. } => Err(Error::ConfigError(
                "batched flush policy requires a size of at least 1".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for FlushPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlushPolicy::Always => write!(f, "always"),
            FlushPolicy::Never => write!(f, "never"),
            FlushPolicy::Batched { size, .. } => write!(f, "batched:{}", size),
        }
    }
}

/// Parses `always`, `never` or `batched:N` (case-insensitive).
impl FromStr for FlushPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "always" => Ok(FlushPolicy::Always),
            "never" => Ok(FlushPolicy::Never),
            other => {
                let size = other
                    .strip_prefix("batched:")
                    .ok_or_else(|| Error::ConfigError(format!("Unknown flush policy: {}", s)))?;
                let size = size.trim().parse::<usize>().map_err(|e| {
                    Error::ConfigError(format!("Invalid batch size in '{}': {}", s, e))
                })?;
                let policy = FlushPolicy::batched(size);
                policy.validate()?;
                Ok(policy)
            }
        }
    }
}
