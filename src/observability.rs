//! Diagnostic hooks for flushes, loads and persistence failures.
//!
//! A cache holds an optional `Arc<dyn DiagnosticSink>`. Failures of flushes
//! triggered implicitly by a mutation are never returned to the caller; the
//! sink is the only place they surface besides the `log` output.

use crate::error::Error;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// What caused a flush.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlushReason {
    /// The flush policy fired after a mutation.
    Policy,
    /// The caller asked for it via `Cache::store`.
    Explicit,
}

/// Receives diagnostic events from a cache.
///
/// All methods default to no-ops so implementors only override what they
/// care about.
pub trait DiagnosticSink: Send + Sync {
    /// A snapshot of `entries` keys (`bytes` long) was persisted.
    fn record_flush(
        &self,
        _reason: FlushReason,
        _entries: usize,
        _bytes: usize,
        _elapsed: Duration,
    ) {
    }

    /// Encoding or writing a snapshot failed.
    fn record_flush_error(&self, _reason: FlushReason, _error: &Error) {}

    /// A snapshot of `entries` keys was loaded, replacing the cache contents.
    fn record_load(&self, _entries: usize, _elapsed: Duration) {}

    /// Reading or decoding a snapshot failed.
    fn record_load_error(&self, _error: &Error) {}
}

/// Sink that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpSink;

impl DiagnosticSink for NoOpSink {}

/// Sink counting events with atomics.
#[derive(Debug, Default)]
pub struct StatsSink {
    flushes: AtomicU64,
    policy_flushes: AtomicU64,
    flush_errors: AtomicU64,
    bytes_written: AtomicU64,
    loads: AtomicU64,
    load_errors: AtomicU64,
}

/// Point-in-time copy of [`StatsSink`] counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushStats {
    pub flushes: u64,
    pub policy_flushes: u64,
    pub flush_errors: u64,
    pub bytes_written: u64,
    pub loads: u64,
    pub load_errors: u64,
}

impl StatsSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> FlushStats {
        FlushStats {
            flushes: self.flushes.load(Ordering::Relaxed),
            policy_flushes: self.policy_flushes.load(Ordering::Relaxed),
            flush_errors: self.flush_errors.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            load_errors: self.load_errors.load(Ordering::Relaxed),
        }
    }
}

impl DiagnosticSink for StatsSink {
    fn record_flush(
        &self,
        reason: FlushReason,
        _entries: usize,
        bytes: usize,
        _elapsed: Duration,
    ) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
        if reason == FlushReason::Policy {
            self.policy_flushes.fetch_add(1, Ordering::Relaxed);
        }
        self.bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    fn record_flush_error(&self, _reason: FlushReason, _error: &Error) {
        self.flush_errors.fetch_add(1, Ordering::Relaxed);
    }

    fn record_load(&self, _entries: usize, _elapsed: Duration) {
        self.loads.fetch_add(1, Ordering::Relaxed);
    }

    fn record_load_error(&self, _error: &Error) {
        self.load_errors.fetch_add(1, Ordering::Relaxed);
    }
}
