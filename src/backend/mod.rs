//! Persistence backends: raw byte sinks (and sources) for cache snapshots.
//!
//! A backend never interprets what it stores; encoding is the job of
//! [`crate::encoding::Encoding`].

mod console;
mod discard;
mod file;
mod memory;

pub use console::ConsoleBackend;
pub use discard::DiscardBackend;
pub use file::FileBackend;
pub use memory::MemoryBackend;

use crate::error::Result;

/// Trait for snapshot persistence backends.
///
/// The cache serializes implicit flushes through its exclusive lock, but
/// explicit `store()` calls run under a shared lock and may reach `write`
/// concurrently. Implementations must tolerate that.
pub trait PersistenceBackend: Send + Sync {
    /// Persist a full snapshot, replacing any previous one.
    ///
    /// # Errors
    /// Returns `Error::IoError` on any underlying I/O fault.
    fn write(&self, data: &[u8]) -> Result<()>;

    /// Read back the last persisted snapshot.
    ///
    /// # Errors
    /// Returns `Error::IoError` if no snapshot exists, or
    /// `Error::UnsupportedOperation` for write-only sinks.
    fn read(&self) -> Result<Vec<u8>>;

    /// Short human-readable backend name, used in log lines.
    fn name(&self) -> &'static str;
}

impl<B: PersistenceBackend + ?Sized> PersistenceBackend for Box<B> {
    fn write(&self, data: &[u8]) -> Result<()> {
        (**self).write(data)
    }

    fn read(&self) -> Result<Vec<u8>> {
        (**self).read()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
