//! In-memory persistence backend.

use super::PersistenceBackend;
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Slot {
    data: Option<Vec<u8>>,
    writes: u64,
}

/// Keeps the most recent snapshot in process memory.
///
/// Clones share the same slot, so a clone handed to one cache can be read
/// from another. Handy for tests and for copying state between caches
/// without touching disk.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    slot: Arc<Mutex<Slot>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-seeded with a snapshot.
    pub fn with_data(data: Vec<u8>) -> Self {
        let backend = Self::new();
        backend.slot.lock().data = Some(data);
        backend
    }

    /// Copy of the last written snapshot, if any.
    pub fn snapshot(&self) -> Option<Vec<u8>> {
        self.slot.lock().data.clone()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> u64 {
        self.slot.lock().writes
    }
}

impl PersistenceBackend for MemoryBackend {
    fn write(&self, data: &[u8]) -> Result<()> {
        let mut slot = self.slot.lock();
        slot.data = Some(data.to_vec());
        slot.writes += 1;
        debug!("✓ Memory WRITE ({} bytes, write #{})", data.len(), slot.writes);
        Ok(())
    }

    fn read(&self) -> Result<Vec<u8>> {
        self.slot
            .lock()
            .data
            .clone()
            .ok_or_else(|| Error::IoError("no snapshot has been written".to_string()))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_before_write() {
        let backend = MemoryBackend::new();
        assert!(matches!(backend.read(), Err(Error::IoError(_))));
        assert_eq!(backend.write_count(), 0);
    }

    #[test]
    fn test_clones_share_storage() {
        let backend = MemoryBackend::new();
        let reader = backend.clone();

        backend.write(b"v1").expect("Failed to write");
        backend.write(b"v2").expect("Failed to write");

        assert_eq!(reader.read().expect("Failed to read"), b"v2");
        assert_eq!(reader.write_count(), 2);
    }

    #[test]
    fn test_with_data() {
        let backend = MemoryBackend::with_data(b"seed".to_vec());
        assert_eq!(backend.snapshot(), Some(b"seed".to_vec()));
        assert_eq!(backend.write_count(), 0);
    }
}
