//! No-op backend.

use super::PersistenceBackend;
use crate::error::{Error, Result};

/// Accepts and drops every snapshot. The default backend of a cache.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiscardBackend;

impl PersistenceBackend for DiscardBackend {
    fn write(&self, _data: &[u8]) -> Result<()> {
        Ok(())
    }

    fn read(&self) -> Result<Vec<u8>> {
        Err(Error::UnsupportedOperation(
            "discard backend holds no data".to_string(),
        ))
    }

    fn name(&self) -> &'static str {
        "discard"
    }
}
