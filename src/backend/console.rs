//! Append-only console/log sink.

use super::PersistenceBackend;
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::io::{self, Write};

/// Writes every snapshot, followed by a newline, to a writer.
///
/// Useful for debugging text encodings. Snapshots cannot be read back.
pub struct ConsoleBackend<W: Write + Send = io::Stdout> {
    writer: Mutex<W>,
}

impl ConsoleBackend<io::Stdout> {
    /// Console backend writing to standard output.
    pub fn stdout() -> Self {
        ConsoleBackend::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleBackend<W> {
    pub fn new(writer: W) -> Self {
        ConsoleBackend {
            writer: Mutex::new(writer),
        }
    }

    /// Consume the backend and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> PersistenceBackend for ConsoleBackend<W> {
    fn write(&self, data: &[u8]) -> Result<()> {
        let mut writer = self.writer.lock();
        writer
            .write_all(data)
            .and_then(|_| writer.write_all(b"\n"))
            .and_then(|_| writer.flush())
            .map_err(|e| Error::IoError(format!("Console write failed: {}", e)))
    }

    fn read(&self) -> Result<Vec<u8>> {
        Err(Error::UnsupportedOperation(
            "console backend is write-only".to_string(),
        ))
    }

    fn name(&self) -> &'static str {
        "console"
    }
}
