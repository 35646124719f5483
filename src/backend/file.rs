//! Filesystem persistence backend.

use super::PersistenceBackend;
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persists snapshots to a single file.
///
/// Writes go to a sibling `<file>.<pid>.<n>.tmp` first, are synced, and then
/// renamed over the target, so a crash mid-write leaves the previous snapshot
/// intact. Every write gets its own temp name, so separate backends pointed at
/// the same file never share one. A failed write removes its temp file.
///
/// # Example
///
/// ```no_run
/// use cache_vault::backend::{FileBackend, PersistenceBackend};
///
/// # fn example() -> cache_vault::Result<()> {
/// let backend = FileBackend::new("/var/lib/app/cache.bin");
/// backend.write(b"snapshot")?;
/// assert_eq!(backend.read()?, b"snapshot");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    // Orders renames from this instance.
    write_lock: Mutex<()>,
}

impl FileBackend {
    /// Create a backend targeting `path`. The file does not need to exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileBackend {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Target snapshot path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("snapshot"));
        let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        name.push(format!(".{}.{}.tmp", process::id(), seq));
        self.path.with_file_name(name)
    }

    fn write_temp(&self, temp_path: &Path, data: &[u8]) -> Result<()> {
        let mut file = fs::File::create(temp_path).map_err(|e| {
            Error::IoError(format!(
                "Failed to create temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;
        file.write_all(data)
            .and_then(|_| file.sync_all())
            .map_err(|e| {
                Error::IoError(format!(
                    "Failed to write temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })
    }
}

impl PersistenceBackend for FileBackend {
    fn write(&self, data: &[u8]) -> Result<()> {
        let _guard = self.write_lock.lock();
        let temp_path = self.temp_path();

        if let Err(e) = self.write_temp(&temp_path, data) {
            error!("✗ File WRITE {} failed: {}", self.path.display(), e);
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        fs::rename(&temp_path, &self.path).map_err(|e| {
            error!(
                "✗ Rename of {} over {} failed: {}",
                temp_path.display(),
                self.path.display(),
                e
            );
            let _ = fs::remove_file(&temp_path);
            Error::IoError(format!(
                "Failed to replace snapshot {}: {}",
                self.path.display(),
                e
            ))
        })?;

        debug!("✓ File WRITE {} ({} bytes)", self.path.display(), data.len());
        Ok(())
    }

    fn read(&self) -> Result<Vec<u8>> {
        let data = fs::read(&self.path).map_err(|e| {
            Error::IoError(format!(
                "Failed to read snapshot {}: {}",
                self.path.display(),
                e
            ))
        })?;
        debug!("✓ File READ {} ({} bytes)", self.path.display(), data.len());
        Ok(data)
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let backend = FileBackend::new(dir.path().join("cache.bin"));

        backend.write(b"first").expect("Failed to write");
        assert_eq!(backend.read().expect("Failed to read"), b"first");

        backend.write(b"second snapshot").expect("Failed to write");
        assert_eq!(backend.read().expect("Failed to read"), b"second snapshot");
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .expect("Failed to list dir")
            .map(|entry| {
                entry
                    .expect("Failed to read entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_temp_file_is_cleaned_up() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let backend = FileBackend::new(dir.path().join("cache.json"));
        backend.write(b"{}").expect("Failed to write");

        assert_eq!(dir_entries(dir.path()), vec!["cache.json".to_string()]);
    }

    #[test]
    fn test_temp_names_are_unique() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let first = FileBackend::new(dir.path().join("cache.bin"));
        let second = FileBackend::new(dir.path().join("cache.bin"));

        let a = first.temp_path();
        let b = second.temp_path();
        assert_ne!(a, b);
        assert_ne!(a, first.temp_path());
        assert_eq!(a.parent(), Some(dir.path()));
        assert!(a.to_string_lossy().ends_with(".tmp"));
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let target = dir.path().join("cache.bin");
        // A non-empty directory cannot be replaced by a file.
        fs::create_dir(&target).expect("Failed to create dir");
        fs::write(target.join("keep"), b"x").expect("Failed to write");
        let backend = FileBackend::new(&target);

        let err = backend.write(b"data").expect_err("Expected failure");
        assert!(matches!(err, Error::IoError(_)));
        assert_eq!(dir_entries(dir.path()), vec!["cache.bin".to_string()]);
    }

    #[test]
    fn test_backends_sharing_a_path() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("shared.bin");
        let payloads: Vec<Vec<u8>> = (0..4u8).map(|i| vec![i; 64 * 1024]).collect();

        let handles: Vec<_> = payloads
            .iter()
            .cloned()
            .map(|payload| {
                let backend = FileBackend::new(&path);
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        backend.write(&payload).expect("Failed to write");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("Writer panicked");
        }

        let contents = FileBackend::new(&path).read().expect("Failed to read");
        assert!(payloads.contains(&contents));
        assert_eq!(dir_entries(dir.path()), vec!["shared.bin".to_string()]);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let backend = FileBackend::new(dir.path().join("absent.bin"));

        let err = backend.read().expect_err("Expected failure");
        assert!(matches!(err, Error::IoError(_)));
    }

    #[test]
    fn test_write_into_missing_directory() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let backend = FileBackend::new(dir.path().join("no/such/dir/cache.bin"));

        let err = backend.write(b"data").expect_err("Expected failure");
        assert!(matches!(err, Error::IoError(_)));
    }
}
