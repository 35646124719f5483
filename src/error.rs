//! Error types for cache operations.

use std::fmt;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the cache, its encodings and its persistence backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The mapping could not be encoded in the configured format
    /// (e.g. non-string keys with TOML).
    SerializationError(String),

    /// The persisted payload is malformed or does not match the expected shape.
    DeserializationError(String),

    /// The binary envelope is truncated or carries the wrong magic header.
    InvalidCacheEntry(String),

    /// The binary envelope was written by an incompatible format version.
    VersionMismatch { expected: u32, found: u32 },

    /// Underlying read/write fault in a persistence backend.
    IoError(String),

    /// The backend cannot perform the requested operation (e.g. reading back
    /// from a write-only sink).
    UnsupportedOperation(String),

    /// A caller-supplied argument is invalid.
    InvalidArgument(String),

    /// The cache configuration is invalid.
    ConfigError(String),
}

impl Error {
    /// True for faults raised while decoding a persisted snapshot.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Error::DeserializationError(_)
                | Error::InvalidCacheEntry(_)
                | Error::VersionMismatch { .. }
        )
    }

    /// True for faults raised by a persistence backend.
    pub fn is_io_error(&self) -> bool {
        matches!(self, Error::IoError(_) | Error::UnsupportedOperation(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SerializationError(msg) => write!(f, "serialization error: {}", msg),
            Error::DeserializationError(msg) => write!(f, "deserialization error: {}", msg),
            Error::InvalidCacheEntry(msg) => write!(f, "invalid cache entry: {}", msg),
            Error::VersionMismatch { expected, found } => write!(
                f,
                "snapshot version mismatch: expected {}, found {}",
                expected, found
            ),
            Error::IoError(msg) => write!(f, "I/O error: {}", msg),
            Error::UnsupportedOperation(msg) => write!(f, "unsupported operation: {}", msg),
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Error::ConfigError(msg) => write!(f, "configuration error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IoError(e.to_string())
    }
}
