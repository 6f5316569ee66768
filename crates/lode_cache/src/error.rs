//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur inside the artifact store.
///
/// Cache operations are fail-safe: none of these reach a caller of
/// `load_or_compile`. They exist for internal propagation, logging, and
/// the inspection API.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing a slot file.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A slot file has an invalid or truncated header.
    #[error("invalid artifact header in {path}: {reason}")]
    InvalidHeader {
        /// The slot file path.
        path: PathBuf,
        /// Description of the header problem.
        reason: String,
    },

    /// The artifact format version does not match the current version.
    #[error("version mismatch in {path}: expected {expected}, got {actual}")]
    VersionMismatch {
        /// The slot file path.
        path: PathBuf,
        /// The expected format version.
        expected: u32,
        /// The actual format version found in the file.
        actual: u32,
    },

    /// The payload length differs from the length declared in the header.
    #[error("length mismatch in {path}: header declares {declared} bytes, found {actual}")]
    LengthMismatch {
        /// The slot file path.
        path: PathBuf,
        /// Payload length recorded in the header.
        declared: u64,
        /// Payload bytes actually present.
        actual: u64,
    },

    /// The stored checksum does not match the computed checksum of the payload.
    #[error("checksum mismatch in {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The slot file path.
        path: PathBuf,
        /// The expected checksum from the header.
        expected: String,
        /// The actual checksum computed from the payload.
        actual: String,
    },

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}

impl CacheError {
    /// Returns `true` if this error means the slot content is unusable, as
    /// opposed to the storage layer being unavailable.
    pub fn is_corruption(&self) -> bool {
        !matches!(self, CacheError::Io { .. })
    }
}

/// Error returned by `load_or_compile`.
///
/// Only failures the cache cannot recover from by recomputing surface here:
/// an unreadable source file, and the compiler's own error, which is carried
/// unmodified.
#[derive(Debug, thiserror::Error)]
pub enum LoadError<E> {
    /// The source file could not be opened, stat'ed, or read.
    #[error("cannot read source {path}: {source}")]
    Source {
        /// The source path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The compiler callback failed.
    #[error(transparent)]
    Compile(E),
}

impl<E> LoadError<E> {
    /// Returns the compiler error, if this is one.
    pub fn into_compile_error(self) -> Option<E> {
        match self {
            LoadError::Compile(e) => Some(e),
            LoadError::Source { .. } => None,
        }
    }
}
