//! Error types for fingerprinting operations.

use std::path::PathBuf;

/// Errors that can occur while fingerprinting a file or directory.
///
/// Callers in the cache layers treat these as cache misses: a directory that
/// vanished simply has no entries, and a source file that cannot be stat'ed
/// cannot be served from the cache.
#[derive(Debug, thiserror::Error)]
pub enum FingerprintError {
    /// The path could not be stat'ed.
    #[error("cannot fingerprint {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The path exists but is not of the expected kind.
    #[error("{path} is not a {expected}")]
    WrongKind {
        /// The offending path.
        path: PathBuf,
        /// What the caller expected (`"directory"` or `"file"`).
        expected: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = FingerprintError::Io {
            path: PathBuf::from("/app/lib"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let msg = err.to_string();
        assert!(msg.contains("cannot fingerprint"));
        assert!(msg.contains("/app/lib"));
    }

    #[test]
    fn wrong_kind_display() {
        let err = FingerprintError::WrongKind {
            path: PathBuf::from("/app/lib/widget.src"),
            expected: "directory",
        };
        assert_eq!(err.to_string(), "/app/lib/widget.src is not a directory");
    }
}
