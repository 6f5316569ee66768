//! Error types for configuration loading and validation.

use std::path::PathBuf;

/// Errors that can occur when loading or validating a `lode.toml` configuration.
///
/// All of these are fatal at initialization: a context is never constructed
/// from a configuration that failed to load or validate.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A required field is missing from the configuration.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// The storage root could not be created or is not writable.
    #[error("unusable storage root {path}: {source}")]
    StorageRoot {
        /// The configured storage root.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
