//! Parsing and validation of `lode.toml` cache configuration files.
//!
//! This crate reads the configuration file and produces a strongly-typed
//! [`LodeConfig`] with relative paths resolved and the storage root prepared.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, validate_config, CONFIG_FILE};
pub use resolve::{prepare_storage_root, resolve_paths};
pub use types::*;
