//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::resolve::resolve_paths;
use crate::types::LodeConfig;
use std::path::Path;

/// Name of the configuration file looked up in a project directory.
pub const CONFIG_FILE: &str = "lode.toml";

/// Loads and validates a `lode.toml` configuration from a project directory.
///
/// Reads `<project_dir>/lode.toml`, parses it, validates it, and resolves
/// relative paths against `project_dir`.
pub fn load_config(project_dir: &Path) -> Result<LodeConfig, ConfigError> {
    load_config_file(&project_dir.join(CONFIG_FILE))
}

/// Loads and validates a configuration from an explicit file path.
///
/// Relative paths inside the file resolve against the file's directory.
pub fn load_config_file(path: &Path) -> Result<LodeConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config = load_config_from_str(&content)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    resolve_paths(&mut config, base);
    log::debug!("loaded configuration from {}", path.display());
    Ok(config)
}

/// Parses and validates a `lode.toml` configuration from a string.
///
/// Relative paths are left as written. Useful for testing without
/// filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<LodeConfig, ConfigError> {
    let config: LodeConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and values are consistent.
pub fn validate_config(config: &LodeConfig) -> Result<(), ConfigError> {
    if config.cache.storage_root.as_os_str().is_empty() {
        return Err(ConfigError::MissingField("cache.storage_root".to_string()));
    }
    for root in &config.search.trusted_roots {
        if !root.is_absolute() {
            return Err(ConfigError::ValidationError(format!(
                "trusted root '{}' must be an absolute path",
                root.display()
            )));
        }
    }
    for ext in &config.search.extensions {
        if ext.len() < 2 || !ext.starts_with('.') || ext.contains(['/', '\\']) {
            return Err(ConfigError::ValidationError(format!(
                "extension '{ext}' must be a dot followed by a suffix"
            )));
        }
    }
    for name in &config.search.ignore_dirs {
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(ConfigError::ValidationError(format!(
                "ignored directory '{name}' must be a bare directory name"
            )));
        }
    }
    Ok(())
}
