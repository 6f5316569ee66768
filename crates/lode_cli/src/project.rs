//! Locating and loading the configuration for CLI commands.

use std::path::{Path, PathBuf};

use lode::{LodeConfig, LodeContext};
use lode_config::{load_config_file, CONFIG_FILE};

use crate::GlobalArgs;

/// Walks up from `start` looking for the nearest directory containing `lode.toml`.
pub fn find_config_file(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILE);
        if candidate.is_file() {
            return Ok(candidate);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the configuration file from global CLI args.
///
/// `--config` may name the file itself or its directory. Without it, the
/// current directory and its ancestors are searched.
pub fn resolve_config_file(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match global.config {
        Some(ref config) => {
            let path = PathBuf::from(config);
            if path.is_dir() {
                Ok(path.join(CONFIG_FILE))
            } else {
                Ok(path)
            }
        }
        None => find_config_file(&std::env::current_dir()?),
    }
}

/// Loads the configuration selected by the global args.
pub fn load(global: &GlobalArgs) -> Result<LodeConfig, Box<dyn std::error::Error>> {
    let file = resolve_config_file(global)?;
    Ok(load_config_file(&file)?)
}

/// Builds a context from a loaded configuration.
pub fn open(config: LodeConfig) -> Result<LodeContext, Box<dyn std::error::Error>> {
    Ok(LodeContext::new(config)?)
}
