//! Path resolution and storage-root preparation.

use crate::error::ConfigError;
use crate::types::LodeConfig;
use std::path::{Path, PathBuf};

/// Resolves every relative path in the configuration against `base`.
///
/// Applies to the storage root and search path entries. Trusted roots are
/// already validated as absolute.
pub fn resolve_paths(config: &mut LodeConfig, base: &Path) {
    config.cache.storage_root = join_if_relative(base, &config.cache.storage_root);
    for dir in &mut config.search.path {
        *dir = join_if_relative(base, dir);
    }
}

fn join_if_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Creates the storage root if absent and checks that it is writable.
///
/// In read-only mode the root is neither created nor probed: a missing root
/// simply means every lookup misses. Returns the absolute storage root.
pub fn prepare_storage_root(root: &Path, readonly: bool) -> Result<PathBuf, ConfigError> {
    let root = std::path::absolute(root).map_err(|e| ConfigError::StorageRoot {
        path: root.to_path_buf(),
        source: e,
    })?;
    if readonly {
        return Ok(root);
    }

    std::fs::create_dir_all(&root).map_err(|e| ConfigError::StorageRoot {
        path: root.clone(),
        source: e,
    })?;
    // An unnamed temp file is removed by the OS as soon as it is dropped.
    tempfile::tempfile_in(&root).map_err(|e| ConfigError::StorageRoot {
        path: root.clone(),
        source: e,
    })?;
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_paths_joins_relative_entries() {
        let mut config = LodeConfig::new("cache");
        config.search.path = vec![PathBuf::from("lib"), PathBuf::from("/opt/rt/lib")];

        resolve_paths(&mut config, Path::new("/app"));

        assert_eq!(config.cache.storage_root, PathBuf::from("/app/cache"));
        assert_eq!(
            config.search.path,
            vec![PathBuf::from("/app/lib"), PathBuf::from("/opt/rt/lib")]
        );
    }

    #[test]
    fn prepare_creates_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("cache");

        let prepared = prepare_storage_root(&root, false).unwrap();
        assert!(prepared.is_dir());
        assert!(prepared.is_absolute());
    }

    #[test]
    fn prepare_readonly_does_not_create() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("cache");

        prepare_storage_root(&root, true).unwrap();
        assert!(!root.exists());
    }

    #[test]
    fn prepare_rejects_file_as_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, "").unwrap();

        let err = prepare_storage_root(&file, false).unwrap_err();
        assert!(matches!(err, ConfigError::StorageRoot { .. }));
    }
}
