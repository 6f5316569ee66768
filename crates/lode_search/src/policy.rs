//! Stable/volatile directory classification.

use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use serde::Serialize;

/// How long a directory listing may be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stability {
    /// Lies under a trusted root; never revalidated once listed.
    Stable,
    /// Revalidated by fingerprint after the freshness window expires.
    Volatile,
}

/// Classifies directories by trusted root and filters ignored names.
#[derive(Debug, Clone, Default)]
pub struct StabilityPolicy {
    trusted_roots: Vec<PathBuf>,
    ignore_dirs: HashSet<OsString>,
}

impl StabilityPolicy {
    /// Creates a policy from absolute trusted-root prefixes and ignored
    /// directory basenames.
    pub fn new(
        trusted_roots: impl IntoIterator<Item = PathBuf>,
        ignore_dirs: impl IntoIterator<Item = impl Into<OsString>>,
    ) -> Self {
        Self {
            trusted_roots: trusted_roots.into_iter().collect(),
            ignore_dirs: ignore_dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Classifies a directory. Prefix matching is by whole path components.
    pub fn classify(&self, dir: &Path) -> Stability {
        if self.trusted_roots.iter().any(|root| dir.starts_with(root)) {
            Stability::Stable
        } else {
            Stability::Volatile
        }
    }

    /// Returns `true` if a directory with this basename is never listed or searched.
    pub fn is_ignored(&self, name: &OsStr) -> bool {
        self.ignore_dirs.contains(name)
    }

    /// Returns `true` if the directory itself is ignored by basename.
    pub fn is_ignored_dir(&self, dir: &Path) -> bool {
        dir.file_name().is_some_and(|name| self.is_ignored(name))
    }

    /// The configured trusted roots.
    pub fn trusted_roots(&self) -> &[PathBuf] {
        &self.trusted_roots
    }

    /// The configured ignored basenames, sorted for stable fingerprinting.
    pub fn ignored_sorted(&self) -> Vec<&OsStr> {
        let mut names: Vec<&OsStr> = self.ignore_dirs.iter().map(OsString::as_os_str).collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> StabilityPolicy {
        StabilityPolicy::new(vec![PathBuf::from("/opt/rt")], ["node_modules"])
    }

    #[test]
    fn under_trusted_root_is_stable() {
        assert_eq!(policy().classify(Path::new("/opt/rt/lib")), Stability::Stable);
        assert_eq!(policy().classify(Path::new("/opt/rt")), Stability::Stable);
    }

    #[test]
    fn prefix_matches_whole_components() {
        assert_eq!(policy().classify(Path::new("/opt/rtx/lib")), Stability::Volatile);
        assert_eq!(policy().classify(Path::new("/app/lib")), Stability::Volatile);
    }

    #[test]
    fn ignored_by_basename() {
        let p = policy();
        assert!(p.is_ignored(OsStr::new("node_modules")));
        assert!(p.is_ignored_dir(Path::new("/app/node_modules")));
        assert!(!p.is_ignored_dir(Path::new("/app/lib")));
    }

    #[test]
    fn no_roots_means_all_volatile() {
        let p = StabilityPolicy::default();
        assert_eq!(p.classify(Path::new("/opt/rt/lib")), Stability::Volatile);
    }
}
