//! The externally mutable search path and its resolved per-generation state.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::policy::{Stability, StabilityPolicy};

static NEXT_SEARCH_PATH_ID: AtomicU64 = AtomicU64::new(1);

/// A shared, ordered list of directories that callers may mutate at any time.
///
/// Every mutation bumps a version counter, so a reader that remembers
/// `(id, version)` can tell without comparing contents that nothing changed.
#[derive(Debug)]
pub struct SearchPath {
    id: u64,
    version: AtomicU64,
    dirs: RwLock<Vec<PathBuf>>,
}

impl SearchPath {
    /// Creates a search path with the given directories.
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self {
            id: NEXT_SEARCH_PATH_ID.fetch_add(1, Ordering::Relaxed),
            version: AtomicU64::new(0),
            dirs: RwLock::new(dirs),
        }
    }

    /// Process-unique identity of this list.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Current mutation count.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Returns a copy of the directories together with the version they belong to.
    pub fn snapshot(&self) -> (u64, Vec<PathBuf>) {
        let dirs = self.dirs.read();
        (self.version(), dirs.clone())
    }

    /// Replaces the whole list.
    pub fn set(&self, dirs: Vec<PathBuf>) {
        self.mutate(|list| *list = dirs);
    }

    /// Appends a directory.
    pub fn push(&self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        self.mutate(|list| list.push(dir));
    }

    /// Inserts a directory at the front.
    pub fn unshift(&self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        self.mutate(|list| list.insert(0, dir));
    }

    /// Removes every occurrence of a directory. Returns `true` if any was removed.
    pub fn remove(&self, dir: &Path) -> bool {
        let mut removed = false;
        self.mutate(|list| {
            let before = list.len();
            list.retain(|d| d != dir);
            removed = list.len() != before;
        });
        removed
    }

    fn mutate(&self, f: impl FnOnce(&mut Vec<PathBuf>)) {
        let mut dirs = self.dirs.write();
        f(&mut dirs);
        self.version.fetch_add(1, Ordering::Release);
    }
}

/// One resolved search-path directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPathEntry {
    /// Absolute directory path.
    pub dir: PathBuf,
    /// Classification under the stability policy.
    pub stability: Stability,
}

/// The search path as seen by one generation of the coordinator.
#[derive(Debug)]
pub struct SearchPathState {
    generation: u64,
    /// The list exactly as supplied, for change detection.
    source: Vec<PathBuf>,
    /// `(id, version)` of the [`SearchPath`] this state was built from, if any.
    origin: Option<(u64, u64)>,
    entries: Vec<SearchPathEntry>,
    all_stable: bool,
}

impl SearchPathState {
    /// Resolves and classifies `source` for the given generation.
    ///
    /// Relative entries are made absolute against the current directory;
    /// entries whose basename is ignored are dropped.
    pub fn build(
        generation: u64,
        source: Vec<PathBuf>,
        origin: Option<(u64, u64)>,
        policy: &StabilityPolicy,
    ) -> Self {
        let entries: Vec<SearchPathEntry> = source
            .iter()
            .filter_map(|dir| std::path::absolute(dir).ok())
            .filter(|dir| !policy.is_ignored_dir(dir))
            .map(|dir| SearchPathEntry {
                stability: policy.classify(&dir),
                dir,
            })
            .collect();
        let all_stable = entries.iter().all(|e| e.stability == Stability::Stable);
        Self {
            generation,
            source,
            origin,
            entries,
            all_stable,
        }
    }

    /// The generation number; bumped on every rebuild.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The resolved entries in search order.
    pub fn entries(&self) -> &[SearchPathEntry] {
        &self.entries
    }

    /// Returns `true` if every entry is stable, so results never go stale.
    pub fn all_stable(&self) -> bool {
        self.all_stable
    }

    /// Returns `true` if this state was built from exactly this list.
    pub fn matches(&self, list: &[PathBuf]) -> bool {
        self.source.len() == list.len() && self.source.as_slice() == list
    }

    /// Returns `true` if this state was built from this version of `path`.
    pub fn matches_origin(&self, path: &SearchPath) -> bool {
        self.origin == Some((path.id(), path.version()))
    }

    /// Records that `path` at `version` has the same contents as this state.
    pub(crate) fn with_origin(&self, origin: (u64, u64)) -> Self {
        Self {
            generation: self.generation,
            source: self.source.clone(),
            origin: Some(origin),
            entries: self.entries.clone(),
            all_stable: self.all_stable,
        }
    }
}
