//! Conformance helpers for lode.
//!
//! Provides an uncached reference resolver that probes the filesystem
//! directly, on-disk fixture builders, and counting compiler callbacks for
//! assertion in integration tests.

#![warn(missing_docs)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use filetime::FileTime;
use lode_cache::ArtifactKind;
use lode_search::{Clock, DirectoryIndex, ManualClock, PathSearchCoordinator, StabilityPolicy};
use tempfile::TempDir;

/// Freshness window used by every fixture coordinator.
pub const TEST_WINDOW: Duration = Duration::from_secs(30);

/// Resolves `name` by probing every candidate path in order, with no caching.
///
/// This is the linear scan the cached coordinator must agree with: for each
/// directory in order, the bare name and then each extension is tested as a
/// regular file (following symlinks); the first hit wins.
pub fn naive_resolve(search_path: &[PathBuf], name: &str, extensions: &[String]) -> Option<PathBuf> {
    if !is_plain_relative(name) {
        return None;
    }
    for dir in search_path {
        let dir = std::path::absolute(dir).ok()?;
        for ext in std::iter::once("").chain(extensions.iter().map(String::as_str)) {
            let candidate = dir.join(format!("{name}{ext}"));
            if std::fs::metadata(&candidate).is_ok_and(|meta| meta.is_file()) {
                return Some(candidate);
            }
        }
    }
    None
}

fn is_plain_relative(name: &str) -> bool {
    !name.is_empty()
        && name
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

/// A temporary directory tree with separate stable and volatile areas.
///
/// Directories created with [`Tree::stable_dir`] lie under the tree's trusted
/// root; directories from [`Tree::volatile_dir`] do not.
pub struct Tree {
    root: TempDir,
}

impl Tree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create fixture root");
        std::fs::create_dir_all(root.path().join("rt")).expect("create trusted root");
        std::fs::create_dir_all(root.path().join("app")).expect("create project root");
        Self { root }
    }

    /// The tree root.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// The trusted root under which stable directories live.
    pub fn trusted_root(&self) -> PathBuf {
        self.root.path().join("rt")
    }

    /// Creates (if needed) and returns a stable directory.
    pub fn stable_dir(&self, name: &str) -> PathBuf {
        self.make_dir(self.trusted_root().join(name))
    }

    /// Creates (if needed) and returns a volatile directory.
    pub fn volatile_dir(&self, name: &str) -> PathBuf {
        self.make_dir(self.root.path().join("app").join(name))
    }

    /// Returns the storage root for artifacts, outside both search areas.
    pub fn storage_root(&self) -> PathBuf {
        self.root.path().join("store")
    }

    fn make_dir(&self, dir: PathBuf) -> PathBuf {
        std::fs::create_dir_all(&dir).expect("create fixture dir");
        dir
    }

    /// Builds a coordinator trusting this tree's stable area, driven by a
    /// manual clock.
    pub fn coordinator(&self) -> (Arc<ManualClock>, PathSearchCoordinator) {
        let clock = Arc::new(ManualClock::new());
        let shared: Arc<dyn Clock> = clock.clone();
        let index = DirectoryIndex::new(
            StabilityPolicy::new(vec![self.trusted_root()], Vec::<String>::new()),
            TEST_WINDOW,
            Arc::clone(&shared),
        );
        (clock, PathSearchCoordinator::new(index, shared))
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates an empty file, creating parent directories as needed.
pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, b"").expect("write fixture file");
}

/// Sets a directory's mtime to a fixed past instant so that any later
/// change is guaranteed to produce a different fingerprint.
pub fn pin_mtime(path: &Path) {
    filetime::set_file_mtime(path, FileTime::from_unix_time(1_000, 0)).expect("set mtime");
}

/// Error type of the fixture compilers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureCompileError(pub String);

impl std::fmt::Display for FixtureCompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "compile failed: {}", self.0)
    }
}

impl std::error::Error for FixtureCompileError {}

/// Returns a code kind that reverses the source bytes and counts its calls.
///
/// Sources containing the word `error` fail to compile.
pub fn counting_compiler() -> (Arc<AtomicUsize>, ArtifactKind<FixtureCompileError>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let kind = ArtifactKind::code(move |src: &[u8]| {
        counter.fetch_add(1, Ordering::SeqCst);
        if src.windows(5).any(|w| w == b"error") {
            return Err(FixtureCompileError("source contains an error".to_string()));
        }
        Ok(src.iter().rev().copied().collect())
    });
    (calls, kind)
}
