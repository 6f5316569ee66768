//! Immutable directory listings.

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use lode_common::DirFingerprint;
use serde::{Deserialize, Serialize};

/// Classification of a directory entry, with symlinks followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    /// A regular file (or a symlink to one).
    File,
    /// A directory (or a symlink to one).
    Directory,
    /// Anything else, including dangling symlinks.
    Other,
}

/// The entries of one directory at one point in time.
///
/// A set is never mutated after construction. Revalidating an unchanged
/// directory produces a new set sharing the same entry table with a fresh
/// capture time.
#[derive(Debug, Clone)]
pub struct DirectoryEntrySet {
    dir: PathBuf,
    entries: Arc<HashMap<OsString, EntryKind>>,
    /// `None` when the directory did not exist at capture time.
    fingerprint: Option<DirFingerprint>,
    /// `None` for sets restored from a persisted snapshot, which must be
    /// revalidated before first use unless their directory is stable.
    captured_at: Option<Instant>,
}

impl DirectoryEntrySet {
    /// Creates a set from a completed listing.
    pub fn new(
        dir: PathBuf,
        entries: HashMap<OsString, EntryKind>,
        fingerprint: Option<DirFingerprint>,
        captured_at: Option<Instant>,
    ) -> Self {
        Self {
            dir,
            entries: Arc::new(entries),
            fingerprint,
            captured_at,
        }
    }

    /// Creates an empty set for a directory that does not exist.
    pub fn absent(dir: PathBuf, captured_at: Instant) -> Self {
        Self::new(dir, HashMap::new(), None, Some(captured_at))
    }

    /// Returns a copy of this set re-stamped with a new capture time.
    pub fn refreshed(&self, captured_at: Instant) -> Self {
        Self {
            dir: self.dir.clone(),
            entries: Arc::clone(&self.entries),
            fingerprint: self.fingerprint,
            captured_at: Some(captured_at),
        }
    }

    /// The listed directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The directory fingerprint observed before listing.
    pub fn fingerprint(&self) -> Option<DirFingerprint> {
        self.fingerprint
    }

    /// When the set was captured or last revalidated.
    pub fn captured_at(&self) -> Option<Instant> {
        self.captured_at
    }

    /// Returns the kind of the named entry, if present.
    pub fn kind_of(&self, name: &OsStr) -> Option<EntryKind> {
        self.entries.get(name).copied()
    }

    /// Returns `true` if the named entry is a regular file.
    pub fn contains_file(&self, name: &OsStr) -> bool {
        self.kind_of(name) == Some(EntryKind::File)
    }

    /// Returns `true` if the named entry is a directory.
    pub fn contains_dir(&self, name: &OsStr) -> bool {
        self.kind_of(name) == Some(EntryKind::Directory)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the directory had no entries or did not exist.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over all entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, EntryKind)> {
        self.entries.iter().map(|(name, kind)| (name.as_os_str(), *kind))
    }
}
