//! Lazily populated cache of directory listings.
//!
//! [`DirectoryIndex::entries_of`] lists each directory at most once per
//! validity window. Stable directories are listed once for the life of the
//! index. Volatile directories are re-checked after the freshness window by
//! comparing a fresh [`directory_fingerprint`] with the one taken before the
//! listing: unchanged means the window restarts without listing again.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use lode_common::directory_fingerprint;
use parking_lot::{Mutex, RwLock};

use crate::clock::Clock;
use crate::entry::{DirectoryEntrySet, EntryKind};
use crate::policy::{Stability, StabilityPolicy};

/// Per-directory cache slot.
///
/// The map lock is held only to find or create a slot; the slot's own lock
/// serializes the read-or-populate sequence for one directory so that
/// concurrent lookups of the same directory produce a single listing.
#[derive(Debug)]
struct DirSlot {
    stability: Stability,
    current: RwLock<Option<Arc<DirectoryEntrySet>>>,
}

/// Cache of directory listings with a stable/volatile staleness policy.
#[derive(Debug)]
pub struct DirectoryIndex {
    policy: StabilityPolicy,
    window: Duration,
    clock: Arc<dyn Clock>,
    slots: RwLock<HashMap<PathBuf, Arc<DirSlot>>>,
    /// Sets restored from a persisted snapshot, adopted on first use.
    seeds: Mutex<HashMap<PathBuf, DirectoryEntrySet>>,
    listings: AtomicU64,
    revalidations: AtomicU64,
}

impl DirectoryIndex {
    /// Creates an empty index.
    pub fn new(policy: StabilityPolicy, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            policy,
            window,
            clock,
            slots: RwLock::new(HashMap::new()),
            seeds: Mutex::new(HashMap::new()),
            listings: AtomicU64::new(0),
            revalidations: AtomicU64::new(0),
        }
    }

    /// The classification policy.
    pub fn policy(&self) -> &StabilityPolicy {
        &self.policy
    }

    /// The freshness window for volatile directories.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Returns the entries of `dir`, listing it only if no trusted set exists.
    ///
    /// A directory that does not exist or cannot be read yields an empty set;
    /// that empty result is cached under the same policy as any other.
    pub fn entries_of(&self, dir: &Path) -> Arc<DirectoryEntrySet> {
        let slot = self.slot(dir);

        if let Some(set) = slot.current.read().as_ref() {
            if self.is_trusted(set, slot.stability, self.clock.now()) {
                return Arc::clone(set);
            }
        }

        let mut current = slot.current.write();
        let now = self.clock.now();
        // Another thread may have populated the slot while we waited.
        if let Some(set) = current.as_ref() {
            if self.is_trusted(set, slot.stability, now) {
                return Arc::clone(set);
            }
        }

        let previous = (*current)
            .clone()
            .or_else(|| self.seeds.lock().remove(dir).map(Arc::new));
        let next = match previous {
            Some(set) if slot.stability == Stability::Stable => {
                log::trace!("adopting restored stable listing of {}", dir.display());
                Arc::new(set.refreshed(now))
            }
            Some(set) => self.revalidate(&set, now),
            None => Arc::new(self.scan(dir, now)),
        };
        *current = Some(Arc::clone(&next));
        next
    }

    /// Forces the next `entries_of(dir)` to list the directory again.
    pub fn invalidate(&self, dir: &Path) {
        self.slots.write().remove(dir);
        self.seeds.lock().remove(dir);
    }

    /// Drops every cached listing. Restored snapshot seeds are kept; they are
    /// still validated before use.
    pub fn clear(&self) {
        self.slots.write().clear();
    }

    /// Returns the stability class the policy assigns to `dir`.
    pub fn classify(&self, dir: &Path) -> Stability {
        self.policy.classify(dir)
    }

    /// Number of real directory listings performed.
    pub fn listings(&self) -> u64 {
        self.listings.load(Ordering::Relaxed)
    }

    /// Number of volatile sets revalidated by fingerprint without re-listing.
    pub fn revalidations(&self) -> u64 {
        self.revalidations.load(Ordering::Relaxed)
    }

    /// Returns every cached set plus unadopted seeds, for persisting.
    pub fn export(&self) -> Vec<DirectoryEntrySet> {
        let mut sets: Vec<DirectoryEntrySet> = self
            .slots
            .read()
            .values()
            .filter_map(|slot| slot.current.read().as_deref().cloned())
            .collect();
        let unadopted: Vec<DirectoryEntrySet> = self
            .seeds
            .lock()
            .values()
            .filter(|seed| sets.iter().all(|s| s.dir() != seed.dir()))
            .cloned()
            .collect();
        sets.extend(unadopted);
        sets
    }

    /// Registers restored sets to be adopted on first lookup of their directory.
    pub fn seed(&self, sets: impl IntoIterator<Item = DirectoryEntrySet>) -> usize {
        let mut seeds = self.seeds.lock();
        let before = seeds.len();
        for set in sets {
            seeds.insert(set.dir().to_path_buf(), set);
        }
        seeds.len() - before
    }

    fn slot(&self, dir: &Path) -> Arc<DirSlot> {
        if let Some(slot) = self.slots.read().get(dir) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write();
        let slot = slots.entry(dir.to_path_buf()).or_insert_with(|| {
            Arc::new(DirSlot {
                stability: self.policy.classify(dir),
                current: RwLock::new(None),
            })
        });
        Arc::clone(slot)
    }

    fn is_trusted(&self, set: &DirectoryEntrySet, stability: Stability, now: Instant) -> bool {
        match (stability, set.captured_at()) {
            (_, None) => false,
            (Stability::Stable, Some(_)) => true,
            (Stability::Volatile, Some(at)) => now.saturating_duration_since(at) < self.window,
        }
    }

    fn revalidate(&self, set: &DirectoryEntrySet, now: Instant) -> Arc<DirectoryEntrySet> {
        let current = directory_fingerprint(set.dir()).ok();
        if current == set.fingerprint() {
            log::trace!("{} unchanged, restarting window", set.dir().display());
            self.revalidations.fetch_add(1, Ordering::Relaxed);
            Arc::new(set.refreshed(now))
        } else {
            log::debug!("{} changed, re-listing", set.dir().display());
            Arc::new(self.scan(set.dir(), now))
        }
    }

    /// Performs one real listing of `dir`.
    ///
    /// The fingerprint is taken before listing so that a change racing with
    /// the listing is caught by the next revalidation.
    fn scan(&self, dir: &Path, now: Instant) -> DirectoryEntrySet {
        let fingerprint = match directory_fingerprint(dir) {
            Ok(fp) => fp,
            Err(e) => {
                log::trace!("treating {} as empty: {e}", dir.display());
                return DirectoryEntrySet::absent(dir.to_path_buf(), now);
            }
        };

        self.listings.fetch_add(1, Ordering::Relaxed);
        let mut entries = HashMap::new();
        match std::fs::read_dir(dir) {
            Ok(read_dir) => {
                for entry in read_dir.flatten() {
                    let name = entry.file_name();
                    let kind = classify_entry(&entry);
                    if kind == EntryKind::Directory && self.policy.is_ignored(&name) {
                        continue;
                    }
                    entries.insert(name, kind);
                }
            }
            Err(e) => log::debug!("cannot list {}: {e}", dir.display()),
        }
        log::debug!("listed {} ({} entries)", dir.display(), entries.len());
        DirectoryEntrySet::new(dir.to_path_buf(), entries, Some(fingerprint), Some(now))
    }
}

/// Classifies a listed entry, following symlinks with one extra stat.
fn classify_entry(entry: &std::fs::DirEntry) -> EntryKind {
    let Ok(file_type) = entry.file_type() else {
        return EntryKind::Other;
    };
    let kind_of = |is_file: bool, is_dir: bool| {
        if is_file {
            EntryKind::File
        } else if is_dir {
            EntryKind::Directory
        } else {
            EntryKind::Other
        }
    };
    if file_type.is_symlink() {
        match std::fs::metadata(entry.path()) {
            Ok(meta) => kind_of(meta.is_file(), meta.is_dir()),
            Err(_) => EntryKind::Other,
        }
    } else {
        kind_of(file_type.is_file(), file_type.is_dir())
    }
}

/// Builds the entry table for a set restored from storage.
pub(crate) fn entry_table(entries: Vec<(OsString, EntryKind)>) -> HashMap<OsString, EntryKind> {
    entries.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use filetime::FileTime;
    use std::ffi::OsStr;

    const WINDOW: Duration = Duration::from_secs(30);

    fn index_with(roots: Vec<PathBuf>) -> (Arc<ManualClock>, DirectoryIndex) {
        let clock = Arc::new(ManualClock::new());
        let index = DirectoryIndex::new(
            StabilityPolicy::new(roots, ["node_modules"]),
            WINDOW,
            clock.clone(),
        );
        (clock, index)
    }

    /// Pins the directory mtime so that later additions always change it.
    fn pin_mtime(dir: &Path) {
        filetime::set_file_mtime(dir, FileTime::from_unix_time(1_000, 0)).unwrap();
    }

    #[test]
    fn lists_once_within_window() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("widget.src"), "").unwrap();
        let (_clock, index) = index_with(vec![]);

        for _ in 0..10 {
            let set = index.entries_of(dir.path());
            assert!(set.contains_file(OsStr::new("widget.src")));
        }
        assert_eq!(index.listings(), 1);
    }

    #[test]
    fn classifies_files_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.src"), "").unwrap();
        std::fs::create_dir(dir.path().join("net")).unwrap();
        std::fs::create_dir(dir.path().join("node_modules")).unwrap();
        let (_clock, index) = index_with(vec![]);

        let set = index.entries_of(dir.path());
        assert_eq!(set.kind_of(OsStr::new("a.src")), Some(EntryKind::File));
        assert_eq!(set.kind_of(OsStr::new("net")), Some(EntryKind::Directory));
        assert_eq!(set.kind_of(OsStr::new("node_modules")), None);
    }

    #[cfg(unix)]
    #[test]
    fn follows_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("real.src"), "").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real.src"), dir.path().join("link.src"))
            .unwrap();
        std::os::unix::fs::symlink(dir.path().join("nowhere"), dir.path().join("dangling.src"))
            .unwrap();
        let (_clock, index) = index_with(vec![]);

        let set = index.entries_of(dir.path());
        assert_eq!(set.kind_of(OsStr::new("link.src")), Some(EntryKind::File));
        assert_eq!(set.kind_of(OsStr::new("dangling.src")), Some(EntryKind::Other));
    }

    #[test]
    fn volatile_change_invisible_within_window() {
        let dir = tempfile::tempdir().unwrap();
        pin_mtime(dir.path());
        let (clock, index) = index_with(vec![]);

        assert!(index.entries_of(dir.path()).is_empty());
        std::fs::write(dir.path().join("widget.src"), "").unwrap();
        clock.advance(Duration::from_secs(10));

        assert!(index.entries_of(dir.path()).is_empty());
        assert_eq!(index.listings(), 1);
    }

    #[test]
    fn volatile_change_visible_after_window() {
        let dir = tempfile::tempdir().unwrap();
        pin_mtime(dir.path());
        let (clock, index) = index_with(vec![]);

        assert!(index.entries_of(dir.path()).is_empty());
        std::fs::write(dir.path().join("widget.src"), "").unwrap();
        clock.advance(WINDOW);

        assert!(index
            .entries_of(dir.path())
            .contains_file(OsStr::new("widget.src")));
        assert_eq!(index.listings(), 2);
    }

    #[test]
    fn unchanged_volatile_revalidates_without_listing() {
        let dir = tempfile::tempdir().unwrap();
        let (clock, index) = index_with(vec![]);

        let first = index.entries_of(dir.path());
        clock.advance(WINDOW * 2);
        let second = index.entries_of(dir.path());

        assert_eq!(index.listings(), 1);
        assert_eq!(index.revalidations(), 1);
        assert!(second.captured_at() > first.captured_at());
    }

    #[test]
    fn stable_never_revalidated() {
        let dir = tempfile::tempdir().unwrap();
        pin_mtime(dir.path());
        let (clock, index) = index_with(vec![dir.path().to_path_buf()]);

        assert!(index.entries_of(dir.path()).is_empty());
        std::fs::write(dir.path().join("widget.src"), "").unwrap();
        clock.advance(WINDOW * 100);

        assert!(index.entries_of(dir.path()).is_empty());
        assert_eq!(index.listings(), 1);
        assert_eq!(index.revalidations(), 0);
    }

    #[test]
    fn invalidate_forces_relisting() {
        let dir = tempfile::tempdir().unwrap();
        let (_clock, index) = index_with(vec![dir.path().to_path_buf()]);

        index.entries_of(dir.path());
        std::fs::write(dir.path().join("widget.src"), "").unwrap();
        index.invalidate(dir.path());

        assert!(index
            .entries_of(dir.path())
            .contains_file(OsStr::new("widget.src")));
        assert_eq!(index.listings(), 2);
    }

    #[test]
    fn missing_directory_is_empty_and_cached() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("gone");
        let (clock, index) = index_with(vec![]);

        assert!(index.entries_of(&gone).is_empty());
        assert!(index.entries_of(&gone).is_empty());
        assert_eq!(index.listings(), 0);

        std::fs::create_dir(&gone).unwrap();
        std::fs::write(gone.join("widget.src"), "").unwrap();
        clock.advance(WINDOW);
        assert!(index.entries_of(&gone).contains_file(OsStr::new("widget.src")));
    }

    #[test]
    fn concurrent_lookups_list_once() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..50 {
            std::fs::write(dir.path().join(format!("f{i}.src")), "").unwrap();
        }
        let (_clock, index) = index_with(vec![]);

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..100 {
                        assert_eq!(index.entries_of(dir.path()).len(), 50);
                    }
                });
            }
        });
        assert_eq!(index.listings(), 1);
    }

    #[test]
    fn seeded_volatile_set_revalidates_by_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("widget.src"), "").unwrap();
        let fingerprint = directory_fingerprint(dir.path()).unwrap();
        let (_clock, index) = index_with(vec![]);

        let restored = DirectoryEntrySet::new(
            dir.path().to_path_buf(),
            entry_table(vec![(OsString::from("widget.src"), EntryKind::File)]),
            Some(fingerprint),
            None,
        );
        assert_eq!(index.seed([restored]), 1);

        assert!(index
            .entries_of(dir.path())
            .contains_file(OsStr::new("widget.src")));
        assert_eq!(index.listings(), 0);
        assert_eq!(index.revalidations(), 1);
    }

    #[test]
    fn seeded_set_with_stale_fingerprint_relists() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("gadget.src"), "").unwrap();
        let (_clock, index) = index_with(vec![]);

        let restored = DirectoryEntrySet::new(
            dir.path().to_path_buf(),
            entry_table(vec![(OsString::from("widget.src"), EntryKind::File)]),
            None,
            None,
        );
        index.seed([restored]);

        let set = index.entries_of(dir.path());
        assert!(set.contains_file(OsStr::new("gadget.src")));
        assert!(!set.contains_file(OsStr::new("widget.src")));
        assert_eq!(index.listings(), 1);
    }

    #[test]
    fn export_includes_listed_and_seeded() {
        let a = tempfile::tempdir().unwrap();
        let (_clock, index) = index_with(vec![]);
        index.entries_of(a.path());
        index.seed([DirectoryEntrySet::new(
            PathBuf::from("/seeded"),
            HashMap::new(),
            None,
            None,
        )]);

        let dirs: Vec<PathBuf> = index.export().iter().map(|s| s.dir().to_path_buf()).collect();
        assert_eq!(dirs.len(), 2);
        assert!(dirs.contains(&PathBuf::from("/seeded")));
    }
}
