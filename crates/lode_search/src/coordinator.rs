//! Search-path resolution over the directory index.
//!
//! [`PathSearchCoordinator::resolve`] answers "which file does this logical
//! name refer to" with the same result an uncached linear scan would give:
//! directories are tried in search-path order, and within each directory the
//! bare name is tried before each extension in caller-declared order. The
//! first regular file wins.
//!
//! Misses are remembered in a negative cache scoped to the current search-path
//! generation. A miss that consulted a volatile listing expires when the
//! oldest such listing leaves its freshness window, so a negative result never
//! outlives the listings it was computed from.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use crate::clock::Clock;
use crate::entry::DirectoryEntrySet;
use crate::index::DirectoryIndex;
use crate::policy::Stability;
use crate::search_path::{SearchPath, SearchPathState};

/// Outcome of a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "path", rename_all = "snake_case")]
pub enum Resolution {
    /// The absolute path of the first matching file.
    Found(PathBuf),
    /// No directory on the search path holds a match.
    NotFound,
}

impl Resolution {
    /// Returns the found path, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Resolution::Found(path) => Some(path),
            Resolution::NotFound => None,
        }
    }

    /// Returns `true` for [`Resolution::Found`].
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct NegativeKey {
    name: String,
    extensions: Vec<String>,
}

/// Above this many remembered misses, expired ones are pruned on insert.
const PRUNE_THRESHOLD: usize = 1024;

/// Hard cap on remembered misses; reaching it after pruning drops them all.
const MAX_MISSES: usize = 16 * 1024;

/// Names known to be absent from every directory of one search-path generation.
///
/// Each miss carries the capture time of the oldest volatile listing it
/// consulted, or `None` if every listing was stable.
#[derive(Debug, Default)]
struct NegativeLookupCache {
    generation: u64,
    misses: HashMap<NegativeKey, Option<Instant>>,
}

impl NegativeLookupCache {
    fn reset(&mut self, generation: u64) {
        self.generation = generation;
        self.misses.clear();
    }

    fn insert(
        &mut self,
        key: NegativeKey,
        captured_at: Option<Instant>,
        now: Instant,
        window: Duration,
    ) {
        if self.misses.len() >= PRUNE_THRESHOLD {
            self.misses
                .retain(|_, at| !(*at).is_some_and(|at| expired(at, now, window)));
            if self.misses.len() >= MAX_MISSES {
                log::debug!("negative cache full, dropping {} misses", self.misses.len());
                self.misses.clear();
            }
        }
        self.misses.insert(key, captured_at);
    }
}

fn expired(captured_at: Instant, now: Instant, window: Duration) -> bool {
    now.saturating_duration_since(captured_at) >= window
}

/// Point-in-time copy of the coordinator's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// Calls to `resolve`.
    pub lookups: u64,
    /// Lookups answered from the negative cache.
    pub negative_hits: u64,
    /// Real directory listings.
    pub listings: u64,
    /// Volatile directories revalidated without listing.
    pub revalidations: u64,
    /// Search-path generation rebuilds.
    pub rebuilds: u64,
}

/// Resolves logical names against an ordered search path.
#[derive(Debug)]
pub struct PathSearchCoordinator {
    index: DirectoryIndex,
    clock: Arc<dyn Clock>,
    state: RwLock<Arc<SearchPathState>>,
    negative: Mutex<NegativeLookupCache>,
    next_generation: AtomicU64,
    lookups: AtomicU64,
    negative_hits: AtomicU64,
    rebuilds: AtomicU64,
}

impl PathSearchCoordinator {
    /// Creates a coordinator over `index` with an empty initial search path.
    pub fn new(index: DirectoryIndex, clock: Arc<dyn Clock>) -> Self {
        let empty = SearchPathState::build(0, Vec::new(), None, index.policy());
        Self {
            index,
            clock,
            state: RwLock::new(Arc::new(empty)),
            negative: Mutex::new(NegativeLookupCache::default()),
            next_generation: AtomicU64::new(1),
            lookups: AtomicU64::new(0),
            negative_hits: AtomicU64::new(0),
            rebuilds: AtomicU64::new(0),
        }
    }

    /// The underlying directory index.
    pub fn index(&self) -> &DirectoryIndex {
        &self.index
    }

    /// The current search-path state.
    pub fn state(&self) -> Arc<SearchPathState> {
        Arc::clone(&self.state.read())
    }

    /// Resolves `logical_name` against `search_path`.
    ///
    /// If `search_path` differs from the list seen on the previous call, the
    /// search-path state is rebuilt first.
    pub fn resolve(
        &self,
        search_path: &[PathBuf],
        logical_name: &str,
        extensions: &[String],
    ) -> Resolution {
        let state = self.state_for_list(search_path);
        self.resolve_in(&state, logical_name, extensions)
    }

    /// Resolves `logical_name` against the current contents of a shared
    /// [`SearchPath`].
    ///
    /// An unchanged version costs one atomic load; a changed version costs a
    /// content comparison, and a rebuild only if the contents differ.
    pub fn resolve_with(
        &self,
        search_path: &SearchPath,
        logical_name: &str,
        extensions: &[String],
    ) -> Resolution {
        let state = self.state_for_source(search_path);
        self.resolve_in(&state, logical_name, extensions)
    }

    /// Rebuilds the search-path state from scratch.
    ///
    /// Cached directory listings and every negative result are dropped;
    /// listings are repopulated lazily on demand.
    pub fn on_search_path_changed(&self, new_list: Vec<PathBuf>) -> Arc<SearchPathState> {
        let mut state = self.state.write();
        self.rebuild(&mut state, new_list, None)
    }

    /// Forgets the listing of `dir` and every remembered miss.
    ///
    /// For callers that just created a file and need it visible before the
    /// freshness window would expose it.
    pub fn invalidate_dir(&self, dir: &Path) {
        self.index.invalidate(dir);
        self.negative.lock().misses.clear();
    }

    /// Forgets every cached listing and every remembered miss, keeping the
    /// current search-path generation.
    pub fn reset(&self) {
        self.index.clear();
        self.negative.lock().misses.clear();
    }

    /// Returns the current counters.
    pub fn stats(&self) -> SearchStats {
        SearchStats {
            lookups: self.lookups.load(Ordering::Relaxed),
            negative_hits: self.negative_hits.load(Ordering::Relaxed),
            listings: self.index.listings(),
            revalidations: self.index.revalidations(),
            rebuilds: self.rebuilds.load(Ordering::Relaxed),
        }
    }

    fn state_for_list(&self, list: &[PathBuf]) -> Arc<SearchPathState> {
        {
            let state = self.state.read();
            if state.matches(list) {
                return Arc::clone(&state);
            }
        }
        let mut state = self.state.write();
        if state.matches(list) {
            return Arc::clone(&state);
        }
        self.rebuild(&mut state, list.to_vec(), None)
    }

    fn state_for_source(&self, source: &SearchPath) -> Arc<SearchPathState> {
        {
            let state = self.state.read();
            if state.matches_origin(source) {
                return Arc::clone(&state);
            }
        }
        let (version, list) = source.snapshot();
        let origin = (source.id(), version);
        let mut state = self.state.write();
        if state.matches(&list) {
            // Mutated back to identical contents: keep the generation.
            let same = Arc::new(state.with_origin(origin));
            *state = Arc::clone(&same);
            return same;
        }
        self.rebuild(&mut state, list, Some(origin))
    }

    fn rebuild(
        &self,
        state: &mut Arc<SearchPathState>,
        list: Vec<PathBuf>,
        origin: Option<(u64, u64)>,
    ) -> Arc<SearchPathState> {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let next = Arc::new(SearchPathState::build(
            generation,
            list,
            origin,
            self.index.policy(),
        ));
        self.index.clear();
        self.negative.lock().reset(generation);
        self.rebuilds.fetch_add(1, Ordering::Relaxed);
        log::debug!(
            "search path generation {generation}: {} directories",
            next.entries().len()
        );
        *state = Arc::clone(&next);
        next
    }

    fn resolve_in(
        &self,
        state: &SearchPathState,
        logical_name: &str,
        extensions: &[String],
    ) -> Resolution {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        let Some((parents, leaf)) = split_logical_name(logical_name) else {
            return Resolution::NotFound;
        };

        let key = NegativeKey {
            name: logical_name.to_string(),
            extensions: extensions.to_vec(),
        };
        if self.is_known_missing(state, &key) {
            self.negative_hits.fetch_add(1, Ordering::Relaxed);
            log::trace!("negative hit for {logical_name}");
            return Resolution::NotFound;
        }

        let mut oldest = None;
        for entry in state.entries() {
            let Some(set) = self.descend(&entry.dir, &parents, &mut oldest) else {
                continue;
            };
            for ext in std::iter::once("").chain(extensions.iter().map(String::as_str)) {
                let mut candidate = leaf.clone();
                candidate.push(ext);
                if set.contains_file(&candidate) {
                    let found = set.dir().join(candidate);
                    log::trace!("resolved {logical_name} to {}", found.display());
                    return Resolution::Found(found);
                }
            }
        }

        self.record_missing(state, key, oldest);
        Resolution::NotFound
    }

    /// Walks from a search-path directory through intermediate name components
    /// using cached listings only, returning the set of the final directory.
    ///
    /// `oldest` tracks the earliest capture time of every volatile listing
    /// consulted on the way.
    fn descend(
        &self,
        dir: &Path,
        parents: &[OsString],
        oldest: &mut Option<Instant>,
    ) -> Option<Arc<DirectoryEntrySet>> {
        let mut set = self.consult(dir, oldest);
        for component in parents {
            if !set.contains_dir(component) {
                return None;
            }
            let child = set.dir().join(component);
            set = self.consult(&child, oldest);
        }
        Some(set)
    }

    fn consult(&self, dir: &Path, oldest: &mut Option<Instant>) -> Arc<DirectoryEntrySet> {
        let set = self.index.entries_of(dir);
        if self.index.classify(dir) == Stability::Volatile {
            let at = set.captured_at().unwrap_or_else(|| self.clock.now());
            *oldest = Some(oldest.map_or(at, |o| o.min(at)));
        }
        set
    }

    fn is_known_missing(&self, state: &SearchPathState, key: &NegativeKey) -> bool {
        let negative = self.negative.lock();
        if negative.generation != state.generation() {
            return false;
        }
        match negative.misses.get(key) {
            Some(None) => true,
            Some(Some(at)) => !expired(*at, self.clock.now(), self.index.window()),
            None => false,
        }
    }

    fn record_missing(&self, state: &SearchPathState, key: NegativeKey, oldest: Option<Instant>) {
        let mut negative = self.negative.lock();
        // A rebuild raced with this lookup; its result belongs to a dead generation.
        if negative.generation != state.generation() {
            return;
        }
        negative.insert(key, oldest, self.clock.now(), self.index.window());
    }
}

/// Splits a logical name into intermediate directory components and a leaf.
///
/// Returns `None` for names that cannot match anything under a search-path
/// directory: empty names, absolute names, and names with `.` or `..`
/// components.
fn split_logical_name(name: &str) -> Option<(Vec<OsString>, OsString)> {
    if name.is_empty() || name.ends_with('/') {
        return None;
    }
    let mut parts = Vec::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_os_string()),
            _ => return None,
        }
    }
    // `components` silently drops interior `.` segments.
    if name.split('/').any(|seg| seg == "." || seg.is_empty()) {
        return None;
    }
    let leaf = parts.pop()?;
    Some((parts, leaf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::policy::StabilityPolicy;
    use filetime::FileTime;
    use std::time::Duration;

    const WINDOW: Duration = Duration::from_secs(30);

    struct Fixture {
        _root: tempfile::TempDir,
        app: PathBuf,
        rt: PathBuf,
        clock: Arc<ManualClock>,
        coordinator: PathSearchCoordinator,
    }

    fn fixture() -> Fixture {
        let root = tempfile::tempdir().unwrap();
        let app = root.path().join("app").join("lib");
        let rt = root.path().join("opt").join("rt").join("lib");
        std::fs::create_dir_all(&app).unwrap();
        std::fs::create_dir_all(&rt).unwrap();
        filetime::set_file_mtime(&app, FileTime::from_unix_time(1_000, 0)).unwrap();

        let clock = Arc::new(ManualClock::new());
        let policy = StabilityPolicy::new(vec![root.path().join("opt").join("rt")], ["node_modules"]);
        let index = DirectoryIndex::new(policy, WINDOW, clock.clone());
        let coordinator = PathSearchCoordinator::new(index, clock.clone());
        Fixture {
            _root: root,
            app,
            rt,
            clock,
            coordinator,
        }
    }

    fn exts() -> Vec<String> {
        vec![".src".to_string(), ".so".to_string()]
    }

    #[test]
    fn first_directory_wins() {
        let f = fixture();
        std::fs::write(f.app.join("widget.src"), "").unwrap();
        std::fs::write(f.rt.join("widget.src"), "").unwrap();
        let path = vec![f.app.clone(), f.rt.clone()];

        assert_eq!(
            f.coordinator.resolve(&path, "widget", &exts()),
            Resolution::Found(f.app.join("widget.src"))
        );
        let reversed = vec![f.rt.clone(), f.app.clone()];
        assert_eq!(
            f.coordinator.resolve(&reversed, "widget", &exts()),
            Resolution::Found(f.rt.join("widget.src"))
        );
    }

    #[test]
    fn directory_order_beats_extension_order() {
        let f = fixture();
        std::fs::write(f.app.join("widget.so"), "").unwrap();
        std::fs::write(f.rt.join("widget.src"), "").unwrap();
        let path = vec![f.app.clone(), f.rt.clone()];

        assert_eq!(
            f.coordinator.resolve(&path, "widget", &exts()),
            Resolution::Found(f.app.join("widget.so"))
        );
    }

    #[test]
    fn extension_precedence_within_directory() {
        let f = fixture();
        std::fs::write(f.app.join("widget.so"), "").unwrap();
        std::fs::write(f.app.join("widget.src"), "").unwrap();
        std::fs::write(f.app.join("widget"), "").unwrap();
        let path = vec![f.app.clone()];

        assert_eq!(
            f.coordinator.resolve(&path, "widget", &exts()),
            Resolution::Found(f.app.join("widget"))
        );
        assert_eq!(
            f.coordinator.resolve(&path, "widget.src", &exts()),
            Resolution::Found(f.app.join("widget.src"))
        );
    }

    #[test]
    fn directories_never_match() {
        let f = fixture();
        std::fs::create_dir(f.app.join("widget")).unwrap();
        std::fs::write(f.rt.join("widget.src"), "").unwrap();
        let path = vec![f.app.clone(), f.rt.clone()];

        assert_eq!(
            f.coordinator.resolve(&path, "widget", &exts()),
            Resolution::Found(f.rt.join("widget.src"))
        );
    }

    #[test]
    fn nested_names_walk_subdirectories() {
        let f = fixture();
        std::fs::create_dir_all(f.rt.join("net")).unwrap();
        std::fs::write(f.rt.join("net").join("http.src"), "").unwrap();
        let path = vec![f.app.clone(), f.rt.clone()];

        assert_eq!(
            f.coordinator.resolve(&path, "net/http", &exts()),
            Resolution::Found(f.rt.join("net").join("http.src"))
        );
        assert_eq!(
            f.coordinator.resolve(&path, "net/ftp", &exts()),
            Resolution::NotFound
        );
    }

    #[test]
    fn ignored_subdirectories_are_not_searched() {
        let f = fixture();
        std::fs::create_dir_all(f.app.join("node_modules")).unwrap();
        std::fs::write(f.app.join("node_modules").join("pkg.src"), "").unwrap();
        let path = vec![f.app.clone()];

        assert_eq!(
            f.coordinator.resolve(&path, "node_modules/pkg", &exts()),
            Resolution::NotFound
        );
    }

    #[test]
    fn malformed_names_not_found() {
        let f = fixture();
        std::fs::write(f.app.join("widget.src"), "").unwrap();
        let path = vec![f.app.clone()];

        for name in ["", "/widget", "../lib/widget", "./widget", "a//widget", "widget/"] {
            assert_eq!(
                f.coordinator.resolve(&path, name, &exts()),
                Resolution::NotFound,
                "{name:?}"
            );
        }
    }

    #[test]
    fn repeated_miss_served_from_negative_cache() {
        let f = fixture();
        let path = vec![f.app.clone(), f.rt.clone()];

        for _ in 0..5 {
            assert_eq!(
                f.coordinator.resolve(&path, "missing", &exts()),
                Resolution::NotFound
            );
        }
        let stats = f.coordinator.stats();
        assert_eq!(stats.lookups, 5);
        assert_eq!(stats.negative_hits, 4);
        assert_eq!(stats.listings, 2);
    }

    #[test]
    fn negative_cache_keyed_by_extensions() {
        let f = fixture();
        std::fs::write(f.app.join("widget.so"), "").unwrap();
        let path = vec![f.app.clone()];

        let src_only = vec![".src".to_string()];
        assert_eq!(
            f.coordinator.resolve(&path, "widget", &src_only),
            Resolution::NotFound
        );
        assert!(f.coordinator.resolve(&path, "widget", &exts()).is_found());
    }

    #[test]
    fn search_path_change_drops_negative_results() {
        let f = fixture();
        std::fs::write(f.rt.join("widget.src"), "").unwrap();

        let app_only = vec![f.app.clone()];
        assert_eq!(
            f.coordinator.resolve(&app_only, "widget", &exts()),
            Resolution::NotFound
        );
        let both = vec![f.app.clone(), f.rt.clone()];
        assert_eq!(
            f.coordinator.resolve(&both, "widget", &exts()),
            Resolution::Found(f.rt.join("widget.src"))
        );
        assert_eq!(f.coordinator.stats().rebuilds, 2);
    }

    #[test]
    fn new_volatile_file_found_after_window() {
        let f = fixture();
        let path = vec![f.app.clone(), f.rt.clone()];

        assert_eq!(
            f.coordinator.resolve(&path, "widget", &exts()),
            Resolution::NotFound
        );
        std::fs::write(f.app.join("widget.src"), "").unwrap();

        f.clock.advance(Duration::from_secs(5));
        assert_eq!(
            f.coordinator.resolve(&path, "widget", &exts()),
            Resolution::NotFound
        );

        f.clock.advance(WINDOW);
        assert_eq!(
            f.coordinator.resolve(&path, "widget", &exts()),
            Resolution::Found(f.app.join("widget.src"))
        );
    }

    #[test]
    fn miss_expires_with_the_listing_it_was_computed_from() {
        let f = fixture();
        let path = vec![f.app.clone()];

        // Lists the directory at t=0.
        f.coordinator.resolve(&path, "gadget", &exts());
        std::fs::write(f.app.join("widget.src"), "").unwrap();

        // Still within the listing's window: the stale miss is acceptable.
        f.clock.advance(WINDOW - Duration::from_secs(1));
        assert_eq!(
            f.coordinator.resolve(&path, "widget", &exts()),
            Resolution::NotFound
        );

        // The listing has expired, so the miss recorded at t=29 must too.
        f.clock.advance(Duration::from_secs(2));
        assert_eq!(
            f.coordinator.resolve(&path, "widget", &exts()),
            Resolution::Found(f.app.join("widget.src"))
        );
    }

    #[test]
    fn expired_misses_are_pruned() {
        let f = fixture();
        let path = vec![f.app.clone()];

        for i in 0..PRUNE_THRESHOLD {
            f.coordinator.resolve(&path, &format!("missing{i}"), &exts());
        }
        assert_eq!(f.coordinator.negative.lock().misses.len(), PRUNE_THRESHOLD);

        f.clock.advance(WINDOW);
        f.coordinator.resolve(&path, "one-more", &exts());
        assert_eq!(f.coordinator.negative.lock().misses.len(), 1);
    }

    #[test]
    fn reset_forgets_listings_and_misses() {
        let f = fixture();
        let path = vec![f.rt.clone()];
        assert!(!f.coordinator.resolve(&path, "widget", &exts()).is_found());
        let generation = f.coordinator.state().generation();

        std::fs::write(f.rt.join("widget.src"), "").unwrap();
        f.coordinator.reset();
        assert_eq!(
            f.coordinator.resolve(&path, "widget", &exts()),
            Resolution::Found(f.rt.join("widget.src"))
        );
        assert_eq!(f.coordinator.state().generation(), generation);
        assert_eq!(f.coordinator.stats().listings, 2);
    }

    #[test]
    fn all_stable_negative_results_do_not_expire() {
        let f = fixture();
        let path = vec![f.rt.clone()];

        f.coordinator.resolve(&path, "widget", &exts());
        std::fs::write(f.rt.join("widget.src"), "").unwrap();
        f.clock.advance(WINDOW * 10);

        assert_eq!(
            f.coordinator.resolve(&path, "widget", &exts()),
            Resolution::NotFound
        );
        assert_eq!(f.coordinator.stats().negative_hits, 1);
    }

    #[test]
    fn shared_search_path_mutation_triggers_rebuild() {
        let f = fixture();
        std::fs::write(f.rt.join("widget.src"), "").unwrap();
        let shared = SearchPath::new(vec![f.app.clone()]);

        assert!(!f.coordinator.resolve_with(&shared, "widget", &exts()).is_found());
        assert!(!f.coordinator.resolve_with(&shared, "widget", &exts()).is_found());
        assert_eq!(f.coordinator.stats().rebuilds, 1);

        shared.push(f.rt.clone());
        assert_eq!(
            f.coordinator.resolve_with(&shared, "widget", &exts()),
            Resolution::Found(f.rt.join("widget.src"))
        );
        assert_eq!(f.coordinator.stats().rebuilds, 2);
    }

    #[test]
    fn identical_contents_keep_generation() {
        let f = fixture();
        let shared = SearchPath::new(vec![f.app.clone()]);
        f.coordinator.resolve_with(&shared, "widget", &exts());
        let generation = f.coordinator.state().generation();

        shared.set(vec![f.app.clone()]);
        f.coordinator.resolve_with(&shared, "widget", &exts());

        assert_eq!(f.coordinator.state().generation(), generation);
        assert_eq!(f.coordinator.stats().negative_hits, 1);
    }

    #[test]
    fn explicit_change_rebuilds_lazily() {
        let f = fixture();
        std::fs::write(f.app.join("widget.src"), "").unwrap();
        let path = vec![f.app.clone()];
        f.coordinator.resolve(&path, "widget", &exts());
        let listings = f.coordinator.stats().listings;

        let state = f.coordinator.on_search_path_changed(path.clone());
        assert_eq!(f.coordinator.stats().listings, listings);
        assert!(state.generation() > 0);

        f.coordinator.resolve(&path, "widget", &exts());
        assert_eq!(f.coordinator.stats().listings, listings + 1);
    }

    #[test]
    fn invalidate_dir_forgets_misses() {
        let f = fixture();
        let path = vec![f.rt.clone()];
        assert!(!f.coordinator.resolve(&path, "widget", &exts()).is_found());

        std::fs::write(f.rt.join("widget.src"), "").unwrap();
        f.coordinator.invalidate_dir(&f.rt);
        assert_eq!(
            f.coordinator.resolve(&path, "widget", &exts()),
            Resolution::Found(f.rt.join("widget.src"))
        );
    }

    #[test]
    fn concurrent_resolves_agree() {
        let f = fixture();
        std::fs::write(f.rt.join("widget.src"), "").unwrap();
        let path = vec![f.app.clone(), f.rt.clone()];
        let expected = Resolution::Found(f.rt.join("widget.src"));

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..50 {
                        assert_eq!(f.coordinator.resolve(&path, "widget", &exts()), expected);
                        assert!(!f.coordinator.resolve(&path, "gadget", &exts()).is_found());
                    }
                });
            }
        });
        assert_eq!(f.coordinator.stats().listings, 2);
    }

    #[test]
    fn split_logical_name_components() {
        let (parents, leaf) = split_logical_name("net/http/client").unwrap();
        assert_eq!(parents, vec![OsString::from("net"), OsString::from("http")]);
        assert_eq!(leaf, OsString::from("client"));
        assert!(split_logical_name("..").is_none());
    }
}
