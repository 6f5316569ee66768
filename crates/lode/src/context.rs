//! The process-wide entry point tying configuration, search and caching together.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use lode_cache::{
    environment_fingerprint, ArtifactKind, ArtifactStore, CacheStatsSnapshot,
    CompiledArtifactCache, Inspection, LoadError,
};
use lode_config::{load_config, prepare_storage_root, validate_config, LodeConfig};
use lode_search::{
    load_snapshot, save_snapshot, Clock, DirectoryIndex, PathSearchCoordinator, Resolution,
    SearchPath, SearchStats, StabilityPolicy, SystemClock, INDEX_NAMESPACE,
};
use serde::Serialize;

use crate::error::ContextError;

/// Combined counters of both caches.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LodeStats {
    /// Search-path resolution counters.
    pub search: SearchStats,
    /// Compiled-artifact cache counters.
    pub cache: CacheStatsSnapshot,
}

/// A configured lode instance.
///
/// Owns the shared search path, the directory index behind it, and the
/// compiled-artifact cache. Every method takes `&self`; share the context
/// across threads with an `Arc`.
#[derive(Debug)]
pub struct LodeContext {
    storage_root: PathBuf,
    readonly: bool,
    persist_index: bool,
    environment: u64,
    extensions: Vec<String>,
    search_path: SearchPath,
    coordinator: PathSearchCoordinator,
    cache: CompiledArtifactCache,
}

impl LodeContext {
    /// Loads `lode.toml` from `project_dir` and builds a context from it.
    pub fn open(project_dir: &Path) -> Result<Self, ContextError> {
        Self::new(load_config(project_dir)?)
    }

    /// Builds a context from an already loaded configuration.
    ///
    /// Fails if the configuration is invalid or the storage root cannot be
    /// created or is not writable.
    pub fn new(config: LodeConfig) -> Result<Self, ContextError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Builds a context that measures freshness windows with `clock`.
    pub fn with_clock(config: LodeConfig, clock: Arc<dyn Clock>) -> Result<Self, ContextError> {
        validate_config(&config)?;
        let readonly = config.cache.readonly;
        let storage_root = prepare_storage_root(&config.cache.storage_root, readonly)?;
        let environment = environment_fingerprint(&config.cache.environment_tag);

        let policy = StabilityPolicy::new(
            config.search.trusted_roots.iter().cloned(),
            config.search.ignore_dirs.iter().cloned(),
        );
        let index = DirectoryIndex::new(
            policy,
            config.search.freshness_window(),
            Arc::clone(&clock),
        );
        if config.search.persist_index {
            load_snapshot(&index, &storage_root, environment);
        }

        let cache = CompiledArtifactCache::new(&storage_root, &config.cache.environment_tag)
            .readonly(readonly)
            .revalidate(config.cache.revalidate);

        log::debug!(
            "lode context at {} (readonly: {readonly})",
            storage_root.display()
        );
        Ok(Self {
            storage_root,
            readonly,
            persist_index: config.search.persist_index,
            environment,
            extensions: config.search.extensions,
            search_path: SearchPath::new(config.search.path),
            coordinator: PathSearchCoordinator::new(index, clock),
            cache,
        })
    }

    /// The absolute storage root.
    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    /// The shared search path. Mutations are picked up by the next lookup.
    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    /// The configured default extensions.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Resolves a logical name with the configured extensions.
    pub fn resolve(&self, logical_name: &str) -> Resolution {
        self.coordinator
            .resolve_with(&self.search_path, logical_name, &self.extensions)
    }

    /// Resolves a logical name with an explicit extension list.
    pub fn resolve_with_extensions(&self, logical_name: &str, extensions: &[String]) -> Resolution {
        self.coordinator
            .resolve_with(&self.search_path, logical_name, extensions)
    }

    /// Drops the cached listing of one directory, e.g. after writing into it.
    pub fn invalidate_dir(&self, dir: &Path) {
        self.coordinator.invalidate_dir(dir);
    }

    /// Returns the compiled form of `path`, compiling on a miss.
    pub fn load_or_compile<E>(
        &self,
        path: &Path,
        kind: &ArtifactKind<E>,
    ) -> Result<Vec<u8>, LoadError<E>> {
        self.cache.load_or_compile(path, kind)
    }

    /// Reports what the artifact slot of `path` holds, without compiling.
    pub fn inspect<E>(&self, path: &Path, kind: &ArtifactKind<E>) -> Result<Inspection, ContextError> {
        Ok(self.cache.inspect(path, kind)?)
    }

    /// Persists the directory index so a later process can start warm.
    ///
    /// Does nothing when index persistence is disabled or the context is
    /// read-only. Returns the number of directories saved.
    pub fn save_index(&self) -> Result<usize, ContextError> {
        if !self.persist_index || self.readonly {
            return Ok(0);
        }
        Ok(save_snapshot(
            self.coordinator.index(),
            &self.storage_root,
            self.environment,
        )?)
    }

    /// Removes every stored artifact and index snapshot and forgets all
    /// cached listings and misses. Returns the number of files removed.
    pub fn clear(&self) -> Result<usize, ContextError> {
        if self.readonly {
            return Err(ContextError::ReadOnly(self.storage_root.clone()));
        }
        let index_store = ArtifactStore::new(&self.storage_root.join(INDEX_NAMESPACE));
        let removed = self.cache.clear()? + index_store.clear()?;
        self.coordinator.reset();
        log::info!("removed {removed} cached files from {}", self.storage_root.display());
        Ok(removed)
    }

    /// Current counters of both caches.
    pub fn stats(&self) -> LodeStats {
        LodeStats {
            search: self.coordinator.stats(),
            cache: self.cache.stats(),
        }
    }
}
