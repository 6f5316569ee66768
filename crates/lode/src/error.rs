//! Errors surfaced by [`LodeContext`](crate::LodeContext).

use lode_cache::CacheError;
use lode_config::ConfigError;

/// Errors from constructing or administering a context.
///
/// Lookups never produce these: resolution misses are
/// [`Resolution::NotFound`](lode_search::Resolution::NotFound), and cache
/// problems during `load_or_compile` degrade to a recompile.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    /// The configuration could not be loaded or the storage root is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An administrative cache operation failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// A write was requested while the context is read-only.
    #[error("storage root {0} is read-only")]
    ReadOnly(std::path::PathBuf),
}
