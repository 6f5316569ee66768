//! Compiled-artifact caching.
//!
//! This crate provides slot-addressed binary storage with a fixed validation
//! header and atomic publishing, and the compiled-artifact cache built on it:
//! hand it a source path and a compiler callback and it returns the compiled
//! payload, recompiling only when the stored artifact is missing, corrupt, or
//! stale.

#![warn(missing_docs)]

pub mod artifact;
pub mod cache;
pub mod error;
pub mod header;
pub mod kind;
pub mod stats;

pub use artifact::{ArtifactRecord, ArtifactStore};
pub use cache::{CompiledArtifactCache, Inspection, SlotState};
pub use error::{CacheError, LoadError};
pub use header::{ArtifactHeader, HeaderDefect, StaleReason, Validity, HEADER_LEN};
pub use kind::{environment_fingerprint, ArtifactKind, CompileFn};
pub use stats::{CacheStats, CacheStatsSnapshot};
