//! Cached search-path resolution.
//!
//! Resolving a logical name against an ordered list of directories normally
//! means probing every directory for every candidate extension. This crate
//! replaces those probes with lookups in cached directory listings:
//!
//! - [`DirectoryIndex`] lists each directory lazily and keeps the listing
//!   until the [`StabilityPolicy`] says it might be stale.
//! - [`PathSearchCoordinator`] walks the search path in order over those
//!   listings and remembers misses per search-path generation.
//! - [`save_snapshot`] and [`load_snapshot`] carry listings across processes.

#![warn(missing_docs)]

pub mod clock;
pub mod coordinator;
pub mod entry;
pub mod index;
pub mod policy;
pub mod search_path;
pub mod snapshot;

pub use clock::{Clock, ManualClock, SystemClock};
pub use coordinator::{PathSearchCoordinator, Resolution, SearchStats};
pub use entry::{DirectoryEntrySet, EntryKind};
pub use index::DirectoryIndex;
pub use policy::{Stability, StabilityPolicy};
pub use search_path::{SearchPath, SearchPathEntry, SearchPathState};
pub use snapshot::{load_snapshot, policy_fingerprint, save_snapshot, INDEX_NAMESPACE};
