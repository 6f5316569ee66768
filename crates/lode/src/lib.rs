//! Lode: a directory-index cache for search-path resolution and a persistent
//! cache of compiled artifacts.
//!
//! Most embedders need only [`LodeContext`]:
//!
//! ```no_run
//! use lode::{ArtifactKind, LodeConfig, LodeContext, Resolution};
//!
//! let mut config = LodeConfig::new("/var/cache/lode");
//! config.search.path = vec!["/app/lib".into(), "/opt/rt/lib".into()];
//! config.search.extensions = vec![".src".into()];
//! let ctx = LodeContext::new(config)?;
//!
//! if let Resolution::Found(path) = ctx.resolve("widget") {
//!     let kind = ArtifactKind::<std::io::Error>::code(|src| Ok(src.to_vec()));
//!     let compiled = ctx.load_or_compile(&path, &kind)?;
//!     println!("{} bytes", compiled.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

pub mod context;
pub mod error;

pub use context::{LodeContext, LodeStats};
pub use error::ContextError;

pub use lode_cache::{ArtifactKind, CacheStatsSnapshot, Inspection, LoadError, SlotState};
pub use lode_config::{ConfigError, LodeConfig};
pub use lode_search::{Resolution, SearchPath, SearchStats};
