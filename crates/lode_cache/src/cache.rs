//! Compiled-artifact cache.
//!
//! [`CompiledArtifactCache`] ties together path hashing, the artifact store,
//! and header validation into the single `load_or_compile` entry point. The
//! fast path is one `open`, one `fstat` and one slot read. Every internal
//! fault (missing, corrupt, stale, unwritable) resolves to recompiling; only
//! an unreadable source or the compiler's own error reaches the caller.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use lode_common::{hash_path, ContentDigest, FileIdentity};
use serde::Serialize;

use crate::artifact::ArtifactStore;
use crate::error::{CacheError, LoadError};
use crate::header::{ArtifactHeader, Validity};
use crate::kind::{environment_fingerprint, ArtifactKind, CODE_NAMESPACE, DOCUMENT_NAMESPACE};
use crate::stats::{CacheStats, CacheStatsSnapshot};

/// Cache of compiled artifacts keyed by source path.
///
/// Safe to share across threads. Separate processes may share one storage
/// root; they coordinate only through atomic slot replacement.
#[derive(Debug)]
pub struct CompiledArtifactCache {
    /// Store for [`ArtifactKind::Code`] artifacts.
    code: ArtifactStore,
    /// Store for [`ArtifactKind::Document`] artifacts.
    document: ArtifactStore,
    /// Environment fingerprint stamped into every header.
    environment: u64,
    /// Never publish artifacts.
    readonly: bool,
    /// Rescue mtime-only changes with a content digest check.
    revalidate: bool,
    stats: CacheStats,
}

/// Result of inspecting the slot of a source file.
#[derive(Debug, Clone, Serialize)]
pub struct Inspection {
    /// The absolute source path that was hashed.
    pub source: PathBuf,
    /// The slot file path.
    pub slot: PathBuf,
    /// The stored header, when the record is structurally valid.
    pub header: Option<ArtifactHeader>,
    /// What a `load_or_compile` call would find in the slot.
    pub state: SlotState,
}

/// State of a slot relative to its current source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SlotState {
    /// No record stored.
    Absent,
    /// The record is structurally invalid.
    Corrupt {
        /// Why the record was rejected.
        reason: String,
    },
    /// The record was produced from a different source, environment or option set.
    Stale {
        /// The first mismatching field.
        reason: String,
    },
    /// Only the mtime changed; a digest check decides.
    MtimeChanged {
        /// Declared payload length.
        payload_len: u64,
    },
    /// The record would be served as is.
    Fresh {
        /// Declared payload length.
        payload_len: u64,
    },
}

impl CompiledArtifactCache {
    /// Creates a cache storing artifacts under `storage_root`.
    ///
    /// `runtime_tag` identifies the host runtime and feeds the environment
    /// fingerprint; artifacts written under a different tag are never served.
    pub fn new(storage_root: &Path, runtime_tag: &str) -> Self {
        Self {
            code: ArtifactStore::new(&storage_root.join(CODE_NAMESPACE)),
            document: ArtifactStore::new(&storage_root.join(DOCUMENT_NAMESPACE)),
            environment: environment_fingerprint(runtime_tag),
            readonly: false,
            revalidate: false,
            stats: CacheStats::default(),
        }
    }

    /// Sets read-only mode: misses compile but never publish.
    pub fn readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    /// Enables or disables digest revalidation of touched sources.
    ///
    /// Disabled by default, so any change to the source mtime recompiles.
    /// When enabled, a source whose mtime alone changed is read and its
    /// digest compared with the stored one before recompiling.
    pub fn revalidate(mut self, revalidate: bool) -> Self {
        self.revalidate = revalidate;
        self
    }

    /// Returns the store holding artifacts of the given kind.
    pub fn store_for<E>(&self, kind: &ArtifactKind<E>) -> &ArtifactStore {
        match kind {
            ArtifactKind::Code { .. } => &self.code,
            ArtifactKind::Document { .. } => &self.document,
        }
    }

    /// Returns the compiled form of the source at `path`.
    ///
    /// Serves the stored payload when its header matches the current source
    /// identity, environment and options. Otherwise compiles the source with
    /// the kind's callback, publishes the result (best effort), and returns
    /// it. A compiler error is returned unchanged and nothing is written.
    pub fn load_or_compile<E>(
        &self,
        path: &Path,
        kind: &ArtifactKind<E>,
    ) -> Result<Vec<u8>, LoadError<E>> {
        let source_err = |path: &Path, e: std::io::Error| LoadError::Source {
            path: path.to_path_buf(),
            source: e,
        };
        let path = std::path::absolute(path).map_err(|e| source_err(path, e))?;
        let mut file = File::open(&path).map_err(|e| source_err(&path, e))?;
        let meta = file.metadata().map_err(|e| source_err(&path, e))?;
        if !meta.is_file() {
            let e = std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file");
            return Err(source_err(&path, e));
        }
        let identity = FileIdentity::from_metadata(&meta);

        let key = hash_path(&path);
        let store = self.store_for(kind);
        let options = kind.options_fingerprint();
        let mut source: Option<Vec<u8>> = None;

        match store.try_read(key) {
            Ok(Some(record)) => match record.header.validity(self.environment, options, identity)
            {
                Validity::Fresh => {
                    log::trace!("hit {}", path.display());
                    self.stats.hit();
                    return Ok(record.payload);
                }
                Validity::MtimeChanged if self.revalidate => {
                    let bytes = read_source(&mut file, identity).map_err(|e| source_err(&path, e))?;
                    if ContentDigest::from_bytes(&bytes) == record.header.source_digest {
                        log::debug!("revalidated {} by content digest", path.display());
                        self.stats.revalidated();
                        let header = ArtifactHeader {
                            source: identity,
                            ..record.header
                        };
                        self.publish(store, key, &header, &record.payload, &path);
                        return Ok(record.payload);
                    }
                    log::debug!("stale {}: content changed", path.display());
                    self.stats.stale();
                    source = Some(bytes);
                }
                Validity::MtimeChanged => {
                    log::debug!("stale {}: mtime changed", path.display());
                    self.stats.stale();
                }
                Validity::Stale(reason) => {
                    log::debug!("stale {}: {} changed", path.display(), reason.as_str());
                    self.stats.stale();
                }
            },
            Ok(None) => {
                log::trace!("miss {}", path.display());
                self.stats.miss();
            }
            Err(e) if e.is_corruption() => {
                log::debug!("discarding corrupt artifact: {e}");
                self.stats.corrupt();
            }
            Err(e) => {
                log::debug!("treating unreadable slot as miss: {e}");
                self.stats.miss();
            }
        }

        let source = match source {
            Some(bytes) => bytes,
            None => read_source(&mut file, identity).map_err(|e| source_err(&path, e))?,
        };
        let payload = kind.run(&source).map_err(LoadError::Compile)?;

        let header = ArtifactHeader::new(
            self.environment,
            options,
            identity,
            ContentDigest::from_bytes(&source),
            &payload,
        );
        self.publish(store, key, &header, &payload, &path);
        Ok(payload)
    }

    /// Reports what the slot for `path` currently holds for the given kind.
    ///
    /// Never compiles and never writes.
    pub fn inspect<E>(
        &self,
        path: &Path,
        kind: &ArtifactKind<E>,
    ) -> Result<Inspection, CacheError> {
        let path = std::path::absolute(path).map_err(|e| CacheError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let identity = lode_common::file_identity(&path).map_err(|e| CacheError::Io {
            path: path.clone(),
            source: std::io::Error::other(e.to_string()),
        })?;
        let key = hash_path(&path);
        let store = self.store_for(kind);

        let (header, state) = match store.try_read(key) {
            Ok(None) => (None, SlotState::Absent),
            Ok(Some(record)) => {
                let payload_len = record.header.payload_len;
                let state = match record
                    .header
                    .validity(self.environment, kind.options_fingerprint(), identity)
                {
                    Validity::Fresh => SlotState::Fresh { payload_len },
                    Validity::MtimeChanged => SlotState::MtimeChanged { payload_len },
                    Validity::Stale(reason) => SlotState::Stale {
                        reason: reason.as_str().to_string(),
                    },
                };
                (Some(record.header), state)
            }
            Err(e) if e.is_corruption() => (
                None,
                SlotState::Corrupt {
                    reason: e.to_string(),
                },
            ),
            Err(e) => return Err(e),
        };

        Ok(Inspection {
            slot: store.slot_path(key),
            source: path,
            header,
            state,
        })
    }

    /// Removes every stored artifact of every kind. Returns the number of
    /// slot files removed.
    pub fn clear(&self) -> Result<usize, CacheError> {
        Ok(self.code.clear()? + self.document.clear()?)
    }

    /// Returns the current hit/miss counters.
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    fn publish(
        &self,
        store: &ArtifactStore,
        key: lode_common::ArtifactKey,
        header: &ArtifactHeader,
        payload: &[u8],
        source: &Path,
    ) {
        if self.readonly {
            return;
        }
        if let Err(e) = store.write(key, header, payload) {
            log::warn!("failed to cache artifact for {}: {e}", source.display());
            self.stats.write_failure();
        }
    }
}

/// Reads the whole source through the already-open handle.
fn read_source(file: &mut File, identity: FileIdentity) -> std::io::Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(usize::try_from(identity.size).unwrap_or(0));
    file.read_to_end(&mut bytes)?;
    Ok(bytes)
}
