//! Slot-addressed binary artifact storage.
//!
//! Artifacts are stored as `<root>/<shard>/<slot>` where shard and slot are
//! the hex digits of an [`ArtifactKey`]. Each file is a fixed header followed
//! by the payload. Writes go to a temporary file in the shard directory and
//! are published with an atomic rename, so a concurrent reader sees either
//! the previous complete record or the new complete record, never a mix.

use std::io::Write;
use std::path::{Path, PathBuf};

use lode_common::{ArtifactKey, ContentDigest};

use crate::error::CacheError;
use crate::header::{ArtifactHeader, HeaderDefect, ARTIFACT_FORMAT_VERSION, HEADER_LEN};

/// Prefix of in-flight temporary files inside shard directories.
const TEMP_PREFIX: &str = ".tmp-";

/// A validated record read back from a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRecord {
    /// The decoded header.
    pub header: ArtifactHeader,
    /// The payload, exactly `header.payload_len` bytes.
    pub payload: Vec<u8>,
}

/// Slot-addressed store for binary artifacts.
///
/// A store owns one namespace directory; separate artifact kinds use separate
/// stores so their slots never collide. No locking is involved: concurrent
/// writers to the same slot race, the last rename wins, and every reader
/// observes a complete file.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    /// Namespace directory holding the shard subdirectories.
    root: PathBuf,
}

impl ArtifactStore {
    /// Creates a store rooted at the given namespace directory.
    ///
    /// Nothing is created on disk until the first write.
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Returns the namespace directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the file path of the slot for `key`.
    pub fn slot_path(&self, key: ArtifactKey) -> PathBuf {
        self.root.join(key.shard()).join(key.slot_name())
    }

    /// Reads and validates the record in the slot for `key`.
    ///
    /// Returns `None` if the slot is empty, unreadable, or holds a record that
    /// fails structural validation (truncated, wrong magic or version, length
    /// or checksum mismatch). Corruption is a silent miss.
    pub fn read(&self, key: ArtifactKey) -> Option<ArtifactRecord> {
        match self.try_read(key) {
            Ok(record) => record,
            Err(e) => {
                log::debug!("ignoring slot {key}: {e}");
                None
            }
        }
    }

    /// Reads the slot for `key`, reporting why a present record is unusable.
    ///
    /// `Ok(None)` means the slot is empty.
    pub fn try_read(&self, key: ArtifactKey) -> Result<Option<ArtifactRecord>, CacheError> {
        let path = self.slot_path(key);
        let raw = match std::fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::Io { path, source: e }),
        };

        let header = ArtifactHeader::decode(&raw).map_err(|defect| match defect {
            HeaderDefect::Version(actual) => CacheError::VersionMismatch {
                path: path.clone(),
                expected: ARTIFACT_FORMAT_VERSION,
                actual,
            },
            other => CacheError::InvalidHeader {
                path: path.clone(),
                reason: other.to_string(),
            },
        })?;

        let payload = &raw[HEADER_LEN..];
        if payload.len() as u64 != header.payload_len {
            return Err(CacheError::LengthMismatch {
                path,
                declared: header.payload_len,
                actual: payload.len() as u64,
            });
        }

        let actual_checksum = ContentDigest::from_bytes(payload);
        if actual_checksum != header.payload_checksum {
            return Err(CacheError::ChecksumMismatch {
                path,
                expected: header.payload_checksum.to_string(),
                actual: actual_checksum.to_string(),
            });
        }

        Ok(Some(ArtifactRecord {
            header,
            payload: payload.to_vec(),
        }))
    }

    /// Atomically publishes a record into the slot for `key`.
    ///
    /// The header's declared payload length must match `payload`. Returns the
    /// slot path on success.
    pub fn write(
        &self,
        key: ArtifactKey,
        header: &ArtifactHeader,
        payload: &[u8],
    ) -> Result<PathBuf, CacheError> {
        let path = self.slot_path(key);
        if header.payload_len != payload.len() as u64 {
            return Err(CacheError::LengthMismatch {
                path,
                declared: header.payload_len,
                actual: payload.len() as u64,
            });
        }

        let shard_dir = self.root.join(key.shard());
        std::fs::create_dir_all(&shard_dir).map_err(|e| CacheError::Io {
            path: shard_dir.clone(),
            source: e,
        })?;

        let mut output = Vec::with_capacity(HEADER_LEN + payload.len());
        output.extend_from_slice(&header.encode());
        output.extend_from_slice(payload);

        let mut tmp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(&shard_dir)
            .map_err(|e| CacheError::Io {
                path: shard_dir.clone(),
                source: e,
            })?;
        tmp.write_all(&output).map_err(|e| CacheError::Io {
            path: tmp.path().to_path_buf(),
            source: e,
        })?;
        tmp.persist(&path).map_err(|e| CacheError::Io {
            path: path.clone(),
            source: e.error,
        })?;

        log::trace!("published {} bytes to {}", output.len(), path.display());
        Ok(path)
    }

    /// Removes the slot for `key`. Returns `true` if a file was removed.
    pub fn remove(&self, key: ArtifactKey) -> Result<bool, CacheError> {
        let path = self.slot_path(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::Io { path, source: e }),
        }
    }

    /// Removes every slot and leftover temporary file in this namespace.
    ///
    /// Returns the number of files removed.
    pub fn clear(&self) -> Result<usize, CacheError> {
        if !self.root.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        let shards = std::fs::read_dir(&self.root).map_err(|e| CacheError::Io {
            path: self.root.clone(),
            source: e,
        })?;

        for shard in shards {
            let shard = shard.map_err(|e| CacheError::Io {
                path: self.root.clone(),
                source: e,
            })?;
            let shard_path = shard.path();
            if !shard_path.is_dir() {
                continue;
            }
            let entries = std::fs::read_dir(&shard_path).map_err(|e| CacheError::Io {
                path: shard_path.clone(),
                source: e,
            })?;
            for entry in entries {
                let entry = entry.map_err(|e| CacheError::Io {
                    path: shard_path.clone(),
                    source: e,
                })?;
                let path = entry.path();
                if path.is_file() {
                    std::fs::remove_file(&path).map_err(|e| CacheError::Io {
                        path: path.clone(),
                        source: e,
                    })?;
                    removed += 1;
                }
            }
            // Another process may have just published into this shard.
            let _ = std::fs::remove_dir(&shard_path);
        }

        Ok(removed)
    }
}
