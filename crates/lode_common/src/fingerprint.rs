//! Stat-based identities for files and directories.
//!
//! Both fingerprints come from a single `stat` call and never read or list
//! contents. A directory's fingerprint changes whenever an entry is added,
//! removed or renamed inside it, which is what the directory index relies on
//! to revalidate volatile directories without re-listing them.

use std::fs::Metadata;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::FingerprintError;

/// Size and modification time of a source file.
///
/// These are the fields recorded in an artifact header and compared on every
/// cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileIdentity {
    /// File length in bytes.
    pub size: u64,
    /// Modification time in nanoseconds since the Unix epoch (negative before it).
    pub mtime_ns: i64,
}

impl FileIdentity {
    /// Builds an identity from already-fetched metadata.
    pub fn from_metadata(meta: &Metadata) -> Self {
        Self {
            size: meta.len(),
            mtime_ns: mtime_nanos(meta),
        }
    }
}

/// Modification fingerprint of a directory.
///
/// Combines the directory mtime with its inode and device numbers (on Unix)
/// so that a directory replaced by a fresh one with a coincidentally equal
/// mtime still reads as changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirFingerprint {
    /// Modification time in nanoseconds since the Unix epoch.
    pub mtime_ns: i64,
    /// Inode number, or 0 where unavailable.
    pub inode: u64,
    /// Device number, or 0 where unavailable.
    pub device: u64,
}

/// Stats a file and returns its size and modification time.
pub fn file_identity(path: &Path) -> Result<FileIdentity, FingerprintError> {
    let meta = std::fs::metadata(path).map_err(|e| FingerprintError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    if !meta.is_file() {
        return Err(FingerprintError::WrongKind {
            path: path.to_path_buf(),
            expected: "file",
        });
    }
    Ok(FileIdentity::from_metadata(&meta))
}

/// Stats a directory and returns its modification fingerprint.
///
/// Fails if the directory vanished or the path is not a directory; callers
/// treat that as a cache miss.
pub fn directory_fingerprint(dir: &Path) -> Result<DirFingerprint, FingerprintError> {
    let meta = std::fs::metadata(dir).map_err(|e| FingerprintError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;
    if !meta.is_dir() {
        return Err(FingerprintError::WrongKind {
            path: dir.to_path_buf(),
            expected: "directory",
        });
    }
    let (inode, device) = inode_and_device(&meta);
    Ok(DirFingerprint {
        mtime_ns: mtime_nanos(&meta),
        inode,
        device,
    })
}

fn mtime_nanos(meta: &Metadata) -> i64 {
    let Ok(modified) = meta.modified() else {
        return 0;
    };
    match modified.duration_since(UNIX_EPOCH) {
        Ok(d) => i64::try_from(d.as_nanos()).unwrap_or(i64::MAX),
        Err(e) => i64::try_from(e.duration().as_nanos()).map_or(i64::MIN, |n| -n),
    }
}

/// Converts a header mtime back into a `SystemTime` for display.
pub fn mtime_to_system_time(mtime_ns: i64) -> SystemTime {
    let abs = std::time::Duration::from_nanos(mtime_ns.unsigned_abs());
    if mtime_ns >= 0 {
        UNIX_EPOCH + abs
    } else {
        UNIX_EPOCH - abs
    }
}

#[cfg(unix)]
fn inode_and_device(meta: &Metadata) -> (u64, u64) {
    use std::os::unix::fs::MetadataExt;
    (meta.ino(), meta.dev())
}

#[cfg(not(unix))]
fn inode_and_device(_meta: &Metadata) -> (u64, u64) {
    (0, 0)
}
