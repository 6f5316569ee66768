//! Persisting the directory index across processes.
//!
//! A snapshot is one artifact record in the `index` namespace of the storage
//! root. Its header carries the environment fingerprint and a fingerprint of
//! the stability policy; a snapshot written under different trusted roots or
//! ignore rules is never restored. Restored sets have no capture time, so the
//! index trusts them only after the usual stable/volatile checks.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use lode_cache::{ArtifactHeader, ArtifactStore, CacheError};
use lode_common::{hash_path, ContentDigest, DirFingerprint, FileIdentity};
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::Xxh3;

use crate::entry::{DirectoryEntrySet, EntryKind};
use crate::index::{entry_table, DirectoryIndex};
use crate::policy::StabilityPolicy;

/// Namespace directory for index snapshots under the storage root.
pub const INDEX_NAMESPACE: &str = "index";

#[derive(Debug, Serialize, Deserialize)]
struct PersistedSet {
    dir: PathBuf,
    fingerprint: Option<DirFingerprint>,
    entries: Vec<(OsString, EntryKind)>,
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexSnapshot {
    sets: Vec<PersistedSet>,
}

/// Hash of everything that changes how a directory is classified or listed.
pub fn policy_fingerprint(policy: &StabilityPolicy) -> u64 {
    let mut hasher = Xxh3::new();
    for root in policy.trusted_roots() {
        let bytes = root.as_os_str().as_encoded_bytes();
        hasher.update(&(bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    }
    hasher.update(&[0xff]);
    for name in policy.ignored_sorted() {
        let bytes = name.as_encoded_bytes();
        hasher.update(&(bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    }
    hasher.digest()
}

fn snapshot_slot(storage_root: &Path) -> (ArtifactStore, lode_common::ArtifactKey) {
    (
        ArtifactStore::new(&storage_root.join(INDEX_NAMESPACE)),
        hash_path(storage_root),
    )
}

/// Writes every set currently held by `index` to the storage root.
///
/// Returns the number of directories saved.
pub fn save_snapshot(
    index: &DirectoryIndex,
    storage_root: &Path,
    environment: u64,
) -> Result<usize, CacheError> {
    let sets: Vec<PersistedSet> = index
        .export()
        .into_iter()
        .map(|set| PersistedSet {
            dir: set.dir().to_path_buf(),
            fingerprint: set.fingerprint(),
            entries: set
                .iter()
                .map(|(name, kind)| (name.to_os_string(), kind))
                .collect(),
        })
        .collect();
    let count = sets.len();

    let payload = bincode::serde::encode_to_vec(&IndexSnapshot { sets }, bincode::config::standard())
        .map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;
    let header = ArtifactHeader::new(
        environment,
        policy_fingerprint(index.policy()),
        FileIdentity {
            size: 0,
            mtime_ns: 0,
        },
        ContentDigest::default(),
        &payload,
    );

    let (store, key) = snapshot_slot(storage_root);
    let path = store.write(key, &header, &payload)?;
    log::debug!("saved {count} directory listings to {}", path.display());
    Ok(count)
}

/// Restores a saved snapshot into `index` as seeds.
///
/// Missing, corrupt, or mismatched snapshots restore nothing. Returns the
/// number of directories seeded.
pub fn load_snapshot(index: &DirectoryIndex, storage_root: &Path, environment: u64) -> usize {
    let (store, key) = snapshot_slot(storage_root);
    let Some(record) = store.read(key) else {
        return 0;
    };
    if record.header.environment != environment
        || record.header.options != policy_fingerprint(index.policy())
    {
        log::debug!("discarding index snapshot built for another environment or policy");
        return 0;
    }

    let snapshot: IndexSnapshot =
        match bincode::serde::decode_from_slice(&record.payload, bincode::config::standard()) {
            Ok((snapshot, _)) => snapshot,
            Err(e) => {
                log::debug!("discarding unreadable index snapshot: {e}");
                return 0;
            }
        };

    let seeded = index.seed(snapshot.sets.into_iter().map(|set| {
        DirectoryEntrySet::new(set.dir, entry_table(set.entries), set.fingerprint, None)
    }));
    log::debug!("restored {seeded} directory listings");
    seeded
}
