//! Stable hashing for artifact slot keys and content digests.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A 64-bit key selecting the storage slot of a cached artifact.
///
/// Derived with XXH3-64 (fixed seed) from the raw bytes of an absolute path,
/// so the same path maps to the same slot in every process and every run.
/// Keys only select a slot: a collision costs a recompilation because header
/// validation rejects the foreign record, never a wrong result.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactKey(u64);

impl ArtifactKey {
    /// Creates a key from a raw 64-bit value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw 64-bit value.
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns the shard directory name: the first two hex digits of the key.
    pub fn shard(self) -> String {
        format!("{:02x}", self.0 >> 56)
    }

    /// Returns the slot file name within the shard: the remaining 14 hex digits.
    pub fn slot_name(self) -> String {
        format!("{:014x}", self.0 & 0x00ff_ffff_ffff_ffff)
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl fmt::Debug for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArtifactKey({:016x})", self.0)
    }
}

/// Hashes a path into an [`ArtifactKey`].
///
/// The hash covers the path's platform byte encoding exactly as given; callers
/// pass absolute resolved paths so that two spellings of one file share a slot.
pub fn hash_path(path: &Path) -> ArtifactKey {
    ArtifactKey(xxhash_rust::xxh3::xxh3_64(path.as_os_str().as_encoded_bytes()))
}

/// A 64-bit XXH3 digest of a byte sequence.
///
/// Used for source-content revalidation and payload integrity checks in
/// artifact headers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ContentDigest(u64);

impl ContentDigest {
    /// Computes the digest of a byte slice.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(xxhash_rust::xxh3::xxh3_64(data))
    }

    /// Creates a digest from a raw value read back from storage.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw 64-bit value.
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({:04x}..)", self.0 >> 48)
    }
}
