//! Shared foundational types used across the lode caching engine.
//!
//! This crate provides the fingerprinting layer: stable path hashing for
//! artifact slot keys, content digests, and cheap stat-based identities for
//! files and directories used in staleness checks.

#![warn(missing_docs)]

pub mod error;
pub mod fingerprint;
pub mod hash;

pub use error::FingerprintError;
pub use fingerprint::{
    directory_fingerprint, file_identity, mtime_to_system_time, DirFingerprint, FileIdentity,
};
pub use hash::{hash_path, ArtifactKey, ContentDigest};
