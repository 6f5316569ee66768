//! Fixed-layout validation header for stored artifacts.
//!
//! Every slot file starts with a 64-byte little-endian header at fixed offsets:
//!
//! ```text
//!  0..4   magic            b"LODE"
//!  4..8   format version   u32
//!  8..16  environment      u64  platform/runtime fingerprint
//! 16..24  options          u64  compile-option fingerprint (includes kind)
//! 24..32  source size      u64
//! 32..40  source mtime     i64  nanoseconds since the Unix epoch
//! 40..48  source digest    u64  XXH3-64 of the source bytes
//! 48..56  payload length   u64
//! 56..64  payload checksum u64  XXH3-64 of the payload
//! ```
//!
//! The payload follows immediately and must be exactly `payload length` bytes.

use lode_common::{ContentDigest, FileIdentity};
use serde::Serialize;

/// Magic bytes identifying a lode artifact.
pub const ARTIFACT_MAGIC: [u8; 4] = *b"LODE";

/// Current artifact format version. Increment on any change to the header
/// layout or payload framing.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Size of the encoded header in bytes.
pub const HEADER_LEN: usize = 64;

/// Decoded artifact header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArtifactHeader {
    /// Artifact format version.
    pub format_version: u32,
    /// Fingerprint of the platform and runtime that produced the artifact.
    pub environment: u64,
    /// Fingerprint of the artifact kind and every option that shapes its output.
    pub options: u64,
    /// Size and mtime of the source when it was compiled.
    pub source: FileIdentity,
    /// Digest of the source bytes that were compiled.
    pub source_digest: ContentDigest,
    /// Declared payload length.
    pub payload_len: u64,
    /// Checksum of the payload.
    pub payload_checksum: ContentDigest,
}

/// Outcome of comparing a stored header against current expectations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    /// Every field matches; the payload can be served.
    Fresh,
    /// Only the source mtime differs; a content digest check may still
    /// rescue the payload.
    MtimeChanged,
    /// A field that forces recompilation differs.
    Stale(StaleReason),
}

/// The first header field found to mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    /// Different platform or runtime.
    Environment,
    /// Different artifact kind or compile options.
    Options,
    /// Different source size.
    SourceSize,
}

impl StaleReason {
    /// Short label used in logs and inspection output.
    pub fn as_str(self) -> &'static str {
        match self {
            StaleReason::Environment => "environment",
            StaleReason::Options => "options",
            StaleReason::SourceSize => "source size",
        }
    }
}

/// Why a byte sequence could not be decoded as a header.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeaderDefect {
    /// Fewer than [`HEADER_LEN`] bytes.
    #[error("truncated header ({len} bytes)")]
    Truncated {
        /// Bytes available.
        len: usize,
    },
    /// The magic bytes do not match.
    #[error("missing magic bytes")]
    BadMagic,
    /// The format version is not the current one.
    #[error("unsupported format version {0}")]
    Version(u32),
}

impl ArtifactHeader {
    /// Builds a header describing `payload` compiled from a source with the
    /// given identity and digest.
    pub fn new(
        environment: u64,
        options: u64,
        source: FileIdentity,
        source_digest: ContentDigest,
        payload: &[u8],
    ) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            environment,
            options,
            source,
            source_digest,
            payload_len: payload.len() as u64,
            payload_checksum: ContentDigest::from_bytes(payload),
        }
    }

    /// Compares this header against the current environment, options and
    /// source identity.
    pub fn validity(&self, environment: u64, options: u64, source: FileIdentity) -> Validity {
        if self.environment != environment {
            Validity::Stale(StaleReason::Environment)
        } else if self.options != options {
            Validity::Stale(StaleReason::Options)
        } else if self.source.size != source.size {
            Validity::Stale(StaleReason::SourceSize)
        } else if self.source.mtime_ns != source.mtime_ns {
            Validity::MtimeChanged
        } else {
            Validity::Fresh
        }
    }

    /// Encodes the header into its fixed 64-byte layout.
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..4].copy_from_slice(&ARTIFACT_MAGIC);
        out[4..8].copy_from_slice(&self.format_version.to_le_bytes());
        out[8..16].copy_from_slice(&self.environment.to_le_bytes());
        out[16..24].copy_from_slice(&self.options.to_le_bytes());
        out[24..32].copy_from_slice(&self.source.size.to_le_bytes());
        out[32..40].copy_from_slice(&self.source.mtime_ns.to_le_bytes());
        out[40..48].copy_from_slice(&self.source_digest.as_u64().to_le_bytes());
        out[48..56].copy_from_slice(&self.payload_len.to_le_bytes());
        out[56..64].copy_from_slice(&self.payload_checksum.as_u64().to_le_bytes());
        out
    }

    /// Decodes a header from the first [`HEADER_LEN`] bytes of `raw`.
    pub fn decode(raw: &[u8]) -> Result<Self, HeaderDefect> {
        let Some(bytes) = raw.get(..HEADER_LEN) else {
            return Err(HeaderDefect::Truncated { len: raw.len() });
        };
        if bytes[0..4] != ARTIFACT_MAGIC {
            return Err(HeaderDefect::BadMagic);
        }
        let format_version = u32::from_le_bytes(field(bytes, 4));
        if format_version != ARTIFACT_FORMAT_VERSION {
            return Err(HeaderDefect::Version(format_version));
        }
        Ok(Self {
            format_version,
            environment: u64::from_le_bytes(field(bytes, 8)),
            options: u64::from_le_bytes(field(bytes, 16)),
            source: FileIdentity {
                size: u64::from_le_bytes(field(bytes, 24)),
                mtime_ns: i64::from_le_bytes(field(bytes, 32)),
            },
            source_digest: ContentDigest::from_raw(u64::from_le_bytes(field(bytes, 40))),
            payload_len: u64::from_le_bytes(field(bytes, 48)),
            payload_checksum: ContentDigest::from_raw(u64::from_le_bytes(field(bytes, 56))),
        })
    }
}

fn field<const N: usize>(bytes: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[offset..offset + N]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> FileIdentity {
        FileIdentity {
            size: 42,
            mtime_ns: 1_700_000_000_000_000_000,
        }
    }

    fn sample() -> ArtifactHeader {
        ArtifactHeader::new(
            0x1111,
            0x2222,
            identity(),
            ContentDigest::from_bytes(b"source"),
            b"payload",
        )
    }

    #[test]
    fn encode_decode_preserves_fields() {
        let header = sample();
        let decoded = ArtifactHeader::decode(&header.encode()).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(decoded.payload_len, 7);
    }

    #[test]
    fn fields_at_fixed_offsets() {
        let bytes = sample().encode();
        assert_eq!(&bytes[0..4], b"LODE");
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 1);
        assert_eq!(u64::from_le_bytes(bytes[8..16].try_into().unwrap()), 0x1111);
        assert_eq!(u64::from_le_bytes(bytes[16..24].try_into().unwrap()), 0x2222);
        assert_eq!(u64::from_le_bytes(bytes[24..32].try_into().unwrap()), 42);
        assert_eq!(u64::from_le_bytes(bytes[48..56].try_into().unwrap()), 7);
    }

    #[test]
    fn decode_truncated() {
        let bytes = sample().encode();
        assert_eq!(
            ArtifactHeader::decode(&bytes[..63]),
            Err(HeaderDefect::Truncated { len: 63 })
        );
    }

    #[test]
    fn decode_bad_magic() {
        let mut bytes = sample().encode();
        bytes[0] = b'X';
        assert_eq!(ArtifactHeader::decode(&bytes), Err(HeaderDefect::BadMagic));
    }

    #[test]
    fn decode_wrong_version() {
        let mut bytes = sample().encode();
        bytes[4..8].copy_from_slice(&999u32.to_le_bytes());
        assert_eq!(ArtifactHeader::decode(&bytes), Err(HeaderDefect::Version(999)));
    }

    #[test]
    fn validity_fresh() {
        assert_eq!(sample().validity(0x1111, 0x2222, identity()), Validity::Fresh);
    }

    #[test]
    fn validity_environment_checked_first() {
        let other = FileIdentity { size: 1, mtime_ns: 0 };
        assert_eq!(
            sample().validity(0x9999, 0x2222, other),
            Validity::Stale(StaleReason::Environment)
        );
    }

    #[test]
    fn validity_options_mismatch() {
        assert_eq!(
            sample().validity(0x1111, 0x3333, identity()),
            Validity::Stale(StaleReason::Options)
        );
    }

    #[test]
    fn validity_size_mismatch_is_stale() {
        let grown = FileIdentity { size: 43, ..identity() };
        assert_eq!(
            sample().validity(0x1111, 0x2222, grown),
            Validity::Stale(StaleReason::SourceSize)
        );
    }

    #[test]
    fn validity_mtime_only() {
        let touched = FileIdentity {
            mtime_ns: identity().mtime_ns + 1,
            ..identity()
        };
        assert_eq!(
            sample().validity(0x1111, 0x2222, touched),
            Validity::MtimeChanged
        );
    }
}
