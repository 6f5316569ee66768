//! Artifact kinds and the fingerprints that scope their validity.

use std::fmt;
use std::sync::Arc;

use xxhash_rust::xxh3::Xxh3;

/// A compiler callback: source bytes in, payload bytes out.
pub type CompileFn<E> = Arc<dyn Fn(&[u8]) -> Result<Vec<u8>, E> + Send + Sync>;

/// The fixed set of artifact kinds, each carrying its own compiler callback
/// and the inputs that feed its compile-option fingerprint.
///
/// Each kind is stored in its own namespace so that a code artifact and a
/// document artifact for the same source never share a slot.
pub enum ArtifactKind<E> {
    /// Compiled code (e.g. bytecode).
    Code {
        /// Source-to-bytecode compiler.
        compile: CompileFn<E>,
        /// Every compiler flag that changes the output.
        flags: Vec<String>,
    },
    /// A structured document parsed and re-serialized into a faster format.
    Document {
        /// Document parser.
        parse: CompileFn<E>,
        /// Document format name (e.g. `"yaml"`, `"json"`).
        format: String,
        /// Every parser option that changes the output.
        flags: Vec<String>,
    },
}

impl<E> ArtifactKind<E> {
    /// Creates a code kind with no flags.
    pub fn code<F>(compile: F) -> Self
    where
        F: Fn(&[u8]) -> Result<Vec<u8>, E> + Send + Sync + 'static,
    {
        ArtifactKind::Code {
            compile: Arc::new(compile),
            flags: Vec::new(),
        }
    }

    /// Creates a document kind for the given format with no flags.
    pub fn document<F>(format: impl Into<String>, parse: F) -> Self
    where
        F: Fn(&[u8]) -> Result<Vec<u8>, E> + Send + Sync + 'static,
    {
        ArtifactKind::Document {
            parse: Arc::new(parse),
            format: format.into(),
            flags: Vec::new(),
        }
    }

    /// Adds an output-shaping flag.
    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        match &mut self {
            ArtifactKind::Code { flags, .. } | ArtifactKind::Document { flags, .. } => {
                flags.push(flag.into());
            }
        }
        self
    }

    /// Name of the storage namespace for this kind.
    pub fn namespace(&self) -> &'static str {
        match self {
            ArtifactKind::Code { .. } => CODE_NAMESPACE,
            ArtifactKind::Document { .. } => DOCUMENT_NAMESPACE,
        }
    }

    /// Fingerprint of the kind and every option that shapes its output.
    pub fn options_fingerprint(&self) -> u64 {
        let mut hasher = Xxh3::new();
        match self {
            ArtifactKind::Code { flags, .. } => {
                hasher.update(b"code");
                hash_strings(&mut hasher, flags);
            }
            ArtifactKind::Document { format, flags, .. } => {
                hasher.update(b"document");
                hash_strings(&mut hasher, std::slice::from_ref(format));
                hash_strings(&mut hasher, flags);
            }
        }
        hasher.digest()
    }

    /// Runs the kind's compiler callback.
    pub fn run(&self, source: &[u8]) -> Result<Vec<u8>, E> {
        match self {
            ArtifactKind::Code { compile, .. } => compile(source),
            ArtifactKind::Document { parse, .. } => parse(source),
        }
    }
}

impl<E> Clone for ArtifactKind<E> {
    fn clone(&self) -> Self {
        match self {
            ArtifactKind::Code { compile, flags } => ArtifactKind::Code {
                compile: Arc::clone(compile),
                flags: flags.clone(),
            },
            ArtifactKind::Document {
                parse,
                format,
                flags,
            } => ArtifactKind::Document {
                parse: Arc::clone(parse),
                format: format.clone(),
                flags: flags.clone(),
            },
        }
    }
}

impl<E> fmt::Debug for ArtifactKind<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Code { flags, .. } => {
                f.debug_struct("Code").field("flags", flags).finish_non_exhaustive()
            }
            ArtifactKind::Document { format, flags, .. } => f
                .debug_struct("Document")
                .field("format", format)
                .field("flags", flags)
                .finish_non_exhaustive(),
        }
    }
}

/// Namespace directory for code artifacts.
pub const CODE_NAMESPACE: &str = "code";

/// Namespace directory for document artifacts.
pub const DOCUMENT_NAMESPACE: &str = "document";

fn hash_strings(hasher: &mut Xxh3, values: &[String]) {
    hasher.update(&(values.len() as u64).to_le_bytes());
    for value in values {
        hasher.update(&(value.len() as u64).to_le_bytes());
        hasher.update(value.as_bytes());
    }
}

/// Fingerprint of the platform and runtime producing artifacts.
///
/// Covers the lode version, target OS, architecture and pointer width, plus
/// a caller-supplied tag identifying the host runtime (e.g. its version and
/// build revision).
pub fn environment_fingerprint(runtime_tag: &str) -> u64 {
    let mut hasher = Xxh3::new();
    let parts = [
        env!("CARGO_PKG_VERSION").to_string(),
        std::env::consts::OS.to_string(),
        std::env::consts::ARCH.to_string(),
        std::env::consts::FAMILY.to_string(),
        usize::BITS.to_string(),
        runtime_tag.to_string(),
    ];
    hash_strings(&mut hasher, &parts);
    hasher.digest()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper() -> ArtifactKind<std::convert::Infallible> {
        ArtifactKind::code(|src: &[u8]| Ok(src.to_ascii_uppercase()))
    }

    #[test]
    fn run_dispatches_to_callback() {
        assert_eq!(upper().run(b"abc").unwrap(), b"ABC");
        let doc: ArtifactKind<std::convert::Infallible> =
            ArtifactKind::document("json", |src: &[u8]| Ok(src.iter().rev().copied().collect()));
        assert_eq!(doc.run(b"abc").unwrap(), b"cba");
    }

    #[test]
    fn namespaces_differ() {
        let doc: ArtifactKind<std::convert::Infallible> =
            ArtifactKind::document("yaml", |src: &[u8]| Ok(src.to_vec()));
        assert_eq!(upper().namespace(), "code");
        assert_eq!(doc.namespace(), "document");
    }

    #[test]
    fn flags_change_fingerprint() {
        let plain = upper().options_fingerprint();
        let flagged = upper().with_flag("optimize").options_fingerprint();
        assert_ne!(plain, flagged);
        assert_eq!(flagged, upper().with_flag("optimize").options_fingerprint());
    }

    #[test]
    fn flag_boundaries_are_unambiguous() {
        let a = upper().with_flag("ab").with_flag("c").options_fingerprint();
        let b = upper().with_flag("a").with_flag("bc").options_fingerprint();
        assert_ne!(a, b);
    }

    #[test]
    fn document_format_changes_fingerprint() {
        let yaml: ArtifactKind<std::convert::Infallible> =
            ArtifactKind::document("yaml", |src: &[u8]| Ok(src.to_vec()));
        let json: ArtifactKind<std::convert::Infallible> =
            ArtifactKind::document("json", |src: &[u8]| Ok(src.to_vec()));
        assert_ne!(yaml.options_fingerprint(), json.options_fingerprint());
    }

    #[test]
    fn environment_fingerprint_depends_on_tag() {
        assert_eq!(environment_fingerprint("rt-1"), environment_fingerprint("rt-1"));
        assert_ne!(environment_fingerprint("rt-1"), environment_fingerprint("rt-2"));
    }

    #[test]
    fn clone_shares_callback() {
        let kind = upper().with_flag("x");
        let copy = kind.clone();
        assert_eq!(copy.options_fingerprint(), kind.options_fingerprint());
        assert_eq!(copy.run(b"q").unwrap(), b"Q");
    }
}
