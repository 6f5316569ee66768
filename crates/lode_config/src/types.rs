//! Configuration types deserialized from `lode.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::time::Duration;

/// Default freshness window for volatile directories, in seconds.
pub const DEFAULT_FRESHNESS_WINDOW_SECS: u64 = 30;

/// The top-level configuration parsed from `lode.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct LodeConfig {
    /// Compiled-artifact cache settings.
    pub cache: CacheConfig,
    /// Search-path resolution settings.
    #[serde(default)]
    pub search: SearchConfig,
}

impl LodeConfig {
    /// Creates a configuration with the given storage root and default settings.
    ///
    /// Intended for embedding callers that configure lode in code rather than
    /// through a `lode.toml` file.
    pub fn new(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            cache: CacheConfig::new(storage_root),
            search: SearchConfig::default(),
        }
    }
}

/// Settings for the artifact store and compiled-artifact cache.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Directory holding slot files. Created if absent.
    pub storage_root: PathBuf,
    /// Never write artifacts; serve hits and compile on misses.
    #[serde(default)]
    pub readonly: bool,
    /// Reuse a stored artifact when only the source mtime changed but its
    /// content digest still matches. Off by default: any mtime change
    /// recompiles.
    #[serde(default)]
    pub revalidate: bool,
    /// Extra runtime identity mixed into the environment fingerprint.
    #[serde(default)]
    pub environment_tag: String,
}

impl CacheConfig {
    /// Creates cache settings with the given storage root and defaults.
    pub fn new(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            storage_root: storage_root.into(),
            readonly: false,
            revalidate: false,
            environment_tag: String::new(),
        }
    }
}

/// Settings for the directory index and path search coordinator.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Default ordered search path.
    #[serde(default)]
    pub path: Vec<PathBuf>,
    /// Absolute prefixes whose directories are stable for the process lifetime.
    #[serde(default)]
    pub trusted_roots: Vec<PathBuf>,
    /// Candidate extensions tried after the bare name, in priority order.
    ///
    /// Accepts either a single string or a list of strings.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub extensions: Vec<String>,
    /// Seconds after which a volatile directory listing is revalidated.
    #[serde(default = "default_freshness_window_secs")]
    pub freshness_window_secs: u64,
    /// Directory basenames that are never listed or searched.
    #[serde(default)]
    pub ignore_dirs: Vec<String>,
    /// Persist the directory index snapshot through the artifact store.
    #[serde(default)]
    pub persist_index: bool,
}

impl SearchConfig {
    /// Returns the freshness window as a [`Duration`].
    pub fn freshness_window(&self) -> Duration {
        Duration::from_secs(self.freshness_window_secs)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            path: Vec::new(),
            trusted_roots: Vec::new(),
            extensions: Vec::new(),
            freshness_window_secs: DEFAULT_FRESHNESS_WINDOW_SECS,
            ignore_dirs: Vec::new(),
            persist_index: false,
        }
    }
}

fn default_freshness_window_secs() -> u64 {
    DEFAULT_FRESHNESS_WINDOW_SECS
}

/// Deserializes a field that can be either a single string or a list of strings.
///
/// Allows `extensions = ".src"` as shorthand for `extensions = [".src"]`.
fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_defaults() {
        let config = LodeConfig::new("/var/cache/lode");
        assert_eq!(config.cache.storage_root, PathBuf::from("/var/cache/lode"));
        assert!(!config.cache.readonly);
        assert!(!config.cache.revalidate);
        assert_eq!(config.search.freshness_window(), Duration::from_secs(30));
        assert!(config.search.path.is_empty());
    }

    #[test]
    fn extensions_accept_single_string() {
        let config: LodeConfig = toml::from_str(
            r#"
[cache]
storage_root = "/c"

[search]
extensions = ".src"
"#,
        )
        .unwrap();
        assert_eq!(config.search.extensions, vec![".src"]);
    }

    #[test]
    fn extensions_accept_list() {
        let config: LodeConfig = toml::from_str(
            r#"
[cache]
storage_root = "/c"

[search]
extensions = [".src", ".so"]
"#,
        )
        .unwrap();
        assert_eq!(config.search.extensions, vec![".src", ".so"]);
    }

    #[test]
    fn freshness_window_configurable() {
        let config: LodeConfig = toml::from_str(
            r#"
[cache]
storage_root = "/c"

[search]
freshness_window_secs = 5
"#,
        )
        .unwrap();
        assert_eq!(config.search.freshness_window(), Duration::from_secs(5));
    }
}
