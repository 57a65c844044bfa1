use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Tunables for blob sources, kept in-crate rather than as a separate
/// config crate since the surface here is small: a handful of defaults
/// consumed by file-backed and generated blobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BlobConfig {
    /// Root directories the file provider is allowed to serve from.
    pub root_paths: Vec<PathBuf>,
    /// Chunk size used when an appendable blob's producer has no natural
    /// chunk boundary of its own (e.g. procedural pixel generation).
    pub chunk_size: usize,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            root_paths: Vec::new(),
            chunk_size: 16 * 1024,
        }
    }
}

impl BlobConfig {
    /// Loads configuration from a TOML-formatted section, falling back to
    /// defaults for anything unset. Mirrors `lgn_config::Config::from_toml`'s
    /// "never fail on a missing optional field" stance.
    pub fn from_toml_str(s: &str) -> Result<Self, config::ConfigError> {
        let c = config::Config::builder()
            .add_source(config::File::from_str(s, config::FileFormat::Toml))
            .build()?;
        c.try_deserialize()
    }
}
