//! Engine configuration, stored as JSON.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes:
//!
//! ```
//! use phonorule::config::EngineConfig;
//! use phonorule::word::Direction;
//!
//! let config = EngineConfig::from_json_str(r#"{
//!     "rule_seed": 7,
//!     "syllable": { "nucleus_direction": "leftward" }
//! }"#).unwrap();
//!
//! assert_eq!(config.rule_seed, Some(7));
//! assert_eq!(config.max_persistent_passes, 64);
//! assert_eq!(config.syllable.nucleus_direction, Some(Direction::Leftward));
//! assert_eq!(config.syllable.max_candidates, 32);
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::rule::DEFAULT_MAX_PERSISTENT_PASSES;
use crate::word::Direction;

/// Default cap on syllable candidates per word.
pub const DEFAULT_MAX_CANDIDATES: usize = 32;

/// Errors raised while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("Failed to access config file {}: {source}", .path.display())]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The JSON was malformed or had the wrong shape.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A specialized `Result` type for configuration.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Syllabification settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyllableConfig {
    /// Prefer covers whose nuclei sit further toward this end of the word.
    pub nucleus_direction: Option<Direction>,
    /// Give up on words producing more candidates than this.
    pub max_candidates: usize,
}

impl Default for SyllableConfig {
    fn default() -> Self {
        Self {
            nucleus_direction: None,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }
}

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed for the rules' stochastic gates; entropy when unset.
    pub rule_seed: Option<u64>,
    /// Cap on persistent-rule passes after one application event.
    pub max_persistent_passes: usize,
    /// Syllabification settings.
    pub syllable: SyllableConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rule_seed: None,
            max_persistent_passes: DEFAULT_MAX_PERSISTENT_PASSES,
            syllable: SyllableConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render as pretty JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Write this config as a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json_string()?).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
