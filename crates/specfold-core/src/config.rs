use serde::{Deserialize, Serialize};
use std::path::Path;

use specfold_util::errors::{SpecError, SpecResult};

/// Top-level configuration file layout (`specfold.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    normalize: NormalizeConfig,
}

/// Settings from `[normalize]` that shape normalization output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeConfig {
    /// Joins merged provenance strings, e.g. `bar and qux`.
    #[serde(default = "default_source_separator", rename = "source-separator")]
    pub source_separator: String,

    /// Treat sources that differ only in case as the same source.
    #[serde(default, rename = "fold-source-case")]
    pub fold_source_case: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            source_separator: default_source_separator(),
            fold_source_case: false,
        }
    }
}

fn default_source_separator() -> String {
    " and ".to_string()
}

impl NormalizeConfig {
    /// Parse the `[normalize]` table out of a TOML document.
    pub fn from_toml_str(content: &str) -> SpecResult<Self> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| SpecError::Config {
            message: format!("Failed to parse config: {e}"),
        })?;
        Ok(file.normalize)
    }

    /// Load configuration from `path`, or return defaults if the file doesn't exist.
    pub fn load(path: &Path) -> SpecResult<Self> {
        if !path.is_file() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!("loaded normalize config from {}", path.display());
        Ok(config)
    }
}
