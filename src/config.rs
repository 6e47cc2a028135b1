//! Configuration loaded once at startup from a YAML file.
//!
//! Every section and field has a default, so a partial file (or no file at
//! all) is valid. The loaded value is immutable and handed by reference to
//! the detector, extractor, naming, and safety constructors.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analysis::{Category, MAX_CHARS_DEFAULT};
use crate::error::{Error, Result};

pub const ENV_CONFIG_FILE: &str = "CONFIG_FILE";
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
pub const DEFAULT_COUNT: usize = 3;
pub const DEFAULT_CASE: &str = "snake_case";
pub const MAX_FILENAME_LENGTH: usize = 50;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub detection: DetectionConfig,
    pub cost_management: CostConfig,
    pub naming: NamingConfig,
    pub safety: SafetyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Excerpt bound in characters
    pub max_chars: usize,
    pub enable_ocr: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_chars: MAX_CHARS_DEFAULT,
            enable_ocr: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Consult the system `file` tool
    pub use_mime: bool,
    /// Extra suffix → category entries, e.g. `toml: config`
    pub extensions: HashMap<String, Category>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            use_mime: true,
            extensions: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    /// Warn when a single file's estimated cost exceeds this (USD)
    pub target_cost_per_file: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            target_cost_per_file: 0.05,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub default_count: usize,
    pub default_case: String,
    pub max_filename_length: usize,
    /// Upper bound on concurrent API calls
    pub max_concurrent: usize,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            default_count: DEFAULT_COUNT,
            default_case: DEFAULT_CASE.to_string(),
            max_filename_length: MAX_FILENAME_LENGTH,
            max_concurrent: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// On a name collision, rename to a numbered alternative instead of skipping
    pub prevent_overwrites: bool,
    /// Ask before renaming and let the user pick a suggestion per file
    pub confirm_renames: bool,
    pub create_backups: bool,
    pub backup_dir: PathBuf,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            prevent_overwrites: true,
            confirm_renames: true,
            create_backups: false,
            backup_dir: PathBuf::from(".backups"),
        }
    }
}

impl Config {
    /// Parse a YAML document
    pub fn from_yaml(text: &str) -> Result<Self> {
        // An empty document deserializes to unit, not a mapping
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_yaml(&text)
    }

    /// Load configuration, falling back to defaults with a warning
    pub fn load_or_default(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(config) => {
                tracing::info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!(
                    "Could not load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }
}
