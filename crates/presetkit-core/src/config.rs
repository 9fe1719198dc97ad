//! Config - TOML 設定ファイル
//!
//! ```toml
//! storage_dir = "./presets"
//! key = "retirement"
//! copy_suffix = " (copy)"
//! export_hint = "retirement"
//! log_level = "info"
//! ```
//!
//! すべての項目は省略可能で、省略時はデフォルト値になります。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::DEFAULT_COPY_SUFFIX;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PresetConfig {
    /// Directory holding one `<key>.json` file per store.
    pub storage_dir: PathBuf,
    pub key: String,
    pub copy_suffix: String,
    /// Base of the generated export file name.
    pub export_hint: String,
    pub log_level: String,
}

impl Default for PresetConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("./presets"),
            key: "presets".to_string(),
            copy_suffix: DEFAULT_COPY_SUFFIX.to_string(),
            export_hint: "presets".to_string(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl PresetConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Missing file means defaults; an unreadable or malformed one is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }
}
