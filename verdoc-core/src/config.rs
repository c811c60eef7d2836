//! TOML configuration. Every field has a default, so an empty file (or no
//! file at all) yields a working setup.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Versions with an id above this are stored as diffs from their parent.
    pub compression_threshold: u64,
    pub rebase_prefix: String,
    pub default_branch: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            compression_threshold: 5,
            rebase_prefix: "[rebased] ".to_string(),
            default_branch: "main".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Json,
    Sqlite,
}

impl Backend {
    pub fn as_str(&self) -> &str {
        match self {
            Backend::Json => "json",
            Backend::Sqlite => "sqlite",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "json" => Some(Backend::Json),
            "sqlite" => Some(Backend::Sqlite),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub path: PathBuf,
    pub backend: Backend,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("history.json"),
            backend: Backend::Json,
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("no config at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }
}
