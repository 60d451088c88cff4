//! Configuration handling
//!
//! Settings come from an optional TOML file (`taskgrove.toml` by default)
//! and can be overridden by CLI flags. Every field has a default that
//! mirrors the behavior of the persisted data this tracker inherits.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::DEFAULT_ID_LENGTH;

/// Runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP server binds to
    pub bind_addr: String,

    /// Directory holding `groups.json` and `tasks.json`
    pub data_dir: PathBuf,

    /// Limit applied to list endpoints when the request supplies none;
    /// absent means unlimited
    pub default_limit: Option<usize>,

    /// Hex characters kept from the SHA-1 task digest (1..=40)
    ///
    /// Short ids collide sooner: at the default of 5 a collision is
    /// expected after roughly a thousand distinct task texts.
    pub task_id_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            data_dir: PathBuf::from("."),
            default_limit: None,
            task_id_length: DEFAULT_ID_LENGTH,
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file, falling back to defaults when
    /// the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the rest of the system cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.task_id_length == 0 || self.task_id_length > 40 {
            bail!(
                "task_id_length must be between 1 and 40, got {}",
                self.task_id_length
            );
        }
        if self.bind_addr.is_empty() {
            bail!("bind_addr must not be empty");
        }
        Ok(())
    }
}
