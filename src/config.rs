//! Interpreter limits and startup defaults.
//!
//! Values come from, in increasing priority: built-in defaults, a TOML file,
//! and command-line flags applied by the binary.

use crate::error::{Result, ShellError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Maximum number of live background jobs.
    pub max_jobs: usize,
    /// Maximum tokens in one argument sequence, before and after expansion.
    pub max_args: usize,
    /// Number of history lines kept.
    pub max_history: usize,
    /// How many times alias expansion may rewrite the head of one command.
    pub max_alias_depth: usize,
    /// Line printed after each processed command, for pipe-driven front ends.
    pub completion_marker: Option<String>,
    /// Aliases defined at startup, in name order.
    pub aliases: BTreeMap<String, String>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        let aliases = [
            ("ll", "ls -la"),
            ("la", "ls -la"),
            ("l", "ls -l"),
            ("...", "cd ../.."),
            ("grep", "grep --color=auto"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            max_jobs: 10,
            max_args: 64,
            max_history: 100,
            max_alias_depth: 16,
            completion_marker: None,
            aliases,
        }
    }
}

impl ShellConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ShellError::Config(e.to_string()))
    }

    /// Load an explicitly requested file; missing or malformed files are errors.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| ShellError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&text)
    }

    /// Load the per-user file if present, otherwise defaults.
    ///
    /// An unreadable or malformed implicit file is logged and ignored.
    pub fn load_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => {
                log::debug!("loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mysh").join("config.toml"))
    }
}
