//! Persistent configuration for nelly.
//!
//! Stores user settings in `~/.nelly/config.json`: which git binary to run,
//! the remote pushes and tracking default to, and the directory repositories
//! are cloned or initialized in. Command-line flags override these values.
//!
//! # Example
//!
//! ```no_run
//! use nelly_git::config::NellyConfig;
//!
//! // Load (returns defaults if file doesn't exist)
//! let config = NellyConfig::load();
//!
//! if let Some(remote) = &config.remote {
//!     println!("pushing to {}", remote);
//! }
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::GitError;

const CONFIG_FILENAME: &str = "config.json";

/// Returns the nelly settings directory (`~/.nelly`), if a home directory exists.
pub fn nelly_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".nelly"))
}

/// Persistent nelly configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NellyConfig {
    /// Path to the git executable. `git` on `PATH` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_binary: Option<PathBuf>,

    /// Remote used by `track` and `push` when a script names none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,

    /// Directory repositories are cloned or initialized in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workdir: Option<PathBuf>,
}

impl NellyConfig {
    /// Load config from `~/.nelly/config.json`.
    ///
    /// Returns [`Default`] if the file does not exist or cannot be parsed.
    pub fn load() -> Self {
        nelly_dir()
            .and_then(|dir| std::fs::read_to_string(dir.join(CONFIG_FILENAME)).ok())
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save config to `~/.nelly/config.json`, creating the directory if needed.
    pub fn save(&self) -> Result<(), GitError> {
        let dir = nelly_dir().ok_or_else(|| GitError::Config("could not determine home directory".to_string()))?;
        std::fs::create_dir_all(&dir)?;
        let json = serde_json::to_string_pretty(self).map_err(|e| GitError::Config(e.to_string()))?;
        std::fs::write(dir.join(CONFIG_FILENAME), json)?;
        Ok(())
    }
}
