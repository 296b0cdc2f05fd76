// Global configuration file for the sync service.
//
// Lives at `~/.wikivault/config.toml`. Everything has a sensible default;
// a missing or unparseable file never blocks startup.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::git::engine::EngineConfig;
use crate::settings::global_dir;

/// Path to the global config file: `~/.wikivault/config.toml`.
pub fn global_config_path() -> Option<PathBuf> {
    global_dir().map(|dir| dir.join("config.toml"))
}

/// Global sync configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GlobalConfig {
    /// Branch used when a workspace has no explicit branch configured.
    pub default_branch: String,
    /// Git remote name.
    pub remote_name: String,
    /// URL probed to decide whether the machine is online.
    pub probe_url: String,
    /// Commit message override for backup commits.
    pub commit_message: Option<String>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            default_branch: "main".into(),
            remote_name: "origin".into(),
            probe_url: "https://github.com".into(),
            commit_message: None,
        }
    }
}

impl GlobalConfig {
    /// Load from `~/.wikivault/config.toml`. Returns defaults if the file
    /// doesn't exist or can't be parsed.
    pub fn load() -> Self {
        global_config_path().and_then(|path| Self::load_from(&path).ok()).unwrap_or_default()
    }

    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&contents).map_err(ConfigError::Parse)
    }

    /// Save to a specific path (creates parent directories).
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        let contents = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }

    /// Engine configuration derived from this config.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            remote_name: self.remote_name.clone(),
            default_branch: self.default_branch.clone(),
            commit_message: self.commit_message.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(std::io::Error),

    #[error("config parse error: {0}")]
    Parse(toml::de::Error),

    #[error("config serialize error: {0}")]
    Serialize(toml::ser::Error),
}
