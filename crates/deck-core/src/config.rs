//! Configuration types.
//!
//! Engine settings live in `<config dir>/deck/config.toml`. Every field has
//! a default, so a missing file or a partial file is fine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Session name used when neither an entry nor its actions name one.
pub const DEFAULT_SESSION_NAME: &str = "Actions";

/// Runtime configuration for the action engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fallback session name for shell actions.
    pub default_session_name: String,

    /// Shell operator used to chain grouped commands, e.g. "&&".
    pub and_operator: String,

    /// Prefix for index-based session names in parallel runs.
    pub parallel_session_prefix: String,

    /// Default policy for entries that don't set `continueOnError`.
    pub continue_on_error: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_session_name: DEFAULT_SESSION_NAME.to_string(),
            and_operator: "&&".to_string(),
            parallel_session_prefix: "Parallel".to_string(),
            continue_on_error: false,
        }
    }
}

impl EngineConfig {
    /// Join commands into one shell line with the AND operator.
    pub fn chain_commands<S: AsRef<str>>(&self, commands: &[S]) -> String {
        let separator = format!(" {} ", self.and_operator);
        commands
            .iter()
            .map(|c| c.as_ref())
            .collect::<Vec<_>>()
            .join(&separator)
    }

    /// Session name for the action at `index` of a parallel run.
    pub fn parallel_session_name(&self, index: usize) -> String {
        format!("{} {}", self.parallel_session_prefix, index + 1)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml(&text)
    }

    /// Load from `path`, or use defaults when there is no path at all.
    pub fn load_optional(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from the default location.
    ///
    /// Without a config directory this yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_optional(config_path().as_deref())
    }
}

/// Get the config directory path.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("deck"))
}

/// Get the path to config.toml.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("config.toml"))
}

/// Get the path to the default menu file.
pub fn menu_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("menu.toml"))
}
