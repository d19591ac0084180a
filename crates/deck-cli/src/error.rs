//! Errors reported by the `deck` command.

use std::path::PathBuf;

use deck_core::{ActionError, ConfigError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Engine configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The menu file could not be read or parsed.
    #[error("Menu error in {path:?}: {source}")]
    Menu { path: PathBuf, source: ConfigError },

    /// No `--menu` was given and there is no default location.
    #[error("No menu file given and no config directory to look in")]
    NoMenu,

    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    /// The addressed entry has children and cannot run.
    #[error("'{0}' is a category; pick one of its entries")]
    Category(String),

    /// The entry declares nothing to run.
    #[error("'{0}' has no actions")]
    NothingToRun(String),

    #[error(transparent)]
    Action(#[from] ActionError),
}
