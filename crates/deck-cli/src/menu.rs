//! Menu files.
//!
//! A menu file is TOML with three optional sections:
//!
//! ```toml
//! [commands.lint]
//! kind = "shell"
//! command = "cargo clippy"
//!
//! [[entries]]
//! label = "CI"
//! actions = [{ ref = "lint" }, { command = "cargo test" }]
//!
//! [tasks]
//! build = "cargo build --release"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use deck_core::{menu_path, CommandDictionary, ConfigError, MenuEntry};
use serde::Deserialize;

use crate::error::CliError;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MenuFile {
    /// Named command definitions, referenced from entries via `ref`.
    pub commands: CommandDictionary,

    /// Top-level menu entries.
    pub entries: Vec<MenuEntry>,

    /// Task name to shell command line, backing the local task catalog.
    pub tasks: BTreeMap<String, String>,
}

impl MenuFile {
    /// Parse a menu from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load a menu file.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let menu_error = |source| CliError::Menu {
            path: path.to_path_buf(),
            source,
        };
        let text =
            std::fs::read_to_string(path).map_err(|e| menu_error(ConfigError::Io(e.to_string())))?;
        Self::from_toml(&text).map_err(menu_error)
    }

    /// `explicit` if given, else the default menu location.
    pub fn resolve_path(explicit: Option<PathBuf>) -> Result<PathBuf, CliError> {
        explicit.or_else(menu_path).ok_or(CliError::NoMenu)
    }

    /// Find an entry by a `/`-separated label path.
    pub fn find(&self, label_path: &str) -> Option<&MenuEntry> {
        let path: Vec<&str> = label_path
            .split('/')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        MenuEntry::find(&self.entries, &path)
    }

    /// Render the menu as an indented tree.
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        MenuEntry::walk(&self.entries, &mut |depth, entry| {
            out.push_str(&"  ".repeat(depth));
            out.push_str(&entry.label);
            out.push_str(&describe(entry));
            out.push('\n');
        });
        out
    }
}

fn describe(entry: &MenuEntry) -> String {
    if entry.is_category() {
        return "/".to_string();
    }
    if let Some(actions) = &entry.actions {
        return format!("  ({} steps)", actions.len());
    }
    if let Some(parallel) = &entry.parallel {
        return format!("  ({} in parallel)", parallel.len());
    }
    match &entry.action.description {
        Some(description) => format!("  - {}", description),
        None => String::new(),
    }
}
