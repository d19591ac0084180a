//! Menu entries and command definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::action::ActionSpec;

/// A named, reusable action template.
pub type CommandDefinition = ActionSpec;

/// Command definitions keyed by name, referenced from entries via `ref`.
pub type CommandDictionary = HashMap<String, CommandDefinition>;

/// A node in the action menu.
///
/// An entry with children is a category and never executes. Otherwise it
/// declares one action inline (or by `ref`), an ordered `actions` list, or a
/// `parallel` set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuEntry {
    /// Display text.
    pub label: String,

    /// Child entries. Non-empty makes this entry a category.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuEntry>,

    /// Inline action fields (kind, command, ref, sessionName, ...).
    #[serde(flatten)]
    pub action: ActionSpec,

    /// Ordered actions run one after another.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<ActionSpec>>,

    /// Actions launched side by side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel: Option<Vec<ActionSpec>>,

    /// Keep going after a failed step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continue_on_error: Option<bool>,
}

impl MenuEntry {
    /// Create an entry with a label and nothing else.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Check if this entry is a category.
    pub fn is_category(&self) -> bool {
        !self.children.is_empty()
    }

    /// Find an entry by its label path, e.g. `["Build", "Release"]`.
    pub fn find<'a, S: AsRef<str>>(entries: &'a [MenuEntry], path: &[S]) -> Option<&'a MenuEntry> {
        let (first, rest) = path.split_first()?;
        let entry = entries.iter().find(|e| e.label == first.as_ref())?;
        if rest.is_empty() {
            Some(entry)
        } else {
            Self::find(&entry.children, rest)
        }
    }

    /// Visit every entry depth-first with its nesting depth.
    pub fn walk<'a, F>(entries: &'a [MenuEntry], f: &mut F)
    where
        F: FnMut(usize, &'a MenuEntry),
    {
        fn walk_at<'a, F>(entries: &'a [MenuEntry], depth: usize, f: &mut F)
        where
            F: FnMut(usize, &'a MenuEntry),
        {
            for entry in entries {
                f(depth, entry);
                walk_at(&entry.children, depth + 1, f);
            }
        }
        walk_at(entries, 0, f);
    }
}
