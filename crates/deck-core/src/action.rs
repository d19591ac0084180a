//! Action-related types.
//!
//! An [`ActionSpec`] is an action as authored in a menu file: every field is
//! optional and it may point at a named command definition via `ref`. A
//! [`ResolvedAction`] is what the engine executes: the kind is settled and
//! references are already looked up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ActionError;

/// The closed set of things an action can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Send a command line to an interactive shell session.
    #[serde(rename = "shell")]
    ShellCommand,

    /// Invoke a command through the host's command dispatcher.
    #[serde(rename = "command")]
    EditorCommand,

    /// Run a named task from the host's task catalog.
    #[serde(rename = "task")]
    BuildTask,

    /// Open a path inside an isolated (container) environment.
    #[serde(rename = "isolated")]
    OpenInIsolatedEnvironment,

    /// Open a path on a remote host.
    #[serde(rename = "remote")]
    OpenOverRemoteLink,
}

impl ActionKind {
    /// The string used for this kind in menu files.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::ShellCommand => "shell",
            ActionKind::EditorCommand => "command",
            ActionKind::BuildTask => "task",
            ActionKind::OpenInIsolatedEnvironment => "isolated",
            ActionKind::OpenOverRemoteLink => "remote",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shell" => Ok(ActionKind::ShellCommand),
            "command" => Ok(ActionKind::EditorCommand),
            "task" => Ok(ActionKind::BuildTask),
            "isolated" => Ok(ActionKind::OpenInIsolatedEnvironment),
            "remote" => Ok(ActionKind::OpenOverRemoteLink),
            other => Err(ActionError::UnknownActionType(other.to_string())),
        }
    }
}

/// An action as declared in configuration.
///
/// Also used as the body of a named command definition, in which case
/// `reference` is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionSpec {
    /// Kind string (`shell`, `command`, `task`, `isolated`, `remote`).
    /// Inferred from the other fields when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Name of a command definition to use as the base of this action.
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<serde_json::Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ActionSpec {
    /// An inline shell action.
    pub fn shell(command: impl Into<String>) -> Self {
        Self {
            kind: Some(ActionKind::ShellCommand.as_str().to_string()),
            command: Some(command.into()),
            ..Self::default()
        }
    }

    /// A reference to a named command definition.
    pub fn reference(name: impl Into<String>) -> Self {
        Self {
            reference: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the target session name.
    pub fn in_session(mut self, name: impl Into<String>) -> Self {
        self.session_name = Some(name.into());
        self
    }

    /// True if no field that could produce an action is set.
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.reference.is_none()
            && self.command.is_none()
            && self.path.is_none()
            && self.host.is_none()
    }

    /// Work out the kind of this action.
    ///
    /// An explicit `kind` wins. Otherwise `host` means a remote link,
    /// `path` an isolated environment and `command` a shell command.
    /// Returns `Ok(None)` when nothing identifies a kind.
    pub fn inferred_kind(&self) -> Result<Option<ActionKind>, ActionError> {
        if let Some(kind) = &self.kind {
            return kind.parse().map(Some);
        }
        if self.host.is_some() {
            return Ok(Some(ActionKind::OpenOverRemoteLink));
        }
        if self.path.is_some() {
            return Ok(Some(ActionKind::OpenInIsolatedEnvironment));
        }
        if self.command.is_some() {
            return Ok(Some(ActionKind::ShellCommand));
        }
        Ok(None)
    }

    /// Fill every unset field of `self` from `base`.
    ///
    /// Used when an action carries both a `ref` and local overrides.
    pub fn overlay_on(&self, base: &ActionSpec) -> ActionSpec {
        ActionSpec {
            kind: self.kind.clone().or_else(|| base.kind.clone()),
            reference: None,
            command: self.command.clone().or_else(|| base.command.clone()),
            session_name: self
                .session_name
                .clone()
                .or_else(|| base.session_name.clone()),
            arguments: self.arguments.clone().or_else(|| base.arguments.clone()),
            working_directory: self
                .working_directory
                .clone()
                .or_else(|| base.working_directory.clone()),
            path: self.path.clone().or_else(|| base.path.clone()),
            host: self.host.clone().or_else(|| base.host.clone()),
            description: self
                .description
                .clone()
                .or_else(|| base.description.clone()),
        }
    }
}

/// A fully-specified action ready for execution.
///
/// Which optional fields matter depends on `kind`; the dispatcher validates
/// the ones it needs before touching the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAction {
    pub kind: ActionKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Target session (shell actions only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_name: Option<String>,

    /// Passed through verbatim to the command dispatcher.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<serde_json::Value>,

    /// Applied only when a session has to be created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ResolvedAction {
    /// Create an action of the given kind with no fields set.
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            command: None,
            session_name: None,
            arguments: Vec::new(),
            working_directory: None,
            path: None,
            host: None,
            description: None,
        }
    }

    /// Build a resolved action from a spec whose kind is already known.
    pub fn from_spec(kind: ActionKind, spec: &ActionSpec) -> Self {
        Self {
            kind,
            command: spec.command.clone(),
            session_name: spec.session_name.clone(),
            arguments: spec.arguments.clone().unwrap_or_default(),
            working_directory: spec.working_directory.clone(),
            path: spec.path.clone(),
            host: spec.host.clone(),
            description: spec.description.clone(),
        }
    }

    pub fn shell(command: impl Into<String>) -> Self {
        Self {
            command: Some(command.into()),
            ..Self::new(ActionKind::ShellCommand)
        }
    }

    pub fn editor(command: impl Into<String>, arguments: Vec<serde_json::Value>) -> Self {
        Self {
            command: Some(command.into()),
            arguments,
            ..Self::new(ActionKind::EditorCommand)
        }
    }

    pub fn task(name: impl Into<String>) -> Self {
        Self {
            command: Some(name.into()),
            ..Self::new(ActionKind::BuildTask)
        }
    }

    pub fn isolated(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::new(ActionKind::OpenInIsolatedEnvironment)
        }
    }

    pub fn remote(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            path: Some(path.into()),
            ..Self::new(ActionKind::OpenOverRemoteLink)
        }
    }

    /// Set the target session name.
    pub fn in_session(mut self, name: impl Into<String>) -> Self {
        self.session_name = Some(name.into());
        self
    }

    /// Set the working directory hint.
    pub fn in_directory(mut self, dir: impl Into<String>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    pub fn is_shell(&self) -> bool {
        self.kind == ActionKind::ShellCommand
    }

    /// Session name, falling back to `default` when unset.
    pub fn session_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.session_name.as_deref().unwrap_or(default)
    }

    /// Short human-readable label for progress and error reporting.
    pub fn label(&self) -> String {
        if let Some(description) = &self.description {
            return description.clone();
        }
        match self.kind {
            ActionKind::OpenInIsolatedEnvironment => {
                self.path.clone().unwrap_or_else(|| self.kind.to_string())
            }
            ActionKind::OpenOverRemoteLink => match (&self.host, &self.path) {
                (Some(host), Some(path)) => format!("{}:{}", host, path),
                _ => self.kind.to_string(),
            },
            _ => self.command.clone().unwrap_or_else(|| self.kind.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip_strings() {
        for kind in [
            ActionKind::ShellCommand,
            ActionKind::EditorCommand,
            ActionKind::BuildTask,
            ActionKind::OpenInIsolatedEnvironment,
            ActionKind::OpenOverRemoteLink,
        ] {
            assert_eq!(kind.as_str().parse::<ActionKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_kind_is_named() {
        let err = "launch".parse::<ActionKind>().unwrap_err();
        assert_eq!(err, ActionError::UnknownActionType("launch".to_string()));
        assert!(err.to_string().contains("launch"));
    }

    #[test]
    fn test_inferred_kind() {
        let remote = ActionSpec {
            host: Some("box".to_string()),
            path: Some("/srv".to_string()),
            ..ActionSpec::default()
        };
        assert_eq!(
            remote.inferred_kind().unwrap(),
            Some(ActionKind::OpenOverRemoteLink)
        );

        let isolated = ActionSpec {
            path: Some("/work".to_string()),
            ..ActionSpec::default()
        };
        assert_eq!(
            isolated.inferred_kind().unwrap(),
            Some(ActionKind::OpenInIsolatedEnvironment)
        );

        let shell = ActionSpec {
            command: Some("make".to_string()),
            ..ActionSpec::default()
        };
        assert_eq!(shell.inferred_kind().unwrap(), Some(ActionKind::ShellCommand));

        assert_eq!(ActionSpec::default().inferred_kind().unwrap(), None);
    }

    #[test]
    fn test_explicit_kind_wins_over_inference() {
        let spec = ActionSpec {
            kind: Some("task".to_string()),
            command: Some("build".to_string()),
            path: Some("/ignored".to_string()),
            ..ActionSpec::default()
        };
        assert_eq!(spec.inferred_kind().unwrap(), Some(ActionKind::BuildTask));
    }

    #[test]
    fn test_overlay_prefers_local_fields() {
        let base = ActionSpec::shell("cargo test").in_session("tests");
        let local = ActionSpec {
            reference: Some("test".to_string()),
            working_directory: Some("/repo".to_string()),
            session_name: Some("ci".to_string()),
            ..ActionSpec::default()
        };

        let merged = local.overlay_on(&base);
        assert_eq!(merged.command.as_deref(), Some("cargo test"));
        assert_eq!(merged.session_name.as_deref(), Some("ci"));
        assert_eq!(merged.working_directory.as_deref(), Some("/repo"));
        assert_eq!(merged.kind.as_deref(), Some("shell"));
        assert!(merged.reference.is_none());
    }

    #[test]
    fn test_label_fallbacks() {
        assert_eq!(ResolvedAction::shell("make").label(), "make");
        assert_eq!(ResolvedAction::remote("box", "/srv").label(), "box:/srv");
        assert_eq!(ResolvedAction::isolated("/work").label(), "/work");
        assert_eq!(ResolvedAction::new(ActionKind::BuildTask).label(), "task");

        let mut described = ResolvedAction::task("build");
        described.description = Some("Build everything".to_string());
        assert_eq!(described.label(), "Build everything");
    }

    #[test]
    fn test_spec_deserializes_camel_case_and_ref() {
        let json = r#"{"ref":"lint","sessionName":"ci","workingDirectory":"/repo"}"#;
        let spec: ActionSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.reference.as_deref(), Some("lint"));
        assert_eq!(spec.session_name.as_deref(), Some("ci"));
        assert_eq!(spec.working_directory.as_deref(), Some("/repo"));
    }
}
