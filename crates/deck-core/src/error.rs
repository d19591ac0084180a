//! Error types for the deck action runner.

use serde::Serialize;
use thiserror::Error;

use crate::action::ActionKind;

/// A rejection reported by the host environment.
///
/// Hosts are opaque to the engine, so only the message survives.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct HostError(pub String);

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Result type alias for host operations.
pub type HostResult<T> = Result<T, HostError>;

/// Errors raised while resolving or executing actions.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ActionError {
    /// A kind that needs a command string was given none.
    #[error("{kind} action has no command")]
    MissingCommand { kind: ActionKind },

    /// The declared kind is not one of the known kinds.
    #[error("Unknown action type: {0}")]
    UnknownActionType(String),

    /// A `ref` names no command definition.
    #[error("Command definition not found: {0}")]
    UnknownReference(String),

    /// A list element declares no kind, command, path, host or ref.
    #[error("Step {step} declares no action")]
    EmptyAction { step: usize },

    /// A field the kind requires is absent.
    #[error("{kind} action requires '{field}'")]
    MissingRequiredField {
        kind: ActionKind,
        field: &'static str,
    },

    /// No task in the host catalog has the requested name.
    #[error("Task '{}' not found{}", .name, available_suffix(.available))]
    TaskNotFound {
        name: String,
        available: Vec<String>,
    },

    /// The host rejected a dispatch.
    #[error("Failed to execute '{command}': {source}")]
    HostDispatch {
        command: String,
        #[source]
        source: HostError,
    },
}

impl ActionError {
    /// Wrap a host rejection with the command that was being attempted.
    pub fn dispatch(command: impl Into<String>, source: HostError) -> Self {
        ActionError::HostDispatch {
            command: command.into(),
            source,
        }
    }

    /// Stable kind tag used when serializing.
    pub fn kind(&self) -> &'static str {
        match self {
            ActionError::MissingCommand { .. } => "MissingCommand",
            ActionError::UnknownActionType(_) => "UnknownActionType",
            ActionError::UnknownReference(_) => "UnknownReference",
            ActionError::EmptyAction { .. } => "EmptyAction",
            ActionError::MissingRequiredField { .. } => "MissingRequiredField",
            ActionError::TaskNotFound { .. } => "TaskNotFound",
            ActionError::HostDispatch { .. } => "HostDispatchFailure",
        }
    }
}

fn available_suffix(available: &[String]) -> String {
    if available.is_empty() {
        String::new()
    } else {
        format!(". Available tasks: {}", available.join(", "))
    }
}

/// Serialize ActionError as `{ "kind": ..., "message": ... }`.
impl Serialize for ActionError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("ActionError", 2)?;
        state.serialize_field("kind", self.kind())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(String),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),
}
