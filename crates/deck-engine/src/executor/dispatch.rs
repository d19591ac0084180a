//! Single-action dispatch.

use deck_core::{ActionError, ActionKind, RemoteLocation, ResolvedAction};

use super::ActionExecutor;

impl ActionExecutor {
    /// Execute one action.
    pub async fn execute(&self, action: &ResolvedAction) -> Result<(), ActionError> {
        match action.kind {
            ActionKind::ShellCommand => self.run_shell(action).await,
            ActionKind::EditorCommand => self.run_editor_command(action).await,
            ActionKind::BuildTask => self.run_task(action).await,
            ActionKind::OpenInIsolatedEnvironment => {
                let path = required(action, "path", action.path.as_deref())?;
                self.open(path, RemoteLocation::isolated(path)).await
            }
            ActionKind::OpenOverRemoteLink => {
                let path = required(action, "path", action.path.as_deref())?;
                let host = required(action, "host", action.host.as_deref())?;
                self.open(path, RemoteLocation::remote(host, path)).await
            }
        }
    }

    async fn run_shell(&self, action: &ResolvedAction) -> Result<(), ActionError> {
        let command = command_of(action)?;
        let name = action.session_or(&self.config.default_session_name);
        self.send_to_session(name, action.working_directory.as_deref(), command)
            .await
    }

    /// Acquire the named session, focus it, and send one line.
    pub(super) async fn send_to_session(
        &self,
        name: &str,
        working_directory: Option<&str>,
        line: &str,
    ) -> Result<(), ActionError> {
        let shell = self.host.shell.as_ref();
        let session = self
            .sessions
            .acquire(shell, name, working_directory)
            .await
            .map_err(|e| ActionError::dispatch(line, e))?;
        shell
            .show(&session)
            .await
            .map_err(|e| ActionError::dispatch(line, e))?;
        tracing::debug!("Sending to session '{}': {}", name, line);
        self.sessions
            .send(shell, &session, line)
            .await
            .map_err(|e| ActionError::dispatch(line, e))
    }

    async fn run_editor_command(&self, action: &ResolvedAction) -> Result<(), ActionError> {
        let command = command_of(action)?;
        tracing::debug!("Dispatching command '{}'", command);
        self.host
            .commands
            .execute_command(command, &action.arguments)
            .await
            .map_err(|e| ActionError::dispatch(command, e))
    }

    async fn run_task(&self, action: &ResolvedAction) -> Result<(), ActionError> {
        let name = command_of(action)?;
        let tasks = self
            .host
            .tasks
            .fetch_tasks()
            .await
            .map_err(|e| ActionError::dispatch(name, e))?;

        let Some(index) = tasks.iter().position(|t| t.name == name) else {
            return Err(ActionError::TaskNotFound {
                name: name.to_string(),
                available: tasks.into_iter().map(|t| t.name).collect(),
            });
        };

        tracing::debug!("Running task '{}'", name);
        self.host
            .tasks
            .run_task(&tasks[index])
            .await
            .map_err(|e| ActionError::dispatch(name, e))
    }

    async fn open(&self, path: &str, location: RemoteLocation) -> Result<(), ActionError> {
        tracing::debug!("Opening {}", location);
        self.host
            .paths
            .open_location(&location)
            .await
            .map_err(|e| ActionError::dispatch(path, e))
    }
}

/// The action's command, which must be present and non-blank.
pub(super) fn command_of(action: &ResolvedAction) -> Result<&str, ActionError> {
    match action.command.as_deref() {
        Some(command) if !command.trim().is_empty() => Ok(command),
        _ => Err(ActionError::MissingCommand { kind: action.kind }),
    }
}

fn required<'a>(
    action: &ResolvedAction,
    field: &'static str,
    value: Option<&'a str>,
) -> Result<&'a str, ActionError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ActionError::MissingRequiredField {
            kind: action.kind,
            field,
        }),
    }
}
