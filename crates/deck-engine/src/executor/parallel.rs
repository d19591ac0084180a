//! Parallel fan-out into split sessions.

use deck_core::{ActionError, ResolvedAction};

use super::dispatch::command_of;
use super::ActionExecutor;
use crate::host::{SessionHandle, SessionOptions};

/// Why a parallel launch stopped.
#[derive(Debug)]
pub(super) struct LaunchFailure {
    /// Action the failure is attributed to.
    pub index: usize,

    /// Actions whose sessions were fully launched before the failure.
    pub launched: usize,

    pub error: ActionError,
}

impl ActionExecutor {
    /// Open one session per action and start each shell command in its own.
    ///
    /// The first session is created standalone; the rest are split panes of
    /// it. Only shell actions have their command sent. Once launched the
    /// sessions run independently and nothing is awaited or cancelled.
    pub async fn execute_parallel(
        &self,
        actions: &[ResolvedAction],
    ) -> Result<Vec<SessionHandle>, ActionError> {
        self.launch_parallel(actions)
            .await
            .map_err(|failure| failure.error)
    }

    /// As [`execute_parallel`](Self::execute_parallel), keeping track of
    /// where a failure happened.
    pub(super) async fn launch_parallel(
        &self,
        actions: &[ResolvedAction],
    ) -> Result<Vec<SessionHandle>, LaunchFailure> {
        let shell = self.host.shell.as_ref();
        let mut sessions: Vec<SessionHandle> = Vec::with_capacity(actions.len());

        for (index, action) in actions.iter().enumerate() {
            let fail = |error| LaunchFailure {
                index,
                launched: index,
                error,
            };
            let command = if action.is_shell() {
                Some(command_of(action).map_err(fail)?)
            } else {
                None
            };

            let name = action
                .session_name
                .clone()
                .unwrap_or_else(|| self.config.parallel_session_name(index));
            let session = shell
                .create_session(SessionOptions {
                    name: name.clone(),
                    working_directory: action.working_directory.clone(),
                    parent: sessions.first().map(|parent| parent.id),
                })
                .await
                .map_err(|e| fail(ActionError::dispatch(&name, e)))?;
            self.sessions.register(session.clone()).await;

            if let Some(command) = command {
                self.sessions
                    .send(shell, &session, command)
                    .await
                    .map_err(|e| fail(ActionError::dispatch(command, e)))?;
            }
            sessions.push(session);
        }

        if let Some(parent) = sessions.first() {
            shell
                .show(parent)
                .await
                .map_err(|e| LaunchFailure {
                    index: 0,
                    launched: actions.len(),
                    error: ActionError::dispatch(&parent.name, e),
                })?;
        }

        tracing::info!("Launched {} parallel sessions", sessions.len());
        Ok(sessions)
    }
}
