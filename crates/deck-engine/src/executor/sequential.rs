//! Sequential execution with grouping.

use deck_core::{ActionError, ActionFailure, ExecutionResult, ResolvedAction};

use super::dispatch::command_of;
use super::{ActionExecutor, ExecutionOptions};
use crate::grouper::{group_actions, ActionGroup};

impl ActionExecutor {
    /// Run `actions` in order, chaining same-session shell runs into one send.
    ///
    /// A failed terminal group fails as a whole: none of its members are
    /// reported as progress, and the failure is attributed to the group's
    /// first action.
    pub async fn execute_multiple(
        &self,
        actions: &[ResolvedAction],
        options: &ExecutionOptions,
    ) -> ExecutionResult {
        let total = actions.len();
        if total == 0 {
            return ExecutionResult::completed(0);
        }

        let groups = group_actions(actions, &self.config.default_session_name);
        let mut completed = 0;
        let mut errors = Vec::new();

        for group in &groups {
            if options.is_cancelled() {
                tracing::info!("Run cancelled after {} of {} actions", completed, total);
                return ExecutionResult::cancelled(completed, total);
            }

            match self.execute_group(group).await {
                Ok(()) => {
                    for action in group.actions() {
                        completed += 1;
                        options.report(completed, total, action);
                    }
                }
                Err(error) => {
                    let index = group.original_index();
                    tracing::warn!("Step {} of {} failed: {}", index + 1, total, error);
                    if !options.continue_on_error {
                        return ExecutionResult::failed(completed, total, index, error);
                    }
                    if let ActionGroup::TerminalGroup { actions, .. } = group {
                        completed += actions.len();
                    }
                    errors.push(ActionFailure {
                        index,
                        action: group.actions()[0].clone(),
                        error,
                    });
                }
            }
        }

        if errors.is_empty() {
            tracing::info!("Completed {} actions", total);
        } else {
            tracing::warn!("{} of {} execution units failed", errors.len(), groups.len());
        }
        ExecutionResult::finished(completed, total, errors)
    }

    async fn execute_group(&self, group: &ActionGroup) -> Result<(), ActionError> {
        match group {
            ActionGroup::Single { action, .. } => self.execute(action).await,
            ActionGroup::TerminalGroup {
                actions,
                session_name,
                ..
            } => {
                let commands = actions
                    .iter()
                    .map(command_of)
                    .collect::<Result<Vec<_>, _>>()?;
                let working_directory = actions
                    .iter()
                    .find_map(|a| a.working_directory.as_deref());
                let line = self.config.chain_commands(&commands);
                self.send_to_session(session_name, working_directory, &line)
                    .await
            }
        }
    }
}
