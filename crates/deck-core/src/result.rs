//! Execution results.

use serde::Serialize;

use crate::action::ResolvedAction;
use crate::error::ActionError;

/// One failed unit recorded under the continue-on-error policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionFailure {
    /// Position of the unit's first action in the submitted list.
    pub index: usize,
    pub action: ResolvedAction,
    pub error: ActionError,
}

/// Outcome of running a list of actions.
///
/// `cancelled` and `error` are never both set; `errors` is only populated
/// when the run used continue-on-error and something failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub success: bool,
    pub completed_count: usize,
    pub total_count: usize,
    pub cancelled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ActionError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ActionFailure>>,
}

impl ExecutionResult {
    /// Every action ran.
    pub fn completed(total: usize) -> Self {
        Self {
            success: true,
            completed_count: total,
            total_count: total,
            cancelled: false,
            error: None,
            failed_index: None,
            errors: None,
        }
    }

    /// The caller cancelled between groups.
    pub fn cancelled(completed: usize, total: usize) -> Self {
        Self {
            success: false,
            completed_count: completed,
            total_count: total,
            cancelled: true,
            error: None,
            failed_index: None,
            errors: None,
        }
    }

    /// A fail-fast run stopped at `failed_index`.
    pub fn failed(
        completed: usize,
        total: usize,
        failed_index: usize,
        error: ActionError,
    ) -> Self {
        Self {
            success: false,
            completed_count: completed,
            total_count: total,
            cancelled: false,
            error: Some(error),
            failed_index: Some(failed_index),
            errors: None,
        }
    }

    /// A continue-on-error run finished; success iff `errors` is empty.
    pub fn finished(completed: usize, total: usize, errors: Vec<ActionFailure>) -> Self {
        Self {
            success: errors.is_empty(),
            completed_count: completed,
            total_count: total,
            cancelled: false,
            error: None,
            failed_index: None,
            errors: if errors.is_empty() { None } else { Some(errors) },
        }
    }

    /// 1-based step number of the failure, if the run stopped on one.
    pub fn failed_step(&self) -> Option<usize> {
        self.failed_index.map(|i| i + 1)
    }

    /// One-line summary for notifications.
    pub fn summary(&self) -> String {
        if self.cancelled {
            return format!(
                "Cancelled after {} of {} actions",
                self.completed_count, self.total_count
            );
        }
        if let (Some(step), Some(error)) = (self.failed_step(), &self.error) {
            return format!("Step {} of {} failed: {}", step, self.total_count, error);
        }
        if let Some(errors) = &self.errors {
            let steps: Vec<String> = errors.iter().map(|f| (f.index + 1).to_string()).collect();
            return format!(
                "{} of {} actions failed (steps {})",
                errors.len(),
                self.total_count,
                steps.join(", ")
            );
        }
        format!(
            "Completed {} of {} actions",
            self.completed_count, self.total_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;

    #[test]
    fn test_failed_step_is_one_based() {
        let result = ExecutionResult::failed(
            1,
            3,
            1,
            ActionError::MissingCommand {
                kind: ActionKind::ShellCommand,
            },
        );
        assert_eq!(result.failed_step(), Some(2));
        assert_eq!(
            result.summary(),
            "Step 2 of 3 failed: shell action has no command"
        );
    }

    #[test]
    fn test_summaries() {
        assert_eq!(
            ExecutionResult::completed(3).summary(),
            "Completed 3 of 3 actions"
        );
        assert_eq!(
            ExecutionResult::cancelled(1, 3).summary(),
            "Cancelled after 1 of 3 actions"
        );

        let failure = ActionFailure {
            index: 2,
            action: ResolvedAction::task("deploy"),
            error: ActionError::TaskNotFound {
                name: "deploy".to_string(),
                available: Vec::new(),
            },
        };
        let result = ExecutionResult::finished(4, 5, vec![failure]);
        assert!(!result.success);
        assert_eq!(result.summary(), "1 of 5 actions failed (steps 3)");
    }

    #[test]
    fn test_finished_without_errors_is_success() {
        let result = ExecutionResult::finished(2, 2, Vec::new());
        assert!(result.success);
        assert!(result.errors.is_none());
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(ExecutionResult::completed(0)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["completedCount"], 0);
        assert_eq!(json["totalCount"], 0);
        assert!(json.get("errors").is_none());
    }
}
