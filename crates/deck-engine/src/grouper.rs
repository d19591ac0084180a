//! Action grouping.
//!
//! Consecutive shell actions aimed at the same session are sent as one
//! chained command line. Grouping is a single left-to-right pass:
//!
//! ```text
//! [sh:a] [sh:a] [cmd] [sh:a] [sh:b] [sh:b]
//!  └─ Terminal ─┘ Single Single └ Terminal ┘
//! ```

use deck_core::ResolvedAction;

/// An execution unit produced by [`group_actions`].
#[derive(Debug, Clone, PartialEq)]
pub enum ActionGroup {
    /// One action dispatched on its own.
    Single {
        action: ResolvedAction,
        original_index: usize,
    },

    /// Two or more contiguous shell actions sharing `session_name`.
    TerminalGroup {
        actions: Vec<ResolvedAction>,
        session_name: String,
        original_index: usize,
    },
}

impl ActionGroup {
    /// Position of the group's first action in the ungrouped list.
    pub fn original_index(&self) -> usize {
        match self {
            ActionGroup::Single { original_index, .. }
            | ActionGroup::TerminalGroup { original_index, .. } => *original_index,
        }
    }

    /// The actions in this group, in order.
    pub fn actions(&self) -> &[ResolvedAction] {
        match self {
            ActionGroup::Single { action, .. } => std::slice::from_ref(action),
            ActionGroup::TerminalGroup { actions, .. } => actions,
        }
    }

    pub fn len(&self) -> usize {
        self.actions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions().is_empty()
    }
}

/// Partition `actions` into execution units.
///
/// Actions without a session name are treated as targeting
/// `default_session`.
pub fn group_actions(actions: &[ResolvedAction], default_session: &str) -> Vec<ActionGroup> {
    let mut groups = Vec::new();
    let mut run: Vec<ResolvedAction> = Vec::new();
    let mut run_start = 0;

    for (index, action) in actions.iter().enumerate() {
        if action.is_shell() {
            let continues_run = run.last().is_some_and(|prev| {
                prev.session_or(default_session) == action.session_or(default_session)
            });
            if !continues_run {
                close_run(&mut groups, &mut run, run_start, default_session);
                run_start = index;
            }
            run.push(action.clone());
        } else {
            close_run(&mut groups, &mut run, run_start, default_session);
            groups.push(ActionGroup::Single {
                action: action.clone(),
                original_index: index,
            });
        }
    }
    close_run(&mut groups, &mut run, run_start, default_session);

    tracing::debug!(
        "Grouped {} actions into {} execution units",
        actions.len(),
        groups.len()
    );
    groups
}

fn close_run(
    groups: &mut Vec<ActionGroup>,
    run: &mut Vec<ResolvedAction>,
    start: usize,
    default_session: &str,
) {
    match run.len() {
        0 => {}
        1 => groups.push(ActionGroup::Single {
            action: run.remove(0),
            original_index: start,
        }),
        _ => {
            let session_name = run[0].session_or(default_session).to_string();
            groups.push(ActionGroup::TerminalGroup {
                actions: std::mem::take(run),
                session_name,
                original_index: start,
            });
        }
    }
}

/// Expand groups back into the flat action list.
pub fn flatten(groups: &[ActionGroup]) -> Vec<ResolvedAction> {
    groups
        .iter()
        .flat_map(|g| g.actions().iter().cloned())
        .collect()
}
