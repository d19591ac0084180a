//! Action resolution.
//!
//! Turns a menu entry plus the command dictionary into a list of
//! [`ResolvedAction`]s and says how they should run. Resolution does no I/O.
//!
//! ## Entry precedence
//!
//! 1. `children` - a category, resolves to nothing
//! 2. `actions` - ordered list, session names unified
//! 3. `parallel` - side-by-side set, session names left alone
//! 4. `ref` or inline fields - a single action
//!
//! Unknown references are skipped and reported in
//! [`Resolution::diagnostics`]. An unknown kind aborts resolution.

use deck_core::{
    ActionError, ActionSpec, CommandDictionary, EngineConfig, MenuEntry, ResolvedAction,
};

/// How a resolved entry should be executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Nothing to run (category, or nothing resolvable).
    None,
    /// One action.
    Single,
    /// An ordered list run by the sequential executor.
    Sequential,
    /// A set launched by the parallel executor.
    Parallel,
}

/// Result of resolving one entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub mode: ExecutionMode,
    pub actions: Vec<ResolvedAction>,

    /// The entry's own continue-on-error flag, if it set one.
    pub continue_on_error: Option<bool>,

    /// Non-fatal problems found while resolving (skipped references).
    pub diagnostics: Vec<ActionError>,
}

impl Resolution {
    fn none(diagnostics: Vec<ActionError>) -> Self {
        Self {
            mode: ExecutionMode::None,
            actions: Vec::new(),
            continue_on_error: None,
            diagnostics,
        }
    }

    /// True if there is nothing to execute.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Resolves menu entries against a command dictionary.
#[derive(Debug, Clone)]
pub struct ActionResolver {
    default_session_name: String,
}

impl ActionResolver {
    pub fn new(default_session_name: impl Into<String>) -> Self {
        Self {
            default_session_name: default_session_name.into(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.default_session_name.clone())
    }

    /// Resolve an entry.
    ///
    /// Returns `Err` only for an unknown action kind.
    pub fn resolve(
        &self,
        entry: &MenuEntry,
        commands: &CommandDictionary,
    ) -> Result<Resolution, ActionError> {
        if entry.is_category() {
            return Ok(Resolution::none(Vec::new()));
        }

        let mut diagnostics = Vec::new();

        if let Some(specs) = &entry.actions {
            let mut actions = self.resolve_list(specs, commands, &mut diagnostics)?;
            self.unify_session_names(entry.action.session_name.as_deref(), &mut actions);
            tracing::debug!(
                "Resolved '{}' to {} of {} sequential actions",
                entry.label,
                actions.len(),
                specs.len()
            );
            return Ok(Resolution {
                mode: ExecutionMode::Sequential,
                actions,
                continue_on_error: entry.continue_on_error,
                diagnostics,
            });
        }

        if let Some(specs) = &entry.parallel {
            let actions = self.resolve_list(specs, commands, &mut diagnostics)?;
            tracing::debug!(
                "Resolved '{}' to {} of {} parallel actions",
                entry.label,
                actions.len(),
                specs.len()
            );
            return Ok(Resolution {
                mode: ExecutionMode::Parallel,
                actions,
                continue_on_error: entry.continue_on_error,
                diagnostics,
            });
        }

        match self.resolve_spec(&entry.action, commands, &mut diagnostics)? {
            Some(action) => Ok(Resolution {
                mode: ExecutionMode::Single,
                actions: vec![action],
                continue_on_error: entry.continue_on_error,
                diagnostics,
            }),
            None => Ok(Resolution::none(diagnostics)),
        }
    }

    fn resolve_list(
        &self,
        specs: &[ActionSpec],
        commands: &CommandDictionary,
        diagnostics: &mut Vec<ActionError>,
    ) -> Result<Vec<ResolvedAction>, ActionError> {
        let mut actions = Vec::with_capacity(specs.len());
        for (index, spec) in specs.iter().enumerate() {
            let reported = diagnostics.len();
            match self.resolve_spec(spec, commands, diagnostics)? {
                Some(action) => actions.push(action),
                None => {
                    tracing::warn!("Skipping unresolvable action at step {}", index + 1);
                    // Unknown refs have already been reported.
                    if diagnostics.len() == reported {
                        diagnostics.push(ActionError::EmptyAction { step: index + 1 });
                    }
                }
            }
        }
        Ok(actions)
    }

    /// Resolve one declared action. `Ok(None)` means skip it.
    fn resolve_spec(
        &self,
        spec: &ActionSpec,
        commands: &CommandDictionary,
        diagnostics: &mut Vec<ActionError>,
    ) -> Result<Option<ResolvedAction>, ActionError> {
        let merged = match &spec.reference {
            Some(name) => match commands.get(name) {
                Some(definition) => spec.overlay_on(definition),
                None => {
                    tracing::warn!("Command definition not found: {}", name);
                    diagnostics.push(ActionError::UnknownReference(name.clone()));
                    return Ok(None);
                }
            },
            None => spec.clone(),
        };

        Ok(merged
            .inferred_kind()?
            .map(|kind| ResolvedAction::from_spec(kind, &merged)))
    }

    /// Give every shell action in a sequential list the same session.
    ///
    /// The entry's own name wins, then the first name any action carries,
    /// then the default.
    fn unify_session_names(&self, entry_session: Option<&str>, actions: &mut [ResolvedAction]) {
        let target = entry_session
            .map(str::to_string)
            .or_else(|| actions.iter().find_map(|a| a.session_name.clone()))
            .unwrap_or_else(|| self.default_session_name.clone());

        for action in actions.iter_mut().filter(|a| a.is_shell()) {
            action.session_name = Some(target.clone());
        }
    }
}

impl Default for ActionResolver {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::{ActionKind, DEFAULT_SESSION_NAME};

    fn dictionary() -> CommandDictionary {
        let mut commands = CommandDictionary::new();
        commands.insert("lint".to_string(), ActionSpec::shell("lint"));
        commands.insert("test".to_string(), ActionSpec::shell("test"));
        commands.insert("build".to_string(), ActionSpec::shell("build"));
        commands.insert(
            "watch".to_string(),
            ActionSpec::shell("cargo watch").in_session("watcher"),
        );
        commands.insert(
            "save".to_string(),
            ActionSpec {
                kind: Some("command".to_string()),
                command: Some("workbench.action.files.saveAll".to_string()),
                ..ActionSpec::default()
            },
        );
        commands
    }

    fn sequential(label: &str, specs: Vec<ActionSpec>) -> MenuEntry {
        MenuEntry {
            actions: Some(specs),
            ..MenuEntry::new(label)
        }
    }

    fn session_names(resolution: &Resolution) -> Vec<Option<&str>> {
        resolution
            .actions
            .iter()
            .map(|a| a.session_name.as_deref())
            .collect()
    }

    #[test]
    fn test_category_resolves_to_nothing() {
        let mut entry = MenuEntry::new("Build");
        entry.children = vec![MenuEntry::new("Debug")];
        entry.action = ActionSpec::shell("make");

        let resolution = ActionResolver::default()
            .resolve(&entry, &dictionary())
            .unwrap();
        assert_eq!(resolution.mode, ExecutionMode::None);
        assert!(resolution.is_empty());
    }

    #[test]
    fn test_inline_action_is_single() {
        let entry = MenuEntry {
            action: ActionSpec::shell("make"),
            ..MenuEntry::new("Make")
        };

        let resolution = ActionResolver::default()
            .resolve(&entry, &dictionary())
            .unwrap();
        assert_eq!(resolution.mode, ExecutionMode::Single);
        assert_eq!(resolution.actions, vec![ResolvedAction::shell("make")]);
    }

    #[test]
    fn test_single_ref_applies_entry_overrides() {
        let entry = MenuEntry {
            action: ActionSpec::reference("lint").in_session("ci"),
            ..MenuEntry::new("Lint")
        };

        let resolution = ActionResolver::default()
            .resolve(&entry, &dictionary())
            .unwrap();
        assert_eq!(resolution.mode, ExecutionMode::Single);
        assert_eq!(
            resolution.actions,
            vec![ResolvedAction::shell("lint").in_session("ci")]
        );
    }

    #[test]
    fn test_unknown_top_level_ref_is_reported_not_thrown() {
        let entry = MenuEntry {
            action: ActionSpec::reference("missing"),
            ..MenuEntry::new("Missing")
        };

        let resolution = ActionResolver::default()
            .resolve(&entry, &dictionary())
            .unwrap();
        assert_eq!(resolution.mode, ExecutionMode::None);
        assert!(resolution.is_empty());
        assert_eq!(
            resolution.diagnostics,
            vec![ActionError::UnknownReference("missing".to_string())]
        );
    }

    #[test]
    fn test_unknown_ref_in_list_is_skipped() {
        let entry = sequential(
            "CI",
            vec![
                ActionSpec::reference("lint"),
                ActionSpec::reference("nope"),
                ActionSpec::reference("build"),
            ],
        );

        let resolution = ActionResolver::default()
            .resolve(&entry, &dictionary())
            .unwrap();
        let commands: Vec<_> = resolution
            .actions
            .iter()
            .map(|a| a.command.as_deref().unwrap())
            .collect();
        assert_eq!(commands, vec!["lint", "build"]);
        assert_eq!(
            resolution.diagnostics,
            vec![ActionError::UnknownReference("nope".to_string())]
        );
    }

    #[test]
    fn test_ci_scenario_uses_default_session() {
        let entry = sequential(
            "CI",
            vec![
                ActionSpec::reference("lint"),
                ActionSpec::reference("test"),
                ActionSpec::reference("build"),
            ],
        );

        let resolution = ActionResolver::default()
            .resolve(&entry, &dictionary())
            .unwrap();
        assert_eq!(resolution.mode, ExecutionMode::Sequential);
        assert_eq!(
            session_names(&resolution),
            vec![Some(DEFAULT_SESSION_NAME); 3]
        );
    }

    #[test]
    fn test_first_declared_session_name_is_shared() {
        let entry = sequential(
            "Dev",
            vec![
                ActionSpec::reference("lint"),
                ActionSpec::reference("watch"),
                ActionSpec::shell("echo done").in_session("other"),
            ],
        );

        let resolution = ActionResolver::default()
            .resolve(&entry, &dictionary())
            .unwrap();
        assert_eq!(
            session_names(&resolution),
            vec![Some("watcher"), Some("watcher"), Some("watcher")]
        );
    }

    #[test]
    fn test_entry_session_name_wins() {
        let mut entry = sequential(
            "Dev",
            vec![ActionSpec::reference("watch"), ActionSpec::reference("save")],
        );
        entry.action.session_name = Some("mine".to_string());

        let resolution = ActionResolver::default()
            .resolve(&entry, &dictionary())
            .unwrap();
        assert_eq!(resolution.actions[0].session_name.as_deref(), Some("mine"));
        // Non-shell actions are untouched.
        assert_eq!(resolution.actions[1].kind, ActionKind::EditorCommand);
        assert_eq!(resolution.actions[1].session_name, None);
    }

    #[test]
    fn test_parallel_keeps_independent_session_names() {
        let entry = MenuEntry {
            parallel: Some(vec![
                ActionSpec::reference("watch"),
                ActionSpec::reference("lint"),
            ]),
            ..MenuEntry::new("Side by side")
        };

        let resolution = ActionResolver::default()
            .resolve(&entry, &dictionary())
            .unwrap();
        assert_eq!(resolution.mode, ExecutionMode::Parallel);
        assert_eq!(session_names(&resolution), vec![Some("watcher"), None]);
    }

    #[test]
    fn test_unknown_kind_aborts() {
        let entry = sequential(
            "Bad",
            vec![
                ActionSpec::reference("lint"),
                ActionSpec {
                    kind: Some("launch".to_string()),
                    command: Some("x".to_string()),
                    ..ActionSpec::default()
                },
            ],
        );

        let err = ActionResolver::default()
            .resolve(&entry, &dictionary())
            .unwrap_err();
        assert_eq!(err, ActionError::UnknownActionType("launch".to_string()));
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let entry = sequential(
            "Dev",
            vec![
                ActionSpec::reference("lint"),
                ActionSpec::reference("watch"),
                ActionSpec::reference("test"),
            ],
        );
        let resolver = ActionResolver::default();
        let commands = dictionary();

        let first = resolver.resolve(&entry, &commands).unwrap();
        for _ in 0..10 {
            assert_eq!(resolver.resolve(&entry, &commands).unwrap(), first);
        }
    }

    #[test]
    fn test_empty_list_element_is_reported() {
        let entry = sequential(
            "Gaps",
            vec![
                ActionSpec::shell("a"),
                ActionSpec::default(),
                ActionSpec::shell("b"),
            ],
        );

        let resolution = ActionResolver::default()
            .resolve(&entry, &dictionary())
            .unwrap();

        assert_eq!(resolution.actions.len(), 2);
        assert_eq!(
            resolution.diagnostics,
            vec![ActionError::EmptyAction { step: 2 }]
        );
    }

    #[test]
    fn test_label_only_entry_resolves_to_nothing() {
        let resolution = ActionResolver::default()
            .resolve(&MenuEntry::new("Nothing"), &dictionary())
            .unwrap();
        assert_eq!(resolution.mode, ExecutionMode::None);
        assert!(resolution.diagnostics.is_empty());
    }
}
