//! Action Executor
//!
//! The ActionExecutor runs resolved actions against the host:
//! - Single-action dispatch by kind
//! - Sequential runs with grouping, fail-fast or continue-on-error, and
//!   cooperative cancellation at group boundaries
//! - Parallel fan-out into split sessions
//!
//! ## Sequential Flow
//!
//! ```text
//! actions ──► group_actions() ──► for each group:
//!                                   │
//!                          cancelled? ──yes──► return cancelled
//!                                   │
//!                     ┌─────────────┴─────────────┐
//!                     ▼                           ▼
//!               TerminalGroup                   Single
//!          one chained send to the          dispatch by kind
//!               named session
//!                     │                           │
//!                     └─────────────┬─────────────┘
//!                                   ▼
//!                     ok: report progress per action
//!                     err: stop, or record and continue
//! ```

use std::fmt;
use std::sync::Arc;

use deck_core::{EngineConfig, ExecutionResult, ResolvedAction};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::host::HostServices;
use crate::registry::SessionRegistry;
use crate::resolver::{ExecutionMode, Resolution};

mod dispatch;
mod parallel;
mod sequential;

// =============================================================================
// Execution Options
// =============================================================================

/// Progress callback: `(completed, total, action just completed)`.
pub type ProgressFn = Arc<dyn Fn(usize, usize, &ResolvedAction) + Send + Sync>;

/// Options for a sequential run.
#[derive(Clone, Default)]
pub struct ExecutionOptions {
    /// Record failures and keep going instead of stopping at the first.
    pub continue_on_error: bool,

    /// Checked before each group starts.
    pub cancellation: Option<CancellationToken>,

    pub on_progress: Option<ProgressFn>,
}

impl ExecutionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn continue_on_error(mut self, enabled: bool) -> Self {
        self.continue_on_error = enabled;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn with_progress<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, usize, &ResolvedAction) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(f));
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    fn report(&self, completed: usize, total: usize, action: &ResolvedAction) {
        if let Some(on_progress) = &self.on_progress {
            on_progress(completed, total, action);
        }
    }
}

impl fmt::Debug for ExecutionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionOptions")
            .field("continue_on_error", &self.continue_on_error)
            .field("cancelled", &self.is_cancelled())
            .field("has_on_progress", &self.on_progress.is_some())
            .finish()
    }
}

// =============================================================================
// Action Executor
// =============================================================================

/// Runs resolved actions against the host.
///
/// Owns its session registry. Several runs may be in flight at once; the
/// registry serializes session acquisition between them.
pub struct ActionExecutor {
    host: HostServices,
    sessions: Arc<SessionRegistry>,
    config: EngineConfig,
    close_watcher: Mutex<Option<JoinHandle<()>>>,
}

impl ActionExecutor {
    /// Create an executor and start watching for closed sessions.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(host: HostServices, config: EngineConfig) -> Self {
        let sessions = Arc::new(SessionRegistry::new());
        let watcher =
            sessions.spawn_close_watcher(host.shell.clone(), host.shell.subscribe_closed());
        Self {
            host,
            sessions,
            config,
            close_watcher: Mutex::new(Some(watcher)),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The session registry (for inspection).
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Run a resolved entry with the executor its mode calls for.
    ///
    /// Continue-on-error is on if the caller asked for it, or if the entry
    /// (falling back to the configured default) did.
    pub async fn run(&self, resolution: &Resolution, options: ExecutionOptions) -> ExecutionResult {
        let entry_policy = resolution
            .continue_on_error
            .unwrap_or(self.config.continue_on_error);
        let options = ExecutionOptions {
            continue_on_error: options.continue_on_error || entry_policy,
            ..options
        };

        match resolution.mode {
            ExecutionMode::None => ExecutionResult::completed(0),
            ExecutionMode::Single | ExecutionMode::Sequential => {
                self.execute_multiple(&resolution.actions, &options).await
            }
            ExecutionMode::Parallel => {
                let total = resolution.actions.len();
                match self.launch_parallel(&resolution.actions).await {
                    Ok(_) => ExecutionResult::completed(total),
                    Err(failure) => ExecutionResult::failed(
                        failure.launched,
                        total,
                        failure.index,
                        failure.error,
                    ),
                }
            }
        }
    }

    /// Stop watching for closed sessions and forget all of them.
    ///
    /// Sessions stay open; the user may still be using them.
    pub async fn dispose(&self) {
        if let Some(watcher) = self.close_watcher.lock().take() {
            watcher.abort();
        }
        self.sessions.clear().await;
        tracing::debug!("Action executor disposed");
    }
}

impl Drop for ActionExecutor {
    fn drop(&mut self) {
        if let Some(watcher) = self.close_watcher.get_mut().take() {
            watcher.abort();
        }
    }
}
