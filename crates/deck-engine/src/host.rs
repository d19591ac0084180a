//! Host environment boundary.
//!
//! The engine never talks to a terminal, editor or task runner directly. It
//! goes through these traits, which the embedding application implements:
//!
//! ```text
//!                ┌────────────────┐
//!                │ ActionExecutor │
//!                └───────┬────────┘
//!     ┌──────────┬──────┴─────┬─────────────┐
//!     ▼          ▼            ▼             ▼
//! ShellHost  CommandDispatcher TaskCatalog  PathOpener
//! ```
//!
//! Every method that can suspend is async; the executor awaits each one
//! before issuing the next.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use deck_core::{HostResult, RemoteLocation};
use tokio::sync::broadcast;
use uuid::Uuid;

// =============================================================================
// Sessions
// =============================================================================

/// Identity of a live shell session.
///
/// Two sessions may share a display name; they never share an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A handle to a live shell session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    pub id: SessionId,

    /// Display name shown by the host.
    pub name: String,
}

impl SessionHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SessionId::new(),
            name: name.into(),
        }
    }
}

/// Options for creating a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Display name.
    pub name: String,

    /// Starting directory. Only meaningful at creation.
    pub working_directory: Option<String>,

    /// Create as a split pane attached to this session.
    pub parent: Option<SessionId>,
}

impl SessionOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            working_directory: None,
            parent: None,
        }
    }
}

/// Interactive shell sessions owned by the host.
#[async_trait]
pub trait ShellHost: Send + Sync {
    /// Create a new session.
    async fn create_session(&self, options: SessionOptions) -> HostResult<SessionHandle>;

    /// Sessions currently open in the host, in any order.
    async fn open_sessions(&self) -> Vec<SessionHandle>;

    /// Send a line of text to a session. The host appends the newline.
    async fn send_text(&self, session: &SessionHandle, text: &str) -> HostResult<()>;

    /// Bring a session to the foreground.
    async fn show(&self, session: &SessionHandle) -> HostResult<()>;

    /// Subscribe to session-closed notifications.
    fn subscribe_closed(&self) -> broadcast::Receiver<SessionId>;
}

// =============================================================================
// Commands, tasks, paths
// =============================================================================

/// The host's command dispatcher (editor commands).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandDispatcher: Send + Sync {
    /// Run a named command with opaque arguments.
    async fn execute_command(&self, command: &str, arguments: &[serde_json::Value])
        -> HostResult<()>;
}

/// A task known to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInfo {
    /// Display name, matched exactly against a task action's command.
    pub name: String,
}

impl TaskInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// The host's task catalog.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskCatalog: Send + Sync {
    /// Fetch every task the host knows about.
    async fn fetch_tasks(&self) -> HostResult<Vec<TaskInfo>>;

    /// Start a task.
    async fn run_task(&self, task: &TaskInfo) -> HostResult<()>;
}

/// Opens locations in isolated environments or on remote hosts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PathOpener: Send + Sync {
    async fn open_location(&self, location: &RemoteLocation) -> HostResult<()>;
}

// =============================================================================
// Host Services
// =============================================================================

/// All host collaborators the executor needs.
#[derive(Clone)]
pub struct HostServices {
    pub shell: Arc<dyn ShellHost>,
    pub commands: Arc<dyn CommandDispatcher>,
    pub tasks: Arc<dyn TaskCatalog>,
    pub paths: Arc<dyn PathOpener>,
}

impl HostServices {
    /// Use one object for every collaborator.
    pub fn from_host<H>(host: Arc<H>) -> Self
    where
        H: ShellHost + CommandDispatcher + TaskCatalog + PathOpener + 'static,
    {
        Self {
            shell: host.clone(),
            commands: host.clone(),
            tasks: host.clone(),
            paths: host,
        }
    }
}

impl fmt::Debug for HostServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostServices").finish_non_exhaustive()
    }
}
