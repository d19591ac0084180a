//! In-memory host that records every call, for tests.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use deck_core::{EngineConfig, HostError, HostResult, RemoteLocation};
use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::executor::ActionExecutor;
use crate::host::{
    CommandDispatcher, HostServices, PathOpener, SessionHandle, SessionId, SessionOptions,
    ShellHost, TaskCatalog, TaskInfo,
};

/// An executor with default config backed entirely by `host`.
pub fn executor(host: &Arc<FakeHost>) -> ActionExecutor {
    ActionExecutor::new(HostServices::from_host(host.clone()), EngineConfig::default())
}

/// A host call as observed by [`FakeHost`].
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Create {
        name: String,
        working_directory: Option<String>,
        /// Display name of the parent session for split panes.
        parent: Option<String>,
    },
    Send {
        session: String,
        text: String,
    },
    Show {
        session: String,
    },
    Command {
        command: String,
        arguments: Vec<serde_json::Value>,
    },
    RunTask {
        name: String,
    },
    Open {
        uri: String,
    },
}

#[derive(Default)]
struct FakeState {
    calls: Vec<HostCall>,
    open: Vec<SessionHandle>,
    tasks: Vec<TaskInfo>,
    failing_sends: HashSet<String>,
    failing_commands: HashSet<String>,
    failing_creates: HashSet<String>,
    failing_shows: HashSet<String>,
}

pub struct FakeHost {
    state: Mutex<FakeState>,
    closed: broadcast::Sender<SessionId>,
}

impl FakeHost {
    pub fn new() -> Self {
        let (closed, _) = broadcast::channel(16);
        Self {
            state: Mutex::new(FakeState::default()),
            closed,
        }
    }

    pub fn with_tasks(self, names: &[&str]) -> Self {
        self.state.lock().tasks = names.iter().map(|n| TaskInfo::new(*n)).collect();
        self
    }

    /// Make `send_text` fail for exactly this text.
    pub fn fail_send(&self, text: &str) {
        self.state.lock().failing_sends.insert(text.to_string());
    }

    /// Make `execute_command` fail for this command.
    pub fn fail_command(&self, command: &str) {
        self.state.lock().failing_commands.insert(command.to_string());
    }

    /// Make `create_session` fail for this name.
    pub fn fail_create(&self, name: &str) {
        self.state.lock().failing_creates.insert(name.to_string());
    }

    /// Make `show` fail for this session name.
    pub fn fail_show(&self, name: &str) {
        self.state.lock().failing_shows.insert(name.to_string());
    }

    /// Add a session that the host already had open, without recording a call.
    pub fn open_existing(&self, name: &str) -> SessionHandle {
        let session = SessionHandle::new(name);
        self.state.lock().open.push(session.clone());
        session
    }

    /// Simulate the user closing a session.
    pub fn close(&self, session: &SessionHandle) {
        self.state.lock().open.retain(|s| s.id != session.id);
        let _ = self.closed.send(session.id);
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.state.lock().calls.clone()
    }

    /// `(session name, text)` for every send, in order.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                HostCall::Send { session, text } => Some((session.clone(), text.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn created_count(&self) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| matches!(call, HostCall::Create { .. }))
            .count()
    }

    fn record(&self, call: HostCall) {
        self.state.lock().calls.push(call);
    }
}

#[async_trait]
impl ShellHost for FakeHost {
    async fn create_session(&self, options: SessionOptions) -> HostResult<SessionHandle> {
        let mut state = self.state.lock();
        if state.failing_creates.contains(&options.name) {
            return Err(HostError::new(format!("cannot create '{}'", options.name)));
        }
        let parent = options.parent.and_then(|id| {
            state
                .open
                .iter()
                .find(|s| s.id == id)
                .map(|s| s.name.clone())
        });
        state.calls.push(HostCall::Create {
            name: options.name.clone(),
            working_directory: options.working_directory.clone(),
            parent,
        });
        let session = SessionHandle::new(options.name);
        state.open.push(session.clone());
        Ok(session)
    }

    async fn open_sessions(&self) -> Vec<SessionHandle> {
        self.state.lock().open.clone()
    }

    async fn send_text(&self, session: &SessionHandle, text: &str) -> HostResult<()> {
        let mut state = self.state.lock();
        if state.failing_sends.contains(text) {
            return Err(HostError::new("session is not accepting input"));
        }
        state.calls.push(HostCall::Send {
            session: session.name.clone(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn show(&self, session: &SessionHandle) -> HostResult<()> {
        if self.state.lock().failing_shows.contains(&session.name) {
            return Err(HostError::new("session cannot be focused"));
        }
        self.record(HostCall::Show {
            session: session.name.clone(),
        });
        Ok(())
    }

    fn subscribe_closed(&self) -> broadcast::Receiver<SessionId> {
        self.closed.subscribe()
    }
}

#[async_trait]
impl CommandDispatcher for FakeHost {
    async fn execute_command(
        &self,
        command: &str,
        arguments: &[serde_json::Value],
    ) -> HostResult<()> {
        let mut state = self.state.lock();
        if state.failing_commands.contains(command) {
            return Err(HostError::new("command rejected"));
        }
        state.calls.push(HostCall::Command {
            command: command.to_string(),
            arguments: arguments.to_vec(),
        });
        Ok(())
    }
}

#[async_trait]
impl TaskCatalog for FakeHost {
    async fn fetch_tasks(&self) -> HostResult<Vec<TaskInfo>> {
        Ok(self.state.lock().tasks.clone())
    }

    async fn run_task(&self, task: &TaskInfo) -> HostResult<()> {
        self.record(HostCall::RunTask {
            name: task.name.clone(),
        });
        Ok(())
    }
}

#[async_trait]
impl PathOpener for FakeHost {
    async fn open_location(&self, location: &RemoteLocation) -> HostResult<()> {
        self.record(HostCall::Open {
            uri: location.uri(),
        });
        Ok(())
    }
}
