//! Local process-backed host.
//!
//! Each session is an `sh` child with piped stdin; sent text is written to
//! it line by line. Editor commands and path opens have no local meaning
//! and are logged. Tasks come from the menu file's `[tasks]` table and run
//! as one-shot `sh -c` children.

use std::collections::{BTreeMap, HashMap};
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use deck_core::{HostError, HostResult, RemoteLocation};
use deck_engine::{
    CommandDispatcher, PathOpener, SessionHandle, SessionId, SessionOptions, ShellHost,
    TaskCatalog, TaskInfo,
};
use parking_lot::Mutex;
use tokio::io::AsyncWriteExt;
use tokio::process::{ChildStdin, Command};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

struct LocalSession {
    handle: SessionHandle,

    /// Taken on shutdown so the shell sees end of input.
    stdin: tokio::sync::Mutex<Option<ChildStdin>>,
}

pub struct LocalHost {
    sessions: Arc<Mutex<HashMap<SessionId, Arc<LocalSession>>>>,
    tasks: BTreeMap<String, String>,
    closed: broadcast::Sender<SessionId>,
    children: Mutex<Vec<JoinHandle<()>>>,
}

impl LocalHost {
    pub fn new(tasks: BTreeMap<String, String>) -> Self {
        let (closed, _) = broadcast::channel(64);
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            tasks,
            closed,
            children: Mutex::new(Vec::new()),
        }
    }

    /// Close every session's input and wait for all children to exit.
    pub async fn shutdown(&self) {
        let sessions: Vec<Arc<LocalSession>> = self.sessions.lock().values().cloned().collect();
        for session in sessions {
            session.stdin.lock().await.take();
        }

        let children = std::mem::take(&mut *self.children.lock());
        tracing::debug!("Waiting for {} child processes", children.len());
        futures::future::join_all(children).await;
    }

    fn spawn(&self, command: &mut Command, what: &str) -> HostResult<tokio::process::Child> {
        command
            .spawn()
            .map_err(|e| HostError::new(format!("Failed to spawn {}: {}", what, e)))
    }
}

#[async_trait]
impl ShellHost for LocalHost {
    async fn create_session(&self, options: SessionOptions) -> HostResult<SessionHandle> {
        let mut command = Command::new("sh");
        command.stdin(Stdio::piped());
        if let Some(dir) = &options.working_directory {
            command.current_dir(dir);
        }
        let mut child = self.spawn(&mut command, "shell")?;

        let handle = SessionHandle::new(options.name);
        let session = Arc::new(LocalSession {
            handle: handle.clone(),
            stdin: tokio::sync::Mutex::new(child.stdin.take()),
        });
        self.sessions.lock().insert(handle.id, session);

        match options.parent {
            Some(parent) => tracing::info!("Opened session '{}' split from {}", handle.name, parent),
            None => tracing::info!("Opened session '{}'", handle.name),
        }

        let sessions = Arc::clone(&self.sessions);
        let closed = self.closed.clone();
        let id = handle.id;
        let name = handle.name.clone();
        let waiter = tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => tracing::debug!("Session '{}' exited: {}", name, status),
                Err(e) => tracing::warn!("Session '{}' wait failed: {}", name, e),
            }
            sessions.lock().remove(&id);
            let _ = closed.send(id);
        });
        self.children.lock().push(waiter);

        Ok(handle)
    }

    async fn open_sessions(&self) -> Vec<SessionHandle> {
        self.sessions
            .lock()
            .values()
            .map(|s| s.handle.clone())
            .collect()
    }

    async fn send_text(&self, session: &SessionHandle, text: &str) -> HostResult<()> {
        let local = self
            .sessions
            .lock()
            .get(&session.id)
            .cloned()
            .ok_or_else(|| HostError::new(format!("Session '{}' is closed", session.name)))?;

        let mut stdin = local.stdin.lock().await;
        let stdin = stdin
            .as_mut()
            .ok_or_else(|| HostError::new(format!("Session '{}' is closed", session.name)))?;

        let line = format!("{}\n", text);
        stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| HostError::new(e.to_string()))?;
        stdin.flush().await.map_err(|e| HostError::new(e.to_string()))
    }

    async fn show(&self, session: &SessionHandle) -> HostResult<()> {
        tracing::debug!("Focus session '{}'", session.name);
        Ok(())
    }

    fn subscribe_closed(&self) -> broadcast::Receiver<SessionId> {
        self.closed.subscribe()
    }
}

#[async_trait]
impl CommandDispatcher for LocalHost {
    async fn execute_command(
        &self,
        command: &str,
        arguments: &[serde_json::Value],
    ) -> HostResult<()> {
        tracing::info!("Editor command '{}' {:?}", command, arguments);
        Ok(())
    }
}

#[async_trait]
impl TaskCatalog for LocalHost {
    async fn fetch_tasks(&self) -> HostResult<Vec<TaskInfo>> {
        Ok(self.tasks.keys().map(TaskInfo::new).collect())
    }

    async fn run_task(&self, task: &TaskInfo) -> HostResult<()> {
        let line = self
            .tasks
            .get(&task.name)
            .ok_or_else(|| HostError::new(format!("Unknown task '{}'", task.name)))?;

        let mut child = self.spawn(Command::new("sh").args(["-c", line]), "task")?;
        tracing::info!("Started task '{}'", task.name);

        let name = task.name.clone();
        let waiter = tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => tracing::info!("Task '{}' finished", name),
                Ok(status) => tracing::warn!("Task '{}' exited: {}", name, status),
                Err(e) => tracing::warn!("Task '{}' wait failed: {}", name, e),
            }
        });
        self.children.lock().push(waiter);
        Ok(())
    }
}

#[async_trait]
impl PathOpener for LocalHost {
    async fn open_location(&self, location: &RemoteLocation) -> HostResult<()> {
        tracing::info!("Open {}", location.uri());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tasks() -> BTreeMap<String, String> {
        [("build", "true"), ("lint", "true")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_fetch_tasks_lists_names() {
        let host = LocalHost::new(tasks());
        let names: Vec<String> = host
            .fetch_tasks()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["build", "lint"]);
    }

    #[tokio::test]
    async fn test_run_unknown_task_fails() {
        let host = LocalHost::new(BTreeMap::new());
        assert!(host.run_task(&TaskInfo::new("deploy")).await.is_err());
    }

    #[tokio::test]
    async fn test_session_writes_and_closes() {
        let dir = tempfile::tempdir().unwrap();
        let host = LocalHost::new(BTreeMap::new());
        let mut closed = host.subscribe_closed();

        let session = host
            .create_session(SessionOptions {
                working_directory: Some(dir.path().display().to_string()),
                ..SessionOptions::new("test")
            })
            .await
            .unwrap();
        assert_eq!(host.open_sessions().await, vec![session.clone()]);

        host.send_text(&session, "echo hello > out.txt").await.unwrap();
        host.shutdown().await;

        assert_eq!(closed.recv().await.unwrap(), session.id);
        assert!(host.open_sessions().await.is_empty());
        let out = std::fs::read_to_string(dir.path().join("out.txt")).unwrap();
        assert_eq!(out.trim(), "hello");
    }
}
