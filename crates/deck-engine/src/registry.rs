//! Session Registry
//!
//! Maps session names to live shell sessions for one executor.
//!
//! ## Acquisition
//!
//! 1. Registered under the name - reuse it
//! 2. Open in the host under the name - adopt it
//! 3. Otherwise create it (the working directory applies only here)
//!
//! Acquisition holds the registry lock across the host calls, so two
//! concurrent runs asking for the same name get the same session.
//!
//! ## Closing
//!
//! The registry never closes sessions. It drops entries when the host
//! reports a close, matching by id so a same-named replacement survives.

use std::collections::HashMap;
use std::sync::Arc;

use deck_core::HostResult;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

use crate::host::{SessionHandle, SessionId, SessionOptions, ShellHost};

/// Name-to-session mapping owned by one executor.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, SessionHandle>>,

    /// One lock per session so sends to it never interleave.
    send_locks: parking_lot::Mutex<HashMap<SessionId, Arc<Mutex<()>>>>,
}

impl SessionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            send_locks: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    /// Get the session for `name`, adopting or creating one if needed.
    pub async fn acquire(
        &self,
        shell: &dyn ShellHost,
        name: &str,
        working_directory: Option<&str>,
    ) -> HostResult<SessionHandle> {
        let mut sessions = self.sessions.lock().await;

        if let Some(session) = sessions.get(name) {
            return Ok(session.clone());
        }

        if let Some(session) = shell
            .open_sessions()
            .await
            .into_iter()
            .find(|s| s.name == name)
        {
            tracing::debug!("Adopted open session '{}' ({})", name, session.id);
            sessions.insert(name.to_string(), session.clone());
            return Ok(session);
        }

        let session = shell
            .create_session(SessionOptions {
                name: name.to_string(),
                working_directory: working_directory.map(str::to_string),
                parent: None,
            })
            .await?;
        tracing::debug!("Created session '{}' ({})", name, session.id);
        sessions.insert(name.to_string(), session.clone());
        Ok(session)
    }

    /// Register a session under its display name, replacing any entry.
    pub async fn register(&self, session: SessionHandle) {
        self.sessions
            .lock()
            .await
            .insert(session.name.clone(), session);
    }

    /// Look up a registered session by name.
    pub async fn get(&self, name: &str) -> Option<SessionHandle> {
        self.sessions.lock().await.get(name).cloned()
    }

    /// Send text to a session, serialized with other sends to it.
    pub async fn send(
        &self,
        shell: &dyn ShellHost,
        session: &SessionHandle,
        text: &str,
    ) -> HostResult<()> {
        let lock = self
            .send_locks
            .lock()
            .entry(session.id)
            .or_default()
            .clone();
        let _guard = lock.lock().await;
        shell.send_text(session, text).await
    }

    /// Drop the entry for a closed session.
    ///
    /// Returns true if an entry was removed.
    pub async fn remove_closed(&self, id: SessionId) -> bool {
        self.send_locks.lock().remove(&id);

        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.id != id);
        let removed = sessions.len() != before;
        if removed {
            tracing::debug!("Session {} closed, removed from registry", id);
        }
        removed
    }

    /// Drop every entry whose session is not in `open`.
    pub async fn retain_open(&self, open: &[SessionHandle]) {
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, session| open.iter().any(|o| o.id == session.id));
        self.send_locks
            .lock()
            .retain(|id, _| open.iter().any(|o| o.id == *id));
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    /// Forget every session without closing any.
    pub async fn clear(&self) {
        self.sessions.lock().await.clear();
        self.send_locks.lock().clear();
    }

    /// Spawn a task that removes sessions as the host reports them closed.
    ///
    /// If notifications are missed, the registry is reconciled against the
    /// host's open sessions.
    pub fn spawn_close_watcher(
        self: &Arc<Self>,
        shell: Arc<dyn ShellHost>,
        mut closed: broadcast::Receiver<SessionId>,
    ) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match closed.recv().await {
                    Ok(id) => {
                        registry.remove_closed(id).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!("Missed {} session-closed notifications", missed);
                        let open = shell.open_sessions().await;
                        registry.retain_open(&open).await;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
