//! WebSocket Session Hub
//!
//! Tracks every connected browser session and the page it runs, and routes
//! server messages to a session's outbound channel.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use super::messages::ServerMessage;
use crate::page::PageKind;

/// Unique identifier for a browser session
pub type SessionId = String;

/// Manages all live sessions
pub struct SessionHub {
    /// Active sessions: SessionId → SessionHandle
    sessions: Arc<RwLock<HashMap<SessionId, SessionHandle>>>,
    config: HubConfig,
}

/// Configuration for the session hub
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Maximum number of concurrent sessions
    pub max_sessions: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self { max_sessions: 256 }
    }
}

/// Handle for sending messages to a specific session
pub struct SessionHandle {
    pub sender: mpsc::UnboundedSender<ServerMessage>,
    pub page: PageKind,
    pub connected_at: DateTime<Utc>,
}

/// Session counts for health reporting
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HubStats {
    pub sessions: usize,
    pub by_page: BTreeMap<String, usize>,
}

impl SessionHub {
    pub fn new(config: HubConfig) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Register a new session.
    ///
    /// Returns the session ID, or an error once the session limit is reached.
    pub async fn register(
        &self,
        sender: mpsc::UnboundedSender<ServerMessage>,
        page: PageKind,
    ) -> Result<SessionId, HubError> {
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.config.max_sessions {
            return Err(HubError::TooManySessions(self.config.max_sessions));
        }

        let id = Uuid::new_v4().to_string();
        sessions.insert(
            id.clone(),
            SessionHandle {
                sender,
                page,
                connected_at: Utc::now(),
            },
        );

        tracing::info!(session_id = %id, page = page.as_str(), "Session connected");
        Ok(id)
    }

    pub async fn unregister(&self, id: &str) {
        if let Some(handle) = self.sessions.write().await.remove(id) {
            let duration = Utc::now() - handle.connected_at;
            tracing::info!(
                session_id = %id,
                page = handle.page.as_str(),
                duration_secs = duration.num_seconds(),
                "Session disconnected"
            );
        }
    }

    /// Send a message directly to a specific session
    pub async fn send_to(&self, id: &str, message: ServerMessage) -> Result<(), HubError> {
        let sessions = self.sessions.read().await;
        let handle = sessions.get(id).ok_or(HubError::SessionNotFound)?;

        handle
            .sender
            .send(message)
            .map_err(|_| HubError::SendFailed)
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn stats(&self) -> HubStats {
        let sessions = self.sessions.read().await;
        let mut by_page = BTreeMap::new();
        for handle in sessions.values() {
            *by_page.entry(handle.page.as_str().to_string()).or_insert(0) += 1;
        }
        HubStats {
            sessions: sessions.len(),
            by_page,
        }
    }
}

/// Errors that can occur in the session hub
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Too many sessions (limit: {0})")]
    TooManySessions(usize),

    #[error("Session not found")]
    SessionNotFound,

    #[error("Failed to send message")]
    SendFailed,
}
