//! Application State
//!
//! Shared state accessible by all API handlers and page sessions.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

use crate::auth::AuthService;
use crate::backend::DocumentStore;
use crate::clock::{Clock, SystemClock};
use crate::config::DashboardConfig;
use crate::page::{PageContext, PageKind};
use crate::websocket::{HubConfig, ServerMessage, SessionDisplay, SessionHub, SessionNavigator};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Live document collections
    pub store: Arc<DocumentStore>,
    /// Auth provider shared by every session
    pub auth: Arc<dyn AuthService>,
    /// Connected browser sessions
    pub hub: Arc<SessionHub>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<DashboardConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        store: Arc<DocumentStore>,
        auth: Arc<dyn AuthService>,
        config: DashboardConfig,
    ) -> Self {
        let hub = SessionHub::new(HubConfig {
            max_sessions: config.server.max_sessions,
        });
        Self {
            store,
            auth,
            hub: Arc::new(hub),
            clock: Arc::new(SystemClock),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Replace the clock, e.g. with a fixed one for reproducible renders
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Services for one page session, with display and navigation routed to
    /// the session's outbound channel
    pub fn page_context(
        &self,
        page: PageKind,
        outbox: mpsc::UnboundedSender<ServerMessage>,
    ) -> PageContext {
        PageContext::new(
            self.store.clone(),
            self.auth.clone(),
            Arc::new(SessionDisplay::new(page, outbox.clone())),
            Arc::new(SessionNavigator::new(outbox)),
            self.clock.clone(),
            self.config.clone(),
        )
    }
}
