//! Page Runtime
//!
//! A page is a set of controllers sharing one [`PageContext`]. Booting a page
//! renders its static parts, starts its background tasks inside a
//! [`PageScope`] and returns a [`Page`] that dispatches user events until the
//! event source closes.

mod dashboard;
mod event;
mod login;
mod scope;

pub use dashboard::DashboardController;
pub use event::PageEvent;
pub use login::LoginController;
pub use scope::PageScope;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::auth::AuthService;
use crate::backend::SubscriptionService;
use crate::clock::{Calendar, Clock};
use crate::config::DashboardConfig;
use crate::display::Display;
use crate::navigation::Navigator;

/// Services a page runs against
#[derive(Clone)]
pub struct PageContext {
    pub backend: Arc<dyn SubscriptionService>,
    pub auth: Arc<dyn AuthService>,
    pub display: Arc<dyn Display>,
    pub navigator: Arc<dyn Navigator>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<DashboardConfig>,
    /// Location path the page was loaded from
    pub path: String,
    /// Initial viewport width, if the client reported one
    pub viewport_width: Option<u32>,
}

impl PageContext {
    pub fn new(
        backend: Arc<dyn SubscriptionService>,
        auth: Arc<dyn AuthService>,
        display: Arc<dyn Display>,
        navigator: Arc<dyn Navigator>,
        clock: Arc<dyn Clock>,
        config: Arc<DashboardConfig>,
    ) -> Self {
        Self {
            backend,
            auth,
            display,
            navigator,
            clock,
            config,
            path: String::new(),
            viewport_width: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_viewport_width(mut self, width: u32) -> Self {
        self.viewport_width = Some(width);
        self
    }

    /// Calendar for the configured UTC offset
    pub fn calendar(&self) -> Calendar {
        Calendar::with_offset_minutes(self.config.metrics.utc_offset_minutes)
    }
}

/// Handles user events for part of a page
#[async_trait]
pub trait Controller: Send + Sync {
    /// Returns `true` if the event was handled
    async fn handle(&self, event: &PageEvent) -> bool;
}

/// Which page to boot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Dashboard,
    Login,
}

impl PageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageKind::Dashboard => "dashboard",
            PageKind::Login => "login",
        }
    }

    /// Ids of the static elements this page's markup provides
    pub fn element_ids(&self) -> Vec<&'static str> {
        match self {
            PageKind::Dashboard => crate::display::ids::dashboard_page(),
            PageKind::Login => crate::display::ids::login_page(),
        }
    }
}

impl std::str::FromStr for PageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dashboard" | "dashboard.html" => Ok(PageKind::Dashboard),
            "login" | "login.html" => Ok(PageKind::Login),
            other => Err(format!("unknown page: {}", other)),
        }
    }
}

/// A booted page
pub struct Page {
    kind: PageKind,
    controllers: Vec<Arc<dyn Controller>>,
    scope: Arc<PageScope>,
}

impl Page {
    /// Boot a page of the given kind
    pub fn boot(kind: PageKind, ctx: PageContext) -> Page {
        tracing::info!(page = kind.as_str(), path = %ctx.path, "Booting page");
        match kind {
            PageKind::Dashboard => dashboard::boot(ctx),
            PageKind::Login => login::boot(ctx),
        }
    }

    fn new(kind: PageKind, controllers: Vec<Arc<dyn Controller>>, scope: Arc<PageScope>) -> Self {
        Self {
            kind,
            controllers,
            scope,
        }
    }

    pub fn kind(&self) -> PageKind {
        self.kind
    }

    pub fn scope(&self) -> &PageScope {
        &self.scope
    }

    /// Offer an event to every controller. Returns whether any handled it.
    pub async fn dispatch(&self, event: &PageEvent) -> bool {
        let mut handled = false;
        for controller in &self.controllers {
            handled |= controller.handle(event).await;
        }
        if !handled {
            tracing::trace!(event = ?event, "Unhandled page event");
        }
        handled
    }

    /// Dispatch events until the source closes, then dispose the page
    pub async fn run(self, mut events: mpsc::UnboundedReceiver<PageEvent>) {
        while let Some(event) = events.recv().await {
            self.dispatch(&event).await;
        }
        tracing::debug!(page = self.kind.as_str(), "Event source closed");
        self.dispose();
    }

    pub fn dispose(&self) {
        self.scope.dispose();
    }
}

impl Drop for Page {
    fn drop(&mut self) {
        self.scope.dispose();
    }
}
