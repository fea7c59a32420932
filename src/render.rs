//! Headless page rendering
//!
//! Boots a page against the seeded demo store with an in-memory display,
//! lets it settle and reports the resulting element tree.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthState, User};
use crate::backend::{BackendResult, DocumentStore};
use crate::clock::FixedClock;
use crate::config::DashboardConfig;
use crate::demo::{demo_auth, seed_demo, DEMO_EMAIL, DEMO_NAME};
use crate::display::{ElementState, MemoryDisplay};
use crate::navigation::RecordingNavigator;
use crate::page::{Page, PageContext, PageKind};

/// What to render
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub page: PageKind,
    pub path: String,
    pub viewport_width: Option<u32>,
    /// Resolve the auth state as the demo user instead of signed out
    pub signed_in: bool,
    /// How long timers and subscriptions may run before the snapshot
    pub settle: Duration,
    pub now: DateTime<Utc>,
}

impl RenderOptions {
    pub fn new(page: PageKind, now: DateTime<Utc>) -> Self {
        Self {
            page,
            path: format!("/{}.html", page.as_str()),
            viewport_width: None,
            signed_in: true,
            settle: Duration::from_millis(50),
            now,
        }
    }
}

/// Display state after settling
#[derive(Debug, Serialize)]
pub struct RenderReport {
    pub page: PageKind,
    pub elements: BTreeMap<String, ElementState>,
    /// Redirects issued, oldest first
    pub navigations: Vec<String>,
    pub alerts: Vec<String>,
}

pub async fn render_page(
    options: RenderOptions,
    config: DashboardConfig,
) -> BackendResult<RenderReport> {
    let store = Arc::new(DocumentStore::default());
    seed_demo(&store, options.now).await?;

    let auth = demo_auth();
    auth.resolve(if options.signed_in {
        AuthState::SignedIn(User::new(Some(DEMO_NAME), Some(DEMO_EMAIL)))
    } else {
        AuthState::SignedOut
    });

    let display = Arc::new(MemoryDisplay::new(options.page.element_ids()));
    let navigator = Arc::new(RecordingNavigator::new());

    let mut ctx = PageContext::new(
        store,
        Arc::new(auth),
        display.clone(),
        navigator.clone(),
        Arc::new(FixedClock::new(options.now)),
        Arc::new(config),
    )
    .with_path(options.path.clone());
    if let Some(width) = options.viewport_width {
        ctx = ctx.with_viewport_width(width);
    }

    let page = Page::boot(options.page, ctx);
    tokio::time::sleep(options.settle).await;
    page.dispose();

    let patches = display.applied_count();
    tracing::debug!(page = options.page.as_str(), patches, "Render settled");

    Ok(RenderReport {
        page: options.page,
        elements: display.snapshot(),
        navigations: navigator.history(),
        alerts: display.alerts(),
    })
}
