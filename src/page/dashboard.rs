//! Dashboard page

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{Controller, Page, PageContext, PageEvent, PageKind, PageScope};
use crate::aggregator::LiveMetrics;
use crate::auth::{AuthGate, AuthState, AuthStream, GateState, User};
use crate::content::{render_feature_cards, render_quick_links, LinkController};
use crate::display::ids;
use crate::navigation::{LOGIN_PAGE, PROJECTS_PAGE, TARGET_LIST_PAGE};
use crate::sidebar::SidebarController;

/// Auth-gated part of the dashboard: welcome header, shortcut buttons and
/// the live metrics
pub struct DashboardController {
    ctx: PageContext,
    gate: AuthGate,
    signed_in: AtomicBool,
}

impl DashboardController {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            gate: AuthGate::new(),
            signed_in: AtomicBool::new(false),
        }
    }

    fn render_welcome(&self, user: &User) {
        let display = self.ctx.display.as_ref();
        display.set_text(
            ids::WELCOME_TITLE,
            &format!("Welcome back, {}!", user.display_label()),
        );
        display.set_text(ids::AVATAR_CIRCLE, &user.initial());
    }

    /// Resolve the gate, then either start the live dashboard or leave
    async fn run_gate(self: Arc<Self>, scope: Arc<PageScope>) {
        let (state, stream) = self
            .gate
            .resolve(self.ctx.auth.as_ref(), &self.ctx.config.auth)
            .await;

        match state {
            GateState::Authenticated(user) => {
                self.render_welcome(&user);
                self.signed_in.store(true, Ordering::SeqCst);
                scope.adopt(LiveMetrics::start(&self.ctx));
                if let Some(stream) = stream {
                    self.follow(stream).await;
                }
            }
            GateState::Unauthenticated => self.ctx.navigator.navigate(LOGIN_PAGE),
            GateState::SdkUnavailable => {
                tracing::warn!("Auth unavailable; live metrics not started");
            }
            GateState::WaitingForSdk => {}
        }
    }

    /// Leave for the login page on a later sign-out
    async fn follow(&self, mut stream: AuthStream) {
        while let Some(state) = stream.next().await {
            if state == AuthState::SignedOut {
                self.signed_in.store(false, Ordering::SeqCst);
                tracing::info!("Signed out; leaving dashboard");
                self.ctx.navigator.navigate(LOGIN_PAGE);
                return;
            }
        }
    }
}

#[async_trait]
impl Controller for DashboardController {
    async fn handle(&self, event: &PageEvent) -> bool {
        let destination = match event.clicked() {
            Some(ids::VIEW_PROJECTS_BUTTON) => PROJECTS_PAGE,
            Some(ids::VIEW_TARGETS_BUTTON) => TARGET_LIST_PAGE,
            _ => return false,
        };
        if !self.signed_in.load(Ordering::SeqCst) {
            return false;
        }
        self.ctx.navigator.navigate(destination);
        true
    }
}

pub(super) fn boot(ctx: PageContext) -> Page {
    let scope = Arc::new(PageScope::new());
    let display = ctx.display.clone();

    let sidebar = Arc::new(SidebarController::new(
        display.clone(),
        ctx.auth.clone(),
        ctx.navigator.clone(),
        ctx.config.sidebar.breakpoint_px,
    ));
    sidebar.boot(&ctx.path, ctx.viewport_width);

    render_feature_cards(display.as_ref());
    render_quick_links(display.as_ref());
    let links = Arc::new(LinkController::new(display, ctx.navigator.clone()));

    let dashboard = Arc::new(DashboardController::new(ctx));
    scope.spawn(dashboard.clone().run_gate(scope.clone()));

    let controllers: Vec<Arc<dyn Controller>> = vec![sidebar, links, dashboard];
    Page::new(PageKind::Dashboard, controllers, scope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryAuth;
    use crate::backend::{Document, DocumentStore};
    use crate::clock::FixedClock;
    use crate::config::DashboardConfig;
    use crate::display::{Display, MemoryDisplay};
    use crate::navigation::RecordingNavigator;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    struct Fixture {
        store: Arc<DocumentStore>,
        auth: Arc<MemoryAuth>,
        display: Arc<MemoryDisplay>,
        nav: Arc<RecordingNavigator>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                store: Arc::new(DocumentStore::default()),
                auth: Arc::new(MemoryAuth::new()),
                display: Arc::new(MemoryDisplay::new(ids::dashboard_page())),
                nav: Arc::new(RecordingNavigator::new()),
            }
        }

        fn boot(&self) -> Page {
            let ctx = PageContext::new(
                self.store.clone(),
                self.auth.clone(),
                self.display.clone(),
                self.nav.clone(),
                Arc::new(FixedClock::new(
                    Utc.with_ymd_and_hms(2024, 7, 4, 9, 0, 0).unwrap(),
                )),
                Arc::new(DashboardConfig::default()),
            )
            .with_path("/dashboard.html")
            .with_viewport_width(1280);
            Page::boot(PageKind::Dashboard, ctx)
        }
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_signed_in_starts_metrics() {
        let f = Fixture::new();
        f.store
            .insert("studentViolations", Document::new("v1"))
            .await
            .unwrap();
        f.auth.resolve(AuthState::SignedIn(User::new(
            Some("Siti Aminah"),
            Some("siti@school.id"),
        )));

        let page = f.boot();
        settle().await;

        assert_eq!(
            f.display.text(ids::WELCOME_TITLE).as_deref(),
            Some("Welcome back, Siti Aminah!")
        );
        assert_eq!(f.display.text(ids::AVATAR_CIRCLE).as_deref(), Some("S"));
        assert_eq!(f.display.text(ids::VIOLATIONS).as_deref(), Some("1"));
        assert!(f.display.has_class(&ids::nav_item("dashboard"), "active"));

        assert!(page.dispatch(&PageEvent::click(ids::VIEW_TARGETS_BUTTON)).await);
        assert_eq!(f.nav.last().as_deref(), Some(TARGET_LIST_PAGE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_signed_out_redirects() {
        let f = Fixture::new();
        f.auth.resolve(AuthState::SignedOut);

        let page = f.boot();
        settle().await;

        assert_eq!(f.nav.last().as_deref(), Some(LOGIN_PAGE));
        assert!(!page.dispatch(&PageEvent::click(ids::VIEW_PROJECTS_BUTTON)).await);
        assert_eq!(f.store.subscription_count("studentViolations").await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_later_sign_out_redirects() {
        let f = Fixture::new();
        f.auth.resolve(AuthState::SignedIn(User::new(None, Some("a@b.c"))));
        let _page = f.boot();
        settle().await;
        assert_eq!(f.nav.last(), None);

        f.auth.resolve(AuthState::SignedOut);
        settle().await;
        assert_eq!(f.nav.last().as_deref(), Some(LOGIN_PAGE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unavailable_sdk_keeps_page_usable() {
        let f = Fixture::new();
        f.auth.set_ready(false);
        let page = f.boot();

        tokio::time::sleep(Duration::from_millis(6000)).await;
        assert_eq!(f.nav.last(), None);
        assert_eq!(f.display.text(ids::ACTIVE_PROJECTS).as_deref(), Some(""));

        page.dispatch(&PageEvent::click(&ids::feature_link("PPM Calendar")))
            .await;
        assert_eq!(f.nav.last().as_deref(), Some("ppm-calendar.html"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_tears_down_subscriptions() {
        let f = Fixture::new();
        f.auth.resolve(AuthState::SignedIn(User::new(None, Some("a@b.c"))));
        let page = f.boot();
        settle().await;
        assert_eq!(f.store.subscription_count("projectsPPM").await, 1);

        page.dispose();
        settle().await;
        f.store
            .insert("projectsPPM", Document::new("p1").field("status", "Active"))
            .await
            .unwrap();
        assert_eq!(f.store.subscription_count("projectsPPM").await, 0);
        assert_eq!(f.display.text(ids::ACTIVE_PROJECTS).as_deref(), Some("0"));
    }
}
