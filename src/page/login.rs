//! Login page

use async_trait::async_trait;
use chrono::Datelike;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{Controller, Page, PageContext, PageEvent, PageKind, PageScope};
use crate::auth::{hide_overlay, overlay_fallback, AuthGate, GateState};
use crate::display::ids;
use crate::navigation::DASHBOARD_PAGE;

pub const MISSING_FIELDS_MESSAGE: &str = "Please enter both email and password.";
const FALLBACK_ERROR_MESSAGE: &str = "Login failed. Try again.";

const PASSWORD_HIDDEN_LABEL: &str = "👁️";
const PASSWORD_SHOWN_LABEL: &str = "🙈";

/// Login form, password toggle and loading overlay
pub struct LoginController {
    ctx: PageContext,
    submitting: AtomicBool,
    password_visible: AtomicBool,
}

impl LoginController {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            submitting: AtomicBool::new(false),
            password_visible: AtomicBool::new(false),
        }
    }

    fn render_initial(&self) {
        let display = self.ctx.display.as_ref();
        let year = self.ctx.calendar().date_of(self.ctx.clock.now()).year();
        display.set_text(ids::YEAR, &year.to_string());
        display.set_hidden(ids::ERROR_MESSAGE, true);
        display.set_hidden(ids::LOGIN_BUTTON_SPINNER, true);
        display.set_attribute(ids::PASSWORD, "type", "password");
        display.set_text(ids::TOGGLE_PASSWORD, PASSWORD_HIDDEN_LABEL);
    }

    async fn run_gate(self: Arc<Self>, gate: AuthGate) {
        let (state, _) = gate
            .resolve(self.ctx.auth.as_ref(), &self.ctx.config.auth)
            .await;

        match state {
            GateState::Authenticated(_) => self.ctx.navigator.navigate(DASHBOARD_PAGE),
            GateState::Unauthenticated => self.hide_overlay(),
            GateState::SdkUnavailable => {
                tracing::error!("Auth SDK unavailable; showing login form");
                self.hide_overlay();
            }
            GateState::WaitingForSdk => {}
        }
    }

    fn hide_overlay(&self) {
        hide_overlay(self.ctx.display.as_ref(), ids::AUTH_LOADING);
    }

    pub fn toggle_password(&self) {
        let visible = !self.password_visible.fetch_xor(true, Ordering::SeqCst);
        let display = self.ctx.display.as_ref();
        display.set_attribute(
            ids::PASSWORD,
            "type",
            if visible { "text" } else { "password" },
        );
        display.set_text(
            ids::TOGGLE_PASSWORD,
            if visible {
                PASSWORD_SHOWN_LABEL
            } else {
                PASSWORD_HIDDEN_LABEL
            },
        );
    }

    /// Validate and sign in. Overlapping submits are ignored.
    pub async fn submit(&self, email: &str, password: &str) {
        if self.submitting.swap(true, Ordering::SeqCst) {
            tracing::debug!("Sign-in already in progress");
            return;
        }
        self.clear_error();

        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            self.show_error(MISSING_FIELDS_MESSAGE);
            self.submitting.store(false, Ordering::SeqCst);
            return;
        }

        self.set_loading(true);
        match self.ctx.auth.sign_in(email, password).await {
            Ok(user) => {
                tracing::info!(user = %user.display_label(), "Login succeeded");
                self.ctx.navigator.navigate(DASHBOARD_PAGE);
            }
            Err(e) => {
                tracing::error!(error = %e, "Login failed");
                let message = e.to_string();
                self.show_error(if message.is_empty() {
                    FALLBACK_ERROR_MESSAGE
                } else {
                    message.as_str()
                });
            }
        }
        self.set_loading(false);
        self.submitting.store(false, Ordering::SeqCst);
    }

    fn set_loading(&self, loading: bool) {
        let display = self.ctx.display.as_ref();
        display.set_attribute(
            ids::LOGIN_BUTTON,
            "disabled",
            if loading { "true" } else { "false" },
        );
        display.set_hidden(ids::LOGIN_BUTTON_SPINNER, !loading);
        display.set_hidden(ids::LOGIN_BUTTON_TEXT, loading);
    }

    fn show_error(&self, message: &str) {
        let display = self.ctx.display.as_ref();
        display.set_text(ids::ERROR_MESSAGE, message);
        display.set_hidden(ids::ERROR_MESSAGE, false);
    }

    fn clear_error(&self) {
        let display = self.ctx.display.as_ref();
        display.set_text(ids::ERROR_MESSAGE, "");
        display.set_hidden(ids::ERROR_MESSAGE, true);
    }
}

#[async_trait]
impl Controller for LoginController {
    async fn handle(&self, event: &PageEvent) -> bool {
        match event {
            PageEvent::Click { target } if target == ids::OVERLAY_CONTINUE => {
                tracing::info!("Overlay dismissed by user");
                self.hide_overlay();
            }
            PageEvent::Click { target } if target == ids::TOGGLE_PASSWORD => {
                self.toggle_password()
            }
            PageEvent::Submit { form, fields } if form == ids::LOGIN_FORM => {
                let email = fields.get(ids::EMAIL).map(String::as_str).unwrap_or_default();
                let password = fields
                    .get(ids::PASSWORD)
                    .map(String::as_str)
                    .unwrap_or_default();
                self.submit(email, password).await;
            }
            _ => return false,
        }
        true
    }
}

pub(super) fn boot(ctx: PageContext) -> Page {
    let scope = Arc::new(PageScope::new());
    let gate = AuthGate::new();

    let login = Arc::new(LoginController::new(ctx.clone()));
    login.render_initial();

    scope.spawn(overlay_fallback(
        ctx.display.clone(),
        ids::AUTH_LOADING,
        &gate,
        &ctx.config.auth,
    ));
    scope.spawn(login.clone().run_gate(gate));

    let controllers: Vec<Arc<dyn Controller>> = vec![login];
    Page::new(PageKind::Login, controllers, scope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthState, MemoryAuth, User};
    use crate::backend::DocumentStore;
    use crate::clock::FixedClock;
    use crate::config::DashboardConfig;
    use crate::display::{Display, MemoryDisplay};
    use crate::navigation::RecordingNavigator;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    struct Fixture {
        auth: Arc<MemoryAuth>,
        display: Arc<MemoryDisplay>,
        nav: Arc<RecordingNavigator>,
    }

    impl Fixture {
        fn new() -> Self {
            let auth = MemoryAuth::new();
            auth.add_user("admin@school.id", "secret", Some("Admin"));
            Self {
                auth: Arc::new(auth),
                display: Arc::new(MemoryDisplay::new(ids::login_page())),
                nav: Arc::new(RecordingNavigator::new()),
            }
        }

        fn boot(&self) -> Page {
            let ctx = PageContext::new(
                Arc::new(DocumentStore::default()),
                self.auth.clone(),
                self.display.clone(),
                self.nav.clone(),
                Arc::new(FixedClock::new(
                    Utc.with_ymd_and_hms(2025, 1, 15, 8, 0, 0).unwrap(),
                )),
                Arc::new(DashboardConfig::default()),
            )
            .with_path("/login.html");
            Page::boot(PageKind::Login, ctx)
        }

        fn overlay_hidden(&self) -> bool {
            self.display.has_class(ids::AUTH_LOADING, "hidden")
        }
    }

    fn login(email: &str, password: &str) -> PageEvent {
        PageEvent::submit(
            ids::LOGIN_FORM,
            [(ids::EMAIL, email), (ids::PASSWORD, password)],
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_render() {
        let f = Fixture::new();
        let _page = f.boot();
        assert_eq!(f.display.text(ids::YEAR).as_deref(), Some("2025"));
        assert!(f.display.element(ids::ERROR_MESSAGE).unwrap().hidden);
        assert!(!f.overlay_hidden());
    }

    #[tokio::test(start_paused = true)]
    async fn test_signed_out_hides_overlay() {
        let f = Fixture::new();
        f.auth.resolve(AuthState::SignedOut);
        let _page = f.boot();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(f.overlay_hidden());
        assert_eq!(f.nav.last(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_signed_in_redirects() {
        let f = Fixture::new();
        f.auth.resolve(AuthState::SignedIn(User::new(None, Some("a@b.c"))));
        let _page = f.boot();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(f.nav.last().as_deref(), Some(DASHBOARD_PAGE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlay_fallback_when_state_unknown() {
        let f = Fixture::new();
        let _page = f.boot();

        tokio::time::sleep(Duration::from_millis(1400)).await;
        assert!(!f.overlay_hidden());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(f.overlay_hidden());
    }

    #[tokio::test(start_paused = true)]
    async fn test_continue_button_hides_overlay() {
        let f = Fixture::new();
        let page = f.boot();
        assert!(page.dispatch(&PageEvent::click(ids::OVERLAY_CONTINUE)).await);
        assert!(f.overlay_hidden());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_fields_rejected() {
        let f = Fixture::new();
        let page = f.boot();
        page.dispatch(&login("   ", "secret")).await;
        assert_eq!(
            f.display.text(ids::ERROR_MESSAGE).as_deref(),
            Some(MISSING_FIELDS_MESSAGE)
        );
        assert!(!f.display.element(ids::ERROR_MESSAGE).unwrap().hidden);
        assert_eq!(f.nav.last(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bad_then_good_credentials() {
        let f = Fixture::new();
        let page = f.boot();

        page.dispatch(&login("admin@school.id", "nope")).await;
        assert_eq!(
            f.display.text(ids::ERROR_MESSAGE).as_deref(),
            Some("Invalid email or password.")
        );
        assert_eq!(
            f.display.attribute(ids::LOGIN_BUTTON, "disabled").as_deref(),
            Some("false")
        );
        assert!(f.display.element(ids::LOGIN_BUTTON_SPINNER).unwrap().hidden);

        page.dispatch(&login(" admin@school.id ", "secret")).await;
        assert_eq!(f.nav.last().as_deref(), Some(DASHBOARD_PAGE));
        assert!(f.display.element(ids::ERROR_MESSAGE).unwrap().hidden);
    }

    #[tokio::test(start_paused = true)]
    async fn test_password_toggle() {
        let f = Fixture::new();
        let page = f.boot();

        page.dispatch(&PageEvent::click(ids::TOGGLE_PASSWORD)).await;
        assert_eq!(f.display.attribute(ids::PASSWORD, "type").as_deref(), Some("text"));
        assert_eq!(f.display.text(ids::TOGGLE_PASSWORD).as_deref(), Some("🙈"));

        page.dispatch(&PageEvent::click(ids::TOGGLE_PASSWORD)).await;
        assert_eq!(
            f.display.attribute(ids::PASSWORD, "type").as_deref(),
            Some("password")
        );
        assert_eq!(f.display.text(ids::TOGGLE_PASSWORD).as_deref(), Some("👁️"));
    }
}
