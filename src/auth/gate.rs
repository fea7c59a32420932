//! Auth Gate
//!
//! `WaitingForSdk` → `Authenticated` | `Unauthenticated` | `SdkUnavailable`.
//! The SDK is polled for readiness on a fixed interval up to a maximum wait;
//! once ready, the first sign-in state event decides. A separate fallback
//! timer unblocks the loading overlay if that event is late.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, sleep, Instant, MissedTickBehavior};

use super::{AuthService, AuthState, AuthStream, User};
use crate::config::AuthConfig;
use crate::display::Display;

#[derive(Debug, Clone, PartialEq)]
pub enum GateState {
    WaitingForSdk,
    Authenticated(User),
    Unauthenticated,
    SdkUnavailable,
}

impl GateState {
    /// Whether the sign-in state stream has delivered its first event
    pub fn is_resolved(&self) -> bool {
        matches!(self, GateState::Authenticated(_) | GateState::Unauthenticated)
    }
}

/// Wait until the auth SDK reports ready. Returns `false` after
/// `sdk_max_wait_ms` without readiness.
pub async fn wait_for_sdk(auth: &dyn AuthService, config: &AuthConfig) -> bool {
    if auth.is_ready() {
        return true;
    }

    let started = Instant::now();
    let max_wait = Duration::from_millis(config.sdk_max_wait_ms);
    let mut ticker = interval(Duration::from_millis(config.sdk_poll_interval_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if auth.is_ready() {
            tracing::debug!(waited_ms = started.elapsed().as_millis() as u64, "Auth SDK ready");
            return true;
        }
        if started.elapsed() >= max_wait {
            tracing::warn!(max_wait_ms = config.sdk_max_wait_ms, "Auth SDK not ready; giving up");
            return false;
        }
    }
}

/// Observable gate for one page
#[derive(Clone)]
pub struct AuthGate {
    state: watch::Sender<GateState>,
}

impl Default for AuthGate {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthGate {
    pub fn new() -> Self {
        let (state, _) = watch::channel(GateState::WaitingForSdk);
        Self { state }
    }

    pub fn state(&self) -> GateState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GateState> {
        self.state.subscribe()
    }

    /// Run the gate to its decision.
    ///
    /// Returns the decided state and, when the SDK came up, the sign-in
    /// stream positioned after the deciding event.
    pub async fn resolve(
        &self,
        auth: &dyn AuthService,
        config: &AuthConfig,
    ) -> (GateState, Option<AuthStream>) {
        if !wait_for_sdk(auth, config).await {
            return (self.transition(GateState::SdkUnavailable), None);
        }

        let mut stream = auth.watch();
        let decided = match stream.next().await {
            Some(AuthState::SignedIn(user)) => GateState::Authenticated(user),
            Some(AuthState::SignedOut) => GateState::Unauthenticated,
            None => {
                tracing::warn!("Auth state stream closed before first event");
                GateState::SdkUnavailable
            }
        };
        (self.transition(decided), Some(stream))
    }

    fn transition(&self, next: GateState) -> GateState {
        tracing::info!(state = ?next, "Auth gate decided");
        self.state.send_replace(next.clone());
        next
    }
}

/// Hide the loading overlay and let clicks through
pub fn hide_overlay(display: &dyn Display, id: &str) {
    display.set_class(id, "hidden", true);
    display.set_style(id, "pointer-events", "none");
}

/// Hide the overlay after `overlay_fallback_ms` unless the gate has heard
/// from the sign-in stream by then.
pub fn overlay_fallback(
    display: Arc<dyn Display>,
    overlay_id: &str,
    gate: &AuthGate,
    config: &AuthConfig,
) -> impl Future<Output = ()> + Send + 'static {
    let overlay_id = overlay_id.to_string();
    let state = gate.subscribe();
    let delay = Duration::from_millis(config.overlay_fallback_ms);

    async move {
        sleep(delay).await;
        if !state.borrow().is_resolved() {
            tracing::warn!(
                fallback_ms = delay.as_millis() as u64,
                "Auth state still unknown; hiding overlay"
            );
            hide_overlay(display.as_ref(), &overlay_id);
        }
    }
}
