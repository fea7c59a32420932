//! Authentication
//!
//! ## Architecture
//!
//! - **AuthService**: trait seam over the hosted identity provider
//! - **MemoryAuth**: in-process accounts, used for tests, demos and the
//!   bundled server
//! - **AuthGate**: bounded wait for the provider, then the first sign-in
//!   state event decides what the page does

mod gate;
mod memory;

pub use gate::{hide_overlay, overlay_fallback, wait_for_sdk, AuthGate, GateState};
pub use memory::MemoryAuth;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;

/// Signed-in user profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub display_name: Option<String>,
    pub email: Option<String>,
}

impl User {
    pub fn new(display_name: Option<&str>, email: Option<&str>) -> Self {
        Self {
            display_name: display_name.map(str::to_string),
            email: email.map(str::to_string),
        }
    }

    /// Display name, else the e-mail local part, else "User"
    pub fn display_label(&self) -> String {
        if let Some(name) = self.display_name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }
        self.email
            .as_deref()
            .and_then(|e| e.split('@').next())
            .filter(|local| !local.is_empty())
            .unwrap_or("User")
            .to_string()
    }

    /// Upper-cased first character of the display label
    pub fn initial(&self) -> String {
        self.display_label()
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "U".to_string())
    }
}

/// Sign-in state as reported by the provider
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    SignedIn(User),
    SignedOut,
}

/// Errors from auth actions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("Auth service not ready")]
    NotReady,

    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("{0}")]
    Provider(String),
}

/// Identity provider
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Whether the provider SDK has finished initializing
    fn is_ready(&self) -> bool;

    /// Stream of sign-in state changes. The first event reports the state as
    /// soon as the provider knows it.
    fn watch(&self) -> AuthStream;

    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Receiving end of [`AuthService::watch`]
pub struct AuthStream {
    receiver: watch::Receiver<Option<AuthState>>,
    fresh: bool,
}

impl AuthStream {
    pub fn new(receiver: watch::Receiver<Option<AuthState>>) -> Self {
        Self {
            receiver,
            fresh: true,
        }
    }

    /// Wait for the next known state. The current state is delivered first
    /// if already resolved; `None` once the provider goes away.
    pub async fn next(&mut self) -> Option<AuthState> {
        if self.fresh {
            self.fresh = false;
            if let Some(state) = self.receiver.borrow_and_update().clone() {
                return Some(state);
            }
        }
        loop {
            self.receiver.changed().await.ok()?;
            if let Some(state) = self.receiver.borrow_and_update().clone() {
                return Some(state);
            }
        }
    }
}
