//! In-process identity provider

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use tokio::sync::watch;

use super::{AuthError, AuthService, AuthState, AuthStream, User};

struct Account {
    password: String,
    user: User,
}

/// Accounts held in memory.
///
/// Starts ready with an unresolved sign-in state; call
/// [`MemoryAuth::resolve`] or [`AuthService::sign_in`] to publish one.
pub struct MemoryAuth {
    ready: AtomicBool,
    accounts: RwLock<HashMap<String, Account>>,
    state: watch::Sender<Option<AuthState>>,
    fail_sign_out: AtomicBool,
}

impl Default for MemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAuth {
    pub fn new() -> Self {
        let (state, _) = watch::channel(None);
        Self {
            ready: AtomicBool::new(true),
            accounts: RwLock::new(HashMap::new()),
            state,
            fail_sign_out: AtomicBool::new(false),
        }
    }

    /// Provider whose SDK has not loaded
    pub fn unavailable() -> Self {
        let auth = Self::new();
        auth.set_ready(false);
        auth
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Register an account. E-mail matching is case-insensitive.
    pub fn add_user(&self, email: &str, password: &str, display_name: Option<&str>) {
        let account = Account {
            password: password.to_string(),
            user: User::new(display_name, Some(email)),
        };
        if let Ok(mut accounts) = self.accounts.write() {
            accounts.insert(email.to_lowercase(), account);
        }
    }

    /// Publish a sign-in state to every watcher
    pub fn resolve(&self, state: AuthState) {
        tracing::debug!(signed_in = matches!(state, AuthState::SignedIn(_)), "Auth state resolved");
        self.state.send_replace(Some(state));
    }

    /// Make subsequent sign-outs fail
    pub fn fail_sign_out(&self, fail: bool) {
        self.fail_sign_out.store(fail, Ordering::SeqCst);
    }

    /// Current sign-in state, `None` while unresolved
    pub fn current(&self) -> Option<AuthState> {
        self.state.borrow().clone()
    }
}

#[async_trait]
impl AuthService for MemoryAuth {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn watch(&self) -> AuthStream {
        AuthStream::new(self.state.subscribe())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        if !self.is_ready() {
            return Err(AuthError::NotReady);
        }

        let user = {
            let accounts = self
                .accounts
                .read()
                .map_err(|_| AuthError::Provider("account store poisoned".to_string()))?;
            match accounts.get(&email.to_lowercase()) {
                Some(account) if account.password == password => account.user.clone(),
                _ => return Err(AuthError::InvalidCredentials),
            }
        };

        tracing::info!(email = %email, "Signed in");
        self.resolve(AuthState::SignedIn(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if !self.is_ready() {
            return Err(AuthError::NotReady);
        }
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(AuthError::Provider("network request failed".to_string()));
        }
        tracing::info!("Signed out");
        self.resolve(AuthState::SignedOut);
        Ok(())
    }
}
