//! Page Navigation
//!
//! Full-page redirects to a fixed set of relative page names.

use std::sync::Mutex;

pub const LOGIN_PAGE: &str = "login.html";
pub const DASHBOARD_PAGE: &str = "dashboard.html";
pub const PROJECTS_PAGE: &str = "projects.html";
pub const TARGET_LIST_PAGE: &str = "target-list.html";

/// Performs redirects on behalf of a page
pub trait Navigator: Send + Sync {
    fn navigate(&self, location: &str);
}

/// Navigator that only records where it was sent
#[derive(Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<String> {
        self.history().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, location: &str) {
        tracing::info!(location = %location, "Navigate");
        if let Ok(mut history) = self.history.lock() {
            history.push(location.to_string());
        }
    }
}
