//! Sidebar Controller
//!
//! Drawer state machine for narrow viewports, active-link highlighting and
//! the logout action.
//!
//! The drawer starts `Closed`. On narrow viewports (`width <= breakpoint`)
//! the toggle flips it, and the backdrop or Escape close it. On wide
//! viewports the sidebar is always shown, so drawer state is cleared and the
//! toggle is ignored.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::auth::AuthService;
use crate::display::{ids, Display, Node};
use crate::navigation::{Navigator, LOGIN_PAGE};
use crate::page::{Controller, PageEvent};

const ACTIVE_CLASS: &str = "active";
const DEFAULT_PAGE: &str = "dashboard.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawerState {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewport {
    Narrow,
    Wide,
}

/// One sidebar link
#[derive(Debug, Clone, PartialEq)]
pub struct NavEntry {
    pub key: &'static str,
    pub label: &'static str,
    pub href: &'static str,
}

impl NavEntry {
    const fn new(key: &'static str, label: &'static str, href: &'static str) -> Self {
        Self { key, label, href }
    }

    /// Whether this entry represents the given page file
    pub fn matches(&self, page: &str) -> bool {
        self.href.ends_with(page) || page.contains(self.key)
    }
}

/// Sidebar links in display order
pub fn default_nav_entries() -> Vec<NavEntry> {
    vec![
        NavEntry::new("dashboard", "Dashboard", "dashboard.html"),
        NavEntry::new("projects", "PPM Projects", "projects.html"),
        NavEntry::new("target-list", "Target List", "target-list.html"),
        NavEntry::new("violations", "Student Violations", "violations.html"),
        NavEntry::new("ppm-calendar", "PPM Calendar", "ppm-calendar.html"),
        NavEntry::new("birthday-calendar", "Birthday Calendar", "birthday-calendar.html"),
        NavEntry::new("academic", "Academic Calendar", "academic.html"),
        NavEntry::new("total-assets", "Total Assets", "total-assets.html"),
        NavEntry::new("information", "Information Hub", "information.html"),
        NavEntry::new("knowledge", "Knowledge Hub", "knowledge.html"),
        NavEntry::new("chat", "Chat", "chat.html"),
        NavEntry::new("profile", "Profile", "profile.html"),
        NavEntry::new("settings", "Settings", "settings.html"),
    ]
}

/// Last path segment, `dashboard.html` when empty
pub fn current_page(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    match path.rsplit('/').next() {
        Some(page) if !page.is_empty() => page,
        _ => DEFAULT_PAGE,
    }
}

/// First entry (in registration order) matching the page
pub fn find_active<'a>(entries: &'a [NavEntry], page: &str) -> Option<&'a NavEntry> {
    entries.iter().find(|e| e.matches(page))
}

struct DrawerView {
    drawer: DrawerState,
    viewport: Viewport,
}

pub struct SidebarController {
    display: Arc<dyn Display>,
    auth: Arc<dyn AuthService>,
    navigator: Arc<dyn Navigator>,
    entries: Vec<NavEntry>,
    breakpoint_px: u32,
    view: Mutex<DrawerView>,
}

impl SidebarController {
    pub fn new(
        display: Arc<dyn Display>,
        auth: Arc<dyn AuthService>,
        navigator: Arc<dyn Navigator>,
        breakpoint_px: u32,
    ) -> Self {
        Self {
            display,
            auth,
            navigator,
            entries: default_nav_entries(),
            breakpoint_px,
            view: Mutex::new(DrawerView {
                drawer: DrawerState::Closed,
                viewport: Viewport::Narrow,
            }),
        }
    }

    /// Render the nav, highlight the current page and settle the drawer for
    /// the initial viewport
    pub fn boot(&self, path: &str, width: Option<u32>) {
        self.render_nav();
        self.highlight_active(path);
        match width {
            Some(width) => self.sync_viewport(width),
            None => self.close(),
        }
    }

    pub fn drawer(&self) -> DrawerState {
        self.lock().drawer
    }

    pub fn viewport(&self) -> Viewport {
        self.lock().viewport
    }

    pub fn entries(&self) -> &[NavEntry] {
        &self.entries
    }

    fn render_nav(&self) {
        let nodes = self
            .entries
            .iter()
            .map(|entry| {
                Node::new("a")
                    .id(ids::nav_item(entry.key))
                    .class("nav-item")
                    .attr("href", entry.href)
                    .text(entry.label)
            })
            .collect();
        self.display.replace_children(ids::SIDEBAR_NAV, nodes);
    }

    /// Mark the single entry for `path` as active. Returns its key.
    pub fn highlight_active(&self, path: &str) -> Option<&'static str> {
        let page = current_page(path);
        for entry in &self.entries {
            self.display
                .set_class(&ids::nav_item(entry.key), ACTIVE_CLASS, false);
        }

        let active = find_active(&self.entries, page)?;
        self.display
            .set_class(&ids::nav_item(active.key), ACTIVE_CLASS, true);
        tracing::debug!(page = %page, entry = active.key, "Highlighted nav entry");
        Some(active.key)
    }

    pub fn toggle(&self) {
        let (viewport, drawer) = {
            let view = self.lock();
            (view.viewport, view.drawer)
        };
        if viewport == Viewport::Wide {
            tracing::debug!("Ignoring drawer toggle on wide viewport");
            return;
        }
        match drawer {
            DrawerState::Open => self.close(),
            DrawerState::Closed => self.open(),
        }
    }

    pub fn open(&self) {
        self.lock().drawer = DrawerState::Open;
        self.render_drawer(true);
    }

    pub fn close(&self) {
        self.lock().drawer = DrawerState::Closed;
        self.render_drawer(false);
    }

    /// React to a viewport width. Narrow closes the drawer; wide clears all
    /// drawer state.
    pub fn sync_viewport(&self, width: u32) {
        let viewport = if width <= self.breakpoint_px {
            Viewport::Narrow
        } else {
            Viewport::Wide
        };
        self.lock().viewport = viewport;
        self.close();
    }

    fn render_drawer(&self, open: bool) {
        let display = self.display.as_ref();
        display.set_class(ids::SIDEBAR, ACTIVE_CLASS, open);
        display.set_attribute(
            ids::SIDEBAR_TOGGLE,
            "aria-expanded",
            if open { "true" } else { "false" },
        );
        display.set_hidden(ids::SIDEBAR_BACKDROP, !open);

        let overflow = if open { "hidden" } else { "" };
        display.set_style(ids::ROOT, "overflow", overflow);
        display.set_style(ids::BODY, "overflow", overflow);
    }

    /// Sign out, then go to the login page
    pub async fn logout(&self) {
        match self.auth.sign_out().await {
            Ok(()) => self.navigator.navigate(LOGIN_PAGE),
            Err(e) => {
                tracing::error!(error = %e, "Logout failed");
                self.display.alert("Logout failed");
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DrawerView> {
        self.view.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Controller for SidebarController {
    async fn handle(&self, event: &PageEvent) -> bool {
        match event {
            PageEvent::Click { target } if target == ids::SIDEBAR_TOGGLE => self.toggle(),
            PageEvent::Click { target } if target == ids::SIDEBAR_BACKDROP => self.close(),
            PageEvent::Click { target } if target == ids::SIDEBAR_LOGOUT => self.logout().await,
            PageEvent::KeyDown { key } if key == "Escape" => self.close(),
            PageEvent::Resize { width } => self.sync_viewport(*width),
            _ => return false,
        }
        true
    }
}
