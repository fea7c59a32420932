//! # PPM Dashboard
//!
//! Live internal-tools dashboard: a sidebar drawer, an auth gate with a
//! loading overlay, and metric cards that follow live document collections.
//!
//! Pages run server-side. A browser shim connects over WebSocket, forwards
//! clicks, key presses and form submits, and applies the display patches
//! and redirects the page sends back.
//!
//! ## Modules
//!
//! - [`page`]: Page runtime, dashboard and login controllers
//! - [`aggregator`]: Live metrics with client-side query fallback
//! - [`sidebar`]: Navigation drawer and active-link highlighting
//! - [`auth`]: Auth service seam and the readiness gate
//! - [`backend`]: Subscription service seam and the in-memory store
//! - [`display`]: Element tree abstraction and patches
//! - [`api`] / [`websocket`]: HTTP server and page sessions
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ppm_dashboard::render::{render_page, RenderOptions};
//! use ppm_dashboard::{DashboardConfig, PageKind};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = RenderOptions::new(PageKind::Dashboard, chrono::Utc::now());
//!     let report = render_page(options, DashboardConfig::default()).await?;
//!     println!("{}", serde_json::to_string_pretty(&report)?);
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod api;
pub mod auth;
pub mod backend;
pub mod clock;
pub mod config;
pub mod content;
pub mod demo;
pub mod display;
pub mod format;
pub mod logging;
pub mod navigation;
pub mod page;
pub mod records;
pub mod render;
pub mod sidebar;
pub mod websocket;

// Re-export top-level types for convenience
pub use aggregator::{LiveMetrics, MetricSettings, Rendered, TrackedMetric};

pub use api::{build_router, serve, ApiError, AppState};

pub use auth::{AuthError, AuthGate, AuthService, AuthState, GateState, MemoryAuth, User};

pub use backend::{
    BackendError, BackendResult, CollectionQuery, Document, DocumentStore, Filter, Snapshot,
    SubscriptionService,
};

pub use clock::{Calendar, Clock, FixedClock, SystemClock};

pub use config::{ConfigError, DashboardConfig};

pub use display::{Display, DisplayPatch, MemoryDisplay};

pub use navigation::{Navigator, RecordingNavigator};

pub use page::{Page, PageContext, PageEvent, PageKind, PageScope};

pub use sidebar::SidebarController;

pub use websocket::{
    websocket_handler, ClientMessage, HubConfig, HubError, ServerMessage, SessionHub,
};
