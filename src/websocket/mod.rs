//! WebSocket Page Sessions
//!
//! Each browser tab opens one WebSocket and runs one server-side page.
//!
//! ## Architecture
//!
//! - **SessionHub**: Tracks live sessions and routes messages to them
//! - **Handler**: Handles the upgrade, boots the page and pumps events
//! - **Session**: Display and navigator that forward to the browser
//! - **Messages**: Defines client and server message formats
//!
//! ## Example
//!
//! ```javascript
//! // Browser
//! const ws = new WebSocket('ws://localhost:8090/api/v1/ws?page=dashboard&path=' + location.pathname);
//!
//! toggle.onclick = () =>
//!   ws.send(JSON.stringify({type: 'event', event: {kind: 'click', target: 'sidebarToggle'}}));
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.type === 'patch') applyPatch(msg.patch);
//!   if (msg.type === 'navigate') location.href = msg.location;
//! };
//! ```

mod handler;
mod hub;
mod messages;
mod session;

pub use handler::{websocket_handler, SessionParams};
pub use hub::{HubConfig, HubError, HubStats, SessionHub, SessionId};
pub use messages::{ClientMessage, ServerMessage};
pub use session::{SessionDisplay, SessionNavigator};
