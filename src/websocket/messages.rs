//! WebSocket Message Types
//!
//! Defines all message types exchanged between the browser shim and a
//! server-side page session.

use serde::{Deserialize, Serialize};

use crate::display::DisplayPatch;
use crate::page::{PageEvent, PageKind};

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// User input against the page
    Event { event: PageEvent },
    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Session established and page booted
    Connected { session_id: String, page: PageKind },
    /// Apply a display mutation
    Patch { patch: DisplayPatch },
    /// Redirect the browser
    Navigate { location: String },
    /// Show a blocking alert
    Alert { message: String },
    /// Pong response to ping
    Pong,
    /// Error message
    Error { message: String },
}

impl From<DisplayPatch> for ServerMessage {
    fn from(patch: DisplayPatch) -> Self {
        match patch {
            DisplayPatch::Alert { message } => ServerMessage::Alert { message },
            patch => ServerMessage::Patch { patch },
        }
    }
}
