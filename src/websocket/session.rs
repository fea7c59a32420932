//! Display and navigation for a remote browser session

use tokio::sync::mpsc;

use super::messages::ServerMessage;
use crate::display::{Display, DisplayPatch, ElementState, MemoryDisplay};
use crate::navigation::Navigator;
use crate::page::PageKind;

/// Mirrors the browser's identified elements and forwards every applied
/// patch to it.
///
/// Patches for elements the page markup lacks are skipped here and never
/// reach the browser.
pub struct SessionDisplay {
    mirror: MemoryDisplay,
    outbox: mpsc::UnboundedSender<ServerMessage>,
}

impl SessionDisplay {
    pub fn new(page: PageKind, outbox: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self {
            mirror: MemoryDisplay::new(page.element_ids()),
            outbox,
        }
    }
}

impl Display for SessionDisplay {
    fn apply(&self, patch: DisplayPatch) -> bool {
        if !self.mirror.apply(patch.clone()) {
            return false;
        }
        if self.outbox.send(ServerMessage::from(patch)).is_err() {
            tracing::trace!("Session closed; patch dropped");
        }
        true
    }

    fn element(&self, id: &str) -> Option<ElementState> {
        self.mirror.element(id)
    }
}

/// Sends redirects to the browser
pub struct SessionNavigator {
    outbox: mpsc::UnboundedSender<ServerMessage>,
}

impl SessionNavigator {
    pub fn new(outbox: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self { outbox }
    }
}

impl Navigator for SessionNavigator {
    fn navigate(&self, location: &str) {
        tracing::debug!(location = %location, "Session navigate");
        let _ = self.outbox.send(ServerMessage::Navigate {
            location: location.to_string(),
        });
    }
}
