//! Display Abstraction
//!
//! The page never touches a browser DOM directly. Every mutation is expressed
//! as a [`DisplayPatch`] against an identified element and applied through the
//! [`Display`] trait. Patches aimed at elements that do not exist are skipped,
//! so a page with partial markup keeps working.
//!
//! ## Implementations
//!
//! - [`MemoryDisplay`]: in-process element tree, used by tests, the headless
//!   `render` command and as the backing state of WebSocket sessions
//! - `SessionDisplay` (in [`crate::websocket`]): forwards applied patches to a
//!   connected browser

mod memory;
mod node;

pub mod ids;

pub use memory::{ElementState, MemoryDisplay};
pub use node::Node;

use serde::{Deserialize, Serialize};

/// A single display mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DisplayPatch {
    /// Replace the text content of an element
    SetText { id: String, text: String },
    /// Add (`on = true`) or remove a class
    SetClass { id: String, class: String, on: bool },
    /// Set an attribute value. Boolean attributes (`disabled`,
    /// `aria-expanded`) take `"true"` or `"false"`.
    SetAttribute { id: String, name: String, value: String },
    /// Set an inline style property; an empty value clears it
    SetStyle {
        id: String,
        property: String,
        value: String,
    },
    /// Toggle the `hidden` flag
    SetHidden { id: String, hidden: bool },
    /// Replace all children of a container
    ReplaceChildren { id: String, nodes: Vec<Node> },
    /// Show a blocking alert to the user
    Alert { message: String },
}

impl DisplayPatch {
    /// Target element id, `None` for page-level patches
    pub fn target(&self) -> Option<&str> {
        match self {
            DisplayPatch::SetText { id, .. }
            | DisplayPatch::SetClass { id, .. }
            | DisplayPatch::SetAttribute { id, .. }
            | DisplayPatch::SetStyle { id, .. }
            | DisplayPatch::SetHidden { id, .. }
            | DisplayPatch::ReplaceChildren { id, .. } => Some(id),
            DisplayPatch::Alert { .. } => None,
        }
    }
}

/// Mutable view of the page's identified elements
pub trait Display: Send + Sync {
    /// Apply a patch. Returns `false` when the target element is missing and
    /// the patch was skipped.
    fn apply(&self, patch: DisplayPatch) -> bool;

    /// Current state of an element
    fn element(&self, id: &str) -> Option<ElementState>;

    fn contains(&self, id: &str) -> bool {
        self.element(id).is_some()
    }

    fn text(&self, id: &str) -> Option<String> {
        self.element(id).map(|e| e.text)
    }

    fn has_class(&self, id: &str, class: &str) -> bool {
        self.element(id)
            .map(|e| e.classes.contains(class))
            .unwrap_or(false)
    }

    fn attribute(&self, id: &str, name: &str) -> Option<String> {
        self.element(id).and_then(|e| e.attributes.get(name).cloned())
    }

    fn set_text(&self, id: &str, text: &str) -> bool {
        self.apply(DisplayPatch::SetText {
            id: id.to_string(),
            text: text.to_string(),
        })
    }

    fn set_class(&self, id: &str, class: &str, on: bool) -> bool {
        self.apply(DisplayPatch::SetClass {
            id: id.to_string(),
            class: class.to_string(),
            on,
        })
    }

    fn set_attribute(&self, id: &str, name: &str, value: &str) -> bool {
        self.apply(DisplayPatch::SetAttribute {
            id: id.to_string(),
            name: name.to_string(),
            value: value.to_string(),
        })
    }

    fn set_style(&self, id: &str, property: &str, value: &str) -> bool {
        self.apply(DisplayPatch::SetStyle {
            id: id.to_string(),
            property: property.to_string(),
            value: value.to_string(),
        })
    }

    fn set_hidden(&self, id: &str, hidden: bool) -> bool {
        self.apply(DisplayPatch::SetHidden {
            id: id.to_string(),
            hidden,
        })
    }

    fn replace_children(&self, id: &str, nodes: Vec<Node>) -> bool {
        self.apply(DisplayPatch::ReplaceChildren {
            id: id.to_string(),
            nodes,
        })
    }

    fn alert(&self, message: &str) {
        self.apply(DisplayPatch::Alert {
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_serialize_tagged() {
        let patch = DisplayPatch::SetText {
            id: "violationsValue".to_string(),
            text: "3".to_string(),
        };
        let json = serde_json::to_string(&patch).unwrap();
        assert!(json.contains("\"op\":\"set_text\""));
        assert!(json.contains("\"id\":\"violationsValue\""));
    }

    #[test]
    fn test_patch_target() {
        let alert = DisplayPatch::Alert {
            message: "Logout failed".to_string(),
        };
        assert_eq!(alert.target(), None);

        let hidden = DisplayPatch::SetHidden {
            id: "authLoading".to_string(),
            hidden: true,
        };
        assert_eq!(hidden.target(), Some("authLoading"));
    }
}
