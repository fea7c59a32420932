//! In-memory element tree

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;

use super::{Display, DisplayPatch, Node};

/// Observable state of one identified element
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ElementState {
    pub text: String,
    pub classes: BTreeSet<String>,
    pub attributes: BTreeMap<String, String>,
    pub styles: BTreeMap<String, String>,
    pub hidden: bool,
    pub children: Vec<Node>,
}

impl ElementState {
    fn from_node(node: &Node) -> Self {
        Self {
            text: node.text.clone(),
            classes: node.class.split_whitespace().map(str::to_string).collect(),
            attributes: node.attributes.clone(),
            children: node.children.clone(),
            ..Default::default()
        }
    }
}

#[derive(Default)]
struct Tree {
    elements: HashMap<String, ElementState>,
    /// Container id → ids registered from its current children
    owned: HashMap<String, Vec<String>>,
    alerts: Vec<String>,
    applied: usize,
}

impl Tree {
    fn release_children(&mut self, container: &str) {
        if let Some(ids) = self.owned.remove(container) {
            for id in ids {
                self.release_children(&id);
                self.elements.remove(&id);
            }
        }
    }

    fn adopt(&mut self, container: &str, nodes: &[Node]) {
        let mut ids = Vec::new();
        for node in nodes.iter().flat_map(|n| n.walk()) {
            if let Some(id) = &node.id {
                self.elements
                    .insert(id.clone(), ElementState::from_node(node));
                ids.push(id.clone());
            }
        }
        if !ids.is_empty() {
            self.owned.insert(container.to_string(), ids);
        }
    }
}

/// Element tree held in process memory.
///
/// Only registered elements accept patches; everything else is skipped the
/// way a guarded `getElementById` lookup would be.
#[derive(Default)]
pub struct MemoryDisplay {
    tree: Mutex<Tree>,
}

impl MemoryDisplay {
    /// Create a display with the given empty elements
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let display = Self::default();
        for id in ids {
            display.register(id);
        }
        display
    }

    /// Register an empty element
    pub fn register(&self, id: impl Into<String>) {
        let mut tree = self.lock();
        tree.elements.entry(id.into()).or_default();
    }

    /// Remove an element, simulating markup that lacks it
    pub fn remove(&self, id: &str) {
        let mut tree = self.lock();
        tree.release_children(id);
        tree.elements.remove(id);
    }

    /// Messages passed to [`Display::alert`], oldest first
    pub fn alerts(&self) -> Vec<String> {
        self.lock().alerts.clone()
    }

    /// Number of patches applied so far
    pub fn applied_count(&self) -> usize {
        self.lock().applied
    }

    /// Copy of every element, ordered by id
    pub fn snapshot(&self) -> BTreeMap<String, ElementState> {
        self.lock()
            .elements
            .iter()
            .map(|(id, e)| (id.clone(), e.clone()))
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tree> {
        self.tree.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Display for MemoryDisplay {
    fn apply(&self, patch: DisplayPatch) -> bool {
        let mut tree = self.lock();

        if let DisplayPatch::Alert { message } = patch {
            tree.alerts.push(message);
            tree.applied += 1;
            return true;
        }

        let applied = match patch {
            DisplayPatch::SetText { id, text } => match tree.elements.get_mut(&id) {
                Some(e) => {
                    e.text = text;
                    true
                }
                None => false,
            },
            DisplayPatch::SetClass { id, class, on } => match tree.elements.get_mut(&id) {
                Some(e) => {
                    if on {
                        e.classes.insert(class);
                    } else {
                        e.classes.remove(&class);
                    }
                    true
                }
                None => false,
            },
            DisplayPatch::SetAttribute { id, name, value } => match tree.elements.get_mut(&id) {
                Some(e) => {
                    e.attributes.insert(name, value);
                    true
                }
                None => false,
            },
            DisplayPatch::SetStyle {
                id,
                property,
                value,
            } => match tree.elements.get_mut(&id) {
                Some(e) => {
                    if value.is_empty() {
                        e.styles.remove(&property);
                    } else {
                        e.styles.insert(property, value);
                    }
                    true
                }
                None => false,
            },
            DisplayPatch::SetHidden { id, hidden } => match tree.elements.get_mut(&id) {
                Some(e) => {
                    e.hidden = hidden;
                    true
                }
                None => false,
            },
            DisplayPatch::ReplaceChildren { id, nodes } => {
                if tree.elements.contains_key(&id) {
                    tree.release_children(&id);
                    tree.adopt(&id, &nodes);
                    if let Some(e) = tree.elements.get_mut(&id) {
                        e.children = nodes;
                    }
                    true
                } else {
                    false
                }
            }
            DisplayPatch::Alert { .. } => false,
        };

        if applied {
            tree.applied += 1;
        } else {
            tracing::trace!("Display target missing, patch skipped");
        }
        applied
    }

    fn element(&self, id: &str) -> Option<ElementState> {
        self.lock().elements.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_element_is_noop() {
        let display = MemoryDisplay::new(["a"]);
        assert!(!display.set_text("missing", "x"));
        assert!(display.set_text("a", "x"));
        assert_eq!(display.text("a").as_deref(), Some("x"));
        assert_eq!(display.applied_count(), 1);
    }

    #[test]
    fn test_classes_and_styles() {
        let display = MemoryDisplay::new(["body"]);
        display.set_class("body", "active", true);
        assert!(display.has_class("body", "active"));
        display.set_class("body", "active", false);
        assert!(!display.has_class("body", "active"));

        display.set_style("body", "overflow", "hidden");
        assert_eq!(
            display.element("body").unwrap().styles.get("overflow").map(String::as_str),
            Some("hidden")
        );
        display.set_style("body", "overflow", "");
        assert!(display.element("body").unwrap().styles.is_empty());
    }

    #[test]
    fn test_replace_children_registers_identified_nodes() {
        let display = MemoryDisplay::new(["grid"]);
        let card = Node::new("div")
            .class("card")
            .child(Node::new("div").id("slot").text("—"));
        display.replace_children("grid", vec![card]);

        assert!(display.contains("slot"));
        assert!(display.set_text("slot", "12"));
        assert_eq!(display.text("slot").as_deref(), Some("12"));

        // Re-rendering drops the previous children's ids
        display.replace_children("grid", vec![Node::new("p").text("empty")]);
        assert!(!display.contains("slot"));
        assert_eq!(display.element("grid").unwrap().children.len(), 1);
    }

    #[test]
    fn test_alerts_recorded() {
        let display = MemoryDisplay::default();
        display.alert("Logout failed");
        assert_eq!(display.alerts(), vec!["Logout failed".to_string()]);
    }
}
