//! Child nodes rendered into list containers

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A rendered child element.
///
/// Text is always plain text; nodes never carry markup, so values coming from
/// documents need no escaping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Optional id; identified nodes become addressable display targets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Element name, e.g. `div`, `a`, `button`
    pub tag: String,
    /// Space separated class list
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub class: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.class = class.to_string();
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class.split_whitespace().any(|c| c == class)
    }

    /// Depth-first iterator over this node and all descendants
    pub fn walk(&self) -> Vec<&Node> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.walk());
        }
        out
    }

    /// Concatenated text of this node and its descendants
    pub fn text_content(&self) -> String {
        self.walk()
            .iter()
            .map(|n| n.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_walk() {
        let node = Node::new("div")
            .class("card feature-card")
            .attr("data-feature", "Total Assets")
            .child(Node::new("div").text("Total Assets"))
            .child(Node::new("div").id("feature-value:Total Assets").text("—"));

        assert!(node.has_class("feature-card"));
        assert!(!node.has_class("feature"));
        assert_eq!(node.walk().len(), 3);
        assert_eq!(node.text_content(), "Total Assets —");
    }
}
