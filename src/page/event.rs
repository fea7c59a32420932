//! User input forwarded from the browser

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A user input event against the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageEvent {
    /// Click on an identified element
    Click { target: String },
    /// Key pressed anywhere on the page
    KeyDown { key: String },
    /// Viewport width changed (also sent once on load)
    Resize { width: u32 },
    /// Form submitted with its field values
    Submit {
        form: String,
        #[serde(default)]
        fields: BTreeMap<String, String>,
    },
}

impl PageEvent {
    pub fn click(target: &str) -> Self {
        PageEvent::Click {
            target: target.to_string(),
        }
    }

    pub fn key(key: &str) -> Self {
        PageEvent::KeyDown {
            key: key.to_string(),
        }
    }

    pub fn submit<'a>(form: &str, fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        PageEvent::Submit {
            form: form.to_string(),
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Click target, if this is a click
    pub fn clicked(&self) -> Option<&str> {
        match self {
            PageEvent::Click { target } => Some(target),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let event: PageEvent =
            serde_json::from_str(r#"{"kind":"click","target":"sidebarToggle"}"#).unwrap();
        assert_eq!(event, PageEvent::click("sidebarToggle"));

        let event: PageEvent = serde_json::from_str(r#"{"kind":"resize","width":800}"#).unwrap();
        assert_eq!(event, PageEvent::Resize { width: 800 });

        let event: PageEvent = serde_json::from_str(
            r#"{"kind":"submit","form":"loginForm","fields":{"email":"a@b.c"}}"#,
        )
        .unwrap();
        assert_eq!(event, PageEvent::submit("loginForm", [("email", "a@b.c")]));
    }
}
