//! Typed Collection Records
//!
//! Each tracked collection has a small record type holding only the fields
//! the dashboard reads. Parsing is fail-soft: a field of the wrong type reads
//! as absent, and a record that cannot be used at all is skipped.

use chrono::{DateTime, Utc};

use crate::backend::Document;

/// Collection names on the document backend
pub mod collections {
    pub const PROJECTS: &str = "projectsPPM";
    pub const TARGETS: &str = "targetListItems";
    pub const VIOLATIONS: &str = "studentViolations";
    pub const BIRTHDAYS: &str = "birthdayEvents";
    pub const ACADEMIC_EVENTS: &str = "academicEvents";
    pub const ASSETS: &str = "assetItems";
    pub const ACTIVITY_LOG: &str = "activityLogEntries";
}

/// Project statuses that no longer count as active
pub const CLOSED_PROJECT_STATUSES: [&str; 2] = ["Completed", "Cancelled"];

/// Target status counted on the dashboard
pub const IN_PROGRESS_STATUS: &str = "In Progress";

/// Parse a document into a typed record, `None` to skip it
pub trait FromDocument: Sized {
    fn from_document(doc: &Document) -> Option<Self>;
}

/// Parse every usable record of a snapshot, skipping malformed ones
pub fn parse_all<T: FromDocument>(docs: &[Document]) -> Vec<T> {
    let records: Vec<T> = docs.iter().filter_map(T::from_document).collect();
    let skipped = docs.len() - records.len();
    if skipped > 0 {
        tracing::debug!(skipped, "Skipped malformed records");
    }
    records
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRecord {
    pub status: Option<String>,
}

impl ProjectRecord {
    pub fn is_active(&self) -> bool {
        match self.status.as_deref() {
            Some(status) => !CLOSED_PROJECT_STATUSES.contains(&status),
            None => true,
        }
    }
}

impl FromDocument for ProjectRecord {
    fn from_document(doc: &Document) -> Option<Self> {
        Some(Self {
            status: doc.str("status").map(str::to_string),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetItem {
    pub status: Option<String>,
}

impl TargetItem {
    pub fn is_in_progress(&self) -> bool {
        self.status.as_deref() == Some(IN_PROGRESS_STATUS)
    }
}

impl FromDocument for TargetItem {
    fn from_document(doc: &Document) -> Option<Self> {
        Some(Self {
            status: doc.str("status").map(str::to_string),
        })
    }
}

/// Opaque; only counted
#[derive(Debug, Clone, PartialEq)]
pub struct ViolationRecord {
    pub id: String,
}

impl FromDocument for ViolationRecord {
    fn from_document(doc: &Document) -> Option<Self> {
        Some(Self { id: doc.id.clone() })
    }
}

/// Recurring annual event anchored on a date
#[derive(Debug, Clone, PartialEq)]
pub struct BirthdayEvent {
    pub anchor_date: DateTime<Utc>,
}

impl FromDocument for BirthdayEvent {
    fn from_document(doc: &Document) -> Option<Self> {
        Some(Self {
            anchor_date: doc.timestamp("anchorDate")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AcademicEvent {
    pub date: DateTime<Utc>,
}

impl FromDocument for AcademicEvent {
    fn from_document(doc: &Document) -> Option<Self> {
        Some(Self {
            date: doc.timestamp("date")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetItem {
    pub amount: Option<f64>,
}

impl FromDocument for AssetItem {
    fn from_document(doc: &Document) -> Option<Self> {
        Some(Self {
            amount: doc.number("amount").filter(|a| a.is_finite()),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityLogEntry {
    pub title: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub source: Option<String>,
}

impl FromDocument for ActivityLogEntry {
    fn from_document(doc: &Document) -> Option<Self> {
        Some(Self {
            title: doc
                .str("title")
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            date: doc.timestamp("date"),
            source: doc
                .str("source")
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_activity() {
        let active = ProjectRecord::from_document(&Document::new("p").field("status", "Active")).unwrap();
        let done = ProjectRecord::from_document(&Document::new("p").field("status", "Completed")).unwrap();
        let blank = ProjectRecord::from_document(&Document::new("p")).unwrap();
        assert!(active.is_active());
        assert!(!done.is_active());
        assert!(blank.is_active());
    }

    #[test]
    fn test_birthday_requires_anchor_date() {
        let docs = vec![
            Document::new("a").field("anchorDate", "1990-07-04"),
            Document::new("b").field("anchorDate", "not a date"),
            Document::new("c"),
        ];
        let parsed: Vec<BirthdayEvent> = parse_all(&docs);
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn test_asset_amount_soft_parse() {
        let text = AssetItem::from_document(&Document::new("a").field("amount", "100")).unwrap();
        assert_eq!(text.amount, None);
        let num = AssetItem::from_document(&Document::new("a").field("amount", 100)).unwrap();
        assert_eq!(num.amount, Some(100.0));
    }

    #[test]
    fn test_activity_fields_optional() {
        let entry = ActivityLogEntry::from_document(&Document::new("x").field("title", "")).unwrap();
        assert_eq!(entry.title, None);
        assert_eq!(entry.date, None);
        assert_eq!(entry.source, None);
    }
}
