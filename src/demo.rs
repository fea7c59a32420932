//! Demo data
//!
//! Seeds the in-memory store with a small school's worth of records and
//! provides a demo account, for `serve --demo` and headless renders.

use chrono::{DateTime, Duration, Months, Utc};
use serde_json::Value;

use crate::auth::MemoryAuth;
use crate::backend::{timestamp_value, BackendResult, Document, DocumentStore};
use crate::records::collections;

pub const DEMO_EMAIL: &str = "admin@ppm.local";
pub const DEMO_PASSWORD: &str = "ppm-demo";
pub const DEMO_NAME: &str = "Admin PPM";

/// Auth provider with the demo account registered
pub fn demo_auth() -> MemoryAuth {
    let auth = MemoryAuth::new();
    auth.add_user(DEMO_EMAIL, DEMO_PASSWORD, Some(DEMO_NAME));
    auth
}

fn at(instant: DateTime<Utc>) -> Value {
    timestamp_value(instant)
}

fn with_status(prefix: &str, statuses: &[&str]) -> Vec<Document> {
    statuses
        .iter()
        .enumerate()
        .map(|(i, status)| Document::new(format!("{}-{}", prefix, i + 1)).field("status", *status))
        .collect()
}

/// Populate every tracked collection relative to `now`.
///
/// Returns the number of documents written.
pub async fn seed_demo(store: &DocumentStore, now: DateTime<Utc>) -> BackendResult<usize> {
    let mut written = 0;

    written += store
        .seed(
            collections::PROJECTS,
            with_status(
                "project",
                &["In Progress", "Planning", "Completed", "In Progress", "Cancelled"],
            ),
        )
        .await?;

    written += store
        .seed(
            collections::TARGETS,
            with_status(
                "target",
                &["In Progress", "Done", "In Progress", "Not Started"],
            ),
        )
        .await?;

    let violations = (1..=3)
        .map(|i| Document::new(format!("violation-{}", i)).field("student", format!("Student {}", i)))
        .collect();
    written += store.seed(collections::VIOLATIONS, violations).await?;

    // Same day sixteen years ago, so one birthday falls today
    let born = now.checked_sub_months(Months::new(12 * 16)).unwrap_or(now);
    let birthdays = vec![
        Document::new("birthday-1")
            .field("name", "Siti")
            .field("anchorDate", at(born)),
        Document::new("birthday-2")
            .field("name", "Rahmat")
            .field("anchorDate", at(now - Duration::days(40))),
    ];
    written += store.seed(collections::BIRTHDAYS, birthdays).await?;

    let academic = vec![
        Document::new("academic-1")
            .field("title", "Mid-term exams")
            .field("date", at(now + Duration::days(12))),
        Document::new("academic-2")
            .field("title", "Parent meeting")
            .field("date", at(now + Duration::days(3))),
        Document::new("academic-3")
            .field("title", "Orientation")
            .field("date", at(now - Duration::days(30))),
    ];
    written += store.seed(collections::ACADEMIC_EVENTS, academic).await?;

    let assets = vec![
        Document::new("asset-1").field("name", "Projectors").field("amount", 45_000_000),
        Document::new("asset-2").field("name", "Laptops").field("amount", 120_500_000),
        Document::new("asset-3").field("name", "Furniture").field("amount", 18_300_000),
    ];
    written += store.seed(collections::ASSETS, assets).await?;

    let activity = vec![
        ("Project \"Library renovation\" updated", Some("projects"), 5),
        ("New violation recorded", None, 47),
        ("Target list reviewed", Some("target-list"), 180),
        ("Asset inventory imported", Some("assets"), 60 * 26),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (title, source, minutes_ago))| {
        let doc = Document::new(format!("activity-{}", i + 1))
            .field("title", title)
            .field("date", at(now - Duration::minutes(minutes_ago)));
        match source {
            Some(source) => doc.field("source", source),
            None => doc,
        }
    })
    .collect();
    written += store.seed(collections::ACTIVITY_LOG, activity).await?;

    tracing::info!(documents = written, "Demo data seeded");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{MetricSettings, Rendered, TrackedMetric};
    use crate::auth::AuthService;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_seeded_values() {
        let store = DocumentStore::default();
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        let written = seed_demo(&store, now).await.unwrap();
        assert_eq!(written, 24);

        let settings = MetricSettings::default();
        let derive = |metric: TrackedMetric, docs: &[Document]| {
            let query = metric.server_query(now, &settings);
            metric.derive(&query.apply(docs), now, &settings)
        };

        let projects = store.documents(collections::PROJECTS).await;
        assert_eq!(
            derive(TrackedMetric::ActiveProjects, &projects),
            Rendered::Text("3".to_string())
        );

        let academic = store.documents(collections::ACADEMIC_EVENTS).await;
        assert_eq!(
            derive(TrackedMetric::UpcomingAcademicEvents, &academic),
            Rendered::Text("2".to_string())
        );

        let birthdays = store.documents(collections::BIRTHDAYS).await;
        assert_eq!(
            derive(TrackedMetric::BirthdaysToday, &birthdays),
            Rendered::Text("1".to_string())
        );

        let assets = store.documents(collections::ASSETS).await;
        assert_eq!(
            derive(TrackedMetric::TotalAssets, &assets),
            Rendered::Text("Rp 183.8M".to_string())
        );
    }

    #[tokio::test]
    async fn test_demo_account() {
        let auth = demo_auth();
        let user = auth.sign_in(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
        assert_eq!(user.display_label(), DEMO_NAME);
    }
}
