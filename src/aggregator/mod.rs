//! Live Metrics Aggregator
//!
//! One independent live subscription per tracked collection. Every snapshot
//! is turned into a display value by a pure derivation and written to the
//! metric's display target; nothing is cached between snapshots.
//!
//! ## Server-side filtering
//!
//! Each metric asks the backend for the narrowest query it can (status
//! filters, date ranges, ordering and limit). When the backend rejects a
//! query as unsupported, the metric subscribes to the whole collection and
//! evaluates the same query locally (see [`subscribe_with_fallback`]).

mod live;

pub use live::{subscribe_with_fallback, LiveMetrics};

use chrono::{DateTime, Utc};

use crate::backend::{timestamp_value, CollectionQuery, Direction, Document, Filter};
use crate::clock::Calendar;
use crate::config::MetricsConfig;
use crate::display::{ids, Display, Node};
use crate::format::{format_large_number, time_ago};
use crate::records::{
    collections, parse_all, AcademicEvent, ActivityLogEntry, AssetItem, BirthdayEvent,
    ProjectRecord, TargetItem, ViolationRecord, CLOSED_PROJECT_STATUSES, IN_PROGRESS_STATUS,
};

pub const NO_ACTIVITY_TEXT: &str = "No recent activity.";
pub const UNTITLED_ACTIVITY: &str = "No title";

/// Decimal places of the asset total
const ASSET_PRECISION: usize = 1;

/// Settings shared by every metric derivation
#[derive(Debug, Clone)]
pub struct MetricSettings {
    pub calendar: Calendar,
    pub activity_limit: usize,
    pub currency_prefix: String,
}

impl Default for MetricSettings {
    fn default() -> Self {
        Self::from_config(&MetricsConfig::default())
    }
}

impl MetricSettings {
    pub fn from_config(config: &MetricsConfig) -> Self {
        Self {
            calendar: Calendar::with_offset_minutes(config.utc_offset_minutes),
            activity_limit: config.activity_limit,
            currency_prefix: config.currency_prefix.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedMetric {
    ActiveProjects,
    TargetsInProgress,
    Violations,
    BirthdaysToday,
    UpcomingAcademicEvents,
    TotalAssets,
    RecentActivity,
}

impl TrackedMetric {
    pub const ALL: [TrackedMetric; 7] = [
        TrackedMetric::ActiveProjects,
        TrackedMetric::TargetsInProgress,
        TrackedMetric::Violations,
        TrackedMetric::BirthdaysToday,
        TrackedMetric::UpcomingAcademicEvents,
        TrackedMetric::TotalAssets,
        TrackedMetric::RecentActivity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TrackedMetric::ActiveProjects => "active_projects",
            TrackedMetric::TargetsInProgress => "targets_in_progress",
            TrackedMetric::Violations => "violations",
            TrackedMetric::BirthdaysToday => "birthdays_today",
            TrackedMetric::UpcomingAcademicEvents => "upcoming_academic_events",
            TrackedMetric::TotalAssets => "total_assets",
            TrackedMetric::RecentActivity => "recent_activity",
        }
    }

    /// Source collection
    pub fn collection(&self) -> &'static str {
        match self {
            TrackedMetric::ActiveProjects => collections::PROJECTS,
            TrackedMetric::TargetsInProgress => collections::TARGETS,
            TrackedMetric::Violations => collections::VIOLATIONS,
            TrackedMetric::BirthdaysToday => collections::BIRTHDAYS,
            TrackedMetric::UpcomingAcademicEvents => collections::ACADEMIC_EVENTS,
            TrackedMetric::TotalAssets => collections::ASSETS,
            TrackedMetric::RecentActivity => collections::ACTIVITY_LOG,
        }
    }

    /// Display element the metric writes to
    pub fn target(&self) -> String {
        match self {
            TrackedMetric::ActiveProjects => ids::ACTIVE_PROJECTS.to_string(),
            TrackedMetric::TargetsInProgress => ids::IN_PROGRESS_TARGETS.to_string(),
            TrackedMetric::Violations => ids::VIOLATIONS.to_string(),
            TrackedMetric::BirthdaysToday => ids::BIRTHDAYS.to_string(),
            TrackedMetric::UpcomingAcademicEvents => ids::feature_value("Academic Calendar"),
            TrackedMetric::TotalAssets => ids::feature_value("Total Assets"),
            TrackedMetric::RecentActivity => ids::RECENT_ACTIVITIES.to_string(),
        }
    }

    /// Query to request from the backend. Time-relative bounds are fixed at
    /// `now`.
    pub fn server_query(&self, now: DateTime<Utc>, settings: &MetricSettings) -> CollectionQuery {
        let query = CollectionQuery::new(self.collection());
        match self {
            TrackedMetric::ActiveProjects => {
                query.filter(Filter::not_in("status", CLOSED_PROJECT_STATUSES))
            }
            TrackedMetric::TargetsInProgress => {
                query.filter(Filter::eq("status", IN_PROGRESS_STATUS))
            }
            TrackedMetric::UpcomingAcademicEvents => query.filter(Filter::gte(
                "date",
                timestamp_value(settings.calendar.start_of_day(now)),
            )),
            TrackedMetric::RecentActivity => query
                .order_by("date", Direction::Desc)
                .limit(settings.activity_limit),
            TrackedMetric::Violations | TrackedMetric::BirthdaysToday | TrackedMetric::TotalAssets => {
                query
            }
        }
    }

    /// Derive the display value from a snapshot already narrowed by
    /// [`TrackedMetric::server_query`]
    pub fn derive(&self, docs: &[Document], now: DateTime<Utc>, settings: &MetricSettings) -> Rendered {
        match self {
            TrackedMetric::ActiveProjects => {
                Rendered::count(count_active_projects(&parse_all::<ProjectRecord>(docs)))
            }
            TrackedMetric::TargetsInProgress => {
                Rendered::count(count_in_progress(&parse_all::<TargetItem>(docs)))
            }
            TrackedMetric::Violations => Rendered::count(parse_all::<ViolationRecord>(docs).len()),
            TrackedMetric::BirthdaysToday => Rendered::count(count_birthdays_on(
                &parse_all::<BirthdayEvent>(docs),
                now,
                &settings.calendar,
            )),
            TrackedMetric::UpcomingAcademicEvents => {
                Rendered::count(parse_all::<AcademicEvent>(docs).len())
            }
            TrackedMetric::TotalAssets => Rendered::Text(format_large_number(
                sum_amounts(&parse_all::<AssetItem>(docs)),
                ASSET_PRECISION,
                &settings.currency_prefix,
            )),
            TrackedMetric::RecentActivity => {
                let mut entries = parse_all::<ActivityLogEntry>(docs);
                entries.truncate(settings.activity_limit);
                Rendered::Nodes(activity_nodes(&entries, now))
            }
        }
    }
}

/// A derived value ready for the display
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Text(String),
    Nodes(Vec<Node>),
}

impl Rendered {
    fn count(n: usize) -> Self {
        Rendered::Text(n.to_string())
    }

    /// Write to a display target as one mutation
    pub fn write_to(self, display: &dyn Display, target: &str) -> bool {
        match self {
            Rendered::Text(text) => display.set_text(target, &text),
            Rendered::Nodes(nodes) => display.replace_children(target, nodes),
        }
    }
}

pub fn count_active_projects(projects: &[ProjectRecord]) -> usize {
    projects.iter().filter(|p| p.is_active()).count()
}

pub fn count_in_progress(targets: &[TargetItem]) -> usize {
    targets.iter().filter(|t| t.is_in_progress()).count()
}

/// Anchors whose month and day equal today's in the calendar's offset
pub fn count_birthdays_on(events: &[BirthdayEvent], now: DateTime<Utc>, calendar: &Calendar) -> usize {
    events
        .iter()
        .filter(|e| calendar.same_month_day(e.anchor_date, now))
        .count()
}

pub fn sum_amounts(assets: &[AssetItem]) -> f64 {
    assets
        .iter()
        .filter_map(|a| a.amount)
        .fold(0.0, |acc, amount| acc + amount)
}

/// Activity list items, or the single placeholder when there are none
pub fn activity_nodes(entries: &[ActivityLogEntry], now: DateTime<Utc>) -> Vec<Node> {
    if entries.is_empty() {
        return vec![Node::new("p").class("muted").text(NO_ACTIVITY_TEXT)];
    }
    entries.iter().map(|e| activity_node(e, now)).collect()
}

fn activity_node(entry: &ActivityLogEntry, now: DateTime<Utc>) -> Node {
    let mut title = Node::new("div")
        .class("activity-title")
        .text(entry.title.as_deref().unwrap_or(UNTITLED_ACTIVITY));
    if let Some(source) = &entry.source {
        title = title.child(
            Node::new("span")
                .class("activity-source muted")
                .text(format!("(via {})", source)),
        );
    }

    Node::new("div")
        .class("activity-item")
        .child(Node::new("div").class("activity-avatar").text("🟢"))
        .child(
            Node::new("div")
                .class("activity-body")
                .child(title)
                .child(
                    Node::new("div")
                        .class("activity-time small muted")
                        .text(time_ago(Some(entry.date.unwrap_or(now)), now)),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 4, 9, 30, 0).unwrap()
    }

    fn text(rendered: Rendered) -> String {
        match rendered {
            Rendered::Text(t) => t,
            Rendered::Nodes(_) => panic!("expected text"),
        }
    }

    fn nodes(rendered: Rendered) -> Vec<Node> {
        match rendered {
            Rendered::Nodes(n) => n,
            Rendered::Text(_) => panic!("expected nodes"),
        }
    }

    #[test]
    fn test_active_projects_excludes_closed() {
        let statuses = [
            Some("Active"),
            Some("Completed"),
            Some("Planning"),
            Some("Cancelled"),
            None,
            Some("Completed"),
        ];
        let docs: Vec<Document> = statuses
            .iter()
            .enumerate()
            .map(|(i, s)| match s {
                Some(s) => Document::new(format!("p{}", i)).field("status", *s),
                None => Document::new(format!("p{}", i)),
            })
            .collect();

        let value = TrackedMetric::ActiveProjects.derive(&docs, now(), &MetricSettings::default());
        assert_eq!(text(value), "3");
    }

    #[test]
    fn test_birthdays_ignore_year() {
        let docs = vec![
            Document::new("a").field("anchorDate", "1990-07-04"),
            Document::new("b").field("anchorDate", "2001-07-04T20:00:00Z"),
            Document::new("c").field("anchorDate", "1990-07-05"),
        ];
        let value = TrackedMetric::BirthdaysToday.derive(&docs, now(), &MetricSettings::default());
        assert_eq!(text(value), "2");
    }

    #[test]
    fn test_birthdays_use_configured_offset() {
        // 20:00 UTC on the 3rd is already the 4th at UTC+7
        let late = Utc.with_ymd_and_hms(2024, 7, 3, 20, 0, 0).unwrap();
        let events = vec![BirthdayEvent {
            anchor_date: Utc.with_ymd_and_hms(1995, 7, 4, 0, 0, 0).unwrap(),
        }];
        assert_eq!(count_birthdays_on(&events, late, &Calendar::utc()), 0);
        assert_eq!(
            count_birthdays_on(&events, late, &Calendar::with_offset_minutes(7 * 60)),
            1
        );
    }

    #[test]
    fn test_upcoming_query_starts_today() {
        let query = TrackedMetric::UpcomingAcademicEvents.server_query(now(), &MetricSettings::default());
        let docs = vec![
            Document::new("past").field("date", "2024-07-03"),
            Document::new("today").field("date", "2024-07-04T00:00:00Z"),
            Document::new("later").field("date", "2024-09-01"),
        ];
        let matched = query.apply(&docs);
        assert_eq!(matched.len(), 2);

        let value = TrackedMetric::UpcomingAcademicEvents.derive(&matched, now(), &MetricSettings::default());
        assert_eq!(text(value), "2");
    }

    #[test]
    fn test_total_assets_skips_non_numeric() {
        let docs = vec![
            Document::new("a").field("amount", 1_200_000),
            Document::new("b").field("amount", 300_000.5),
            Document::new("c").field("amount", "lots"),
            Document::new("d"),
        ];
        let value = TrackedMetric::TotalAssets.derive(&docs, now(), &MetricSettings::default());
        assert_eq!(text(value), "Rp 1.5M");

        let empty = TrackedMetric::TotalAssets.derive(&[], now(), &MetricSettings::default());
        assert_eq!(text(empty), "Rp 0");
    }

    #[test]
    fn test_sum_of_no_amounts_is_positive_zero() {
        let total = sum_amounts(&[]);
        assert_eq!(total, 0.0);
        assert!(total.is_sign_positive());
    }

    #[test]
    fn test_empty_activity_renders_placeholder() {
        let rendered = nodes(TrackedMetric::RecentActivity.derive(&[], now(), &MetricSettings::default()));
        assert_eq!(rendered.len(), 1);
        assert!(rendered[0].has_class("muted"));
        assert_eq!(rendered[0].text, NO_ACTIVITY_TEXT);
        assert!(!rendered.iter().any(|n| n.has_class("activity-item")));
    }

    #[test]
    fn test_activity_item_content() {
        let docs = vec![
            Document::new("1")
                .field("title", "Uploaded report")
                .field("source", "Projects")
                .field("date", (now() - Duration::minutes(5)).to_rfc3339()),
            Document::new("2"),
        ];
        let rendered = nodes(TrackedMetric::RecentActivity.derive(&docs, now(), &MetricSettings::default()));
        assert_eq!(rendered.len(), 2);
        assert_eq!(
            rendered[0].text_content(),
            "🟢 Uploaded report (via Projects) 5m ago"
        );
        assert_eq!(rendered[1].text_content(), "🟢 No title just now");
    }

    #[test]
    fn test_activity_top_six_in_source_order() {
        let settings = MetricSettings::default();
        let docs: Vec<Document> = (0..8)
            .map(|i| {
                Document::new(format!("a{}", i))
                    .field("title", format!("entry {}", i))
                    .field("date", (now() - Duration::hours(i)).to_rfc3339())
            })
            .rev()
            .collect();

        let query = TrackedMetric::RecentActivity.server_query(now(), &settings);
        let top = query.apply(&docs);
        let rendered = nodes(TrackedMetric::RecentActivity.derive(&top, now(), &settings));

        assert_eq!(rendered.len(), 6);
        let titles: Vec<String> = rendered
            .iter()
            .map(|n| n.children[1].children[0].text.clone())
            .collect();
        assert_eq!(
            titles,
            vec!["entry 0", "entry 1", "entry 2", "entry 3", "entry 4", "entry 5"]
        );
    }

    #[test]
    fn test_targets() {
        for metric in TrackedMetric::ALL {
            assert!(!metric.target().is_empty());
        }
        assert_eq!(
            TrackedMetric::TotalAssets.target(),
            "feature-value:Total Assets"
        );
        assert_eq!(TrackedMetric::Violations.collection(), "studentViolations");
    }
}
