//! Subscription tasks

use super::{MetricSettings, TrackedMetric};
use crate::backend::{BackendResult, CollectionQuery, Subscription, SubscriptionService};
use crate::page::{PageContext, PageScope};

/// Subscribe with `query`; if the backend rejects it as unsupported,
/// subscribe to the whole collection instead.
///
/// The second element is the query to evaluate locally on every snapshot,
/// `None` when the backend evaluates it.
pub async fn subscribe_with_fallback(
    backend: &dyn SubscriptionService,
    query: CollectionQuery,
) -> BackendResult<(Subscription, Option<CollectionQuery>)> {
    match backend.subscribe(query.clone()).await {
        Ok(subscription) => Ok((subscription, None)),
        Err(e) if e.is_capability_gap() && !query.is_plain() => {
            tracing::debug!(
                collection = %query.collection,
                reason = %e,
                "Query rejected; filtering client-side"
            );
            let subscription = backend.subscribe(query.unfiltered()).await?;
            Ok((subscription, Some(query)))
        }
        Err(e) => Err(e),
    }
}

/// Starts one live subscription task per tracked metric
pub struct LiveMetrics;

impl LiveMetrics {
    /// Track every metric for the page's lifetime
    pub fn start(ctx: &PageContext) -> PageScope {
        Self::start_with(ctx, TrackedMetric::ALL)
    }

    pub fn start_with(
        ctx: &PageContext,
        metrics: impl IntoIterator<Item = TrackedMetric>,
    ) -> PageScope {
        let scope = PageScope::new();
        let settings = MetricSettings::from_config(&ctx.config.metrics);
        for metric in metrics {
            scope.spawn(track(metric, ctx.clone(), settings.clone()));
        }
        tracing::info!(tasks = scope.active_tasks(), "Live metrics started");
        scope
    }
}

async fn track(metric: TrackedMetric, ctx: PageContext, settings: MetricSettings) {
    let query = metric.server_query(ctx.clock.now(), &settings);
    let (mut subscription, local) =
        match subscribe_with_fallback(ctx.backend.as_ref(), query).await {
            Ok(opened) => opened,
            Err(e) => {
                tracing::warn!(metric = metric.name(), error = %e, "Subscribe failed; metric skipped");
                return;
            }
        };

    let target = metric.target();
    tracing::debug!(
        metric = metric.name(),
        subscription_id = %subscription.id(),
        client_side = local.is_some(),
        "Tracking metric"
    );

    while let Some(snapshot) = subscription.next().await {
        let docs = match &local {
            Some(query) => query.apply(&snapshot.docs),
            None => snapshot.docs,
        };
        let rendered = metric.derive(&docs, ctx.clock.now(), &settings);
        if !rendered.write_to(ctx.display.as_ref(), &target) {
            tracing::trace!(metric = metric.name(), target = %target, "Display target missing");
        }
    }

    tracing::debug!(metric = metric.name(), "Subscription closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryAuth;
    use crate::backend::{Document, DocumentStore, QueryCapabilities};
    use crate::clock::FixedClock;
    use crate::config::DashboardConfig;
    use crate::display::{ids, Display, MemoryDisplay};
    use crate::navigation::RecordingNavigator;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;
    use std::time::Duration;

    fn context(store: Arc<DocumentStore>, display: Arc<MemoryDisplay>) -> PageContext {
        PageContext::new(
            store,
            Arc::new(MemoryAuth::new()),
            display,
            Arc::new(RecordingNavigator::new()),
            Arc::new(FixedClock::new(
                Utc.with_ymd_and_hms(2024, 7, 4, 9, 0, 0).unwrap(),
            )),
            Arc::new(DashboardConfig::default()),
        )
    }

    async fn seed_projects(store: &DocumentStore) {
        let docs = ["Active", "Completed", "Planning", "Cancelled", "Active"]
            .iter()
            .enumerate()
            .map(|(i, s)| Document::new(format!("p{}", i)).field("status", *s))
            .collect();
        store.seed("projectsPPM", docs).await.unwrap();
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_matches_server_side() {
        let full = Arc::new(DocumentStore::default());
        let limited = Arc::new(DocumentStore::new(QueryCapabilities::none()));
        seed_projects(&full).await;
        seed_projects(&limited).await;

        let d1 = Arc::new(MemoryDisplay::new(ids::dashboard_page()));
        let d2 = Arc::new(MemoryDisplay::new(ids::dashboard_page()));
        let _s1 = LiveMetrics::start_with(&context(full, d1.clone()), [TrackedMetric::ActiveProjects]);
        let _s2 = LiveMetrics::start_with(
            &context(limited.clone(), d2.clone()),
            [TrackedMetric::ActiveProjects],
        );
        settle().await;

        assert_eq!(d1.text(ids::ACTIVE_PROJECTS).as_deref(), Some("3"));
        assert_eq!(d2.text(ids::ACTIVE_PROJECTS).as_deref(), Some("3"));
        assert_eq!(limited.subscription_count("projectsPPM").await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_update_on_write() {
        let store = Arc::new(DocumentStore::default());
        let display = Arc::new(MemoryDisplay::new(ids::dashboard_page()));
        let _scope = LiveMetrics::start(&context(store.clone(), display.clone()));
        settle().await;

        assert_eq!(display.text(ids::VIOLATIONS).as_deref(), Some("0"));
        let placeholder = display.element(ids::RECENT_ACTIVITIES).unwrap();
        assert_eq!(placeholder.children.len(), 1);

        store
            .insert("studentViolations", Document::new("v1"))
            .await
            .unwrap();
        store
            .insert("studentViolations", Document::new("v2"))
            .await
            .unwrap();
        settle().await;
        assert_eq!(display.text(ids::VIOLATIONS).as_deref(), Some("2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_limited_backend_activity_order() {
        let store = Arc::new(DocumentStore::new(QueryCapabilities::none()));
        let docs = (0..8)
            .map(|i| {
                Document::new(format!("a{}", i))
                    .field("title", format!("entry {}", i))
                    .field("date", format!("2024-07-0{}", i + 1))
            })
            .collect();
        store.seed("activityLogEntries", docs).await.unwrap();

        let display = Arc::new(MemoryDisplay::new(ids::dashboard_page()));
        let _scope = LiveMetrics::start_with(
            &context(store, display.clone()),
            [TrackedMetric::RecentActivity],
        );
        settle().await;

        let list = display.element(ids::RECENT_ACTIVITIES).unwrap();
        assert_eq!(list.children.len(), 6);
        assert_eq!(list.children[0].children[1].children[0].text, "entry 7");
        assert_eq!(list.children[5].children[1].children[0].text, "entry 2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_stops_updates() {
        let store = Arc::new(DocumentStore::default());
        let display = Arc::new(MemoryDisplay::new(ids::dashboard_page()));
        let scope = LiveMetrics::start_with(
            &context(store.clone(), display.clone()),
            [TrackedMetric::Violations],
        );
        settle().await;
        assert_eq!(display.text(ids::VIOLATIONS).as_deref(), Some("0"));

        scope.dispose();
        settle().await;
        store
            .insert("studentViolations", Document::new("v1"))
            .await
            .unwrap();
        settle().await;
        assert_eq!(display.text(ids::VIOLATIONS).as_deref(), Some("0"));
        assert_eq!(store.subscription_count("studentViolations").await, 0);
    }
}
