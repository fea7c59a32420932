//! In-memory Document Store
//!
//! Holds collections in memory and pushes a re-evaluated snapshot to every
//! live subscription of a collection whenever that collection changes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use super::{
    BackendError, BackendResult, CollectionQuery, Document, FilterOp, Snapshot, Subscription,
    SubscriptionId, SubscriptionService,
};

const MAX_COLLECTION_NAME_LEN: usize = 100;

/// Query clauses the store agrees to evaluate server-side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryCapabilities {
    pub equality: bool,
    pub not_in: bool,
    pub range: bool,
    pub order_by: bool,
}

impl Default for QueryCapabilities {
    fn default() -> Self {
        Self::all()
    }
}

impl QueryCapabilities {
    pub fn all() -> Self {
        Self {
            equality: true,
            not_in: true,
            range: true,
            order_by: true,
        }
    }

    /// Only whole-collection subscriptions
    pub fn none() -> Self {
        Self {
            equality: false,
            not_in: false,
            range: false,
            order_by: false,
        }
    }

    fn check(&self, query: &CollectionQuery) -> BackendResult<()> {
        if let Some(filter) = &query.filter {
            let supported = match filter.op {
                FilterOp::Eq { .. } => self.equality,
                FilterOp::NotIn { .. } => self.not_in,
                FilterOp::Gte { .. } => self.range,
            };
            if !supported {
                return Err(BackendError::unsupported(
                    &query.collection,
                    format!("'{}' filters are not supported", filter.op_name()),
                ));
            }
        }
        if query.order_by.is_some() && !self.order_by {
            return Err(BackendError::unsupported(
                &query.collection,
                "ordered queries are not supported",
            ));
        }
        Ok(())
    }
}

struct Subscriber {
    query: CollectionQuery,
    sender: mpsc::UnboundedSender<Snapshot>,
}

/// Live in-memory collections
pub struct DocumentStore {
    /// Collection name → documents in arrival order
    collections: Arc<RwLock<HashMap<String, Vec<Document>>>>,
    /// Collection name → live subscriptions
    subscribers: Arc<RwLock<HashMap<String, HashMap<SubscriptionId, Subscriber>>>>,
    capabilities: QueryCapabilities,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new(QueryCapabilities::all())
    }
}

impl DocumentStore {
    pub fn new(capabilities: QueryCapabilities) -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            capabilities,
        }
    }

    pub fn capabilities(&self) -> QueryCapabilities {
        self.capabilities
    }

    /// Insert or replace a document and notify subscribers.
    ///
    /// A document with an empty id gets a generated one. Replacing keeps the
    /// document's original arrival position.
    pub async fn insert(&self, collection: &str, mut doc: Document) -> BackendResult<Document> {
        validate_collection(collection)?;
        if doc.id.is_empty() {
            doc.id = Uuid::new_v4().to_string();
        }

        {
            let mut collections = self.collections.write().await;
            let docs = collections.entry(collection.to_string()).or_default();
            match docs.iter_mut().find(|d| d.id == doc.id) {
                Some(existing) => *existing = doc.clone(),
                None => docs.push(doc.clone()),
            }
        }

        tracing::debug!(collection = %collection, id = %doc.id, "Document written");
        self.broadcast(collection).await;
        Ok(doc)
    }

    /// Insert many documents with a single notification
    pub async fn seed(&self, collection: &str, docs: Vec<Document>) -> BackendResult<usize> {
        validate_collection(collection)?;
        let count = docs.len();
        {
            let mut collections = self.collections.write().await;
            let existing = collections.entry(collection.to_string()).or_default();
            for mut doc in docs {
                if doc.id.is_empty() {
                    doc.id = Uuid::new_v4().to_string();
                }
                match existing.iter_mut().find(|d| d.id == doc.id) {
                    Some(slot) => *slot = doc,
                    None => existing.push(doc),
                }
            }
        }
        self.broadcast(collection).await;
        Ok(count)
    }

    /// Remove a document. Returns whether it existed.
    pub async fn remove(&self, collection: &str, id: &str) -> bool {
        let removed = {
            let mut collections = self.collections.write().await;
            match collections.get_mut(collection) {
                Some(docs) => {
                    let before = docs.len();
                    docs.retain(|d| d.id != id);
                    docs.len() != before
                }
                None => false,
            }
        };
        if removed {
            self.broadcast(collection).await;
        }
        removed
    }

    /// Current documents of a collection in arrival order
    pub async fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Names of all non-empty collections
    pub async fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .collections
            .read()
            .await
            .iter()
            .filter(|(_, docs)| !docs.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Number of live subscriptions on a collection
    pub async fn subscription_count(&self, collection: &str) -> usize {
        self.subscribers
            .read()
            .await
            .get(collection)
            .map(|s| s.len())
            .unwrap_or(0)
    }

    /// Push a fresh snapshot to every subscriber of a collection
    async fn broadcast(&self, collection: &str) {
        let collections = self.collections.read().await;
        let mut subscribers = self.subscribers.write().await;

        let Some(subs) = subscribers.get_mut(collection) else {
            return;
        };
        let docs = collections.get(collection).map(Vec::as_slice).unwrap_or(&[]);

        let mut closed = Vec::new();
        for (id, sub) in subs.iter() {
            let snapshot = Snapshot::new(collection, sub.query.apply(docs));
            if sub.sender.send(snapshot).is_err() {
                closed.push(id.clone());
            }
        }

        for id in &closed {
            subs.remove(id);
            tracing::debug!(subscription_id = %id, "Subscription dropped");
        }
        if subs.is_empty() {
            subscribers.remove(collection);
        }

        tracing::trace!(
            collection = %collection,
            closed = closed.len(),
            "Broadcast snapshot"
        );
    }
}

#[async_trait]
impl SubscriptionService for DocumentStore {
    async fn subscribe(&self, query: CollectionQuery) -> BackendResult<Subscription> {
        validate_collection(&query.collection)?;
        self.capabilities.check(&query)?;

        let (tx, rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4().to_string();

        // Hold the collection lock until registered so no write slips between
        // the initial snapshot and the first push.
        let collections = self.collections.read().await;
        let docs = collections
            .get(&query.collection)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let initial = Snapshot::new(&query.collection, query.apply(docs));
        let _ = tx.send(initial);

        let collection = query.collection.clone();
        self.subscribers
            .write()
            .await
            .entry(collection.clone())
            .or_default()
            .insert(id.clone(), Subscriber { query, sender: tx });
        drop(collections);

        tracing::debug!(collection = %collection, subscription_id = %id, "Subscribed");
        Ok(Subscription::new(id, rx))
    }
}

fn validate_collection(name: &str) -> BackendResult<()> {
    if name.is_empty() || name.len() > MAX_COLLECTION_NAME_LEN {
        return Err(BackendError::InvalidCollection(name.to_string()));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(BackendError::InvalidCollection(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Direction, Filter};

    #[tokio::test]
    async fn test_initial_snapshot_on_subscribe() {
        let store = DocumentStore::default();
        store
            .insert("studentViolations", Document::new("v1"))
            .await
            .unwrap();

        let mut sub = store
            .subscribe(CollectionQuery::new("studentViolations"))
            .await
            .unwrap();
        let snapshot = sub.next().await.unwrap();
        assert_eq!(snapshot.size(), 1);
        assert_eq!(store.subscription_count("studentViolations").await, 1);
    }

    #[tokio::test]
    async fn test_push_on_write_applies_query() {
        let store = DocumentStore::default();
        let query = CollectionQuery::new("targetListItems").filter(Filter::eq("status", "In Progress"));
        let mut sub = store.subscribe(query).await.unwrap();
        assert_eq!(sub.next().await.unwrap().size(), 0);

        store
            .insert(
                "targetListItems",
                Document::new("t1").field("status", "In Progress"),
            )
            .await
            .unwrap();
        store
            .insert("targetListItems", Document::new("t2").field("status", "Done"))
            .await
            .unwrap();

        assert_eq!(sub.next().await.unwrap().size(), 1);
        assert_eq!(sub.next().await.unwrap().size(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_filter_rejected() {
        let store = DocumentStore::new(QueryCapabilities {
            not_in: false,
            ..QueryCapabilities::all()
        });
        let query = CollectionQuery::new("projectsPPM")
            .filter(Filter::not_in("status", ["Completed", "Cancelled"]));
        let err = store.subscribe(query.clone()).await.err().unwrap();
        assert!(err.is_capability_gap());

        // Unfiltered still works
        assert!(store.subscribe(query.unfiltered()).await.is_ok());
    }

    #[tokio::test]
    async fn test_unsupported_order_rejected() {
        let store = DocumentStore::new(QueryCapabilities::none());
        let query = CollectionQuery::new("activityLogEntries").order_by("date", Direction::Desc);
        assert!(store.subscribe(query).await.is_err());
    }

    #[tokio::test]
    async fn test_dropped_subscription_pruned() {
        let store = DocumentStore::default();
        let sub = store
            .subscribe(CollectionQuery::new("assetItems"))
            .await
            .unwrap();
        drop(sub);

        store.insert("assetItems", Document::new("a")).await.unwrap();
        assert_eq!(store.subscription_count("assetItems").await, 0);
    }

    #[tokio::test]
    async fn test_upsert_keeps_position_and_generates_ids() {
        let store = DocumentStore::default();
        store.insert("assetItems", Document::new("a").field("amount", 1)).await.unwrap();
        store.insert("assetItems", Document::new("b").field("amount", 2)).await.unwrap();
        store.insert("assetItems", Document::new("a").field("amount", 3)).await.unwrap();
        let generated = store.insert("assetItems", Document::new("")).await.unwrap();
        assert!(!generated.id.is_empty());

        let docs = store.documents("assetItems").await;
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].id, "a");
        assert_eq!(docs[0].number("amount"), Some(3.0));
    }

    #[tokio::test]
    async fn test_remove_notifies() {
        let store = DocumentStore::default();
        store.insert("birthdayEvents", Document::new("b1")).await.unwrap();
        let mut sub = store
            .subscribe(CollectionQuery::new("birthdayEvents"))
            .await
            .unwrap();
        assert_eq!(sub.next().await.unwrap().size(), 1);

        assert!(store.remove("birthdayEvents", "b1").await);
        assert_eq!(sub.next().await.unwrap().size(), 0);
        assert!(!store.remove("birthdayEvents", "b1").await);
    }

    #[tokio::test]
    async fn test_invalid_collection_name() {
        let store = DocumentStore::default();
        assert!(store.insert("", Document::new("x")).await.is_err());
        assert!(store.insert("bad/name", Document::new("x")).await.is_err());
    }
}
