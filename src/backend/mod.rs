//! Document Backend
//!
//! The dashboard reads everything it shows from live collection
//! subscriptions. A subscription delivers a full [`Snapshot`] immediately and
//! again after every change to the collection.
//!
//! ## Architecture
//!
//! - **SubscriptionService**: trait seam over the hosted document backend
//! - **DocumentStore**: in-memory live store with configurable query
//!   capabilities, used for tests, demos and the bundled server
//! - **CollectionQuery**: filter / order / limit, evaluated identically on
//!   either side of the seam

mod error;
mod query;
mod store;

pub use error::{BackendError, BackendResult};
pub use query::{
    compare_values, parse_timestamp, timestamp_value, CollectionQuery, Direction, Document,
    Filter, FilterOp, OrderBy, Snapshot,
};
pub use store::{DocumentStore, QueryCapabilities};

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Unique identifier for a live subscription
pub type SubscriptionId = String;

/// Live query service
#[async_trait]
pub trait SubscriptionService: Send + Sync {
    /// Open a live subscription.
    ///
    /// Returns [`BackendError::UnsupportedQuery`] when the backend cannot
    /// evaluate the query's clauses server-side.
    async fn subscribe(&self, query: CollectionQuery) -> BackendResult<Subscription>;
}

/// Receiving end of a live subscription.
///
/// Dropping it ends the subscription; the backend prunes it on its next push.
pub struct Subscription {
    id: SubscriptionId,
    receiver: mpsc::UnboundedReceiver<Snapshot>,
}

impl Subscription {
    pub fn new(id: SubscriptionId, receiver: mpsc::UnboundedReceiver<Snapshot>) -> Self {
        Self { id, receiver }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Wait for the next snapshot; `None` once the backend closes the stream
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.receiver.recv().await
    }

    /// Next snapshot if one is already queued
    pub fn try_next(&mut self) -> Option<Snapshot> {
        self.receiver.try_recv().ok()
    }
}
