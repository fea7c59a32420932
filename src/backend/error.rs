//! Backend error types

use thiserror::Error;

/// Errors returned by a [`SubscriptionService`](super::SubscriptionService)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// The backend cannot evaluate this query server-side (unsupported
    /// filter operator or ordering). Callers may retry unfiltered.
    #[error("Unsupported query on {collection}: {reason}")]
    UnsupportedQuery { collection: String, reason: String },

    /// Collection name rejected
    #[error("Invalid collection name: {0}")]
    InvalidCollection(String),

    /// Document body rejected
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Backend client not initialized or unreachable
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

impl BackendError {
    pub fn unsupported(collection: &str, reason: impl Into<String>) -> Self {
        BackendError::UnsupportedQuery {
            collection: collection.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the failure is a capability gap that a client-side query can
    /// cover
    pub fn is_capability_gap(&self) -> bool {
        matches!(self, BackendError::UnsupportedQuery { .. })
    }
}

/// Result type alias for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BackendError::unsupported("projectsPPM", "not-in filters disabled");
        assert_eq!(
            err.to_string(),
            "Unsupported query on projectsPPM: not-in filters disabled"
        );
        assert!(err.is_capability_gap());
        assert!(!BackendError::Unavailable("offline".into()).is_capability_gap());
    }
}
