//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::backend::Document;
use crate::websocket::HubStats;

/// Insert document request
#[derive(Debug, Deserialize)]
pub struct InsertDocumentRequest {
    /// Document id; generated when absent. An existing id is replaced.
    #[serde(default)]
    pub id: Option<String>,
    /// Document fields
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl InsertDocumentRequest {
    pub fn into_document(self) -> Document {
        Document {
            id: self.id.unwrap_or_default(),
            fields: self.fields,
        }
    }
}

/// Insert document response
#[derive(Debug, Serialize)]
pub struct InsertDocumentResponse {
    /// Status: "ok"
    pub status: String,
    pub collection: String,
    /// Id of the stored document
    pub id: String,
}

/// Collection listing
#[derive(Debug, Serialize)]
pub struct CollectionResponse {
    pub collection: String,
    pub count: usize,
    pub documents: Vec<Document>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: String,
    /// Auth provider: "ok" or "unavailable"
    pub auth: String,
    /// Non-empty collections in the store
    pub collections: usize,
    /// Live page sessions
    pub sessions: HubStats,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Version string
    pub version: String,
}
