//! Collection Routes
//!
//! Write access to the live document store. Every write pushes a fresh
//! snapshot to the subscribed page sessions.
//!
//! - GET /api/v1/collections - List non-empty collection names
//! - GET /api/v1/collections/:name - Current documents of a collection
//! - POST /api/v1/collections/:name/documents - Insert or replace a document
//! - DELETE /api/v1/collections/:name/documents/:id - Remove a document

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{CollectionResponse, InsertDocumentRequest, InsertDocumentResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// GET /api/v1/collections
pub async fn list_collections(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.store.collection_names().await)
}

/// GET /api/v1/collections/:name
///
/// Documents in arrival order. An unknown collection is an empty listing.
pub async fn get_collection(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Json<CollectionResponse> {
    let documents = state.store.documents(&name).await;
    Json(CollectionResponse {
        collection: name,
        count: documents.len(),
        documents,
    })
}

/// POST /api/v1/collections/:name/documents
pub async fn insert_document(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(req): Json<InsertDocumentRequest>,
) -> ApiResult<(StatusCode, Json<InsertDocumentResponse>)> {
    if req.id.as_deref().is_some_and(|id| id.trim().is_empty()) {
        return Err(ApiError::Validation("Document id cannot be blank".to_string()));
    }

    let stored = state.store.insert(&name, req.into_document()).await?;
    tracing::info!(collection = %name, id = %stored.id, "Document inserted");

    Ok((
        StatusCode::CREATED,
        Json(InsertDocumentResponse {
            status: "ok".to_string(),
            collection: name,
            id: stored.id,
        }),
    ))
}

/// DELETE /api/v1/collections/:name/documents/:id
pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path((name, id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    if !state.store.remove(&name, &id).await {
        return Err(ApiError::NotFound(format!(
            "Document '{}' not found in '{}'",
            id, name
        )));
    }
    tracing::info!(collection = %name, id = %id, "Document removed");
    Ok(StatusCode::NO_CONTENT)
}
