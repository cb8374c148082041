//! Listing, lookup, metadata edit and deletion of documents.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ragdesk_core::validation::validate_filename;
use ragdesk_core::{AppError, DocumentResponse, ErrorMetadata, UpdateDocument};

use crate::constants::{EMPTY_UPDATE_MESSAGE, INVALID_DOCUMENT_ID_MESSAGE};
use crate::error::{log_error, status_of, ErrorResponse, HttpAppError, ValidatedJson};
use crate::services::deletion::{self, DeleteResponse};
use crate::services::listing;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/documents",
    tag = "documents",
    responses(
        (status = 200, description = "Documents, newest first; empty when the store cannot be read", body = Vec<DocumentResponse>)
    )
)]
pub async fn list_documents(State(state): State<Arc<AppState>>) -> Json<Vec<DocumentResponse>> {
    Json(listing::list_documents(&state).await)
}

#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    tag = "documents",
    params(("id" = String, Path, description = "Search store document ID")),
    responses(
        (status = 200, description = "Document metadata", body = DocumentResponse),
        (status = 404, description = "Unknown document", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DocumentResponse>, HttpAppError> {
    let document = state
        .documents
        .get(&id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound("Document".to_string()))?;

    Ok(Json(document.into()))
}

#[utoipa::path(
    patch,
    path = "/api/documents/{id}",
    tag = "documents",
    params(("id" = String, Path, description = "Search store document ID")),
    request_body = UpdateDocument,
    responses(
        (status = 200, description = "Updated metadata", body = DocumentResponse),
        (status = 400, description = "Empty or invalid update", body = ErrorResponse),
        (status = 404, description = "Unknown document", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, changes))]
pub async fn update_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(changes): ValidatedJson<UpdateDocument>,
) -> Result<Json<DocumentResponse>, HttpAppError> {
    if changes.is_empty() {
        return Err(AppError::InvalidInput(EMPTY_UPDATE_MESSAGE.to_string()).into());
    }
    if let Some(name) = &changes.name {
        validate_filename(name)?;
    }

    let document = state.documents.update(&id, changes).await.map_err(|e| {
        if e.is_not_found() {
            AppError::NotFound("Document".to_string())
        } else {
            AppError::from(e)
        }
    })?;

    state.listing_cache.invalidate().await;
    tracing::info!(document_id = %document.id, "Updated document metadata");

    Ok(Json(document.into()))
}

#[utoipa::path(
    delete,
    path = "/api/documents/{id}",
    tag = "documents",
    params(("id" = String, Path, description = "Search store document ID")),
    responses(
        (status = 200, description = "Document removed (or already absent)", body = DeleteResponse),
        (status = 400, description = "Blank document ID", body = DeleteResponse),
        (status = 500, description = "Removal failed", body = DeleteResponse)
    )
)]
pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let id = id.trim();
    if id.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(DeleteResponse::failed(INVALID_DOCUMENT_ID_MESSAGE)),
        )
            .into_response();
    }

    match deletion::delete_document(&state, id).await {
        Ok(()) => Json(DeleteResponse::ok()).into_response(),
        Err(e) => {
            log_error(&e);
            (status_of(&e), Json(DeleteResponse::failed(e.client_message()))).into_response()
        }
    }
}
