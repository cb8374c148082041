use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use ragdesk_core::AppError;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError};
use crate::services::ingestion;
use crate::state::AppState;
use crate::utils::upload::extract_multipart_file;

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/api/embeddings/upload",
    tag = "documents",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File ingested", body = UploadResponse),
        (status = 400, description = "Invalid upload", body = ErrorResponse),
        (status = 500, description = "Processing or storage failure", body = ErrorResponse),
        (status = 503, description = "Server shutting down", body = ErrorResponse),
        (status = 504, description = "Search store did not finish in time", body = ErrorResponse)
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let file = extract_multipart_file(multipart).await?;

    // Runs detached so a client disconnect does not abandon the store operation.
    let task = tokio::spawn(ingestion::ingest(AppState::clone(&state), file));
    let outcome = task.await.map_err(|e| {
        AppError::Internal(format!("Ingestion task failed: {}", e))
    })??;

    Ok(Json(UploadResponse {
        success: true,
        message: outcome.message,
    }))
}
