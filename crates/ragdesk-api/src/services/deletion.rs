//! Deletion workflow: search store first, then the metadata row.

use ragdesk_core::AppError;
use serde::Serialize;
use utoipa::ToSchema;

use crate::constants::DELETE_SUCCESS_MESSAGE;
use crate::services::service_error;
use crate::state::AppState;

/// `{success, message}` body returned by the delete endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

impl DeleteResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: DELETE_SUCCESS_MESSAGE.to_string(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Remove a document everywhere. "Not found" on either side counts as done.
///
/// A remote failure leaves the local row untouched.
#[tracing::instrument(skip(state), fields(document_id = %document_id))]
pub async fn delete_document(state: &AppState, document_id: &str) -> Result<(), AppError> {
    let store_name = state.store_name()?;

    match state.ai.store.delete_document(&store_name, document_id).await {
        Ok(()) => tracing::info!("Removed document from search store"),
        Err(e) if e.is_not_found() => {
            tracing::info!("Document already absent from search store")
        }
        Err(e) => {
            return Err(service_error(e, |source| AppError::RemoteDeletionFailed {
                document_id: document_id.to_string(),
                source,
            }))
        }
    }

    match state.documents.delete(document_id).await {
        Ok(()) => tracing::info!("Removed document metadata"),
        Err(e) if e.is_not_found() => tracing::info!("Document metadata already absent"),
        Err(source) => {
            return Err(AppError::LocalDeletionFailed {
                document_id: document_id.to_string(),
                source,
            })
        }
    }

    state.listing_cache.invalidate().await;
    Ok(())
}
