use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::Utc;
use ragdesk_core::constants::{MARKDOWN_MIME, ORIGINAL_NAME_METADATA_KEY};
use ragdesk_core::file_types::{is_image_mime, resolve_mime_type};
use ragdesk_core::format::format_file_size;
use ragdesk_core::validation::validate_upload;
use ragdesk_core::{AppError, DocumentMetadata, NewDocument};
use ragdesk_services::{build_summary_document, CustomMetadata, UploadRequest};

use super::poll::wait_for_completion;
use super::scratch::ScratchFiles;
use crate::services::service_error;
use crate::state::AppState;

/// One file taken from the multipart body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    /// Content type declared by the client, if any.
    pub content_type: Option<String>,
    pub data: Bytes,
}

#[derive(Debug, Clone)]
pub struct IngestionOutcome {
    pub document: DocumentMetadata,
    pub message: String,
}

/// What actually gets sent to the store.
struct StoreUpload {
    path: PathBuf,
    display_name: String,
    mime_type: String,
}

/// `{stem}-vision-summary.md`, with `image` standing in for an empty stem.
pub fn summary_display_name(original_name: &str) -> String {
    let stem = Path::new(original_name)
        .file_stem()
        .map(|s| s.to_string_lossy().trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "image".to_string());
    format!("{}-vision-summary.md", stem)
}

/// Run one upload through the full pipeline.
#[tracing::instrument(
    skip(state, file),
    fields(file.name = %file.name, file.bytes = file.data.len())
)]
pub async fn ingest(state: AppState, file: UploadedFile) -> Result<IngestionOutcome, AppError> {
    validate_upload(&file.name, file.data.len())?;

    let mime_type = resolve_mime_type(file.content_type.as_deref(), &file.name);
    let store_name = state.store_name()?;

    let mut scratch = ScratchFiles::new(state.config.scratch_dir());
    let staged = scratch.stage(&file.name, &file.data).await?;

    let upload = if is_image_mime(&mime_type) {
        summarize_image(&state, &file, &mime_type, &mut scratch).await?
    } else {
        StoreUpload {
            path: staged,
            display_name: file.name.clone(),
            mime_type: mime_type.clone(),
        }
    };

    tracing::info!(
        display_name = %upload.display_name,
        mime_type = %upload.mime_type,
        "Uploading file to search store"
    );

    let operation = state
        .ai
        .store
        .upload_to_store(UploadRequest {
            store_name,
            path: upload.path,
            display_name: upload.display_name,
            mime_type: upload.mime_type,
            custom_metadata: vec![CustomMetadata::new(
                ORIGINAL_NAME_METADATA_KEY,
                file.name.clone(),
            )],
        })
        .await
        .map_err(|e| service_error(e, AppError::UploadFailed))?;

    let operation = wait_for_completion(
        state.ai.store.as_ref(),
        operation,
        state.config.poll_settings(),
        &state.shutdown,
    )
    .await?;
    scratch.release();

    let document_id = operation
        .document_id()
        .map(str::to_string)
        .ok_or_else(|| AppError::MissingDocumentId {
            operation: operation.name.clone(),
        })?;

    let document = state
        .documents
        .insert(NewDocument {
            id: document_id.clone(),
            name: file.name.clone(),
            file_type: mime_type,
            size: format_file_size(file.data.len() as u64),
        })
        .await
        .map_err(|source| {
            tracing::error!(
                document_id = %document_id,
                error = %source,
                "Document stored remotely but metadata insert failed"
            );
            AppError::MetadataNotSaved {
                document_id: document_id.clone(),
                source,
            }
        })?;

    state.listing_cache.invalidate().await;
    tracing::info!(document_id = %document.id, "File ingested");

    Ok(IngestionOutcome {
        message: format!("File '{}' uploaded successfully", file.name),
        document,
    })
}

async fn summarize_image(
    state: &AppState,
    file: &UploadedFile,
    mime_type: &str,
    scratch: &mut ScratchFiles,
) -> Result<StoreUpload, AppError> {
    tracing::info!(mime_type, "Summarizing image before ingestion");

    let summary = state
        .ai
        .vision
        .summarize_image(&file.data, mime_type)
        .await
        .map_err(|e| service_error(e, AppError::VisionProcessing))?;

    let document = build_summary_document(&file.name, mime_type, &summary, Utc::now());
    let display_name = summary_display_name(&file.name);
    let path = scratch.stage(&display_name, document.as_bytes()).await?;

    Ok(StoreUpload {
        path,
        display_name,
        mime_type: MARKDOWN_MIME.to_string(),
    })
}
