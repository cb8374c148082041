//! Multipart helpers for the upload endpoint

use axum::extract::Multipart;
use ragdesk_core::{AppError, ValidationError};

use crate::services::ingestion::UploadedFile;

/// Take the single `file` field out of a multipart body.
///
/// A body without one fails with the "No file uploaded" validation error;
/// a second `file` field is rejected.
pub async fn extract_multipart_file(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        if file.is_some() {
            return Err(AppError::InvalidInput(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            ));
        }

        let name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?;

        file = Some(UploadedFile {
            name,
            content_type,
            data,
        });
    }

    file.ok_or_else(|| ValidationError::MissingFile.into())
}
