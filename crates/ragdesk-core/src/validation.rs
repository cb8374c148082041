//! Upload validation
//!
//! Every check runs before anything touches the disk. Each failure carries the
//! exact message returned to the uploader.

use crate::constants::MAX_UPLOAD_SIZE_BYTES;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("File name is required")]
    MissingFilename,

    #[error("File is empty")]
    EmptyFile,

    #[error("File size exceeds maximum allowed size of {} MB", .max / 1024 / 1024)]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid file name")]
    InvalidFilename,
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

/// Validate an uploaded file: name first, then size, then path safety.
pub fn validate_upload(filename: &str, size: usize) -> Result<(), ValidationError> {
    validate_upload_with_limit(filename, size, MAX_UPLOAD_SIZE_BYTES)
}

pub fn validate_upload_with_limit(
    filename: &str,
    size: usize,
    max_size: usize,
) -> Result<(), ValidationError> {
    if filename.trim().is_empty() {
        return Err(ValidationError::MissingFilename);
    }

    if size == 0 {
        return Err(ValidationError::EmptyFile);
    }

    if size > max_size {
        return Err(ValidationError::FileTooLarge {
            size,
            max: max_size,
        });
    }

    validate_filename(filename)
}

/// Reject names that could escape the scratch directory.
pub fn validate_filename(filename: &str) -> Result<(), ValidationError> {
    if filename.trim().is_empty() {
        return Err(ValidationError::MissingFilename);
    }

    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        return Err(ValidationError::InvalidFilename);
    }

    Ok(())
}
