//! Error types module
//!
//! All failures are unified under [`AppError`]. Each variant describes itself
//! through [`ErrorMetadata`]: the HTTP status, a machine-readable code and the
//! sanitized message that is allowed to reach the caller. Internal detail stays
//! in the `Display` output and source chain, which only ever reach the logs.
//!
//! Persistence failures are classified into [`DbError`] from sqlx's typed
//! errors (behind the `sqlx` feature) rather than from driver message text.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "DATABASE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Persistence-layer failure, classified by kind.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Record not found")]
    NotFound,

    #[error("Duplicate key: {0}")]
    Duplicate(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Database connection failed")]
    Connection(#[source] BoxError),

    #[error("Database query failed")]
    Query(#[source] BoxError),
}

impl DbError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound)
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind;

        match err {
            sqlx::Error::RowNotFound => DbError::NotFound,
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => DbError::Connection(Box::new(err)),
            sqlx::Error::Database(ref db_err) if db_err.kind() == ErrorKind::UniqueViolation => {
                DbError::Duplicate(db_err.message().to_string())
            }
            other => DbError::Query(Box::new(other)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Search store is not configured: {0}")]
    NotConfigured(String),

    #[error("Google AI API key is not configured")]
    MissingApiKey,

    #[error("Local file I/O failed: {0}")]
    LocalIo(#[source] io::Error),

    #[error("Vision processing failed")]
    VisionProcessing(#[source] anyhow::Error),

    #[error("Upload to search store failed")]
    UploadFailed(#[source] anyhow::Error),

    #[error("Upload operation reported an error: {0}")]
    OperationFailed(String),

    #[error("Upload operation did not complete within {waited_secs} seconds")]
    UploadTimeout { waited_secs: u64 },

    #[error("Upload wait cancelled by shutdown")]
    UploadCancelled,

    #[error("Upload operation {operation} completed without a document id")]
    MissingDocumentId { operation: String },

    #[error("Document {document_id} was uploaded but its metadata was not saved")]
    MetadataNotSaved {
        document_id: String,
        #[source]
        source: DbError,
    },

    #[error("Failed to delete document {document_id} from the search store")]
    RemoteDeletionFailed {
        document_id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Document {document_id} was removed remotely but its metadata row remains")]
    LocalDeletionFailed {
        document_id: String,
        #[source]
        source: DbError,
    },

    #[error("Database error: {0}")]
    Database(#[source] DbError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        AppError::Database(err)
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(DbError::from(err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::LocalIo(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, bool, LogLevel) {
    match err {
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, false, LogLevel::Debug),
        AppError::NotFound(_) => (404, "NOT_FOUND", false, false, LogLevel::Debug),
        AppError::NotConfigured(_) => (500, "STORAGE_NOT_CONFIGURED", false, true, LogLevel::Error),
        AppError::MissingApiKey => (500, "API_KEY_NOT_CONFIGURED", false, true, LogLevel::Error),
        AppError::LocalIo(_) => (500, "LOCAL_IO_ERROR", true, true, LogLevel::Error),
        AppError::VisionProcessing(_) => (500, "VISION_PROCESSING_ERROR", true, true, LogLevel::Error),
        AppError::UploadFailed(_) => (500, "UPLOAD_FAILED", true, true, LogLevel::Error),
        AppError::OperationFailed(_) => (500, "UPLOAD_OPERATION_FAILED", true, false, LogLevel::Error),
        AppError::UploadTimeout { .. } => (504, "UPLOAD_TIMEOUT", true, false, LogLevel::Warn),
        AppError::UploadCancelled => (503, "UPLOAD_CANCELLED", true, false, LogLevel::Warn),
        AppError::MissingDocumentId { .. } => (500, "ORPHANED_REMOTE_DOCUMENT", false, true, LogLevel::Error),
        AppError::MetadataNotSaved { .. } => (500, "METADATA_NOT_SAVED", false, true, LogLevel::Error),
        AppError::RemoteDeletionFailed { .. } => (500, "REMOTE_DELETION_FAILED", true, true, LogLevel::Error),
        AppError::LocalDeletionFailed { .. } => (500, "LOCAL_DELETION_FAILED", true, true, LogLevel::Error),
        AppError::Database(db) => match db {
            DbError::NotFound => (404, "NOT_FOUND", false, false, LogLevel::Debug),
            DbError::Duplicate(_) => (409, "DUPLICATE_KEY", false, false, LogLevel::Warn),
            DbError::InvalidRecord(_) => (400, "INVALID_RECORD", false, false, LogLevel::Debug),
            DbError::Connection(_) => (503, "DATABASE_UNAVAILABLE", true, true, LogLevel::Error),
            DbError::Query(_) => (500, "DATABASE_ERROR", true, true, LogLevel::Error),
        },
        AppError::Internal(_) | AppError::InternalWithSource { .. } => {
            (500, "INTERNAL_ERROR", true, true, LogLevel::Error)
        }
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidInput(_) => "ValidationError",
            AppError::NotFound(_) => "NotFound",
            AppError::NotConfigured(_) | AppError::MissingApiKey => "ConfigurationError",
            AppError::LocalIo(_) => "LocalIoError",
            AppError::VisionProcessing(_) => "VisionProcessingError",
            AppError::UploadFailed(_)
            | AppError::OperationFailed(_)
            | AppError::UploadTimeout { .. }
            | AppError::UploadCancelled
            | AppError::MissingDocumentId { .. } => "FileUploadError",
            AppError::MetadataNotSaved { .. } => "PartialUploadError",
            AppError::RemoteDeletionFailed { .. } => "FileDeletionError",
            AppError::LocalDeletionFailed { .. } => "PartialDeletionError",
            AppError::Database(_) => "DatabaseError",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).4
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NotFound(ref resource) => format!("{} not found", resource),
            AppError::NotConfigured(_) => {
                "Failed to initialize file storage. Please check your configuration.".to_string()
            }
            AppError::MissingApiKey => "Google AI API key is not configured".to_string(),
            AppError::LocalIo(_) => "Failed to process file data".to_string(),
            AppError::VisionProcessing(_) => "Failed to process image. Please try again.".to_string(),
            AppError::UploadFailed(_) => "Failed to upload file directly to search store".to_string(),
            AppError::OperationFailed(ref msg) => format!("File upload failed: {}", msg),
            AppError::UploadTimeout { waited_secs } => {
                format!("File upload did not complete within {} seconds", waited_secs)
            }
            AppError::UploadCancelled => {
                "File upload was interrupted because the server is shutting down".to_string()
            }
            AppError::MissingDocumentId { .. } => {
                "File upload completed but document ID is missing".to_string()
            }
            AppError::MetadataNotSaved { .. } => {
                "File uploaded but failed to save metadata. Please contact support.".to_string()
            }
            AppError::RemoteDeletionFailed { .. } => {
                "Failed to delete the file. Please try again.".to_string()
            }
            AppError::LocalDeletionFailed { .. } => "The document was removed from the search store but its metadata could not be deleted. Please try again.".to_string(),
            AppError::Database(db) => match db {
                DbError::NotFound => {
                    "The file you are trying to delete no longer exists.".to_string()
                }
                DbError::Duplicate(_) => "This file already exists in the database.".to_string(),
                DbError::InvalidRecord(ref msg) => msg.clone(),
                DbError::Connection(_) => {
                    "Database connection failed. Please check your connection and try again."
                        .to_string()
                }
                DbError::Query(_) => "Database operation failed. Please try again or contact support if the issue persists.".to_string(),
            },
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "An unexpected error occurred. Please try again.".to_string()
            }
        }
    }
}
