use thiserror::Error;

/// Failures talking to the hosted services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Google AI API key is not configured")]
    MissingApiKey,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Google AI API request failed: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound(_))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
