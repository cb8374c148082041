//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Anything that
//! converts into `AppError` renders with a consistent status, body and log line.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ragdesk_core::{AppError, ErrorMetadata, LogLevel, ValidationError};
use serde::de::DeserializeOwned;

pub use ragdesk_infra::ErrorResponse;

/// Wrapper so `IntoResponse` can be implemented for the core error type.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor that answers malformed bodies with a 400 `ErrorResponse`.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;
        let status = status_of(app_error);

        log_error(app_error);

        (status, Json(error_body(app_error, is_production_env()))).into_response()
    }
}

pub fn status_of(error: &AppError) -> StatusCode {
    StatusCode::from_u16(error.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Details are hidden in production and for sensitive errors.
pub fn error_body(error: &AppError, is_production: bool) -> ErrorResponse {
    let expose = !is_production && !error.is_sensitive();
    ErrorResponse {
        error: error.client_message(),
        details: expose.then(|| error.detailed_message()),
        error_type: expose.then(|| error.error_type().to_string()),
        code: error.error_code().to_string(),
        recoverable: error.is_recoverable(),
    }
}

pub fn log_error(error: &AppError) {
    let error_type = error.error_type();
    let chain = error_chain(error);
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, cause = %chain, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, cause = %chain, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, cause = %chain, "Error occurred");
        }
    }
}

fn error_chain(error: &AppError) -> String {
    let mut causes = Vec::new();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }
    causes.join(": ")
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragdesk_core::DbError;

    #[test]
    fn validation_errors_expose_details_outside_production() {
        let err = AppError::InvalidInput("File is empty".to_string());
        let body = error_body(&err, false);
        assert_eq!(body.error, "File is empty");
        assert_eq!(body.code, "INVALID_INPUT");
        assert!(body.details.is_some());
        assert_eq!(status_of(&err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn sensitive_errors_never_expose_details() {
        let err = AppError::MetadataNotSaved {
            document_id: "doc-1".to_string(),
            source: DbError::Query("connection reset".into()),
        };
        let body = error_body(&err, false);
        assert_eq!(
            body.error,
            "File uploaded but failed to save metadata. Please contact support."
        );
        assert!(body.details.is_none());
        assert!(body.error_type.is_none());
    }

    #[test]
    fn production_hides_details() {
        let err = AppError::UploadTimeout { waited_secs: 300 };
        let body = error_body(&err, true);
        assert!(body.details.is_none());
        assert_eq!(status_of(&err), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn error_chain_follows_sources() {
        let err = AppError::LocalDeletionFailed {
            document_id: "doc-1".to_string(),
            source: DbError::Query("deadlock detected".into()),
        };
        assert!(error_chain(&err).contains("deadlock detected"));
    }
}
