//! Request workflows behind the handlers.

pub mod chat_proxy;
pub mod deletion;
pub mod ingestion;
pub mod listing;

use ragdesk_core::AppError;
use ragdesk_services::ServiceError;

/// Configuration gaps keep their own variant; everything else is wrapped by `other`.
pub(crate) fn service_error(
    err: ServiceError,
    other: impl FnOnce(anyhow::Error) -> AppError,
) -> AppError {
    match err {
        ServiceError::MissingApiKey => AppError::MissingApiKey,
        err => other(anyhow::Error::new(err)),
    }
}
