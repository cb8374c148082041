use std::time::Duration;

use ragdesk_core::{AppError, PollSettings};
use ragdesk_services::{FileSearchStore, Operation};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::services::service_error;

/// Exponential delays starting at the initial interval, capped at the maximum.
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    max: Duration,
    multiplier: f64,
}

impl Backoff {
    pub fn new(settings: &PollSettings) -> Self {
        Self {
            next: settings.initial_interval.min(settings.max_interval),
            max: settings.max_interval,
            multiplier: settings.multiplier.max(1.0),
        }
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let current = self.next;
        self.next = current.mul_f64(self.multiplier).min(self.max);
        Some(current)
    }
}

/// Poll `operation` until it is done.
///
/// Fails with `UploadTimeout` when the operation is still pending at the first
/// poll made after `settings.timeout` has elapsed, and with
/// `UploadCancelled` when `shutdown` fires. An operation that finished with an
/// error payload is reported as `OperationFailed`.
#[tracing::instrument(skip_all, fields(operation = %operation.name))]
pub async fn wait_for_completion(
    store: &dyn FileSearchStore,
    mut operation: Operation,
    settings: PollSettings,
    shutdown: &CancellationToken,
) -> Result<Operation, AppError> {
    let deadline = Instant::now() + settings.timeout;
    let mut backoff = Backoff::new(&settings);
    let mut polls = 0u32;

    while !operation.done {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            tracing::warn!(polls, "Upload operation did not complete in time");
            return Err(AppError::UploadTimeout {
                waited_secs: settings.timeout.as_secs(),
            });
        }

        let delay = backoff.next().unwrap_or(settings.max_interval).min(remaining);
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::warn!(polls, "Upload wait cancelled by shutdown");
                return Err(AppError::UploadCancelled);
            }
            _ = tokio::time::sleep(delay) => {}
        }

        // A wait that ends on the deadline still gets its poll.
        polls += 1;
        operation = store
            .get_operation(&operation.name)
            .await
            .map_err(|e| service_error(e, AppError::UploadFailed))?;
        tracing::debug!(polls, done = operation.done, "Polled upload operation");
    }

    if let Some(err) = &operation.error {
        let message = err
            .message
            .clone()
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(AppError::OperationFailed(message));
    }

    Ok(operation)
}
