//! Timeout helper.

use std::future::Future;
use std::time::Duration;

use crate::error::BackendError;

/// Wrap a completion future with a timeout.
pub async fn with_timeout<T>(
    duration: Duration,
    future: impl Future<Output = Result<T, BackendError>>,
) -> Result<T, BackendError> {
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(BackendError::Timeout(duration.as_millis() as u64)),
    }
}
