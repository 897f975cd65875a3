//! Per-call timeout and retry around another backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::BackendError;
use crate::util::retry::RetryPolicy;
use crate::util::timeout::with_timeout;

use super::{CompletionBackend, CompletionRequest, CompletionResponse};

/// Applies a [`RetryPolicy`] and an optional timeout to each completion call.
///
/// This never re-runs a turn: it only repeats the one HTTP call that makes
/// up the turn, and only for retryable error categories.
pub struct ResilientBackend {
    inner: Arc<dyn CompletionBackend>,
    retry: RetryPolicy,
    timeout: Option<Duration>,
}

impl ResilientBackend {
    pub fn new(
        inner: Arc<dyn CompletionBackend>,
        retry: RetryPolicy,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            inner,
            retry,
            timeout,
        }
    }
}

#[async_trait]
impl CompletionBackend for ResilientBackend {
    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, BackendError> {
        self.retry
            .execute(|| async {
                match self.timeout {
                    Some(limit) => with_timeout(limit, self.inner.complete(request)).await,
                    None => self.inner.complete(request).await,
                }
            })
            .await
    }
}
