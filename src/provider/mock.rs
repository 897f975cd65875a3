//! In-process backend driven by a closure. Used by tests and `--mock` runs.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::BackendError;

use super::{CompletionBackend, CompletionRequest, CompletionResponse};

/// Computes a reply from the request and the zero-based call index.
pub type Responder =
    Arc<dyn Fn(&CompletionRequest, usize) -> Result<String, BackendError> + Send + Sync>;

/// A backend that answers from a responder closure and records every request.
pub struct MockBackend {
    model_id: String,
    responder: Responder,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockBackend {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&CompletionRequest, usize) -> Result<String, BackendError> + Send + Sync + 'static,
    {
        Self {
            model_id: "mock".to_string(),
            responder: Arc::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Replies by acknowledging whoever spoke last.
    pub fn echo() -> Self {
        Self::new(|request, index| {
            let last = request
                .messages
                .last()
                .map(|m| m.author.as_str())
                .unwrap_or("nobody");
            Ok(format!("reply {} to {last}", index + 1))
        })
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Every request received so far, in call order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CompletionRequest>> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, BackendError> {
        let index = {
            let mut requests = self.lock();
            requests.push(request.clone());
            requests.len() - 1
        };
        (self.responder)(request, index).map(CompletionResponse::text)
    }
}
