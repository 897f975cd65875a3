//! Completion backends: the remote dependency each agent calls once per turn.

pub mod http;
pub mod mock;
pub mod resilient;
pub mod sanitize;

#[cfg(feature = "openai")]
pub mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::config::RoundtableConfig;
use crate::error::{BackendError, RoundtableError};
use crate::types::{FinishReason, GenerationSettings, Message};

pub use mock::MockBackend;
pub use resilient::ResilientBackend;

/// A request sent to a completion backend.
///
/// `system` is the calling agent's instruction; it is never part of
/// `messages`, which is the shared history verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub messages: Vec<Message>,
    pub settings: GenerationSettings,
}

/// Token accounting reported with a completion, when the backend sends it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Response from a completion backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionResponse {
    pub text: String,
    pub usage: TokenUsage,
    pub finish_reason: Option<FinishReason>,
}

impl CompletionResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: TokenUsage::default(),
            finish_reason: Some(FinishReason::Stop),
        }
    }
}

/// Core trait implemented by all completion backends.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Provider name (e.g., "openai", "mock").
    fn provider_name(&self) -> &str;
    /// The model ID this backend instance serves.
    fn model_id(&self) -> &str;

    /// Produce one completion for the given instruction and history.
    async fn complete(&self, request: &CompletionRequest)
        -> Result<CompletionResponse, BackendError>;
}

/// Which backend implementation to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum BackendKind {
    #[strum(serialize = "openai")]
    #[serde(rename = "openai")]
    OpenAi,
    #[strum(serialize = "openai-compatible")]
    #[serde(rename = "openai-compatible")]
    OpenAiCompatible,
    Mock,
}

/// Create a backend of the given kind, using the provided config.
///
/// Network backends are wrapped in [`ResilientBackend`] so the configured
/// per-call timeout and attempt count apply.
#[allow(unused_variables)]
pub fn create_backend(
    kind: BackendKind,
    config: &RoundtableConfig,
) -> Result<Arc<dyn CompletionBackend>, RoundtableError> {
    let backend: Arc<dyn CompletionBackend> = match kind {
        BackendKind::Mock => return Ok(Arc::new(MockBackend::echo())),
        #[cfg(feature = "openai")]
        BackendKind::OpenAi => {
            let api_key = config
                .get_api_key("openai")
                .ok_or_else(|| BackendError::Authentication("Missing OPENAI_API_KEY".into()))?;
            Arc::new(openai::OpenAiBackend::new(
                "openai",
                config.model(),
                api_key,
                config.get_base_url("openai"),
            ))
        }
        #[cfg(feature = "openai")]
        BackendKind::OpenAiCompatible => {
            let api_key = config
                .get_api_key("openai-compatible")
                .or_else(|| config.get_api_key("openai"))
                .ok_or_else(|| {
                    BackendError::Authentication("Missing OPENAI_COMPAT_API_KEY".into())
                })?;
            let base_url = config.get_base_url("openai-compatible").ok_or_else(|| {
                RoundtableError::Configuration("Missing OPENAI_COMPAT_BASE_URL".into())
            })?;
            Arc::new(openai::OpenAiBackend::new(
                "openai-compatible",
                config.model(),
                api_key,
                Some(base_url),
            ))
        }
        #[allow(unreachable_patterns)]
        _ => {
            return Err(RoundtableError::Configuration(format!(
                "Backend '{kind}' not enabled via feature flags"
            )))
        }
    };

    Ok(Arc::new(ResilientBackend::new(
        backend,
        config.retry_policy(),
        config.request_timeout(),
    )))
}
