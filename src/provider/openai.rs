//! OpenAI Chat Completions API backend (also used for compatible servers).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::BackendError;
use crate::types::{FinishReason, GenerationSettings, Message, Role};

use super::http::{bearer_headers, error_from_response, shared_client};
use super::sanitize::name_for_message;
use super::{CompletionBackend, CompletionRequest, CompletionResponse, TokenUsage};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub use crate::config::DEFAULT_MODEL;

/// Chat-completions client for OpenAI and servers that mimic its API.
pub struct OpenAiBackend {
    provider_name: String,
    model: String,
    api_key: String,
    base_url: String,
}

impl OpenAiBackend {
    pub fn new(
        provider_name: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        base_url: Option<String>,
    ) -> Self {
        Self {
            provider_name: provider_name.into(),
            model: model.into(),
            api_key: api_key.into(),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        }
    }

    /// The agent's instruction goes first as a `system` entry, then the
    /// shared history in order.
    fn build_request_body<'a>(&'a self, request: &'a CompletionRequest) -> ChatRequest<'a> {
        let instruction = (!request.system.is_empty()).then(|| ChatMessage {
            role: Role::System,
            content: &request.system,
            name: None,
        });
        let history = request.messages.iter().map(|msg: &Message| ChatMessage {
            role: msg.role,
            content: &msg.content,
            name: name_for_message(msg),
        });

        ChatRequest {
            model: &self.model,
            messages: instruction.into_iter().chain(history).collect(),
            settings: &request.settings,
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    fn provider_name(&self) -> &str {
        &self.provider_name
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, BackendError> {
        let body = self.build_request_body(request);
        let url = format!("{}/chat/completions", self.base_url);

        debug!(
            provider = %self.provider_name,
            model = %self.model,
            history_len = request.messages.len(),
            "chat completion"
        );

        let resp = shared_client()
            .post(&url)
            .headers(bearer_headers(&self.api_key))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        let data: ChatResponse = resp.json().await?;
        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::MalformedResponse("no choices in response".into()))?;
        let text = choice
            .message
            .content
            .ok_or_else(|| BackendError::MalformedResponse("choice has no content".into()))?;

        Ok(CompletionResponse {
            text,
            usage: data.usage.unwrap_or_default(),
            finish_reason: choice.finish_reason.as_deref().and_then(FinishReason::parse),
        })
    }
}

// Wire types

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(flatten)]
    settings: &'a GenerationSettings,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: Role,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> OpenAiBackend {
        OpenAiBackend::new("openai", DEFAULT_MODEL, "sk-test", None)
    }

    #[test]
    fn system_instruction_is_prepended_outside_history() {
        let request = CompletionRequest {
            system: "You are the customer.".into(),
            messages: vec![
                Message::seed("introduce yourselves"),
                Message::assistant("product manager", "hello"),
            ],
            settings: GenerationSettings::builder().max_tokens(30).build(),
        };

        let backend = backend();
        let body = serde_json::to_value(backend.build_request_body(&request)).unwrap();
        let messages = body["messages"].as_array().unwrap();

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], "You are the customer.");
        assert_eq!(messages[1]["role"], "user");
        assert!(messages[1].get("name").is_none());
        assert_eq!(messages[2]["role"], "assistant");
        assert_eq!(messages[2]["name"], "product_manager");
        assert_eq!(body["max_tokens"], 30);
        assert_eq!(body["model"], DEFAULT_MODEL);
    }

    #[test]
    fn empty_instruction_is_not_sent() {
        let request = CompletionRequest {
            system: String::new(),
            messages: vec![Message::seed("hi")],
            settings: GenerationSettings::default(),
        };

        let backend = backend();
        let body = serde_json::to_value(backend.build_request_body(&request)).unwrap();

        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn trailing_slash_in_base_url_is_trimmed() {
        let backend = OpenAiBackend::new("openai", "m", "k", Some("http://x/v1/".into()));
        assert_eq!(backend.base_url, "http://x/v1");
    }
}
