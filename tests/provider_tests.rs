//! Tests for backend construction and the in-process mock backend.

use std::sync::Arc;

use roundtable::agent::{Agent, ConversationAgent};
use roundtable::config::RoundtableConfig;
use roundtable::error::{BackendError, RoundtableError};
use roundtable::provider::{create_backend, BackendKind, MockBackend};
use roundtable::types::{GenerationSettings, Message, Role};

#[test]
fn backend_kind_parses_from_cli_names() {
    assert_eq!("openai".parse::<BackendKind>().unwrap(), BackendKind::OpenAi);
    assert_eq!(
        "openai-compatible".parse::<BackendKind>().unwrap(),
        BackendKind::OpenAiCompatible
    );
    assert_eq!("mock".parse::<BackendKind>().unwrap(), BackendKind::Mock);
    assert!("anthropic".parse::<BackendKind>().is_err());
    assert_eq!(BackendKind::OpenAiCompatible.to_string(), "openai-compatible");
}

#[test]
fn mock_backend_needs_no_credentials() {
    let backend = create_backend(BackendKind::Mock, &RoundtableConfig::new()).unwrap();
    assert_eq!(backend.provider_name(), "mock");
}

#[cfg(feature = "openai")]
#[test]
fn openai_backend_without_key_is_an_authentication_error() {
    let result = create_backend(BackendKind::OpenAi, &RoundtableConfig::new());
    assert!(matches!(
        result,
        Err(RoundtableError::Backend(BackendError::Authentication(_)))
    ));
}

#[cfg(feature = "openai")]
#[test]
fn compatible_backend_requires_a_base_url() {
    let config = RoundtableConfig::new();
    config.set_api_key("openai-compatible", "sk-local".into());

    let result = create_backend(BackendKind::OpenAiCompatible, &config);
    assert!(matches!(result, Err(RoundtableError::Configuration(_))));

    config.set_base_url("openai-compatible", "http://localhost:1234/v1".into());
    let backend = create_backend(BackendKind::OpenAiCompatible, &config).unwrap();
    assert_eq!(backend.provider_name(), "openai-compatible");
}

#[cfg(feature = "openai")]
#[test]
fn openai_backend_uses_configured_model() {
    let config = RoundtableConfig::new().with_model("gpt-4o");
    config.set_api_key("openai", "sk-test".into());

    let backend = create_backend(BackendKind::OpenAi, &config).unwrap();
    assert_eq!(backend.model_id(), "gpt-4o");
}

#[tokio::test]
async fn agent_sends_instruction_separately_from_history() {
    let backend = Arc::new(MockBackend::echo());
    let agent = Agent::new("customer", backend.clone())
        .with_system_instruction("You want a snake game.")
        .with_settings(GenerationSettings::builder().max_tokens(30).build());
    let history = vec![
        Message::seed("introduce yourselves"),
        Message::assistant("developer", "I write Rust."),
    ];

    let message = agent.produce_next(&history).await.unwrap();

    assert_eq!(message.author, "customer");
    assert_eq!(message.role, Role::Assistant);
    assert_eq!(message.content, "reply 1 to developer");

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].system, "You want a snake game.");
    assert_eq!(requests[0].messages, history);
    assert_eq!(requests[0].settings.max_tokens, Some(30));
}

#[tokio::test]
async fn backend_failure_surfaces_unchanged() {
    let backend = Arc::new(MockBackend::new(|_, _| {
        Err(BackendError::RateLimited {
            retry_after_ms: None,
        })
    }));
    let agent = Agent::new("pm", backend);

    let err = agent
        .produce_next(&[Message::seed("hi")])
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::RateLimited { .. }));
}

#[tokio::test]
async fn blank_completion_is_rejected() {
    let agent = Agent::new("pm", Arc::new(MockBackend::new(|_, _| Ok("   ".into()))));

    let err = agent
        .produce_next(&[Message::seed("hi")])
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::MalformedResponse(_)));
}

#[test]
fn instruction_can_be_replaced_before_sharing() {
    let mut agent = Agent::new("pm", Arc::new(MockBackend::echo()));
    agent.set_system_instruction("Scope the project.".into());
    assert_eq!(agent.system_instruction(), "Scope the project.");

    let shared = agent.into_shared();
    assert_eq!(shared.system_instruction(), "Scope the project.");
}
