//! Error types for Roundtable.

use strum::Display;
use thiserror::Error;

use crate::agent::AgentId;

/// Coarse classification used for retry decisions and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Network,
    Timeout,
    /// 5xx from the backend.
    Server,
    /// Any other non-success status.
    Api,
    Configuration,
    Serialization,
    Unknown,
}

/// What an operator can do about a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RecoverySuggestion {
    RetryWithBackoff,
    CheckCredentials,
    CheckConfiguration,
    IncreaseTimeout,
    ContactSupport,
}

/// Failure reported by a completion backend.
///
/// Every transport, auth, quota, or decoding problem surfaces as this one
/// kind at the backend boundary. The scheduler never inspects the variant;
/// it only reports it.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Backend error: {0}")]
    Other(String),
}

impl BackendError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Network(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Serialization(_) | Self::MalformedResponse(_) => ErrorCategory::Serialization,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::Other(_) => ErrorCategory::Unknown,
        }
    }

    /// Whether a single completion call may be attempted again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit
                | ErrorCategory::Network
                | ErrorCategory::Timeout
                | ErrorCategory::Server
        )
    }

    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Authentication => RecoverySuggestion::CheckCredentials,
            ErrorCategory::RateLimit
            | ErrorCategory::Network
            | ErrorCategory::Server => RecoverySuggestion::RetryWithBackoff,
            ErrorCategory::Timeout => RecoverySuggestion::IncreaseTimeout,
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            _ => RecoverySuggestion::ContactSupport,
        }
    }
}

/// A backend failure attributed to the agent and round it happened in.
#[derive(Error, Debug)]
#[error("agent {agent_name} ({agent_id}) failed in round {round}: {source}")]
pub struct AgentTurnError {
    pub agent_id: AgentId,
    pub agent_name: String,
    pub round: u64,
    #[source]
    pub source: BackendError,
}

/// Primary error type for all Roundtable operations.
#[derive(Error, Debug)]
pub enum RoundtableError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    AgentTurn(#[from] AgentTurnError),

    #[error("Scenario error: {0}")]
    Scenario(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Room driver failed: {0}")]
    Driver(String),
}

impl RoundtableError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) | Self::Scenario(_) | Self::Toml(_) => {
                ErrorCategory::Configuration
            }
            Self::Backend(e) => e.category(),
            Self::AgentTurn(e) => e.source.category(),
            Self::Io(_) | Self::Driver(_) => ErrorCategory::Unknown,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, RoundtableError>;
