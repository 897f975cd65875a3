//! Configuration: backend credentials (env > `.env`) and room settings.

pub mod room;

pub use room::RoomSettings;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{Result, RoundtableError};
use crate::types::GenerationSettings;
use crate::util::retry::RetryPolicy;

/// Model used when `ROUNDTABLE_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Backend-facing configuration.
///
/// Credentials are opaque to the scheduler; they only reach the backend
/// factory in [`crate::provider::create_backend`].
#[derive(Clone)]
pub struct RoundtableConfig {
    api_keys: Arc<RwLock<HashMap<String, String>>>,
    base_urls: Arc<RwLock<HashMap<String, String>>>,
    model: String,
    max_tokens: Option<u32>,
    request_timeout: Option<Duration>,
    max_attempts: u32,
}

impl fmt::Debug for RoundtableConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let providers: Vec<String> = self
            .api_keys
            .read()
            .map(|keys| keys.keys().cloned().collect())
            .unwrap_or_default();
        f.debug_struct("RoundtableConfig")
            .field("api_keys_for", &providers)
            .field("base_urls", &self.base_urls)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout", &self.request_timeout)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

impl Default for RoundtableConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundtableConfig {
    /// Create empty config.
    pub fn new() -> Self {
        Self {
            api_keys: Arc::new(RwLock::new(HashMap::new())),
            base_urls: Arc::new(RwLock::new(HashMap::new())),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: None,
            request_timeout: None,
            max_attempts: 1,
        }
    }

    /// Load from environment variables, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let mut config = Self::new();

        let key_mappings = [
            ("OPENAI_API_KEY", "openai"),
            ("OPENAI_COMPAT_API_KEY", "openai-compatible"),
        ];
        for (env_var, provider) in &key_mappings {
            if let Ok(key) = std::env::var(env_var) {
                config.set_api_key(provider, key);
            }
        }

        let url_mappings = [
            ("OPENAI_BASE_URL", "openai"),
            ("OPENAI_COMPAT_BASE_URL", "openai-compatible"),
        ];
        for (env_var, provider) in &url_mappings {
            if let Ok(url) = std::env::var(env_var) {
                config.set_base_url(provider, url);
            }
        }

        if let Ok(model) = std::env::var("ROUNDTABLE_MODEL") {
            config.model = model;
        }
        config.max_tokens = env_parse("ROUNDTABLE_MAX_TOKENS")?;
        config.request_timeout =
            env_parse::<u64>("ROUNDTABLE_REQUEST_TIMEOUT_MS")?.map(Duration::from_millis);
        if let Some(attempts) = env_parse("ROUNDTABLE_MAX_ATTEMPTS")? {
            config.max_attempts = attempts;
        }

        Ok(config)
    }

    pub fn set_api_key(&self, provider: &str, key: String) {
        self.api_keys
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(provider.to_string(), key);
    }

    pub fn get_api_key(&self, provider: &str) -> Option<String> {
        self.api_keys.read().ok()?.get(provider).cloned()
    }

    pub fn set_base_url(&self, provider: &str, url: String) {
        self.base_urls
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(provider.to_string(), url);
    }

    pub fn get_base_url(&self, provider: &str) -> Option<String> {
        self.base_urls.read().ok()?.get(provider).cloned()
    }

    pub fn has_credentials(&self, provider: &str) -> bool {
        self.get_api_key(provider).is_some()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    /// Retry policy applied to each completion call.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            ..RetryPolicy::default()
        }
    }

    /// Settings handed to every agent built from this config.
    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            max_tokens: self.max_tokens,
            ..GenerationSettings::default()
        }
    }
}

/// Read and parse an env var; unset means `None`, garbage is an error.
pub(crate) fn env_parse<T>(var: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| RoundtableError::Configuration(format!("{var}={raw:?}: {e}"))),
        Err(_) => Ok(None),
    }
}
