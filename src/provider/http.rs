//! Shared HTTP client and the mapping from HTTP failures to backend errors.

use std::sync::OnceLock;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};

use crate::error::BackendError;

/// Transport-level ceiling. Per-call limits live in `ResilientBackend`.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(120);

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(CLIENT_TIMEOUT)
            .pool_max_idle_per_host(10)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    })
}

/// JSON content type plus `Authorization: Bearer <key>`.
pub fn bearer_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {api_key}")) {
        headers.insert(AUTHORIZATION, val);
    }
    headers
}

/// Consume a non-success response into a [`BackendError`].
///
/// A `Retry-After` header wins over a `retry_after` hint in the body.
pub async fn error_from_response(resp: reqwest::Response) -> BackendError {
    let status = resp.status().as_u16();
    let header_hint = retry_after_header(resp.headers());
    let body = resp.text().await.unwrap_or_default();

    match status_to_error(status, &body) {
        BackendError::RateLimited { retry_after_ms } => BackendError::RateLimited {
            retry_after_ms: header_hint.or(retry_after_ms),
        },
        other => other,
    }
}

/// Map a non-success HTTP status and its body to a backend error.
pub fn status_to_error(status: u16, body: &str) -> BackendError {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let error = parsed.as_ref().and_then(|v| v.get("error"));
    let message = error
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .unwrap_or(body)
        .to_string();

    match status {
        401 | 403 => BackendError::Authentication(message),
        429 => BackendError::RateLimited {
            retry_after_ms: error
                .and_then(|e| e.get("retry_after"))
                .and_then(|r| r.as_f64())
                .map(|secs| (secs * 1000.0) as u64),
        },
        _ => BackendError::api(status, message),
    }
}

/// `Retry-After` in delta-seconds form; HTTP dates are ignored.
fn retry_after_header(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<f64>()
        .ok()
        .map(|secs| (secs * 1000.0) as u64)
}
