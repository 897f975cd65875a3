//! Per-agent sampling settings and completion outcomes.

use bon::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Sampling knobs sent with every completion call an agent makes.
///
/// Unset fields are left out of the request so the backend's own defaults
/// apply. Field names match the chat-completions wire format, which lets
/// backends flatten this struct straight into a request body.
#[derive(Debug, Clone, Default, PartialEq, Builder, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Reply length cap. Short caps keep each turn to a sentence or two.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Why the backend stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FinishReason {
    Stop,
    /// Cut off by `max_tokens`.
    Length,
    ContentFilter,
}

impl FinishReason {
    /// Unknown wire values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    /// Whether the reply was cut short rather than finished.
    pub fn is_truncated(self) -> bool {
        matches!(self, Self::Length | Self::ContentFilter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_fields_are_not_serialized() {
        let settings = GenerationSettings::builder().max_tokens(30).build();
        let value = serde_json::to_value(&settings).unwrap();
        assert_eq!(value, serde_json::json!({"max_tokens": 30}));
    }

    #[test]
    fn finish_reason_parses_wire_values() {
        assert_eq!(FinishReason::parse("length"), Some(FinishReason::Length));
        assert_eq!(FinishReason::parse("tool_calls"), None);
        assert!(FinishReason::Length.is_truncated());
        assert!(!FinishReason::Stop.is_truncated());
    }
}
