//! Scheduler settings.

use std::time::Duration;

use bon::Builder;

use crate::error::Result;
use crate::graph::GraphMode;

use super::env_parse;

/// Pause between rounds when nothing else is configured.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(1);

/// Seed used when none is configured.
pub const DEFAULT_SEED: &str = "Hello everyone! Please introduce yourselves, say what you do and what you need. \
Prefix every message with <Role>: <Message>.";

/// Settings consumed when a room is constructed.
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct RoomSettings {
    #[builder(default)]
    pub graph_mode: GraphMode,
    /// Pause after each round, bounding the backend call rate.
    #[builder(default = DEFAULT_COOLDOWN)]
    pub cooldown: Duration,
    /// Content of the single message every history starts with.
    #[builder(into, default = DEFAULT_SEED.to_string())]
    pub seed_message: String,
    /// Buffered messages between the driver and the consumer.
    #[builder(default = 1)]
    pub stream_capacity: usize,
    /// Stop after this many rounds; `None` runs until cancelled.
    pub max_rounds: Option<u64>,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RoomSettings {
    /// Defaults overridden by `ROUNDTABLE_GRAPH_MODE`, `ROUNDTABLE_COOLDOWN_MS`,
    /// `ROUNDTABLE_SEED`, and `ROUNDTABLE_MAX_ROUNDS`.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let mut settings = Self::default();

        if let Some(mode) = env_parse("ROUNDTABLE_GRAPH_MODE")? {
            settings.graph_mode = mode;
        }
        if let Some(ms) = env_parse::<u64>("ROUNDTABLE_COOLDOWN_MS")? {
            settings.cooldown = Duration::from_millis(ms);
        }
        if let Ok(seed) = std::env::var("ROUNDTABLE_SEED") {
            settings.seed_message = seed;
        }
        settings.max_rounds = env_parse("ROUNDTABLE_MAX_ROUNDS")?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = RoomSettings::default();
        assert_eq!(settings.graph_mode, GraphMode::Undirected);
        assert_eq!(settings.cooldown, Duration::from_secs(1));
        assert_eq!(settings.seed_message, DEFAULT_SEED);
        assert_eq!(settings.stream_capacity, 1);
        assert_eq!(settings.max_rounds, None);
    }

    #[test]
    fn builder_overrides_individual_fields() {
        let settings = RoomSettings::builder()
            .graph_mode(GraphMode::Directed)
            .seed_message("introduce yourselves")
            .max_rounds(2)
            .build();
        assert_eq!(settings.graph_mode, GraphMode::Directed);
        assert_eq!(settings.seed_message, "introduce yourselves");
        assert_eq!(settings.max_rounds, Some(2));
        assert_eq!(settings.cooldown, DEFAULT_COOLDOWN);
    }
}
