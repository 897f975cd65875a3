//! Declarative room descriptions loaded from TOML.
//!
//! ```toml
//! seed = "Introduce yourselves."
//! mode = "undirected"
//! cooldown_ms = 1000
//! connections = [["customer", "pm"]]
//!
//! [[agents]]
//! key = "customer"
//! instruction = "You are a customer who wants a snake game."
//!
//! [[agents]]
//! key = "pm"
//! name = "product manager"
//! instruction = "You are a product manager scoping the project."
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::agent::{Agent, SharedAgent};
use crate::config::RoomSettings;
use crate::error::{Result, RoundtableError};
use crate::graph::GraphMode;
use crate::provider::{BackendKind, CompletionBackend};
use crate::room::Room;
use crate::types::GenerationSettings;

/// One participant in a scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentSpec {
    /// Name used by `connections`.
    pub key: String,
    /// Display name; defaults to `key`.
    #[serde(default)]
    pub name: Option<String>,
    pub instruction: String,
}

impl AgentSpec {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }
}

/// Agents, connections, and room settings for one conversation.
///
/// Unset fields fall back to the [`RoomSettings`] passed to
/// [`Scenario::build_room`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    #[serde(default)]
    pub seed: Option<String>,
    #[serde(default)]
    pub mode: Option<GraphMode>,
    #[serde(default)]
    pub cooldown_ms: Option<u64>,
    #[serde(default)]
    pub max_rounds: Option<u64>,
    #[serde(default)]
    pub backend: Option<BackendKind>,
    #[serde(default)]
    pub connections: Vec<(String, String)>,
    #[serde(default)]
    pub agents: Vec<AgentSpec>,
}

/// A built room plus the agents it was built from, in scenario order.
pub struct BuiltScenario {
    pub room: Room,
    pub agents: Vec<SharedAgent>,
}

impl Scenario {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let scenario: Self = toml::from_str(source)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Three-party product conversation: a customer who wants a snake game,
    /// a product manager scoping it, and a developer building it.
    pub fn demo() -> Self {
        let agent = |key: &str, name: &str, instruction: &str| AgentSpec {
            key: key.to_string(),
            name: Some(name.to_string()),
            instruction: instruction.to_string(),
        };
        Self {
            seed: None,
            mode: Some(GraphMode::Undirected),
            cooldown_ms: Some(1000),
            max_rounds: None,
            backend: None,
            connections: vec![
                ("customer".into(), "pm".into()),
                ("pm".into(), "developer".into()),
                ("developer".into(), "pm".into()),
            ],
            agents: vec![
                agent(
                    "developer",
                    "developer",
                    "Hi, I am a developer and I will implement the project.",
                ),
                agent(
                    "pm",
                    "product manager",
                    "Hi, I am a product manager and I will define the project scope.",
                ),
                agent(
                    "customer",
                    "customer",
                    "Hi, I am a customer and I want a snake game written in Rust.",
                ),
            ],
        }
    }

    /// Reject scenarios that could never start a run.
    pub fn validate(&self) -> Result<()> {
        if self.agents.is_empty() {
            return Err(RoundtableError::Scenario("scenario has no agents".into()));
        }
        let mut seen = HashSet::new();
        for spec in &self.agents {
            if spec.key.trim().is_empty() {
                return Err(RoundtableError::Scenario("agent key is empty".into()));
            }
            if !seen.insert(spec.key.as_str()) {
                return Err(RoundtableError::Scenario(format!(
                    "duplicate agent key '{}'",
                    spec.key
                )));
            }
        }
        for (from, to) in &self.connections {
            for key in [from, to] {
                if !seen.contains(key.as_str()) {
                    return Err(RoundtableError::Scenario(format!(
                        "connection references unknown agent '{key}'"
                    )));
                }
            }
        }
        Ok(())
    }

    /// `base` with every field this scenario sets applied on top.
    pub fn room_settings(&self, base: RoomSettings) -> RoomSettings {
        RoomSettings {
            graph_mode: self.mode.unwrap_or(base.graph_mode),
            cooldown: self
                .cooldown_ms
                .map(Duration::from_millis)
                .unwrap_or(base.cooldown),
            seed_message: self.seed.clone().unwrap_or(base.seed_message),
            max_rounds: self.max_rounds.or(base.max_rounds),
            ..base
        }
    }

    /// Create one agent per entry on `backend` and wire the room.
    ///
    /// Connections are added in file order; agents that appear in no
    /// connection join afterwards as isolated participants.
    pub fn build_room(
        &self,
        base: RoomSettings,
        backend: Arc<dyn CompletionBackend>,
        generation: GenerationSettings,
    ) -> Result<BuiltScenario> {
        self.validate()?;

        let agents: Vec<SharedAgent> = self
            .agents
            .iter()
            .map(|spec| {
                Agent::new(spec.display_name(), backend.clone())
                    .with_system_instruction(spec.instruction.clone())
                    .with_settings(generation.clone())
                    .into_shared()
            })
            .collect();
        let by_key: HashMap<&str, &SharedAgent> = self
            .agents
            .iter()
            .map(|spec| spec.key.as_str())
            .zip(agents.iter())
            .collect();

        let mut room = Room::new(self.room_settings(base));
        for (from, to) in &self.connections {
            let (Some(from), Some(to)) = (by_key.get(from.as_str()), by_key.get(to.as_str()))
            else {
                return Err(RoundtableError::Scenario(format!(
                    "connection {from} -> {to} references an unknown agent"
                )));
            };
            room.add_connection(from, to);
        }
        for agent in &agents {
            room.add_agent(agent);
        }

        Ok(BuiltScenario { room, agents })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_scenario_is_valid() {
        let demo = Scenario::demo();
        demo.validate().unwrap();
        assert_eq!(demo.agents.len(), 3);
    }

    #[test]
    fn unknown_connection_key_is_rejected() {
        let source = r#"
connections = [["a", "ghost"]]

[[agents]]
key = "a"
instruction = "hi"
"#;
        let err = Scenario::from_toml_str(source).unwrap_err();
        assert!(matches!(err, RoundtableError::Scenario(msg) if msg.contains("ghost")));
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let source = r#"
[[agents]]
key = "a"
instruction = "one"

[[agents]]
key = "a"
instruction = "two"
"#;
        assert!(matches!(
            Scenario::from_toml_str(source),
            Err(RoundtableError::Scenario(_))
        ));
    }

    #[test]
    fn scenario_fields_override_base_settings() {
        let scenario = Scenario {
            mode: Some(GraphMode::Directed),
            cooldown_ms: Some(250),
            ..Scenario::demo()
        };
        let settings = scenario.room_settings(RoomSettings::builder().max_rounds(7).build());

        assert_eq!(settings.graph_mode, GraphMode::Directed);
        assert_eq!(settings.cooldown, Duration::from_millis(250));
        assert_eq!(settings.max_rounds, Some(7));
    }
}
