//! Convenience re-exports for common use.

pub use crate::agent::{Agent, AgentId, ConversationAgent, SharedAgent};
pub use crate::config::{RoomSettings, RoundtableConfig};
pub use crate::error::{AgentTurnError, BackendError, Result, RoundtableError};
pub use crate::graph::{ConversationGraph, GraphMode};
pub use crate::provider::{BackendKind, CompletionBackend, MockBackend};
pub use crate::room::{Room, RoomEvent, RoomEventPayload, RoomRun, RunSummary, StopReason};
pub use crate::scenario::Scenario;
pub use crate::types::{GenerationSettings, Message, Role};
