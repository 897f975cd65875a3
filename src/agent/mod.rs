//! Conversation participants.

#[allow(clippy::module_inception)]
pub mod agent;

pub use agent::Agent;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BackendError;
use crate::types::Message;

/// Stable, process-unique agent identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(Uuid);

impl AgentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Capability every participant in a room provides.
///
/// The scheduler only ever holds agents behind [`SharedAgent`], so
/// [`set_system_instruction`](Self::set_system_instruction) is reachable
/// only while the caller still owns the agent exclusively, i.e. before it
/// is registered with a room.
#[async_trait]
pub trait ConversationAgent: Send + Sync {
    /// Identity used for routing; never changes.
    fn id(&self) -> AgentId;

    /// Presentation name; not used for routing.
    fn name(&self) -> &str;

    fn system_instruction(&self) -> &str;

    /// Replace the instruction used on every later completion call.
    fn set_system_instruction(&mut self, instruction: String);

    /// Produce exactly one new message given the shared history.
    async fn produce_next(&self, history: &[Message]) -> Result<Message, BackendError>;
}

/// Shared handle to an agent, as stored by graphs and rooms.
pub type SharedAgent = Arc<dyn ConversationAgent>;
