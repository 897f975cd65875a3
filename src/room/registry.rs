//! Id-to-agent lookup owned by a room.

use std::collections::HashMap;

use crate::agent::{AgentId, SharedAgent};

/// Agents known to a room, keyed by id.
///
/// Only the owning [`Room`](super::Room) can register agents.
#[derive(Clone, Default)]
pub struct AgentRegistry {
    agents: HashMap<AgentId, SharedAgent>,
}

impl AgentRegistry {
    /// Register an agent; re-registering the same id keeps the first handle.
    pub(crate) fn register(&mut self, agent: &SharedAgent) {
        self.agents
            .entry(agent.id())
            .or_insert_with(|| agent.clone());
    }

    pub fn get(&self, id: AgentId) -> Option<SharedAgent> {
        self.agents.get(&id).cloned()
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.agents.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.agents.iter().map(|(id, agent)| (id, agent.name())))
            .finish()
    }
}
