//! Shared test helpers: scripted agents that record what they were shown.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use roundtable::agent::{AgentId, ConversationAgent, SharedAgent};
use roundtable::error::BackendError;
use roundtable::room::{RoomEvent, RoomEventSink};
use roundtable::types::Message;

/// One `produce_next` call as seen by an agent.
#[derive(Debug, Clone)]
pub struct Observation {
    pub agent: String,
    pub history: Vec<Message>,
    pub at: Instant,
}

/// State shared by every agent in a test room.
#[derive(Clone, Default)]
pub struct Script {
    turns: Arc<AtomicUsize>,
    observations: Arc<Mutex<Vec<Observation>>>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    /// An agent replying `"<name> ack <turn>"`, where `turn` counts
    /// successful turns across the whole room, starting at 1.
    pub fn agent(&self, name: &str) -> ScriptedAgent {
        ScriptedAgent {
            id: AgentId::new(),
            name: name.to_string(),
            instruction: String::new(),
            script: self.clone(),
            calls: AtomicUsize::new(0),
            failing_calls: HashSet::new(),
            delay: None,
        }
    }

    pub fn shared(&self, name: &str) -> SharedAgent {
        Arc::new(self.agent(name))
    }

    pub fn observations(&self) -> Vec<Observation> {
        self.observations.lock().unwrap().clone()
    }
}

pub struct ScriptedAgent {
    id: AgentId,
    name: String,
    instruction: String,
    script: Script,
    calls: AtomicUsize,
    failing_calls: HashSet<usize>,
    delay: Option<Duration>,
}

impl ScriptedAgent {
    /// Fail this agent's own call number `call` (0-based).
    pub fn failing_on(mut self, call: usize) -> Self {
        self.failing_calls.insert(call);
        self
    }

    /// Take this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn shared(self) -> SharedAgent {
        Arc::new(self)
    }
}

#[async_trait]
impl ConversationAgent for ScriptedAgent {
    fn id(&self) -> AgentId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn system_instruction(&self) -> &str {
        &self.instruction
    }

    fn set_system_instruction(&mut self, instruction: String) {
        self.instruction = instruction;
    }

    async fn produce_next(&self, history: &[Message]) -> Result<Message, BackendError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.script.observations.lock().unwrap().push(Observation {
            agent: self.name.clone(),
            history: history.to_vec(),
            at: Instant::now(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_calls.contains(&call) {
            return Err(BackendError::Other(format!("{} is unavailable", self.name)));
        }

        let turn = self.script.turns.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Message::assistant(
            self.name.clone(),
            format!("{} ack {turn}", self.name),
        ))
    }
}

/// Event sink collecting everything into a vector.
pub fn collecting_sink() -> (RoomEventSink, Arc<Mutex<Vec<RoomEvent>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink_events = events.clone();
    let sink: RoomEventSink = Arc::new(move |event| sink_events.lock().unwrap().push(event));
    (sink, events)
}

pub fn contents(messages: &[Message]) -> Vec<String> {
    messages.iter().map(|m| m.content.clone()).collect()
}

pub fn authors(messages: &[Message]) -> Vec<String> {
    messages.iter().map(|m| m.author.clone()).collect()
}
