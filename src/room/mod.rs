//! Rooms: turn scheduling over a conversation graph.
//!
//! A [`Room`] collects agents and connections, then [`Room::run`] moves
//! them into a single background driver task and hands back a
//! [`RoomRun`], an ordered stream of every message the agents produce.
//!
//! ```no_run
//! use std::sync::Arc;
//! use futures::StreamExt;
//! use roundtable::prelude::*;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> roundtable::error::Result<()> {
//! let backend = Arc::new(MockBackend::echo());
//! let customer = Agent::new("customer", backend.clone()).into_shared();
//! let manager = Agent::new("product manager", backend).into_shared();
//!
//! let mut room = Room::new(RoomSettings::default());
//! room.add_connection(&customer, &manager);
//!
//! let mut run = room.run(CancellationToken::new())?;
//! while let Some(message) = run.next().await {
//!     println!("{}: {}", message.author, message.content);
//! }
//! # Ok(())
//! # }
//! ```

mod driver;
pub mod events;
pub mod registry;

pub use events::{RoomEvent, RoomEventPayload, RoomEventSink, RunId, StopReason};
pub use registry::AgentRegistry;

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::agent::SharedAgent;
use crate::config::RoomSettings;
use crate::error::{Result, RoundtableError};
use crate::graph::ConversationGraph;
use crate::types::Message;

use driver::Driver;
use events::EventEmitter;

/// Scheduler owning a conversation graph and the agents in it.
pub struct Room {
    settings: RoomSettings,
    graph: ConversationGraph,
    registry: AgentRegistry,
    event_sink: Option<RoomEventSink>,
}

impl Room {
    pub fn new(settings: RoomSettings) -> Self {
        Self {
            graph: ConversationGraph::new(settings.graph_mode),
            settings,
            registry: AgentRegistry::default(),
            event_sink: None,
        }
    }

    /// Receive round and failure events while the room runs.
    pub fn with_event_sink(mut self, sink: RoomEventSink) -> Self {
        self.event_sink = Some(sink);
        self
    }

    /// Register an agent with no connections.
    pub fn add_agent(&mut self, agent: &SharedAgent) {
        self.registry.register(agent);
        self.graph.add_node(agent);
    }

    /// Declare that `from` may address `to` (both ways in undirected rooms).
    pub fn add_connection(&mut self, from: &SharedAgent, to: &SharedAgent) {
        self.registry.register(from);
        self.registry.register(to);
        self.graph.add_edge(from, to);
    }

    pub fn graph(&self) -> &ConversationGraph {
        &self.graph
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &RoomSettings {
        &self.settings
    }

    /// Start the conversation on a background task.
    ///
    /// Fails synchronously, before any stream exists, when the room has no
    /// agents or the settings cannot drive a run. Must be called inside a
    /// Tokio runtime.
    pub fn run(self, cancel: CancellationToken) -> Result<RoomRun> {
        if self.graph.is_empty() || self.registry.is_empty() {
            return Err(RoundtableError::Configuration(
                "room has no agents; add a connection before running".into(),
            ));
        }
        if let Some(node) = self
            .graph
            .nodes()
            .iter()
            .find(|n| !self.registry.contains(n.id))
        {
            return Err(RoundtableError::Configuration(format!(
                "agent {} is in the graph but not registered",
                node.id
            )));
        }
        if self.settings.stream_capacity == 0 {
            return Err(RoundtableError::Configuration(
                "stream_capacity must be at least 1".into(),
            ));
        }

        self.graph.log_structure();

        let run_id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(self.settings.stream_capacity);
        let history = vec![Message::seed(self.settings.seed_message.clone())];

        let driver = Driver {
            graph: self.graph,
            registry: self.registry,
            settings: self.settings,
            history,
            tx,
            cancel: cancel.clone(),
            emitter: EventEmitter::new(run_id, self.event_sink),
            turn: 0,
            rounds_completed: 0,
            messages_published: 0,
            failed_turns: 0,
        };

        Ok(RoomRun {
            run_id,
            messages: ReceiverStream::new(rx),
            cancel,
            driver: tokio::spawn(driver.run()),
        })
    }
}

/// A live run: a stream of produced messages plus control over the driver.
///
/// The stream ends when the run ends. Dropping it stops the driver at its
/// next checkpoint.
pub struct RoomRun {
    run_id: RunId,
    messages: ReceiverStream<Message>,
    cancel: CancellationToken,
    driver: JoinHandle<RunSummary>,
}

impl RoomRun {
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Request the run to stop. No message is yielded after this call.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Next message, or `None` once the run has ended.
    pub async fn next_message(&mut self) -> Option<Message> {
        self.next().await
    }

    /// Stop consuming and wait for the driver to wind down.
    pub async fn finish(self) -> Result<RunSummary> {
        drop(self.messages);
        self.driver
            .await
            .map_err(|e| RoundtableError::Driver(e.to_string()))
    }
}

impl Stream for RoomRun {
    type Item = Message;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Message>> {
        let this = self.get_mut();
        if this.cancel.is_cancelled() {
            this.messages.close();
            return Poll::Ready(None);
        }
        Pin::new(&mut this.messages).poll_next(cx)
    }
}

impl std::fmt::Debug for RoomRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomRun")
            .field("run_id", &self.run_id)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

/// What a finished run did.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub rounds_completed: u64,
    pub messages_published: usize,
    pub failed_turns: usize,
    /// Seed followed by every produced message, in production order.
    pub history: Vec<Message>,
    pub stop_reason: StopReason,
}
