//! The background task that runs rounds.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::agent::AgentId;
use crate::config::RoomSettings;
use crate::error::AgentTurnError;
use crate::graph::ConversationGraph;
use crate::types::Message;

use super::events::{EventEmitter, RoomEventPayload, StopReason};
use super::registry::AgentRegistry;
use super::RunSummary;

/// Sole owner and writer of a run's history.
///
/// Turns are strictly sequential: a turn's append and publish finish
/// before the next agent is invoked, so history needs no lock.
pub(crate) struct Driver {
    pub(crate) graph: ConversationGraph,
    pub(crate) registry: AgentRegistry,
    pub(crate) settings: RoomSettings,
    pub(crate) history: Vec<Message>,
    pub(crate) tx: mpsc::Sender<Message>,
    pub(crate) cancel: CancellationToken,
    pub(crate) emitter: EventEmitter,
    pub(crate) turn: u64,
    pub(crate) rounds_completed: u64,
    pub(crate) messages_published: usize,
    pub(crate) failed_turns: usize,
}

impl Driver {
    pub(crate) async fn run(mut self) -> RunSummary {
        info!(
            agents = self.graph.len(),
            mode = %self.graph.mode(),
            cooldown_ms = self.settings.cooldown.as_millis() as u64,
            "room run started"
        );

        let reason = self.run_rounds().await;

        info!(
            reason = %reason,
            rounds = self.rounds_completed,
            messages = self.messages_published,
            failed_turns = self.failed_turns,
            "room run stopped"
        );
        self.emitter.emit(RoomEventPayload::Stopped { reason });

        RunSummary {
            rounds_completed: self.rounds_completed,
            messages_published: self.messages_published,
            failed_turns: self.failed_turns,
            history: self.history,
            stop_reason: reason,
        }
    }

    async fn run_rounds(&mut self) -> StopReason {
        let mut round = 0u64;
        loop {
            if self.round_limit_reached() {
                return StopReason::MaxRounds;
            }
            round += 1;

            if let Err(reason) = self.run_round(round).await {
                return reason;
            }
            self.rounds_completed += 1;

            if self.round_limit_reached() {
                return StopReason::MaxRounds;
            }

            self.emitter.emit(RoomEventPayload::CoolingDown { round });
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return StopReason::Cancelled,
                _ = self.tx.closed() => return StopReason::ConsumerClosed,
                _ = tokio::time::sleep(self.settings.cooldown) => {}
            }
        }
    }

    fn round_limit_reached(&self) -> bool {
        self.settings
            .max_rounds
            .is_some_and(|max| self.rounds_completed >= max)
    }

    /// One breadth-first pass. Every node is seeded in `nodes()` order;
    /// after each turn the agent's neighbours are queued unless already
    /// attempted, and the attempted set keeps each agent to one try.
    async fn run_round(&mut self, round: u64) -> Result<(), StopReason> {
        debug!(round, history_len = self.history.len(), "round started");
        self.emitter.emit(RoomEventPayload::RoundStarted { round });

        let mut queue: VecDeque<AgentId> = self.graph.nodes().iter().map(|n| n.id).collect();
        let mut attempted: HashSet<AgentId> = HashSet::new();
        let mut spoken: Vec<AgentId> = Vec::new();

        while let Some(id) = queue.pop_front() {
            if attempted.contains(&id) {
                continue;
            }
            self.check_stop()?;
            attempted.insert(id);

            if self.take_turn(round, id).await? {
                spoken.push(id);
            }

            for neighbor in self.graph.neighbors(id) {
                if !attempted.contains(&neighbor.id) {
                    queue.push_back(neighbor.id);
                }
            }
        }

        debug!(round, spoken = spoken.len(), "round finished");
        self.emitter
            .emit(RoomEventPayload::RoundFinished { round, spoken });
        Ok(())
    }

    /// Returns whether the agent produced a message.
    async fn take_turn(&mut self, round: u64, id: AgentId) -> Result<bool, StopReason> {
        let Some(agent) = self.registry.get(id) else {
            warn!(agent_id = %id, "graph node has no registered agent");
            return Ok(false);
        };
        self.turn += 1;

        let outcome = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(StopReason::Cancelled),
            _ = self.tx.closed() => return Err(StopReason::ConsumerClosed),
            outcome = agent.produce_next(&self.history) => outcome,
        };

        let message = match outcome {
            Ok(message) => message,
            Err(source) => {
                let error = AgentTurnError {
                    agent_id: id,
                    agent_name: agent.name().to_string(),
                    round,
                    source,
                };
                warn!(
                    round,
                    agent_id = %id,
                    agent = agent.name(),
                    category = %error.source.category(),
                    error = %error.source,
                    "turn failed, skipping agent for this round"
                );
                self.failed_turns += 1;
                self.emitter.emit(RoomEventPayload::TurnFailed {
                    error: Arc::new(error),
                });
                return Ok(false);
            }
        };

        self.history.push(message.clone());

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(StopReason::Cancelled),
            sent = self.tx.send(message) => {
                if sent.is_err() {
                    return Err(StopReason::ConsumerClosed);
                }
            }
        }
        self.messages_published += 1;

        debug!(
            round,
            turn = self.turn,
            agent = agent.name(),
            history_len = self.history.len(),
            "turn completed"
        );
        self.emitter.emit(RoomEventPayload::TurnCompleted {
            round,
            turn: self.turn,
            agent_id: id,
            history_len: self.history.len(),
        });
        Ok(true)
    }

    fn check_stop(&self) -> Result<(), StopReason> {
        if self.cancel.is_cancelled() {
            return Err(StopReason::Cancelled);
        }
        if self.tx.is_closed() {
            return Err(StopReason::ConsumerClosed);
        }
        Ok(())
    }
}
