//! Side channel describing what the driver is doing.
//!
//! Messages themselves only travel on the output stream; this channel
//! carries round boundaries and failed turns.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

use crate::agent::AgentId;
use crate::error::AgentTurnError;

/// Identifier of one run of a room.
pub type RunId = Uuid;

/// Callback receiving every room event, on the driver task.
pub type RoomEventSink = Arc<dyn Fn(RoomEvent) + Send + Sync>;

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StopReason {
    /// The cancellation token fired.
    Cancelled,
    /// The consumer dropped its end of the stream.
    ConsumerClosed,
    /// The configured round limit was reached.
    MaxRounds,
}

/// Event payloads emitted by the driver.
#[derive(Debug, Clone)]
pub enum RoomEventPayload {
    RoundStarted {
        round: u64,
    },
    TurnCompleted {
        round: u64,
        turn: u64,
        agent_id: AgentId,
        history_len: usize,
    },
    TurnFailed {
        error: Arc<AgentTurnError>,
    },
    RoundFinished {
        round: u64,
        spoken: Vec<AgentId>,
    },
    CoolingDown {
        round: u64,
    },
    Stopped {
        reason: StopReason,
    },
}

/// Envelope for room events.
#[derive(Clone)]
pub struct RoomEvent {
    pub run_id: RunId,
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub payload: RoomEventPayload,
}

impl fmt::Debug for RoomEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoomEvent")
            .field("seq", &self.seq)
            .field("payload", &self.payload)
            .finish()
    }
}

pub(crate) struct EventEmitter {
    run_id: RunId,
    seq: AtomicU64,
    sink: Option<RoomEventSink>,
}

impl EventEmitter {
    pub(crate) fn new(run_id: RunId, sink: Option<RoomEventSink>) -> Self {
        Self {
            run_id,
            seq: AtomicU64::new(1),
            sink,
        }
    }

    pub(crate) fn emit(&self, payload: RoomEventPayload) {
        let Some(sink) = &self.sink else {
            return;
        };
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        (sink)(RoomEvent {
            run_id: self.run_id,
            seq,
            timestamp: Utc::now(),
            payload,
        });
    }
}
