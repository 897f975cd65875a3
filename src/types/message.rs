//! Message types shared by agents, the room history, and the output stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Author recorded on the seed message.
pub const SEED_AUTHOR: &str = "system";

/// One entry of the shared conversation history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub author: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Message {
    /// Create a message with an explicit role and author.
    pub fn new(role: Role, author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role,
            author: author.into(),
            content: content.into(),
            timestamp: Some(Utc::now()),
        }
    }

    /// The single message every history starts with.
    ///
    /// Sent with the `user` role because chat backends expect the first
    /// non-instruction turn to come from the user side.
    pub fn seed(content: impl Into<String>) -> Self {
        Self::new(Role::User, SEED_AUTHOR, content)
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, SEED_AUTHOR, content)
    }

    /// Create a user message.
    pub fn user(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(Role::User, author, content)
    }

    /// Create an assistant message.
    pub fn assistant(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, author, content)
    }

    /// Copy without the timestamp, for comparing transcripts.
    pub fn without_timestamp(&self) -> Self {
        Self {
            timestamp: None,
            ..self.clone()
        }
    }
}

/// Conversation role.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}
