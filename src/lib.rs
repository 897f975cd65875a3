//! Roundtable: multi-agent conversation rooms.
//!
//! A fixed set of agents, each backed by a language-model completion call,
//! is wired into a [`graph::ConversationGraph`]. A [`room::Room`] then runs
//! the conversation in rounds, giving every agent at most one turn per
//! round, and streams each produced message to the caller as it appears.
//!
//! # Quick Start
//!
//! ```no_run
//! use futures::StreamExt;
//! use roundtable::prelude::*;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> roundtable::error::Result<()> {
//! let config = RoundtableConfig::from_env()?;
//! let backend = roundtable::provider::create_backend(BackendKind::OpenAi, &config)?;
//!
//! let customer = Agent::new("customer", backend.clone())
//!     .with_system_instruction("You want a snake game.")
//!     .into_shared();
//! let developer = Agent::new("developer", backend)
//!     .with_system_instruction("You build what the customer asks for.")
//!     .into_shared();
//!
//! let mut room = Room::new(RoomSettings::from_env()?);
//! room.add_connection(&customer, &developer);
//!
//! let mut run = room.run(CancellationToken::new())?;
//! while let Some(message) = run.next().await {
//!     println!("{}: {}", message.author, message.content);
//! }
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod graph;
pub mod prelude;
pub mod provider;
pub mod room;
pub mod scenario;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
