//! CLI entry point for Roundtable.

pub mod transcript;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Roundtable CLI
#[derive(Parser, Debug)]
#[command(name = "roundtable", version, about = "Run multi-agent conversation rooms")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a conversation and print messages as they arrive
    Run(RunArgs),
    /// Print the nodes and edges of a scenario
    Graph(ScenarioArgs),
}

/// Scenario selection shared by all commands.
#[derive(Args, Debug, Clone)]
pub struct ScenarioArgs {
    /// Scenario TOML file (defaults to the built-in three-party demo)
    #[arg(short, long)]
    pub scenario: Option<PathBuf>,
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// Backend: openai, openai-compatible, or mock
    #[arg(short, long)]
    pub backend: Option<String>,

    /// Shortcut for `--backend mock`
    #[arg(long, conflicts_with = "backend")]
    pub mock: bool,

    /// Stop after this many rounds
    #[arg(long)]
    pub max_rounds: Option<u64>,

    /// Pause between rounds, in milliseconds
    #[arg(long)]
    pub cooldown_ms: Option<u64>,

    /// Append every message's content to this file
    #[arg(long)]
    pub trace: Option<PathBuf>,
}
