//! Roundtable CLI binary entry point.

use clap::Parser;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use roundtable::cli::transcript::TranscriptWriter;
use roundtable::cli::{Cli, Commands, RunArgs, ScenarioArgs};
use roundtable::config::{RoomSettings, RoundtableConfig};
use roundtable::error::RoundtableError;
use roundtable::provider::{self, BackendKind, MockBackend};
use roundtable::scenario::Scenario;

#[tokio::main]
async fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("roundtable=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => handle_run(args).await,
        Commands::Graph(args) => handle_graph(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn load_scenario(args: &ScenarioArgs) -> Result<Scenario, RoundtableError> {
    match &args.scenario {
        Some(path) => Scenario::from_file(path),
        None => Ok(Scenario::demo()),
    }
}

async fn handle_run(args: RunArgs) -> Result<(), RoundtableError> {
    let mut scenario = load_scenario(&args.scenario)?;
    if args.max_rounds.is_some() {
        scenario.max_rounds = args.max_rounds;
    }
    if args.cooldown_ms.is_some() {
        scenario.cooldown_ms = args.cooldown_ms;
    }

    let kind = if args.mock {
        BackendKind::Mock
    } else if let Some(name) = &args.backend {
        name.parse().map_err(|_| {
            RoundtableError::Configuration(format!(
                "Unknown backend '{name}'. Use openai, openai-compatible, or mock"
            ))
        })?
    } else {
        scenario.backend.unwrap_or(BackendKind::OpenAi)
    };

    let config = RoundtableConfig::from_env()?;
    let backend = provider::create_backend(kind, &config)?;
    let built = scenario.build_room(
        RoomSettings::from_env()?,
        backend,
        config.generation_settings(),
    )?;

    let mut transcript = match &args.trace {
        Some(path) => Some(TranscriptWriter::create(path).await?),
        None => None,
    };

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping after the current turn");
            on_ctrl_c.cancel();
        }
    });

    let mut run = built.room.run(cancel)?;
    while let Some(message) = run.next().await {
        println!("{}: {}", message.author, message.content);
        if let Some(writer) = transcript.as_mut() {
            writer.append(&message).await?;
        }
    }

    let summary = run.finish().await?;
    tracing::info!(
        reason = %summary.stop_reason,
        rounds = summary.rounds_completed,
        messages = summary.messages_published,
        failed_turns = summary.failed_turns,
        "conversation ended"
    );

    Ok(())
}

fn handle_graph(args: ScenarioArgs) -> Result<(), RoundtableError> {
    let scenario = load_scenario(&args)?;
    let built = scenario.build_room(
        RoomSettings::default(),
        std::sync::Arc::new(MockBackend::echo()),
        Default::default(),
    )?;
    let graph = built.room.graph();

    println!("mode: {}", graph.mode());
    for node in graph.nodes() {
        println!("node {} ({})", node.agent.name(), node.id);
    }
    for edge in graph.edges() {
        println!("edge {} -> {}", edge.from_agent.name(), edge.to_agent.name());
    }

    Ok(())
}
