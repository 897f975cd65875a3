//! Scenario files and the bundled demo.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

use roundtable::config::RoomSettings;
use roundtable::graph::GraphMode;
use roundtable::provider::{BackendKind, MockBackend};
use roundtable::scenario::Scenario;
use roundtable::types::Message;

const SCENARIO: &str = r#"
seed = "Kick-off: introduce yourselves."
mode = "directed"
cooldown_ms = 10
max_rounds = 2
backend = "mock"
connections = [["lead", "dev"]]

[[agents]]
key = "lead"
name = "tech lead"
instruction = "You lead the team."

[[agents]]
key = "dev"
instruction = "You write the code."

[[agents]]
key = "qa"
instruction = "You test the code."
"#;

#[test]
fn scenario_loads_from_a_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SCENARIO.as_bytes()).unwrap();

    let scenario = Scenario::from_file(file.path()).unwrap();

    assert_eq!(scenario.mode, Some(GraphMode::Directed));
    assert_eq!(scenario.backend, Some(BackendKind::Mock));
    assert_eq!(scenario.agents[0].display_name(), "tech lead");
    assert_eq!(scenario.agents[1].display_name(), "dev");
    assert_eq!(
        scenario.connections,
        vec![("lead".to_string(), "dev".to_string())]
    );
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Scenario::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, roundtable::error::RoundtableError::Io(_)));
}

#[test]
fn malformed_toml_is_rejected() {
    let err = Scenario::from_toml_str("agents = 3").unwrap_err();
    assert!(matches!(err, roundtable::error::RoundtableError::Toml(_)));
}

#[test]
fn demo_wires_customer_manager_and_developer() {
    let built = Scenario::demo()
        .build_room(
            RoomSettings::default(),
            Arc::new(MockBackend::echo()),
            Default::default(),
        )
        .unwrap();
    let graph = built.room.graph();

    let names: Vec<&str> = graph.nodes().iter().map(|n| n.agent.name()).collect();
    assert_eq!(names, vec!["customer", "product manager", "developer"]);
    assert_eq!(graph.edges().len(), 4);
    assert_eq!(graph.mode(), GraphMode::Undirected);
    assert_eq!(built.room.settings().cooldown, Duration::from_millis(1000));
}

#[tokio::test(start_paused = true)]
async fn scenario_room_runs_every_agent_each_round() {
    let scenario = Scenario::from_toml_str(SCENARIO).unwrap();
    let backend = Arc::new(MockBackend::echo());
    let built = scenario
        .build_room(RoomSettings::default(), backend.clone(), Default::default())
        .unwrap();

    let mut run = built.room.run(CancellationToken::new()).unwrap();
    let messages: Vec<Message> = (&mut run).collect().await;
    let summary = run.finish().await.unwrap();

    let authors: Vec<&str> = messages.iter().map(|m| m.author.as_str()).collect();
    assert_eq!(
        authors,
        vec!["tech lead", "dev", "qa", "tech lead", "dev", "qa"]
    );
    assert_eq!(summary.history[0].content, "Kick-off: introduce yourselves.");
    assert_eq!(summary.rounds_completed, 2);

    let requests = backend.requests();
    assert_eq!(requests.len(), 6);
    assert_eq!(requests[0].system, "You lead the team.");
    assert_eq!(requests[2].system, "You test the code.");
    assert_eq!(requests[5].messages.len(), 6);
}
