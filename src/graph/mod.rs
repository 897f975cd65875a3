//! Conversation graph: who may address whom.
//!
//! The graph only records reachability. Turn order is decided by the room
//! on top of it, so a different ordering policy never has to touch this
//! module.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

use crate::agent::{AgentId, SharedAgent};

/// Whether an edge implies its reciprocal.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GraphMode {
    Directed,
    #[default]
    Undirected,
}

/// An agent as a traversal unit.
#[derive(Clone)]
pub struct Node {
    pub id: AgentId,
    pub agent: SharedAgent,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.agent.name())
            .finish()
    }
}

/// "`from` may address `to`".
#[derive(Clone)]
pub struct Edge {
    pub from: AgentId,
    pub from_agent: SharedAgent,
    pub to: AgentId,
    pub to_agent: SharedAgent,
}

impl Edge {
    fn reversed(&self) -> Self {
        Self {
            from: self.to,
            from_agent: self.to_agent.clone(),
            to: self.from,
            to_agent: self.from_agent.clone(),
        }
    }
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from_agent.name(), self.to_agent.name())
    }
}

/// Node and edge sets over agent identities.
///
/// Nodes are unique by id and kept in first-insertion order. Exact
/// duplicate edges are stored once.
#[derive(Debug, Clone, Default)]
pub struct ConversationGraph {
    mode: GraphMode,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index: HashMap<AgentId, usize>,
}

impl ConversationGraph {
    pub fn new(mode: GraphMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> GraphMode {
        self.mode
    }

    /// Insert a node; a no-op if the id is already present.
    pub fn add_node(&mut self, agent: &SharedAgent) {
        let id = agent.id();
        if self.index.contains_key(&id) {
            return;
        }
        self.index.insert(id, self.nodes.len());
        self.nodes.push(Node {
            id,
            agent: agent.clone(),
        });
    }

    /// Insert `from -> to` and both endpoints. Undirected graphs also get
    /// `to -> from`.
    pub fn add_edge(&mut self, from: &SharedAgent, to: &SharedAgent) {
        self.add_node(from);
        self.add_node(to);

        let edge = Edge {
            from: from.id(),
            from_agent: from.clone(),
            to: to.id(),
            to_agent: to.clone(),
        };
        let reciprocal = (self.mode == GraphMode::Undirected).then(|| edge.reversed());

        self.push_edge(edge);
        if let Some(reciprocal) = reciprocal {
            self.push_edge(reciprocal);
        }
    }

    fn push_edge(&mut self, edge: Edge) {
        if self.has_edge(edge.from, edge.to) {
            return;
        }
        self.edges.push(edge);
    }

    pub fn has_edge(&self, from: AgentId, to: AgentId) -> bool {
        self.edges.iter().any(|e| e.from == from && e.to == to)
    }

    /// Nodes reachable by one edge from `id`, in edge-insertion order.
    ///
    /// Unknown or isolated ids yield an empty list.
    pub fn neighbors(&self, id: AgentId) -> Vec<&Node> {
        self.edges
            .iter()
            .filter(|e| e.from == id)
            .filter_map(|e| self.node(e.to))
            .collect()
    }

    /// All nodes, each once, in first-insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: AgentId) -> Option<&Node> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Dump nodes and edges at debug level.
    pub fn log_structure(&self) {
        debug!(mode = %self.mode, nodes = self.nodes.len(), edges = self.edges.len(), "conversation graph");
        for node in &self.nodes {
            debug!(id = %node.id, name = node.agent.name(), "node");
        }
        for edge in &self.edges {
            debug!(from = edge.from_agent.name(), to = edge.to_agent.name(), "edge");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use crate::provider::MockBackend;
    use std::sync::Arc;

    fn agent(name: &str) -> SharedAgent {
        Agent::new(name, Arc::new(MockBackend::echo())).into_shared()
    }

    fn names(nodes: &[&Node]) -> Vec<String> {
        nodes.iter().map(|n| n.agent.name().to_string()).collect()
    }

    #[test]
    fn add_node_is_idempotent() {
        let a = agent("a");
        let mut graph = ConversationGraph::new(GraphMode::Directed);
        graph.add_node(&a);
        graph.add_node(&a);
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn edges_dedupe_their_endpoints() {
        let (a, b, c) = (agent("a"), agent("b"), agent("c"));
        let mut graph = ConversationGraph::new(GraphMode::Undirected);
        graph.add_edge(&a, &b);
        graph.add_edge(&b, &c);
        graph.add_edge(&c, &b);
        graph.add_edge(&a, &c);

        let ids: Vec<AgentId> = graph.nodes().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![a.id(), b.id(), c.id()]);
    }

    #[test]
    fn undirected_edges_are_reciprocal() {
        let (a, b) = (agent("a"), agent("b"));
        let mut graph = ConversationGraph::new(GraphMode::Undirected);
        graph.add_edge(&a, &b);

        assert_eq!(names(&graph.neighbors(a.id())), vec!["b"]);
        assert_eq!(names(&graph.neighbors(b.id())), vec!["a"]);
        assert_eq!(graph.edges().len(), 2);
    }

    #[test]
    fn directed_edges_are_one_way() {
        let (a, b) = (agent("a"), agent("b"));
        let mut graph = ConversationGraph::new(GraphMode::Directed);
        graph.add_edge(&a, &b);

        assert_eq!(names(&graph.neighbors(a.id())), vec!["b"]);
        assert!(graph.neighbors(b.id()).is_empty());
    }

    #[test]
    fn neighbors_follow_edge_insertion_order() {
        let (hub, x, y, z) = (agent("hub"), agent("x"), agent("y"), agent("z"));
        let mut graph = ConversationGraph::new(GraphMode::Directed);
        graph.add_edge(&hub, &z);
        graph.add_edge(&hub, &x);
        graph.add_edge(&hub, &y);
        graph.add_edge(&hub, &x);

        assert_eq!(names(&graph.neighbors(hub.id())), vec!["z", "x", "y"]);
    }

    #[test]
    fn unknown_ids_have_no_neighbors() {
        let graph = ConversationGraph::new(GraphMode::Undirected);
        assert!(graph.neighbors(AgentId::new()).is_empty());
        assert!(graph.is_empty());
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("Directed".parse::<GraphMode>().unwrap(), GraphMode::Directed);
        assert_eq!(GraphMode::Undirected.to_string(), "undirected");
    }
}
