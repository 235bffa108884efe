//! Trace graph primitives.
//!
//! Nodes and edges live in flat, integer-indexed vectors; cross
//! references are expressed as indices, never as pointers, so a graph
//! can be built incrementally (by the streaming emitter) or all at once
//! (by the synchronous trace orchestrator) with the same representation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// What a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
 Address,
 Transaction,
}

/// A node in a trace graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
 pub kind: NodeKind,
 /// The address string or txid this node represents.
 pub id: String,
 pub is_starting_point: bool,
 pub is_change: bool,
 /// Free-form annotations (e.g. change reasons, input/output counts,
 /// resolved input/output metadata) kept as JSON so each trace entry
 /// point can attach what it needs without widening this struct.
 pub metadata: serde_json::Value,
}

impl Node {
 pub fn address(id: impl Into<String>) -> Self {
 Node {
 kind: NodeKind::Address,
 id: id.into(),
 is_starting_point: false,
 is_change: false,
 metadata: serde_json::Value::Null,
 }
 }

 pub fn transaction(id: impl Into<String>) -> Self {
 Node {
 kind: NodeKind::Transaction,
 id: id.into(),
 is_starting_point: false,
 is_change: false,
 metadata: serde_json::Value::Null,
 }
 }
}

/// A directed edge between two nodes, referenced by index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
 pub from: usize,
 pub to: usize,
 pub amount: u64,
 pub vout: Option<u32>,
 pub confidence: f64,
 pub heuristic_tag: Option<String>,
}

/// A trace graph: the output of `trace_utxo` / `trace_from_address`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceGraph {
 pub nodes: Vec<Node>,
 pub edges: Vec<Edge>,
 /// Maps a node's `(kind-discriminant, id)` key to its index, so
 /// callers can dedupe insertion without a linear scan.
 #[serde(skip)]
 index: HashMap<(bool, String), usize>,
}

impl TraceGraph {
 pub fn new() -> Self {
 Self::default()
 }

 fn key(kind: NodeKind, id: &str) -> (bool, String) {
 (matches!(kind, NodeKind::Transaction), id.to_string())
 }

 /// Insert a node if it is not already present, returning its index
 /// either way. This is the single dedup point the orchestrator and
 /// the streaming emitter both rely on.
 pub fn get_or_insert(&mut self, node: Node) -> usize {
 let key = Self::key(node.kind, &node.id);
 if let Some(&idx) = self.index.get(&key) {
 return idx;
 }
 let idx = self.nodes.len();
 self.index.insert(key, idx);
 self.nodes.push(node);
 idx
 }

 pub fn contains(&self, kind: NodeKind, id: &str) -> bool {
 self.index.contains_key(&Self::key(kind, id))
 }

 pub fn index_of(&self, kind: NodeKind, id: &str) -> Option<usize> {
 self.index.get(&Self::key(kind, id)).copied()
 }

 pub fn add_edge(&mut self, edge: Edge) {
 self.edges.push(edge);
 }

 /// Drop edges below `confidence_threshold`. Orphaned nodes are kept
 /// "nodes they would have orphaned remain".
 pub fn filter_by_confidence(&mut self, confidence_threshold: f64) {
 self.edges.retain(|e| e.confidence >= confidence_threshold);
 }
}
