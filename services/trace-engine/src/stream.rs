//! Streaming Trace Emitter (C9, ): runs an address-centered
//! trace incrementally, pushing structured events to the caller's
//! channel. Wire framing (`event: <type>\ndata: <json>\n\n`) is the
//! adapter's job; this module only produces the event stream and
//! enforces batching/backpressure/cancellation semantics.

use std::sync::Arc;
use std::time::Duration;

use gateway_cache::ChainCache;
use gateway_types::{Edge, Node, TraceGraph};
use serde::Serialize;
use tokio::sync::mpsc::Sender;

use crate::orchestrator::{AddressTraceRequest, TraceOrchestrator};

const STREAM_BATCH_SIZE: usize = 20;
const STREAM_BATCH_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Serialize)]
pub struct MetadataPayload {
 pub total_transactions: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchPayload {
 pub nodes: Vec<Node>,
 pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressPayload {
 pub processed: usize,
 pub total: usize,
 pub progress_pct: f64,
 pub nodes_count: usize,
 pub edges_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletePayload {
 pub total_nodes: usize,
 pub total_edges: usize,
 pub total_transactions: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
 pub message: String,
 #[serde(rename = "type")]
 pub error_type: String,
}

/// One event in the stream. `event_name`/`payload` let the adapter
/// frame each variant as `event: <name>\ndata: <payload>\n\n` without
/// this crate knowing anything about SSE or HTTP.
#[derive(Debug, Clone)]
pub enum TraceEvent {
 Metadata(MetadataPayload),
 Batch(BatchPayload),
 Progress(ProgressPayload),
 Complete(CompletePayload),
 Error(ErrorPayload),
}

impl TraceEvent {
 pub fn event_name(&self) -> &'static str {
 match self {
 TraceEvent::Metadata(_) => "metadata",
 TraceEvent::Batch(_) => "batch",
 TraceEvent::Progress(_) => "progress",
 TraceEvent::Complete(_) => "complete",
 TraceEvent::Error(_) => "error",
 }
 }

 pub fn payload(&self) -> serde_json::Value {
 let encoded = match self {
 TraceEvent::Metadata(p) => serde_json::to_value(p),
 TraceEvent::Batch(p) => serde_json::to_value(p),
 TraceEvent::Progress(p) => serde_json::to_value(p),
 TraceEvent::Complete(p) => serde_json::to_value(p),
 TraceEvent::Error(p) => serde_json::to_value(p),
 };
 encoded.unwrap_or(serde_json::Value::Null)
 }
}

pub struct StreamingTraceEmitter<C: ChainCache> {
 orchestrator: Arc<TraceOrchestrator<C>>,
}

impl<C: ChainCache> StreamingTraceEmitter<C> {
 pub fn new(orchestrator: Arc<TraceOrchestrator<C>>) -> Self {
 StreamingTraceEmitter { orchestrator }
 }

 /// Runs the address-centered trace incrementally, sending events to
 /// `tx` as they become available. Returns as soon as the channel is
 /// observed closed — no further upstream fetches are started past
 /// that point.
 pub async fn stream(&self, req: AddressTraceRequest, tx: Sender<TraceEvent>) {
 if tx.send(TraceEvent::Metadata(MetadataPayload { total_transactions: None })).await.is_err() {
 return;
 }

 let txids = self.orchestrator.chain_data().fetch_address_history(&req.address, Some(req.max_transactions)).await;
 let total = txids.len();
 if tx.send(TraceEvent::Metadata(MetadataPayload { total_transactions: Some(total) })).await.is_err() {
 return;
 }

 let mut graph = TraceGraph::new();
 let start_idx = graph.get_or_insert(Node::address(req.address.clone()));
 graph.nodes[start_idx].is_starting_point = true;

 let first_batch = BatchPayload { nodes: vec![graph.nodes[start_idx].clone()], edges: Vec::new() };
 if tx.send(TraceEvent::Batch(first_batch)).await.is_err() {
 return;
 }

 let mut processed = 0usize;
 let mut prior_node_count = graph.nodes.len();
 let mut prior_edge_count = graph.edges.len();

 for chunk in txids.chunks(STREAM_BATCH_SIZE) {
 let fetched = self.orchestrator.chain_data().fetch_transactions_batch(chunk).await;

 for maybe_tx in fetched.into_iter().flatten() {
 let has_output_to_address =
 maybe_tx.outputs.iter().any(|o| o.address.as_deref() == Some(req.address.as_str()));
 let has_input_from_address =
 maybe_tx.inputs.iter().any(|i| i.prev_address.as_deref() == Some(req.address.as_str()));
 let include =
 (has_output_to_address && req.hops_before > 0) || (has_input_from_address && req.hops_after > 0);
 if !include {
 continue;
 }

 let tx_idx = graph.get_or_insert(Node::transaction(maybe_tx.txid.clone()));
 for output in &maybe_tx.outputs {
 if output.address.as_deref() == Some(req.address.as_str()) {
 graph.add_edge(Edge {
 from: tx_idx,
 to: start_idx,
 amount: output.value,
 vout: Some(output.n),
 confidence: 1.0,
 heuristic_tag: None,
 });
 }
 }
 let total_sent: u64 = maybe_tx
.inputs
.iter()
.filter(|i| i.prev_address.as_deref() == Some(req.address.as_str()))
.filter_map(|i| i.prev_value)
.sum();
 if has_input_from_address {
 graph.add_edge(Edge {
 from: start_idx,
 to: tx_idx,
 amount: total_sent,
 vout: None,
 confidence: 0.9,
 heuristic_tag: None,
 });
 }
 }

 processed += chunk.len();

 let batch = BatchPayload {
 nodes: graph.nodes[prior_node_count..].to_vec(),
 edges: graph.edges[prior_edge_count..].to_vec(),
 };
 prior_node_count = graph.nodes.len();
 prior_edge_count = graph.edges.len();

 if tx.send(TraceEvent::Batch(batch)).await.is_err() {
 return;
 }

 let progress = ProgressPayload {
 processed,
 total,
 progress_pct: if total > 0 { processed as f64 / total as f64 * 100.0 } else { 100.0 },
 nodes_count: graph.nodes.len(),
 edges_count: graph.edges.len(),
 };
 if tx.send(TraceEvent::Progress(progress)).await.is_err() {
 return;
 }

 tokio::time::sleep(STREAM_BATCH_DELAY).await;
 }

 let _ = tx
.send(TraceEvent::Complete(CompletePayload {
 total_nodes: graph.nodes.len(),
 total_edges: graph.edges.len(),
 total_transactions: total,
 }))
.await;
 }
}
