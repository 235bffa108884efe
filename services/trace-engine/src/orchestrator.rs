//! Trace orchestrator: `trace_utxo`, `trace_from_address`,
//! `trace_peel_chain`. All three build on the same graph-insertion
//! primitives in `gateway_types::TraceGraph` and the pure heuristics in
//! `heuristics`; the orchestrator's own job is fetch scheduling
//! (batched, deduplicated, bounded by hop count) and annotation.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use chain_data::dedup::dedupe_preserve_order;
use chain_data::ChainDataService;
use gateway_cache::ChainCache;
use gateway_types::{
 CoinJoinRecord, Edge, GatewayError, Input, Node, NodeKind, Output, PeelChainHop, PeelChainStats,
 Transaction, TraceGraph,
};
use heuristics::{analyze_peel_hop, chain_statistics, detect_coinjoin, ChangeDetector, ClusterBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::error::{Result, TraceError};

/// Out-of-range hop counts are rejected before any fetch is issued
///.
const MAX_HOPS: u32 = 50;

fn validate_hops(hops_before: u32, hops_after: u32) -> Result<()> {
 if hops_before > MAX_HOPS || hops_after > MAX_HOPS {
 return Err(TraceError::Gateway(GatewayError::InvalidInput(format!(
 "hops_before/hops_after must each be <= {MAX_HOPS}"
 ))));
 }
 Ok(())
}

#[derive(Debug, Clone, Deserialize)]
pub struct UtxoTraceRequest {
 pub txid: String,
 pub vout: u32,
 pub hops_before: u32,
 pub hops_after: u32,
 pub include_coinjoin: bool,
 pub confidence_threshold: f64,
 pub max_addresses_per_tx: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddressTraceRequest {
 pub address: String,
 pub hops_before: u32,
 pub hops_after: u32,
 pub max_transactions: usize,
 pub confidence_threshold: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PeelChainRequest {
 pub start_txid: String,
 pub max_hops: u32,
 pub min_confidence: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeelChainResult {
 pub hops: Vec<PeelChainHop>,
 pub stats: Option<PeelChainStats>,
}

/// Direction a BFS walk expands in: backward follows an input's
/// `prev_txid`, forward follows an output's `spending_txid`. Both share
/// the same per-transaction annotation step; only neighbor discovery
/// and the hop-count bound differ.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
 Backward,
 Forward,
}

/// Accumulated state for one `trace_utxo` invocation. Not reused across
/// calls.
struct GraphBuild {
 graph: TraceGraph,
 clusters: ClusterBuilder,
 change_detector: ChangeDetector,
 coinjoins: Vec<(String, CoinJoinRecord)>,
 peel_candidates: Vec<Transaction>,
}

impl GraphBuild {
 fn new() -> Self {
 GraphBuild {
 graph: TraceGraph::new(),
 clusters: ClusterBuilder::new(),
 change_detector: ChangeDetector::new(),
 coinjoins: Vec::new(),
 peel_candidates: Vec::new(),
 }
 }
}

/// Insert `tx` into the graph under construction: clustering, change
/// detection, node/edge insertion, and CoinJoin bookkeeping (spec
/// §4.7.1, recursive path steps 1-4). Returns whether this transaction
/// is a CoinJoin that should not be recursed through further.
fn process_transaction(tx: &Transaction, include_coinjoin: bool, build: &mut GraphBuild) -> bool {
 let coinjoin = detect_coinjoin(tx);
 let is_coinjoin = coinjoin.is_some();
 let stop_recursion = is_coinjoin && !include_coinjoin;

 build.clusters.observe_transaction(tx, is_coinjoin);
 let change = build.change_detector.identify_change_output(tx);
 for output in &tx.outputs {
 if let Some(addr) = &output.address {
 build.change_detector.observe_address(addr);
 }
 }

 let tx_idx = build.graph.get_or_insert(Node::transaction(tx.txid.clone()));

 if let Some(record) = coinjoin {
 build.coinjoins.push((tx.txid.clone(), record));
 }

 let edge_confidence_in = if is_coinjoin { 0.3 } else { 0.9 };
 let edge_confidence_out = if is_coinjoin { 0.3 } else { 1.0 };
 let heuristic_tag = is_coinjoin.then(|| "coinjoin".to_string());

 for input in tx.spendable_inputs() {
 if let Some(addr) = &input.prev_address {
 let addr_idx = build.graph.get_or_insert(Node::address(addr.clone()));
 build.graph.add_edge(Edge {
 from: addr_idx,
 to: tx_idx,
 amount: input.prev_value.unwrap_or(0),
 vout: Some(input.prev_vout),
 confidence: edge_confidence_in,
 heuristic_tag: heuristic_tag.clone(),
 });
 }
 }

 for output in &tx.outputs {
 if let Some(addr) = &output.address {
 let addr_idx = build.graph.get_or_insert(Node::address(addr.clone()));
 if change.as_ref().is_some_and(|c| c.output_index == output.n as usize) {
 build.graph.nodes[addr_idx].is_change = true;
 }
 build.graph.add_edge(Edge {
 from: tx_idx,
 to: addr_idx,
 amount: output.value,
 vout: Some(output.n),
 confidence: edge_confidence_out,
 heuristic_tag: heuristic_tag.clone(),
 });
 }
 }

 if tx.outputs.len() == 2 {
 build.peel_candidates.push(tx.clone());
 }

 stop_recursion
}

fn input_display(input: &Input) -> String {
 input.prev_address.clone().unwrap_or_else(|| "Unknown".to_string())
}

/// Resolves an input's funding address/value, falling back to a
/// batch-fetched previous transaction when the upstream response did
/// not already carry resolved prevout data.
fn resolve_input_address(input: &Input, prev_map: &HashMap<String, Arc<Transaction>>) -> (Option<String>, Option<u64>) {
 if input.is_coinbase() {
 return (None, None);
 }
 if input.prev_address.is_some() {
 return (input.prev_address.clone(), input.prev_value);
 }
 prev_map
.get(&input.prev_txid)
.and_then(|t| t.outputs.get(input.prev_vout as usize))
.map(|o| (o.address.clone(), Some(o.value)))
.unwrap_or((None, None))
}

/// Attaches the same bounded input/output summary used by the
/// address-trace metadata to a transaction node, regardless of which
/// BFS layer produced it.
fn attach_tx_metadata(
 graph: &mut TraceGraph,
 tx_idx: usize,
 tx: &Transaction,
 resolved_inputs: &[(Option<String>, Option<u64>)],
) {
 let input_meta: Vec<Value> = tx
.inputs
.iter()
.zip(resolved_inputs.iter())
.take(100)
.map(|(i, (addr, value))| {
 json!({
 "prev_txid": i.prev_txid,
 "prev_vout": i.prev_vout,
 "address": addr.clone().unwrap_or_else(|| "Unknown".to_string()),
 "value": value,
 })
 })
.collect();
 let output_meta: Vec<Value> = tx
.outputs
.iter()
.take(100)
.map(|o| json!({"n": o.n, "address": o.display_placeholder(), "value": o.value}))
.collect();
 graph.nodes[tx_idx].metadata = json!({"inputs": input_meta, "outputs": output_meta});
}

pub struct TraceOrchestrator<C: ChainCache> {
 chain_data: Arc<ChainDataService<C>>,
}

impl<C: ChainCache> TraceOrchestrator<C> {
 pub fn new(chain_data: Arc<ChainDataService<C>>) -> Self {
 TraceOrchestrator { chain_data }
 }

 /// The underlying chain-data service, exposed so the streaming
 /// emitter can reuse the same fetch/cache/preference machinery
 /// without duplicating it.
 pub fn chain_data(&self) -> &Arc<ChainDataService<C>> {
 &self.chain_data
 }

 /// `trace_utxo`: fast path for `hops_before/after <= 1`,
 /// otherwise a bounded bidirectional BFS.
 pub async fn trace_utxo(&self, req: UtxoTraceRequest) -> Result<TraceGraph> {
 validate_hops(req.hops_before, req.hops_after)?;

 let start_tx = self
.chain_data
.fetch_transaction(&req.txid)
.await
.map_err(|_| GatewayError::StartingTransactionUnavailable { txid: req.txid.clone() })?;

 if req.hops_before <= 1 && req.hops_after <= 1 {
 Ok(self.trace_utxo_fast(&start_tx, &req).await)
 } else {
 Ok(self.trace_utxo_recursive(start_tx, &req).await)
 }
 }

 async fn trace_utxo_fast(&self, start_tx: &Transaction, req: &UtxoTraceRequest) -> TraceGraph {
 let mut inputs = start_tx.inputs.clone();
 self.resolve_missing_input_data(&mut inputs, req.max_addresses_per_tx).await;

 let mut graph = TraceGraph::new();
 let tx_idx = graph.get_or_insert(Node::transaction(start_tx.txid.clone()));
 graph.nodes[tx_idx].is_starting_point = true;

 let capped_inputs: Vec<&Input> =
 inputs.iter().filter(|i| !i.is_coinbase()).take(req.max_addresses_per_tx).collect();
 let capped_outputs: Vec<&Output> = start_tx.outputs.iter().take(req.max_addresses_per_tx).collect();

 let input_meta: Vec<Value> = capped_inputs
.iter()
.map(|i| json!({"prev_txid": i.prev_txid, "prev_vout": i.prev_vout, "address": input_display(i), "value": i.prev_value}))
.collect();
 let output_meta: Vec<Value> = capped_outputs
.iter()
.map(|o| json!({"n": o.n, "address": o.display_placeholder(), "value": o.value}))
.collect();

 graph.nodes[tx_idx].metadata = json!({
 "inputs": input_meta,
 "outputs": output_meta,
 "input_count": start_tx.inputs.len(),
 "output_count": start_tx.outputs.len(),
 });

 if req.hops_before > 0 {
 for input in &capped_inputs {
 if let Some(addr) = &input.prev_address {
 let addr_idx = graph.get_or_insert(Node::address(addr.clone()));
 graph.add_edge(Edge {
 from: addr_idx,
 to: tx_idx,
 amount: input.prev_value.unwrap_or(0),
 vout: Some(input.prev_vout),
 confidence: 0.9,
 heuristic_tag: None,
 });
 }
 }
 }

 if req.hops_after > 0 {
 for output in &capped_outputs {
 if let Some(addr) = &output.address {
 let addr_idx = graph.get_or_insert(Node::address(addr.clone()));
 graph.add_edge(Edge {
 from: tx_idx,
 to: addr_idx,
 amount: output.value,
 vout: Some(output.n),
 confidence: 1.0,
 heuristic_tag: None,
 });
 }
 }
 }

 graph.filter_by_confidence(req.confidence_threshold);
 graph
 }

 /// Fills in `prev_address`/`prev_value` for up to `cap` inputs whose
 /// upstream response did not carry resolved prevout data, by
 /// batch-fetching the referenced previous transactions once.
 async fn resolve_missing_input_data(&self, inputs: &mut [Input], cap: usize) {
 let targets: Vec<usize> = inputs
.iter()
.enumerate()
.filter(|(_, i)| !i.is_coinbase() && i.prev_address.is_none())
.map(|(idx, _)| idx)
.take(cap)
.collect();
 if targets.is_empty() {
 return;
 }

 let prev_txids: Vec<String> = targets.iter().map(|&idx| inputs[idx].prev_txid.clone()).collect();
 let fetched = self.chain_data.fetch_transactions_batch(&prev_txids).await;
 for (&idx, prev_tx) in targets.iter().zip(fetched) {
 if let Some(prev_tx) = prev_tx {
 if let Some(output) = prev_tx.outputs.get(inputs[idx].prev_vout as usize) {
 inputs[idx].prev_address = output.address.clone();
 inputs[idx].prev_value = Some(output.value);
 }
 }
 }
 }

 async fn trace_utxo_recursive(&self, start_tx: Transaction, req: &UtxoTraceRequest) -> TraceGraph {
 let mut build = GraphBuild::new();
 let mut visited: HashSet<String> = HashSet::new();
 visited.insert(start_tx.txid.clone());

 let start_stops = process_transaction(&start_tx, req.include_coinjoin, &mut build);
 let start_idx = build
.graph
.index_of(NodeKind::Transaction, &start_tx.txid)
.expect("start transaction was just inserted");
 build.graph.nodes[start_idx].is_starting_point = true;

 if req.hops_before > 0 && !start_stops {
 self.walk(&mut build, start_tx.clone(), None, req.hops_before, Direction::Backward, req.include_coinjoin, &mut visited)
.await;
 }
 if req.hops_after > 0 && !start_stops {
 self.walk_forward(&mut build, start_tx, req.vout, req.hops_after, req.include_coinjoin, &mut visited)
.await;
 }

 for tx in &build.peel_candidates {
 if let Some(hop) = analyze_peel_hop(tx, 0, &build.change_detector) {
 if let Some(idx) = build.graph.index_of(NodeKind::Transaction, &tx.txid) {
 build.graph.nodes[idx].metadata = serde_json::to_value(&hop).unwrap_or(Value::Null);
 }
 }
 }
 for (txid, record) in &build.coinjoins {
 if let Some(idx) = build.graph.index_of(NodeKind::Transaction, txid) {
 build.graph.nodes[idx].metadata = serde_json::to_value(record).unwrap_or(Value::Null);
 }
 }

 build.graph.filter_by_confidence(req.confidence_threshold);
 build.graph
 }

 async fn walk_forward(
 &self,
 build: &mut GraphBuild,
 root: Transaction,
 start_vout: u32,
 max_depth: u32,
 include_coinjoin: bool,
 visited: &mut HashSet<String>,
 ) {
 self.walk(build, root, Some(start_vout), max_depth, Direction::Forward, include_coinjoin, visited).await
 }

 /// BFS from `root` bounded by `max_depth`, following `prev_txid`
 /// (backward) or `spending_txid` (forward). A CoinJoin-tagged
 /// transaction (when `include_coinjoin=false`) is still recorded but
 /// not recursed through. `start_vout`, when set,
 /// restricts the very first forward hop to the specific output the
 /// caller asked to trace; later hops fan out across every output,
 /// matching the backward walk's "follow every input" behavior.
 #[allow(clippy::too_many_arguments)]
 async fn walk(
 &self,
 build: &mut GraphBuild,
 root: Transaction,
 start_vout: Option<u32>,
 max_depth: u32,
 direction: Direction,
 include_coinjoin: bool,
 visited: &mut HashSet<String>,
 ) {
 let mut queue: VecDeque<(Transaction, u32)> = VecDeque::new();
 queue.push_back((root, 0));

 while let Some((tx, depth)) = queue.pop_front() {
 if depth >= max_depth {
 continue;
 }

 let neighbors: Vec<String> = match direction {
 Direction::Backward => {
 tx.spendable_inputs().map(|i| i.prev_txid.clone()).collect()
 }
 Direction::Forward if depth == 0 && start_vout.is_some() => tx
.outputs
.get(start_vout.unwrap() as usize)
.and_then(|o| o.spending_txid.clone())
.into_iter()
.collect(),
 Direction::Forward => tx.outputs.iter().filter_map(|o| o.spending_txid.clone()).collect(),
 };

 let mut fresh = Vec::new();
 for txid in neighbors {
 if visited.insert(txid.clone()) {
 fresh.push(txid);
 }
 }
 if fresh.is_empty() {
 continue;
 }

 let fetched = self.chain_data.fetch_transactions_batch(&fresh).await;
 for (txid, maybe_tx) in fresh.into_iter().zip(fetched) {
 match maybe_tx {
 Some(neighbor_tx) => {
 let stop = process_transaction(&neighbor_tx, include_coinjoin, build);
 if !stop {
 queue.push_back(((*neighbor_tx).clone(), depth + 1));
 }
 }
 None => {
 let direction_name = direction_label(direction);
 warn!(%txid, direction = direction_name, "skipping unavailable transaction in trace");
 }
 }
 }
 }
 }

 /// `trace_from_address`. Hops greater than one are a
 /// true recursive breadth-first walk (Open Question D.1, branch a):
 /// `hops_before` expands backward through the addresses that funded
 /// each included transaction, `hops_after` expands forward through
 /// the addresses each included transaction paid, each bound
 /// independently and reusing the same per-transaction inclusion
 /// rule and batched prevout resolution at every layer.
 pub async fn trace_from_address(&self, req: AddressTraceRequest) -> Result<TraceGraph> {
 validate_hops(req.hops_before, req.hops_after)?;

 let mut graph = TraceGraph::new();
 let start_idx = graph.get_or_insert(Node::address(req.address.clone()));
 graph.nodes[start_idx].is_starting_point = true;

 if req.hops_before == 0 && req.hops_after == 0 {
 return Ok(graph);
 }

 if req.hops_before > 0 {
 self.expand_address(
 &mut graph,
 Direction::Backward,
 req.address.clone(),
 start_idx,
 req.hops_before,
 req.max_transactions,
 )
.await;
 }
 if req.hops_after > 0 {
 self.expand_address(
 &mut graph,
 Direction::Forward,
 req.address.clone(),
 start_idx,
 req.hops_after,
 req.max_transactions,
 )
.await;
 }

 graph.filter_by_confidence(req.confidence_threshold);
 Ok(graph)
 }

 /// One independent BFS over addresses, expanding `max_depth` layers
 /// from `(root_address, root_idx)`. Each layer fetches every
 /// frontier address's own history, batch-resolves prevouts for that
 /// layer exactly as the single-hop case already did, and hands the
 /// addresses discovered on included transactions to the next layer.
 async fn expand_address(
 &self,
 graph: &mut TraceGraph,
 direction: Direction,
 root_address: String,
 root_idx: usize,
 max_depth: u32,
 max_transactions: usize,
 ) {
 let mut visited_tx: HashSet<String> = HashSet::new();
 let mut visited_addr: HashSet<String> = HashSet::new();
 visited_addr.insert(root_address.clone());
 let mut frontier: Vec<(String, usize)> = vec![(root_address, root_idx)];

 for _ in 0..max_depth {
 if frontier.is_empty() {
 break;
 }
 let mut next_frontier: Vec<(String, usize)> = Vec::new();

 for (address, addr_idx) in frontier {
 let txids = self.chain_data.fetch_address_history(&address, Some(max_transactions)).await;
 let transactions = self.chain_data.fetch_transactions_batch(&txids).await;

 let prev_txids: Vec<String> = transactions
.iter()
.flatten()
.flat_map(|tx| {
 tx.spendable_inputs().filter(|i| i.prev_address.is_none()).map(|i| i.prev_txid.clone())
 })
.collect();
 let (unique_prev, _) = dedupe_preserve_order(&prev_txids);
 let resolved = self.chain_data.fetch_transactions_batch(&unique_prev).await;
 let prev_map: HashMap<String, Arc<Transaction>> =
 unique_prev.into_iter().zip(resolved).filter_map(|(txid, tx)| tx.map(|t| (txid, t))).collect();

 for tx in transactions.into_iter().flatten() {
 if !visited_tx.insert(tx.txid.clone()) {
 continue;
 }
 let resolved_inputs: Vec<(Option<String>, Option<u64>)> =
 tx.inputs.iter().map(|i| resolve_input_address(i, &prev_map)).collect();

 match direction {
 Direction::Backward => {
 let has_output_to_address =
 tx.outputs.iter().any(|o| o.address.as_deref() == Some(address.as_str()));
 if !has_output_to_address {
 continue;
 }
 let tx_idx = graph.get_or_insert(Node::transaction(tx.txid.clone()));
 for output in &tx.outputs {
 if output.address.as_deref() == Some(address.as_str()) {
 graph.add_edge(Edge {
 from: tx_idx,
 to: addr_idx,
 amount: output.value,
 vout: Some(output.n),
 confidence: 1.0,
 heuristic_tag: None,
 });
 }
 }
 attach_tx_metadata(graph, tx_idx, &tx, &resolved_inputs);

 for (in_addr, in_value) in &resolved_inputs {
 let Some(in_addr) = in_addr else { continue };
 let in_idx = graph.get_or_insert(Node::address(in_addr.clone()));
 graph.add_edge(Edge {
 from: in_idx,
 to: tx_idx,
 amount: in_value.unwrap_or(0),
 vout: None,
 confidence: 0.9,
 heuristic_tag: None,
 });
 if visited_addr.insert(in_addr.clone()) {
 next_frontier.push((in_addr.clone(), in_idx));
 }
 }
 }
 Direction::Forward => {
 let has_input_from_address = resolved_inputs
.iter()
.any(|(addr, _)| addr.as_deref() == Some(address.as_str()));
 if !has_input_from_address {
 continue;
 }
 let tx_idx = graph.get_or_insert(Node::transaction(tx.txid.clone()));
 let total_sent: u64 = resolved_inputs
.iter()
.filter(|(addr, _)| addr.as_deref() == Some(address.as_str()))
.filter_map(|(_, value)| *value)
.sum();
 graph.add_edge(Edge {
 from: addr_idx,
 to: tx_idx,
 amount: total_sent,
 vout: None,
 confidence: 0.9,
 heuristic_tag: None,
 });
 attach_tx_metadata(graph, tx_idx, &tx, &resolved_inputs);

 for output in &tx.outputs {
 let Some(out_addr) = &output.address else { continue };
 let out_idx = graph.get_or_insert(Node::address(out_addr.clone()));
 graph.add_edge(Edge {
 from: tx_idx,
 to: out_idx,
 amount: output.value,
 vout: Some(output.n),
 confidence: 1.0,
 heuristic_tag: None,
 });
 if visited_addr.insert(out_addr.clone()) {
 next_frontier.push((out_addr.clone(), out_idx));
 }
 }
 }
 }
 }
 }

 frontier = next_frontier;
 }
 }

 /// `trace_peel_chain`: a dedicated single-chain
 /// walk, independent of the bounded BFS used by `trace_utxo`.
 pub async fn trace_peel_chain(&self, req: PeelChainRequest) -> Result<PeelChainResult> {
 if req.max_hops > MAX_HOPS {
 return Err(TraceError::Gateway(GatewayError::InvalidInput(format!(
 "max_hops must be <= {MAX_HOPS}"
 ))));
 }

 let mut change_detector = ChangeDetector::new();
 let mut hops = Vec::new();
 let mut current_txid = req.start_txid.clone();

 for hop_number in 0..req.max_hops {
 let tx = match self.chain_data.fetch_transaction(&current_txid).await {
 Ok(tx) => tx,
 Err(_) if hop_number == 0 => {
 return Err(TraceError::Gateway(GatewayError::StartingTransactionUnavailable {
 txid: current_txid,
 }));
 }
 Err(_) => {
 warn!(txid = %current_txid, "peel chain walk stopped: transaction unavailable");
 break;
 }
 };

 for output in &tx.outputs {
 if let Some(addr) = &output.address {
 change_detector.observe_address(addr);
 }
 }

 let Some(hop) = analyze_peel_hop(&tx, hop_number, &change_detector) else {
 break;
 };
 if hop.confidence < req.min_confidence {
 break;
 }

 let next_txid = tx.outputs[hop.change_output_index].spending_txid.clone();
 hops.push(hop);
 match next_txid {
 Some(next) => current_txid = next,
 None => break,
 }
 }

 let stats = chain_statistics(&hops);
 Ok(PeelChainResult { hops, stats })
 }
}

fn direction_label(direction: Direction) -> &'static str {
 match direction {
 Direction::Backward => "backward",
 Direction::Forward => "forward",
 }
}

#[cfg(test)]
mod tests {
 use super::*;
 use gateway_cache::InMemoryCache;
 use gateway_config::GatewayConfig;
 use std::time::Duration;

 fn orchestrator() -> TraceOrchestrator<InMemoryCache> {
 let config = GatewayConfig::default();
 let driver =
 endpoint_pool::FailoverDriver::new(vec![], 8, 1, Duration::from_millis(50), Duration::from_millis(100));
 let chain_data = ChainDataService::new(driver, Arc::new(InMemoryCache::new()), &config);
 TraceOrchestrator::new(Arc::new(chain_data))
 }

 #[tokio::test]
 async fn trace_utxo_fails_with_starting_transaction_unavailable_when_no_endpoints() {
 let orch = orchestrator();
 let req = UtxoTraceRequest {
 txid: "abc123".into(),
 vout: 0,
 hops_before: 1,
 hops_after: 1,
 include_coinjoin: false,
 confidence_threshold: 0.0,
 max_addresses_per_tx: 10,
 };
 let err = orch.trace_utxo(req).await.unwrap_err();
 assert!(matches!(err, TraceError::Gateway(GatewayError::StartingTransactionUnavailable {.. })));
 }

 #[tokio::test]
 async fn trace_utxo_rejects_out_of_range_hops() {
 let orch = orchestrator();
 let req = UtxoTraceRequest {
 txid: "abc123".into(),
 vout: 0,
 hops_before: 51,
 hops_after: 0,
 include_coinjoin: false,
 confidence_threshold: 0.0,
 max_addresses_per_tx: 10,
 };
 let err = orch.trace_utxo(req).await.unwrap_err();
 assert!(matches!(err, TraceError::Gateway(GatewayError::InvalidInput(_))));
 }

 #[tokio::test]
 async fn trace_from_address_with_zero_hops_returns_only_starting_node() {
 let orch = orchestrator();
 let req = AddressTraceRequest {
 address: "bc1qexample".into(),
 hops_before: 0,
 hops_after: 0,
 max_transactions: 10,
 confidence_threshold: 0.0,
 };
 let graph = orch.trace_from_address(req).await.unwrap();
 assert_eq!(graph.nodes.len(), 1);
 assert!(graph.nodes[0].is_starting_point);
 assert!(graph.edges.is_empty());
 }

 #[tokio::test]
 async fn trace_peel_chain_fails_with_starting_transaction_unavailable_when_no_endpoints() {
 let orch = orchestrator();
 let req = PeelChainRequest {
 start_txid: "abc123".into(),
 max_hops: 5,
 min_confidence: 0.5,
 };
 let err = orch.trace_peel_chain(req).await.unwrap_err();
 assert!(matches!(err, TraceError::Gateway(GatewayError::StartingTransactionUnavailable {.. })));
 }
}
