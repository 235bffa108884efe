//! Seed integration scenarios exercising the gateway end to end against
//! mock upstream servers. Each scenario owns its own mock server(s) and
//! wiring, and returns an error describing the first assertion that
//! failed so the CLI runner can report it without panicking the whole
//! suite.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use chain_data::ChainDataService;
use endpoint_pool::{build_endpoints, FailoverDriver};
use gateway_cache::InMemoryCache;
use gateway_config::GatewayConfig;
use gateway_types::EndpointPriority;
use serde_json::json;
use tokio::sync::mpsc;
use trace_engine::{AddressTraceRequest, StreamingTraceEmitter, TraceEvent, TraceOrchestrator, UtxoTraceRequest};

use crate::fixtures;

fn driver_for(config: &GatewayConfig, max_attempts: u32) -> FailoverDriver {
 FailoverDriver::new(
 build_endpoints(config),
 config.mempool_global_max_inflight as usize,
 max_attempts,
 Duration::from_millis(config.timeouts.hard_request_timeout_ms),
 Duration::from_millis(config.timeouts.total_timeout_ms),
 )
}

fn chain_data_for(config: &GatewayConfig, max_attempts: u32) -> ChainDataService<InMemoryCache> {
 ChainDataService::new(driver_for(config, max_attempts), Arc::new(InMemoryCache::new()), config)
}

/// S1: a single confirmed transaction lookup is served once by the
/// upstream and then answered from cache on a repeat lookup.
pub async fn single_confirmed_tx_lookup_is_cached() -> Result<()> {
 let mut server = mockito::Server::new_async().await;
 let txid = "a".repeat(64);
 let mock = server
.mock("GET", format!("/tx/{txid}").as_str())
.with_status(200)
.with_header("content-type", "application/json")
.with_body(fixtures::confirmed_tx(&txid, 820_000).to_string())
.expect(1)
.create_async()
.await;

 let mut config = GatewayConfig::default();
 config.mempool_local_url = Some(server.url());
 let svc = chain_data_for(&config, 1);

 let first = svc.fetch_transaction(&txid).await.context("first lookup")?;
 ensure!(first.is_confirmed(), "expected a confirmed transaction");
 ensure!(first.block_height == Some(820_000), "unexpected block height");

 let second = svc.fetch_transaction(&txid).await.context("second lookup")?;
 ensure!(second.txid == first.txid, "cached lookup returned a different transaction");

 mock.assert_async().await;
 Ok(())
}

/// S2: a batch lookup with a duplicate txid and one txid that fails at
/// every upstream. Order and duplicate slots are preserved; the failing
/// slot resolves to `None` rather than aborting the whole batch.
pub async fn batch_lookup_preserves_order_and_isolates_failures() -> Result<()> {
 let mut server = mockito::Server::new_async().await;
 let txid_a = "a".repeat(64);
 let txid_c = "c".repeat(64);
 let txid_b_missing = "b".repeat(64);

 server
.mock("GET", format!("/tx/{txid_a}").as_str())
.with_status(200)
.with_header("content-type", "application/json")
.with_body(fixtures::confirmed_tx(&txid_a, 820_001).to_string())
.create_async()
.await;
 server
.mock("GET", format!("/tx/{txid_c}").as_str())
.with_status(200)
.with_header("content-type", "application/json")
.with_body(fixtures::confirmed_tx(&txid_c, 820_002).to_string())
.create_async()
.await;
 // txid_b_missing gets no mock: mockito answers with 501, a failure.

 let mut config = GatewayConfig::default();
 config.mempool_local_url = Some(server.url());
 let svc = chain_data_for(&config, 1);

 let txids = vec![txid_a.clone(), txid_b_missing, txid_a.clone(), txid_c.clone()];
 let result = svc.fetch_transactions_batch(&txids).await;

 ensure!(result.len() == 4, "expected one slot per input txid");
 ensure!(result[0].is_some(), "txid_a should have resolved");
 ensure!(result[1].is_none(), "the unmocked txid should fail, not panic");
 ensure!(result[2].is_some(), "duplicate txid_a slot should also resolve");
 ensure!(result[3].is_some(), "txid_c should have resolved");
 ensure!(Arc::ptr_eq(result[0].as_ref().unwrap(), result[2].as_ref().unwrap()), "duplicate slots should share one Arc");

 Ok(())
}

/// S3a: repeated slow/degraded responses push `concurrency_limit` down
/// to `min_concurrency` over successive one-second adjustment windows.
/// S3b: a separately tuned endpoint shows the mirror case, rising back
/// toward `max_concurrency` on sustained fast, clean responses.
pub async fn endpoint_adapts_concurrency_limit() -> Result<()> {
 let mut server = mockito::Server::new_async().await;
 let txid = "a".repeat(64);
 server
.mock("GET", format!("/tx/{txid}").as_str())
.with_status(200)
.with_header("content-type", "application/json")
.with_body(fixtures::confirmed_tx(&txid, 1).to_string())
.expect_at_least(1)
.create_async()
.await;

 // S3a: an impossibly strict latency target means every real response
 // (even an in-process mock) counts as slow, forcing a decrease each
 // adjustment window.
 let mut decreasing = GatewayConfig::default();
 decreasing.mempool_local_url = Some(server.url());
 decreasing.local_tier.initial = 3;
 decreasing.local_tier.min = 1;
 decreasing.local_tier.max_concurrent = 3;
 decreasing.concurrency_tuning.adjust_window = 2;
 decreasing.concurrency_tuning.success_target = 0.99;
 decreasing.concurrency_tuning.latency_target_ms = 0.0001;
 decreasing.concurrency_tuning.failure_threshold = 1_000;
 let driver = driver_for(&decreasing, 1);

 let deadline = std::time::Instant::now() + Duration::from_secs(6);
 loop {
 let limit = driver.endpoints()[0].snapshot().concurrency_limit;
 if limit <= decreasing.local_tier.min {
 break;
 }
 ensure!(std::time::Instant::now() < deadline, "concurrency limit never reached min within 6s");
 driver.request_with_failover(&format!("/tx/{txid}"), EndpointPriority::Local).await;
 }
 ensure!(driver.endpoints()[0].snapshot().concurrency_limit == decreasing.local_tier.min, "limit should settle at min");

 // S3b: the mirror tuning — trivially satisfiable targets — rises
 // back toward max on sustained clean responses, one step per window.
 let mut rising = GatewayConfig::default();
 rising.mempool_local_url = Some(server.url());
 rising.local_tier.initial = 1;
 rising.local_tier.min = 1;
 rising.local_tier.max_concurrent = 4;
 rising.concurrency_tuning.adjust_window = 2;
 rising.concurrency_tuning.success_target = 0.0;
 rising.concurrency_tuning.latency_target_ms = 1.0e9;
 rising.concurrency_tuning.failure_threshold = 1_000;
 let driver = driver_for(&rising, 1);

 let deadline = std::time::Instant::now() + Duration::from_secs(6);
 loop {
 let limit = driver.endpoints()[0].snapshot().concurrency_limit;
 if limit >= rising.local_tier.max_concurrent {
 break;
 }
 ensure!(std::time::Instant::now() < deadline, "concurrency limit never reached max within 6s");
 driver.request_with_failover(&format!("/tx/{txid}"), EndpointPriority::Local).await;
 }
 ensure!(driver.endpoints()[0].snapshot().concurrency_limit == rising.local_tier.max_concurrent, "limit should settle at max");

 Ok(())
}

/// S4: the priority-0 endpoint fails every request; the priority-1
/// endpoint is healthy. A transaction lookup still succeeds, served by
/// priority-1 once the router's ranking demotes the failing endpoint.
pub async fn transaction_lookup_fails_over_across_priority_tiers() -> Result<()> {
 let mut local = mockito::Server::new_async().await;
 let mut additional = mockito::Server::new_async().await;
 let txid = "a".repeat(64);

 local
.mock("GET", format!("/tx/{txid}").as_str())
.with_status(500)
.expect_at_least(1)
.create_async()
.await;
 let additional_mock = additional
.mock("GET", format!("/tx/{txid}").as_str())
.with_status(200)
.with_header("content-type", "application/json")
.with_body(fixtures::confirmed_tx(&txid, 5).to_string())
.expect_at_least(1)
.create_async()
.await;

 let mut config = GatewayConfig::default();
 config.mempool_local_url = Some(local.url());
 config.mempool_additional_urls = vec![additional.url()];
 // Default cooldown (30s) means the first 500 from the local endpoint
 // takes it out of `is_available()` for the rest of this call, so the
 // router's next pick is deterministic rather than relying on ranking
 // alone.
 let svc = chain_data_for(&config, 6);

 let tx = svc.fetch_transaction(&txid).await.context("lookup should fail over to priority-1")?;
 ensure!(tx.txid == txid, "unexpected txid in failover response");

 additional_mock.assert_async().await;
 Ok(())
}

/// S5: a UTXO trace one hop backward from a transaction with a large
/// number of distinct inputs (grounded in the 348-input seed case)
/// bounded by `max_addresses_per_tx`.
pub async fn utxo_trace_bounds_large_fan_in() -> Result<()> {
 let mut server = mockito::Server::new_async().await;
 let txid = "f".repeat(64);
 const N_INPUTS: usize = 348;
 const MAX_ADDRESSES: usize = 100;

 server
.mock("GET", format!("/tx/{txid}").as_str())
.with_status(200)
.with_header("content-type", "application/json")
.with_body(fixtures::large_fanin_tx(&txid, N_INPUTS, "bc1qfunder").to_string())
.create_async()
.await;

 let mut config = GatewayConfig::default();
 config.mempool_local_url = Some(server.url());
 let chain_data = Arc::new(chain_data_for(&config, 1));
 let orchestrator = TraceOrchestrator::new(chain_data);

 let graph = orchestrator
.trace_utxo(UtxoTraceRequest {
 txid: txid.clone(),
 vout: 0,
 hops_before: 1,
 hops_after: 0,
 include_coinjoin: true,
 confidence_threshold: 0.0,
 max_addresses_per_tx: MAX_ADDRESSES,
 })
.await
.context("trace_utxo on a large-fan-in transaction")?;

 let address_nodes = graph.nodes.iter().filter(|n| n.kind == gateway_types::NodeKind::Address).count();
 ensure!(address_nodes == MAX_ADDRESSES, "expected exactly {MAX_ADDRESSES} funding addresses, got {address_nodes}");
 ensure!(graph.edges.len() == MAX_ADDRESSES, "expected one edge per bounded input");

 Ok(())
}

/// S6: an address-centered streaming trace emits metadata, then a
/// starting batch, then one batch/progress pair per page of history,
/// then a terminal complete event, in that order.
pub async fn address_stream_emits_events_in_order() -> Result<()> {
 let mut server = mockito::Server::new_async().await;
 let address = "bc1qtraced0000000000000000000000000000000";
 let tx_in = "1".repeat(64);
 let tx_out = "2".repeat(64);

 server
.mock("GET", format!("/address/{address}").as_str())
.with_status(200)
.with_header("content-type", "application/json")
.with_body(fixtures::address_summary(50_000, 0, 2, 2, 0).to_string())
.create_async()
.await;
 server
.mock("GET", format!("/address/{address}/txs").as_str())
.with_status(200)
.with_header("content-type", "application/json")
.with_body(json!([{"txid": tx_in}, {"txid": tx_out}]).to_string())
.create_async()
.await;
 server
.mock("GET", format!("/tx/{tx_in}").as_str())
.with_status(200)
.with_header("content-type", "application/json")
.with_body(fixtures::address_history_entry(&tx_in, address, "bc1qfunder00000000000000000000000000000000").to_string())
.create_async()
.await;
 server
.mock("GET", format!("/tx/{tx_out}").as_str())
.with_status(200)
.with_header("content-type", "application/json")
.with_body(
 json!({
 "txid": tx_out,
 "version": 2,
 "locktime": 0,
 "size": 225,
 "weight": 900,
 "vin": [{
 "txid": "3".repeat(64),
 "vout": 0,
 "sequence": 0xffffffffu32,
 "prevout": {
 "value": 80_000,
 "scriptpubkey": "0014".to_string() + &"44".repeat(20),
 "scriptpubkey_address": address,
 "scriptpubkey_type": "v0_p2wpkh",
 },
 }],
 "vout": [{
 "value": 79_500,
 "scriptpubkey": "0014".to_string() + &"55".repeat(20),
 "scriptpubkey_address": "bc1qrecipient00000000000000000000000000000",
 "scriptpubkey_type": "v0_p2wpkh",
 }],
 "status": {"confirmed": true, "block_height": 820_003, "block_hash": "0".repeat(64), "block_time": 1_700_000_001i64},
 })
.to_string(),
 )
.create_async()
.await;

 let mut config = GatewayConfig::default();
 config.mempool_local_url = Some(server.url());
 let chain_data = Arc::new(chain_data_for(&config, 1));
 let orchestrator = Arc::new(TraceOrchestrator::new(chain_data));
 let emitter = StreamingTraceEmitter::new(orchestrator);

 let (tx, mut rx) = mpsc::channel(1);
 let req = AddressTraceRequest {
 address: address.to_string(),
 hops_before: 1,
 hops_after: 1,
 max_transactions: 10,
 confidence_threshold: 0.0,
 };
 let handle = tokio::spawn(async move { emitter.stream(req, tx).await });

 let mut events = Vec::new();
 while let Some(event) = rx.recv().await {
 events.push(event);
 }
 handle.await.context("streaming task panicked")?;

 ensure!(events.len() == 6, "expected metadata/metadata/batch/batch/progress/complete, got {}", events.len());
 ensure!(matches!(events[0], TraceEvent::Metadata(_)), "event 0 should be metadata");
 ensure!(matches!(events[1], TraceEvent::Metadata(_)), "event 1 should be metadata with a total");
 ensure!(matches!(events[2], TraceEvent::Batch(_)), "event 2 should be the starting-node batch");
 ensure!(matches!(events[3], TraceEvent::Batch(_)), "event 3 should be the first page's batch");
 ensure!(matches!(events[4], TraceEvent::Progress(_)), "event 4 should be progress");
 ensure!(matches!(events[5], TraceEvent::Complete(_)), "event 5 should be the terminal complete event");

 if let TraceEvent::Batch(payload) = &events[3] {
 ensure!(payload.nodes.len() == 2, "expected both discovered transactions in the first page batch");
 ensure!(payload.edges.len() == 2, "expected one edge per discovered transaction");
 }

 Ok(())
}

/// S7: a CoinJoin transaction acts as a barrier during a recursive UTXO
/// trace — its own low-confidence edges are recorded, but the walk does
/// not recurse through it to reach the funding addresses one hop further
/// back.
pub async fn coinjoin_acts_as_a_recursion_barrier() -> Result<()> {
 let mut server = mockito::Server::new_async().await;
 let start_txid = "a".repeat(64);
 let coinjoin_txid = "b".repeat(64);
 let participant_addresses: Vec<String> =
 (0..5).map(|i| format!("bc1qparticipantsource{i:03}00000000000000000")).collect();

 server
.mock("GET", format!("/tx/{start_txid}").as_str())
.with_status(200)
.with_header("content-type", "application/json")
.with_body(
 json!({
 "txid": start_txid,
 "version": 2,
 "locktime": 0,
 "size": 225,
 "weight": 900,
 "vin": [{
 "txid": coinjoin_txid,
 "vout": 0,
 "sequence": 0xffffffffu32,
 "prevout": {
 "value": 1_000_000,
 "scriptpubkey": "0014".to_string() + &"66".repeat(20),
 "scriptpubkey_address": "bc1qparticipant000000000000000000000000000",
 "scriptpubkey_type": "v0_p2wpkh",
 },
 }],
 "vout": [{
 "value": 990_000,
 "scriptpubkey": "0014".to_string() + &"77".repeat(20),
 "scriptpubkey_address": "bc1qdestination00000000000000000000000000",
 "scriptpubkey_type": "v0_p2wpkh",
 }],
 "status": {"confirmed": true, "block_height": 820_200, "block_hash": "0".repeat(64), "block_time": 1_700_200_000i64},
 })
.to_string(),
 )
.create_async()
.await;
 server
.mock("GET", format!("/tx/{coinjoin_txid}").as_str())
.with_status(200)
.with_header("content-type", "application/json")
.with_body(fixtures::coinjoin_tx(&coinjoin_txid, &participant_addresses).to_string())
.create_async()
.await;
 // Deliberately no mocks for the coinjoin's own inputs: if the walk
 // recursed past the barrier it would 501 and the trace would warn,
 // not panic, so the real assertion is on node/edge membership below.

 let mut config = GatewayConfig::default();
 config.mempool_local_url = Some(server.url());
 let chain_data = Arc::new(chain_data_for(&config, 1));
 let orchestrator = TraceOrchestrator::new(chain_data);

 let graph = orchestrator
.trace_utxo(UtxoTraceRequest {
 txid: start_txid.clone(),
 vout: 0,
 hops_before: 2,
 hops_after: 0,
 include_coinjoin: false,
 confidence_threshold: 0.0,
 max_addresses_per_tx: 1_000,
 })
.await
.context("recursive trace through a coinjoin")?;

 ensure!(
 graph.index_of(gateway_types::NodeKind::Transaction, &coinjoin_txid).is_some(),
 "the coinjoin transaction itself should appear in the graph"
 );
 for addr in &participant_addresses {
 ensure!(
 graph.index_of(gateway_types::NodeKind::Address, addr).is_none(),
 "a depth-2 coinjoin input address leaked past the recursion barrier: {addr}"
 );
 }
 let coinjoin_edge_tagged = graph.edges.iter().any(|e| e.heuristic_tag.as_deref() == Some("coinjoin") && e.confidence < 0.5);
 ensure!(coinjoin_edge_tagged, "expected at least one low-confidence edge tagged as coinjoin");

 Ok(())
}

#[cfg(test)]
mod tests {
 use super::*;

 #[tokio::test]
 async fn s1_single_confirmed_tx_lookup_is_cached() {
 single_confirmed_tx_lookup_is_cached().await.unwrap();
 }

 #[tokio::test]
 async fn s2_batch_lookup_preserves_order_and_isolates_failures() {
 batch_lookup_preserves_order_and_isolates_failures().await.unwrap();
 }

 #[tokio::test]
 async fn s3_endpoint_adapts_concurrency_limit() {
 endpoint_adapts_concurrency_limit().await.unwrap();
 }

 #[tokio::test]
 async fn s4_transaction_lookup_fails_over_across_priority_tiers() {
 transaction_lookup_fails_over_across_priority_tiers().await.unwrap();
 }

 #[tokio::test]
 async fn s5_utxo_trace_bounds_large_fan_in() {
 utxo_trace_bounds_large_fan_in().await.unwrap();
 }

 #[tokio::test]
 async fn s6_address_stream_emits_events_in_order() {
 address_stream_emits_events_in_order().await.unwrap();
 }

 #[tokio::test]
 async fn s7_coinjoin_acts_as_a_recursion_barrier() {
 coinjoin_acts_as_a_recursion_barrier().await.unwrap();
 }
}
