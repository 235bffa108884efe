//! `ChainDataService`: the chain-semantic fetchers callers actually use
//!. Wires the failover driver, cache, dedup, normalization,
//! and endpoint preference together; nothing above this layer ever
//! touches raw upstream JSON.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use endpoint_pool::FailoverDriver;
use gateway_cache::{keys, ChainCache};
use gateway_config::GatewayConfig;
use gateway_types::{Address, EndpointPriority, GatewayError, Transaction};
use serde_json::Value;
use tracing::{error, warn};

use crate::dedup::dedupe_preserve_order;
use crate::error::Result;
use crate::normalize::{normalize_address_summary, normalize_transaction};
use crate::preference::SummaryPreference;

const ADDRESS_PRIORITIES: [EndpointPriority; 3] =
 [EndpointPriority::Local, EndpointPriority::Additional, EndpointPriority::Public];

/// Consecutive all-duplicate pages before giving up on a pagination walk.
/// Not named by an upstream constant; chosen to match the "a few retries,
/// then stop" shape the rest of this codebase uses for similar loops.
const MAX_RETRIES_FOR_DUPES: u32 = 3;
const PAGE_SAFETY_LIMIT: u32 = 200;
const BACKFILL_CAP: u64 = 500;
const DEFAULT_HISTORY_FALLBACK: usize = 500;
const COMPACT_PAGE_SIZE: usize = 10;

pub struct ChainDataService<C: ChainCache> {
 driver: FailoverDriver,
 cache: Arc<C>,
 preference: SummaryPreference,
 ttl_transaction: Duration,
 ttl_address_history: Duration,
 default_page_size: u32,
}

impl<C: ChainCache> ChainDataService<C> {
 pub fn new(driver: FailoverDriver, cache: Arc<C>, config: &GatewayConfig) -> Self {
 ChainDataService {
 driver,
 cache,
 preference: SummaryPreference::new(),
 ttl_transaction: Duration::from_secs(config.cache.ttl_transaction_secs),
 ttl_address_history: Duration::from_secs(config.cache.ttl_address_history_secs),
 default_page_size: config.mempool_default_page_size,
 }
 }

 /// Exposes the underlying failover driver for operational
 /// introspection routes (`/metrics/mempool`, `/servers/*`, spec
 /// §6) that need endpoint snapshots this service does not itself
 /// surface.
 pub fn driver(&self) -> &FailoverDriver {
 &self.driver
 }

 /// `fetch_transaction(txid) → Transaction`. A cached
 /// record is only honored with `block_height != null` — mempool-state
 /// entries are always treated as a miss.
 ///
 /// Uses `EndpointPriority::Public` as the router ceiling so a single
 /// lookup is free to fail over across every tier: the ranking in
 /// `Router::choose` already favors priority 0 when it is healthy, so
 /// this only matters once priority 0 starts failing.
 pub async fn fetch_transaction(&self, txid: &str) -> Result<Transaction> {
 let cache_key = keys::transaction(txid);
 if let Some(cached) = self.cache.get_json::<Transaction>(&cache_key).await {
 if cached.block_height.is_some() {
 return Ok(cached);
 }
 }

 let path = format!("/tx/{txid}");
 let body = self.driver.request_with_failover(&path, EndpointPriority::Public).await;
 let Some(raw) = body else {
 return Err(GatewayError::AllUpstreamsFailed { path }.into());
 };

 let tx = normalize_transaction(&raw)?;
 self.cache.set_json(&cache_key, &tx, self.ttl_transaction).await;
 Ok(tx)
 }

 /// `fetch_transactions_batch(txids) → [Transaction | null]`,
 /// order- and duplicate-preserving.
 /// Duplicated txids in the input share the same `Arc` in the output,
 /// giving callers pointer-equality for free.
 pub async fn fetch_transactions_batch(&self, txids: &[String]) -> Vec<Option<Arc<Transaction>>> {
 let (unique, mapping) = dedupe_preserve_order(txids);
 let mut slots: Vec<Option<Arc<Transaction>>> = vec![None; unique.len()];
 let mut to_fetch = Vec::new();

 for (i, txid) in unique.iter().enumerate() {
 let cache_key = keys::transaction(txid);
 if let Some(cached) = self.cache.get_json::<Transaction>(&cache_key).await {
 if cached.block_height.is_some() {
 slots[i] = Some(Arc::new(cached));
 continue;
 }
 }
 to_fetch.push(i);
 }

 if !to_fetch.is_empty() {
 let driver = &self.driver;
 let fetches = to_fetch.iter().map(|&i| {
 let txid = unique[i].clone();
 async move {
 let body = driver.request_with_failover(&format!("/tx/{txid}"), EndpointPriority::Public).await;
 (i, txid, body)
 }
 });
 let results = futures::future::join_all(fetches).await;

 let mut failed_txids = Vec::new();
 for (i, txid, body) in results {
 match body.and_then(|raw| normalize_transaction(&raw).ok()) {
 Some(tx) => {
 let cache_key = keys::transaction(&txid);
 self.cache.set_json(&cache_key, &tx, self.ttl_transaction).await;
 slots[i] = Some(Arc::new(tx));
 }
 None => failed_txids.push(txid),
 }
 }

 self.log_batch_failures(to_fetch.len(), &failed_txids);
 }

 mapping.into_iter().map(|idx| slots[idx].clone()).collect()
 }

 fn log_batch_failures(&self, attempted: usize, failed_txids: &[String]) {
 let failed = failed_txids.len();
 if failed == 0 {
 return;
 }
 let ratio = failed as f64 / attempted as f64;
 if ratio > 0.5 {
 error!(
 failed,
 attempted,
 sample = ?failed_txids.iter().take(5).collect::<Vec<_>>(),
 "systemic failure fetching transaction batch"
 );
 } else if failed > 10 {
 warn!(
 failed,
 attempted,
 sample = ?failed_txids.iter().take(3).collect::<Vec<_>>(),
 "many transactions failed to fetch in batch"
 );
 } else {
 for txid in failed_txids {
 warn!(%txid, "failed to fetch transaction");
 }
 }
 }

 /// `fetch_address_history(address, max_results?) → [txid]` (spec
 /// §4.5). Bypasses the cache whenever `max_results` is given.
 pub async fn fetch_address_history(&self, address: &str, max_results: Option<usize>) -> Vec<String> {
 let cache_key = keys::address_history(address);
 if max_results.is_none() {
 if let Some(cached) = self.cache.get_json::<Vec<String>>(&cache_key).await {
 return cached;
 }
 }

 let expected_total = self.address_expected_total(address).await;
 let fetch_limit = max_results.unwrap_or_else(|| expected_total.unwrap_or(DEFAULT_HISTORY_FALLBACK));

 let mut best: Vec<String> = Vec::new();
 for priority in ADDRESS_PRIORITIES {
 let txids = self.paginate_address_txids(address, priority, fetch_limit, expected_total).await;
 if txids.is_empty() {
 continue;
 }
 if txids.len() > best.len() {
 best = txids.clone();
 }

 let reached_expected = expected_total.is_some_and(|et| et <= fetch_limit && txids.len() >= et);
 if reached_expected || txids.len() >= fetch_limit {
 if max_results.is_none() {
 self.cache.set_json(&cache_key, &txids, self.ttl_address_history).await;
 }
 return txids;
 }
 }

 if best.is_empty() {
 warn!(address, "address returned 0 txs from all endpoints, not caching");
 return best;
 }

 if let Some(et) = expected_total {
 if best.len() < et {
 warn!(address, collected = best.len(), expected = et, "address history is partial");
 }
 }
 if max_results.is_none() {
 self.cache.set_json(&cache_key, &best, self.ttl_address_history).await;
 }
 best
 }

 /// Walks priorities 0, 1, 2 for an address summary and derives
 /// `expected_total` from `chain_stats.tx_count + mempool_stats.tx_count`
 ///. Also records the compact-summary penalty against
 /// whichever endpoint served the response.
 async fn address_expected_total(&self, address: &str) -> Option<usize> {
 let path = format!("/address/{address}");
 for priority in ADDRESS_PRIORITIES {
 let preference = &self.preference;
 let served = self
.driver
.request_with_failover_weighted(&path, priority, |name| preference.penalty_of(name))
.await;
 if let Some((raw, endpoint_name)) = served {
 let summary = normalize_address_summary(address, &raw);
 if summary.counts_look_wrong() {
 self.preference.record_compact(&endpoint_name);
 } else {
 self.preference.record_clean(&endpoint_name);
 }
 return Some(summary.tx_count as usize);
 }
 }
 None
 }

 /// Paginates `/address/{address}/txs`, collecting unique txids, per
 /// the stopping conditions in : expected total reached,
 /// `max_results` reached, too many consecutive all-duplicate pages,
 /// offset running away from `max_results`, or the page-count safety
 /// net.
 async fn paginate_address_txids(
 &self,
 address: &str,
 priority: EndpointPriority,
 max_results: usize,
 expected_total: Option<usize>,
 ) -> Vec<String> {
 let effective_max = expected_total.map_or(max_results, |et| max_results.min(et));
 let page_size_limit = (self.default_page_size.max(1) as usize).min(effective_max.max(1));

 let mut collected = Vec::new();
 let mut seen = HashSet::new();
 let mut after_txid: Option<String> = None;
 let mut offset = 0usize;
 let mut page = 0u32;
 let mut consecutive_dupe_pages = 0u32;

 while collected.len() < effective_max {
 let remaining = effective_max - collected.len();
 let limit = remaining.min(page_size_limit);
 let path = match &after_txid {
 Some(after) => format!("/address/{address}/txs?limit={limit}&after_txid={after}"),
 None => format!("/address/{address}/txs?limit={limit}"),
 };

 let preference = &self.preference;
 let served = self
.driver
.request_with_failover_weighted(&path, priority, |name| preference.penalty_of(name))
.await;
 let Some((raw, endpoint_name)) = served else {
 break;
 };
 let Some(entries) = raw.as_array() else {
 break;
 };
 if entries.is_empty() {
 break;
 }

 if entries.len() == COMPACT_PAGE_SIZE && page_size_limit > COMPACT_PAGE_SIZE {
 self.preference.record_compact(&endpoint_name);
 } else {
 self.preference.record_clean(&endpoint_name);
 }

 let mut new_count = 0;
 for entry in entries {
 if let Some(txid) = entry.get("txid").and_then(Value::as_str) {
 if seen.insert(txid.to_string()) {
 collected.push(txid.to_string());
 new_count += 1;
 }
 }
 }

 if let Some(last_txid) = entries.last().and_then(|e| e.get("txid")).and_then(Value::as_str) {
 after_txid = Some(last_txid.to_string());
 }

 offset += entries.len();
 page += 1;
 consecutive_dupe_pages = if new_count == 0 { consecutive_dupe_pages + 1 } else { 0 };

 if consecutive_dupe_pages >= MAX_RETRIES_FOR_DUPES
 || collected.len() >= effective_max
 || offset > max_results * 2
 || page >= PAGE_SAFETY_LIMIT
 {
 break;
 }
 }

 collected
 }

 /// `fetch_address_info(address, max_transactions?) → Address` (spec
 /// §4.5). Backfills receiving/spending counts by sampling raw
 /// transactions when the summary looks compact.
 pub async fn fetch_address_info(&self, address: &str, max_transactions: Option<u64>) -> Result<Address> {
 let path = format!("/address/{address}");
 let body = self.driver.request_with_failover(&path, EndpointPriority::Public).await;
 let Some(raw) = body else {
 return Err(GatewayError::AllUpstreamsFailed { path }.into());
 };

 let mut summary = normalize_address_summary(address, &raw);
 let cap = max_transactions.unwrap_or(BACKFILL_CAP).min(BACKFILL_CAP);
 let needs_backfill = summary.tx_count > 0
 && cap > 0
 && (summary.counts_look_wrong() || (summary.total_received == 0 && summary.total_sent == 0));

 if needs_backfill {
 match self.estimate_address_stats_from_txs(address, cap).await {
 Some((receiving_count, spending_count)) => {
 summary.receiving_count = receiving_count;
 summary.spending_count = spending_count;
 }
 None => {
 warn!(address, tx_count = summary.tx_count, "address backfill failed, counts may remain zero");
 }
 }
 }

 Ok(summary)
 }

 /// Derives receiving/spending counts directly from raw transactions
 /// when the address summary is compact.
 async fn estimate_address_stats_from_txs(&self, address: &str, cap: u64) -> Option<(u64, u64)> {
 if cap == 0 {
 return None;
 }

 let mut receiving_txids = HashSet::new();
 let mut spending_txids = HashSet::new();
 let mut processed = 0u64;

 for _attempt in 0..3 {
 if processed > 0 {
 break;
 }

 let mut after_txid: Option<String> = None;
 let mut collected = 0u64;

 loop {
 if collected >= cap {
 break;
 }
 let limit = (cap - collected).min(self.default_page_size as u64).max(1);
 let path = match &after_txid {
 Some(after) => format!("/address/{address}/txs?limit={limit}&after_txid={after}"),
 None => format!("/address/{address}/txs?limit={limit}"),
 };

 let body = self.driver.request_with_failover(&path, EndpointPriority::Public).await;
 let Some(raw) = body else {
 break;
 };
 let Some(entries) = raw.as_array() else {
 break;
 };
 if entries.is_empty() {
 break;
 }

 for entry in entries {
 processed += 1;
 collected += 1;
 let txid = entry.get("txid").and_then(Value::as_str);

 if let Some(vouts) = entry.get("vout").and_then(Value::as_array) {
 for vout in vouts {
 if vout.get("scriptpubkey_address").and_then(Value::as_str) == Some(address) {
 if let Some(txid) = txid {
 receiving_txids.insert(txid.to_string());
 }
 }
 }
 }
 if let Some(vins) = entry.get("vin").and_then(Value::as_array) {
 for vin in vins {
 let spends_from = vin
.get("prevout")
.and_then(|p| p.get("scriptpubkey_address"))
.and_then(Value::as_str);
 if spends_from == Some(address) {
 if let Some(txid) = txid {
 spending_txids.insert(txid.to_string());
 }
 }
 }
 }
 }

 match entries.last().and_then(|e| e.get("txid")).and_then(Value::as_str) {
 Some(last_txid) => after_txid = Some(last_txid.to_string()),
 None => break,
 }
 }
 }

 if processed == 0 {
 return None;
 }
 Some((receiving_txids.len() as u64, spending_txids.len() as u64))
 }
}
