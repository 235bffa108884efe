//! Change-output detection.
//!
//! Combines five signals into a single change probability per output,
//! starting neutral at 0.5: address reuse and round amounts
//! multiplicatively *decrease* it (a reused or round-valued output looks
//! like a payment, not change), while script-type matching, the
//! optimal-change heuristic, and wallet fingerprinting boost it toward 1.

use std::collections::{HashMap, HashSet};

use gateway_types::{ScriptType, Transaction};
use serde::{Deserialize, Serialize};

/// Round BTC amounts a payer is likely to have typed in by hand.
const ROUND_BTC_AMOUNTS: [f64; 9] = [0.001, 0.01, 0.1, 0.5, 1.0, 5.0, 10.0, 50.0, 100.0];
const SATS_PER_BTC: f64 = 100_000_000.0;
const ROUND_AMOUNT_EPSILON: f64 = 1e-6;

/// Which signal produced a score, kept as a tagged variant rather than
/// an open-ended string map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeHeuristic {
 AddressReuse,
 RoundAmount,
 ScriptTypeMatch,
 OptimalChange,
 WalletPattern,
}

/// The per-output breakdown and the winning output of a change-detection
/// pass over one transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeDetectionResult {
 pub output_index: usize,
 pub confidence: f64,
 pub breakdown: Vec<(ChangeHeuristic, f64)>,
}

/// Holds the address-reuse memory the heuristic needs across a trace
/// invocation. No I/O: the orchestrator feeds it addresses it has
/// already resolved from fetched transactions.
#[derive(Debug, Default)]
pub struct ChangeDetector {
 seen_addresses: HashSet<String>,
}

impl ChangeDetector {
 pub fn new() -> Self {
 Self::default()
 }

 /// Record that `address` has appeared in a transaction the caller
 /// has already observed, so a later reuse can be detected.
 pub fn observe_address(&mut self, address: &str) {
 self.seen_addresses.insert(address.to_string());
 }

 /// Identify the most likely change output in `transaction`. Returns
 /// `None` for single-output transactions, which carry no change by
 /// definition.
 pub fn identify_change_output(&self, transaction: &Transaction) -> Option<ChangeDetectionResult> {
 if transaction.outputs.len() < 2 {
 return None;
 }

 let mut scores: Vec<HashMap<ChangeHeuristic, f64>> =
 vec![HashMap::new(); transaction.outputs.len()];

 for (i, output) in transaction.outputs.iter().enumerate() {
 if let Some(address) = &output.address {
 let reuse = self.address_reuse_score(address);
 if reuse > 0.0 {
 scores[i].insert(ChangeHeuristic::AddressReuse, reuse);
 }
 }
 let round = round_amount_score(output.value);
 if round > 0.0 {
 scores[i].insert(ChangeHeuristic::RoundAmount, round);
 }
 }

 for (i, score) in script_type_match_scores(transaction) {
 scores[i].insert(ChangeHeuristic::ScriptTypeMatch, score);
 }
 for (i, score) in optimal_change_scores(transaction) {
 scores[i].insert(ChangeHeuristic::OptimalChange, score);
 }
 for (i, score) in wallet_pattern_scores(transaction) {
 scores[i].insert(ChangeHeuristic::WalletPattern, score);
 }

 let mut best_idx = 0usize;
 let mut best_prob = f64::MIN;
 for (i, per_output) in scores.iter().enumerate() {
 let mut prob = 0.5f64;
 if let Some(score) = per_output.get(&ChangeHeuristic::AddressReuse) {
 prob *= 1.0 - score;
 }
 if let Some(score) = per_output.get(&ChangeHeuristic::RoundAmount) {
 prob *= 1.0 - score;
 }
 if let Some(score) = per_output.get(&ChangeHeuristic::ScriptTypeMatch) {
 prob += (1.0 - prob) * score;
 }
 if let Some(score) = per_output.get(&ChangeHeuristic::OptimalChange) {
 prob += (1.0 - prob) * score;
 }
 if let Some(score) = per_output.get(&ChangeHeuristic::WalletPattern) {
 prob += (1.0 - prob) * score;
 }
 if prob > best_prob {
 best_prob = prob;
 best_idx = i;
 }
 }

 let breakdown = scores[best_idx]
.iter()
.map(|(heuristic, score)| (*heuristic, *score))
.collect();

 Some(ChangeDetectionResult {
 output_index: best_idx,
 confidence: best_prob,
 breakdown,
 })
 }

 fn address_reuse_score(&self, address: &str) -> f64 {
 if self.seen_addresses.contains(address) {
 0.95
 } else {
 0.0
 }
 }
}

/// Round BTC amount detection: exact match against a known "typed by a
/// human" list scores 0.7; fewer than two decimal places (in BTC) scores
/// 0.6; otherwise 0.
fn round_amount_score(value_sats: u64) -> f64 {
 let btc = value_sats as f64 / SATS_PER_BTC;
 for candidate in ROUND_BTC_AMOUNTS {
 if (btc - candidate).abs() < ROUND_AMOUNT_EPSILON {
 return 0.7;
 }
 }
 let rounded = (btc * 100.0).round() / 100.0;
 if (btc - rounded).abs() < ROUND_AMOUNT_EPSILON {
 return 0.6;
 }
 0.0
}

/// Output whose script type matches any input's resolved prevout script
/// type — change typically returns to the same wallet, same address
/// type.
fn script_type_match_scores(transaction: &Transaction) -> Vec<(usize, f64)> {
 let input_types: HashSet<ScriptType> =
 transaction.inputs.iter().filter_map(|i| i.prev_script_type).collect();
 if input_types.is_empty() {
 return Vec::new();
 }
 transaction
.outputs
.iter()
.enumerate()
.filter(|(_, output)| input_types.contains(&output.script_type))
.map(|(i, _)| (i, 0.8))
.collect()
}

/// Optimal-change heuristic, 2-output transactions only: if removing any
/// single input still covers the total output value, that input was
/// unnecessary and the smaller output is likely change.
/// Intentionally not extended to >2-output transactions — see the
/// crate-level docs.
fn optimal_change_scores(transaction: &Transaction) -> Vec<(usize, f64)> {
 if transaction.outputs.len() != 2 {
 return Vec::new();
 }
 let total_in: u64 = transaction.inputs.iter().filter_map(|i| i.prev_value).sum();
 let total_out = transaction.total_output_value();
 if total_in == 0 {
 return Vec::new();
 }

 let unnecessary_input_exists = transaction
.inputs
.iter()
.filter_map(|i| i.prev_value)
.any(|value| total_in.saturating_sub(value) >= total_out);

 if !unnecessary_input_exists {
 return Vec::new();
 }

 let smaller_idx = if transaction.outputs[0].value > transaction.outputs[1].value {
 1
 } else {
 0
 };
 vec![(smaller_idx, 0.75)]
}

/// BIP69-ordered 2-output transactions give output index 1 a mild
/// change preference, matching a common wallet convention.
fn wallet_pattern_scores(transaction: &Transaction) -> Vec<(usize, f64)> {
 if transaction.outputs.len() != 2 {
 return Vec::new();
 }
 let mut sorted: Vec<&gateway_types::Output> = transaction.outputs.iter().collect();
 sorted.sort_by(|a, b| a.value.cmp(&b.value).then_with(|| a.script_pubkey.cmp(&b.script_pubkey)));
 let is_bip69 = sorted
.iter()
.zip(transaction.outputs.iter())
.all(|(sorted_out, actual)| sorted_out.n == actual.n);
 if is_bip69 {
 vec![(1, 0.55)]
 } else {
 Vec::new()
 }
}
