//! Peel-chain detection.
//!
//! A peel chain is a sequence of transactions where a large UTXO
//! repeatedly splits into a small payment and a large change output,
//! with the change output spent again in the next hop. Each hop is
//! scored independently; the caller walks the chain by following
//! `change_output.spending_txid`.

use gateway_types::{PeelChainHop, PeelChainStats, PeelPattern, Transaction};

use crate::change_detection::ChangeDetector;

const MIN_PEEL_RATIO: f64 = 0.05;
const MAX_PEEL_RATIO: f64 = 0.95;

/// `analyze_peel_hop(transaction, hop_number) -> hop | none` (spec
/// §4.6). Only transactions with exactly two outputs and at least one
/// input can be a peel hop.
pub fn analyze_peel_hop(
 transaction: &Transaction,
 hop_number: u32,
 change_detector: &ChangeDetector,
) -> Option<PeelChainHop> {
 if transaction.outputs.len() != 2 || transaction.inputs.is_empty() {
 return None;
 }

 let output0 = &transaction.outputs[0];
 let output1 = &transaction.outputs[1];
 let total_out = output0.value + output1.value;
 if total_out == 0 {
 return None;
 }

 let ratio0 = output0.value as f64 / total_out as f64;
 let ratio1 = output1.value as f64 / total_out as f64;

 let (payment_idx, change_idx, payment_ratio, change_ratio) = if ratio0 < ratio1 {
 (0usize, 1usize, ratio0, ratio1)
 } else {
 (1usize, 0usize, ratio1, ratio0)
 };

 if payment_ratio > 0.5 {
 return None;
 }

 let mut confidence = if payment_ratio < MIN_PEEL_RATIO && change_ratio > MAX_PEEL_RATIO {
 0.95
 } else if payment_ratio < 0.1 {
 0.85
 } else if payment_ratio < 0.2 {
 0.75
 } else {
 0.65
 };

 if let Some(result) = change_detector.identify_change_output(transaction) {
 if result.output_index == change_idx {
 confidence = (confidence * 1.1).min(0.99);
 }
 }

 let payment_output = &transaction.outputs[payment_idx];
 let change_output = &transaction.outputs[change_idx];

 Some(PeelChainHop {
 hop_number,
 txid: transaction.txid.clone(),
 payment_output_index: payment_idx,
 payment_value: payment_output.value,
 payment_address: payment_output.address.clone(),
 change_output_index: change_idx,
 change_value: change_output.value,
 change_address: change_output.address.clone(),
 confidence,
 timestamp: transaction.block_time,
 })
}

/// Summarize a fully-walked chain of hops. Returns `None`
/// for an empty chain.
pub fn chain_statistics(chain: &[PeelChainHop]) -> Option<PeelChainStats> {
 if chain.is_empty() {
 return None;
 }

 let total_peeled: u64 = chain.iter().map(|h| h.payment_value).sum();
 let remaining_value = chain.last().map(|h| h.change_value).unwrap_or(0);

 let timestamps: Vec<i64> = chain.iter().filter_map(|h| h.timestamp).collect();
 let average_hop_time_secs = if timestamps.len() > 1 {
 let diffs: Vec<i64> = timestamps.windows(2).map(|w| w[1] - w[0]).collect();
 Some(diffs.iter().sum::<i64>() as f64 / diffs.len() as f64)
 } else {
 None
 };

 let average_confidence = chain.iter().map(|h| h.confidence).sum::<f64>() / chain.len() as f64;

 Some(PeelChainStats {
 total_hops: chain.len(),
 total_peeled,
 remaining_value,
 average_hop_time_secs,
 average_confidence,
 pattern: classify_pattern(chain),
 })
}

/// Classify payment regularity across a chain's hops:
/// chains of two hops or fewer are "short"; longer chains are
/// classified by the relative variance of their payment values.
fn classify_pattern(chain: &[PeelChainHop]) -> PeelPattern {
 if chain.len() <= 2 {
 return PeelPattern::ShortChain;
 }

 let payments: Vec<f64> = chain.iter().map(|h| h.payment_value as f64).collect();
 let avg_payment = payments.iter().sum::<f64>() / payments.len() as f64;
 let variance =
 payments.iter().map(|v| (v - avg_payment).powi(2)).sum::<f64>() / payments.len() as f64;
 let relative_variance = if avg_payment > 0.0 {
 variance / avg_payment.powi(2)
 } else {
 0.0
 };

 if relative_variance < 0.1 {
 PeelPattern::Systematic
 } else if relative_variance < 0.5 {
 PeelPattern::SemiSystematic
 } else {
 PeelPattern::Variable
 }
}
