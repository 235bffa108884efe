//! CoinJoin detection and implementation classification.
//!
//! CoinJoin transactions break the common-input-ownership heuristic by
//! design: many participants contribute inputs and receive
//! equal-valued outputs in one transaction. Detection requires at
//! least 5 inputs, 3 outputs, and 3 outputs sharing the same value;
//! classification then narrows down to a known mixing implementation.

use std::collections::HashMap;

use gateway_types::{CoinJoinKind, CoinJoinRecord, Transaction};

const WHIRLPOOL_POOLS: [u64; 4] = [
 100_000, // 0.001 BTC
 1_000_000, // 0.01 BTC
 5_000_000, // 0.05 BTC
 50_000_000, // 0.5 BTC
];

const WASABI_DENOMINATION: u64 = 10_000_000; // 0.1 BTC
const WASABI_DENOMINATION_MIN: u64 = 5_000_000;
const WASABI_DENOMINATION_MAX: u64 = 50_000_000;

/// `detect_coinjoin(transaction) -> record | none`.
pub fn detect_coinjoin(transaction: &Transaction) -> Option<CoinJoinRecord> {
 if transaction.inputs.len() < 5 || transaction.outputs.len() < 3 {
 return None;
 }

 let mut value_counts: HashMap<u64, Vec<usize>> = HashMap::new();
 for output in &transaction.outputs {
 value_counts.entry(output.value).or_default().push(output.n as usize);
 }

 let (equal_value, equal_indices) = value_counts
.into_iter()
.max_by_key(|(_, indices)| indices.len())?;

 if equal_indices.len() < 3 {
 return None;
 }

 let (kind, confidence) = classify(transaction, equal_value, equal_indices.len());

 let change_output_indices = transaction
.outputs
.iter()
.filter(|o| o.value != equal_value)
.map(|o| o.n as usize)
.collect();

 Some(CoinJoinRecord {
 kind,
 confidence,
 num_participants: equal_indices.len(),
 equal_output_value: equal_value,
 equal_output_count: equal_indices.len(),
 change_output_indices,
 })
}

fn classify(transaction: &Transaction, equal_value: u64, equal_count: usize) -> (CoinJoinKind, f64) {
 if WHIRLPOOL_POOLS.contains(&equal_value) {
 return if equal_count == 5 {
 (CoinJoinKind::Whirlpool, 0.95)
 } else {
 (CoinJoinKind::Whirlpool, 0.85)
 };
 }

 if is_wasabi_pattern(transaction, equal_value, equal_count) {
 return (CoinJoinKind::Wasabi, 0.9);
 }

 if is_joinmarket_pattern(transaction) {
 return (CoinJoinKind::JoinMarket, 0.8);
 }

 (CoinJoinKind::Generic, 0.75)
}

fn is_wasabi_pattern(transaction: &Transaction, equal_value: u64, equal_count: usize) -> bool {
 let denomination_ok = equal_value == WASABI_DENOMINATION
 || (WASABI_DENOMINATION_MIN..=WASABI_DENOMINATION_MAX).contains(&equal_value);
 if !denomination_ok {
 return false;
 }
 if equal_count < 10 {
 return false;
 }
 let threshold = (equal_value as f64) * 0.01;
 transaction.outputs.iter().any(|o| (o.value as f64) < threshold)
}

fn is_joinmarket_pattern(transaction: &Transaction) -> bool {
 if transaction.locktime > 0 {
 return true;
 }
 let values: Vec<u64> = transaction.outputs.iter().map(|o| o.value).collect();
 let unique: std::collections::HashSet<u64> = values.iter().copied().collect();
 (unique.len() as f64) > (values.len() as f64) * 0.5
}

/// Addresses receiving one of the equal-valued outputs — the
/// participant set of a detected CoinJoin.
pub fn participating_addresses(transaction: &Transaction, record: &CoinJoinRecord) -> Vec<String> {
 transaction
.outputs
.iter()
.filter(|o| o.value == record.equal_output_value)
.filter_map(|o| o.address.clone())
.collect()
}

#[cfg(test)]
mod tests {
 use super::*;
 use gateway_types::{Input, Output, ScriptType};

 fn input() -> Input {
 Input {
 prev_txid: "a".repeat(64),
 prev_vout: 0,
 sequence: 0xffff_ffff,
 prev_address: None,
 prev_value: Some(1_000_000),
 prev_script_type: None,
 script_sig: None,
 witness: vec![],
 }
 }

 fn output(n: u32, value: u64) -> Output {
 Output {
 n,
 value,
 script_pubkey: vec![],
 address: Some(format!("addr{n}")),
 script_type: ScriptType::P2wpkh,
 spent: None,
 spending_txid: None,
 }
 }

 fn tx(num_inputs: usize, outputs: Vec<Output>, locktime: u32) -> Transaction {
 Transaction {
 txid: "tx".into(),
 version: 2,
 locktime,
 size: 1000,
 vsize: 800,
 weight: 3200,
 fee: Some(5000),
 block_height: Some(800_000),
 block_hash: None,
 block_time: None,
 inputs: (0..num_inputs).map(|_| input()).collect(),
 outputs,
 }
 }

 #[test]
 fn too_few_inputs_is_not_a_coinjoin() {
 let t = tx(2, vec![output(0, 100_000); 3], 0);
 assert!(detect_coinjoin(&t).is_none());
 }

 #[test]
 fn whirlpool_pool_size_with_five_equal_outputs_is_high_confidence() {
 let mut outputs: Vec<Output> = (0..5).map(|i| output(i, 100_000)).collect();
 outputs.push(output(5, 2_000));
 let t = tx(5, outputs, 0);
 let record = detect_coinjoin(&t).unwrap();
 assert_eq!(record.kind, CoinJoinKind::Whirlpool);
 assert_eq!(record.confidence, 0.95);
 assert_eq!(record.num_participants, 5);
 }

 #[test]
 fn wasabi_pattern_needs_ten_equal_outputs_and_a_small_output() {
 let mut outputs: Vec<Output> = (0..10).map(|i| output(i, WASABI_DENOMINATION)).collect();
 outputs.push(output(10, 1_000));
 let t = tx(10, outputs, 0);
 let record = detect_coinjoin(&t).unwrap();
 assert_eq!(record.kind, CoinJoinKind::Wasabi);
 }

 #[test]
 fn joinmarket_pattern_detected_via_nonzero_locktime() {
 let mut outputs: Vec<Output> = (0..3).map(|i| output(i, 333_333)).collect();
 outputs.push(output(3, 77_777));
 outputs.push(output(4, 11_111));
 let t = tx(5, outputs, 600_000);
 let record = detect_coinjoin(&t).unwrap();
 assert_eq!(record.kind, CoinJoinKind::JoinMarket);
 }

 #[test]
 fn participating_addresses_are_the_equal_value_outputs() {
 let mut outputs: Vec<Output> = (0..5).map(|i| output(i, 100_000)).collect();
 outputs.push(output(5, 2_000));
 let t = tx(5, outputs, 0);
 let record = detect_coinjoin(&t).unwrap();
 let addresses = participating_addresses(&t, &record);
 assert_eq!(addresses.len(), 5);
 }
}
