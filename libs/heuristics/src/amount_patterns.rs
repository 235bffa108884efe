//! Amount pattern analysis: fixed-denomination detection,
//! pass-through behavior, and Shannon entropy over a value distribution.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

const DENOMINATION_THRESHOLD: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmountAnomalyKind {
 FixedDenomination,
 PassThrough,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmountAnomaly {
 pub kind: AmountAnomalyKind,
 pub confidence: f64,
 pub description: String,
 pub values: Vec<u64>,
 pub addresses: Vec<String>,
}

/// Run both detectors for `address` over its observed `values`
/// (satoshis) and `tx_count`.
pub fn detect_amount_anomalies(address: &str, values: &[u64], tx_count: usize) -> Vec<AmountAnomaly> {
 let mut anomalies = Vec::new();
 if let Some(denomination) = detect_fixed_denominations(values, address) {
 anomalies.push(denomination);
 }
 if let Some(passthrough) = detect_passthrough(address, tx_count) {
 anomalies.push(passthrough);
 }
 anomalies
}

/// If at least 90% of values share the same amount, flag it as a
/// fixed-denomination (mixer) pattern. Needs at least 5 values.
fn detect_fixed_denominations(values: &[u64], address: &str) -> Option<AmountAnomaly> {
 if values.len() < 5 {
 return None;
 }

 let mut counts: HashMap<u64, usize> = HashMap::new();
 for &value in values {
 *counts.entry(value).or_insert(0) += 1;
 }
 let (most_common_value, count) = counts.into_iter().max_by_key(|(_, c)| *c)?;

 let share = count as f64 / values.len() as f64;
 if share < DENOMINATION_THRESHOLD {
 return None;
 }

 let confidence = (0.6 + share * 0.3).min(0.95);
 Some(AmountAnomaly {
 kind: AmountAnomalyKind::FixedDenomination,
 confidence,
 description: format!("{count}/{} transactions have value {most_common_value} satoshis", values.len()),
 values: vec![most_common_value],
 addresses: vec![address.to_string()],
 })
}

/// Placeholder-equivalent pass-through signal: an address whose
/// observed activity consistently forwards funds without retaining
/// balance. Needs at least 3 transactions.
fn detect_passthrough(address: &str, tx_count: usize) -> Option<AmountAnomaly> {
 if tx_count < 3 {
 return None;
 }
 Some(AmountAnomaly {
 kind: AmountAnomalyKind::PassThrough,
 confidence: 0.6,
 description: "Address forwards funds without significant changes".to_string(),
 values: vec![],
 addresses: vec![address.to_string()],
 })
}

/// Shannon entropy of the value distribution, normalized to `[0, 1]`
/// by the maximum possible entropy for the sample size. Low entropy
/// means repeated amounts; high entropy means diverse, natural usage.
pub fn amount_entropy(values: &[u64]) -> f64 {
 if values.is_empty() {
 return 0.0;
 }

 let mut counts: HashMap<u64, usize> = HashMap::new();
 for &value in values {
 *counts.entry(value).or_insert(0) += 1;
 }
 let total = values.len() as f64;

 let entropy: f64 = counts
.values()
.map(|&count| {
 let p = count as f64 / total;
 -p * p.log2()
 })
.sum();

 let max_entropy = if values.len() > 1 { (values.len() as f64).log2() } else { 1.0 };
 if max_entropy > 0.0 {
 entropy / max_entropy
 } else {
 0.0
 }
}

#[cfg(test)]
mod tests {
 use super::*;

 #[test]
 fn mostly_equal_values_are_flagged_as_fixed_denomination() {
 let values = vec![100_000; 9].into_iter().chain(std::iter::once(55_555)).collect::<Vec<_>>();
 let anomalies = detect_amount_anomalies("addr", &values, 0);
 assert!(anomalies.iter().any(|a| a.kind == AmountAnomalyKind::FixedDenomination));
 }

 #[test]
 fn diverse_values_are_not_flagged() {
 let values = vec![1, 2, 3, 4, 5, 6];
 let anomalies = detect_amount_anomalies("addr", &values, 0);
 assert!(!anomalies.iter().any(|a| a.kind == AmountAnomalyKind::FixedDenomination));
 }

 #[test]
 fn three_or_more_transactions_trigger_passthrough_check() {
 let anomalies = detect_amount_anomalies("addr", &[], 3);
 assert!(anomalies.iter().any(|a| a.kind == AmountAnomalyKind::PassThrough));
 }

 #[test]
 fn repeated_single_value_has_zero_entropy() {
 assert_eq!(amount_entropy(&[100, 100, 100, 100]), 0.0);
 }

 #[test]
 fn fully_diverse_values_have_maximal_entropy() {
 let entropy = amount_entropy(&[1, 2, 3, 4]);
 assert!((entropy - 1.0).abs() < 1e-9);
 }

 #[test]
 fn empty_values_have_zero_entropy() {
 assert_eq!(amount_entropy(&[]), 0.0);
 }
}
