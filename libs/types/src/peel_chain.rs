//! Peel-chain hop and aggregate statistics.

use serde::{Deserialize, Serialize};

/// A single hop in a peel chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeelChainHop {
 pub hop_number: u32,
 pub txid: String,
 pub payment_output_index: usize,
 pub payment_value: u64,
 pub payment_address: Option<String>,
 pub change_output_index: usize,
 pub change_value: u64,
 pub change_address: Option<String>,
 pub confidence: f64,
 pub timestamp: Option<i64>,
}

/// Qualitative classification of a peel chain's payment regularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeelPattern {
 Systematic,
 SemiSystematic,
 Variable,
 ShortChain,
}

/// Aggregate statistics over a detected peel chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeelChainStats {
 pub total_hops: usize,
 pub total_peeled: u64,
 pub remaining_value: u64,
 pub average_hop_time_secs: Option<f64>,
 pub average_confidence: f64,
 pub pattern: PeelPattern,
}
