//! CoinJoin classification record.

use serde::{Deserialize, Serialize};

/// The mixing implementation a CoinJoin transaction appears to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoinJoinKind {
 Wasabi,
 Whirlpool,
 JoinMarket,
 Generic,
 Unknown,
}

/// Detection result for a single transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinJoinRecord {
 pub kind: CoinJoinKind,
 pub confidence: f64,
 pub num_participants: usize,
 pub equal_output_value: u64,
 pub equal_output_count: usize,
 /// Output indices whose value differs from the common value — the
 /// likely change/fee outputs.
 pub change_output_indices: Vec<usize>,
}
