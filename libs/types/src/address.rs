//! The normalized address summary.

use serde::{Deserialize, Serialize};

/// Balance and activity summary for a single address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
 pub address: String,
 pub confirmed_balance: i64,
 pub mempool_delta: i64,
 pub total_received: u64,
 pub total_sent: u64,
 pub tx_count: u64,
 /// Transactions containing an output to this address.
 pub receiving_count: u64,
 /// Transactions containing an input from this address.
 pub spending_count: u64,
}

impl Address {
 /// Detects a summary whose per-direction counts cannot possibly be
 /// right given the reported totals, independent of the funded/spent
 /// txo signal above.
 pub fn counts_look_wrong(&self) -> bool {
 self.tx_count > 0 && self.receiving_count == 0 && self.spending_count == 0
 }
}
