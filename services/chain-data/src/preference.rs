//! Endpoint preference for address-summary requests.
//!
//! When an endpoint returns a compact summary for an address with known
//! history, it is penalized so the router deprioritizes it for *future*
//! summary requests; a later clean response decays the penalty. This is
//! advisory bookkeeping layered on top of C5's shared ranking — it never
//! overrides priority-tier ordering, only breaks ties within a tier.

use std::collections::HashMap;

use parking_lot::Mutex;

const MAX_PENALTY: i32 = 10;
const COMPACT_PENALTY: i32 = 1;
const CLEAN_DECAY: i32 = 2;

#[derive(Default)]
pub struct SummaryPreference {
 penalties: Mutex<HashMap<String, i32>>,
}

impl SummaryPreference {
 pub fn new() -> Self {
 Self::default()
 }

 pub fn penalty_of(&self, endpoint_name: &str) -> i32 {
 *self.penalties.lock().get(endpoint_name).unwrap_or(&0)
 }

 /// Called when `endpoint_name` returned a compact summary.
 pub fn record_compact(&self, endpoint_name: &str) {
 let mut penalties = self.penalties.lock();
 let entry = penalties.entry(endpoint_name.to_string()).or_insert(0);
 *entry = (*entry + COMPACT_PENALTY).min(MAX_PENALTY);
 }

 /// Called when `endpoint_name` returned a clean (non-compact) summary.
 pub fn record_clean(&self, endpoint_name: &str) {
 let mut penalties = self.penalties.lock();
 if let Some(entry) = penalties.get_mut(endpoint_name) {
 *entry = (*entry - CLEAN_DECAY).max(0);
 }
 }
}
