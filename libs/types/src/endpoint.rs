//! Shared endpoint vocabulary.
//!
//! These types are the common currency between the endpoint pool (which
//! owns the live, mutex-guarded endpoint state) and the API adapter's
//! `/metrics/mempool` and `/servers/list` surfaces, which only ever see
//! a point-in-time snapshot.

use serde::{Deserialize, Serialize};

/// Endpoint priority tier. Ordering matches the registry's tier numbers:
/// 0 is most trusted. `Ord` is derived in declaration order so
/// `Priority::Local < Priority::Additional < Priority::Public` holds,
/// matching the numeric tiers used in configuration and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EndpointPriority {
 Local = 0,
 Additional = 1,
 Public = 2,
}

impl EndpointPriority {
 pub fn as_u8(self) -> u8 {
 self as u8
 }
}

/// A point-in-time, read-only view of one endpoint's health, suitable
/// for logging and for serializing into `/metrics/mempool`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointSnapshot {
 pub name: String,
 pub base_url: String,
 pub priority: EndpointPriority,
 pub healthy: bool,
 pub enabled: bool,
 pub concurrency_limit: u32,
 pub active_slots: u32,
 pub successes: u64,
 pub failures: u64,
 pub consecutive_failures: u32,
 pub consecutive_successes: u32,
 pub recent_success_rate: f64,
 pub avg_latency_ms: f64,
 pub last_success_at: Option<i64>,
 pub last_failure_at: Option<i64>,
 pub cooldown_until: Option<i64>,
}

impl EndpointSnapshot {
 /// Mirrors the registry invariant: enabled, has slots to give, and
 /// cooldown (if any) has elapsed.
 pub fn is_available(&self, now: i64) -> bool {
 self.enabled
 && self.concurrency_limit > 0
 && self.cooldown_until.map_or(true, |until| until <= now)
 }
}
