//! Endpoint Router (C2): ranked top-N rotation across available
//! endpoints.

use std::sync::atomic::{AtomicUsize, Ordering};

use gateway_types::{EndpointPriority, EndpointSnapshot};

use crate::registry::Endpoint;

const TOP_N: usize = 5;

/// Chooses endpoints for the pool. Holds no ownership over endpoints —
/// callers pass the full registry slice on each call, keeping the
/// router itself stateless apart from its rotation counter.
pub struct Router {
 rotation: AtomicUsize,
}

impl Default for Router {
 fn default() -> Self {
 Self::new()
 }
}

impl Router {
 pub fn new() -> Self {
 Router {
 rotation: AtomicUsize::new(0),
 }
 }

 /// Rank candidates by `(-recent_success_rate, avg_latency,
 /// -concurrency_limit, total_failures)`, take the top N, and hand
 /// out the next one in round-robin order.
 ///
 /// `min_priority` is a ceiling, not a floor: since lower tier numbers
 /// are more trusted, restricting to
 /// `priority <= min_priority` means callers escalate outward by
 /// passing successively higher tier values (0, then 1, then 2) —
 /// exactly the walk C6 performs for address summaries.
 pub fn choose<'a>(&self, endpoints: &'a [Endpoint], min_priority: EndpointPriority) -> Option<&'a Endpoint> {
 self.choose_weighted(endpoints, min_priority, |_| 0)
 }

 /// Same ranking as [`Router::choose`], with an extra penalty term
 /// consulted just ahead of the base-URL tie-break. Used by C6 to
 /// deprioritize endpoints that recently returned a compact summary
 /// without affecting the base ranking other callers
 /// see.
 pub fn choose_weighted<'a>(
 &self,
 endpoints: &'a [Endpoint],
 min_priority: EndpointPriority,
 penalty_of: impl Fn(&str) -> i32,
 ) -> Option<&'a Endpoint> {
 let mut candidates: Vec<(&Endpoint, EndpointSnapshot, i32)> = endpoints
.iter()
.filter(|ep| ep.config.priority <= min_priority)
.filter(|ep| ep.is_available())
.map(|ep| {
 let snap = ep.snapshot();
 let penalty = penalty_of(&ep.config.name);
 (ep, snap, penalty)
 })
.collect();

 if candidates.is_empty() {
 return None;
 }

 candidates.sort_by(|(a_ep, a, a_penalty), (b_ep, b, b_penalty)| {
 b.recent_success_rate
.partial_cmp(&a.recent_success_rate)
.unwrap_or(std::cmp::Ordering::Equal)
.then_with(|| {
 a.avg_latency_ms
.partial_cmp(&b.avg_latency_ms)
.unwrap_or(std::cmp::Ordering::Equal)
 })
.then_with(|| b.concurrency_limit.cmp(&a.concurrency_limit))
.then_with(|| a.failures.cmp(&b.failures))
.then_with(|| a_penalty.cmp(b_penalty))
.then_with(|| a_ep.config.base_url.cmp(&b_ep.config.base_url))
 });

 candidates.truncate(TOP_N);

 let idx = self.rotation.fetch_add(1, Ordering::Relaxed) % candidates.len();
 Some(candidates[idx].0)
 }

 /// Snapshot of every endpoint's availability, for logging when a
 /// request fails or times out.
 pub fn availability_snapshot(endpoints: &[Endpoint], min_priority: EndpointPriority) -> Vec<EndpointSnapshot> {
 endpoints
.iter()
.filter(|ep| ep.config.priority <= min_priority)
.map(|ep| ep.snapshot())
.collect()
 }
}

/// Names of unavailable endpoints, capped at 5 for log brevity (spec
/// grounded in the original router's truncated "failed servers" logs).
pub fn unavailable_names(snapshots: &[EndpointSnapshot], now: i64) -> Vec<String> {
 snapshots
.iter()
.filter(|s| !s.is_available(now))
.map(|s| s.name.clone())
.take(5)
.collect()
}

#[cfg(test)]
mod tests {
 use super::*;
 use crate::registry::{ConcurrencyTuning, Endpoint, EndpointConfig};
 use std::time::Duration;

 fn endpoint(name: &str, priority: EndpointPriority) -> Endpoint {
 Endpoint::new(
 EndpointConfig {
 name: name.to_string(),
 base_url: format!("http://{name}"),
 priority,
 min_concurrency: 1,
 max_concurrency: 4,
 request_delay: Duration::from_millis(0),
 },
 ConcurrencyTuning {
 window_size: 20,
 success_target: 0.9,
 latency_target_ms: 100.0,
 failure_threshold: 5,
 disable_threshold: 5,
 failure_cooldown: Duration::from_secs(1),
 },
 )
 }

 #[test]
 fn choose_returns_none_when_nothing_available() {
 let router = Router::new();
 let endpoints = vec![];
 assert!(router.choose(&endpoints, EndpointPriority::Local).is_none());
 }

 #[test]
 fn choose_rotates_among_equally_ranked_candidates() {
 let router = Router::new();
 let endpoints = vec![
 endpoint("a", EndpointPriority::Public),
 endpoint("b", EndpointPriority::Public),
 ];
 let first = router.choose(&endpoints, EndpointPriority::Public).unwrap().config.name.clone();
 let second = router.choose(&endpoints, EndpointPriority::Public).unwrap().config.name.clone();
 assert_ne!(first, second);
 }

 #[test]
 fn choose_respects_min_priority_filter() {
 let router = Router::new();
 let endpoints = vec![endpoint("pub", EndpointPriority::Public)];
 assert!(router.choose(&endpoints, EndpointPriority::Local).is_none());
 assert!(router.choose(&endpoints, EndpointPriority::Public).is_some());
 }
}
