//! Request/Failover Driver (C5): retries a logical request across
//! endpoints until a deadline, applying routing policy.

use std::time::{Duration, Instant};

use gateway_config::GatewayConfig;
use gateway_types::{EndpointPriority, GatewayError, Result};
use serde_json::Value;
use tracing::{error, warn};

use crate::pool::EndpointPool;
use crate::registry::{build_endpoints, Endpoint};
use crate::router::{self, Router};

pub struct FailoverDriver {
 router: Router,
 pool: EndpointPool,
 endpoints: Vec<Endpoint>,
 max_attempts: u32,
 hard_request_timeout: Duration,
 total_timeout: Duration,
}

impl FailoverDriver {
 pub fn new(
 endpoints: Vec<Endpoint>,
 global_max_inflight: usize,
 max_attempts: u32,
 hard_request_timeout: Duration,
 total_timeout: Duration,
 ) -> Self {
 FailoverDriver {
 router: Router::new(),
 pool: EndpointPool::new(global_max_inflight),
 endpoints,
 max_attempts,
 hard_request_timeout,
 total_timeout,
 }
 }

 pub fn endpoints(&self) -> &[Endpoint] {
 &self.endpoints
 }

 /// `request_with_failover(path, min_priority) -> body | none` (spec
 /// §4.4).
 pub async fn request_with_failover(&self, path: &str, min_priority: EndpointPriority) -> Option<Value> {
 let deadline = Instant::now() + self.total_timeout;
 let mut attempts = 0u32;

 while attempts < self.max_attempts {
 let remaining = deadline.saturating_duration_since(Instant::now());
 if remaining.is_zero() {
 self.log_timeout_snapshot(path, min_priority, attempts);
 break;
 }

 let attempt_timeout = self.hard_request_timeout.min(remaining);

 let endpoint = match self.router.choose(&self.endpoints, min_priority) {
 Some(endpoint) => endpoint,
 None => {
 let snapshot = Router::availability_snapshot(&self.endpoints, min_priority);
 let unavailable = router::unavailable_names(&snapshot, now_epoch());
 error!(path, unavailable = ?unavailable, "no endpoints available for request");
 break;
 }
 };

 if !endpoint.is_available() {
 // Chosen between `choose` and here; not counted as an attempt.
 tokio::task::yield_now().await;
 continue;
 }

 attempts += 1;
 match self.pool.perform(endpoint, path, attempt_timeout).await {
 Some(body) => return Some(body),
 None => {
 warn!(path, endpoint = %endpoint.config.name, attempts, "attempt failed, trying next endpoint");
 }
 }
 }

 None
 }

 /// Variant of [`FailoverDriver::request_with_failover`] that lets the
 /// caller supply a per-endpoint penalty and learns
 /// which endpoint actually served the response, so the caller can
 /// attribute a compact-summary penalty to the right endpoint.
 pub async fn request_with_failover_weighted(
 &self,
 path: &str,
 min_priority: EndpointPriority,
 penalty_of: impl Fn(&str) -> i32,
 ) -> Option<(Value, String)> {
 let deadline = Instant::now() + self.total_timeout;
 let mut attempts = 0u32;

 while attempts < self.max_attempts {
 let remaining = deadline.saturating_duration_since(Instant::now());
 if remaining.is_zero() {
 self.log_timeout_snapshot(path, min_priority, attempts);
 break;
 }

 let attempt_timeout = self.hard_request_timeout.min(remaining);

 let endpoint = match self.router.choose_weighted(&self.endpoints, min_priority, &penalty_of) {
 Some(endpoint) => endpoint,
 None => {
 let snapshot = Router::availability_snapshot(&self.endpoints, min_priority);
 let unavailable = router::unavailable_names(&snapshot, now_epoch());
 error!(path, unavailable = ?unavailable, "no endpoints available for request");
 break;
 }
 };

 if !endpoint.is_available() {
 tokio::task::yield_now().await;
 continue;
 }

 attempts += 1;
 let name = endpoint.config.name.clone();
 match self.pool.perform(endpoint, path, attempt_timeout).await {
 Some(body) => return Some((body, name)),
 None => {
 warn!(path, endpoint = %name, attempts, "attempt failed, trying next endpoint");
 }
 }
 }

 None
 }

 /// Issues one probe request against every registered endpoint,
 /// regardless of ranking, and returns the resulting health
 /// snapshots. Endpoints that are
 /// currently hard-disabled are skipped rather than counted as a
 /// fresh failure.
 pub async fn test_all(&self, probe_path: &str) -> Vec<gateway_types::EndpointSnapshot> {
 for endpoint in &self.endpoints {
 if endpoint.is_available() {
 let _ = self.pool.perform(endpoint, probe_path, self.hard_request_timeout).await;
 }
 }
 self.endpoints.iter().map(|e| e.snapshot()).collect()
 }

 fn log_timeout_snapshot(&self, path: &str, min_priority: EndpointPriority, attempts: u32) {
 let snapshot = Router::availability_snapshot(&self.endpoints, min_priority);
 let unavailable = router::unavailable_names(&snapshot, now_epoch());
 error!(path, attempts, unavailable = ?unavailable, "exhausted total timeout budget");
 }

 /// Wraps [`FailoverDriver::request_with_failover`] in an outer
 /// timeout equal to `total_timeout`; on expiry surfaces a terminal
 /// error describing endpoint availability.
 pub async fn request_with_total_timeout(&self, path: &str, min_priority: EndpointPriority) -> Result<Option<Value>> {
 match tokio::time::timeout(self.total_timeout, self.request_with_failover(path, min_priority)).await {
 Ok(body) => Ok(body),
 Err(_) => {
 self.log_timeout_snapshot(path, min_priority, self.max_attempts);
 Err(GatewayError::AllUpstreamsFailed { path: path.to_string() })
 }
 }
 }
}

fn now_epoch() -> i64 {
 chrono::Utc::now().timestamp()
}
