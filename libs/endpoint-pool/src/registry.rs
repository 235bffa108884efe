//! Endpoint Registry (C1): builds per-endpoint runtime state from
//! configuration once at startup.

use std::time::{Duration, Instant};

use gateway_config::{GatewayConfig, TierConcurrency};
use gateway_types::{EndpointPriority, EndpointSnapshot};
use parking_lot::Mutex;
use tracing::info;

/// Fixed configuration for one endpoint, set at build time and never
/// mutated afterward.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
 pub name: String,
 pub base_url: String,
 pub priority: EndpointPriority,
 pub min_concurrency: u32,
 pub max_concurrency: u32,
 pub request_delay: Duration,
}

/// Fixed-capacity ring buffer of recent outcomes, backing the adaptive
/// concurrency rule. Old entries are overwritten in place;
/// no allocation happens after construction.
struct RollingWindow {
 capacity: usize,
 outcomes: Vec<bool>,
 latencies_ms: Vec<f64>,
 next: usize,
 len: usize,
}

impl RollingWindow {
 fn new(capacity: usize) -> Self {
 RollingWindow {
 capacity,
 outcomes: vec![false; capacity],
 latencies_ms: vec![0.0; capacity],
 next: 0,
 len: 0,
 }
 }

 fn push(&mut self, success: bool, latency_ms: f64) {
 self.outcomes[self.next] = success;
 self.latencies_ms[self.next] = latency_ms;
 self.next = (self.next + 1) % self.capacity;
 self.len = (self.len + 1).min(self.capacity);
 }

 fn is_full(&self) -> bool {
 self.len == self.capacity
 }

 fn success_rate(&self) -> f64 {
 if self.len == 0 {
 return 1.0;
 }
 let successes = self.outcomes[..self.len].iter().filter(|s| **s).count();
 successes as f64 / self.len as f64
 }

 fn avg_latency_ms(&self) -> f64 {
 if self.len == 0 {
 return 0.0;
 }
 self.latencies_ms[..self.len].iter().sum::<f64>() / self.len as f64
 }

 fn clear(&mut self) {
 self.len = 0;
 self.next = 0;
 }
}

/// Mutable health and concurrency state, guarded by a single mutex per
/// endpoint.
struct EndpointInner {
 concurrency_limit: u32,
 active_slots: u32,
 enabled: bool,
 successes: u64,
 failures: u64,
 consecutive_successes: u32,
 consecutive_failures: u32,
 cooldown_until: Option<Instant>,
 last_success_at: Option<Instant>,
 last_failure_at: Option<Instant>,
 window: RollingWindow,
 last_adjustment: Option<Instant>,
}

/// Tuning for the adaptive concurrency rule, shared by every endpoint
///.
#[derive(Debug, Clone, Copy)]
pub struct ConcurrencyTuning {
 pub window_size: usize,
 pub success_target: f64,
 pub latency_target_ms: f64,
 pub failure_threshold: u32,
 pub disable_threshold: u32,
 pub failure_cooldown: Duration,
}

impl From<&gateway_config::GatewayConfig> for ConcurrencyTuning {
 fn from(config: &gateway_config::GatewayConfig) -> Self {
 ConcurrencyTuning {
 window_size: config.concurrency_tuning.adjust_window,
 success_target: config.concurrency_tuning.success_target,
 latency_target_ms: config.concurrency_tuning.latency_target_ms,
 failure_threshold: config.concurrency_tuning.failure_threshold,
 disable_threshold: config.mempool_disable_threshold,
 failure_cooldown: Duration::from_secs(config.mempool_failure_cooldown_seconds),
 }
 }
}

pub struct Endpoint {
 pub config: EndpointConfig,
 tuning: ConcurrencyTuning,
 inner: Mutex<EndpointInner>,
}

impl Endpoint {
 fn new(config: EndpointConfig, tuning: ConcurrencyTuning) -> Self {
 let initial_limit = config.max_concurrency.max(config.min_concurrency);
 Endpoint {
 inner: Mutex::new(EndpointInner {
 concurrency_limit: initial_limit,
 active_slots: 0,
 enabled: true,
 successes: 0,
 failures: 0,
 consecutive_successes: 0,
 consecutive_failures: 0,
 cooldown_until: None,
 last_success_at: None,
 last_failure_at: None,
 window: RollingWindow::new(tuning.window_size.max(1)),
 last_adjustment: None,
 }),
 config,
 tuning,
 }
 }

 /// Invariant enabled AND concurrency_limit > 0 AND
 /// cooldown elapsed.
 pub fn is_available(&self) -> bool {
 let inner = self.inner.lock();
 Self::available_locked(&inner)
 }

 fn available_locked(inner: &EndpointInner) -> bool {
 inner.enabled
 && inner.concurrency_limit > 0
 && inner
.cooldown_until
.map_or(true, |until| Instant::now() >= until)
 }

 /// Attempts to reserve a per-endpoint slot. Returns `true` on
 /// success; the caller must call [`Endpoint::release_slot`] exactly
 /// once per successful acquisition, on every exit path.
 pub fn try_acquire_slot(&self) -> bool {
 let mut inner = self.inner.lock();
 if !Self::available_locked(&inner) {
 return false;
 }
 if inner.active_slots >= inner.concurrency_limit {
 return false;
 }
 inner.active_slots += 1;
 true
 }

 pub fn release_slot(&self) {
 let mut inner = self.inner.lock();
 inner.active_slots = inner.active_slots.saturating_sub(1);
 }

 pub fn record_success(&self, latency_ms: f64) {
 let mut inner = self.inner.lock();
 inner.successes += 1;
 inner.consecutive_failures = 0;
 inner.consecutive_successes += 1;
 inner.cooldown_until = None;
 inner.last_success_at = Some(Instant::now());
 inner.window.push(true, latency_ms);
 self.maybe_adjust(&mut inner);
 }

 pub fn record_failure(&self) {
 let mut inner = self.inner.lock();
 inner.failures += 1;
 inner.consecutive_successes = 0;
 inner.consecutive_failures += 1;
 inner.cooldown_until = Some(Instant::now() + self.tuning.failure_cooldown);
 inner.last_failure_at = Some(Instant::now());
 inner.window.push(false, 0.0);

 if inner.consecutive_failures >= self.tuning.disable_threshold {
 if self.config.priority == EndpointPriority::Local {
 // Priority-0 endpoints are never permanently disabled
 //; clear the cooldown so they stay reachable.
 inner.cooldown_until = None;
 } else {
 inner.concurrency_limit = 0;
 inner.cooldown_until = Some(Instant::now() + Duration::from_secs(24 * 60 * 60));
 info!(endpoint = %self.config.name, "endpoint hard-disabled after repeated failures");
 }
 }

 self.maybe_adjust(&mut inner);
 }

 /// Evaluated once the window is full, at most once per second (spec
 /// §4.3). A failure path never triggers an increase.
 fn maybe_adjust(&self, inner: &mut EndpointInner) {
 if !inner.window.is_full() {
 return;
 }
 if let Some(last) = inner.last_adjustment {
 if last.elapsed() < Duration::from_secs(1) {
 return;
 }
 }

 let success_rate = inner.window.success_rate();
 let avg_latency = inner.window.avg_latency_ms();
 let should_decrease = success_rate < self.tuning.success_target
 || avg_latency > self.tuning.latency_target_ms
 || inner.consecutive_failures >= self.tuning.failure_threshold;

 if should_decrease {
 inner.concurrency_limit = inner.concurrency_limit.saturating_sub(1).max(self.config.min_concurrency);
 } else if success_rate >= self.tuning.success_target && avg_latency <= self.tuning.latency_target_ms {
 inner.concurrency_limit = (inner.concurrency_limit + 1).min(self.config.max_concurrency);
 }

 inner.window.clear();
 inner.last_adjustment = Some(Instant::now());
 }

 pub fn snapshot(&self) -> EndpointSnapshot {
 let inner = self.inner.lock();
 let now_instant = Instant::now();
 let now_epoch = chrono::Utc::now().timestamp();
 let to_epoch = |at: Option<Instant>| {
 at.map(|at| now_epoch - now_instant.saturating_duration_since(at).as_secs() as i64)
 };
 EndpointSnapshot {
 name: self.config.name.clone(),
 base_url: self.config.base_url.clone(),
 priority: self.config.priority,
 healthy: Self::available_locked(&inner),
 enabled: inner.enabled,
 concurrency_limit: inner.concurrency_limit,
 active_slots: inner.active_slots,
 successes: inner.successes,
 failures: inner.failures,
 consecutive_failures: inner.consecutive_failures,
 consecutive_successes: inner.consecutive_successes,
 recent_success_rate: inner.window.success_rate(),
 avg_latency_ms: inner.window.avg_latency_ms(),
 last_success_at: to_epoch(inner.last_success_at),
 last_failure_at: to_epoch(inner.last_failure_at),
 cooldown_until: inner.cooldown_until.map(|until| {
 now_epoch + until.saturating_duration_since(now_instant).as_secs() as i64
 }),
 }
 }

 pub fn request_delay(&self) -> Duration {
 self.config.request_delay
 }
}

/// Builds the process-wide set of endpoints from configuration. Dropped
/// endpoints (`mempool_endpoint_disabled`) never appear here at all
///.
pub fn build_endpoints(config: &GatewayConfig) -> Vec<Endpoint> {
 let tuning = ConcurrencyTuning::from(config);
 let mut additional_idx = 0usize;
 let mut public_idx = 0usize;

 config
.enabled_endpoints()
.into_iter()
.map(|(tier, url, tier_cfg): (u8, String, TierConcurrency)| {
 let (name, priority) = match tier {
 0 => ("local".to_string(), EndpointPriority::Local),
 1 => {
 let name = format!("additional-{additional_idx}");
 additional_idx += 1;
 (name, EndpointPriority::Additional)
 }
 _ => {
 let name = format!("public-{public_idx}");
 public_idx += 1;
 (name, EndpointPriority::Public)
 }
 };
 let endpoint_config = EndpointConfig {
 name,
 base_url: url.trim_end_matches('/').to_string(),
 priority,
 min_concurrency: tier_cfg.min,
 max_concurrency: tier_cfg.max_concurrent,
 request_delay: Duration::from_millis(tier_cfg.request_delay_ms),
 };
 Endpoint::new(endpoint_config, tuning)
 })
.collect()
}
