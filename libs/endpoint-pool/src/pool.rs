//! Endpoint Pool / Multiplexer (C4): the hottest surface of the
//! system. Executes one HTTP GET against a chosen endpoint, enforcing
//! global and per-endpoint concurrency, timeouts, and health updates
//!.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::client::HttpClientFactory;
use crate::registry::Endpoint;

const SLOT_WAIT_STEP: Duration = Duration::from_millis(500);

pub struct EndpointPool {
 global_inflight: Arc<Semaphore>,
 clients: HttpClientFactory,
}

impl EndpointPool {
 pub fn new(global_max_inflight: usize) -> Self {
 EndpointPool {
 global_inflight: Arc::new(Semaphore::new(global_max_inflight)),
 clients: HttpClientFactory::new(),
 }
 }

 /// Waits for a per-endpoint slot, bounded by the endpoint's
 /// remaining cooldown (or up to [`SLOT_WAIT_STEP`] if none is
 /// active). Returns `false` immediately if the endpoint is
 /// hard-disabled.
 async fn wait_for_slot(&self, endpoint: &Endpoint) -> bool {
 loop {
 if endpoint.try_acquire_slot() {
 return true;
 }
 if !endpoint.is_available() {
 let snap = endpoint.snapshot();
 if snap.concurrency_limit == 0 {
 return false;
 }
 }
 sleep(SLOT_WAIT_STEP).await;
 }
 }

 /// `perform(endpoint, path, attempt_timeout) -> body | none` (spec
 /// §4.3). Every exit path releases both the global and per-endpoint
 /// slots exactly once.
 pub async fn perform(&self, endpoint: &Endpoint, path: &str, attempt_timeout: Duration) -> Option<Value> {
 let _global_permit = match self.global_inflight.acquire().await {
 Ok(permit) => permit,
 Err(_) => return None,
 };

 if !self.wait_for_slot(endpoint).await {
 warn!(endpoint = %endpoint.config.name, "endpoint unavailable, failing call fast");
 endpoint.record_failure();
 return None;
 }

 let result = self.perform_inner(endpoint, path, attempt_timeout).await;
 endpoint.release_slot();
 result
 }

 async fn perform_inner(&self, endpoint: &Endpoint, path: &str, attempt_timeout: Duration) -> Option<Value> {
 let delay = endpoint.request_delay();
 if !delay.is_zero() {
 sleep(delay).await;
 }

 let url = format!("{}{}", endpoint.config.base_url, path);
 let client = self.clients.client_for(&endpoint.config.base_url, attempt_timeout);
 let started = Instant::now();

 let outcome = tokio::time::timeout(attempt_timeout, client.get(&url).send()).await;

 let response = match outcome {
 Err(_) => {
 warn!(endpoint = %endpoint.config.name, %path, "request timed out");
 endpoint.record_failure();
 return None;
 }
 Ok(Err(err)) => {
 warn!(endpoint = %endpoint.config.name, %path, error = %err, "request failed");
 endpoint.record_failure();
 return None;
 }
 Ok(Ok(response)) => response,
 };

 let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
 let status = response.status();

 if status.as_u16() == 204 {
 endpoint.record_success(latency_ms);
 return None;
 }
 if status.as_u16() == 404 {
 endpoint.record_success(latency_ms);
 debug!(endpoint = %endpoint.config.name, %path, "endpoint reports not found");
 return None;
 }
 if !status.is_success() {
 warn!(endpoint = %endpoint.config.name, %path, %status, "non-success status");
 endpoint.record_failure();
 return None;
 }

 match response.json::<Value>().await {
 Ok(body) => {
 endpoint.record_success(latency_ms);
 Some(body)
 }
 Err(err) => {
 warn!(endpoint = %endpoint.config.name, %path, error = %err, "failed to decode JSON body");
 endpoint.record_failure();
 None
 }
 }
 }
}
