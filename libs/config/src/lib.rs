//! Configuration surface for the chain-data gateway.
//!
//! Loads from a TOML file with environment-variable overrides under the
//! `GATEWAY_` prefix, following the same `config_crate::{Config, File,
//! Environment}` layering the rest of this codebase's services use.

use std::path::Path;

use anyhow::{Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Per-tier concurrency and throttling knobs.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct TierConcurrency {
 pub initial: u32,
 pub min: u32,
 pub max_concurrent: u32,
 pub request_delay_ms: u64,
}

impl TierConcurrency {
 fn defaults_for(tier: u8) -> Self {
 match tier {
 0 => TierConcurrency {
 initial: 8,
 min: 2,
 max_concurrent: 16,
 request_delay_ms: 0,
 },
 1 => TierConcurrency {
 initial: 4,
 min: 1,
 max_concurrent: 8,
 request_delay_ms: 50,
 },
 _ => TierConcurrency {
 initial: 2,
 min: 1,
 max_concurrent: 4,
 request_delay_ms: 150,
 },
 }
 }
}

/// Adaptive-concurrency tuning.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct ConcurrencyTuning {
 pub adjust_window: usize,
 pub success_target: f64,
 pub latency_target_ms: f64,
 pub failure_threshold: u32,
}

impl Default for ConcurrencyTuning {
 fn default() -> Self {
 ConcurrencyTuning {
 adjust_window: 20,
 success_target: 0.9,
 latency_target_ms: 2_000.0,
 failure_threshold: 5,
 }
 }
}

/// Request timeout budgets.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct TimeoutConfig {
 pub request_timeout_ms: u64,
 pub min_request_timeout_ms: u64,
 pub hard_request_timeout_ms: u64,
 pub total_timeout_ms: u64,
}

impl Default for TimeoutConfig {
 fn default() -> Self {
 TimeoutConfig {
 request_timeout_ms: 10_000,
 min_request_timeout_ms: 1_000,
 hard_request_timeout_ms: 15_000,
 total_timeout_ms: 30_000,
 }
 }
}

/// Cache TTLs.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct CacheConfig {
 pub ttl_transaction_secs: u64,
 pub ttl_address_history_secs: u64,
}

impl Default for CacheConfig {
 fn default() -> Self {
 CacheConfig {
 ttl_transaction_secs: 3600,
 ttl_address_history_secs: 60,
 }
 }
}

/// Root configuration, one field group per concern.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
 pub mempool_local_url: Option<String>,
 #[serde(default)]
 pub mempool_additional_urls: Vec<String>,
 #[serde(default)]
 pub mempool_public_urls: Vec<String>,
 #[serde(default)]
 pub mempool_endpoint_disabled: Vec<String>,

 #[serde(default = "default_local_tier")]
 pub local_tier: TierConcurrency,
 #[serde(default = "default_additional_tier")]
 pub additional_tier: TierConcurrency,
 #[serde(default = "default_public_tier")]
 pub public_tier: TierConcurrency,

 #[serde(default = "default_global_max_inflight")]
 pub mempool_global_max_inflight: u32,

 #[serde(default)]
 pub timeouts: TimeoutConfig,

 #[serde(default = "default_failure_cooldown_seconds")]
 pub mempool_failure_cooldown_seconds: u64,

 #[serde(default = "default_disable_threshold")]
 pub mempool_disable_threshold: u32,

 #[serde(default = "default_max_attempts")]
 pub mempool_max_attempts: u32,

 #[serde(default)]
 pub concurrency_tuning: ConcurrencyTuning,

 #[serde(default = "default_page_size")]
 pub mempool_default_page_size: u32,

 #[serde(default)]
 pub cache: CacheConfig,

 #[serde(default = "default_log_level")]
 pub log_level: String,
}

fn default_local_tier() -> TierConcurrency {
 TierConcurrency::defaults_for(0)
}
fn default_additional_tier() -> TierConcurrency {
 TierConcurrency::defaults_for(1)
}
fn default_public_tier() -> TierConcurrency {
 TierConcurrency::defaults_for(2)
}
fn default_global_max_inflight() -> u32 {
 64
}
fn default_failure_cooldown_seconds() -> u64 {
 30
}
fn default_disable_threshold() -> u32 {
 5
}
fn default_max_attempts() -> u32 {
 4
}
fn default_page_size() -> u32 {
 50
}
fn default_log_level() -> String {
 "info".to_string()
}

impl Default for GatewayConfig {
 fn default() -> Self {
 GatewayConfig {
 mempool_local_url: None,
 mempool_additional_urls: Vec::new(),
 mempool_public_urls: Vec::new(),
 mempool_endpoint_disabled: Vec::new(),
 local_tier: default_local_tier(),
 additional_tier: default_additional_tier(),
 public_tier: default_public_tier(),
 mempool_global_max_inflight: default_global_max_inflight(),
 timeouts: TimeoutConfig::default(),
 mempool_failure_cooldown_seconds: default_failure_cooldown_seconds(),
 mempool_disable_threshold: default_disable_threshold(),
 mempool_max_attempts: default_max_attempts(),
 concurrency_tuning: ConcurrencyTuning::default(),
 mempool_default_page_size: default_page_size(),
 cache: CacheConfig::default(),
 log_level: default_log_level(),
 }
 }
}

impl GatewayConfig {
 /// Load from an optional file path, layered with `GATEWAY_`-prefixed
 /// environment variable overrides (e.g. `GATEWAY_MEMPOOL_LOCAL_URL`).
 pub fn load(path: Option<&Path>) -> Result<Self> {
 let mut builder = Config::builder();

 if let Some(path) = path {
 builder = builder.add_source(File::from(path).required(true));
 } else if Path::new("config/gateway.yaml").exists() {
 builder = builder.add_source(File::with_name("config/gateway").required(false));
 }

 builder = builder.add_source(
 Environment::with_prefix("GATEWAY")
.separator("__")
.try_parsing(true),
 );

 let built = builder.build().context("failed to build configuration")?;

 let mut config: GatewayConfig = built
.try_deserialize()
.context("failed to deserialize configuration")?;

 config.expand_env_vars()?;
 Ok(config)
 }

 fn expand_env_vars(&mut self) -> Result<()> {
 if let Some(url) = &self.mempool_local_url {
 self.mempool_local_url =
 Some(shellexpand::env(url).context("expanding mempool_local_url")?.to_string());
 }
 Ok(())
 }

 /// All configured endpoint URLs paired with their tier number, minus
 /// anything in `mempool_endpoint_disabled`.
 pub fn enabled_endpoints(&self) -> Vec<(u8, String, TierConcurrency)> {
 let mut out = Vec::new();
 if let Some(url) = &self.mempool_local_url {
 out.push((0u8, url.clone(), self.local_tier));
 }
 for url in &self.mempool_additional_urls {
 out.push((1u8, url.clone(), self.additional_tier));
 }
 for url in &self.mempool_public_urls {
 out.push((2u8, url.clone(), self.public_tier));
 }
 out.retain(|(_, url, _)| !self.mempool_endpoint_disabled.contains(url));
 out
 }
}
