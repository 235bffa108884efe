//! Process-wide context built once at startup and threaded through
//! every handler.

use std::sync::Arc;

use endpoint_pool::{build_endpoints, FailoverDriver};
use gateway_cache::InMemoryCache;
use gateway_config::GatewayConfig;
use trace_engine::{StreamingTraceEmitter, TraceOrchestrator};

use crate::xpub::DeriveAddresses;

/// Everything a handler needs, wired together once and cloned cheaply
/// (every field is an `Arc`). No module-level singleton exists anywhere
/// in this crate — tests build their own `GatewayContext` against an
/// `InMemoryCache` and a driver with zero or mock endpoints.
#[derive(Clone)]
pub struct GatewayContext {
 pub chain_data: Arc<chain_data::ChainDataService<InMemoryCache>>,
 pub orchestrator: Arc<TraceOrchestrator<InMemoryCache>>,
 pub emitter: Arc<StreamingTraceEmitter<InMemoryCache>>,
 pub config: Arc<GatewayConfig>,
 pub derive_addresses: Arc<dyn DeriveAddresses>,
}

impl GatewayContext {
 pub fn new(config: GatewayConfig, derive_addresses: Arc<dyn DeriveAddresses>) -> Self {
 let endpoints = build_endpoints(&config);
 let driver = FailoverDriver::new(
 endpoints,
 config.mempool_global_max_inflight as usize,
 config.mempool_max_attempts,
 std::time::Duration::from_millis(config.timeouts.hard_request_timeout_ms),
 std::time::Duration::from_millis(config.timeouts.total_timeout_ms),
 );
 let cache = Arc::new(InMemoryCache::new());
 let chain_data = Arc::new(chain_data::ChainDataService::new(driver, cache, &config));
 let orchestrator = Arc::new(TraceOrchestrator::new(chain_data.clone()));
 let emitter = Arc::new(StreamingTraceEmitter::new(orchestrator.clone()));

 GatewayContext {
 chain_data,
 orchestrator,
 emitter,
 config: Arc::new(config),
 derive_addresses,
 }
 }
}
