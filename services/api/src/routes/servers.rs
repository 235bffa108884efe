//! `/metrics/mempool`, `/servers/list`, `/servers/test`:
//! operational introspection over endpoint health snapshots.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use gateway_types::EndpointSnapshot;
use serde::Serialize;

use crate::context::GatewayContext;

/// Probe path used by `/servers/test`; any cheap, side-effect-free
/// upstream endpoint works since only reachability is being measured.
const PROBE_PATH: &str = "/blocks/tip/height";

pub async fn metrics_mempool(State(ctx): State<Arc<GatewayContext>>) -> Json<Vec<EndpointSnapshot>> {
 let snapshots = ctx.chain_data.driver().endpoints().iter().map(|e| e.snapshot()).collect();
 Json(snapshots)
}

#[derive(Debug, Serialize)]
pub struct ServerListEntry {
 pub name: String,
 pub base_url: String,
 pub priority: gateway_types::EndpointPriority,
 pub healthy: bool,
}

pub async fn servers_list(State(ctx): State<Arc<GatewayContext>>) -> Json<Vec<ServerListEntry>> {
 let entries = ctx
.chain_data
.driver()
.endpoints()
.iter()
.map(|e| {
 let snap = e.snapshot();
 ServerListEntry {
 name: snap.name,
 base_url: snap.base_url,
 priority: snap.priority,
 healthy: snap.healthy,
 }
 })
.collect();
 Json(entries)
}

pub async fn servers_test(State(ctx): State<Arc<GatewayContext>>) -> Json<Vec<EndpointSnapshot>> {
 let snapshots = ctx.chain_data.driver().test_all(PROBE_PATH).await;
 Json(snapshots)
}
