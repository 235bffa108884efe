//! `/trace/*` routes: UTXO-backward trace, address-centered
//! trace (synchronous and streaming), and peel-chain walks.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::sse::Event;
use axum::Json;
use gateway_types::TraceGraph;
use serde::Deserialize;
use trace_engine::{AddressTraceRequest, PeelChainRequest, PeelChainResult, UtxoTraceRequest};

use crate::context::GatewayContext;
use crate::error::ApiError;
use crate::sse::trace_stream_response;
use crate::validate;

pub async fn trace_utxo(
 State(ctx): State<Arc<GatewayContext>>,
 Json(req): Json<UtxoTraceRequest>,
) -> Result<Json<TraceGraph>, ApiError> {
 validate::txid(&req.txid)?;
 validate::hops(req.hops_before, req.hops_after)?;
 let graph = ctx.orchestrator.trace_utxo(req).await?;
 Ok(Json(graph))
}

#[derive(Debug, Deserialize)]
pub struct AddressTraceQuery {
 pub address: String,
 #[serde(default)]
 pub hops_before: u32,
 #[serde(default)]
 pub hops_after: u32,
 #[serde(default = "default_max_transactions")]
 pub max_transactions: usize,
 #[serde(default)]
 pub confidence_threshold: f64,
}

fn default_max_transactions() -> usize {
 500
}

impl From<AddressTraceQuery> for AddressTraceRequest {
 fn from(q: AddressTraceQuery) -> Self {
 AddressTraceRequest {
 address: q.address,
 hops_before: q.hops_before,
 hops_after: q.hops_after,
 max_transactions: q.max_transactions,
 confidence_threshold: q.confidence_threshold,
 }
 }
}

/// `POST /trace/address`: parameters travel as a query
/// string even on a POST, per the contract in.
pub async fn trace_address(
 State(ctx): State<Arc<GatewayContext>>,
 Query(query): Query<AddressTraceQuery>,
) -> Result<Json<TraceGraph>, ApiError> {
 validate::address(&query.address)?;
 validate::hops(query.hops_before, query.hops_after)?;
 let graph = ctx.orchestrator.trace_from_address(query.into()).await?;
 Ok(Json(graph))
}

/// `GET /trace/address/stream`.
pub async fn trace_address_stream(
 State(ctx): State<Arc<GatewayContext>>,
 Query(query): Query<AddressTraceQuery>,
) -> Result<axum::response::Sse<impl futures::Stream<Item = Result<Event, std::convert::Infallible>>>, ApiError> {
 validate::address(&query.address)?;
 validate::hops(query.hops_before, query.hops_after)?;
 Ok(trace_stream_response(ctx.emitter.clone(), query.into()))
}

pub async fn trace_peel_chain(
 State(ctx): State<Arc<GatewayContext>>,
 Json(req): Json<PeelChainRequest>,
) -> Result<Json<PeelChainResult>, ApiError> {
 validate::txid(&req.start_txid)?;
 if req.max_hops > validate::MAX_HOPS {
 return Err(gateway_types::GatewayError::InvalidInput(format!(
 "max_hops must be <= {}",
 validate::MAX_HOPS
 ))
.into());
 }
 let result = ctx.orchestrator.trace_peel_chain(req).await?;
 Ok(Json(result))
}
