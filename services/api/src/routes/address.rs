//! `GET /address/{address}` and `POST /address/batch`.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use gateway_types::Address;
use serde::{Deserialize, Serialize};

use crate::context::GatewayContext;
use crate::error::ApiError;
use crate::validate;

#[derive(Debug, Deserialize)]
pub struct AddressQuery {
 #[serde(default = "default_true")]
 pub include_details: bool,
 pub max_transactions: Option<u64>,
}

fn default_true() -> bool {
 true
}

/// A minimal record omits balances, leaving only identity and activity
/// counters.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AddressResponse {
 Full(Address),
 Minimal {
 address: String,
 tx_count: u64,
 },
}

pub async fn get_address(
 State(ctx): State<Arc<GatewayContext>>,
 Path(address): Path<String>,
 Query(query): Query<AddressQuery>,
) -> Result<Json<AddressResponse>, ApiError> {
 validate::address(&address)?;
 let record = ctx.chain_data.fetch_address_info(&address, query.max_transactions).await?;

 let response = if query.include_details {
 AddressResponse::Full(record)
 } else {
 AddressResponse::Minimal {
 address: record.address,
 tx_count: record.tx_count,
 }
 };
 Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct BatchAddressRequest {
 pub addresses: Vec<String>,
 #[serde(default = "default_true")]
 pub include_details: bool,
}

pub async fn batch_addresses(
 State(ctx): State<Arc<GatewayContext>>,
 Json(req): Json<BatchAddressRequest>,
) -> Result<Json<Vec<AddressResponse>>, ApiError> {
 for address in &req.addresses {
 validate::address(address)?;
 }

 let fetches = req.addresses.iter().map(|address| {
 let ctx = ctx.clone();
 let address = address.clone();
 async move { ctx.chain_data.fetch_address_info(&address, None).await }
 });
 let results = futures::future::join_all(fetches).await;

 let mut out = Vec::with_capacity(results.len());
 for (address, result) in req.addresses.iter().zip(results) {
 match result {
 Ok(record) => out.push(if req.include_details {
 AddressResponse::Full(record)
 } else {
 AddressResponse::Minimal {
 address: record.address,
 tx_count: record.tx_count,
 }
 }),
 Err(err) => {
 tracing::warn!(%address, error = %err, "address batch entry failed");
 out.push(AddressResponse::Minimal {
 address: address.clone(),
 tx_count: 0,
 });
 }
 }
 }
 Ok(Json(out))
}
