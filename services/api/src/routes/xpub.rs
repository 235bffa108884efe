//! `POST /xpub/derive`: thin translation to the injected
//! `DeriveAddresses` collaborator; the derivation math itself is out of
//! scope for the core.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use gateway_types::GatewayError;

use crate::context::GatewayContext;
use crate::error::ApiError;
use crate::xpub::{DeriveRequest, DerivedAddress};

const MAX_DERIVE_COUNT: u32 = 1_000;

pub async fn derive(
 State(ctx): State<Arc<GatewayContext>>,
 Json(req): Json<DeriveRequest>,
) -> Result<Json<Vec<DerivedAddress>>, ApiError> {
 if req.xpub.is_empty() {
 return Err(GatewayError::InvalidInput("xpub must not be empty".to_string()).into());
 }
 if req.count == 0 || req.count > MAX_DERIVE_COUNT {
 return Err(GatewayError::InvalidInput(format!("count must be in 1..={MAX_DERIVE_COUNT}")).into());
 }

 let addresses = ctx.derive_addresses.derive(&req).await?;
 Ok(Json(addresses))
}
