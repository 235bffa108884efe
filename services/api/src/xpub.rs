//! `POST /xpub/derive`: BIP32/49/84 derivation math is
//! explicitly out of scope for the core. This module defines the
//! narrow trait the route depends on and a placeholder implementation
//! so the binary runs standalone; a real deployment injects a
//! `DeriveAddresses` backed by an actual derivation library.

use async_trait::async_trait;
use gateway_types::GatewayError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct DeriveRequest {
 pub xpub: String,
 pub derivation_path: String,
 pub start_index: u32,
 pub count: u32,
 pub include_change: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DerivedAddress {
 pub index: u32,
 pub address: String,
 pub path: String,
 pub is_change: bool,
}

/// Opaque "derive N addresses" collaborator.
#[async_trait]
pub trait DeriveAddresses: Send + Sync {
 async fn derive(&self, req: &DeriveRequest) -> Result<Vec<DerivedAddress>, GatewayError>;
}

/// Fails every request with `InvalidInput`. Used when no real
/// derivation backend has been wired up; keeps the gateway runnable
/// without a BIP32 dependency while making the gap in capability
/// explicit rather than silently returning made-up addresses.
pub struct UnimplementedDeriveAddresses;

#[async_trait]
impl DeriveAddresses for UnimplementedDeriveAddresses {
 async fn derive(&self, _req: &DeriveRequest) -> Result<Vec<DerivedAddress>, GatewayError> {
 Err(GatewayError::InvalidInput(
 "xpub derivation is not configured on this gateway instance".to_string(),
 ))
 }
}
