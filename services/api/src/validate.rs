//! Input validation at the API boundary. Deliberately conservative: reject only what is clearly
//! malformed, since the core does not validate consensus rules and
//! address formats vary across script types.

use gateway_types::GatewayError;

pub const MAX_HOPS: u32 = 50;

pub fn txid(value: &str) -> Result<(), GatewayError> {
 if value.len() == 64 && value.chars().all(|c| c.is_ascii_hexdigit()) {
 Ok(())
 } else {
 Err(GatewayError::InvalidInput(format!("`{value}` is not a valid 32-byte hex txid")))
 }
}

pub fn address(value: &str) -> Result<(), GatewayError> {
 if value.is_empty() || value.len() > 128 {
 return Err(GatewayError::InvalidInput(format!("`{value}` is not a plausible address")));
 }
 Ok(())
}

pub fn hops(hops_before: u32, hops_after: u32) -> Result<(), GatewayError> {
 if hops_before > MAX_HOPS || hops_after > MAX_HOPS {
 return Err(GatewayError::InvalidInput(format!(
 "hops_before/hops_after must each be <= {MAX_HOPS}"
 )));
 }
 Ok(())
}
