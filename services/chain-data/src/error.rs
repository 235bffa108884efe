//! Error taxonomy for the upstream data service.
//!
//! C6 introduces no error modes beyond the shared taxonomy in
//! `gateway_types::GatewayError`; this crate's own enum exists to carry
//! one additional variant (malformed upstream JSON) that is local to
//! normalization and should never reach the API boundary as anything
//! but `InvalidInput`/`Normalization`.

use gateway_types::GatewayError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainDataError {
 #[error("malformed upstream response: {0}")]
 MalformedResponse(String),

 #[error(transparent)]
 Gateway(#[from] GatewayError),
}

impl From<ChainDataError> for GatewayError {
 fn from(err: ChainDataError) -> Self {
 match err {
 ChainDataError::Gateway(inner) => inner,
 ChainDataError::MalformedResponse(msg) => GatewayError::Normalization(msg),
 }
 }
}

pub type Result<T> = std::result::Result<T, ChainDataError>;
