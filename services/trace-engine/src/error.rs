//! Error taxonomy for the trace orchestrator.
//!
//! Every failure the orchestrator raises directly is already a
//! `GatewayError` variant (`InvalidInput`, `StartingTransactionUnavailable`);
//! this crate's enum exists only to carry those through without forcing
//! every call site to name `gateway_types::GatewayError` explicitly.

use gateway_types::GatewayError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraceError {
 #[error(transparent)]
 Gateway(#[from] GatewayError),
}

impl From<chain_data::ChainDataError> for TraceError {
 fn from(err: chain_data::ChainDataError) -> Self {
 TraceError::Gateway(err.into())
 }
}

pub type Result<T> = std::result::Result<T, TraceError>;
