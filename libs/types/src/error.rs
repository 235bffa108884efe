//! Error taxonomy shared by every layer of the gateway.
//!
//! Retries live only in the endpoint pool's failover driver; everything
//! above it treats a `GatewayError` as terminal for the current logical
//! request and either surfaces it or falls back to an alternative path.

use thiserror::Error;

/// Result type alias used throughout the gateway crates.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Top-level error taxonomy.
#[derive(Debug, Error)]
pub enum GatewayError {
 /// No endpoint produced a result before the request's total-timeout
 /// budget was exhausted. Surfaced by the upstream data service to
 /// callers; becomes HTTP 500 at the adapter.
 #[error("all upstream endpoints failed for {path}")]
 AllUpstreamsFailed {
 /// The request path that could not be served.
 path: String,
 },

 /// A trace could not even fetch its starting transaction.
 #[error("starting transaction {txid} is unavailable from any upstream")]
 StartingTransactionUnavailable {
 /// The txid the trace was asked to start from.
 txid: String,
 },

 /// Malformed txid/address/xpub or an out-of-range parameter
 /// (e.g. `hops_before` > 50). Never reaches the endpoint pool.
 #[error("invalid input: {0}")]
 InvalidInput(String),

 /// Caller-initiated cancellation. Propagated without being logged as
 /// an error.
 #[error("operation cancelled")]
 Cancelled,

 /// The external KV cache is unreachable. Callers degrade gracefully
 /// and proceed without a cache; this variant exists so a caller *can*
 /// observe and log the condition, but it must never propagate past
 /// the cache-lookup call site.
 #[error("cache backend unavailable: {0}")]
 CacheUnavailable(String),

 /// Wraps a lower-level JSON decoding failure encountered while
 /// normalizing an upstream response.
 #[error("failed to normalize upstream response: {0}")]
 Normalization(String),

 /// The requested entity does not exist on-chain. Upstream 404s are
 /// normalized to `None` inside the endpoint pool (§4.3); a fetcher
 /// raises this variant only where absence is itself the failure mode
 /// (a missing transaction, not an empty address history).
 #[error("{kind} not found: {id}")]
 NotFound {
 /// What kind of entity was missing (`"transaction"`, `"address"`,...).
 kind: &'static str,
 /// The identifier that was looked up.
 id: String,
 },
}

impl GatewayError {
 /// Whether this error represents a whole-request-level failure that
 /// should surface as a non-2xx response, as opposed to a partial
 /// result with missing fields.
 pub fn is_terminal(&self) -> bool {
 matches!(
 self,
 GatewayError::AllUpstreamsFailed {.. }
 | GatewayError::StartingTransactionUnavailable {.. }
 | GatewayError::InvalidInput(_)
 | GatewayError::NotFound {.. }
 )
 }
}
