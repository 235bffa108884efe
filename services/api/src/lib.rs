//! External API Adapter (C10, ). Thin translation between
//! HTTP/SSE transport and the chain-data/trace-engine services: this
//! crate owns routing, request parsing, status-code mapping, and SSE
//! framing, and nothing else. Request parsing, CORS, and response
//! serialization conventions otherwise follow axum/tower-http defaults,
//! as the spec treats the HTTP framework itself as an external
//! collaborator.

pub mod context;
pub mod error;
pub mod routes;
pub mod sse;
pub mod validate;
pub mod xpub;

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use context::GatewayContext;

/// Builds the full route table. Kept as a free function over
/// an `Arc<GatewayContext>` rather than a method on some process
/// singleton, so tests can mount the same router against a context
/// wired to mock endpoints.
pub fn build_router(ctx: Arc<GatewayContext>) -> Router {
 Router::new()
.route("/address/{address}", get(routes::address::get_address))
.route("/address/batch", post(routes::address::batch_addresses))
.route("/transaction/{txid}", get(routes::transaction::get_transaction))
.route("/trace/utxo", post(routes::trace::trace_utxo))
.route("/trace/address", post(routes::trace::trace_address))
.route("/trace/address/stream", get(routes::trace::trace_address_stream))
.route("/trace/peel-chain", post(routes::trace::trace_peel_chain))
.route("/xpub/derive", post(routes::xpub::derive))
.route("/metrics/mempool", get(routes::servers::metrics_mempool))
.route("/servers/list", get(routes::servers::servers_list))
.route("/servers/test", post(routes::servers::servers_test))
.with_state(ctx)
.layer(TraceLayer::new_for_http())
.layer(CorsLayer::permissive())
.layer(tower_http::timeout::TimeoutLayer::new(Duration::from_secs(120)))
}

#[cfg(test)]
mod tests {
 use super::*;
 use axum::body::Body;
 use axum::http::{Request, StatusCode};
 use gateway_config::GatewayConfig;
 use tower::ServiceExt;
 use xpub::UnimplementedDeriveAddresses;

 fn test_context() -> Arc<GatewayContext> {
 Arc::new(GatewayContext::new(GatewayConfig::default(), Arc::new(UnimplementedDeriveAddresses)))
 }

 #[tokio::test]
 async fn transaction_lookup_with_no_endpoints_returns_500() {
 let app = build_router(test_context());
 let response = app
.oneshot(Request::builder().uri(format!("/transaction/{}", "a".repeat(64))).body(Body::empty()).unwrap())
.await
.unwrap();
 assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
 }

 #[tokio::test]
 async fn transaction_lookup_with_malformed_txid_returns_400() {
 let app = build_router(test_context());
 let response = app
.oneshot(Request::builder().uri("/transaction/not-a-txid").body(Body::empty()).unwrap())
.await
.unwrap();
 assert_eq!(response.status(), StatusCode::BAD_REQUEST);
 }

 #[tokio::test]
 async fn metrics_endpoint_returns_empty_list_with_no_configured_endpoints() {
 let app = build_router(test_context());
 let response = app
.oneshot(Request::builder().uri("/metrics/mempool").body(Body::empty()).unwrap())
.await
.unwrap();
 assert_eq!(response.status(), StatusCode::OK);
 }

 #[tokio::test]
 async fn xpub_derive_without_backend_configured_returns_400() {
 let app = build_router(test_context());
 let body = serde_json::json!({
 "xpub": "xpub6Dtest",
 "derivation_path": "m/84'/0'/0'",
 "start_index": 0,
 "count": 5,
 "include_change": false,
 });
 let response = app
.oneshot(
 Request::builder()
.method("POST")
.uri("/xpub/derive")
.header("content-type", "application/json")
.body(Body::from(body.to_string()))
.unwrap(),
 )
.await
.unwrap();
 assert_eq!(response.status(), StatusCode::BAD_REQUEST);
 }
}
