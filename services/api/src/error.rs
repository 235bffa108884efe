//! Maps the shared error taxonomy onto HTTP status codes.
//! This is the one place in the workspace that is allowed to think in
//! terms of status codes; everything below the adapter speaks
//! `GatewayError`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gateway_types::GatewayError;
use serde_json::json;

pub struct ApiError(pub GatewayError);

impl From<GatewayError> for ApiError {
 fn from(err: GatewayError) -> Self {
 ApiError(err)
 }
}

impl From<chain_data::ChainDataError> for ApiError {
 fn from(err: chain_data::ChainDataError) -> Self {
 ApiError(err.into())
 }
}

impl From<trace_engine::TraceError> for ApiError {
 fn from(err: trace_engine::TraceError) -> Self {
 match err {
 trace_engine::TraceError::Gateway(inner) => ApiError(inner),
 }
 }
}

impl IntoResponse for ApiError {
 fn into_response(self) -> Response {
 let (status, error_type) = match &self.0 {
 GatewayError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "InvalidInput"),
 GatewayError::NotFound {.. } => (StatusCode::NOT_FOUND, "NotFound"),
 GatewayError::StartingTransactionUnavailable {.. } => {
 (StatusCode::BAD_GATEWAY, "StartingTransactionUnavailable")
 }
 GatewayError::AllUpstreamsFailed {.. } => {
 (StatusCode::INTERNAL_SERVER_ERROR, "AllUpstreamsFailed")
 }
 GatewayError::Cancelled => (StatusCode::INTERNAL_SERVER_ERROR, "Cancelled"),
 GatewayError::CacheUnavailable(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CacheUnavailable"),
 GatewayError::Normalization(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Normalization"),
 };
 let body = Json(json!({"error": self.0.to_string(), "type": error_type}));
 (status, body).into_response()
 }
}
