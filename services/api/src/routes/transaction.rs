//! `GET /transaction/{txid}`: the normalized transaction plus
//! the heuristic annotations the UI renders inline (change output,
//! CoinJoin classification, fee rate).

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use gateway_types::{CoinJoinRecord, Transaction};
use heuristics::{detect_coinjoin, ChangeDetectionResult, ChangeDetector};
use serde::Serialize;

use crate::context::GatewayContext;
use crate::error::ApiError;
use crate::validate;

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
 #[serde(flatten)]
 pub transaction: Transaction,
 pub change: Option<ChangeDetectionResult>,
 pub coinjoin: Option<CoinJoinRecord>,
 /// Satoshis per virtual byte; `None` when the fee itself is unknown.
 pub fee_rate_sat_per_vbyte: Option<f64>,
}

pub async fn get_transaction(
 State(ctx): State<Arc<GatewayContext>>,
 Path(txid): Path<String>,
) -> Result<Json<TransactionResponse>, ApiError> {
 validate::txid(&txid)?;
 let transaction = ctx.chain_data.fetch_transaction(&txid).await?;

 let detector = ChangeDetector::new();
 let change = detector.identify_change_output(&transaction);
 let coinjoin = detect_coinjoin(&transaction);
 let fee_rate_sat_per_vbyte = transaction
.fee
.filter(|_| transaction.vsize > 0)
.map(|fee| fee as f64 / transaction.vsize as f64);

 Ok(Json(TransactionResponse {
 transaction,
 change,
 coinjoin,
 fee_rate_sat_per_vbyte,
 }))
}
