//! The normalized transaction shape.

use serde::{Deserialize, Serialize};

/// Output script classification. Stripped of the `v0_`/`v1_` segwit
/// version prefixes upstream servers sometimes attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScriptType {
 P2pk,
 P2pkh,
 P2sh,
 P2wpkh,
 P2wsh,
 P2tr,
 Unknown,
}

impl ScriptType {
 /// Map a raw `scriptpubkey_type` string (possibly `v0_p2wpkh`,
 /// `v1_p2tr`,...) to the canonical set. Idempotent on already
 /// canonical values.
 pub fn from_upstream(raw: &str) -> Self {
 let stripped = raw.strip_prefix("v0_").or_else(|| raw.strip_prefix("v1_")).unwrap_or(raw);
 match stripped {
 "p2pk" => ScriptType::P2pk,
 "p2pkh" => ScriptType::P2pkh,
 "p2sh" => ScriptType::P2sh,
 "p2wpkh" => ScriptType::P2wpkh,
 "p2wsh" => ScriptType::P2wsh,
 "p2tr" => ScriptType::P2tr,
 _ => ScriptType::Unknown,
 }
 }
}

/// A single transaction input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Input {
 pub prev_txid: String,
 pub prev_vout: u32,
 pub sequence: u32,
 /// Resolved from upstream `prevout` data when present; never fetched
 /// separately.
 pub prev_address: Option<String>,
 pub prev_value: Option<u64>,
 /// Script type of the prevout being spent, resolved the same way as
 /// `prev_address`/`prev_value` — from upstream `prevout` data, never
 /// fetched separately. Feeds the change-detection script-type-match
 /// heuristic.
 pub prev_script_type: Option<ScriptType>,
 pub script_sig: Option<Vec<u8>>,
 pub witness: Vec<Vec<u8>>,
}

impl Input {
 /// Coinbase inputs reference the all-zero prevout and are skipped by
 /// the trace engine.
 pub fn is_coinbase(&self) -> bool {
 self.prev_txid.chars().all(|c| c == '0')
 }
}

/// A single transaction output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Output {
 pub n: u32,
 pub value: u64,
 pub script_pubkey: Vec<u8>,
 pub address: Option<String>,
 pub script_type: ScriptType,
 pub spent: Option<bool>,
 pub spending_txid: Option<String>,
}

impl Output {
 /// Display placeholder used when an output carries no resolvable
 /// address — the only script parsing this crate does,
 /// purely for presentation.
 pub fn display_placeholder(&self) -> String {
 if let Some(addr) = &self.address {
 return addr.clone();
 }
 match self.script_type {
 ScriptType::P2pk => {
 let hex_key = hex::encode(&self.script_pubkey);
 let preview: String = hex_key.chars().take(16).collect();
 format!("P2PK: {preview}…")
 }
 other => format!("No Address ({other:?})"),
 }
 }
}

/// A normalized on-chain (or mempool) transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
 pub txid: String,
 pub version: i32,
 pub locktime: u32,
 pub size: u32,
 pub vsize: u32,
 pub weight: u32,
 pub fee: Option<u64>,
 /// `None` means mempool-only.
 pub block_height: Option<u32>,
 pub block_hash: Option<String>,
 pub block_time: Option<i64>,
 pub inputs: Vec<Input>,
 pub outputs: Vec<Output>,
}

impl Transaction {
 pub fn is_confirmed(&self) -> bool {
 self.block_height.is_some()
 }

 /// Non-coinbase inputs, in order — the set the trace engine walks.
 pub fn spendable_inputs(&self) -> impl Iterator<Item = &Input> {
 self.inputs.iter().filter(|i| !i.is_coinbase())
 }

 pub fn total_input_value(&self) -> Option<u64> {
 let mut total = 0u64;
 for input in &self.inputs {
 total = total.checked_add(input.prev_value?)?;
 }
 Some(total)
 }

 pub fn total_output_value(&self) -> u64 {
 self.outputs.iter().map(|o| o.value).sum()
 }
}

/// An unspent transaction output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Utxo {
 pub txid: String,
 pub vout: u32,
 pub value: u64,
 pub address: Option<String>,
 pub script_type: ScriptType,
 pub height: Option<u32>,
 pub confirmations: Option<u32>,
}
