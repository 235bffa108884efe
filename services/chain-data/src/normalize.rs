//! Response normalization: mempool-style upstream JSON to
//! the crate's `Transaction`/`Address` schema. This is the only place
//! that looks at raw upstream field names.

use gateway_types::{Address, Input, Output, ScriptType, Transaction};
use serde_json::Value;

use crate::error::{ChainDataError, Result};

fn field<'a>(value: &'a Value, name: &str) -> Result<&'a Value> {
 value
.get(name)
.ok_or_else(|| ChainDataError::MalformedResponse(format!("missing field `{name}`")))
}

fn as_u64(value: &Value, name: &str) -> Result<u64> {
 field(value, name)?
.as_u64()
.ok_or_else(|| ChainDataError::MalformedResponse(format!("field `{name}` is not an unsigned integer")))
}

fn as_u32(value: &Value, name: &str) -> Result<u32> {
 Ok(as_u64(value, name)? as u32)
}

fn as_str<'a>(value: &'a Value, name: &str) -> Result<&'a str> {
 field(value, name)?
.as_str()
.ok_or_else(|| ChainDataError::MalformedResponse(format!("field `{name}` is not a string")))
}

/// Normalize one upstream `/tx/{txid}` response.
pub fn normalize_transaction(raw: &Value) -> Result<Transaction> {
 let txid = as_str(raw, "txid")?.to_string();
 let version = raw.get("version").and_then(Value::as_i64).unwrap_or(2) as i32;
 let locktime = raw.get("locktime").and_then(Value::as_u64).unwrap_or(0) as u32;
 let size = as_u32(raw, "size")?;
 let weight = as_u32(raw, "weight")?;
 let vsize = raw
.get("vsize")
.and_then(Value::as_u64)
.map(|v| v as u32)
.unwrap_or_else(|| weight.div_ceil(4));

 let vin = field(raw, "vin")?
.as_array()
.ok_or_else(|| ChainDataError::MalformedResponse("`vin` is not an array".to_string()))?;
 let inputs = vin.iter().map(normalize_input).collect::<Result<Vec<_>>>()?;

 let vout = field(raw, "vout")?
.as_array()
.ok_or_else(|| ChainDataError::MalformedResponse("`vout` is not an array".to_string()))?;
 let outputs = vout
.iter()
.enumerate()
.map(|(n, out)| normalize_output(n as u32, out))
.collect::<Result<Vec<_>>>()?;

 let fee = raw.get("fee").and_then(Value::as_u64).or_else(|| {
 let total_in: Option<u64> = inputs.iter().map(|i: &Input| i.prev_value).sum();
 let total_out: u64 = outputs.iter().map(|o: &Output| o.value).sum();
 total_in.and_then(|total_in| total_in.checked_sub(total_out))
 });

 let (block_height, block_hash, block_time) = match raw.get("status") {
 Some(status) if status.get("confirmed").and_then(Value::as_bool).unwrap_or(false) => (
 status.get("block_height").and_then(Value::as_u64).map(|v| v as u32),
 status.get("block_hash").and_then(Value::as_str).map(str::to_string),
 status.get("block_time").and_then(Value::as_i64),
 ),
 _ => (None, None, None),
 };

 Ok(Transaction {
 txid,
 version,
 locktime,
 size,
 vsize,
 weight,
 fee,
 block_height,
 block_hash,
 block_time,
 inputs,
 outputs,
 })
}

fn normalize_input(raw: &Value) -> Result<Input> {
 let prev_txid = as_str(raw, "txid")?.to_string();
 let prev_vout = as_u32(raw, "vout")?;
 let sequence = raw.get("sequence").and_then(Value::as_u64).unwrap_or(0xffff_ffff) as u32;

 let prevout = raw.get("prevout").filter(|p| !p.is_null());
 let prev_address = prevout
.and_then(|p| p.get("scriptpubkey_address"))
.and_then(Value::as_str)
.map(str::to_string);
 let prev_value = prevout.and_then(|p| p.get("value")).and_then(Value::as_u64);
 let prev_script_type = prevout
.and_then(|p| p.get("scriptpubkey_type"))
.and_then(Value::as_str)
.map(ScriptType::from_upstream);

 let script_sig = raw
.get("scriptsig")
.and_then(Value::as_str)
.map(|hex_str| hex::decode(hex_str).unwrap_or_default());

 let witness = raw
.get("witness")
.and_then(Value::as_array)
.map(|items| {
 items
.iter()
.filter_map(Value::as_str)
.map(|hex_str| hex::decode(hex_str).unwrap_or_default())
.collect()
 })
.unwrap_or_default();

 Ok(Input {
 prev_txid,
 prev_vout,
 sequence,
 prev_address,
 prev_value,
 prev_script_type,
 script_sig,
 witness,
 })
}

fn normalize_output(n: u32, raw: &Value) -> Result<Output> {
 let value = as_u64(raw, "value")?;
 let script_pubkey = raw
.get("scriptpubkey")
.and_then(Value::as_str)
.map(|hex_str| hex::decode(hex_str).unwrap_or_default())
.unwrap_or_default();
 let address = raw.get("scriptpubkey_address").and_then(Value::as_str).map(str::to_string);
 let script_type = raw
.get("scriptpubkey_type")
.and_then(Value::as_str)
.map(ScriptType::from_upstream)
.unwrap_or(ScriptType::Unknown);

 Ok(Output {
 n,
 value,
 script_pubkey,
 address,
 script_type,
 spent: raw.get("spent").and_then(Value::as_bool),
 spending_txid: raw.get("spending_txid").and_then(Value::as_str).map(str::to_string),
 })
}

/// Normalize one upstream `/address/{address}` summary response into an
/// `Address` record. `chain_stats`/`mempool_stats`
/// sub-objects are treated as absent-means-zero: a missing sub-object
/// carries the same meaning as one with every field at 0.
pub fn normalize_address_summary(address: &str, raw: &Value) -> Address {
 let stat = |section: &str, field: &str| -> u64 {
 raw.get(section).and_then(|s| s.get(field)).and_then(Value::as_u64).unwrap_or(0)
 };

 let confirmed_received = stat("chain_stats", "funded_txo_sum");
 let confirmed_spent = stat("chain_stats", "spent_txo_sum");
 let mempool_received = stat("mempool_stats", "funded_txo_sum");
 let mempool_spent = stat("mempool_stats", "spent_txo_sum");

 Address {
 address: address.to_string(),
 confirmed_balance: confirmed_received as i64 - confirmed_spent as i64,
 mempool_delta: mempool_received as i64 - mempool_spent as i64,
 total_received: confirmed_received,
 total_sent: confirmed_spent,
 tx_count: stat("chain_stats", "tx_count") + stat("mempool_stats", "tx_count"),
 receiving_count: stat("chain_stats", "funded_txo_count"),
 spending_count: stat("chain_stats", "spent_txo_count"),
 }
}
