//! mempool.space-shaped JSON builders for the mock upstream servers
//! used by the scenario suite. Kept separate from the scenarios
//! themselves so each scenario body reads as the behavior under test,
//! not as JSON plumbing.

use serde_json::{json, Value};

fn txid(byte: u8) -> String {
 format!("{:02x}", byte).repeat(32)
}

/// A single-input, single-output confirmed transaction.
pub fn confirmed_tx(id: &str, block_height: u64) -> Value {
 json!({
 "txid": id,
 "version": 2,
 "locktime": 0,
 "size": 225,
 "weight": 900,
 "fee": 500,
 "vin": [{
 "txid": txid(0xaa),
 "vout": 0,
 "sequence": 0xffffffffu32,
 "prevout": {
 "value": 100_000,
 "scriptpubkey": "0014".to_string() + &"ab".repeat(20),
 "scriptpubkey_address": "bc1qfunding00000000000000000000000000000000",
 "scriptpubkey_type": "v0_p2wpkh",
 },
 }],
 "vout": [{
 "value": 99_500,
 "scriptpubkey": "0014".to_string() + &"cd".repeat(20),
 "scriptpubkey_address": "bc1qreceiver0000000000000000000000000000000",
 "scriptpubkey_type": "v0_p2wpkh",
 }],
 "status": {
 "confirmed": true,
 "block_height": block_height,
 "block_hash": "0".repeat(64),
 "block_time": 1_700_000_000i64,
 },
 })
}

/// A transaction with `n_inputs` distinct inputs, used to exercise the
/// large-fan-in path of a UTXO trace.
pub fn large_fanin_tx(id: &str, n_inputs: usize, funding_address_prefix: &str) -> Value {
 let vin: Vec<Value> = (0..n_inputs)
.map(|i| {
 json!({
 "txid": format!("{:064x}", i + 1),
 "vout": 0,
 "sequence": 0xffffffffu32,
 "prevout": {
 "value": 10_000,
 "scriptpubkey": "0014".to_string() + &"aa".repeat(20),
 "scriptpubkey_address": format!("{funding_address_prefix}{i:06}"),
 "scriptpubkey_type": "v0_p2wpkh",
 },
 })
 })
.collect();

 json!({
 "txid": id,
 "version": 2,
 "locktime": 0,
 "size": 150 + n_inputs * 70,
 "weight": (150 + n_inputs * 70) * 4,
 "vin": vin,
 "vout": [{
 "value": (n_inputs as u64) * 9_900,
 "scriptpubkey": "0014".to_string() + &"bb".repeat(20),
 "scriptpubkey_address": "bc1qconsolidated00000000000000000000000000",
 "scriptpubkey_type": "v0_p2wpkh",
 }],
 "status": {
 "confirmed": true,
 "block_height": 820_000,
 "block_hash": "0".repeat(64),
 "block_time": 1_700_000_000i64,
 },
 })
}

/// A CoinJoin-shaped transaction: 5 inputs, 5 equal-valued outputs plus
/// two distinct change-sized outputs, satisfying `detect_coinjoin`'s
/// minimum input/output/equal-output-count thresholds.
pub fn coinjoin_tx(id: &str, inputs_from: &[String]) -> Value {
 let vin: Vec<Value> = inputs_from
.iter()
.enumerate()
.map(|(i, addr)| {
 json!({
 "txid": format!("{:064x}", 1000 + i),
 "vout": 0,
 "sequence": 0xffffffffu32,
 "prevout": {
 "value": 10_000_000,
 "scriptpubkey": "0014".to_string() + &"ee".repeat(20),
 "scriptpubkey_address": addr,
 "scriptpubkey_type": "v0_p2wpkh",
 },
 })
 })
.collect();

 let mut vout: Vec<Value> = (0..5)
.map(|i| {
 json!({
 "value": 1_000_000,
 "scriptpubkey": "0014".to_string() + &"ff".repeat(20),
 "scriptpubkey_address": format!("bc1qparticipant{i:06}000000000000000000000"),
 "scriptpubkey_type": "v0_p2wpkh",
 })
 })
.collect();
 vout.push(json!({
 "value": 3_500_000,
 "scriptpubkey": "0014".to_string() + &"11".repeat(20),
 "scriptpubkey_address": "bc1qchange000000000000000000000000000000000",
 "scriptpubkey_type": "v0_p2wpkh",
 }));

 json!({
 "txid": id,
 "version": 2,
 "locktime": 0,
 "size": 1200,
 "weight": 4800,
 "vin": vin,
 "vout": vout,
 "status": {
 "confirmed": true,
 "block_height": 820_100,
 "block_hash": "0".repeat(64),
 "block_time": 1_700_100_000i64,
 },
 })
}

/// An `/address/{address}` summary response.
pub fn address_summary(funded: u64, spent: u64, tx_count: u64, funded_count: u64, spent_count: u64) -> Value {
 json!({
 "address": "bc1qexample0000000000000000000000000000000",
 "chain_stats": {
 "funded_txo_sum": funded,
 "spent_txo_sum": spent,
 "tx_count": tx_count,
 "funded_txo_count": funded_count,
 "spent_txo_count": spent_count,
 },
 "mempool_stats": {
 "funded_txo_sum": 0,
 "spent_txo_sum": 0,
 "tx_count": 0,
 "funded_txo_count": 0,
 "spent_txo_count": 0,
 },
 })
}

/// One entry in an `/address/{address}/txs` page: a minimal confirmed
/// transaction paying `address` from `funding_address`.
pub fn address_history_entry(id: &str, address: &str, funding_address: &str) -> Value {
 json!({
 "txid": id,
 "version": 2,
 "locktime": 0,
 "size": 225,
 "weight": 900,
 "vin": [{
 "txid": format!("{:064x}", id.len()),
 "vout": 0,
 "sequence": 0xffffffffu32,
 "prevout": {
 "value": 50_000,
 "scriptpubkey": "0014".to_string() + &"22".repeat(20),
 "scriptpubkey_address": funding_address,
 "scriptpubkey_type": "v0_p2wpkh",
 },
 }],
 "vout": [{
 "value": 49_500,
 "scriptpubkey": "0014".to_string() + &"33".repeat(20),
 "scriptpubkey_address": address,
 "scriptpubkey_type": "v0_p2wpkh",
 }],
 "status": {
 "confirmed": true,
 "block_height": 820_000,
 "block_hash": "0".repeat(64),
 "block_time": 1_700_000_000i64,
 },
 })
}
