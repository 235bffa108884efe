//! Cache abstraction for the chain-data gateway.
//!
//! The backing store itself is explicitly out of scope: this crate
//! specifies a key/value contract with TTL and ships one concrete,
//! in-process implementation (`InMemoryCache`) so the gateway runs
//! standalone. A production deployment swaps in a different
//! `ChainCache` implementation (e.g. backed by an external KV service)
//! without touching callers.
//!
//! Cache failures never propagate: every method degrades to a miss and
//! logs a warning rather than returning an error to the caller (spec
//! §5: "failures degrade gracefully").

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

/// Cache key formatting.
pub mod keys {
 pub fn transaction(txid: &str) -> String {
 format!("tx:{txid}")
 }

 pub fn address_history(address: &str) -> String {
 format!("addr_history:{address}")
 }
}

#[async_trait]
pub trait ChainCache: Send + Sync {
 /// Raw bytes get/set so the trait does not need to be generic over
 /// the stored type. Callers use [`ChainCache::get_json`] /
 /// [`ChainCache::set_json`] for the common case.
 async fn get_raw(&self, key: &str) -> Option<Vec<u8>>;
 async fn set_raw(&self, key: &str, value: Vec<u8>, ttl: Duration);

 async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
 let raw = self.get_raw(key).await?;
 match serde_json::from_slice(&raw) {
 Ok(value) => Some(value),
 Err(err) => {
 warn!(%key, error = %err, "cache entry failed to deserialize, treating as miss");
 None
 }
 }
 }

 async fn set_json<T: Serialize + Sync>(&self, key: &str, value: &T, ttl: Duration) {
 match serde_json::to_vec(value) {
 Ok(raw) => self.set_raw(key, raw, ttl).await,
 Err(err) => warn!(%key, error = %err, "failed to serialize value for cache"),
 }
 }
}

struct Entry {
 value: Vec<u8>,
 expires_at: Instant,
}

/// In-process cache backed by a `DashMap`, entries pruned lazily on
/// read. Suitable for a single gateway instance; not shared across
/// processes.
#[derive(Default)]
pub struct InMemoryCache {
 entries: DashMap<String, Entry>,
}

impl InMemoryCache {
 pub fn new() -> Self {
 Self {
 entries: DashMap::new(),
 }
 }

 pub fn len(&self) -> usize {
 self.entries.len()
 }

 pub fn is_empty(&self) -> bool {
 self.entries.is_empty()
 }
}

#[async_trait]
impl ChainCache for InMemoryCache {
 async fn get_raw(&self, key: &str) -> Option<Vec<u8>> {
 let now = Instant::now();
 let hit = self.entries.get(key).and_then(|entry| {
 if entry.expires_at > now {
 Some(entry.value.clone())
 } else {
 None
 }
 });
 if hit.is_none() {
 self.entries.remove(key);
 }
 hit
 }

 async fn set_raw(&self, key: &str, value: Vec<u8>, ttl: Duration) {
 self.entries.insert(
 key.to_string(),
 Entry {
 value,
 expires_at: Instant::now() + ttl,
 },
 );
 }
}
