//! Common-input clusters.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Which heuristic produced a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClusterHeuristic {
 CommonInput,
}

/// A set of addresses believed to belong to one entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
 pub cluster_id: String,
 pub addresses: Vec<String>,
 pub confidence: f64,
 pub primary_heuristic: ClusterHeuristic,
 pub tx_count: u64,
}

impl Cluster {
 /// Deterministic id: the hex-encoded, 16-byte-truncated SHA-256 of
 /// the sorted, newline-joined member addresses.
 pub fn id_for(addresses: &[String]) -> String {
 let mut sorted: Vec<&str> = addresses.iter().map(String::as_str).collect();
 sorted.sort_unstable();
 let joined = sorted.join("\n");
 let digest = Sha256::digest(joined.as_bytes());
 hex::encode(&digest[..8])
 }
}

#[cfg(test)]
mod tests {
 use super::*;

 #[test]
 fn cluster_id_is_order_independent() {
 let a = Cluster::id_for(&["addr2".to_string(), "addr1".to_string()]);
 let b = Cluster::id_for(&["addr1".to_string(), "addr2".to_string()]);
 assert_eq!(a, b);
 }

 #[test]
 fn cluster_id_changes_with_membership() {
 let a = Cluster::id_for(&["addr1".to_string()]);
 let b = Cluster::id_for(&["addr1".to_string(), "addr2".to_string()]);
 assert_ne!(a, b);
 }
}
