//! Normalized data model for the blockchain analysis gateway.
//!
//! This crate has no knowledge of HTTP, caching, or tracing — it only
//! defines the shapes that flow between the upstream data service, the
//! heuristic engines, and the trace orchestrator (see `chain-data` and
//! `trace-engine`).

pub mod address;
pub mod cluster;
pub mod coinjoin;
pub mod endpoint;
pub mod error;
pub mod graph;
pub mod peel_chain;
pub mod transaction;

pub use address::Address;
pub use cluster::{Cluster, ClusterHeuristic};
pub use coinjoin::{CoinJoinKind, CoinJoinRecord};
pub use endpoint::{EndpointPriority, EndpointSnapshot};
pub use error::{GatewayError, Result};
pub use graph::{Edge, Node, NodeKind, TraceGraph};
pub use peel_chain::{PeelChainHop, PeelChainStats, PeelPattern};
pub use transaction::{Input, Output, ScriptType, Transaction, Utxo};
