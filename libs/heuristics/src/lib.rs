//! Pure analytical heuristics over already-fetched chain data (spec
//! §4.6, C7). No network or cache access happens in this crate; every
//! function here is a deterministic transform from transactions (and,
//! in a couple of cases, small amounts of caller-supplied history) to
//! a score or classification.

pub mod amount_patterns;
pub mod change_detection;
pub mod clustering;
pub mod coinjoin;
pub mod peel_chain;
pub mod temporal;

pub use amount_patterns::{detect_amount_anomalies, AmountAnomaly, AmountAnomalyKind};
pub use change_detection::{ChangeDetectionResult, ChangeDetector, ChangeHeuristic};
pub use clustering::ClusterBuilder;
pub use coinjoin::{detect_coinjoin, participating_addresses};
pub use peel_chain::{analyze_peel_hop, chain_statistics};
pub use temporal::{analyze_timing_correlation, transaction_velocity, TemporalPattern, TemporalPatternKind};
