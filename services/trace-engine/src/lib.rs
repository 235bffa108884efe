//! Trace Orchestrator (C8) and Streaming Trace Emitter (C9): walks
//! UTXO-backward, address-centered, and peel-chain transaction graphs
//! over the upstream data service, annotating nodes and edges with the
//! heuristic engines.

pub mod error;
pub mod orchestrator;
pub mod stream;

pub use error::{Result, TraceError};
pub use orchestrator::{
 AddressTraceRequest, PeelChainRequest, PeelChainResult, TraceOrchestrator, UtxoTraceRequest,
};
pub use stream::{StreamingTraceEmitter, TraceEvent};
