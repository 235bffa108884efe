//! Upstream Data Service (C6): a clean, chain-semantic API above the
//! endpoint pool — caching, deduplication, pagination, and endpoint
//! preference all live here so callers never see raw upstream JSON
//!.

pub mod dedup;
pub mod error;
pub mod normalize;
pub mod preference;
pub mod service;

pub use error::{ChainDataError, Result};
pub use service::ChainDataService;
