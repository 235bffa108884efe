pub mod client;
pub mod driver;
pub mod pool;
pub mod registry;
pub mod router;

pub use client::HttpClientFactory;
pub use driver::FailoverDriver;
pub use pool::EndpointPool;
pub use registry::{build_endpoints, ConcurrencyTuning, Endpoint, EndpointConfig};
pub use router::Router;
