//! Gateway HTTP server entry point.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use gateway_api::xpub::UnimplementedDeriveAddresses;
use gateway_api::{build_router, GatewayContext};
use gateway_config::GatewayConfig;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
 /// Configuration file path (YAML). Falls back to `config/gateway.yaml`
 /// and then to built-in defaults when omitted.
 #[arg(short, long)]
 config: Option<PathBuf>,

 /// Bind address.
 #[arg(long, default_value = "0.0.0.0")]
 bind_address: String,

 /// Port.
 #[arg(short, long, default_value_t = 8787)]
 port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
 let args = Args::parse();

 let config = GatewayConfig::load(args.config.as_deref())?;

 tracing_subscriber::registry()
.with(
 tracing_subscriber::EnvFilter::try_from_default_env()
.unwrap_or_else(|_| format!("gateway_api={},warn", config.log_level).into()),
 )
.with(tracing_subscriber::fmt::layer().json())
.init();

 info!(version = env!("CARGO_PKG_VERSION"), "starting chain-data gateway");

 let endpoint_count = config.enabled_endpoints().len();
 if endpoint_count == 0 {
 tracing::warn!("no upstream endpoints configured; all chain-data requests will fail");
 }

 let ctx = Arc::new(GatewayContext::new(config, Arc::new(UnimplementedDeriveAddresses)));
 let app = build_router(ctx);

 let addr: SocketAddr = format!("{}:{}", args.bind_address, args.port).parse()?;
 info!(%addr, endpoint_count, "listening");

 let listener = tokio::net::TcpListener::bind(addr).await?;
 axum::serve(listener, app).await?;

 Ok(())
}
