//! Flood overlay demo host.
//!
//! Registers the configured schemes once at startup, then serves overlay
//! tiles over HTTP.

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use overlay_api::app;
use protocol::{
    FileImageLoader, HttpImageLoader, HttpLoaderConfig, ImageLoader, ProtocolConfig,
    ProtocolRegistry,
};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "overlay-api")]
#[command(about = "Flood-depth overlay tile server")]
struct Args {
    /// Listen address
    #[arg(short, long, env = "OVERLAY_LISTEN", default_value = "0.0.0.0:8080")]
    listen: String,

    /// Log level
    #[arg(long, env = "OVERLAY_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Protocol config (JSON). Defaults to shinsui + numpng.
    #[arg(short, long, env = "OVERLAY_CONFIG")]
    config: Option<PathBuf>,

    /// Serve source tiles from this directory instead of fetching over HTTP
    #[arg(long, env = "OVERLAY_TILE_ROOT")]
    tile_root: Option<PathBuf>,

    /// Source fetch timeout in seconds
    #[arg(long, env = "OVERLAY_REQUEST_TIMEOUT", default_value_t = 30)]
    request_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting flood overlay server");

    let config = match &args.config {
        Some(path) => ProtocolConfig::from_file(path)
            .with_context(|| format!("loading protocol config {}", path.display()))?,
        None => ProtocolConfig::default(),
    };

    let loader: Arc<dyn ImageLoader> = match &args.tile_root {
        Some(root) => {
            info!(root = %root.display(), "Serving source tiles from disk");
            Arc::new(FileImageLoader::new(root))
        }
        None => {
            let loader_config = HttpLoaderConfig {
                request_timeout: std::time::Duration::from_secs(args.request_timeout),
                ..Default::default()
            };
            Arc::new(HttpImageLoader::new(loader_config)?)
        }
    };

    let registry = Arc::new(ProtocolRegistry::new());
    config.register(&registry, loader)?;
    info!(schemes = ?registry.schemes(), "Protocols registered");

    let addr: SocketAddr = args.listen.parse()?;
    info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(registry)).await?;

    Ok(())
}
