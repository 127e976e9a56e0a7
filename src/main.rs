mod config;
mod models;
mod routes;
mod services;

use anyhow::Context;
use axum::{routing::get, Router};
use chrono::{DateTime, Utc};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::services::{addon::AddonService, playlist_dump::PlaylistDumper};

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub addon: AddonService,
    pub start_time: Instant,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            addon: AddonService::new(&config),
            config,
            start_time: Instant::now(),
            started_at: Utc::now(),
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health endpoints
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        .route("/live", get(routes::health::live))
        // Add-on protocol
        .route("/manifest.json", get(routes::addon::manifest))
        .route("/catalog/:type/:id", get(routes::addon::catalog))
        .route("/meta/:type/:id", get(routes::addon::meta))
        .route("/stream/:type/:id", get(routes::addon::stream))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// `dump-m3u <url> [out]`
async fn run_dump(config: &Config, args: &[String]) -> anyhow::Result<()> {
    let url = args
        .first()
        .context("usage: streamcine-server dump-m3u <url> [output file]")?;
    let output = args
        .get(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.data_dir.join(&config.dump_output_file));

    let dumper = PlaylistDumper::new(&config.user_agent, config.fetch_timeout_ms, config.max_retries)?;
    let count = dumper.dump(url, &output).await?;
    tracing::info!("Done: {} entries in {}", count, output.display());

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "streamcine_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = Config::from_env();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("dump-m3u") {
        return run_dump(&config, &args[1..]).await;
    }

    let port = config.port;
    tracing::info!("Starting StreamCine Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Catalog directory: {}", config.data_dir.display());

    // Catalogs load lazily on first request
    let state = Arc::new(AppState::new(config));
    let app = build_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Manifest: http://{}/manifest.json", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
