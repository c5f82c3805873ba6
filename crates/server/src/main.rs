use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mediaconv_core::aws::{load_sdk_config, resolve_region};
use mediaconv_core::config::{CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use mediaconv_core::{
    load_config_or_env, validate_config, BroadcastChannel, Converter, ImageConverter,
    JobProcessor, NotificationSink, Poller, S3ObjectStore, SqsJobQueue, UpstreamChannel,
};
use mediaconv_server::{create_router, AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Set to `json` for structured log output.
const LOG_FORMAT_ENV: &str = "MEDIACONV_LOG_FORMAT";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    let use_json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    info!(version = VERSION, "Starting media conversion worker");

    let config_path = std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config_or_env(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;

    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(
        config_hash = &config_hash[..16],
        queue = config.queue.queue_name(),
        bucket = %config.storage.bucket,
        "Configuration loaded"
    );

    // AWS clients share one SDK configuration
    let sdk_config = load_sdk_config(&config.aws).await;
    let region = resolve_region(&config.aws, &sdk_config)
        .context("No AWS region configured or discoverable")?;

    let queue = Arc::new(SqsJobQueue::from_sdk_config(
        &sdk_config,
        config.queue.clone(),
    ));
    let store = Arc::new(S3ObjectStore::from_sdk_config(
        &sdk_config,
        config.storage.clone(),
        region.clone(),
    ));
    info!(region = %region, "AWS clients initialized");

    let converter = Arc::new(ImageConverter::new(config.converter.clone()));
    converter
        .validate()
        .await
        .context("Converter validation failed")?;
    info!("Using converter: {}", converter.name());

    // Notification channels
    let mut sink = NotificationSink::new();
    let broadcast = if config.notifier.broadcast.enabled {
        let channel = BroadcastChannel::new(config.notifier.broadcast.capacity);
        sink = sink.with_channel(Arc::new(channel.clone()));
        Some(channel)
    } else {
        None
    };
    if let Some(upstream_config) = &config.notifier.upstream {
        let upstream =
            UpstreamChannel::new(upstream_config).context("Failed to create upstream notifier")?;
        info!(endpoint = upstream.endpoint(), "Upstream notifications enabled");
        sink = sink.with_channel(Arc::new(upstream));
    }
    if sink.is_empty() {
        warn!("No notification channels configured; status events will be dropped");
    }

    let processor = Arc::new(JobProcessor::new(
        config.processor.clone(),
        queue,
        store,
        converter,
        sink,
    ));

    let poller = Arc::new(Poller::new(config.poller.clone(), processor));
    poller.start().await;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = Arc::new(AppState::new(config, Arc::clone(&poller), broadcast));
    let app = create_router(state);

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Stopping poller...");
    poller.stop().await;
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
