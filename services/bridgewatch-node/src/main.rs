use axum::{
    routing::{get, post},
    Router,
};
use bridgewatch_core::logging;
use bridgewatch_fleet::{
    load_or_seed, BroadcastSink, JsonFileStore, MonitorService, Registry, SnapshotStore,
    SnapshotWriter,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tracing::{error, info};

mod config;
mod error;
mod feed;
mod handlers;
mod state;

use config::NodeConfig;
use feed::FeedServer;
use state::AppState;

const NODE_PROTOCOL_VERSION: u32 = 1;
const NODE_RUNTIME_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
struct NodeVersionHandshake {
    version: &'static str,
    runtime_version: u32,
    protocol_version: u32,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/regions",
            get(handlers::list_regions).post(handlers::create_region),
        )
        .route("/api/regions/list", get(handlers::region_summaries))
        .route("/api/bridges", post(handlers::create_bridge))
        .route(
            "/api/bridges/:id",
            get(handlers::get_bridge).delete(handlers::delete_bridge),
        )
        .route(
            "/api/bridges/:id/recalibrate",
            post(handlers::recalibrate_bridge),
        )
        .route("/api/data/:bridge_id", post(handlers::ingest_reading))
        .with_state(state)
        .layer(ServiceBuilder::new().into_inner())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|arg| arg == "--version-json") {
        let handshake = NodeVersionHandshake {
            version: env!("CARGO_PKG_VERSION"),
            runtime_version: NODE_RUNTIME_VERSION,
            protocol_version: NODE_PROTOCOL_VERSION,
        };
        println!("{}", serde_json::to_string(&handshake)?);
        return Ok(());
    }

    let config_path = parse_config_path(&args)?;
    let config = NodeConfig::load(config_path.as_deref())?;
    logging::init_with(config.log_format);

    let store: Arc<dyn SnapshotStore> = Arc::new(JsonFileStore::new(&config.data_file));
    let snapshot = load_or_seed(store.as_ref());
    let registry = Registry::from_snapshot(snapshot.clone(), config.monitor.clone());
    let (snapshots, _writer) = SnapshotWriter::spawn(store, snapshot);

    let events = BroadcastSink::new(config.event_buffer);
    let service = Arc::new(MonitorService::new(
        registry,
        Arc::new(events.clone()),
        snapshots,
    ));
    Arc::clone(&service).spawn_liveness();

    let feed = Arc::new(FeedServer::new(events.clone()));
    let feed_addr = config.feed_addr;
    tokio::spawn(async move {
        if let Err(e) = feed.run(feed_addr).await {
            error!("Event feed stopped: {}", e);
        }
    });

    let app = router(Arc::new(AppState::new(service, events)));
    let listener = TcpListener::bind(config.listen_addr).await?;
    info!(
        data_file = %config.data_file.display(),
        "bridgewatch-node listening on {}",
        config.listen_addr
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// `--config <path>` is optional; defaults and environment apply without it.
fn parse_config_path(args: &[String]) -> anyhow::Result<Option<PathBuf>> {
    let mut args_iter = args.iter();
    while let Some(arg) = args_iter.next() {
        if arg == "--config" {
            if let Some(path) = args_iter.next() {
                return Ok(Some(PathBuf::from(path)));
            }
            anyhow::bail!("--config was provided without a path");
        }
    }

    Ok(None)
}
