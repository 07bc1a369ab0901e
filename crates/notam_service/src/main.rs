//! NOTAM service entry point.
//!
//! Wires the feed listener, fallback scraper, sweep timer, and HTTP read
//! API around one shared store.

use anyhow::Result;
use common::Config;
use feed::{FeedConfig, FeedListener};
use metrics_exporter_prometheus::PrometheusBuilder;
use notam_service::{
    create_router, AppState, EquipmentBoard, IngestService, NavaidTable, NotamStore,
};
use scraper::{ScraperConfig, ScraperService};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    info!("starting NOTAM service for {}", config.location);

    // Initialize Prometheus metrics
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], config.metrics_port))
        .install()?;
    info!(
        "Prometheus metrics available at http://0.0.0.0:{}/metrics",
        config.metrics_port
    );

    let store = NotamStore::new();
    let board = EquipmentBoard::new(NavaidTable::builtin(), config.override_ttl);

    // Single ingest channel: both sources funnel through one task so store
    // mutations apply in processing order.
    let (ingest_tx, ingest_rx) = mpsc::channel(256);

    let ingest_handle = tokio::spawn(IngestService::new(store.clone(), board.clone(), ingest_rx).run());

    // Feed listener
    let (feed_shutdown_tx, feed_shutdown_rx) = mpsc::channel::<()>(1);
    let listener = FeedListener::new(
        FeedConfig {
            url: config.nats_url.clone(),
            subject: config.nats_subject.clone(),
            user: config.nats_user.clone(),
            password: config.nats_password.clone(),
            location: config.location.clone(),
            connect_timeout: config.connect_timeout,
            reconnect_backoff: config.reconnect_backoff,
        },
        ingest_tx.clone(),
        feed_shutdown_rx,
    );
    let feed_handle = tokio::spawn(async move {
        if let Err(e) = listener.run().await {
            error!("feed listener failed: {e}");
        }
    });

    // Fallback scraper
    let (scrape_shutdown_tx, scrape_shutdown_rx) = mpsc::channel::<()>(1);
    let scraper_service = ScraperService::new(
        ScraperConfig {
            url: config.scrape_url(),
            location: config.location.clone(),
            interval: config.scrape_interval,
            timeout: config.scrape_timeout,
        },
        ingest_tx.clone(),
        scrape_shutdown_rx,
    )?;
    let scrape_handle = tokio::spawn(async move {
        if let Err(e) = scraper_service.run().await {
            error!("scraper failed: {e}");
        }
    });

    // Expiry sweeper
    let (sweep_shutdown_tx, sweep_shutdown_rx) = mpsc::channel::<()>(1);
    let sweep_handle = tokio::spawn(notam_service::run_sweeper(
        store.clone(),
        board.clone(),
        config.location.clone(),
        config.sweep_interval,
        sweep_shutdown_rx,
    ));

    // The main task keeps no sender; the ingest task stops once the feed
    // and scraper tasks drop theirs.
    drop(ingest_tx);

    // HTTP read API
    let app_state = AppState {
        store,
        board,
        default_location: config.location.clone(),
    };
    let router = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port)).await?;
    info!("HTTP API listening on http://0.0.0.0:{}", config.http_port);
    info!("  GET /health            - Health check");
    info!("  GET /stats             - Store statistics");
    info!("  GET /notams?location=X - Active notices, most urgent first");
    info!("  GET /navaids           - Navaid availability");
    info!("  PUT /navaids/{{id}}      - Operator override");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutting down background tasks");
    let _ = feed_shutdown_tx.send(()).await;
    let _ = scrape_shutdown_tx.send(()).await;
    let _ = sweep_shutdown_tx.send(()).await;

    let _ = feed_handle.await;
    let _ = scrape_handle.await;
    let _ = sweep_handle.await;
    let _ = ingest_handle.await;

    info!("NOTAM service stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
    info!("received shutdown signal");
}
