//! StayHub Server
//!
//! This binary:
//! - Connects to `PostgreSQL` and applies the bundled migrations
//! - Connects to `MongoDB` and creates the review indexes
//! - Exposes Prometheus metrics
//! - Serves the HTTP API until Ctrl+C
//!
//! # Usage
//!
//! ```bash
//! # Start infrastructure
//! docker run -d -p 5432:5432 -e POSTGRES_PASSWORD=postgres -e POSTGRES_DB=stayhub postgres:16
//! docker run -d -p 27017:27017 mongo:7
//!
//! # Run server
//! cargo run --bin server
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use sqlx::postgres::PgPoolOptions;
use stayhub::{AppState, Config, PlatformEnvironment, StartupError, build_router};
use stayhub_core::environment::SystemClock;
use stayhub_mongo::MongoDocumentStore;
use stayhub_postgres::PgRelationalStore;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,stayhub=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting StayHub server...");

    // Load configuration
    let config = Config::from_env();
    tracing::info!(
        mongodb = %config.mongo.url,
        mongodb_database = %config.mongo.database,
        completion_policy = ?config.review.completion,
        "Configuration loaded"
    );

    // Metrics
    let metrics_addr: SocketAddr = config
        .server
        .metrics_address()
        .parse()
        .map_err(|e| StartupError::Metrics(format!("invalid metrics address: {e}")))?;
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .map_err(|e| StartupError::Metrics(e.to_string()))?;
    tracing::info!(%metrics_addr, "✓ Metrics exporter listening");

    // PostgreSQL
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout))
        .connect(&config.database.url)
        .await?;
    let relational = PgRelationalStore::from_pool(pool);
    if config.database.run_migrations {
        relational.migrate().await?;
        tracing::info!("✓ Migrations applied");
    }
    tracing::info!("✓ PostgreSQL connected");

    // MongoDB
    let documents = MongoDocumentStore::connect(&config.mongo.url, &config.mongo.database).await?;
    documents.ensure_indexes().await?;
    tracing::info!("✓ MongoDB connected");

    let env = PlatformEnvironment::new(
        Arc::new(relational),
        Arc::new(documents),
        Arc::new(SystemClock),
    );
    let app = build_router(AppState::new(env, config.review));

    let listener = tokio::net::TcpListener::bind(config.server.bind_address()).await?;
    tracing::info!(address = %config.server.bind_address(), "StayHub server is running");
    tracing::info!("Press Ctrl+C to shutdown");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout))
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C and arms a watchdog that exits the process if draining
/// takes longer than `timeout_secs`.
async fn shutdown_signal(timeout_secs: u64) {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "Failed to listen for Ctrl+C");
    }
    tracing::info!(timeout_secs, "Shutting down gracefully...");

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(timeout_secs)).await;
        tracing::warn!("Graceful shutdown timed out, exiting");
        std::process::exit(1);
    });
}
