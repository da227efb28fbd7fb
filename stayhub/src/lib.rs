//! # StayHub
//!
//! Booking platform backend over two stores:
//!
//! - `PostgreSQL` owns users, properties and bookings and is reached only
//!   through stored routines ([`stayhub_postgres`])
//! - `MongoDB` owns reviews and per-property rating summaries, queried
//!   through aggregation pipelines ([`stayhub_mongo`])
//!
//! # Architecture
//!
//! ```text
//!   HTTP (axum)  ──►  api::*  ──►  app services  ──►  RelationalStore ─► PostgreSQL
//!                                      │
//!                                      └──────────►  DocumentStore ───► MongoDB
//! ```
//!
//! The central flow is the review workflow: a review is accepted only after
//! the relational store confirmed that its booking exists for the property
//! and has been completed. Once stored, the property's rating summary is
//! recomputed from all of its reviews.
//!
//! Stores and clock are injected through [`app::PlatformEnvironment`]; the
//! services never reach for global state, so the whole application runs
//! against the in-memory stores of `stayhub-testing` in tests.

pub mod api;
pub mod app;
pub mod config;
pub mod server;

pub use app::PlatformEnvironment;
pub use config::Config;
pub use server::{AppState, build_router};

use thiserror::Error;

/// Errors that stop the server from starting.
#[derive(Error, Debug)]
pub enum StartupError {
    /// A store could not be reached or prepared
    #[error("Store initialization failed: {0}")]
    Store(#[from] stayhub_core::StoreError),

    /// The `PostgreSQL` pool could not be created
    #[error("Database pool error: {0}")]
    Database(#[from] sqlx::Error),

    /// The Prometheus exporter could not be installed
    #[error("Metrics exporter error: {0}")]
    Metrics(String),

    /// An address could not be bound or served
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}
