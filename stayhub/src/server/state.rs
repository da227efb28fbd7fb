//! Application state for the StayHub HTTP server.
//!
//! Holds one instance of every service; handlers pull the service they need
//! through [`FromRef`], so most of them take `State<Arc<Service>>` rather
//! than the whole state.

use crate::app::{
    Catalog, DashboardComposer, PlatformEnvironment, RatingAggregator, ReviewQueries,
    ReviewWorkflow,
};
use axum::extract::FromRef;
use stayhub_core::review::ReviewPolicy;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// It's cloned (cheaply via Arc) for each request.
#[derive(Clone)]
pub struct AppState {
    /// Stores and clock, kept for readiness probes
    pub env: PlatformEnvironment,
    /// Review workflow orchestrator
    pub workflow: Arc<ReviewWorkflow>,
    /// Rating aggregator
    pub ratings: Arc<RatingAggregator>,
    /// Review listings and analytics
    pub reviews: Arc<ReviewQueries>,
    /// Cross-store dashboards
    pub dashboards: Arc<DashboardComposer>,
    /// Users, properties and bookings
    pub catalog: Arc<Catalog>,
}

impl AppState {
    /// Build every service on top of `env`.
    #[must_use]
    pub fn new(env: PlatformEnvironment, policy: ReviewPolicy) -> Self {
        Self {
            workflow: Arc::new(ReviewWorkflow::new(&env, policy)),
            ratings: Arc::new(RatingAggregator::new(&env)),
            reviews: Arc::new(ReviewQueries::new(&env)),
            dashboards: Arc::new(DashboardComposer::new(&env)),
            catalog: Arc::new(Catalog::new(&env)),
            env,
        }
    }
}

impl FromRef<AppState> for Arc<ReviewWorkflow> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.workflow)
    }
}

impl FromRef<AppState> for Arc<RatingAggregator> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.ratings)
    }
}

impl FromRef<AppState> for Arc<ReviewQueries> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.reviews)
    }
}

impl FromRef<AppState> for Arc<DashboardComposer> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.dashboards)
    }
}

impl FromRef<AppState> for Arc<Catalog> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.catalog)
    }
}
