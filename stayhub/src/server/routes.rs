//! Router configuration for StayHub.
//!
//! Builds the complete Axum router with all endpoints.

use super::health::readiness_check;
use super::state::AppState;
use crate::api::{bookings, dashboards, properties, ratings, reviews, users, workflow};
use axum::{
    Router,
    routing::{get, post},
};
use stayhub_web::correlation_id_layer;
use stayhub_web::handlers::health_check;
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// `/health` and `/ready` sit at the root, everything else under `/api`.
/// Every request gets a correlation ID and runs inside a trace span.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Users
        .route("/users", post(users::create_user))
        .route(
            "/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/by-email/:email", get(users::get_user_by_email))
        // Properties
        .route("/properties", post(properties::create_property))
        .route(
            "/properties/:id",
            get(properties::get_property)
                .put(properties::update_property)
                .delete(properties::delete_property),
        )
        .route(
            "/properties/host/:host_id",
            get(properties::properties_by_host),
        )
        // Bookings
        .route(
            "/bookings",
            post(bookings::create_booking).get(bookings::list_bookings),
        )
        .route(
            "/bookings/:id",
            get(bookings::get_booking)
                .put(bookings::update_booking)
                .delete(bookings::delete_booking),
        )
        .route(
            "/bookings/property/:id",
            get(bookings::bookings_by_property),
        )
        .route("/bookings/guest/:id", get(bookings::bookings_by_guest))
        // Reviews
        .route(
            "/reviews",
            get(reviews::list_reviews).post(reviews::create_review),
        )
        .route(
            "/reviews/with-rating-update",
            post(reviews::create_review_with_rating_update),
        )
        .route("/reviews/property/:id", get(reviews::property_reviews))
        .route(
            "/reviews/property/:id/with-guest-info",
            get(reviews::reviews_with_guest_info),
        )
        .route("/reviews/analytics/:id", get(reviews::review_analytics))
        .route("/reviews/summary", get(reviews::review_summary))
        .route(
            "/reviews/validate-booking/:booking_id/:property_id",
            get(reviews::validate_booking),
        )
        .route(
            "/reviews/cross-database-demo/:id",
            get(reviews::review_overview),
        )
        // Property ratings
        .route("/property-ratings", get(ratings::list_ratings))
        .route(
            "/property-ratings/calculate/:id",
            post(ratings::calculate_rating),
        )
        .route(
            "/property-ratings/recalculate-all",
            post(ratings::recalculate_all),
        )
        .route("/property-ratings/top-rated", get(ratings::top_rated))
        .route("/property-ratings/:id", get(ratings::get_rating))
        .route("/property-ratings/:id/summary", get(ratings::rating_summary))
        .route("/property-ratings/:id/exists", get(ratings::rating_exists))
        // Workflow
        .route(
            "/workflow/complete-booking-review",
            post(workflow::complete_booking_review),
        )
        .route(
            "/workflow/booking-status/:id",
            get(workflow::booking_status),
        )
        .route("/workflow/demo-data", get(workflow::demo_data))
        // Cross-database dashboards
        .route(
            "/crossdatabase/property-info/:id",
            get(dashboards::property_info),
        )
        .route("/crossdatabase/user-info/:id", get(dashboards::user_info))
        .route("/crossdatabase/host-info/:id", get(dashboards::host_info))
        .route("/dashboard/user/:id", get(dashboards::user_info))
        .route("/dashboard/host/:id", get(dashboards::host_info))
        .route("/property-details/:id", get(dashboards::property_info));

    Router::new()
        // Health checks
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // API routes under /api prefix
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .with_state(state)
}
