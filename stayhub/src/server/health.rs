//! Health check endpoints.
//!
//! `/health` is answered by [`stayhub_web::handlers::health_check`].
//! `/ready` pings both stores.

use super::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use stayhub_web::handlers::health::ReadinessResponse;
use stayhub_web::handlers::{ComponentCheck, readiness_response};

/// Readiness check endpoint.
///
/// Returns 200 OK when both stores answer a ping, 503 otherwise.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/ready
/// # {"ready":true,"checks":[{"component":"postgres","ready":true},{"component":"mongodb","ready":true}]}
/// ```
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let (relational, documents) =
        futures::join!(state.env.relational.ping(), state.env.documents.ping());

    readiness_response(vec![
        ComponentCheck::from_result("postgres", relational),
        ComponentCheck::from_result("mongodb", documents),
    ])
}
