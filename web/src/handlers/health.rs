//! Health check endpoints.
//!
//! `/health` answers as long as the process runs. Readiness depends on the
//! application's stores, so applications probe them and hand the outcome to
//! [`readiness_response`].

use axum::{Json, http::StatusCode};
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
}

/// Liveness check endpoint.
///
/// This does NOT check dependencies.
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"ok","version":"0.1.0"}
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Outcome of probing one dependency.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentCheck {
    /// Dependency name
    pub component: &'static str,
    /// Whether it answered
    pub ready: bool,
    /// Failure description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComponentCheck {
    /// Build a check from a probe result
    #[must_use]
    pub fn from_result<E: std::fmt::Display>(
        component: &'static str,
        result: Result<(), E>,
    ) -> Self {
        match result {
            Ok(()) => Self {
                component,
                ready: true,
                error: None,
            },
            Err(e) => Self {
                component,
                ready: false,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    /// Overall readiness status
    pub ready: bool,
    /// Per-dependency outcome
    pub checks: Vec<ComponentCheck>,
}

/// 200 when every check passed, 503 otherwise.
#[must_use]
pub fn readiness_response(checks: Vec<ComponentCheck>) -> (StatusCode, Json<ReadinessResponse>) {
    let ready = checks.iter().all(|check| check.ready);
    if !ready {
        tracing::warn!(?checks, "Readiness check failed");
    }
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(ReadinessResponse { ready, checks }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simple_health_check() {
        let (status, Json(body)) = health_check().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
    }

    #[test]
    fn test_one_failed_component_makes_the_service_unready() {
        let (status, Json(body)) = readiness_response(vec![
            ComponentCheck::from_result::<String>("relational", Ok(())),
            ComponentCheck::from_result("document", Err("connection refused")),
        ]);
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!body.ready);
        assert_eq!(body.checks[1].error.as_deref(), Some("connection refused"));
    }
}
