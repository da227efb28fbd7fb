//! Error types for web handlers.
//!
//! [`AppError`] turns service failures into the failure envelope
//! `{"success": false, "code": ..., "message": ...}`. Server-side failures
//! are logged before the response is written.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use stayhub_core::ServiceError;
use std::fmt;

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn get_user(
///     State(catalog): State<Arc<Catalog>>,
///     ApiPath(id): ApiPath<UserId>,
/// ) -> Result<ApiResponse<User>, AppError> {
///     // ServiceError::NotFound becomes a 404 envelope
///     Ok(ApiResponse::ok(catalog.user(id).await?))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: code.into(),
            source: None,
        }
    }

    /// Attach the underlying error for logging.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, "BAD_REQUEST")
    }

    /// Create a 422 Unprocessable Entity error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            message,
            "VALIDATION_ERROR",
        )
    }

    /// HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Failure envelope (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Always `false`.
    success: bool,
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Request failed"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Request failed"
                );
            }
        } else {
            tracing::debug!(status = %self.status, code = %self.code, "Request rejected");
        }

        let body = ErrorResponse {
            success: false,
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

/// Map service failures onto status codes.
///
/// | error                 | status |
/// |-----------------------|--------|
/// | `InvalidInput`        | 422    |
/// | `InvalidBooking`      | 400    |
/// | `BookingNotCompleted` | 409    |
/// | `NotFound`            | 404    |
/// | `StoreUnavailable`    | 503    |
impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let status = match &err {
            ServiceError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::InvalidBooking { .. } => StatusCode::BAD_REQUEST,
            ServiceError::BookingNotCompleted(_) => StatusCode::CONFLICT,
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        let app = Self::new(status, err.to_string(), err.code());
        if status.is_server_error() {
            app.with_source(anyhow::Error::new(err))
        } else {
            app
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stayhub_core::StoreError;
    use stayhub_core::model::{BookingId, PropertyId};

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn test_service_errors_map_to_status_and_code() {
        let cases = [
            (
                ServiceError::InvalidInput("comment is empty".to_string()),
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
            ),
            (
                ServiceError::InvalidBooking {
                    booking_id: BookingId::new(1),
                    property_id: PropertyId::new(2),
                },
                StatusCode::BAD_REQUEST,
                "INVALID_BOOKING",
            ),
            (
                ServiceError::BookingNotCompleted(BookingId::new(1)),
                StatusCode::CONFLICT,
                "BOOKING_NOT_COMPLETED",
            ),
            (
                ServiceError::StoreUnavailable(StoreError::Unavailable("down".to_string())),
                StatusCode::SERVICE_UNAVAILABLE,
                "STORE_UNAVAILABLE",
            ),
        ];

        for (service_error, status, code) in cases {
            let err = AppError::from(service_error);
            assert_eq!(err.status(), status);
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn test_unavailable_keeps_source_for_logging() {
        let err = AppError::from(ServiceError::StoreUnavailable(StoreError::Unavailable(
            "pool timed out".to_string(),
        )));
        assert!(std::error::Error::source(&err).is_some());
    }
}
