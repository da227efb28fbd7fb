//! Custom Axum extractors.
//!
//! - [`CorrelationId`]: the request's correlation ID
//! - [`ApiJson`]: a JSON body whose rejections use the failure envelope
//! - [`ApiPath`] and [`ApiQuery`]: path and query parameters, rejected the
//!   same way
//!
//! # Examples
//!
//! ```ignore
//! use stayhub_web::extractors::{ApiJson, CorrelationId};
//!
//! async fn handler(
//!     State(state): State<AppState>,
//!     correlation_id: CorrelationId,
//!     ApiJson(request): ApiJson<CreateUserRequest>,
//! ) -> WebResult<ApiResponse<User>> {
//!     tracing::info!(correlation_id = %correlation_id.0, "Creating user");
//!     ...
//! }
//! ```

use crate::error::AppError;
use crate::middleware::CORRELATION_ID_HEADER;
use axum::{
    Json, async_trait,
    extract::{
        FromRequest, FromRequestParts, Path, Query, Request,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Correlation ID for request tracing.
///
/// Uses the ID stored by the correlation middleware when it is installed;
/// otherwise reads the `X-Correlation-ID` header, or generates a new UUID v4.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Uuid>() {
            return Ok(Self(*id));
        }

        let correlation_id = parts
            .headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}

/// JSON request body.
///
/// Behaves like [`axum::Json`] but rejects malformed or mistyped bodies with
/// a 422 `VALIDATION_ERROR` in the failure envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejection(&rejection)),
        }
    }
}

fn json_rejection(rejection: &JsonRejection) -> AppError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            AppError::bad_request("Expected a JSON body with Content-Type: application/json")
        }
        other => AppError::validation(other.body_text()),
    }
}

/// Path parameters.
///
/// Behaves like [`axum::extract::Path`] but rejects unparsable segments with
/// a 400 `BAD_REQUEST` in the failure envelope.
#[derive(Debug, Clone, Copy)]
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| Self(value))
            .map_err(|rejection: PathRejection| AppError::bad_request(rejection.body_text()))
    }
}

/// Query string parameters.
///
/// Behaves like [`axum::extract::Query`] but rejects malformed query strings
/// with a 400 `BAD_REQUEST` in the failure envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| Self(value))
            .map_err(|rejection: QueryRejection| AppError::bad_request(rejection.body_text()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::StatusCode,
        response::IntoResponse,
        routing::{get, post},
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Payload {
        rating: i32,
    }

    fn app() -> Router {
        Router::new().route(
            "/echo",
            post(|ApiJson(payload): ApiJson<Payload>| async move {
                payload.rating.to_string().into_response()
            }),
        )
    }

    #[tokio::test]
    async fn test_valid_body_is_extracted() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/echo")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"rating": 4}"#))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_mistyped_body_is_a_validation_error() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/echo")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"rating": "four"}"#))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unparsable_path_is_a_bad_request() {
        let app: Router = Router::new().route(
            "/bookings/:id",
            get(|ApiPath(id): ApiPath<i32>| async move { id.to_string() }),
        );
        let request = axum::http::Request::builder()
            .uri("/bookings/seven")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_correlation_id_falls_back_to_header() {
        let id = Uuid::new_v4();
        let request = axum::http::Request::builder()
            .uri("/")
            .header(CORRELATION_ID_HEADER, id.to_string())
            .body(())
            .unwrap();
        let (mut parts, ()) = request.into_parts();

        let CorrelationId(extracted) = CorrelationId::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(extracted, id);
    }
}
