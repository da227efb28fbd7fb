//! Request tracking middleware.
//!
//! [`correlation_id_layer`] gives every request a correlation ID, runs it
//! inside an `http_request` span and records its outcome:
//!
//! 1. Take the ID from the `X-Correlation-ID` header, or generate a UUID v4
//! 2. Store it in the request extensions (see [`crate::CorrelationId`])
//! 3. Run the handler inside a span carrying the ID, method and path
//! 4. Count the request in `http.requests` by method and status, and log
//!    its latency
//! 5. Echo the ID in the response `X-Correlation-ID` header
//!
//! # Example
//!
//! ```ignore
//! use axum::Router;
//! use stayhub_web::middleware::correlation_id_layer;
//!
//! let app = Router::new()
//!     .route("/api/users/:id", get(get_user))
//!     .layer(correlation_id_layer());
//! ```

use axum::{extract::Request, http::HeaderValue, response::Response};
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for correlation ID.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// Create a layer that adds correlation ID tracking to all requests.
#[must_use]
pub const fn correlation_id_layer() -> CorrelationIdLayer {
    CorrelationIdLayer
}

/// Layer for correlation ID tracking.
#[derive(Clone, Copy, Debug)]
pub struct CorrelationIdLayer;

impl<S> Layer<S> for CorrelationIdLayer {
    type Service = CorrelationIdMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationIdMiddleware { inner }
    }
}

/// Middleware service for correlation ID tracking.
#[derive(Clone, Debug)]
pub struct CorrelationIdMiddleware<S> {
    inner: S,
}

/// The correlation ID a request carries, if the header holds a valid UUID.
fn incoming_id(req: &Request) -> Option<Uuid> {
    req.headers()
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
}

impl<S> Service<Request> for CorrelationIdMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let correlation_id = incoming_id(&req).unwrap_or_else(Uuid::new_v4);
        req.extensions_mut().insert(correlation_id);

        let method = req.method().to_string();
        let span = tracing::info_span!(
            "http_request",
            correlation_id = %correlation_id,
            method = %method,
            path = %req.uri().path(),
        );
        let started = Instant::now();

        let fut = self.inner.call(req);

        Box::pin(
            async move {
                let mut response = fut.await?;

                let status = response.status();
                metrics::counter!(
                    "http.requests",
                    "method" => method,
                    "status" => status.as_u16().to_string()
                )
                .increment(1);
                tracing::debug!(
                    status = status.as_u16(),
                    latency_ms = started.elapsed().as_millis(),
                    "Request completed"
                );

                if let Ok(header_value) = HeaderValue::from_str(&correlation_id.to_string()) {
                    response
                        .headers_mut()
                        .insert(CORRELATION_ID_HEADER, header_value);
                }

                Ok(response)
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use crate::extractors::CorrelationId;
    use axum::{Router, body::Body, routing::get};
    use tower::ServiceExt;

    fn request(header: Option<&str>) -> axum::http::Request<Body> {
        let mut builder = axum::http::Request::builder().uri("/test");
        if let Some(value) = header {
            builder = builder.header(CORRELATION_ID_HEADER, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn response_id(response: &Response) -> String {
        response
            .headers()
            .get(CORRELATION_ID_HEADER)
            .expect("Correlation ID header should be present")
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_correlation_id_generated_if_missing() {
        let app = Router::new()
            .route("/test", get(|| async { "ok" }))
            .layer(correlation_id_layer());

        let response = app.oneshot(request(None)).await.unwrap();

        assert!(Uuid::parse_str(&response_id(&response)).is_ok());
    }

    #[tokio::test]
    async fn test_correlation_id_preserved_from_request() {
        let app = Router::new()
            .route("/test", get(|| async { "ok" }))
            .layer(correlation_id_layer());

        let request_uuid = Uuid::new_v4();
        let response = app
            .oneshot(request(Some(&request_uuid.to_string())))
            .await
            .unwrap();

        assert_eq!(response_id(&response), request_uuid.to_string());
    }

    #[tokio::test]
    async fn test_handler_sees_the_echoed_id() {
        let app = Router::new()
            .route(
                "/test",
                get(|CorrelationId(id): CorrelationId| async move { id.to_string() }),
            )
            .layer(correlation_id_layer());

        let response = app.oneshot(request(None)).await.unwrap();
        let echoed = response_id(&response);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(String::from_utf8(bytes.to_vec()).unwrap(), echoed);
    }

    #[tokio::test]
    async fn test_invalid_uuid_generates_new() {
        let app = Router::new()
            .route("/test", get(|| async { "ok" }))
            .layer(correlation_id_layer());

        let response = app.oneshot(request(Some("not-a-uuid"))).await.unwrap();

        let id = response_id(&response);
        assert!(Uuid::parse_str(&id).is_ok());
        assert_ne!(id, "not-a-uuid");
    }
}
