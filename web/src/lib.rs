//! Axum integration for StayHub.
//!
//! The HTTP shell around the services: handlers parse requests, call a
//! service, and map the outcome onto a response envelope.
//!
//! ```text
//! success: {"success": true,  "data": ...}
//! failure: {"success": false, "code": "...", "message": "..."}
//! ```
//!
//! - [`ApiResponse`]: the success envelope
//! - [`AppError`]: the failure envelope, with the mapping from
//!   [`stayhub_core::ServiceError`]
//! - [`ApiJson`], [`ApiPath`], [`ApiQuery`] and [`CorrelationId`]: extractors
//! - [`correlation_id_layer`]: request tracking middleware
//! - [`handlers::health`]: liveness and readiness helpers
//!
//! # Example
//!
//! ```ignore
//! use stayhub_web::{ApiJson, ApiResponse, WebResult};
//!
//! async fn create_user(
//!     State(state): State<AppState>,
//!     ApiJson(request): ApiJson<NewUser>,
//! ) -> WebResult<ApiResponse<CreatedId>> {
//!     let id = state.catalog.create_user(request).await?;
//!     Ok(ApiResponse::created(CreatedId { id }))
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{ApiJson, ApiPath, ApiQuery, CorrelationId};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};
pub use response::ApiResponse;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
