//! User endpoints.
//!
//! - POST /api/users - Register a user
//! - GET /api/users/:id - Get a user
//! - GET /api/users/by-email/:email - Find a user by email
//! - PUT /api/users/:id - Update a user
//! - DELETE /api/users/:id - Delete a user and everything they own

use super::Deleted;
use crate::app::Catalog;
use axum::extract::State;
use stayhub_core::model::{NewUser, User, UserId, UserPatch};
use stayhub_web::{ApiJson, ApiPath, ApiResponse, WebResult};
use std::sync::Arc;

/// Register a user.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/users \
///   -H "Content-Type: application/json" \
///   -d '{"name": "Ada Lovelace", "email": "ada@example.com", "mobile": "+30 210 000 0000"}'
/// ```
pub async fn create_user(
    State(catalog): State<Arc<Catalog>>,
    ApiJson(request): ApiJson<NewUser>,
) -> WebResult<ApiResponse<User>> {
    Ok(ApiResponse::created(catalog.create_user(request).await?))
}

/// Get a user by id.
pub async fn get_user(
    State(catalog): State<Arc<Catalog>>,
    ApiPath(id): ApiPath<UserId>,
) -> WebResult<ApiResponse<User>> {
    Ok(ApiResponse::ok(catalog.user(id).await?))
}

/// Find a user by email.
///
/// ```bash
/// curl http://localhost:8080/api/users/by-email/ada@example.com
/// ```
pub async fn get_user_by_email(
    State(catalog): State<Arc<Catalog>>,
    ApiPath(email): ApiPath<String>,
) -> WebResult<ApiResponse<User>> {
    Ok(ApiResponse::ok(catalog.user_by_email(&email).await?))
}

/// Update a user; omitted fields keep their value.
pub async fn update_user(
    State(catalog): State<Arc<Catalog>>,
    ApiPath(id): ApiPath<UserId>,
    ApiJson(patch): ApiJson<UserPatch>,
) -> WebResult<ApiResponse<User>> {
    Ok(ApiResponse::ok(catalog.update_user(id, patch).await?))
}

/// Delete a user.
pub async fn delete_user(
    State(catalog): State<Arc<Catalog>>,
    ApiPath(id): ApiPath<UserId>,
) -> WebResult<ApiResponse<Deleted>> {
    catalog.delete_user(id).await?;
    Ok(ApiResponse::ok(Deleted::new("User", id.get())))
}
