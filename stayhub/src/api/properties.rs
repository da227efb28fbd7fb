//! Property endpoints.
//!
//! - POST /api/properties - List a property
//! - GET /api/properties/:id - Get a property
//! - GET /api/properties/host/:host_id - Properties of a host
//! - PUT /api/properties/:id - Update a property
//! - DELETE /api/properties/:id - Delete a property and its bookings

use super::Deleted;
use crate::app::Catalog;
use axum::extract::State;
use stayhub_core::model::{NewProperty, Property, PropertyId, PropertyPatch, UserId};
use stayhub_web::{ApiJson, ApiPath, ApiResponse, WebResult};
use std::sync::Arc;

/// List a property. Prices are in cents.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/properties \
///   -H "Content-Type: application/json" \
///   -d '{
///     "host_id": 1,
///     "price": 8500,
///     "room_type": "Entire home/apt",
///     "person_capacity": 4,
///     "bedrooms": 2,
///     "center_distance": 1.2,
///     "metro_distance": 0.3,
///     "city": "Athens"
///   }'
/// ```
pub async fn create_property(
    State(catalog): State<Arc<Catalog>>,
    ApiJson(request): ApiJson<NewProperty>,
) -> WebResult<ApiResponse<Property>> {
    Ok(ApiResponse::created(catalog.create_property(request).await?))
}

/// Get a property by id.
pub async fn get_property(
    State(catalog): State<Arc<Catalog>>,
    ApiPath(id): ApiPath<PropertyId>,
) -> WebResult<ApiResponse<Property>> {
    Ok(ApiResponse::ok(catalog.property(id).await?))
}

/// Properties listed by a host.
pub async fn properties_by_host(
    State(catalog): State<Arc<Catalog>>,
    ApiPath(host_id): ApiPath<UserId>,
) -> WebResult<ApiResponse<Vec<Property>>> {
    Ok(ApiResponse::ok(catalog.properties_by_host(host_id).await?))
}

/// Update a property; omitted fields keep their value.
pub async fn update_property(
    State(catalog): State<Arc<Catalog>>,
    ApiPath(id): ApiPath<PropertyId>,
    ApiJson(patch): ApiJson<PropertyPatch>,
) -> WebResult<ApiResponse<Property>> {
    Ok(ApiResponse::ok(catalog.update_property(id, patch).await?))
}

/// Delete a property.
pub async fn delete_property(
    State(catalog): State<Arc<Catalog>>,
    ApiPath(id): ApiPath<PropertyId>,
) -> WebResult<ApiResponse<Deleted>> {
    catalog.delete_property(id).await?;
    Ok(ApiResponse::ok(Deleted::new("Property", id.get())))
}
