//! Cross-database dashboard endpoints.
//!
//! - GET /api/crossdatabase/property-info/:id - Property, rating, newest reviews
//! - GET /api/crossdatabase/user-info/:id - Guest bookings, reviews, total spent
//! - GET /api/crossdatabase/host-info/:id - Host properties, bookings, reviews, earnings
//!
//! The same handlers also answer under `/api/dashboard/user/:id`,
//! `/api/dashboard/host/:id` and `/api/property-details/:id`.

use crate::app::DashboardComposer;
use crate::app::dashboard::{HostDashboard, PropertyDetails, UserDashboard};
use axum::extract::State;
use stayhub_core::model::{PropertyId, UserId};
use stayhub_web::{ApiPath, ApiResponse, WebResult};
use std::sync::Arc;

/// Property with its rating summary and ten newest reviews.
pub async fn property_info(
    State(dashboards): State<Arc<DashboardComposer>>,
    ApiPath(property_id): ApiPath<PropertyId>,
) -> WebResult<ApiResponse<PropertyDetails>> {
    Ok(ApiResponse::ok(
        dashboards.property_details(property_id).await?,
    ))
}

/// Dashboard of a guest.
///
/// ```bash
/// curl http://localhost:8080/api/crossdatabase/user-info/2
/// ```
pub async fn user_info(
    State(dashboards): State<Arc<DashboardComposer>>,
    ApiPath(user_id): ApiPath<UserId>,
) -> WebResult<ApiResponse<UserDashboard>> {
    Ok(ApiResponse::ok(dashboards.user_dashboard(user_id).await?))
}

/// Dashboard of a host.
pub async fn host_info(
    State(dashboards): State<Arc<DashboardComposer>>,
    ApiPath(host_id): ApiPath<UserId>,
) -> WebResult<ApiResponse<HostDashboard>> {
    Ok(ApiResponse::ok(dashboards.host_dashboard(host_id).await?))
}
