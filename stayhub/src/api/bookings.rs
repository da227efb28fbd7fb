//! Booking endpoints.
//!
//! - POST /api/bookings - Book a stay (priced by the store)
//! - GET /api/bookings - Every booking with its guest
//! - GET /api/bookings/:id - Get a booking
//! - GET /api/bookings/property/:id - Bookings of a property
//! - GET /api/bookings/guest/:id - Bookings of a guest
//! - PUT /api/bookings/:id - Move a booking
//! - DELETE /api/bookings/:id - Cancel a booking

use super::Deleted;
use crate::app::Catalog;
use crate::app::catalog::BookingDetails;
use axum::extract::State;
use stayhub_core::model::{BookingId, BookingPatch, GuestBookingInfo, NewBooking, PropertyId, UserId};
use stayhub_web::{ApiJson, ApiPath, ApiResponse, WebResult};
use std::sync::Arc;

/// Book a stay.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/bookings \
///   -H "Content-Type: application/json" \
///   -d '{"property_id": 1, "guest_id": 2, "start_date": "2025-06-01", "end_date": "2025-06-04"}'
/// ```
pub async fn create_booking(
    State(catalog): State<Arc<Catalog>>,
    ApiJson(request): ApiJson<NewBooking>,
) -> WebResult<ApiResponse<BookingDetails>> {
    Ok(ApiResponse::created(catalog.create_booking(request).await?))
}

/// Every booking joined with its guest.
pub async fn list_bookings(
    State(catalog): State<Arc<Catalog>>,
) -> WebResult<ApiResponse<Vec<GuestBookingInfo>>> {
    Ok(ApiResponse::ok(catalog.all_bookings().await?))
}

/// Get a booking by id.
pub async fn get_booking(
    State(catalog): State<Arc<Catalog>>,
    ApiPath(id): ApiPath<BookingId>,
) -> WebResult<ApiResponse<BookingDetails>> {
    Ok(ApiResponse::ok(catalog.booking(id).await?))
}

/// Bookings of a property.
pub async fn bookings_by_property(
    State(catalog): State<Arc<Catalog>>,
    ApiPath(property_id): ApiPath<PropertyId>,
) -> WebResult<ApiResponse<Vec<BookingDetails>>> {
    Ok(ApiResponse::ok(
        catalog.bookings_by_property(property_id).await?,
    ))
}

/// Bookings made by a guest.
pub async fn bookings_by_guest(
    State(catalog): State<Arc<Catalog>>,
    ApiPath(guest_id): ApiPath<UserId>,
) -> WebResult<ApiResponse<Vec<BookingDetails>>> {
    Ok(ApiResponse::ok(catalog.bookings_by_guest(guest_id).await?))
}

/// Move a booking to new dates.
pub async fn update_booking(
    State(catalog): State<Arc<Catalog>>,
    ApiPath(id): ApiPath<BookingId>,
    ApiJson(patch): ApiJson<BookingPatch>,
) -> WebResult<ApiResponse<BookingDetails>> {
    Ok(ApiResponse::ok(catalog.update_booking(id, patch).await?))
}

/// Cancel a booking.
pub async fn delete_booking(
    State(catalog): State<Arc<Catalog>>,
    ApiPath(id): ApiPath<BookingId>,
) -> WebResult<ApiResponse<Deleted>> {
    catalog.delete_booking(id).await?;
    Ok(ApiResponse::ok(Deleted::new("Booking", id.get())))
}
