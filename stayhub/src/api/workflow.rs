//! Cross-store workflow endpoints.
//!
//! - POST /api/workflow/complete-booking-review - Validate the booking, store
//!   the review, refresh the rating
//! - GET /api/workflow/booking-status/:id - Booking, guest and derived status
//! - GET /api/workflow/demo-data - Every booking with its guest

use crate::app::workflow::ReviewReceipt;
use crate::app::{Catalog, ReviewWorkflow};
use axum::extract::State;
use stayhub_core::model::{BookingId, GuestBookingInfo};
use stayhub_core::review::NewReview;
use stayhub_web::{ApiJson, ApiPath, ApiResponse, CorrelationId, WebResult};
use std::sync::Arc;

/// Run the full review workflow.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/workflow/complete-booking-review \
///   -H "Content-Type: application/json" \
///   -d '{
///     "property_id": 1,
///     "booking_id": 3,
///     "cleanliness_rating": 4,
///     "guest_satisfaction": 5,
///     "text_comment": "Would stay again"
///   }'
/// ```
pub async fn complete_booking_review(
    State(workflow): State<Arc<ReviewWorkflow>>,
    correlation_id: CorrelationId,
    ApiJson(request): ApiJson<NewReview>,
) -> WebResult<ApiResponse<ReviewReceipt>> {
    tracing::info!(
        correlation_id = %correlation_id.0,
        booking_id = %request.booking_id,
        property_id = %request.property_id,
        "Completing booking review"
    );
    Ok(ApiResponse::created(workflow.submit_review(request).await?))
}

/// Booking joined with its guest and derived status.
pub async fn booking_status(
    State(workflow): State<Arc<ReviewWorkflow>>,
    ApiPath(booking_id): ApiPath<BookingId>,
) -> WebResult<ApiResponse<GuestBookingInfo>> {
    Ok(ApiResponse::ok(workflow.booking_status(booking_id).await?))
}

/// Every booking with its guest, for exploring the workflow.
pub async fn demo_data(
    State(catalog): State<Arc<Catalog>>,
) -> WebResult<ApiResponse<Vec<GuestBookingInfo>>> {
    Ok(ApiResponse::ok(catalog.all_bookings().await?))
}
