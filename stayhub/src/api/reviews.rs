//! Review endpoints.
//!
//! - GET /api/reviews - All reviews, filtered, sorted and paged
//! - POST /api/reviews - Add a review (validated, rating left as is)
//! - POST /api/reviews/with-rating-update - Add a review and refresh the rating
//! - GET /api/reviews/property/:id - Paged reviews of a property
//! - GET /api/reviews/property/:id/with-guest-info - Newest reviews with guest data
//! - GET /api/reviews/analytics/:id - Statistics of a property's reviews
//! - GET /api/reviews/summary - Platform-wide statistics
//! - GET /api/reviews/validate-booking/:booking_id/:property_id - Review eligibility
//! - GET /api/reviews/cross-database-demo/:id - Listing, analytics, guest data and
//!   bookings of a property in one response

use crate::app::reviews::{GuestReviewReport, ReviewOverview};
use crate::app::workflow::{Eligibility, ReviewReceipt};
use crate::app::{ReviewQueries, ReviewWorkflow};
use axum::extract::State;
use serde::Deserialize;
use stayhub_core::model::{BookingId, PropertyId};
use stayhub_core::review::{
    NewReview, ReviewAnalytics, ReviewPage, ReviewQuery, ReviewSortField, ReviewSummary,
    SortOrder,
};
use stayhub_web::{ApiJson, ApiPath, ApiQuery, ApiResponse, WebResult};
use std::sync::Arc;

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters of review listings.
#[derive(Debug, Default, Deserialize)]
pub struct ListReviewsParams {
    /// Lowest satisfaction score to include
    pub min_rating: Option<i32>,
    /// Highest satisfaction score to include
    pub max_rating: Option<i32>,
    /// Page size (default: 20, max: 100)
    pub limit: Option<u64>,
    /// Reviews to skip
    pub skip: Option<u64>,
    /// `created_at` (default), `cleanliness_rating`, `guest_satisfaction`,
    /// `overall_rating` or `review_age_days`
    pub sort_by: Option<String>,
    /// `asc` or `desc` (default)
    pub order: Option<String>,
}

impl ListReviewsParams {
    /// Translate into a listing query; unknown sort keys sort by creation
    /// time.
    #[must_use]
    pub fn into_query(self) -> ReviewQuery {
        ReviewQuery {
            min_satisfaction: self.min_rating,
            max_satisfaction: self.max_rating,
            sort_by: ReviewSortField::from_param(self.sort_by.as_deref()),
            order: SortOrder::from_param(self.order.as_deref()),
            ..ReviewQuery::all()
        }
        .paged(self.limit, self.skip)
    }
}

/// Path of the eligibility check.
#[derive(Debug, Deserialize)]
pub struct EligibilityPath {
    /// Booking to check
    pub booking_id: BookingId,
    /// Property the review would be written for
    pub property_id: PropertyId,
}

// ============================================================================
// Handlers
// ============================================================================

/// List reviews across all properties.
///
/// ```bash
/// curl "http://localhost:8080/api/reviews?min_rating=4&sort_by=overall_rating&order=desc&limit=10"
/// ```
pub async fn list_reviews(
    State(reviews): State<Arc<ReviewQueries>>,
    ApiQuery(params): ApiQuery<ListReviewsParams>,
) -> WebResult<ApiResponse<ReviewPage>> {
    Ok(ApiResponse::ok(reviews.list_reviews(params.into_query()).await?))
}

/// Add a review without refreshing the property's rating.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/reviews \
///   -H "Content-Type: application/json" \
///   -d '{
///     "property_id": 1,
///     "booking_id": 3,
///     "cleanliness_rating": 5,
///     "guest_satisfaction": 4,
///     "text_comment": "Spotless flat, great location"
///   }'
/// ```
pub async fn create_review(
    State(workflow): State<Arc<ReviewWorkflow>>,
    ApiJson(request): ApiJson<NewReview>,
) -> WebResult<ApiResponse<ReviewReceipt>> {
    Ok(ApiResponse::created(workflow.add_review(request).await?))
}

/// Add a review and recompute the property's rating.
///
/// The rating refresh outcome is reported in `rating_update`; a failed
/// refresh still answers 201 because the review is stored.
pub async fn create_review_with_rating_update(
    State(workflow): State<Arc<ReviewWorkflow>>,
    ApiJson(request): ApiJson<NewReview>,
) -> WebResult<ApiResponse<ReviewReceipt>> {
    Ok(ApiResponse::created(workflow.submit_review(request).await?))
}

/// Paged reviews of one property.
pub async fn property_reviews(
    State(reviews): State<Arc<ReviewQueries>>,
    ApiPath(property_id): ApiPath<PropertyId>,
    ApiQuery(params): ApiQuery<ListReviewsParams>,
) -> WebResult<ApiResponse<ReviewPage>> {
    Ok(ApiResponse::ok(
        reviews
            .property_reviews(property_id, params.into_query())
            .await?,
    ))
}

/// Newest reviews of a property joined with booking and guest data.
pub async fn reviews_with_guest_info(
    State(reviews): State<Arc<ReviewQueries>>,
    ApiPath(property_id): ApiPath<PropertyId>,
) -> WebResult<ApiResponse<GuestReviewReport>> {
    Ok(ApiResponse::ok(
        reviews.reviews_with_guest_info(property_id).await?,
    ))
}

/// Statistics over a property's reviews.
pub async fn review_analytics(
    State(reviews): State<Arc<ReviewQueries>>,
    ApiPath(property_id): ApiPath<PropertyId>,
) -> WebResult<ApiResponse<ReviewAnalytics>> {
    Ok(ApiResponse::ok(reviews.analytics(property_id).await?))
}

/// Platform-wide review statistics.
pub async fn review_summary(
    State(reviews): State<Arc<ReviewQueries>>,
) -> WebResult<ApiResponse<ReviewSummary>> {
    Ok(ApiResponse::ok(reviews.summary().await?))
}

/// Reviews of a property seen from both stores at once.
///
/// ```bash
/// curl http://localhost:8080/api/reviews/cross-database-demo/1
/// ```
pub async fn review_overview(
    State(reviews): State<Arc<ReviewQueries>>,
    ApiPath(property_id): ApiPath<PropertyId>,
) -> WebResult<ApiResponse<ReviewOverview>> {
    Ok(ApiResponse::ok(reviews.overview(property_id).await?))
}

/// Whether a booking may be reviewed for a property.
///
/// ```bash
/// curl http://localhost:8080/api/reviews/validate-booking/3/1
/// ```
pub async fn validate_booking(
    State(workflow): State<Arc<ReviewWorkflow>>,
    ApiPath(path): ApiPath<EligibilityPath>,
) -> WebResult<ApiResponse<Eligibility>> {
    Ok(ApiResponse::ok(
        workflow
            .check_eligibility(path.booking_id, path.property_id)
            .await?,
    ))
}
