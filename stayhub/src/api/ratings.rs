//! Property rating endpoints.
//!
//! - POST /api/property-ratings/calculate/:id - Recompute one property
//! - POST /api/property-ratings/recalculate-all - Recompute every reviewed property
//! - GET /api/property-ratings - Page of summaries, best satisfaction first
//! - GET /api/property-ratings/top-rated - Best summaries by one average
//! - GET /api/property-ratings/:id - Summary of a property
//! - GET /api/property-ratings/:id/summary - One-line summary
//! - GET /api/property-ratings/:id/exists - Whether a summary exists

use crate::app::RatingAggregator;
use crate::app::ratings::{BatchReport, RatingOutcome};
use axum::extract::State;
use serde::{Deserialize, Serialize};
use stayhub_core::model::PropertyId;
use stayhub_core::review::{PropertyRating, RatingKind, RatingPage};
use stayhub_web::{ApiPath, ApiQuery, ApiResponse, WebResult};
use std::sync::Arc;

/// Paging of rating listings.
#[derive(Debug, Default, Deserialize)]
pub struct RatingListParams {
    /// Page size (default: 10, max: 100)
    pub limit: Option<u64>,
    /// Summaries to skip
    pub skip: Option<u64>,
}

/// Parameters of the top-rated listing.
#[derive(Debug, Default, Deserialize)]
pub struct TopRatedParams {
    /// Number of summaries (default: 10, max: 100)
    pub limit: Option<u64>,
    /// `satisfaction` (default) or `cleanliness`
    pub rating_type: Option<String>,
}

/// One-line description of a summary.
#[derive(Debug, Serialize)]
pub struct RatingSummaryResponse {
    /// Property ID
    pub property_id: PropertyId,
    /// Human-readable summary
    pub summary: String,
}

/// Whether a property has a summary.
#[derive(Debug, Serialize)]
pub struct RatingExistsResponse {
    /// Property ID
    pub property_id: PropertyId,
    /// A summary is stored
    pub has_ratings: bool,
}

/// Recompute the rating summary of one property.
///
/// ```bash
/// curl -X POST http://localhost:8080/api/property-ratings/calculate/1
/// ```
pub async fn calculate_rating(
    State(ratings): State<Arc<RatingAggregator>>,
    ApiPath(property_id): ApiPath<PropertyId>,
) -> WebResult<ApiResponse<RatingOutcome>> {
    Ok(ApiResponse::ok(ratings.recompute_rating(property_id).await?))
}

/// Recompute every reviewed property; failures are listed in the report.
pub async fn recalculate_all(
    State(ratings): State<Arc<RatingAggregator>>,
) -> WebResult<ApiResponse<BatchReport>> {
    Ok(ApiResponse::ok(ratings.recompute_all().await?))
}

/// Page of summaries, best average satisfaction first.
pub async fn list_ratings(
    State(ratings): State<Arc<RatingAggregator>>,
    ApiQuery(params): ApiQuery<RatingListParams>,
) -> WebResult<ApiResponse<RatingPage>> {
    Ok(ApiResponse::ok(
        ratings.list_ratings(params.limit, params.skip).await?,
    ))
}

/// Best summaries by the chosen average.
///
/// ```bash
/// curl "http://localhost:8080/api/property-ratings/top-rated?limit=5&rating_type=cleanliness"
/// ```
pub async fn top_rated(
    State(ratings): State<Arc<RatingAggregator>>,
    ApiQuery(params): ApiQuery<TopRatedParams>,
) -> WebResult<ApiResponse<Vec<PropertyRating>>> {
    let kind = RatingKind::from_param(params.rating_type.as_deref());
    Ok(ApiResponse::ok(ratings.top_rated(params.limit, kind).await?))
}

/// Summary of a property.
pub async fn get_rating(
    State(ratings): State<Arc<RatingAggregator>>,
    ApiPath(property_id): ApiPath<PropertyId>,
) -> WebResult<ApiResponse<PropertyRating>> {
    Ok(ApiResponse::ok(ratings.get_rating(property_id).await?))
}

/// One-line summary of a property's rating.
pub async fn rating_summary(
    State(ratings): State<Arc<RatingAggregator>>,
    ApiPath(property_id): ApiPath<PropertyId>,
) -> WebResult<ApiResponse<RatingSummaryResponse>> {
    let summary = ratings.rating_summary_line(property_id).await?;
    Ok(ApiResponse::ok(RatingSummaryResponse {
        property_id,
        summary,
    }))
}

/// Whether a summary exists for a property.
pub async fn rating_exists(
    State(ratings): State<Arc<RatingAggregator>>,
    ApiPath(property_id): ApiPath<PropertyId>,
) -> WebResult<ApiResponse<RatingExistsResponse>> {
    let has_ratings = ratings.has_ratings(property_id).await?;
    Ok(ApiResponse::ok(RatingExistsResponse {
        property_id,
        has_ratings,
    }))
}
