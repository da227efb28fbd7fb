//! Review read side: listings, guest enrichment and analytics.

use super::PlatformEnvironment;
use futures::TryFutureExt;
use futures::future::join_all;
use serde::Serialize;
use stayhub_core::environment::Clock;
use stayhub_core::model::{GuestBookingInfo, PropertyId};
use stayhub_core::review::{
    RECENT_REVIEWS, Review, ReviewAnalytics, ReviewPage, ReviewQuery, ReviewSummary,
};
use stayhub_core::{DocumentStore, RelationalStore, ServiceError};
use std::sync::Arc;

const OVERVIEW_REVIEWS: u64 = 5;

/// A review together with the booking and guest it was written under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuestReview {
    /// The review
    #[serde(flatten)]
    pub review: Review,
    /// Booking and guest details, when the lookup succeeded
    pub booking: Option<GuestBookingInfo>,
    /// Whether the lookup succeeded
    pub enriched: bool,
    /// Why the lookup failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrichment_error: Option<String>,
}

/// Newest reviews of a property enriched with guest data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuestReviewReport {
    /// Property ID
    pub property_id: PropertyId,
    /// Enriched reviews, newest first
    pub reviews: Vec<GuestReview>,
    /// Number of reviews looked at
    pub total_reviews: usize,
    /// Reviews whose booking was found
    pub success_count: usize,
    /// Reviews whose booking was missing or could not be read
    pub error_count: usize,
}

/// Everything both stores know about one property's reviews.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewOverview {
    /// Property ID
    pub property_id: PropertyId,
    /// Five newest reviews with computed fields
    pub recent: ReviewPage,
    /// Review statistics; absent when the property has no reviews
    pub analytics: Option<ReviewAnalytics>,
    /// Newest reviews joined with booking and guest data
    pub guest_reviews: GuestReviewReport,
    /// Every booking on the platform with its guest
    pub all_bookings: Vec<GuestBookingInfo>,
}

/// Queries over stored reviews.
#[derive(Clone)]
pub struct ReviewQueries {
    relational: Arc<dyn RelationalStore>,
    documents: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl ReviewQueries {
    /// Create the query service
    #[must_use]
    pub fn new(env: &PlatformEnvironment) -> Self {
        Self {
            relational: Arc::clone(&env.relational),
            documents: Arc::clone(&env.documents),
            clock: Arc::clone(&env.clock),
        }
    }

    /// Filtered, sorted and paged listing with computed fields.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::InvalidInput`] when the satisfaction range is empty
    /// - [`ServiceError::StoreUnavailable`] on store failure
    #[tracing::instrument(skip(self))]
    pub async fn list_reviews(&self, query: ReviewQuery) -> Result<ReviewPage, ServiceError> {
        if let (Some(min), Some(max)) = (query.min_satisfaction, query.max_satisfaction) {
            if min > max {
                return Err(ServiceError::InvalidInput(format!(
                    "min_rating ({min}) must not exceed max_rating ({max})"
                )));
            }
        }
        Ok(self.documents.list_reviews(&query, self.clock.now()).await?)
    }

    /// Listing restricted to one property.
    ///
    /// # Errors
    ///
    /// Same as [`ReviewQueries::list_reviews`].
    pub async fn property_reviews(
        &self,
        property_id: PropertyId,
        query: ReviewQuery,
    ) -> Result<ReviewPage, ServiceError> {
        self.list_reviews(ReviewQuery {
            property_id: Some(property_id),
            ..query
        })
        .await
    }

    /// The ten newest reviews of a property, each joined with its booking
    /// and guest.
    ///
    /// A review whose booking is missing or cannot be read is still
    /// returned, flagged as not enriched.
    ///
    /// # Errors
    ///
    /// [`ServiceError::StoreUnavailable`] when the reviews cannot be read.
    #[tracing::instrument(skip(self))]
    pub async fn reviews_with_guest_info(
        &self,
        property_id: PropertyId,
    ) -> Result<GuestReviewReport, ServiceError> {
        let reviews = self
            .documents
            .recent_reviews(property_id, RECENT_REVIEWS)
            .await?;

        let lookups = join_all(
            reviews
                .iter()
                .map(|review| self.relational.guest_info(review.booking_id)),
        )
        .await;

        let reviews: Vec<GuestReview> = reviews
            .into_iter()
            .zip(lookups)
            .map(|(review, lookup)| match lookup {
                Ok(Some(booking)) => GuestReview {
                    review,
                    booking: Some(booking),
                    enriched: true,
                    enrichment_error: None,
                },
                Ok(None) => GuestReview {
                    enrichment_error: Some(format!("booking {} not found", review.booking_id)),
                    review,
                    booking: None,
                    enriched: false,
                },
                Err(error) => {
                    tracing::warn!(booking_id = %review.booking_id, %error, "Guest lookup failed");
                    GuestReview {
                        review,
                        booking: None,
                        enriched: false,
                        enrichment_error: Some(error.to_string()),
                    }
                }
            })
            .collect();

        let success_count = reviews.iter().filter(|review| review.enriched).count();
        Ok(GuestReviewReport {
            property_id,
            total_reviews: reviews.len(),
            error_count: reviews.len() - success_count,
            success_count,
            reviews,
        })
    }

    /// Statistics over a property's reviews.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] when the property has no reviews.
    #[tracing::instrument(skip(self))]
    pub async fn analytics(&self, property_id: PropertyId) -> Result<ReviewAnalytics, ServiceError> {
        self.documents
            .review_analytics(property_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Reviews for property", property_id))
    }

    /// Listing, analytics and guest enrichment of a property next to the
    /// full booking list, fetched concurrently.
    ///
    /// # Errors
    ///
    /// [`ServiceError::StoreUnavailable`] when any fetch fails. Failed guest
    /// lookups are reported per review instead.
    #[tracing::instrument(skip(self))]
    pub async fn overview(&self, property_id: PropertyId) -> Result<ReviewOverview, ServiceError> {
        let recent = ReviewQuery::for_property(property_id).paged(Some(OVERVIEW_REVIEWS), None);
        let (recent, analytics, guest_reviews, all_bookings) = futures::try_join!(
            self.list_reviews(recent),
            self.documents
                .review_analytics(property_id)
                .map_err(ServiceError::from),
            self.reviews_with_guest_info(property_id),
            self.relational.all_bookings().map_err(ServiceError::from),
        )?;

        Ok(ReviewOverview {
            property_id,
            recent,
            analytics,
            guest_reviews,
            all_bookings,
        })
    }

    /// Platform-wide review statistics.
    ///
    /// # Errors
    ///
    /// [`ServiceError::StoreUnavailable`] on store failure.
    #[tracing::instrument(skip(self))]
    pub async fn summary(&self) -> Result<ReviewSummary, ServiceError> {
        Ok(self.documents.review_summary().await?)
    }
}
