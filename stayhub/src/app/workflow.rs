//! Review Workflow Orchestrator.
//!
//! Writing a review touches both stores in a fixed order:
//!
//! 1. validate ratings and comment locally (no store access),
//! 2. `validate_booking_exists` in the relational store,
//! 3. `is_booking_completed`, handled by the [`CompletionPolicy`],
//! 4. insert the review into the document store,
//! 5. recompute the property's rating summary.
//!
//! A failure in steps 1-3 leaves both stores untouched. A failure in step 5
//! is reported on the receipt and never undoes step 4.

use super::PlatformEnvironment;
use super::ratings::{RatingAggregator, RatingOutcome};
use serde::Serialize;
use stayhub_core::environment::Clock;
use stayhub_core::model::{BookingId, GuestBookingInfo, PropertyId};
use stayhub_core::review::{CompletionPolicy, NewReview, PropertyRating, Review, ReviewPolicy};
use stayhub_core::{DocumentStore, RelationalStore, ServiceError};
use std::sync::Arc;

/// Outcome of the rating refresh that follows a review write.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RatingUpdate {
    /// The property's summary now includes the review
    Updated(PropertyRating),
    /// The summary could not be refreshed; the review is stored regardless
    Failed {
        /// Failure description
        error: String,
    },
}

/// What a successful review write produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewReceipt {
    /// The stored review
    pub review: Review,
    /// Whether the referenced stay had ended
    pub booking_completed: bool,
    /// Set when an incomplete booking was let through by the warn policy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Present when the workflow refreshed the rating summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_update: Option<RatingUpdate>,
}

/// Whether a booking may be reviewed for a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Eligibility {
    /// Booking checked
    pub booking_id: BookingId,
    /// Property checked
    pub property_id: PropertyId,
    /// The booking exists and belongs to the property
    pub booking_exists: bool,
    /// The stay has ended
    pub booking_completed: bool,
    /// A review for this booking would be accepted under the current policy
    pub can_review: bool,
    /// Short status label
    pub status: &'static str,
    /// What a client should do next
    pub recommendation: &'static str,
    /// Booking and guest details, when the booking exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<GuestBookingInfo>,
}

impl Eligibility {
    fn new(
        booking_id: BookingId,
        property_id: PropertyId,
        booking_exists: bool,
        booking_completed: bool,
        completion: CompletionPolicy,
        booking: Option<GuestBookingInfo>,
    ) -> Self {
        let (can_review, status, recommendation) =
            match (booking_exists, booking_completed, completion) {
                (true, true, _) => (
                    true,
                    "Ready for review",
                    "Review creation allowed - booking is completed",
                ),
                (true, false, CompletionPolicy::Warn) => (
                    true,
                    "Booking active or upcoming",
                    "Review creation allowed with a warning - booking not yet completed",
                ),
                (true, false, CompletionPolicy::Reject) => (
                    false,
                    "Booking active or upcoming",
                    "Review creation blocked - booking not yet completed",
                ),
                (false, _, _) => (
                    false,
                    "Invalid booking",
                    "Review creation blocked - booking not found",
                ),
            };
        Self {
            booking_id,
            property_id,
            booking_exists,
            booking_completed,
            can_review,
            status,
            recommendation,
            booking,
        }
    }
}

/// Validates bookings across stores and writes reviews.
#[derive(Clone)]
pub struct ReviewWorkflow {
    relational: Arc<dyn RelationalStore>,
    documents: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    policy: ReviewPolicy,
    ratings: RatingAggregator,
}

impl ReviewWorkflow {
    /// Create the workflow with the given review policy
    #[must_use]
    pub fn new(env: &PlatformEnvironment, policy: ReviewPolicy) -> Self {
        Self {
            relational: Arc::clone(&env.relational),
            documents: Arc::clone(&env.documents),
            clock: Arc::clone(&env.clock),
            policy,
            ratings: RatingAggregator::new(env),
        }
    }

    /// The policy reviews are validated against
    #[must_use]
    pub const fn policy(&self) -> &ReviewPolicy {
        &self.policy
    }

    /// Validate, store the review and refresh the property's rating.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::InvalidInput`] when ratings or comment are invalid
    /// - [`ServiceError::InvalidBooking`] when the booking does not exist for
    ///   the property
    /// - [`ServiceError::BookingNotCompleted`] when the stay has not ended and
    ///   the policy rejects such reviews
    /// - [`ServiceError::StoreUnavailable`] when validation or the insert
    ///   fails. A failed rating refresh is not an error; see
    ///   [`ReviewReceipt::rating_update`].
    #[tracing::instrument(
        skip(self, review),
        fields(property_id = %review.property_id, booking_id = %review.booking_id)
    )]
    pub async fn submit_review(&self, review: NewReview) -> Result<ReviewReceipt, ServiceError> {
        let mut receipt = self.add_review(review).await?;
        let property_id = receipt.review.property_id;

        let update = match self.ratings.recompute_rating(property_id).await {
            Ok(RatingOutcome::Updated(rating)) => RatingUpdate::Updated(rating),
            Ok(RatingOutcome::NoReviews { .. }) => RatingUpdate::Failed {
                error: format!("no reviews found for property {property_id} after insert"),
            },
            Err(error) => {
                tracing::warn!(
                    %property_id,
                    review_id = %receipt.review.id,
                    %error,
                    "Review stored but rating refresh failed"
                );
                RatingUpdate::Failed {
                    error: error.to_string(),
                }
            }
        };

        receipt.rating_update = Some(update);
        Ok(receipt)
    }

    /// Validate and store a review without refreshing the rating summary.
    ///
    /// # Errors
    ///
    /// Same as [`ReviewWorkflow::submit_review`].
    #[tracing::instrument(
        skip(self, review),
        fields(property_id = %review.property_id, booking_id = %review.booking_id)
    )]
    pub async fn add_review(&self, review: NewReview) -> Result<ReviewReceipt, ServiceError> {
        let review = self.policy.validate(review).inspect_err(rejected)?;
        let booking_completed = self
            .check_booking(review.booking_id, review.property_id)
            .await
            .inspect_err(rejected)?;

        let warning = (!booking_completed).then(|| {
            tracing::warn!(
                booking_id = %review.booking_id,
                "Accepting review for a booking that is not completed"
            );
            format!(
                "Booking {} is not completed yet; review accepted by policy",
                review.booking_id
            )
        });

        let stored = self
            .documents
            .insert_review(review, self.clock.now())
            .await?;
        metrics::counter!("reviews.submitted").increment(1);
        tracing::info!(review_id = %stored.id, "Review stored");

        Ok(ReviewReceipt {
            review: stored,
            booking_completed,
            warning,
            rating_update: None,
        })
    }

    /// Cross-store checks; returns whether the booking is completed.
    async fn check_booking(
        &self,
        booking_id: BookingId,
        property_id: PropertyId,
    ) -> Result<bool, ServiceError> {
        if !self
            .relational
            .validate_booking_exists(booking_id, property_id)
            .await?
        {
            return Err(ServiceError::InvalidBooking {
                booking_id,
                property_id,
            });
        }

        let completed = self.relational.is_booking_completed(booking_id).await?;
        if !completed && self.policy.completion == CompletionPolicy::Reject {
            return Err(ServiceError::BookingNotCompleted(booking_id));
        }
        Ok(completed)
    }

    /// Report whether a booking may be reviewed, without writing anything.
    ///
    /// # Errors
    ///
    /// [`ServiceError::StoreUnavailable`] on store failure.
    #[tracing::instrument(skip(self))]
    pub async fn check_eligibility(
        &self,
        booking_id: BookingId,
        property_id: PropertyId,
    ) -> Result<Eligibility, ServiceError> {
        let exists = self
            .relational
            .validate_booking_exists(booking_id, property_id)
            .await?;
        if !exists {
            return Ok(Eligibility::new(
                booking_id,
                property_id,
                false,
                false,
                self.policy.completion,
                None,
            ));
        }

        let (completed, booking) = futures::try_join!(
            self.relational.is_booking_completed(booking_id),
            self.relational.guest_info(booking_id),
        )?;
        Ok(Eligibility::new(
            booking_id,
            property_id,
            true,
            completed,
            self.policy.completion,
            booking,
        ))
    }

    /// Booking joined with its guest and derived status.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] when the booking does not exist.
    #[tracing::instrument(skip(self))]
    pub async fn booking_status(&self, booking_id: BookingId) -> Result<GuestBookingInfo, ServiceError> {
        self.relational
            .guest_info(booking_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Booking", booking_id))
    }
}

fn rejected(error: &ServiceError) {
    let reason = match error {
        ServiceError::InvalidInput(_) => "invalid_input",
        ServiceError::InvalidBooking { .. } => "invalid_booking",
        ServiceError::BookingNotCompleted(_) => "booking_not_completed",
        ServiceError::StoreUnavailable(_) | ServiceError::NotFound { .. } => "store_error",
    };
    metrics::counter!("reviews.rejected", "reason" => reason).increment(1);
    tracing::debug!(%error, reason, "Review rejected");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eligibility_requires_existing_completed_booking() {
        let check = |exists, completed, completion| {
            Eligibility::new(
                BookingId::new(1),
                PropertyId::new(2),
                exists,
                completed,
                completion,
                None,
            )
        };

        let ready = check(true, true, CompletionPolicy::Reject);
        assert!(ready.can_review);
        assert_eq!(ready.status, "Ready for review");

        let early = check(true, false, CompletionPolicy::Reject);
        assert!(!early.can_review);
        assert_eq!(early.status, "Booking active or upcoming");

        let tolerated = check(true, false, CompletionPolicy::Warn);
        assert!(tolerated.can_review);
        assert!(tolerated.recommendation.contains("warning"));

        let missing = check(false, false, CompletionPolicy::Warn);
        assert!(!missing.can_review);
        assert_eq!(
            missing.recommendation,
            "Review creation blocked - booking not found"
        );
    }
}
