//! Rating Aggregator.
//!
//! A property's summary is always rebuilt from the full set of its reviews
//! and written back with a single upsert keyed by property id. Running the
//! recomputation twice without review writes in between produces the same
//! summary for the same clock reading.

use super::PlatformEnvironment;
use serde::Serialize;
use stayhub_core::environment::Clock;
use stayhub_core::model::PropertyId;
use stayhub_core::review::{PropertyRating, RatingKind, RatingPage};
use stayhub_core::{DocumentStore, ServiceError};
use std::sync::Arc;

/// Page size of rating listings when the client does not pick one.
pub const DEFAULT_RATING_LIMIT: u64 = 10;
/// Largest page of rating summaries served.
pub const MAX_RATING_LIMIT: u64 = 100;

/// Result of recomputing one property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RatingOutcome {
    /// The summary was rebuilt and stored
    Updated(PropertyRating),
    /// The property has no reviews; any stale summary was deleted
    NoReviews {
        /// Property that was recomputed
        property_id: PropertyId,
        /// Whether a stale summary existed and was removed
        removed: bool,
    },
}

/// A property whose recomputation failed during a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecomputeFailure {
    /// Property ID
    pub property_id: PropertyId,
    /// Failure description
    pub error: String,
}

/// Outcome of recomputing every reviewed property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Properties attempted
    pub total: usize,
    /// Properties recomputed
    pub succeeded: usize,
    /// Properties that failed
    pub failed: usize,
    /// One entry per failed property
    pub failures: Vec<RecomputeFailure>,
}

/// Recomputes and serves per-property rating summaries.
#[derive(Clone)]
pub struct RatingAggregator {
    documents: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl RatingAggregator {
    /// Create the aggregator
    #[must_use]
    pub fn new(env: &PlatformEnvironment) -> Self {
        Self {
            documents: Arc::clone(&env.documents),
            clock: Arc::clone(&env.clock),
        }
    }

    /// Rebuild the summary of one property from all of its reviews.
    ///
    /// # Errors
    ///
    /// [`ServiceError::StoreUnavailable`] when the aggregate cannot be read
    /// or the summary cannot be written.
    #[tracing::instrument(skip(self))]
    pub async fn recompute_rating(
        &self,
        property_id: PropertyId,
    ) -> Result<RatingOutcome, ServiceError> {
        let result = self.recompute(property_id).await;
        match &result {
            Ok(_) => metrics::counter!("ratings.recomputed").increment(1),
            Err(error) => {
                metrics::counter!("ratings.recompute_failed").increment(1);
                tracing::warn!(%property_id, %error, "Rating recomputation failed");
            }
        }
        result
    }

    async fn recompute(&self, property_id: PropertyId) -> Result<RatingOutcome, ServiceError> {
        let scores = self.documents.review_scores(property_id).await?;

        let Some(rating) = scores.into_rating(self.clock.now()) else {
            let removed = self.documents.delete_rating(property_id).await?;
            tracing::debug!(%property_id, removed, "Property has no reviews");
            return Ok(RatingOutcome::NoReviews {
                property_id,
                removed,
            });
        };

        self.documents.upsert_rating(&rating).await?;
        tracing::debug!(
            %property_id,
            total_reviews = rating.total_reviews,
            avg_cleanliness = rating.avg_cleanliness_rating,
            avg_satisfaction = rating.avg_satisfaction_rating,
            "Rating summary stored"
        );
        Ok(RatingOutcome::Updated(rating))
    }

    /// Recompute every property referenced by at least one review.
    ///
    /// A property that fails is recorded in the report and the batch moves
    /// on.
    ///
    /// # Errors
    ///
    /// [`ServiceError::StoreUnavailable`] when the reviewed property ids
    /// cannot be listed.
    #[tracing::instrument(skip(self))]
    pub async fn recompute_all(&self) -> Result<BatchReport, ServiceError> {
        let property_ids = self.documents.reviewed_property_ids().await?;

        let mut report = BatchReport {
            total: property_ids.len(),
            ..BatchReport::default()
        };
        for property_id in property_ids {
            match self.recompute_rating(property_id).await {
                Ok(_) => report.succeeded += 1,
                Err(error) => {
                    report.failed += 1;
                    report.failures.push(RecomputeFailure {
                        property_id,
                        error: error.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            total = report.total,
            succeeded = report.succeeded,
            failed = report.failed,
            "Rating batch finished"
        );
        Ok(report)
    }

    /// Stored summary of a property.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] when no summary exists.
    #[tracing::instrument(skip(self))]
    pub async fn get_rating(&self, property_id: PropertyId) -> Result<PropertyRating, ServiceError> {
        self.documents
            .get_rating(property_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("PropertyRating", property_id))
    }

    /// Whether a summary exists for the property.
    ///
    /// # Errors
    ///
    /// [`ServiceError::StoreUnavailable`] on store failure.
    pub async fn has_ratings(&self, property_id: PropertyId) -> Result<bool, ServiceError> {
        Ok(self.documents.get_rating(property_id).await?.is_some())
    }

    /// One-line description of a summary, averages rounded to two decimals.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] when no summary exists.
    pub async fn rating_summary_line(&self, property_id: PropertyId) -> Result<String, ServiceError> {
        Ok(self.get_rating(property_id).await?.summary_line())
    }

    /// Page of summaries, best average satisfaction first.
    ///
    /// # Errors
    ///
    /// [`ServiceError::StoreUnavailable`] on store failure.
    #[tracing::instrument(skip(self))]
    pub async fn list_ratings(
        &self,
        limit: Option<u64>,
        skip: Option<u64>,
    ) -> Result<RatingPage, ServiceError> {
        let limit = clamp_limit(limit);
        Ok(self
            .documents
            .list_ratings(limit, skip.unwrap_or(0))
            .await?)
    }

    /// Best summaries by the chosen average.
    ///
    /// # Errors
    ///
    /// [`ServiceError::StoreUnavailable`] on store failure.
    #[tracing::instrument(skip(self))]
    pub async fn top_rated(
        &self,
        limit: Option<u64>,
        kind: RatingKind,
    ) -> Result<Vec<PropertyRating>, ServiceError> {
        Ok(self.documents.top_rated(clamp_limit(limit), kind).await?)
    }
}

fn clamp_limit(limit: Option<u64>) -> u64 {
    limit
        .unwrap_or(DEFAULT_RATING_LIMIT)
        .clamp(1, MAX_RATING_LIMIT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_clamped() {
        assert_eq!(clamp_limit(None), DEFAULT_RATING_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(5_000)), MAX_RATING_LIMIT);
    }

    #[test]
    fn no_reviews_outcome_serializes_with_tag() {
        let outcome = RatingOutcome::NoReviews {
            property_id: PropertyId::new(3),
            removed: true,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "no_reviews");
        assert_eq!(json["property_id"], 3);
    }
}
