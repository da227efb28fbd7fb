//! `MongoDB` implementation of [`DocumentStore`].

use crate::document::{
    AnalyticsDocument, CountDocument, PropertyIdDocument, RatingDocument, ReviewDocument,
    ReviewViewDocument, ScoresDocument, SummaryDocument, unsigned,
};
use crate::pipeline;
use bson::{Document, doc};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use serde::de::DeserializeOwned;
use stayhub_core::StoreError;
use stayhub_core::gateway::{DocumentStore, StoreFuture};
use stayhub_core::model::{BookingId, PropertyId};
use stayhub_core::review::{
    NewReview, Pagination, PropertyRating, RatingKind, RatingPage, Review, ReviewAnalytics,
    ReviewPage, ReviewQuery, ReviewScores, ReviewSummary, ReviewView,
};

/// Collection holding reviews.
pub const REVIEWS: &str = "reviews";
/// Collection holding rating summaries.
pub const PROPERTY_RATINGS: &str = "property_ratings";

const DUPLICATE_KEY: i32 = 11_000;

/// Document store gateway backed by the official `mongodb` driver.
#[derive(Clone, Debug)]
pub struct MongoDocumentStore {
    database: Database,
    reviews: Collection<ReviewDocument>,
    ratings: Collection<RatingDocument>,
}

impl MongoDocumentStore {
    /// Connect to `MongoDB` and select `database`.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unavailable`] if the connection string is invalid.
    pub async fn connect(url: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(url)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to connect: {e}")))?;
        Ok(Self::from_database(client.database(database)))
    }

    /// Wrap an existing database handle.
    #[must_use]
    pub fn from_database(database: Database) -> Self {
        Self {
            reviews: database.collection(REVIEWS),
            ratings: database.collection(PROPERTY_RATINGS),
            database,
        }
    }

    /// Create the indexes the pipelines rely on.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unavailable`] if index creation fails.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        for keys in [
            doc! { "property_id": 1 },
            doc! { "booking_id": 1 },
            doc! { "created_at": -1 },
        ] {
            self.reviews
                .create_index(IndexModel::builder().keys(keys).build())
                .await
                .map_err(|e| store_error("create review index", e))?;
        }

        let unique = IndexOptions::builder().unique(true).build();
        self.ratings
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "property_id": 1 })
                    .options(unique)
                    .build(),
            )
            .await
            .map_err(|e| store_error("create rating index", e))?;

        tracing::info!("Document store indexes ensured");
        Ok(())
    }

    /// Run a pipeline on `collection` and decode every result.
    async fn aggregate<C, T>(
        &self,
        collection: &Collection<C>,
        operation: &'static str,
        pipeline: Vec<Document>,
    ) -> Result<Vec<T>, StoreError>
    where
        C: Send + Sync,
        T: DeserializeOwned,
    {
        metrics::counter!("document.pipeline.runs", "operation" => operation).increment(1);
        let cursor = collection
            .aggregate(pipeline)
            .await
            .map_err(|e| store_error(operation, e))?;
        let documents: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| store_error(operation, e))?;
        documents
            .into_iter()
            .map(|document| {
                bson::from_document(document).map_err(|e| {
                    StoreError::Malformed(format!("Failed to decode {operation} result: {e}"))
                })
            })
            .collect()
    }

    /// Run a `$count` pipeline; no output document means zero.
    async fn count<C>(
        &self,
        collection: &Collection<C>,
        operation: &'static str,
        pipeline: Vec<Document>,
    ) -> Result<u64, StoreError>
    where
        C: Send + Sync,
    {
        let counts: Vec<CountDocument> = self.aggregate(collection, operation, pipeline).await?;
        counts.first().map_or(Ok(0), CountDocument::value)
    }

    async fn reviews_for(
        &self,
        operation: &'static str,
        pipeline: Vec<Document>,
    ) -> Result<Vec<Review>, StoreError> {
        let documents: Vec<ReviewDocument> =
            self.aggregate(&self.reviews, operation, pipeline).await?;
        documents.into_iter().map(Review::try_from).collect()
    }
}

/// Classify a driver error.
fn store_error(operation: &str, err: mongodb::error::Error) -> StoreError {
    metrics::counter!("document.errors").increment(1);
    let mapped = match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY => {
            StoreError::Constraint(format!("{operation} rejected: {}", write.message))
        }
        ErrorKind::BsonDeserialization(e) => {
            StoreError::Malformed(format!("Failed to decode {operation} result: {e}"))
        }
        _ => StoreError::Unavailable(format!("Failed to {operation}: {err}")),
    };
    tracing::warn!(operation, error = %mapped, "Document store call failed");
    mapped
}

impl DocumentStore for MongoDocumentStore {
    fn insert_review(
        &self,
        review: NewReview,
        created_at: DateTime<Utc>,
    ) -> StoreFuture<'_, Review> {
        Box::pin(async move {
            let mut document = ReviewDocument::new(review, created_at);
            let result = self
                .reviews
                .insert_one(&document)
                .await
                .map_err(|e| store_error("insert review", e))?;
            let id = result.inserted_id.as_object_id().ok_or_else(|| {
                StoreError::Malformed(format!("Unexpected review id {}", result.inserted_id))
            })?;
            document.id = Some(id);
            metrics::counter!("document.reviews.inserted").increment(1);
            Review::try_from(document)
        })
    }

    fn list_reviews<'a>(
        &'a self,
        query: &'a ReviewQuery,
        now: DateTime<Utc>,
    ) -> StoreFuture<'a, ReviewPage> {
        Box::pin(async move {
            let total = self
                .count(&self.reviews, "count reviews", pipeline::count_reviews(query))
                .await?;
            let documents: Vec<ReviewViewDocument> = self
                .aggregate(&self.reviews, "list reviews", pipeline::list_reviews(query, now))
                .await?;
            let reviews = documents
                .into_iter()
                .map(ReviewView::try_from)
                .collect::<Result<Vec<_>, _>>()?;
            let returned = u64::try_from(reviews.len()).unwrap_or(u64::MAX);
            Ok(ReviewPage {
                reviews,
                pagination: Pagination::new(total, returned, query.limit, query.skip),
            })
        })
    }

    fn review_scores(&self, property_id: PropertyId) -> StoreFuture<'_, ReviewScores> {
        Box::pin(async move {
            let documents: Vec<ScoresDocument> = self
                .aggregate(
                    &self.reviews,
                    "aggregate review scores",
                    pipeline::review_scores(property_id),
                )
                .await?;
            match documents.into_iter().next() {
                Some(document) => ReviewScores::try_from(document),
                None => Ok(ReviewScores::empty(property_id)),
            }
        })
    }

    fn reviewed_property_ids(&self) -> StoreFuture<'_, Vec<PropertyId>> {
        Box::pin(async move {
            let documents: Vec<PropertyIdDocument> = self
                .aggregate(
                    &self.reviews,
                    "list reviewed properties",
                    pipeline::reviewed_property_ids(),
                )
                .await?;
            Ok(documents
                .into_iter()
                .map(|document| PropertyId::new(document.property_id))
                .collect())
        })
    }

    fn reviews_by_booking_ids<'a>(
        &'a self,
        booking_ids: &'a [BookingId],
    ) -> StoreFuture<'a, Vec<Review>> {
        Box::pin(async move {
            if booking_ids.is_empty() {
                return Ok(Vec::new());
            }
            self.reviews_for(
                "find reviews by booking",
                pipeline::reviews_by_booking_ids(booking_ids),
            )
            .await
        })
    }

    fn reviews_by_property_ids<'a>(
        &'a self,
        property_ids: &'a [PropertyId],
    ) -> StoreFuture<'a, Vec<Review>> {
        Box::pin(async move {
            if property_ids.is_empty() {
                return Ok(Vec::new());
            }
            self.reviews_for(
                "find reviews by property",
                pipeline::reviews_by_property_ids(property_ids),
            )
            .await
        })
    }

    fn recent_reviews(&self, property_id: PropertyId, limit: u64) -> StoreFuture<'_, Vec<Review>> {
        Box::pin(async move {
            self.reviews_for(
                "find recent reviews",
                pipeline::recent_reviews(property_id, limit),
            )
            .await
        })
    }

    fn review_analytics(
        &self,
        property_id: PropertyId,
    ) -> StoreFuture<'_, Option<ReviewAnalytics>> {
        Box::pin(async move {
            let documents: Vec<AnalyticsDocument> = self
                .aggregate(
                    &self.reviews,
                    "aggregate review analytics",
                    pipeline::review_analytics(property_id),
                )
                .await?;
            let Some(facets) = documents.into_iter().next() else {
                return Ok(None);
            };
            let Some(stats) = facets.stats.into_iter().next() else {
                return Ok(None);
            };

            let mut rating_distribution = ReviewAnalytics::empty_distribution();
            for bucket in facets.distribution {
                rating_distribution.insert(bucket.score, unsigned(bucket.count, "count")?);
            }
            let recent_reviews = facets
                .recent
                .into_iter()
                .map(Review::try_from)
                .collect::<Result<Vec<_>, _>>()?;

            Ok(Some(ReviewAnalytics {
                property_id,
                total_reviews: unsigned(stats.total_reviews, "total_reviews")?,
                avg_cleanliness: stats.avg_cleanliness,
                avg_satisfaction: stats.avg_satisfaction,
                min_cleanliness: stats.min_cleanliness,
                max_cleanliness: stats.max_cleanliness,
                min_satisfaction: stats.min_satisfaction,
                max_satisfaction: stats.max_satisfaction,
                rating_distribution,
                recent_reviews,
            }))
        })
    }

    fn review_summary(&self) -> StoreFuture<'_, ReviewSummary> {
        Box::pin(async move {
            let documents: Vec<SummaryDocument> = self
                .aggregate(
                    &self.reviews,
                    "aggregate review summary",
                    pipeline::review_summary(),
                )
                .await?;
            let Some(summary) = documents.into_iter().next() else {
                return Ok(ReviewSummary::default());
            };

            let total_reviews = unsigned(summary.total_reviews, "total_reviews")?;
            let unique_property_count =
                unsigned(summary.unique_property_count, "unique_property_count")?;
            #[allow(clippy::cast_precision_loss)]
            let avg_reviews_per_property = if unique_property_count == 0 {
                0.0
            } else {
                total_reviews as f64 / unique_property_count as f64
            };
            Ok(ReviewSummary {
                total_reviews,
                unique_property_count,
                avg_cleanliness_overall: summary.avg_cleanliness_overall,
                avg_satisfaction_overall: summary.avg_satisfaction_overall,
                avg_reviews_per_property,
            })
        })
    }

    fn upsert_rating<'a>(&'a self, rating: &'a PropertyRating) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.ratings
                .replace_one(
                    doc! { "property_id": rating.property_id.get() },
                    RatingDocument::from(rating),
                )
                .upsert(true)
                .await
                .map_err(|e| store_error("upsert rating", e))?;
            Ok(())
        })
    }

    fn delete_rating(&self, property_id: PropertyId) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            let result = self
                .ratings
                .delete_one(doc! { "property_id": property_id.get() })
                .await
                .map_err(|e| store_error("delete rating", e))?;
            Ok(result.deleted_count > 0)
        })
    }

    fn get_rating(&self, property_id: PropertyId) -> StoreFuture<'_, Option<PropertyRating>> {
        Box::pin(async move {
            let document = self
                .ratings
                .find_one(doc! { "property_id": property_id.get() })
                .await
                .map_err(|e| store_error("find rating", e))?;
            document.map(PropertyRating::try_from).transpose()
        })
    }

    fn list_ratings(&self, limit: u64, skip: u64) -> StoreFuture<'_, RatingPage> {
        Box::pin(async move {
            let total = self
                .count(&self.ratings, "count ratings", pipeline::count_ratings())
                .await?;
            let documents: Vec<RatingDocument> = self
                .aggregate(&self.ratings, "list ratings", pipeline::ratings_page(limit, skip))
                .await?;
            let ratings = documents
                .into_iter()
                .map(PropertyRating::try_from)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(RatingPage {
                ratings,
                total,
                limit,
                skip,
            })
        })
    }

    fn top_rated(&self, limit: u64, kind: RatingKind) -> StoreFuture<'_, Vec<PropertyRating>> {
        Box::pin(async move {
            let documents: Vec<RatingDocument> = self
                .aggregate(&self.ratings, "list top rated", pipeline::top_rated(limit, kind))
                .await?;
            documents.into_iter().map(PropertyRating::try_from).collect()
        })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.database
                .run_command(doc! { "ping": 1 })
                .await
                .map_err(|e| StoreError::Unavailable(format!("Ping failed: {e}")))?;
            Ok(())
        })
    }
}
