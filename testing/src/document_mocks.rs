//! In-memory document store
//!
//! [`InMemoryDocumentStore`] evaluates the listing, aggregate and analytics
//! queries in plain Rust with the same ordering rules the pipelines use. It
//! can be told to fail so tests can observe partial failures.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Test utilities document panics where critical

use chrono::{DateTime, Utc};
use stayhub_core::StoreError;
use stayhub_core::gateway::{DocumentStore, StoreFuture};
use stayhub_core::model::{BookingId, PropertyId};
use stayhub_core::review::{
    NewReview, Pagination, PropertyRating, RatingKind, RatingPage, Review, ReviewAnalytics,
    ReviewId, ReviewPage, ReviewQuery, ReviewScores, ReviewSummary, ReviewView,
};
use std::cmp::Ordering as CmpOrdering;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct Collections {
    reviews: Vec<Review>,
    ratings: BTreeMap<PropertyId, PropertyRating>,
    last_review: u64,
}

/// Newest first, ties broken by id.
fn newest_first(a: &Review, b: &Review) -> CmpOrdering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.as_str().cmp(a.id.as_str()))
}

fn to_u64(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

fn page<T: Clone>(items: &[T], limit: u64, skip: u64) -> Vec<T> {
    let skip = usize::try_from(skip).unwrap_or(usize::MAX);
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    items.iter().skip(skip).take(limit).cloned().collect()
}

/// In-memory [`DocumentStore`] for fast, deterministic tests.
///
/// Clones share the same collections.
///
/// # Example
///
/// ```
/// use stayhub_core::DocumentStore;
/// use stayhub_core::model::PropertyId;
/// use stayhub_testing::{InMemoryDocumentStore, fixtures, test_clock};
/// use stayhub_core::environment::Clock;
///
/// # async fn example() -> Result<(), stayhub_core::StoreError> {
/// let store = InMemoryDocumentStore::new();
/// store
///     .insert_review(fixtures::new_review(1, 1, 5, 4), test_clock().now())
///     .await?;
/// let scores = store.review_scores(PropertyId::new(1)).await?;
/// assert_eq!(scores.count, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<Collections>>,
    offline: Arc<AtomicBool>,
    failing_upserts: Arc<RwLock<HashSet<PropertyId>>>,
    fail_all_upserts: Arc<AtomicBool>,
    rating_writes: Arc<AtomicUsize>,
}

impl InMemoryDocumentStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`]
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make rating upserts for `property_id` fail
    pub fn fail_rating_upserts_for(&self, property_id: PropertyId) {
        self.failing_upserts.write().unwrap().insert(property_id);
    }

    /// Make every rating upsert fail (`true`) or succeed again (`false`)
    pub fn fail_rating_upserts(&self, fail: bool) {
        self.fail_all_upserts.store(fail, Ordering::SeqCst);
        if !fail {
            self.failing_upserts.write().unwrap().clear();
        }
    }

    /// Successful rating upserts and deletes so far
    #[must_use]
    pub fn rating_writes(&self) -> usize {
        self.rating_writes.load(Ordering::SeqCst)
    }

    /// Number of stored reviews
    #[must_use]
    pub fn review_count(&self) -> usize {
        self.collections.read().unwrap().reviews.len()
    }

    /// Stored summary of a property, bypassing failure injection
    #[must_use]
    pub fn stored_rating(&self, property_id: PropertyId) -> Option<PropertyRating> {
        self.collections
            .read()
            .unwrap()
            .ratings
            .get(&property_id)
            .cloned()
    }

    /// Store a summary directly, bypassing failure injection
    pub fn seed_rating(&self, rating: PropertyRating) {
        self.collections
            .write()
            .unwrap()
            .ratings
            .insert(rating.property_id, rating);
    }

    fn run<'a, T: Send + 'a>(
        &'a self,
        operation: &'static str,
        op: impl FnOnce(&mut Collections) -> Result<T, StoreError>,
    ) -> StoreFuture<'a, T> {
        let result = if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable(format!("{operation}: document store offline")))
        } else {
            op(&mut self.collections.write().unwrap())
        };
        Box::pin(futures::future::ready(result))
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn insert_review(
        &self,
        review: NewReview,
        created_at: DateTime<Utc>,
    ) -> StoreFuture<'_, Review> {
        self.run("insert review", |collections| {
            collections.last_review += 1;
            let stored = Review {
                id: ReviewId::new(format!("{:024x}", collections.last_review)),
                property_id: review.property_id,
                booking_id: review.booking_id,
                cleanliness_rating: review.cleanliness_rating,
                guest_satisfaction: review.guest_satisfaction,
                text_comment: review.text_comment,
                created_at,
            };
            collections.reviews.push(stored.clone());
            Ok(stored)
        })
    }

    fn list_reviews<'a>(
        &'a self,
        query: &'a ReviewQuery,
        now: DateTime<Utc>,
    ) -> StoreFuture<'a, ReviewPage> {
        self.run("list reviews", |collections| {
            let mut views: Vec<ReviewView> = collections
                .reviews
                .iter()
                .filter(|review| query.matches(review))
                .cloned()
                .map(|review| ReviewView::compute(review, now))
                .collect();
            views.sort_by(|a, b| {
                let ascending = query
                    .sort_by
                    .compare(a, b)
                    .then_with(|| a.review.id.as_str().cmp(b.review.id.as_str()));
                if query.order.direction() < 0 {
                    ascending.reverse()
                } else {
                    ascending
                }
            });
            let total = to_u64(views.len());
            let reviews = page(&views, query.limit, query.skip);
            let returned = to_u64(reviews.len());
            Ok(ReviewPage {
                reviews,
                pagination: Pagination::new(total, returned, query.limit, query.skip),
            })
        })
    }

    fn review_scores(&self, property_id: PropertyId) -> StoreFuture<'_, ReviewScores> {
        self.run("aggregate review scores", |collections| {
            Ok(ReviewScores::from_reviews(property_id, &collections.reviews))
        })
    }

    fn reviewed_property_ids(&self) -> StoreFuture<'_, Vec<PropertyId>> {
        self.run("list reviewed properties", |collections| {
            let ids: BTreeSet<PropertyId> =
                collections.reviews.iter().map(|r| r.property_id).collect();
            Ok(ids.into_iter().collect())
        })
    }

    fn reviews_by_booking_ids<'a>(
        &'a self,
        booking_ids: &'a [BookingId],
    ) -> StoreFuture<'a, Vec<Review>> {
        self.run("find reviews by booking", |collections| {
            let mut reviews: Vec<Review> = collections
                .reviews
                .iter()
                .filter(|r| booking_ids.contains(&r.booking_id))
                .cloned()
                .collect();
            reviews.sort_by(newest_first);
            Ok(reviews)
        })
    }

    fn reviews_by_property_ids<'a>(
        &'a self,
        property_ids: &'a [PropertyId],
    ) -> StoreFuture<'a, Vec<Review>> {
        self.run("find reviews by property", |collections| {
            let mut reviews: Vec<Review> = collections
                .reviews
                .iter()
                .filter(|r| property_ids.contains(&r.property_id))
                .cloned()
                .collect();
            reviews.sort_by(newest_first);
            Ok(reviews)
        })
    }

    fn recent_reviews(&self, property_id: PropertyId, limit: u64) -> StoreFuture<'_, Vec<Review>> {
        self.run("find recent reviews", |collections| {
            let mut reviews: Vec<Review> = collections
                .reviews
                .iter()
                .filter(|r| r.property_id == property_id)
                .cloned()
                .collect();
            reviews.sort_by(newest_first);
            Ok(page(&reviews, limit, 0))
        })
    }

    #[allow(clippy::cast_precision_loss)]
    fn review_analytics(
        &self,
        property_id: PropertyId,
    ) -> StoreFuture<'_, Option<ReviewAnalytics>> {
        self.run("aggregate review analytics", |collections| {
            let mut reviews: Vec<&Review> = collections
                .reviews
                .iter()
                .filter(|r| r.property_id == property_id)
                .collect();
            if reviews.is_empty() {
                return Ok(None);
            }
            reviews.sort_by(|a, b| newest_first(a, b));

            let scores = ReviewScores::from_reviews(property_id, reviews.iter().copied());
            let count = scores.count as f64;
            let cleanliness = reviews.iter().map(|r| r.cleanliness_rating);
            let satisfaction = reviews.iter().map(|r| r.guest_satisfaction);

            let mut rating_distribution = ReviewAnalytics::empty_distribution();
            for review in &reviews {
                *rating_distribution.entry(review.guest_satisfaction).or_insert(0) += 1;
            }

            Ok(Some(ReviewAnalytics {
                property_id,
                total_reviews: scores.count,
                avg_cleanliness: scores.cleanliness_sum as f64 / count,
                avg_satisfaction: scores.satisfaction_sum as f64 / count,
                min_cleanliness: cleanliness.clone().min().unwrap_or_default(),
                max_cleanliness: cleanliness.max().unwrap_or_default(),
                min_satisfaction: satisfaction.clone().min().unwrap_or_default(),
                max_satisfaction: satisfaction.max().unwrap_or_default(),
                rating_distribution,
                recent_reviews: reviews
                    .into_iter()
                    .take(ReviewAnalytics::RECENT)
                    .cloned()
                    .collect(),
            }))
        })
    }

    #[allow(clippy::cast_precision_loss)]
    fn review_summary(&self) -> StoreFuture<'_, ReviewSummary> {
        self.run("aggregate review summary", |collections| {
            let reviews = &collections.reviews;
            if reviews.is_empty() {
                return Ok(ReviewSummary::default());
            }
            let total = reviews.len() as f64;
            let properties: BTreeSet<PropertyId> = reviews.iter().map(|r| r.property_id).collect();
            let cleanliness: i64 = reviews.iter().map(|r| i64::from(r.cleanliness_rating)).sum();
            let satisfaction: i64 = reviews.iter().map(|r| i64::from(r.guest_satisfaction)).sum();
            Ok(ReviewSummary {
                total_reviews: to_u64(reviews.len()),
                unique_property_count: to_u64(properties.len()),
                avg_cleanliness_overall: cleanliness as f64 / total,
                avg_satisfaction_overall: satisfaction as f64 / total,
                avg_reviews_per_property: total / properties.len() as f64,
            })
        })
    }

    fn upsert_rating<'a>(&'a self, rating: &'a PropertyRating) -> StoreFuture<'a, ()> {
        let injected = self.fail_all_upserts.load(Ordering::SeqCst)
            || self
                .failing_upserts
                .read()
                .unwrap()
                .contains(&rating.property_id);
        self.run("upsert rating", |collections| {
            if injected {
                return Err(StoreError::Unavailable(format!(
                    "upsert rating {}: write rejected",
                    rating.property_id
                )));
            }
            collections.ratings.insert(rating.property_id, rating.clone());
            self.rating_writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    fn delete_rating(&self, property_id: PropertyId) -> StoreFuture<'_, bool> {
        self.run("delete rating", |collections| {
            let existed = collections.ratings.remove(&property_id).is_some();
            if existed {
                self.rating_writes.fetch_add(1, Ordering::SeqCst);
            }
            Ok(existed)
        })
    }

    fn get_rating(&self, property_id: PropertyId) -> StoreFuture<'_, Option<PropertyRating>> {
        self.run("find rating", |collections| {
            Ok(collections.ratings.get(&property_id).cloned())
        })
    }

    fn list_ratings(&self, limit: u64, skip: u64) -> StoreFuture<'_, RatingPage> {
        self.run("list ratings", |collections| {
            let mut ratings: Vec<PropertyRating> = collections.ratings.values().cloned().collect();
            ratings.sort_by(|a, b| {
                b.avg_satisfaction_rating
                    .total_cmp(&a.avg_satisfaction_rating)
                    .then_with(|| a.property_id.cmp(&b.property_id))
            });
            Ok(RatingPage {
                total: to_u64(ratings.len()),
                ratings: page(&ratings, limit, skip),
                limit,
                skip,
            })
        })
    }

    fn top_rated(&self, limit: u64, kind: RatingKind) -> StoreFuture<'_, Vec<PropertyRating>> {
        self.run("list top rated", |collections| {
            let mut ratings: Vec<PropertyRating> = collections.ratings.values().cloned().collect();
            ratings.sort_by(|a, b| {
                b.average(kind)
                    .total_cmp(&a.average(kind))
                    .then_with(|| b.total_reviews.cmp(&a.total_reviews))
                    .then_with(|| a.property_id.cmp(&b.property_id))
            });
            Ok(page(&ratings, limit, 0))
        })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        self.run("ping", |_| Ok(()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::mocks::test_clock;
    use chrono::Duration;
    use stayhub_core::environment::Clock;
    use stayhub_core::review::{ReviewSortField, SortOrder};

    #[tokio::test]
    async fn test_listing_sorts_then_pages() {
        let store = InMemoryDocumentStore::new();
        let now = test_clock().now();
        for (booking, satisfaction) in [(1, 3), (2, 5), (3, 4)] {
            store
                .insert_review(
                    fixtures::new_review(1, booking, 4, satisfaction),
                    now - Duration::days(i64::from(booking)),
                )
                .await
                .unwrap();
        }

        let mut query = ReviewQuery::all().paged(Some(2), Some(1));
        query.sort_by = ReviewSortField::GuestSatisfaction;
        query.order = SortOrder::Asc;
        let page = store.list_reviews(&query, now).await.unwrap();

        let scores: Vec<_> = page
            .reviews
            .iter()
            .map(|view| view.review.guest_satisfaction)
            .collect();
        assert_eq!(scores, vec![4, 5]);
        assert_eq!(page.pagination.total, 3);
        assert!(page.pagination.has_previous);
        assert!(!page.pagination.has_next);
        assert_eq!(page.reviews[0].review_age_days, 3);
    }

    #[tokio::test]
    async fn test_injected_upsert_failure_is_per_property() {
        let store = InMemoryDocumentStore::new();
        store.fail_rating_upserts_for(PropertyId::new(2));
        let now = test_clock().now();

        let mut rating = ReviewScores {
            property_id: PropertyId::new(1),
            count: 1,
            cleanliness_sum: 4,
            satisfaction_sum: 5,
            last_review_at: Some(now),
        }
        .into_rating(now)
        .unwrap();
        store.upsert_rating(&rating).await.unwrap();

        rating.property_id = PropertyId::new(2);
        assert!(store.upsert_rating(&rating).await.is_err());
        assert_eq!(store.rating_writes(), 1);
        assert!(store.stored_rating(PropertyId::new(2)).is_none());
    }

    #[tokio::test]
    async fn test_analytics_counts_every_score() {
        let store = InMemoryDocumentStore::new();
        let now = test_clock().now();
        for (booking, satisfaction) in [(1, 5), (2, 5), (3, 2)] {
            store
                .insert_review(fixtures::new_review(7, booking, 3, satisfaction), now)
                .await
                .unwrap();
        }

        let analytics = store
            .review_analytics(PropertyId::new(7))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(analytics.total_reviews, 3);
        assert_eq!(analytics.avg_satisfaction, 4.0);
        assert_eq!(analytics.min_satisfaction, 2);
        assert_eq!(analytics.rating_distribution[&5], 2);
        assert_eq!(analytics.rating_distribution[&1], 0);
        assert!(store
            .review_analytics(PropertyId::new(8))
            .await
            .unwrap()
            .is_none());
    }
}
