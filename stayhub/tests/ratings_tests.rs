//! Rating Aggregator over the in-memory document store.

#![allow(clippy::unwrap_used, clippy::panic, clippy::float_cmp)]

mod common;

use chrono::{Duration, TimeZone, Utc};
use stayhub::PlatformEnvironment;
use stayhub::app::RatingAggregator;
use stayhub::app::ratings::RatingOutcome;
use stayhub_core::DocumentStore;
use stayhub_core::ServiceError;
use stayhub_core::model::PropertyId;
use stayhub_core::review::{PropertyRating, RatingKind};
use stayhub_testing::{InMemoryDocumentStore, InMemoryRelationalStore, fixtures, test_clock};
use stayhub_core::environment::Clock;
use std::sync::Arc;

fn aggregator(documents: &InMemoryDocumentStore) -> RatingAggregator {
    RatingAggregator::new(&PlatformEnvironment::new(
        Arc::new(InMemoryRelationalStore::new()),
        Arc::new(documents.clone()),
        Arc::new(test_clock()),
    ))
}

async fn seed(documents: &InMemoryDocumentStore, property: i32, scores: &[(i32, i32)]) {
    for (i, (cleanliness, satisfaction)) in scores.iter().enumerate() {
        let created_at = test_clock().now() - Duration::days(i64::try_from(i).unwrap() + 1);
        documents
            .insert_review(
                fixtures::new_review(property, 100 + i32::try_from(i).unwrap(), *cleanliness, *satisfaction),
                created_at,
            )
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn means_are_computed_from_every_review() {
    let documents = InMemoryDocumentStore::new();
    seed(&documents, 1, &[(4, 5), (2, 3)]).await;

    let outcome = aggregator(&documents)
        .recompute_rating(PropertyId::new(1))
        .await
        .unwrap();

    let RatingOutcome::Updated(rating) = outcome else {
        panic!("expected an update, got {outcome:?}");
    };
    assert_eq!(rating.avg_cleanliness_rating, 3.0);
    assert_eq!(rating.avg_satisfaction_rating, 4.0);
    assert_eq!(rating.total_reviews, 2);
    assert_eq!(rating.last_updated, test_clock().now());
    assert_eq!(
        rating.last_review_date,
        Some(test_clock().now() - Duration::days(1))
    );
    assert_eq!(documents.stored_rating(PropertyId::new(1)), Some(rating));
}

#[tokio::test]
async fn averages_are_not_rounded() {
    let documents = InMemoryDocumentStore::new();
    seed(&documents, 1, &[(5, 5), (3, 4), (3, 4)]).await;

    let rating = match aggregator(&documents)
        .recompute_rating(PropertyId::new(1))
        .await
        .unwrap()
    {
        RatingOutcome::Updated(rating) => rating,
        other => panic!("expected an update, got {other:?}"),
    };

    assert_eq!(rating.avg_cleanliness_rating, 11.0 / 3.0);
    assert_eq!(
        rating.summary_line(),
        "Property 1: Cleanliness 3.67, Satisfaction 4.33 (based on 3 reviews)"
    );
}

#[tokio::test]
async fn recomputation_is_idempotent() {
    let documents = InMemoryDocumentStore::new();
    seed(&documents, 9, &[(1, 2), (5, 5), (4, 3)]).await;
    let ratings = aggregator(&documents);

    let first = ratings.recompute_rating(PropertyId::new(9)).await.unwrap();
    let stored_first = documents.stored_rating(PropertyId::new(9));
    let second = ratings.recompute_rating(PropertyId::new(9)).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(stored_first, documents.stored_rating(PropertyId::new(9)));
}

#[tokio::test]
async fn property_without_reviews_loses_its_stale_summary() {
    let documents = InMemoryDocumentStore::new();
    documents.seed_rating(PropertyRating {
        property_id: PropertyId::new(5),
        avg_cleanliness_rating: 4.0,
        avg_satisfaction_rating: 4.0,
        total_reviews: 1,
        last_review_date: None,
        last_updated: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
    });

    let outcome = aggregator(&documents)
        .recompute_rating(PropertyId::new(5))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RatingOutcome::NoReviews {
            property_id: PropertyId::new(5),
            removed: true,
        }
    );
    assert!(documents.stored_rating(PropertyId::new(5)).is_none());
}

#[tokio::test]
async fn batch_counts_failures_and_keeps_going() {
    let documents = InMemoryDocumentStore::new();
    seed(&documents, 1, &[(5, 5)]).await;
    seed(&documents, 2, &[(3, 3)]).await;
    seed(&documents, 3, &[(1, 2), (2, 1)]).await;
    documents.fail_rating_upserts_for(PropertyId::new(2));

    let report = aggregator(&documents).recompute_all().await.unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.failures[0].property_id, PropertyId::new(2));
    assert!(documents.stored_rating(PropertyId::new(1)).is_some());
    assert!(documents.stored_rating(PropertyId::new(2)).is_none());
    assert!(documents.stored_rating(PropertyId::new(3)).is_some());
}

#[tokio::test]
async fn batch_fails_when_property_ids_cannot_be_listed() {
    let documents = InMemoryDocumentStore::new();
    documents.set_offline(true);

    let err = aggregator(&documents).recompute_all().await.unwrap_err();

    assert!(matches!(err, ServiceError::StoreUnavailable(_)));
}

#[tokio::test]
async fn reads_report_missing_summaries() {
    let documents = InMemoryDocumentStore::new();
    let ratings = aggregator(&documents);

    assert!(!ratings.has_ratings(PropertyId::new(1)).await.unwrap());
    assert_eq!(
        ratings.get_rating(PropertyId::new(1)).await.unwrap_err().code(),
        "NOT_FOUND"
    );
    assert!(ratings.rating_summary_line(PropertyId::new(1)).await.is_err());
}

#[tokio::test]
async fn top_rated_and_listing_order_by_average() {
    let documents = InMemoryDocumentStore::new();
    seed(&documents, 1, &[(5, 2)]).await;
    seed(&documents, 2, &[(2, 5)]).await;
    seed(&documents, 3, &[(4, 4)]).await;
    let ratings = aggregator(&documents);
    ratings.recompute_all().await.unwrap();

    let by_cleanliness = ratings
        .top_rated(Some(2), RatingKind::Cleanliness)
        .await
        .unwrap();
    let ids: Vec<i32> = by_cleanliness.iter().map(|r| r.property_id.get()).collect();
    assert_eq!(ids, vec![1, 3]);

    let page = ratings.list_ratings(None, None).await.unwrap();
    let ids: Vec<i32> = page.ratings.iter().map(|r| r.property_id.get()).collect();
    assert_eq!(ids, vec![2, 3, 1]);
    assert_eq!(page.total, 3);
}
