//! Dashboards and review queries spanning both stores.

#![allow(clippy::unwrap_used)]

mod common;

use common::{NIGHTLY_CENTS, date, review_for, world};
use stayhub::app::{DashboardComposer, RatingAggregator, ReviewQueries};
use stayhub_core::model::{BookingId, Money, PropertyId, UserId};
use stayhub_core::review::{ReviewQuery, ReviewSortField, SortOrder};
use stayhub_core::{DocumentStore, RelationalStore};
use stayhub_testing::{fixtures, test_clock};
use stayhub_core::environment::Clock;

#[tokio::test]
async fn user_dashboard_sums_prices_and_counts_own_reviews() {
    let w = world().await;
    let now = test_clock().now();
    w.documents
        .insert_review(review_for(w.property, w.past_booking, 4, 5), now)
        .await
        .unwrap();
    // Someone else's booking on the same property
    w.documents
        .insert_review(review_for(w.property, BookingId::new(500), 1, 1), now)
        .await
        .unwrap();

    let dashboard = DashboardComposer::new(&w.env)
        .user_dashboard(w.guest)
        .await
        .unwrap();

    assert_eq!(dashboard.user.name, "Gus Guest");
    assert_eq!(dashboard.total_bookings, 2);
    // 3 nights + 4 nights
    assert_eq!(dashboard.total_spent, Money::from_cents(7 * NIGHTLY_CENTS));
    assert_eq!(dashboard.total_reviews, 1);
    assert_eq!(dashboard.reviews[0].booking_id, w.past_booking);
}

#[tokio::test]
async fn host_dashboard_spans_every_property() {
    let w = world().await;
    let second = w
        .relational
        .add_property(fixtures::new_property(w.host, 5_000))
        .await
        .unwrap();
    w.relational
        .add_booking(fixtures::new_booking(
            second,
            w.guest,
            date(2024, 11, 1),
            date(2024, 11, 3),
        ))
        .await
        .unwrap();
    let now = test_clock().now();
    w.documents
        .insert_review(review_for(w.property, w.past_booking, 5, 5), now)
        .await
        .unwrap();
    w.documents
        .insert_review(review_for(second, BookingId::new(3), 3, 4), now)
        .await
        .unwrap();
    w.documents
        .insert_review(review_for(PropertyId::new(77), BookingId::new(9), 1, 1), now)
        .await
        .unwrap();

    let dashboard = DashboardComposer::new(&w.env)
        .host_dashboard(w.host)
        .await
        .unwrap();

    assert_eq!(dashboard.total_properties, 2);
    assert_eq!(dashboard.total_bookings, 3);
    assert_eq!(
        dashboard.total_earnings,
        Money::from_cents(7 * NIGHTLY_CENTS + 2 * 5_000)
    );
    assert_eq!(dashboard.total_reviews, 2);
}

#[tokio::test]
async fn host_without_properties_has_an_empty_dashboard() {
    let w = world().await;

    let dashboard = DashboardComposer::new(&w.env)
        .host_dashboard(w.guest)
        .await
        .unwrap();

    assert_eq!(dashboard.total_properties, 0);
    assert_eq!(dashboard.total_earnings, Money::ZERO);
    assert!(dashboard.reviews.is_empty());
}

#[tokio::test]
async fn missing_identity_is_not_found() {
    let w = world().await;
    let dashboards = DashboardComposer::new(&w.env);

    assert_eq!(
        dashboards.user_dashboard(UserId::new(404)).await.unwrap_err().code(),
        "NOT_FOUND"
    );
    assert_eq!(
        dashboards.host_dashboard(UserId::new(404)).await.unwrap_err().code(),
        "NOT_FOUND"
    );
    assert_eq!(
        dashboards
            .property_details(PropertyId::new(404))
            .await
            .unwrap_err()
            .code(),
        "NOT_FOUND"
    );
}

#[tokio::test]
async fn property_details_carry_rating_and_ten_newest_reviews() {
    let w = world().await;
    let now = test_clock().now();
    for i in 0..12 {
        w.documents
            .insert_review(
                review_for(w.property, w.past_booking, 4, 4),
                now - chrono::Duration::hours(i),
            )
            .await
            .unwrap();
    }
    RatingAggregator::new(&w.env)
        .recompute_rating(w.property)
        .await
        .unwrap();

    let details = DashboardComposer::new(&w.env)
        .property_details(w.property)
        .await
        .unwrap();

    assert_eq!(details.property.city, "Athens");
    assert_eq!(details.rating.unwrap().total_reviews, 12);
    assert_eq!(details.recent_reviews.len(), 10);
    assert_eq!(details.recent_reviews[0].created_at, now);
}

#[tokio::test]
async fn guest_enrichment_flags_missing_bookings() {
    let w = world().await;
    let now = test_clock().now();
    w.documents
        .insert_review(review_for(w.property, w.past_booking, 5, 5), now)
        .await
        .unwrap();
    w.documents
        .insert_review(
            review_for(w.property, BookingId::new(321), 2, 2),
            now - chrono::Duration::days(1),
        )
        .await
        .unwrap();

    let report = ReviewQueries::new(&w.env)
        .reviews_with_guest_info(w.property)
        .await
        .unwrap();

    assert_eq!(report.total_reviews, 2);
    assert_eq!(report.success_count, 1);
    assert_eq!(report.error_count, 1);
    assert_eq!(
        report.reviews[0].booking.as_ref().unwrap().guest_email,
        "gus.guest@example.com"
    );
    assert!(!report.reviews[1].enriched);
    assert!(report.reviews[1].enrichment_error.is_some());
}

#[tokio::test]
async fn guest_enrichment_survives_relational_outage() {
    let w = world().await;
    w.documents
        .insert_review(review_for(w.property, w.past_booking, 5, 5), test_clock().now())
        .await
        .unwrap();
    w.relational.set_offline(true);

    let report = ReviewQueries::new(&w.env)
        .reviews_with_guest_info(w.property)
        .await
        .unwrap();

    assert_eq!(report.error_count, 1);
    assert_eq!(report.success_count, 0);
}

#[tokio::test]
async fn listing_filters_sorts_and_pages() {
    let w = world().await;
    let now = test_clock().now();
    for (i, satisfaction) in [5, 1, 4, 3, 5].into_iter().enumerate() {
        w.documents
            .insert_review(
                review_for(w.property, w.past_booking, 3, satisfaction),
                now - chrono::Duration::days(i64::try_from(i).unwrap()),
            )
            .await
            .unwrap();
    }
    let reviews = ReviewQueries::new(&w.env);

    let mut query = ReviewQuery::all().paged(Some(2), None);
    query.min_satisfaction = Some(3);
    query.sort_by = ReviewSortField::GuestSatisfaction;
    query.order = SortOrder::Asc;
    let page = reviews.list_reviews(query).await.unwrap();

    assert_eq!(page.pagination.total, 4);
    assert_eq!(page.pagination.returned, 2);
    assert!(page.pagination.has_next);
    assert_eq!(page.reviews[0].review.guest_satisfaction, 3);

    let empty_range = ReviewQuery {
        min_satisfaction: Some(4),
        max_satisfaction: Some(2),
        ..ReviewQuery::all()
    };
    assert_eq!(
        reviews.list_reviews(empty_range).await.unwrap_err().code(),
        "VALIDATION_ERROR"
    );
}

#[tokio::test]
async fn analytics_of_unreviewed_property_is_not_found() {
    let w = world().await;
    let reviews = ReviewQueries::new(&w.env);

    assert_eq!(
        reviews.analytics(w.property).await.unwrap_err().code(),
        "NOT_FOUND"
    );

    w.documents
        .insert_review(review_for(w.property, w.past_booking, 2, 4), test_clock().now())
        .await
        .unwrap();
    let analytics = reviews.analytics(w.property).await.unwrap();
    assert_eq!(analytics.total_reviews, 1);
    assert_eq!(analytics.rating_distribution[&4], 1);

    let summary = reviews.summary().await.unwrap();
    assert_eq!(summary.total_reviews, 1);
    assert_eq!(summary.unique_property_count, 1);
}

#[tokio::test]
async fn overview_of_unreviewed_property_has_no_analytics() {
    let w = world().await;

    let overview = ReviewQueries::new(&w.env)
        .overview(w.property)
        .await
        .unwrap();

    assert!(overview.analytics.is_none());
    assert!(overview.recent.reviews.is_empty());
    assert_eq!(overview.guest_reviews.total_reviews, 0);
    assert_eq!(overview.all_bookings.len(), 2);
}

#[tokio::test]
async fn overview_caps_recent_reviews_at_five() {
    let w = world().await;
    let now = test_clock().now();
    for i in 0..7 {
        w.documents
            .insert_review(
                review_for(w.property, w.past_booking, 3, 4),
                now - chrono::Duration::hours(i),
            )
            .await
            .unwrap();
    }

    let overview = ReviewQueries::new(&w.env)
        .overview(w.property)
        .await
        .unwrap();

    assert_eq!(overview.recent.reviews.len(), 5);
    assert_eq!(overview.recent.pagination.total, 7);
    assert!(overview.recent.pagination.has_next);
    assert_eq!(overview.analytics.unwrap().total_reviews, 7);
}
