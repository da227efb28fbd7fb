//! Aggregation pipelines.
//!
//! Every read of the document store is expressed as a pipeline built here.
//! The builders are pure so their shape can be unit tested without a server.

use bson::{Bson, Document, doc};
use chrono::{DateTime, Utc};
use stayhub_core::model::{BookingId, PropertyId};
use stayhub_core::review::{RatingKind, ReviewAnalytics, ReviewQuery};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// `$match` filter of a review listing.
#[must_use]
pub fn review_filter(query: &ReviewQuery) -> Document {
    let mut filter = Document::new();
    if let Some(property_id) = query.property_id {
        filter.insert("property_id", property_id.get());
    }

    let mut satisfaction = Document::new();
    if let Some(min) = query.min_satisfaction {
        satisfaction.insert("$gte", min);
    }
    if let Some(max) = query.max_satisfaction {
        satisfaction.insert("$lte", max);
    }
    if !satisfaction.is_empty() {
        filter.insert("guest_satisfaction", satisfaction);
    }

    filter
}

/// Fields computed for every listed review, evaluated as of `now`.
#[must_use]
pub fn computed_fields(now: DateTime<Utc>) -> Document {
    doc! {
        "overall_rating": {
            "$round": [{ "$avg": ["$cleanliness_rating", "$guest_satisfaction"] }, 2]
        },
        "rating_category": {
            "$switch": {
                "branches": [
                    { "case": { "$gte": ["$guest_satisfaction", 4] }, "then": "Excellent" },
                    { "case": { "$gte": ["$guest_satisfaction", 3] }, "then": "Good" },
                    { "case": { "$gte": ["$guest_satisfaction", 2] }, "then": "Fair" },
                ],
                "default": "Poor"
            }
        },
        "review_age_days": {
            "$toLong": {
                "$floor": {
                    "$divide": [
                        { "$subtract": [bson::DateTime::from_chrono(now), "$created_at"] },
                        MILLIS_PER_DAY
                    ]
                }
            }
        },
        "review_length": { "$strLenCP": "$text_comment" },
    }
}

/// Filtered, decorated, sorted and paged review listing.
#[must_use]
pub fn list_reviews(query: &ReviewQuery, now: DateTime<Utc>) -> Vec<Document> {
    let direction = query.order.direction();
    vec![
        doc! { "$match": review_filter(query) },
        doc! { "$addFields": computed_fields(now) },
        doc! { "$sort": { query.sort_by.field_name(): direction, "_id": direction } },
        doc! { "$skip": to_i64(query.skip) },
        doc! { "$limit": to_i64(query.limit) },
    ]
}

/// Number of reviews matching a listing's filters.
#[must_use]
pub fn count_reviews(query: &ReviewQuery) -> Vec<Document> {
    vec![
        doc! { "$match": review_filter(query) },
        doc! { "$count": "total" },
    ]
}

/// Count, score sums and newest creation time of one property's reviews.
#[must_use]
pub fn review_scores(property_id: PropertyId) -> Vec<Document> {
    vec![
        doc! { "$match": { "property_id": property_id.get() } },
        doc! {
            "$group": {
                "_id": "$property_id",
                "count": { "$sum": 1 },
                "cleanliness_sum": { "$sum": "$cleanliness_rating" },
                "satisfaction_sum": { "$sum": "$guest_satisfaction" },
                "last_review_at": { "$max": "$created_at" },
            }
        },
    ]
}

/// Distinct property ids referenced by reviews, ascending.
#[must_use]
pub fn reviewed_property_ids() -> Vec<Document> {
    vec![
        doc! { "$group": { "_id": "$property_id" } },
        doc! { "$sort": { "_id": 1 } },
    ]
}

/// Reviews whose `field` is one of `ids`, newest first.
fn reviews_in(field: &str, ids: Vec<Bson>) -> Vec<Document> {
    vec![
        doc! { "$match": { field: { "$in": ids } } },
        doc! { "$sort": { "created_at": -1, "_id": -1 } },
    ]
}

/// Reviews of the given bookings, newest first.
#[must_use]
pub fn reviews_by_booking_ids(ids: &[BookingId]) -> Vec<Document> {
    reviews_in(
        "booking_id",
        ids.iter().map(|id| Bson::Int32(id.get())).collect(),
    )
}

/// Reviews of the given properties, newest first.
#[must_use]
pub fn reviews_by_property_ids(ids: &[PropertyId]) -> Vec<Document> {
    reviews_in(
        "property_id",
        ids.iter().map(|id| Bson::Int32(id.get())).collect(),
    )
}

/// The `limit` newest reviews of a property.
#[must_use]
pub fn recent_reviews(property_id: PropertyId, limit: u64) -> Vec<Document> {
    vec![
        doc! { "$match": { "property_id": property_id.get() } },
        doc! { "$sort": { "created_at": -1, "_id": -1 } },
        doc! { "$limit": to_i64(limit) },
    ]
}

/// Statistics, satisfaction distribution and newest reviews of a property,
/// computed in one pass with `$facet`.
#[must_use]
pub fn review_analytics(property_id: PropertyId) -> Vec<Document> {
    let recent = i64::try_from(ReviewAnalytics::RECENT).unwrap_or(i64::MAX);
    vec![
        doc! { "$match": { "property_id": property_id.get() } },
        doc! {
            "$facet": {
                "stats": [
                    {
                        "$group": {
                            "_id": Bson::Null,
                            "total_reviews": { "$sum": 1 },
                            "avg_cleanliness": { "$avg": "$cleanliness_rating" },
                            "avg_satisfaction": { "$avg": "$guest_satisfaction" },
                            "min_cleanliness": { "$min": "$cleanliness_rating" },
                            "max_cleanliness": { "$max": "$cleanliness_rating" },
                            "min_satisfaction": { "$min": "$guest_satisfaction" },
                            "max_satisfaction": { "$max": "$guest_satisfaction" },
                        }
                    }
                ],
                "distribution": [
                    { "$group": { "_id": "$guest_satisfaction", "count": { "$sum": 1 } } },
                    { "$sort": { "_id": 1 } }
                ],
                "recent": [
                    { "$sort": { "created_at": -1, "_id": -1 } },
                    { "$limit": recent }
                ],
            }
        },
    ]
}

/// Platform-wide review statistics.
#[must_use]
pub fn review_summary() -> Vec<Document> {
    vec![
        doc! {
            "$group": {
                "_id": Bson::Null,
                "total_reviews": { "$sum": 1 },
                "property_ids": { "$addToSet": "$property_id" },
                "avg_cleanliness_overall": { "$avg": "$cleanliness_rating" },
                "avg_satisfaction_overall": { "$avg": "$guest_satisfaction" },
            }
        },
        doc! {
            "$project": {
                "_id": 0,
                "total_reviews": 1,
                "unique_property_count": { "$size": "$property_ids" },
                "avg_cleanliness_overall": 1,
                "avg_satisfaction_overall": 1,
            }
        },
    ]
}

/// Page of rating summaries, best satisfaction first.
#[must_use]
pub fn ratings_page(limit: u64, skip: u64) -> Vec<Document> {
    vec![
        doc! { "$sort": { "avg_satisfaction_rating": -1, "property_id": 1 } },
        doc! { "$skip": to_i64(skip) },
        doc! { "$limit": to_i64(limit) },
    ]
}

/// Number of stored rating summaries.
#[must_use]
pub fn count_ratings() -> Vec<Document> {
    vec![doc! { "$count": "total" }]
}

/// Best `limit` summaries by the chosen average.
#[must_use]
pub fn top_rated(limit: u64, kind: RatingKind) -> Vec<Document> {
    let field = kind.field_name();
    vec![
        doc! { "$match": { field: { "$exists": true } } },
        doc! { "$sort": { field: -1, "total_reviews": -1, "property_id": 1 } },
        doc! { "$limit": to_i64(limit) },
    ]
}

/// Pipeline integers are signed.
fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use stayhub_core::review::{ReviewSortField, SortOrder};

    fn stage_names(pipeline: &[Document]) -> Vec<String> {
        pipeline
            .iter()
            .map(|stage| stage.keys().next().cloned().unwrap_or_default())
            .collect()
    }

    #[test]
    fn filter_combines_property_and_satisfaction_range() {
        let mut query = ReviewQuery::for_property(PropertyId::new(7));
        query.min_satisfaction = Some(2);
        query.max_satisfaction = Some(4);

        let filter = review_filter(&query);
        assert_eq!(filter.get_i32("property_id").unwrap(), 7);
        let range = filter.get_document("guest_satisfaction").unwrap();
        assert_eq!(range.get_i32("$gte").unwrap(), 2);
        assert_eq!(range.get_i32("$lte").unwrap(), 4);
    }

    #[test]
    fn unfiltered_listing_matches_everything() {
        assert!(review_filter(&ReviewQuery::all()).is_empty());
    }

    #[test]
    fn listing_sorts_on_requested_field_and_pages() {
        let mut query = ReviewQuery::all().paged(Some(5), Some(10));
        query.sort_by = ReviewSortField::OverallRating;
        query.order = SortOrder::Asc;
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

        let pipeline = list_reviews(&query, now);
        assert_eq!(
            stage_names(&pipeline),
            vec!["$match", "$addFields", "$sort", "$skip", "$limit"]
        );

        let sort = pipeline[2].get_document("$sort").unwrap();
        assert_eq!(sort.keys().next().map(String::as_str), Some("overall_rating"));
        assert_eq!(sort.get_i32("overall_rating").unwrap(), 1);
        assert_eq!(pipeline[3].get_i64("$skip").unwrap(), 10);
        assert_eq!(pipeline[4].get_i64("$limit").unwrap(), 5);
    }

    #[test]
    fn computed_fields_use_the_supplied_clock() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let fields = computed_fields(now);
        let subtract = fields
            .get_document("review_age_days")
            .and_then(|d| d.get_document("$toLong"))
            .and_then(|d| d.get_document("$floor"))
            .and_then(|d| d.get_array("$divide"))
            .unwrap();
        let operands = subtract[0].as_document().unwrap().get_array("$subtract").unwrap();
        assert_eq!(operands[0], Bson::DateTime(bson::DateTime::from_chrono(now)));
        assert!(fields.contains_key("overall_rating"));
        assert!(fields.contains_key("rating_category"));
        assert!(fields.contains_key("review_length"));
    }

    #[test]
    fn score_aggregate_groups_one_property() {
        let pipeline = review_scores(PropertyId::new(3));
        assert_eq!(stage_names(&pipeline), vec!["$match", "$group"]);
        let group = pipeline[1].get_document("$group").unwrap();
        for key in ["count", "cleanliness_sum", "satisfaction_sum", "last_review_at"] {
            assert!(group.contains_key(key), "missing {key}");
        }
    }

    #[test]
    fn id_lists_become_in_filters() {
        let pipeline = reviews_by_booking_ids(&[BookingId::new(1), BookingId::new(2)]);
        let filter = pipeline[0].get_document("$match").unwrap();
        let ids = filter
            .get_document("booking_id")
            .unwrap()
            .get_array("$in")
            .unwrap();
        assert_eq!(ids, &vec![Bson::Int32(1), Bson::Int32(2)]);
    }

    #[test]
    fn analytics_uses_three_facets() {
        let pipeline = review_analytics(PropertyId::new(1));
        let facet = pipeline[1].get_document("$facet").unwrap();
        assert_eq!(
            facet.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["stats", "distribution", "recent"]
        );
    }

    #[test]
    fn top_rated_orders_by_chosen_average() {
        let pipeline = top_rated(3, RatingKind::Cleanliness);
        let sort = pipeline[1].get_document("$sort").unwrap();
        assert_eq!(
            sort.keys().next().map(String::as_str),
            Some("avg_cleanliness_rating")
        );
        assert_eq!(pipeline[2].get_i64("$limit").unwrap(), 3);
    }
}
