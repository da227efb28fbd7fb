//! BSON shapes of the `reviews` and `property_ratings` collections and of
//! the pipeline results, with conversions into the domain model.

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use stayhub_core::StoreError;
use stayhub_core::model::{BookingId, PropertyId};
use stayhub_core::review::{
    NewReview, PropertyRating, RatingCategory, Review, ReviewId, ReviewScores, ReviewView,
};

/// Convert a stored count, rejecting negatives.
pub(crate) fn unsigned(value: i64, field: &str) -> Result<u64, StoreError> {
    u64::try_from(value).map_err(|_| StoreError::Malformed(format!("{field} is negative: {value}")))
}

/// A document of the `reviews` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewDocument {
    /// Assigned by the server on insert
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Reviewed property
    pub property_id: i32,
    /// Referenced booking
    pub booking_id: i32,
    /// Cleanliness score
    pub cleanliness_rating: i32,
    /// Satisfaction score
    pub guest_satisfaction: i32,
    /// Comment
    pub text_comment: String,
    /// Creation time (millisecond precision)
    pub created_at: bson::DateTime,
}

impl ReviewDocument {
    /// Document for a validated review stamped with `created_at`
    #[must_use]
    pub fn new(review: NewReview, created_at: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            id: None,
            property_id: review.property_id.get(),
            booking_id: review.booking_id.get(),
            cleanliness_rating: review.cleanliness_rating,
            guest_satisfaction: review.guest_satisfaction,
            text_comment: review.text_comment,
            created_at: bson::DateTime::from_chrono(created_at),
        }
    }
}

impl TryFrom<ReviewDocument> for Review {
    type Error = StoreError;

    fn try_from(document: ReviewDocument) -> Result<Self, Self::Error> {
        let id = document
            .id
            .ok_or_else(|| StoreError::Malformed("review document without _id".to_string()))?;
        Ok(Self {
            id: ReviewId::new(id.to_hex()),
            property_id: PropertyId::new(document.property_id),
            booking_id: BookingId::new(document.booking_id),
            cleanliness_rating: document.cleanliness_rating,
            guest_satisfaction: document.guest_satisfaction,
            text_comment: document.text_comment,
            created_at: document.created_at.to_chrono(),
        })
    }
}

/// A review with the fields added by the listing pipeline's `$addFields`.
#[derive(Debug, Deserialize)]
pub struct ReviewViewDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    property_id: i32,
    booking_id: i32,
    cleanliness_rating: i32,
    guest_satisfaction: i32,
    text_comment: String,
    created_at: bson::DateTime,
    overall_rating: f64,
    rating_category: RatingCategory,
    review_age_days: i64,
    review_length: i64,
}

impl TryFrom<ReviewViewDocument> for ReviewView {
    type Error = StoreError;

    fn try_from(document: ReviewViewDocument) -> Result<Self, Self::Error> {
        let review_length = usize::try_from(document.review_length).map_err(|_| {
            StoreError::Malformed(format!("review_length is negative: {}", document.review_length))
        })?;
        Ok(Self {
            review: Review {
                id: ReviewId::new(document.id.to_hex()),
                property_id: PropertyId::new(document.property_id),
                booking_id: BookingId::new(document.booking_id),
                cleanliness_rating: document.cleanliness_rating,
                guest_satisfaction: document.guest_satisfaction,
                text_comment: document.text_comment,
                created_at: document.created_at.to_chrono(),
            },
            overall_rating: document.overall_rating,
            rating_category: document.rating_category,
            review_age_days: document.review_age_days,
            review_length,
        })
    }
}

/// Output of the score aggregate pipeline.
#[derive(Debug, Deserialize)]
pub struct ScoresDocument {
    #[serde(rename = "_id")]
    property_id: i32,
    count: i64,
    cleanliness_sum: i64,
    satisfaction_sum: i64,
    last_review_at: Option<bson::DateTime>,
}

impl TryFrom<ScoresDocument> for ReviewScores {
    type Error = StoreError;

    fn try_from(document: ScoresDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            property_id: PropertyId::new(document.property_id),
            count: unsigned(document.count, "count")?,
            cleanliness_sum: document.cleanliness_sum,
            satisfaction_sum: document.satisfaction_sum,
            last_review_at: document.last_review_at.map(bson::DateTime::to_chrono),
        })
    }
}

/// A document of the `property_ratings` collection.
///
/// Averages written by older tooling may be stored as integers; they are
/// read back as `f64` either way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingDocument {
    /// Property ID (unique)
    pub property_id: i32,
    /// Mean cleanliness
    pub avg_cleanliness_rating: f64,
    /// Mean satisfaction
    pub avg_satisfaction_rating: f64,
    /// Number of reviews
    pub total_reviews: i64,
    /// Newest review time
    pub last_review_date: Option<bson::DateTime>,
    /// Recalculation time
    pub last_updated: bson::DateTime,
}

impl From<&PropertyRating> for RatingDocument {
    fn from(rating: &PropertyRating) -> Self {
        Self {
            property_id: rating.property_id.get(),
            avg_cleanliness_rating: rating.avg_cleanliness_rating,
            avg_satisfaction_rating: rating.avg_satisfaction_rating,
            total_reviews: i64::try_from(rating.total_reviews).unwrap_or(i64::MAX),
            last_review_date: rating.last_review_date.map(bson::DateTime::from_chrono),
            last_updated: bson::DateTime::from_chrono(rating.last_updated),
        }
    }
}

impl TryFrom<RatingDocument> for PropertyRating {
    type Error = StoreError;

    fn try_from(document: RatingDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            property_id: PropertyId::new(document.property_id),
            avg_cleanliness_rating: document.avg_cleanliness_rating,
            avg_satisfaction_rating: document.avg_satisfaction_rating,
            total_reviews: unsigned(document.total_reviews, "total_reviews")?,
            last_review_date: document.last_review_date.map(bson::DateTime::to_chrono),
            last_updated: document.last_updated.to_chrono(),
        })
    }
}

/// `{ total: n }` as produced by `$count`.
#[derive(Debug, Deserialize)]
pub struct CountDocument {
    /// Counted documents
    pub total: i64,
}

impl CountDocument {
    /// The count as unsigned
    ///
    /// # Errors
    ///
    /// [`StoreError::Malformed`] if negative.
    pub fn value(&self) -> Result<u64, StoreError> {
        unsigned(self.total, "total")
    }
}

/// `{ _id: property_id }` rows of the distinct-property pipeline.
#[derive(Debug, Deserialize)]
pub struct PropertyIdDocument {
    /// Property ID
    #[serde(rename = "_id")]
    pub property_id: i32,
}

/// Output of the analytics `$facet` stage.
#[derive(Debug, Deserialize)]
pub struct AnalyticsDocument {
    /// Zero or one stats row
    pub stats: Vec<StatsDocument>,
    /// Satisfaction buckets
    pub distribution: Vec<BucketDocument>,
    /// Newest reviews
    pub recent: Vec<ReviewDocument>,
}

/// Stats row of the analytics facet.
#[derive(Debug, Deserialize)]
pub struct StatsDocument {
    /// Number of reviews
    pub total_reviews: i64,
    /// Mean cleanliness
    pub avg_cleanliness: f64,
    /// Mean satisfaction
    pub avg_satisfaction: f64,
    /// Lowest cleanliness
    pub min_cleanliness: i32,
    /// Highest cleanliness
    pub max_cleanliness: i32,
    /// Lowest satisfaction
    pub min_satisfaction: i32,
    /// Highest satisfaction
    pub max_satisfaction: i32,
}

/// One satisfaction bucket of the analytics facet.
#[derive(Debug, Deserialize)]
pub struct BucketDocument {
    /// Satisfaction score
    #[serde(rename = "_id")]
    pub score: i32,
    /// Reviews with that score
    pub count: i64,
}

/// Output of the summary pipeline.
#[derive(Debug, Deserialize)]
pub struct SummaryDocument {
    /// Number of reviews
    pub total_reviews: i64,
    /// Distinct reviewed properties
    pub unique_property_count: i64,
    /// Mean cleanliness
    pub avg_cleanliness_overall: f64,
    /// Mean satisfaction
    pub avg_satisfaction_overall: f64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use bson::doc;
    use chrono::{TimeZone, Utc};

    #[test]
    fn rating_documents_accept_integer_averages() {
        let raw = doc! {
            "property_id": 4,
            "avg_cleanliness_rating": 4,
            "avg_satisfaction_rating": 3.5,
            "total_reviews": 2,
            "last_review_date": bson::DateTime::from_millis(0),
            "last_updated": bson::DateTime::from_millis(1_000),
        };
        let document: RatingDocument = bson::from_document(raw).unwrap();
        let rating = PropertyRating::try_from(document).unwrap();
        assert_eq!(rating.avg_cleanliness_rating, 4.0);
        assert_eq!(rating.total_reviews, 2);
    }

    #[test]
    fn review_document_keeps_millisecond_time() {
        let created_at = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let mut document = ReviewDocument::new(
            NewReview {
                property_id: PropertyId::new(1),
                booking_id: BookingId::new(2),
                cleanliness_rating: 5,
                guest_satisfaction: 4,
                text_comment: "Spotless".to_string(),
            },
            created_at,
        );
        assert!(Review::try_from(document.clone()).is_err());

        document.id = Some(ObjectId::new());
        let review = Review::try_from(document).unwrap();
        assert_eq!(review.created_at, created_at);
        assert_eq!(review.booking_id, BookingId::new(2));
    }

    #[test]
    fn new_review_documents_omit_id() {
        let document = ReviewDocument::new(
            NewReview {
                property_id: PropertyId::new(1),
                booking_id: BookingId::new(2),
                cleanliness_rating: 5,
                guest_satisfaction: 4,
                text_comment: "Spotless".to_string(),
            },
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        );
        let raw = bson::to_document(&document).unwrap();
        assert!(!raw.contains_key("_id"));
        assert_eq!(raw.get_i32("guest_satisfaction").unwrap(), 4);
    }

    #[test]
    fn view_documents_decode_computed_fields() {
        let raw = doc! {
            "_id": ObjectId::new(),
            "property_id": 1,
            "booking_id": 2,
            "cleanliness_rating": 3,
            "guest_satisfaction": 4,
            "text_comment": "Nice",
            "created_at": bson::DateTime::from_millis(0),
            "overall_rating": 3.5,
            "rating_category": "Excellent",
            "review_age_days": 12_i64,
            "review_length": 4,
        };
        let document: ReviewViewDocument = bson::from_document(raw).unwrap();
        let view = ReviewView::try_from(document).unwrap();
        assert_eq!(view.rating_category, RatingCategory::Excellent);
        assert_eq!(view.review_length, 4);
        assert_eq!(view.review_age_days, 12);
    }
}
