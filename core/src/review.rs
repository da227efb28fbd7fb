//! Reviews, rating summaries and the shapes of review queries.
//!
//! Reviews live in the document store and reference a booking by id only.
//! [`PropertyRating`] is derived data: it is recomputed in full from the
//! property's reviews (see [`ReviewScores`]) and never patched incrementally.

use crate::error::ServiceError;
use crate::model::{BookingId, PropertyId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Maximum comment length accepted by the default policy, in characters.
pub const MAX_COMMENT_CHARS: usize = 1000;

/// Number of recent reviews attached to property details and analytics.
pub const RECENT_REVIEWS: u64 = 10;

// ============================================================================
// Reviews
// ============================================================================

/// Document store identifier of a review.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(String);

impl ReviewId {
    /// Wrap a store identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A review as submitted, before validation and persistence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReview {
    /// Reviewed property
    pub property_id: PropertyId,
    /// Booking the guest stayed under
    pub booking_id: BookingId,
    /// Cleanliness score
    pub cleanliness_rating: i32,
    /// Overall guest satisfaction score
    pub guest_satisfaction: i32,
    /// Free-text comment
    pub text_comment: String,
}

/// A persisted review.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Review ID
    pub id: ReviewId,
    /// Reviewed property
    pub property_id: PropertyId,
    /// Referenced booking
    pub booking_id: BookingId,
    /// Cleanliness score
    pub cleanliness_rating: i32,
    /// Overall guest satisfaction score
    pub guest_satisfaction: i32,
    /// Free-text comment (trimmed)
    pub text_comment: String,
    /// Server-assigned creation time
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Review policy
// ============================================================================

/// Inclusive range of accepted rating values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingScale {
    min: i32,
    max: i32,
}

impl RatingScale {
    /// Build a scale; `None` when `min > max`.
    #[must_use]
    pub const fn new(min: i32, max: i32) -> Option<Self> {
        if min <= max {
            Some(Self { min, max })
        } else {
            None
        }
    }

    /// Lowest accepted value
    #[must_use]
    pub const fn min(&self) -> i32 {
        self.min
    }

    /// Highest accepted value
    #[must_use]
    pub const fn max(&self) -> i32 {
        self.max
    }

    /// Whether `value` lies on the scale
    #[must_use]
    pub const fn contains(&self, value: i32) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Default for RatingScale {
    fn default() -> Self {
        Self { min: 1, max: 5 }
    }
}

/// What to do when a review references a booking whose stay has not ended.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionPolicy {
    /// Refuse the review with `BookingNotCompleted`
    #[default]
    Reject,
    /// Accept the review and attach a warning to the receipt
    Warn,
}

impl FromStr for CompletionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "warn" => Ok(Self::Warn),
            other => Err(format!("unknown completion policy '{other}'")),
        }
    }
}

/// Local validation rules applied before any store is contacted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewPolicy {
    /// Accepted rating range for both scores
    pub scale: RatingScale,
    /// Maximum comment length in characters, after trimming
    pub max_comment_chars: usize,
    /// Handling of bookings that are not completed
    pub completion: CompletionPolicy,
}

impl Default for ReviewPolicy {
    fn default() -> Self {
        Self {
            scale: RatingScale::default(),
            max_comment_chars: MAX_COMMENT_CHARS,
            completion: CompletionPolicy::default(),
        }
    }
}

impl ReviewPolicy {
    /// Check ratings and comment, returning the review with its comment
    /// trimmed.
    ///
    /// # Errors
    ///
    /// [`ServiceError::InvalidInput`] naming the first rule that failed.
    pub fn validate(&self, mut review: NewReview) -> Result<NewReview, ServiceError> {
        for (field, value) in [
            ("cleanliness_rating", review.cleanliness_rating),
            ("guest_satisfaction", review.guest_satisfaction),
        ] {
            if !self.scale.contains(value) {
                return Err(ServiceError::InvalidInput(format!(
                    "{field} must be between {} and {}, got {value}",
                    self.scale.min, self.scale.max
                )));
            }
        }

        let trimmed = review.text_comment.trim();
        if trimmed.is_empty() {
            return Err(ServiceError::InvalidInput(
                "text_comment must not be empty".to_string(),
            ));
        }
        let length = trimmed.chars().count();
        if length > self.max_comment_chars {
            return Err(ServiceError::InvalidInput(format!(
                "text_comment must be at most {} characters, got {length}",
                self.max_comment_chars
            )));
        }
        if trimmed.len() != review.text_comment.len() {
            review.text_comment = trimmed.to_string();
        }

        Ok(review)
    }
}

// ============================================================================
// Computed review views
// ============================================================================

/// Bucket derived from the satisfaction score (thresholds on the 1-5 scale).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RatingCategory {
    /// Satisfaction of 4 or more
    Excellent,
    /// Satisfaction of 3
    Good,
    /// Satisfaction of 2
    Fair,
    /// Anything lower
    Poor,
}

impl RatingCategory {
    /// Categorise a satisfaction score
    #[must_use]
    pub const fn from_satisfaction(score: i32) -> Self {
        if score >= 4 {
            Self::Excellent
        } else if score >= 3 {
            Self::Good
        } else if score >= 2 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

/// A review decorated with the fields computed by listing queries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewView {
    /// The stored review
    #[serde(flatten)]
    pub review: Review,
    /// Mean of the two scores, rounded to two decimals
    pub overall_rating: f64,
    /// Satisfaction bucket
    pub rating_category: RatingCategory,
    /// Whole days between creation and the query time
    pub review_age_days: i64,
    /// Comment length in characters
    pub review_length: usize,
}

impl ReviewView {
    /// Compute the derived fields of `review` as of `now`.
    #[must_use]
    pub fn compute(review: Review, now: DateTime<Utc>) -> Self {
        let overall_rating = round2(
            (f64::from(review.cleanliness_rating) + f64::from(review.guest_satisfaction)) / 2.0,
        );
        let rating_category = RatingCategory::from_satisfaction(review.guest_satisfaction);
        let review_age_days = (now - review.created_at).num_days();
        let review_length = review.text_comment.chars().count();
        Self {
            review,
            overall_rating,
            rating_category,
            review_age_days,
            review_length,
        }
    }
}

/// Round to two decimals.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// Review queries
// ============================================================================

/// Sortable fields of a review listing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewSortField {
    /// Creation time
    #[default]
    CreatedAt,
    /// Cleanliness score
    CleanlinessRating,
    /// Satisfaction score
    GuestSatisfaction,
    /// Computed overall rating
    OverallRating,
    /// Computed age in days
    ReviewAgeDays,
}

impl ReviewSortField {
    /// Parse a client-supplied sort key; unknown keys fall back to
    /// `created_at`.
    #[must_use]
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(str::trim) {
            Some("cleanliness_rating") => Self::CleanlinessRating,
            Some("guest_satisfaction") => Self::GuestSatisfaction,
            Some("overall_rating") => Self::OverallRating,
            Some("review_age_days") => Self::ReviewAgeDays,
            _ => Self::CreatedAt,
        }
    }

    /// Document field name
    #[must_use]
    pub const fn field_name(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::CleanlinessRating => "cleanliness_rating",
            Self::GuestSatisfaction => "guest_satisfaction",
            Self::OverallRating => "overall_rating",
            Self::ReviewAgeDays => "review_age_days",
        }
    }

    /// Ascending comparison of two views on this field
    #[must_use]
    pub fn compare(&self, a: &ReviewView, b: &ReviewView) -> Ordering {
        match self {
            Self::CreatedAt => a.review.created_at.cmp(&b.review.created_at),
            Self::CleanlinessRating => a.review.cleanliness_rating.cmp(&b.review.cleanliness_rating),
            Self::GuestSatisfaction => a.review.guest_satisfaction.cmp(&b.review.guest_satisfaction),
            Self::OverallRating => a.overall_rating.total_cmp(&b.overall_rating),
            Self::ReviewAgeDays => a.review_age_days.cmp(&b.review_age_days),
        }
    }
}

/// Sort direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending
    Asc,
    /// Descending
    #[default]
    Desc,
}

impl SortOrder {
    /// `asc` (any case) is ascending, anything else descending
    #[must_use]
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some(value) if value.trim().eq_ignore_ascii_case("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }

    /// Pipeline sort direction (`1` or `-1`)
    #[must_use]
    pub const fn direction(&self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

/// Filters, ordering and paging of a review listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewQuery {
    /// Restrict to one property
    pub property_id: Option<PropertyId>,
    /// Lowest satisfaction score to include
    pub min_satisfaction: Option<i32>,
    /// Highest satisfaction score to include
    pub max_satisfaction: Option<i32>,
    /// Sort key
    pub sort_by: ReviewSortField,
    /// Sort direction
    pub order: SortOrder,
    /// Page size
    pub limit: u64,
    /// Number of reviews to skip
    pub skip: u64,
}

impl ReviewQuery {
    /// Page size used when the client does not pick one
    pub const DEFAULT_LIMIT: u64 = 20;
    /// Largest page size served
    pub const MAX_LIMIT: u64 = 100;

    /// Newest-first listing of every review
    #[must_use]
    pub const fn all() -> Self {
        Self {
            property_id: None,
            min_satisfaction: None,
            max_satisfaction: None,
            sort_by: ReviewSortField::CreatedAt,
            order: SortOrder::Desc,
            limit: Self::DEFAULT_LIMIT,
            skip: 0,
        }
    }

    /// Newest-first listing of one property's reviews
    #[must_use]
    pub const fn for_property(property_id: PropertyId) -> Self {
        let mut query = Self::all();
        query.property_id = Some(property_id);
        query
    }

    /// Set paging, clamping the page size to `1..=MAX_LIMIT`
    #[must_use]
    pub fn paged(mut self, limit: Option<u64>, skip: Option<u64>) -> Self {
        self.limit = limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT);
        self.skip = skip.unwrap_or(0);
        self
    }

    /// Whether a review passes the query's filters
    #[must_use]
    pub fn matches(&self, review: &Review) -> bool {
        self.property_id.is_none_or(|id| id == review.property_id)
            && self
                .min_satisfaction
                .is_none_or(|min| review.guest_satisfaction >= min)
            && self
                .max_satisfaction
                .is_none_or(|max| review.guest_satisfaction <= max)
    }
}

/// Paging metadata of a listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Matching reviews in total
    pub total: u64,
    /// Reviews in this page
    pub returned: u64,
    /// Requested page size
    pub limit: u64,
    /// Requested offset
    pub skip: u64,
    /// Whether another page follows
    pub has_next: bool,
    /// Whether a page precedes this one
    pub has_previous: bool,
}

impl Pagination {
    /// Build paging metadata
    #[must_use]
    pub const fn new(total: u64, returned: u64, limit: u64, skip: u64) -> Self {
        Self {
            total,
            returned,
            limit,
            skip,
            has_next: skip.saturating_add(limit) < total,
            has_previous: skip > 0,
        }
    }
}

/// One page of a review listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewPage {
    /// Reviews with computed fields
    pub reviews: Vec<ReviewView>,
    /// Paging metadata
    pub pagination: Pagination,
}

// ============================================================================
// Ratings
// ============================================================================

/// Raw score aggregate over all reviews of one property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewScores {
    /// Property the scores belong to
    pub property_id: PropertyId,
    /// Number of reviews
    pub count: u64,
    /// Sum of cleanliness scores
    pub cleanliness_sum: i64,
    /// Sum of satisfaction scores
    pub satisfaction_sum: i64,
    /// Creation time of the newest review
    pub last_review_at: Option<DateTime<Utc>>,
}

impl ReviewScores {
    /// Aggregate of a property without reviews
    #[must_use]
    pub const fn empty(property_id: PropertyId) -> Self {
        Self {
            property_id,
            count: 0,
            cleanliness_sum: 0,
            satisfaction_sum: 0,
            last_review_at: None,
        }
    }

    /// Fold a set of reviews of `property_id` into an aggregate
    #[must_use]
    pub fn from_reviews<'a>(
        property_id: PropertyId,
        reviews: impl IntoIterator<Item = &'a Review>,
    ) -> Self {
        reviews
            .into_iter()
            .filter(|review| review.property_id == property_id)
            .fold(Self::empty(property_id), |mut acc, review| {
                acc.count += 1;
                acc.cleanliness_sum += i64::from(review.cleanliness_rating);
                acc.satisfaction_sum += i64::from(review.guest_satisfaction);
                acc.last_review_at = acc.last_review_at.max(Some(review.created_at));
                acc
            })
    }

    /// Turn the aggregate into a summary stamped with `now`; `None` when
    /// there are no reviews.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn into_rating(self, now: DateTime<Utc>) -> Option<PropertyRating> {
        if self.count == 0 {
            return None;
        }
        let count = self.count as f64;
        Some(PropertyRating {
            property_id: self.property_id,
            avg_cleanliness_rating: self.cleanliness_sum as f64 / count,
            avg_satisfaction_rating: self.satisfaction_sum as f64 / count,
            total_reviews: self.count,
            last_review_date: self.last_review_at,
            last_updated: now,
        })
    }
}

/// Derived rating summary of a property.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyRating {
    /// Property ID
    pub property_id: PropertyId,
    /// Mean cleanliness score (unrounded)
    pub avg_cleanliness_rating: f64,
    /// Mean satisfaction score (unrounded)
    pub avg_satisfaction_rating: f64,
    /// Number of reviews the means are based on
    pub total_reviews: u64,
    /// Creation time of the newest review
    pub last_review_date: Option<DateTime<Utc>>,
    /// When this summary was recomputed
    pub last_updated: DateTime<Utc>,
}

impl PropertyRating {
    /// Human-readable one-line summary
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "Property {}: Cleanliness {:.2}, Satisfaction {:.2} (based on {} reviews)",
            self.property_id,
            self.avg_cleanliness_rating,
            self.avg_satisfaction_rating,
            self.total_reviews
        )
    }

    /// Mean score of the given kind
    #[must_use]
    pub const fn average(&self, kind: RatingKind) -> f64 {
        match kind {
            RatingKind::Cleanliness => self.avg_cleanliness_rating,
            RatingKind::Satisfaction => self.avg_satisfaction_rating,
        }
    }
}

/// Which average a top-rated listing orders by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingKind {
    /// Average cleanliness
    Cleanliness,
    /// Average satisfaction
    #[default]
    Satisfaction,
}

impl RatingKind {
    /// `cleanliness` selects cleanliness; anything else satisfaction
    #[must_use]
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some(value) if value.trim().eq_ignore_ascii_case("cleanliness") => Self::Cleanliness,
            _ => Self::Satisfaction,
        }
    }

    /// Summary field holding this average
    #[must_use]
    pub const fn field_name(&self) -> &'static str {
        match self {
            Self::Cleanliness => "avg_cleanliness_rating",
            Self::Satisfaction => "avg_satisfaction_rating",
        }
    }
}

/// One page of rating summaries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatingPage {
    /// Summaries, best satisfaction first
    pub ratings: Vec<PropertyRating>,
    /// Summaries in total
    pub total: u64,
    /// Requested page size
    pub limit: u64,
    /// Requested offset
    pub skip: u64,
}

// ============================================================================
// Analytics
// ============================================================================

/// Statistics over one property's reviews.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewAnalytics {
    /// Property ID
    pub property_id: PropertyId,
    /// Number of reviews
    pub total_reviews: u64,
    /// Mean cleanliness
    pub avg_cleanliness: f64,
    /// Mean satisfaction
    pub avg_satisfaction: f64,
    /// Lowest cleanliness score
    pub min_cleanliness: i32,
    /// Highest cleanliness score
    pub max_cleanliness: i32,
    /// Lowest satisfaction score
    pub min_satisfaction: i32,
    /// Highest satisfaction score
    pub max_satisfaction: i32,
    /// Count of reviews per satisfaction score 1..=5
    pub rating_distribution: BTreeMap<i32, u64>,
    /// Five newest reviews
    pub recent_reviews: Vec<Review>,
}

impl ReviewAnalytics {
    /// Number of recent reviews carried
    pub const RECENT: usize = 5;

    /// Distribution with every score 1..=5 present
    #[must_use]
    pub fn empty_distribution() -> BTreeMap<i32, u64> {
        (1..=5).map(|score| (score, 0)).collect()
    }
}

/// Statistics over every review on the platform.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummary {
    /// Number of reviews
    pub total_reviews: u64,
    /// Number of distinct reviewed properties
    pub unique_property_count: u64,
    /// Mean cleanliness over all reviews
    pub avg_cleanliness_overall: f64,
    /// Mean satisfaction over all reviews
    pub avg_satisfaction_overall: f64,
    /// Reviews per reviewed property
    pub avg_reviews_per_property: f64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, day, 12, 0, 0).unwrap()
    }

    fn review(property: i32, cleanliness: i32, satisfaction: i32, day: u32) -> Review {
        Review {
            id: ReviewId::new(format!("r-{property}-{day}")),
            property_id: PropertyId::new(property),
            booking_id: BookingId::new(1),
            cleanliness_rating: cleanliness,
            guest_satisfaction: satisfaction,
            text_comment: "Lovely stay".to_string(),
            created_at: at(day),
        }
    }

    fn new_review(cleanliness: i32, satisfaction: i32, comment: &str) -> NewReview {
        NewReview {
            property_id: PropertyId::new(1),
            booking_id: BookingId::new(1),
            cleanliness_rating: cleanliness,
            guest_satisfaction: satisfaction,
            text_comment: comment.to_string(),
        }
    }

    #[test]
    fn policy_trims_comment() {
        let policy = ReviewPolicy::default();
        let validated = policy.validate(new_review(4, 5, "  Great host  ")).unwrap();
        assert_eq!(validated.text_comment, "Great host");
    }

    #[test]
    fn policy_rejects_blank_and_long_comments() {
        let policy = ReviewPolicy::default();
        assert!(policy.validate(new_review(4, 5, "   ")).is_err());
        assert!(policy.validate(new_review(4, 5, &"x".repeat(1001))).is_err());
        assert!(policy.validate(new_review(4, 5, &"x".repeat(1000))).is_ok());
    }

    #[test]
    fn policy_counts_characters_not_bytes() {
        let policy = ReviewPolicy::default();
        assert!(policy.validate(new_review(4, 5, &"é".repeat(1000))).is_ok());
    }

    #[test]
    fn custom_scale_accepts_wider_range() {
        let policy = ReviewPolicy {
            scale: RatingScale::new(0, 100).unwrap(),
            ..ReviewPolicy::default()
        };
        assert!(policy.validate(new_review(0, 87, "ok")).is_ok());
        assert!(RatingScale::new(5, 1).is_none());
    }

    proptest! {
        #[test]
        fn ratings_off_the_default_scale_are_rejected(
            cleanliness in prop_oneof![i32::MIN..1, 6..i32::MAX],
            satisfaction in 1..=5i32,
        ) {
            let policy = ReviewPolicy::default();
            let result = policy.validate(new_review(cleanliness, satisfaction, "fine"));
            prop_assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
        }

        #[test]
        fn ratings_on_the_default_scale_are_accepted(
            cleanliness in 1..=5i32,
            satisfaction in 1..=5i32,
        ) {
            let policy = ReviewPolicy::default();
            prop_assert!(policy.validate(new_review(cleanliness, satisfaction, "fine")).is_ok());
        }
    }

    #[test]
    fn scores_fold_into_unrounded_means() {
        let reviews = [review(7, 4, 5, 1), review(7, 2, 3, 3), review(8, 1, 1, 9)];
        let scores = ReviewScores::from_reviews(PropertyId::new(7), &reviews);

        assert_eq!(scores.count, 2);
        assert_eq!(scores.last_review_at, Some(at(3)));

        let rating = scores.into_rating(at(10)).unwrap();
        assert_eq!(rating.avg_cleanliness_rating, 3.0);
        assert_eq!(rating.avg_satisfaction_rating, 4.0);
        assert_eq!(rating.total_reviews, 2);
        assert_eq!(rating.last_updated, at(10));
    }

    #[test]
    fn no_reviews_means_no_rating() {
        assert!(ReviewScores::empty(PropertyId::new(1)).into_rating(at(1)).is_none());
    }

    #[test]
    fn summary_line_rounds_for_display_only() {
        let rating = PropertyRating {
            property_id: PropertyId::new(12),
            avg_cleanliness_rating: 10.0 / 3.0,
            avg_satisfaction_rating: 4.5,
            total_reviews: 3,
            last_review_date: None,
            last_updated: at(1),
        };
        assert_eq!(
            rating.summary_line(),
            "Property 12: Cleanliness 3.33, Satisfaction 4.50 (based on 3 reviews)"
        );
    }

    #[test]
    fn view_computes_derived_fields() {
        let view = ReviewView::compute(review(1, 3, 4, 1), at(11));
        assert_eq!(view.overall_rating, 3.5);
        assert_eq!(view.rating_category, RatingCategory::Excellent);
        assert_eq!(view.review_age_days, 10);
        assert_eq!(view.review_length, 11);
    }

    #[test]
    fn overall_rating_of_extreme_scores_does_not_overflow() {
        let view = ReviewView::compute(review(1, i32::MAX, i32::MAX, 1), at(1));
        assert_eq!(view.overall_rating, f64::from(i32::MAX));

        let view = ReviewView::compute(review(1, i32::MIN, i32::MAX, 1), at(1));
        assert_eq!(view.overall_rating, -0.5);
    }

    #[test]
    fn categories_follow_satisfaction_thresholds() {
        assert_eq!(RatingCategory::from_satisfaction(5), RatingCategory::Excellent);
        assert_eq!(RatingCategory::from_satisfaction(3), RatingCategory::Good);
        assert_eq!(RatingCategory::from_satisfaction(2), RatingCategory::Fair);
        assert_eq!(RatingCategory::from_satisfaction(1), RatingCategory::Poor);
    }

    #[test]
    fn unknown_sort_keys_fall_back_to_created_at() {
        assert_eq!(ReviewSortField::from_param(Some("password")), ReviewSortField::CreatedAt);
        assert_eq!(ReviewSortField::from_param(None), ReviewSortField::CreatedAt);
        assert_eq!(
            ReviewSortField::from_param(Some("overall_rating")),
            ReviewSortField::OverallRating
        );
        assert_eq!(SortOrder::from_param(Some("ASC")), SortOrder::Asc);
        assert_eq!(SortOrder::from_param(Some("up")), SortOrder::Desc);
    }

    #[test]
    fn pagination_flags() {
        let page = Pagination::new(45, 20, 20, 20);
        assert!(page.has_next);
        assert!(page.has_previous);

        let last = Pagination::new(45, 5, 20, 40);
        assert!(!last.has_next);
    }

    #[test]
    fn query_paging_is_clamped() {
        let query = ReviewQuery::all().paged(Some(10_000), None);
        assert_eq!(query.limit, ReviewQuery::MAX_LIMIT);
        let query = ReviewQuery::all().paged(Some(0), Some(5));
        assert_eq!(query.limit, 1);
        assert_eq!(query.skip, 5);
    }

    #[test]
    fn query_filters_by_property_and_satisfaction() {
        let mut query = ReviewQuery::for_property(PropertyId::new(7));
        query.min_satisfaction = Some(4);

        assert!(query.matches(&review(7, 1, 5, 1)));
        assert!(!query.matches(&review(7, 5, 3, 1)));
        assert!(!query.matches(&review(8, 5, 5, 1)));
    }

    #[test]
    fn rating_kind_defaults_to_satisfaction() {
        assert_eq!(RatingKind::from_param(Some("Cleanliness")), RatingKind::Cleanliness);
        assert_eq!(RatingKind::from_param(Some("value")), RatingKind::Satisfaction);
        assert_eq!(RatingKind::from_param(None), RatingKind::Satisfaction);
    }
}
