//! Store gateway traits.
//!
//! The services depend on the two stores only through these traits. The
//! production implementations live in `stayhub-postgres`
//! (`PgRelationalStore`) and `stayhub-mongo` (`MongoDocumentStore`); the
//! in-memory doubles live in `stayhub-testing`.
//!
//! # Dyn Compatibility
//!
//! Methods return [`StoreFuture`] (a boxed future) instead of using
//! `async fn` so that the stores can be shared as `Arc<dyn RelationalStore>`
//! and `Arc<dyn DocumentStore>`.

use crate::error::StoreError;
use crate::model::{
    Booking, BookingId, BookingPatch, GuestBookingInfo, NewBooking, NewProperty, NewUser,
    Property, PropertyId, PropertyPatch, User, UserId, UserPatch,
};
use crate::review::{
    NewReview, PropertyRating, RatingKind, RatingPage, Review, ReviewAnalytics, ReviewPage,
    ReviewQuery, ReviewScores, ReviewSummary,
};
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;

/// Boxed future returned by every gateway method.
pub type StoreFuture<'a, T> = BoxFuture<'a, Result<T, StoreError>>;

/// Gateway to the relational store.
///
/// Every method corresponds to one stored routine. Update and delete
/// routines that affect no row report [`StoreError::NotFound`].
pub trait RelationalStore: Send + Sync {
    /// Register a user and return its new id.
    fn add_user(&self, user: NewUser) -> StoreFuture<'_, UserId>;

    /// Look a user up by id.
    fn get_user(&self, id: UserId) -> StoreFuture<'_, Option<User>>;

    /// Look a user up by email.
    fn get_user_by_email<'a>(&'a self, email: &'a str) -> StoreFuture<'a, Option<User>>;

    /// Apply a partial update to a user.
    fn update_user(&self, id: UserId, patch: UserPatch) -> StoreFuture<'_, ()>;

    /// Delete a user.
    fn delete_user(&self, id: UserId) -> StoreFuture<'_, ()>;

    /// List a property and return its new id.
    fn add_property(&self, property: NewProperty) -> StoreFuture<'_, PropertyId>;

    /// Look a property up by id.
    fn get_property(&self, id: PropertyId) -> StoreFuture<'_, Option<Property>>;

    /// Apply a partial update to a property.
    fn update_property(&self, id: PropertyId, patch: PropertyPatch) -> StoreFuture<'_, ()>;

    /// Delete a property.
    fn delete_property(&self, id: PropertyId) -> StoreFuture<'_, ()>;

    /// Properties owned by a host.
    fn properties_by_host(&self, host_id: UserId) -> StoreFuture<'_, Vec<Property>>;

    /// Create a booking; the store prices it as nights x nightly price.
    fn add_booking(&self, booking: NewBooking) -> StoreFuture<'_, BookingId>;

    /// Look a booking up by id.
    fn get_booking(&self, id: BookingId) -> StoreFuture<'_, Option<Booking>>;

    /// Change the dates of a booking.
    fn update_booking(&self, id: BookingId, patch: BookingPatch) -> StoreFuture<'_, ()>;

    /// Delete a booking.
    fn delete_booking(&self, id: BookingId) -> StoreFuture<'_, ()>;

    /// Bookings of a property.
    fn bookings_by_property(&self, property_id: PropertyId) -> StoreFuture<'_, Vec<Booking>>;

    /// Bookings made by a guest.
    fn bookings_by_guest(&self, guest_id: UserId) -> StoreFuture<'_, Vec<Booking>>;

    /// Every booking joined with its guest.
    fn all_bookings(&self) -> StoreFuture<'_, Vec<GuestBookingInfo>>;

    /// Whether `booking_id` exists and belongs to `property_id`.
    fn validate_booking_exists(
        &self,
        booking_id: BookingId,
        property_id: PropertyId,
    ) -> StoreFuture<'_, bool>;

    /// Whether the stay of `booking_id` has ended.
    fn is_booking_completed(&self, booking_id: BookingId) -> StoreFuture<'_, bool>;

    /// A booking joined with its guest's name, email and derived status.
    fn guest_info(&self, booking_id: BookingId) -> StoreFuture<'_, Option<GuestBookingInfo>>;

    /// Round-trip to the store for readiness checks.
    fn ping(&self) -> StoreFuture<'_, ()>;
}

/// Gateway to the document store.
pub trait DocumentStore: Send + Sync {
    /// Persist a validated review stamped with `created_at`.
    fn insert_review(&self, review: NewReview, created_at: DateTime<Utc>)
    -> StoreFuture<'_, Review>;

    /// Filtered, sorted and paged listing; computed fields are evaluated as
    /// of `now`.
    fn list_reviews<'a>(
        &'a self,
        query: &'a ReviewQuery,
        now: DateTime<Utc>,
    ) -> StoreFuture<'a, ReviewPage>;

    /// Score aggregate over every review of a property.
    fn review_scores(&self, property_id: PropertyId) -> StoreFuture<'_, ReviewScores>;

    /// Distinct property ids referenced by any review, ascending.
    fn reviewed_property_ids(&self) -> StoreFuture<'_, Vec<PropertyId>>;

    /// Reviews whose booking id is in `booking_ids`, newest first.
    fn reviews_by_booking_ids<'a>(
        &'a self,
        booking_ids: &'a [BookingId],
    ) -> StoreFuture<'a, Vec<Review>>;

    /// Reviews whose property id is in `property_ids`, newest first.
    fn reviews_by_property_ids<'a>(
        &'a self,
        property_ids: &'a [PropertyId],
    ) -> StoreFuture<'a, Vec<Review>>;

    /// The `limit` newest reviews of a property.
    fn recent_reviews(&self, property_id: PropertyId, limit: u64) -> StoreFuture<'_, Vec<Review>>;

    /// Statistics over a property's reviews; `None` when it has none.
    fn review_analytics(&self, property_id: PropertyId)
    -> StoreFuture<'_, Option<ReviewAnalytics>>;

    /// Platform-wide review statistics.
    fn review_summary(&self) -> StoreFuture<'_, ReviewSummary>;

    /// Insert or replace the summary keyed by its property id.
    fn upsert_rating<'a>(&'a self, rating: &'a PropertyRating) -> StoreFuture<'a, ()>;

    /// Remove a summary; returns whether one existed.
    fn delete_rating(&self, property_id: PropertyId) -> StoreFuture<'_, bool>;

    /// Fetch a summary.
    fn get_rating(&self, property_id: PropertyId) -> StoreFuture<'_, Option<PropertyRating>>;

    /// Page of summaries ordered by average satisfaction, best first.
    fn list_ratings(&self, limit: u64, skip: u64) -> StoreFuture<'_, RatingPage>;

    /// Best `limit` summaries by the chosen average.
    fn top_rated(&self, limit: u64, kind: RatingKind) -> StoreFuture<'_, Vec<PropertyRating>>;

    /// Round-trip to the store for readiness checks.
    fn ping(&self) -> StoreFuture<'_, ()>;
}
