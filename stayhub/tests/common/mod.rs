//! Shared setup for the service and HTTP tests.
//!
//! Builds a small world on the in-memory stores: a host with one Athens
//! property, a guest, one stay that ended before the test clock's "today"
//! and one that starts after it.

#![allow(dead_code, clippy::unwrap_used)]

use chrono::NaiveDate;
use stayhub::PlatformEnvironment;
use stayhub_core::RelationalStore;
use stayhub_core::model::{BookingId, PropertyId, UserId};
use stayhub_core::review::{CompletionPolicy, NewReview, ReviewPolicy};
use stayhub_testing::{InMemoryDocumentStore, InMemoryRelationalStore, fixtures, test_clock};
use std::sync::Arc;

/// Nightly price of the world's property, in cents.
pub const NIGHTLY_CENTS: u64 = 10_000;

pub struct World {
    pub relational: InMemoryRelationalStore,
    pub documents: InMemoryDocumentStore,
    pub env: PlatformEnvironment,
    pub host: UserId,
    pub guest: UserId,
    pub property: PropertyId,
    /// 2024-12-20 to 2024-12-23, three nights
    pub past_booking: BookingId,
    /// 2025-02-01 to 2025-02-05, four nights
    pub future_booking: BookingId,
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub async fn world() -> World {
    let relational = InMemoryRelationalStore::new();
    let documents = InMemoryDocumentStore::new();

    let host = relational
        .add_user(fixtures::new_user("Helena Host"))
        .await
        .unwrap();
    let guest = relational
        .add_user(fixtures::new_user("Gus Guest"))
        .await
        .unwrap();
    let property = relational
        .add_property(fixtures::new_property(host, NIGHTLY_CENTS))
        .await
        .unwrap();
    let past_booking = relational
        .add_booking(fixtures::new_booking(
            property,
            guest,
            date(2024, 12, 20),
            date(2024, 12, 23),
        ))
        .await
        .unwrap();
    let future_booking = relational
        .add_booking(fixtures::new_booking(
            property,
            guest,
            date(2025, 2, 1),
            date(2025, 2, 5),
        ))
        .await
        .unwrap();
    relational.clear_calls();

    let env = PlatformEnvironment::new(
        Arc::new(relational.clone()),
        Arc::new(documents.clone()),
        Arc::new(test_clock()),
    );

    World {
        relational,
        documents,
        env,
        host,
        guest,
        property,
        past_booking,
        future_booking,
    }
}

pub fn review_for(property: PropertyId, booking: BookingId, cleanliness: i32, satisfaction: i32) -> NewReview {
    fixtures::new_review(property.get(), booking.get(), cleanliness, satisfaction)
}

pub fn warn_policy() -> ReviewPolicy {
    ReviewPolicy {
        completion: CompletionPolicy::Warn,
        ..ReviewPolicy::default()
    }
}
