//! # StayHub Testing
//!
//! Testing utilities and helpers for StayHub.
//!
//! This crate provides:
//! - [`FixedClock`]: deterministic time
//! - [`InMemoryRelationalStore`] and [`InMemoryDocumentStore`]: store doubles
//!   with failure injection and call recording
//! - [`fixtures`]: builders for users, properties, bookings and reviews
//! - [`properties`]: proptest strategies for review input
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use stayhub_core::{DocumentStore, RelationalStore};
//! use stayhub_testing::{InMemoryDocumentStore, InMemoryRelationalStore, test_clock};
//!
//! let relational = InMemoryRelationalStore::new();
//! let documents = InMemoryDocumentStore::new();
//!
//! // Services take trait objects; the test keeps its own handles.
//! let _relational: Arc<dyn RelationalStore> = Arc::new(relational.clone());
//! let _documents: Arc<dyn DocumentStore> = Arc::new(documents.clone());
//! let _clock = Arc::new(test_clock());
//! ```

use chrono::{DateTime, Utc};
use stayhub_core::environment::Clock;

mod document_mocks;
pub mod fixtures;
mod relational_mocks;

pub use document_mocks::InMemoryDocumentStore;
pub use relational_mocks::InMemoryRelationalStore;

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use stayhub_testing::mocks::FixedClock;
    /// use stayhub_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use proptest::prelude::*;
    use stayhub_core::model::{BookingId, PropertyId};
    use stayhub_core::review::NewReview;

    /// Reviews that pass the default review policy
    pub fn valid_review() -> impl Strategy<Value = NewReview> {
        (1..=50i32, 1..=500i32, 1..=5i32, 1..=5i32, "[a-zA-Z][a-zA-Z ,.!]{0,120}").prop_map(
            |(property, booking, cleanliness, satisfaction, comment)| NewReview {
                property_id: PropertyId::new(property),
                booking_id: BookingId::new(booking),
                cleanliness_rating: cleanliness,
                guest_satisfaction: satisfaction,
                text_comment: comment,
            },
        )
    }

    /// A score outside the default 1-5 scale
    pub fn out_of_range_score() -> impl Strategy<Value = i32> {
        prop_oneof![i32::MIN..=0, 6..=i32::MAX]
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
        assert_eq!(clock.today().to_string(), "2025-01-01");
    }
}
