//! # StayHub Core
//!
//! Domain model and store abstractions for the StayHub booking platform.
//!
//! The platform keeps its data in two stores:
//!
//! - a **relational store** that owns users, properties and bookings and is
//!   reached only through stored routines, and
//! - a **document store** that owns guest reviews and the derived per-property
//!   rating summaries, queried through aggregation pipelines.
//!
//! Nothing in this crate performs I/O. The services in the `stayhub` crate
//! receive both stores as trait objects ([`gateway::RelationalStore`],
//! [`gateway::DocumentStore`]) together with a [`environment::Clock`], so
//! every workflow can run against the in-memory doubles in `stayhub-testing`.
//!
//! ## Modules
//!
//! - [`model`]: identifiers, money and the relational entities
//! - [`review`]: reviews, rating summaries, query shapes and the review policy
//! - [`error`]: gateway and service error taxonomy
//! - [`gateway`]: the two store traits

pub mod error;
pub mod gateway;
pub mod model;
pub mod review;

pub use error::{ServiceError, StoreError};
pub use gateway::{DocumentStore, RelationalStore, StoreFuture};

/// Environment module - injected dependencies that are not stores
///
/// Services never read the wall clock directly. Review timestamps, review
/// ages and the `last_updated` stamp of rating summaries all come from the
/// injected [`Clock`](environment::Clock).
pub mod environment {
    use chrono::{DateTime, NaiveDate, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{DateTime, Utc};
    /// use stayhub_core::environment::Clock;
    ///
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;

        /// Current calendar date (UTC), used to derive booking status.
        fn today(&self) -> NaiveDate {
            self.now().date_naive()
        }
    }

    /// Production clock backed by [`Utc::now`].
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::environment::{Clock, SystemClock};

    #[test]
    fn system_clock_today_matches_now() {
        let clock = SystemClock;
        let now = clock.now();
        let today = clock.today();
        // The two reads can straddle midnight; allow one day of slack.
        let diff = (today - now.date_naive()).num_days().abs();
        assert!(diff <= 1);
    }
}
