//! Application services.
//!
//! Each service owns the store handles it needs and nothing else:
//!
//! - [`ReviewWorkflow`]: booking validation, review persistence and the
//!   rating refresh that follows
//! - [`RatingAggregator`]: full recomputation and reads of rating summaries
//! - [`DashboardComposer`]: user, host and property views spanning both stores
//! - [`ReviewQueries`]: review listings, guest enrichment and analytics
//! - [`Catalog`]: user, property and booking records
//!
//! All of them are built from one [`PlatformEnvironment`].

pub mod catalog;
pub mod dashboard;
pub mod ratings;
pub mod reviews;
pub mod workflow;

pub use catalog::Catalog;
pub use dashboard::DashboardComposer;
pub use ratings::RatingAggregator;
pub use reviews::ReviewQueries;
pub use workflow::ReviewWorkflow;

use stayhub_core::environment::Clock;
use stayhub_core::{DocumentStore, RelationalStore};
use std::sync::Arc;

/// Injected dependencies shared by every service.
#[derive(Clone)]
pub struct PlatformEnvironment {
    /// Users, properties and bookings
    pub relational: Arc<dyn RelationalStore>,
    /// Reviews and rating summaries
    pub documents: Arc<dyn DocumentStore>,
    /// Source of "now" and "today"
    pub clock: Arc<dyn Clock>,
}

impl PlatformEnvironment {
    /// Bundle the two stores and a clock
    #[must_use]
    pub fn new(
        relational: Arc<dyn RelationalStore>,
        documents: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            relational,
            documents,
            clock,
        }
    }
}

impl std::fmt::Debug for PlatformEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformEnvironment").finish_non_exhaustive()
    }
}
