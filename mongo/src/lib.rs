//! `MongoDB` gateway for StayHub.
//!
//! Reviews and per-property rating summaries live in `MongoDB`. Every read
//! goes through an aggregation pipeline built in [`pipeline`]; writes use
//! the typed collection API. [`MongoDocumentStore`] implements
//! [`stayhub_core::DocumentStore`].
//!
//! # Example
//!
//! ```no_run
//! use stayhub_core::DocumentStore;
//! use stayhub_core::model::PropertyId;
//! use stayhub_mongo::MongoDocumentStore;
//!
//! # async fn example() -> Result<(), stayhub_core::StoreError> {
//! let store = MongoDocumentStore::connect("mongodb://localhost:27017", "stayhub").await?;
//! store.ensure_indexes().await?;
//!
//! let scores = store.review_scores(PropertyId::new(1)).await?;
//! println!("{} reviews", scores.count);
//! # Ok(())
//! # }
//! ```

mod document;
pub mod pipeline;
mod store;

pub use document::{RatingDocument, ReviewDocument};
pub use store::{MongoDocumentStore, PROPERTY_RATINGS, REVIEWS};
