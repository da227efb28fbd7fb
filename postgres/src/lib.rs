//! `PostgreSQL` gateway for StayHub.
//!
//! Users, properties and bookings live in `PostgreSQL` and are reached
//! exclusively through stored routines defined in `migrations/`. This crate
//! implements [`stayhub_core::RelationalStore`] on top of a `sqlx` pool:
//!
//! - [`Procedure`]: the catalogue of routines and the statements that call
//!   them
//! - [`RawFlag`]: normalization of yes/no routine outputs that come back as
//!   booleans, integers or numeric text
//! - [`PgRelationalStore`]: the gateway itself
//!
//! # Example
//!
//! ```no_run
//! use stayhub_core::RelationalStore;
//! use stayhub_core::model::{BookingId, PropertyId};
//! use stayhub_postgres::PgRelationalStore;
//!
//! # async fn example() -> Result<(), stayhub_core::StoreError> {
//! let store = PgRelationalStore::new("postgres://localhost/stayhub").await?;
//! store.migrate().await?;
//!
//! let exists = store
//!     .validate_booking_exists(BookingId::new(1), PropertyId::new(1))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod flag;
mod procedure;
mod rows;
mod store;

pub use flag::RawFlag;
pub use procedure::Procedure;
pub use store::PgRelationalStore;
