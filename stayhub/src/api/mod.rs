//! HTTP API handlers.
//!
//! Every handler answers with the `{"success": ..}` envelope of
//! [`stayhub_web::ApiResponse`] / [`stayhub_web::AppError`]. Path segments,
//! query strings and bodies are parsed with the `Api*` extractors so that
//! malformed requests use the same envelope.

pub mod bookings;
pub mod dashboards;
pub mod properties;
pub mod ratings;
pub mod reviews;
pub mod users;
pub mod workflow;

use serde::Serialize;

/// Acknowledgement of a delete.
#[derive(Debug, Serialize)]
pub struct Deleted {
    /// Kind of record removed
    pub entity: &'static str,
    /// Identifier of the removed record
    pub id: i32,
    /// Always `true`
    pub deleted: bool,
}

impl Deleted {
    /// Acknowledge removal of `entity` `id`
    #[must_use]
    pub const fn new(entity: &'static str, id: i32) -> Self {
        Self {
            entity,
            id,
            deleted: true,
        }
    }
}
