//! Error taxonomy.
//!
//! Two layers:
//!
//! - [`StoreError`] is what a gateway reports. It says what went wrong with a
//!   store call and nothing about the business meaning of the call.
//! - [`ServiceError`] is what a workflow reports. Gateway errors are folded
//!   into it via `From<StoreError>`, business rule violations are raised
//!   directly by the services.

use crate::model::{BookingId, PropertyId};
use thiserror::Error;

/// Errors reported by a store gateway.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or the driver failed (pool exhausted,
    /// connection reset, server error).
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The addressed record does not exist (including update/delete routines
    /// that affected zero rows).
    #[error("{entity} with id {id} not found")]
    NotFound {
        /// Kind of record, e.g. "Booking"
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// The store rejected the write because of an integrity rule
    /// (unique email, foreign key, check constraint).
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// A row or document came back in a shape that could not be decoded.
    #[error("Malformed record: {0}")]
    Malformed(String),
}

impl StoreError {
    /// Shorthand for [`StoreError::NotFound`]
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Errors reported by the service layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// Request failed local validation. No store was contacted.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The booking does not exist or belongs to another property.
    #[error("Booking {booking_id} does not exist for property {property_id}")]
    InvalidBooking {
        /// Booking that was referenced
        booking_id: BookingId,
        /// Property the review was submitted for
        property_id: PropertyId,
    },

    /// The booking exists but the stay has not ended yet.
    #[error("Booking {0} is not completed yet")]
    BookingNotCompleted(BookingId),

    /// A store call failed for infrastructure reasons.
    #[error("{0}")]
    StoreUnavailable(#[source] StoreError),

    /// The addressed record does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound {
        /// Kind of record
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },
}

impl ServiceError {
    /// Shorthand for [`ServiceError::NotFound`]
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Stable machine-readable code for this error
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "VALIDATION_ERROR",
            Self::InvalidBooking { .. } => "INVALID_BOOKING",
            Self::BookingNotCompleted(_) => "BOOKING_NOT_COMPLETED",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::NotFound { .. } => "NOT_FOUND",
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => Self::NotFound { entity, id },
            StoreError::Constraint(message) => Self::InvalidInput(message),
            other @ (StoreError::Unavailable(_) | StoreError::Malformed(_)) => {
                Self::StoreUnavailable(other)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_stays_not_found() {
        let err: ServiceError = StoreError::not_found("Booking", 7).into();
        assert_eq!(err, ServiceError::not_found("Booking", "7"));
        assert_eq!(err.to_string(), "Booking with id 7 not found");
    }

    #[test]
    fn constraint_becomes_invalid_input() {
        let err: ServiceError = StoreError::Constraint("duplicate email".into()).into();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn transport_failures_become_store_unavailable() {
        let err: ServiceError = StoreError::Unavailable("connection reset".into()).into();
        assert!(matches!(err, ServiceError::StoreUnavailable(_)));
        assert_eq!(err.to_string(), "Store unavailable: connection reset");

        let err: ServiceError = StoreError::Malformed("missing field".into()).into();
        assert_eq!(err.code(), "STORE_UNAVAILABLE");
    }
}
