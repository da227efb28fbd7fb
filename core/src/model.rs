//! Relational entities: users, properties and bookings.
//!
//! These types mirror the rows returned by the relational store's routines.
//! Booking status is never stored; it is derived from the booking dates and
//! the current date (see [`BookingStatus::derive`]).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! int_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Wrap a raw store identifier
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the raw store identifier
            #[must_use]
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }
    };
}

int_id!(
    /// Identifier of a user (guest or host)
    UserId
);
int_id!(
    /// Identifier of a property listing
    PropertyId
);
int_id!(
    /// Identifier of a booking
    BookingId
);

// ============================================================================
// Money
// ============================================================================

/// Amount of money in cents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// Zero amount
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Adds two money amounts with overflow checking
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Adds two money amounts, clamping at the maximum instead of overflowing
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Multiplies a nightly rate by a number of nights with overflow checking
    #[must_use]
    pub const fn checked_multiply(self, nights: u64) -> Option<Self> {
        match self.0.checked_mul(nights) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

// ============================================================================
// Users
// ============================================================================

/// A platform user. Guests and hosts share this record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User ID
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Email address (unique)
    pub email: String,
    /// Mobile number
    pub mobile: String,
}

/// Fields required to register a user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Mobile number
    pub mobile: String,
}

/// Partial update of a user; `None` keeps the stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    /// New display name
    pub name: Option<String>,
    /// New email address
    pub email: Option<String>,
    /// New mobile number
    pub mobile: Option<String>,
}

// ============================================================================
// Properties
// ============================================================================

/// A property listing owned by a host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Property ID
    pub id: PropertyId,
    /// Owning host
    pub host_id: UserId,
    /// Nightly price
    pub price: Money,
    /// Room type, e.g. "Entire home/apt"
    pub room_type: String,
    /// Maximum number of guests
    pub person_capacity: i32,
    /// Number of bedrooms, when known
    pub bedrooms: Option<i32>,
    /// Distance to the city centre in km, when known
    pub center_distance: Option<f64>,
    /// Distance to the nearest metro station in km, when known
    pub metro_distance: Option<f64>,
    /// City
    pub city: String,
}

/// Fields required to list a new property.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewProperty {
    /// Owning host
    pub host_id: UserId,
    /// Nightly price
    pub price: Money,
    /// Room type
    pub room_type: String,
    /// Maximum number of guests
    pub person_capacity: i32,
    /// Number of bedrooms
    pub bedrooms: Option<i32>,
    /// Distance to the city centre in km
    pub center_distance: Option<f64>,
    /// Distance to the nearest metro station in km
    pub metro_distance: Option<f64>,
    /// City
    pub city: String,
}

/// Partial update of a property; `None` keeps the stored value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyPatch {
    /// New nightly price
    pub price: Option<Money>,
    /// New room type
    pub room_type: Option<String>,
    /// New capacity
    pub person_capacity: Option<i32>,
    /// New bedroom count
    pub bedrooms: Option<i32>,
    /// New distance to the city centre
    pub center_distance: Option<f64>,
    /// New distance to the metro
    pub metro_distance: Option<f64>,
    /// New city
    pub city: Option<String>,
}

// ============================================================================
// Bookings
// ============================================================================

/// Derived lifecycle state of a booking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Stay has not started yet
    Upcoming,
    /// Stay is in progress
    Active,
    /// Stay ended before today
    Completed,
}

impl BookingStatus {
    /// Derive the status of a stay from its dates.
    ///
    /// `completed` if the stay ended before `today`, `active` if `today`
    /// falls within the stay (inclusive), `upcoming` otherwise.
    #[must_use]
    pub fn derive(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Self {
        if end < today {
            Self::Completed
        } else if start <= today {
            Self::Active
        } else {
            Self::Upcoming
        }
    }

    /// Lowercase label as stored by the relational routines
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upcoming" => Ok(Self::Upcoming),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown booking status '{other}'")),
        }
    }
}

/// A reservation of a property by a guest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Booking ID
    pub id: BookingId,
    /// Booked property
    pub property_id: PropertyId,
    /// Guest who booked
    pub guest_id: UserId,
    /// Total price (nights x nightly price at booking time)
    pub price: Money,
    /// First night
    pub start_date: NaiveDate,
    /// Check-out date
    pub end_date: NaiveDate,
}

impl Booking {
    /// Status of this booking as of `today`
    #[must_use]
    pub fn status(&self, today: NaiveDate) -> BookingStatus {
        BookingStatus::derive(self.start_date, self.end_date, today)
    }
}

/// Fields required to create a booking. The price is computed by the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBooking {
    /// Property to book
    pub property_id: PropertyId,
    /// Guest making the booking
    pub guest_id: UserId,
    /// First night
    pub start_date: NaiveDate,
    /// Check-out date
    pub end_date: NaiveDate,
}

impl NewBooking {
    /// Number of nights covered by the booking
    #[must_use]
    pub fn nights(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }
}

/// Date change for an existing booking; `None` keeps the stored date.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingPatch {
    /// New first night
    pub start_date: Option<NaiveDate>,
    /// New check-out date
    pub end_date: Option<NaiveDate>,
}

/// A booking joined with its guest's identity and derived status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestBookingInfo {
    /// Booking ID
    pub booking_id: BookingId,
    /// Booked property
    pub property_id: PropertyId,
    /// Guest ID
    pub guest_id: UserId,
    /// Guest name
    pub guest_name: String,
    /// Guest email
    pub guest_email: String,
    /// First night
    pub start_date: NaiveDate,
    /// Check-out date
    pub end_date: NaiveDate,
    /// Total price
    pub price: Money,
    /// Derived status
    pub status: BookingStatus,
}
