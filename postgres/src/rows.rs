//! Row shapes returned by the table routines and their conversion into the
//! domain model.

use chrono::NaiveDate;
use sqlx::FromRow;
use stayhub_core::StoreError;
use stayhub_core::model::{
    Booking, BookingId, BookingStatus, GuestBookingInfo, Money, Property, PropertyId, User,
    UserId,
};

fn money(cents: i64, column: &str) -> Result<Money, StoreError> {
    u64::try_from(cents)
        .map(Money::from_cents)
        .map_err(|_| StoreError::Malformed(format!("{column} is negative: {cents}")))
}

/// Row of `get_user` / `get_user_by_id`.
#[derive(Debug, FromRow)]
pub struct UserRow {
    id: i32,
    name: String,
    email: String,
    mobile: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            name: row.name,
            email: row.email,
            mobile: row.mobile,
        }
    }
}

/// Row of `get_property` / `get_properties_by_host_id`.
#[derive(Debug, FromRow)]
pub struct PropertyRow {
    id: i32,
    host_id: i32,
    price_cents: i64,
    room_type: String,
    person_capacity: i32,
    bedrooms: Option<i32>,
    center_distance: Option<f64>,
    metro_distance: Option<f64>,
    city: String,
}

impl TryFrom<PropertyRow> for Property {
    type Error = StoreError;

    fn try_from(row: PropertyRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PropertyId::new(row.id),
            host_id: UserId::new(row.host_id),
            price: money(row.price_cents, "price_cents")?,
            room_type: row.room_type,
            person_capacity: row.person_capacity,
            bedrooms: row.bedrooms,
            center_distance: row.center_distance,
            metro_distance: row.metro_distance,
            city: row.city,
        })
    }
}

/// Row of `get_booking` / `get_bookings_by_*`.
#[derive(Debug, FromRow)]
pub struct BookingRow {
    id: i32,
    property_id: i32,
    guest_id: i32,
    price_cents: i64,
    booking_start: NaiveDate,
    booking_end: NaiveDate,
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: BookingId::new(row.id),
            property_id: PropertyId::new(row.property_id),
            guest_id: UserId::new(row.guest_id),
            price: money(row.price_cents, "price_cents")?,
            start_date: row.booking_start,
            end_date: row.booking_end,
        })
    }
}

/// Row of `get_guest_info_from_booking` / `get_all_bookings`.
#[derive(Debug, FromRow)]
pub struct GuestBookingRow {
    booking_id: i32,
    property_id: i32,
    guest_id: i32,
    guest_name: String,
    guest_email: String,
    booking_start: NaiveDate,
    booking_end: NaiveDate,
    booking_price: i64,
    booking_status: String,
}

impl TryFrom<GuestBookingRow> for GuestBookingInfo {
    type Error = StoreError;

    fn try_from(row: GuestBookingRow) -> Result<Self, Self::Error> {
        let status = row
            .booking_status
            .parse::<BookingStatus>()
            .map_err(StoreError::Malformed)?;
        Ok(Self {
            booking_id: BookingId::new(row.booking_id),
            property_id: PropertyId::new(row.property_id),
            guest_id: UserId::new(row.guest_id),
            guest_name: row.guest_name,
            guest_email: row.guest_email,
            start_date: row.booking_start,
            end_date: row.booking_end,
            price: money(row.booking_price, "booking_price")?,
            status,
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    #[test]
    fn negative_prices_are_malformed() {
        let row = BookingRow {
            id: 1,
            property_id: 2,
            guest_id: 3,
            price_cents: -100,
            booking_start: date(2025, 1, 1),
            booking_end: date(2025, 1, 2),
        };
        assert!(matches!(Booking::try_from(row), Err(StoreError::Malformed(_))));
    }

    #[test]
    fn guest_rows_parse_status() {
        let row = GuestBookingRow {
            booking_id: 9,
            property_id: 2,
            guest_id: 3,
            guest_name: "Ada".into(),
            guest_email: "ada@example.com".into(),
            booking_start: date(2025, 1, 1),
            booking_end: date(2025, 1, 4),
            booking_price: 45_000,
            booking_status: "completed".into(),
        };
        let info = GuestBookingInfo::try_from(row).expect("valid guest row");
        assert_eq!(info.status, BookingStatus::Completed);
        assert_eq!(info.price.cents(), 45_000);
    }

    #[test]
    fn unknown_status_is_malformed() {
        let row = GuestBookingRow {
            booking_id: 9,
            property_id: 2,
            guest_id: 3,
            guest_name: "Ada".into(),
            guest_email: "ada@example.com".into(),
            booking_start: date(2025, 1, 1),
            booking_end: date(2025, 1, 4),
            booking_price: 45_000,
            booking_status: "cancelled".into(),
        };
        assert!(GuestBookingInfo::try_from(row).is_err());
    }
}
