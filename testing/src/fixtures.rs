//! Builders for the domain values tests create over and over.

use chrono::NaiveDate;
use stayhub_core::model::{BookingId, Money, NewBooking, NewProperty, NewUser, PropertyId, UserId};
use stayhub_core::review::NewReview;

/// A user whose email is derived from `name`
#[must_use]
pub fn new_user(name: &str) -> NewUser {
    NewUser {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        mobile: "+30 210 000 0000".to_string(),
    }
}

/// An Athens apartment listed by `host_id` at `nightly_cents` per night
#[must_use]
pub fn new_property(host_id: UserId, nightly_cents: u64) -> NewProperty {
    NewProperty {
        host_id,
        price: Money::from_cents(nightly_cents),
        room_type: "Entire home/apt".to_string(),
        person_capacity: 4,
        bedrooms: Some(2),
        center_distance: Some(1.5),
        metro_distance: Some(0.4),
        city: "Athens".to_string(),
    }
}

/// A stay of `guest_id` at `property_id`
#[must_use]
pub const fn new_booking(
    property_id: PropertyId,
    guest_id: UserId,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> NewBooking {
    NewBooking {
        property_id,
        guest_id,
        start_date,
        end_date,
    }
}

/// A review with a short comment naming the booking
#[must_use]
pub fn new_review(
    property_id: i32,
    booking_id: i32,
    cleanliness_rating: i32,
    guest_satisfaction: i32,
) -> NewReview {
    NewReview {
        property_id: PropertyId::new(property_id),
        booking_id: BookingId::new(booking_id),
        cleanliness_rating,
        guest_satisfaction,
        text_comment: format!("Stayed on booking {booking_id}, would come back."),
    }
}
