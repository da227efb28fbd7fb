//! In-memory relational store
//!
//! [`InMemoryRelationalStore`] mirrors the behavior of the stored routines:
//! serial ids, unique emails, cascading deletes, nightly pricing and
//! `NotFound` for updates and deletes that touch no row. Booking status is
//! derived from a fixed "today" instead of `CURRENT_DATE`.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Test utilities document panics where critical

use crate::mocks::test_clock;
use chrono::NaiveDate;
use stayhub_core::StoreError;
use stayhub_core::environment::Clock;
use stayhub_core::gateway::{RelationalStore, StoreFuture};
use stayhub_core::model::{
    Booking, BookingId, BookingPatch, GuestBookingInfo, Money, NewBooking, NewProperty, NewUser,
    Property, PropertyId, PropertyPatch, User, UserId, UserPatch,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    properties: BTreeMap<PropertyId, Property>,
    bookings: BTreeMap<BookingId, Booking>,
    last_user: i32,
    last_property: i32,
    last_booking: i32,
}

impl Tables {
    fn price(
        &self,
        property_id: PropertyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Money, StoreError> {
        if end <= start {
            return Err(StoreError::Constraint(format!(
                "booking end {end} must be after start {start}"
            )));
        }
        let property = self.properties.get(&property_id).ok_or_else(|| {
            StoreError::Constraint(format!("property {property_id} does not exist"))
        })?;
        let nights = u64::try_from((end - start).num_days()).unwrap_or(0);
        property
            .price
            .checked_multiply(nights)
            .ok_or_else(|| StoreError::Constraint("booking price overflows".to_string()))
    }

    fn guest_info(&self, booking: &Booking, today: NaiveDate) -> Option<GuestBookingInfo> {
        let guest = self.users.get(&booking.guest_id)?;
        Some(GuestBookingInfo {
            booking_id: booking.id,
            property_id: booking.property_id,
            guest_id: booking.guest_id,
            guest_name: guest.name.clone(),
            guest_email: guest.email.clone(),
            start_date: booking.start_date,
            end_date: booking.end_date,
            price: booking.price,
            status: booking.status(today),
        })
    }
}

/// In-memory [`RelationalStore`] for fast, deterministic tests.
///
/// Clones share the same tables, so a test can keep a handle while the
/// services hold another behind `Arc<dyn RelationalStore>`.
///
/// # Example
///
/// ```
/// use stayhub_core::RelationalStore;
/// use stayhub_testing::{InMemoryRelationalStore, fixtures};
///
/// # async fn example() -> Result<(), stayhub_core::StoreError> {
/// let store = InMemoryRelationalStore::new();
/// let id = store.add_user(fixtures::new_user("Ada")).await?;
/// assert!(store.get_user(id).await?.is_some());
/// assert_eq!(store.calls(), vec!["add_user", "get_user_by_id"]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct InMemoryRelationalStore {
    tables: Arc<RwLock<Tables>>,
    calls: Arc<Mutex<Vec<&'static str>>>,
    offline: Arc<AtomicBool>,
    today: NaiveDate,
}

impl InMemoryRelationalStore {
    /// Empty store whose "today" is the date of [`test_clock`]
    #[must_use]
    pub fn new() -> Self {
        Self::on(test_clock().today())
    }

    /// Empty store that derives booking status relative to `today`
    #[must_use]
    pub fn on(today: NaiveDate) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            calls: Arc::new(Mutex::new(Vec::new())),
            offline: Arc::new(AtomicBool::new(false)),
            today,
        }
    }

    /// Make every subsequent routine call fail with [`StoreError::Unavailable`]
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Names of the routines called so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    /// How often `routine` was called
    #[must_use]
    pub fn call_count(&self, routine: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|name| **name == routine)
            .count()
    }

    /// Forget the recorded calls
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Number of stored bookings
    #[must_use]
    pub fn booking_count(&self) -> usize {
        self.tables.read().unwrap().bookings.len()
    }

    fn run<'a, T: Send + 'a>(
        &'a self,
        routine: &'static str,
        op: impl FnOnce(&mut Tables, NaiveDate) -> Result<T, StoreError>,
    ) -> StoreFuture<'a, T> {
        self.calls.lock().unwrap().push(routine);
        let result = if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable(format!("{routine}: relational store offline")))
        } else {
            op(&mut self.tables.write().unwrap(), self.today)
        };
        Box::pin(futures::future::ready(result))
    }
}

impl Default for InMemoryRelationalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RelationalStore for InMemoryRelationalStore {
    fn add_user(&self, user: NewUser) -> StoreFuture<'_, UserId> {
        self.run("add_user", |tables, _| {
            if tables.users.values().any(|u| u.email == user.email) {
                return Err(StoreError::Constraint(format!(
                    "duplicate key value violates unique constraint: email {}",
                    user.email
                )));
            }
            tables.last_user += 1;
            let id = UserId::new(tables.last_user);
            tables.users.insert(
                id,
                User {
                    id,
                    name: user.name,
                    email: user.email,
                    mobile: user.mobile,
                },
            );
            Ok(id)
        })
    }

    fn get_user(&self, id: UserId) -> StoreFuture<'_, Option<User>> {
        self.run("get_user_by_id", |tables, _| Ok(tables.users.get(&id).cloned()))
    }

    fn get_user_by_email<'a>(&'a self, email: &'a str) -> StoreFuture<'a, Option<User>> {
        self.run("get_user", |tables, _| {
            Ok(tables.users.values().find(|u| u.email == email).cloned())
        })
    }

    fn update_user(&self, id: UserId, patch: UserPatch) -> StoreFuture<'_, ()> {
        self.run("update_user", |tables, _| {
            if let Some(email) = &patch.email {
                if tables.users.values().any(|u| u.id != id && &u.email == email) {
                    return Err(StoreError::Constraint(format!(
                        "duplicate key value violates unique constraint: email {email}"
                    )));
                }
            }
            let user = tables
                .users
                .get_mut(&id)
                .ok_or_else(|| StoreError::not_found("user", id))?;
            if let Some(name) = patch.name {
                user.name = name;
            }
            if let Some(email) = patch.email {
                user.email = email;
            }
            if let Some(mobile) = patch.mobile {
                user.mobile = mobile;
            }
            Ok(())
        })
    }

    fn delete_user(&self, id: UserId) -> StoreFuture<'_, ()> {
        self.run("delete_user", |tables, _| {
            tables
                .users
                .remove(&id)
                .ok_or_else(|| StoreError::not_found("user", id))?;
            tables.properties.retain(|_, p| p.host_id != id);
            let Tables {
                properties,
                bookings,
                ..
            } = tables;
            bookings.retain(|_, b| b.guest_id != id && properties.contains_key(&b.property_id));
            Ok(())
        })
    }

    fn add_property(&self, property: NewProperty) -> StoreFuture<'_, PropertyId> {
        self.run("add_property", |tables, _| {
            if !tables.users.contains_key(&property.host_id) {
                return Err(StoreError::Constraint(format!(
                    "host {} does not exist",
                    property.host_id
                )));
            }
            tables.last_property += 1;
            let id = PropertyId::new(tables.last_property);
            tables.properties.insert(
                id,
                Property {
                    id,
                    host_id: property.host_id,
                    price: property.price,
                    room_type: property.room_type,
                    person_capacity: property.person_capacity,
                    bedrooms: property.bedrooms,
                    center_distance: property.center_distance,
                    metro_distance: property.metro_distance,
                    city: property.city,
                },
            );
            Ok(id)
        })
    }

    fn get_property(&self, id: PropertyId) -> StoreFuture<'_, Option<Property>> {
        self.run("get_property", |tables, _| Ok(tables.properties.get(&id).cloned()))
    }

    fn update_property(&self, id: PropertyId, patch: PropertyPatch) -> StoreFuture<'_, ()> {
        self.run("update_property", |tables, _| {
            let property = tables
                .properties
                .get_mut(&id)
                .ok_or_else(|| StoreError::not_found("property", id))?;
            if let Some(price) = patch.price {
                property.price = price;
            }
            if let Some(room_type) = patch.room_type {
                property.room_type = room_type;
            }
            if let Some(capacity) = patch.person_capacity {
                property.person_capacity = capacity;
            }
            if patch.bedrooms.is_some() {
                property.bedrooms = patch.bedrooms;
            }
            if patch.center_distance.is_some() {
                property.center_distance = patch.center_distance;
            }
            if patch.metro_distance.is_some() {
                property.metro_distance = patch.metro_distance;
            }
            if let Some(city) = patch.city {
                property.city = city;
            }
            Ok(())
        })
    }

    fn delete_property(&self, id: PropertyId) -> StoreFuture<'_, ()> {
        self.run("delete_property", |tables, _| {
            tables
                .properties
                .remove(&id)
                .ok_or_else(|| StoreError::not_found("property", id))?;
            tables.bookings.retain(|_, b| b.property_id != id);
            Ok(())
        })
    }

    fn properties_by_host(&self, host_id: UserId) -> StoreFuture<'_, Vec<Property>> {
        self.run("get_properties_by_host_id", |tables, _| {
            Ok(tables
                .properties
                .values()
                .filter(|p| p.host_id == host_id)
                .cloned()
                .collect())
        })
    }

    fn add_booking(&self, booking: NewBooking) -> StoreFuture<'_, BookingId> {
        self.run("add_booking", |tables, _| {
            let price = tables.price(booking.property_id, booking.start_date, booking.end_date)?;
            if !tables.users.contains_key(&booking.guest_id) {
                return Err(StoreError::Constraint(format!(
                    "guest {} does not exist",
                    booking.guest_id
                )));
            }
            tables.last_booking += 1;
            let id = BookingId::new(tables.last_booking);
            tables.bookings.insert(
                id,
                Booking {
                    id,
                    property_id: booking.property_id,
                    guest_id: booking.guest_id,
                    price,
                    start_date: booking.start_date,
                    end_date: booking.end_date,
                },
            );
            Ok(id)
        })
    }

    fn get_booking(&self, id: BookingId) -> StoreFuture<'_, Option<Booking>> {
        self.run("get_booking", |tables, _| Ok(tables.bookings.get(&id).cloned()))
    }

    fn update_booking(&self, id: BookingId, patch: BookingPatch) -> StoreFuture<'_, ()> {
        self.run("update_booking", |tables, _| {
            let current = tables
                .bookings
                .get(&id)
                .cloned()
                .ok_or_else(|| StoreError::not_found("booking", id))?;
            let start = patch.start_date.unwrap_or(current.start_date);
            let end = patch.end_date.unwrap_or(current.end_date);
            let price = tables.price(current.property_id, start, end)?;
            if let Some(booking) = tables.bookings.get_mut(&id) {
                booking.start_date = start;
                booking.end_date = end;
                booking.price = price;
            }
            Ok(())
        })
    }

    fn delete_booking(&self, id: BookingId) -> StoreFuture<'_, ()> {
        self.run("delete_booking", |tables, _| {
            tables
                .bookings
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| StoreError::not_found("booking", id))
        })
    }

    fn bookings_by_property(&self, property_id: PropertyId) -> StoreFuture<'_, Vec<Booking>> {
        self.run("get_bookings_by_property_id", |tables, _| {
            let mut bookings: Vec<Booking> = tables
                .bookings
                .values()
                .filter(|b| b.property_id == property_id)
                .cloned()
                .collect();
            bookings.sort_by_key(|b| b.start_date);
            Ok(bookings)
        })
    }

    fn bookings_by_guest(&self, guest_id: UserId) -> StoreFuture<'_, Vec<Booking>> {
        self.run("get_bookings_by_guest_id", |tables, _| {
            let mut bookings: Vec<Booking> = tables
                .bookings
                .values()
                .filter(|b| b.guest_id == guest_id)
                .cloned()
                .collect();
            bookings.sort_by_key(|b| b.start_date);
            Ok(bookings)
        })
    }

    fn all_bookings(&self) -> StoreFuture<'_, Vec<GuestBookingInfo>> {
        self.run("get_all_bookings", |tables, today| {
            Ok(tables
                .bookings
                .values()
                .filter_map(|b| tables.guest_info(b, today))
                .collect())
        })
    }

    fn validate_booking_exists(
        &self,
        booking_id: BookingId,
        property_id: PropertyId,
    ) -> StoreFuture<'_, bool> {
        self.run("validate_booking_exists", |tables, _| {
            Ok(tables
                .bookings
                .get(&booking_id)
                .is_some_and(|b| b.property_id == property_id))
        })
    }

    fn is_booking_completed(&self, booking_id: BookingId) -> StoreFuture<'_, bool> {
        self.run("is_booking_completed", |tables, today| {
            Ok(tables
                .bookings
                .get(&booking_id)
                .is_some_and(|b| b.end_date < today))
        })
    }

    fn guest_info(&self, booking_id: BookingId) -> StoreFuture<'_, Option<GuestBookingInfo>> {
        self.run("get_guest_info_from_booking", |tables, today| {
            Ok(tables
                .bookings
                .get(&booking_id)
                .and_then(|b| tables.guest_info(b, today)))
        })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        self.run("ping", |_, _| Ok(()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fixtures;
    use chrono::Duration;

    #[tokio::test]
    async fn test_booking_is_priced_and_cascades_with_its_property() {
        let store = InMemoryRelationalStore::new();
        let today = test_clock().today();
        let host = store.add_user(fixtures::new_user("Host")).await.unwrap();
        let guest = store.add_user(fixtures::new_user("Guest")).await.unwrap();
        let property = store
            .add_property(fixtures::new_property(host, 10_000))
            .await
            .unwrap();
        let booking = store
            .add_booking(fixtures::new_booking(
                property,
                guest,
                today - Duration::days(5),
                today - Duration::days(2),
            ))
            .await
            .unwrap();

        let stored = store.get_booking(booking).await.unwrap().unwrap();
        assert_eq!(stored.price, Money::from_cents(30_000));
        assert!(store.is_booking_completed(booking).await.unwrap());

        store.delete_property(property).await.unwrap();
        assert_eq!(store.booking_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_email_and_missing_rows() {
        let store = InMemoryRelationalStore::new();
        store.add_user(fixtures::new_user("Ada")).await.unwrap();
        assert!(matches!(
            store.add_user(fixtures::new_user("Ada")).await,
            Err(StoreError::Constraint(_))
        ));
        assert!(matches!(
            store.delete_booking(BookingId::new(3)).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_offline_store_records_the_attempt() {
        let store = InMemoryRelationalStore::new();
        store.set_offline(true);
        let result = store
            .validate_booking_exists(BookingId::new(1), PropertyId::new(1))
            .await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert_eq!(store.call_count("validate_booking_exists"), 1);
    }
}
