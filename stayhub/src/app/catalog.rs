//! Users, properties and bookings.
//!
//! Thin service over the relational routines. Requests are checked for the
//! obvious mistakes before they reach the store; integrity rules the store
//! enforces (unique email, existing host, existing property) come back as
//! [`ServiceError::InvalidInput`].

use super::PlatformEnvironment;
use serde::Serialize;
use stayhub_core::environment::Clock;
use stayhub_core::model::{
    Booking, BookingId, BookingPatch, BookingStatus, GuestBookingInfo, NewBooking, NewProperty,
    NewUser, Property, PropertyId, PropertyPatch, User, UserId, UserPatch,
};
use stayhub_core::{RelationalStore, ServiceError};
use std::sync::Arc;

/// A booking with its status as of today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingDetails {
    /// The booking
    #[serde(flatten)]
    pub booking: Booking,
    /// Derived status
    pub status: BookingStatus,
}

/// CRUD over the relational records.
#[derive(Clone)]
pub struct Catalog {
    relational: Arc<dyn RelationalStore>,
    clock: Arc<dyn Clock>,
}

impl Catalog {
    /// Create the catalog service
    #[must_use]
    pub fn new(env: &PlatformEnvironment) -> Self {
        Self {
            relational: Arc::clone(&env.relational),
            clock: Arc::clone(&env.clock),
        }
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Register a user.
    ///
    /// # Errors
    ///
    /// [`ServiceError::InvalidInput`] for blank fields, a malformed email or
    /// an email that is already registered.
    #[tracing::instrument(skip(self, user))]
    pub async fn create_user(&self, user: NewUser) -> Result<User, ServiceError> {
        require_text("name", &user.name)?;
        require_email(&user.email)?;

        let id = self.relational.add_user(user.clone()).await?;
        tracing::info!(user_id = %id, "User created");
        Ok(User {
            id,
            name: user.name,
            email: user.email,
            mobile: user.mobile,
        })
    }

    /// Look a user up by id.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] when the user does not exist.
    pub async fn user(&self, id: UserId) -> Result<User, ServiceError> {
        self.relational
            .get_user(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))
    }

    /// Look a user up by email.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] when no user has that email.
    pub async fn user_by_email(&self, email: &str) -> Result<User, ServiceError> {
        self.relational
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", email))
    }

    /// Update a user and return the stored result.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] when the user does not exist,
    /// [`ServiceError::InvalidInput`] for blank fields or a malformed email.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<User, ServiceError> {
        if let Some(name) = &patch.name {
            require_text("name", name)?;
        }
        if let Some(email) = &patch.email {
            require_email(email)?;
        }
        self.relational.update_user(id, patch).await?;
        self.user(id).await
    }

    /// Delete a user together with their properties and bookings.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] when the user does not exist.
    #[tracing::instrument(skip(self))]
    pub async fn delete_user(&self, id: UserId) -> Result<(), ServiceError> {
        self.relational.delete_user(id).await?;
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    // ========================================================================
    // Properties
    // ========================================================================

    /// List a property.
    ///
    /// # Errors
    ///
    /// [`ServiceError::InvalidInput`] for a zero price, a non-positive
    /// capacity, a blank city or an unknown host.
    #[tracing::instrument(skip(self, property), fields(host_id = %property.host_id))]
    pub async fn create_property(&self, property: NewProperty) -> Result<Property, ServiceError> {
        if property.price.cents() == 0 {
            return Err(ServiceError::InvalidInput("price must be positive".to_string()));
        }
        require_positive("person_capacity", property.person_capacity)?;
        require_text("city", &property.city)?;
        require_text("room_type", &property.room_type)?;

        let id = self.relational.add_property(property.clone()).await?;
        tracing::info!(property_id = %id, "Property created");
        Ok(Property {
            id,
            host_id: property.host_id,
            price: property.price,
            room_type: property.room_type,
            person_capacity: property.person_capacity,
            bedrooms: property.bedrooms,
            center_distance: property.center_distance,
            metro_distance: property.metro_distance,
            city: property.city,
        })
    }

    /// Look a property up by id.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] when the property does not exist.
    pub async fn property(&self, id: PropertyId) -> Result<Property, ServiceError> {
        self.relational
            .get_property(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Property", id))
    }

    /// Update a property and return the stored result.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] when the property does not exist.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_property(
        &self,
        id: PropertyId,
        patch: PropertyPatch,
    ) -> Result<Property, ServiceError> {
        if patch.price.is_some_and(|price| price.cents() == 0) {
            return Err(ServiceError::InvalidInput("price must be positive".to_string()));
        }
        if let Some(capacity) = patch.person_capacity {
            require_positive("person_capacity", capacity)?;
        }
        self.relational.update_property(id, patch).await?;
        self.property(id).await
    }

    /// Delete a property together with its bookings.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] when the property does not exist.
    #[tracing::instrument(skip(self))]
    pub async fn delete_property(&self, id: PropertyId) -> Result<(), ServiceError> {
        self.relational.delete_property(id).await?;
        tracing::info!(property_id = %id, "Property deleted");
        Ok(())
    }

    /// Properties listed by a host.
    ///
    /// # Errors
    ///
    /// [`ServiceError::StoreUnavailable`] on store failure.
    pub async fn properties_by_host(&self, host_id: UserId) -> Result<Vec<Property>, ServiceError> {
        Ok(self.relational.properties_by_host(host_id).await?)
    }

    // ========================================================================
    // Bookings
    // ========================================================================

    /// Book a stay; the store prices it from the nightly rate.
    ///
    /// # Errors
    ///
    /// [`ServiceError::InvalidInput`] when the stay is empty or the property
    /// or guest does not exist.
    #[tracing::instrument(
        skip(self, booking),
        fields(property_id = %booking.property_id, guest_id = %booking.guest_id)
    )]
    pub async fn create_booking(&self, booking: NewBooking) -> Result<BookingDetails, ServiceError> {
        if booking.nights() < 1 {
            return Err(ServiceError::InvalidInput(
                "end_date must be after start_date".to_string(),
            ));
        }
        let id = self.relational.add_booking(booking).await?;
        tracing::info!(booking_id = %id, "Booking created");
        self.booking(id).await
    }

    /// Look a booking up by id.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] when the booking does not exist.
    pub async fn booking(&self, id: BookingId) -> Result<BookingDetails, ServiceError> {
        let booking = self
            .relational
            .get_booking(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Booking", id))?;
        Ok(self.details(booking))
    }

    /// Move a booking; the store re-prices the stay.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] when the booking does not exist,
    /// [`ServiceError::InvalidInput`] when the new dates form an empty stay.
    #[tracing::instrument(skip(self))]
    pub async fn update_booking(
        &self,
        id: BookingId,
        patch: BookingPatch,
    ) -> Result<BookingDetails, ServiceError> {
        if let (Some(start), Some(end)) = (patch.start_date, patch.end_date) {
            if end <= start {
                return Err(ServiceError::InvalidInput(
                    "end_date must be after start_date".to_string(),
                ));
            }
        }
        self.relational.update_booking(id, patch).await?;
        self.booking(id).await
    }

    /// Cancel a booking.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] when the booking does not exist.
    #[tracing::instrument(skip(self))]
    pub async fn delete_booking(&self, id: BookingId) -> Result<(), ServiceError> {
        self.relational.delete_booking(id).await?;
        tracing::info!(booking_id = %id, "Booking deleted");
        Ok(())
    }

    /// Bookings of a property.
    ///
    /// # Errors
    ///
    /// [`ServiceError::StoreUnavailable`] on store failure.
    pub async fn bookings_by_property(
        &self,
        property_id: PropertyId,
    ) -> Result<Vec<BookingDetails>, ServiceError> {
        let bookings = self.relational.bookings_by_property(property_id).await?;
        Ok(bookings.into_iter().map(|b| self.details(b)).collect())
    }

    /// Bookings made by a guest.
    ///
    /// # Errors
    ///
    /// [`ServiceError::StoreUnavailable`] on store failure.
    pub async fn bookings_by_guest(
        &self,
        guest_id: UserId,
    ) -> Result<Vec<BookingDetails>, ServiceError> {
        let bookings = self.relational.bookings_by_guest(guest_id).await?;
        Ok(bookings.into_iter().map(|b| self.details(b)).collect())
    }

    /// Every booking joined with its guest.
    ///
    /// # Errors
    ///
    /// [`ServiceError::StoreUnavailable`] on store failure.
    #[tracing::instrument(skip(self))]
    pub async fn all_bookings(&self) -> Result<Vec<GuestBookingInfo>, ServiceError> {
        Ok(self.relational.all_bookings().await?)
    }

    fn details(&self, booking: Booking) -> BookingDetails {
        let status = booking.status(self.clock.today());
        BookingDetails { booking, status }
    }
}

fn require_text(field: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_positive(field: &str, value: i32) -> Result<(), ServiceError> {
    if value < 1 {
        return Err(ServiceError::InvalidInput(format!(
            "{field} must be positive, got {value}"
        )));
    }
    Ok(())
}

fn require_email(email: &str) -> Result<(), ServiceError> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(ServiceError::InvalidInput(format!(
            "'{email}' is not a valid email address"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_check_needs_local_part_and_dotted_domain() {
        assert!(require_email("ada@example.com").is_ok());
        assert!(require_email("@example.com").is_err());
        assert!(require_email("ada@localhost").is_err());
        assert!(require_email("ada.example.com").is_err());
    }

    #[test]
    fn blank_text_is_rejected() {
        assert!(require_text("city", "  ").is_err());
        assert!(require_text("city", "Athens").is_ok());
    }
}
