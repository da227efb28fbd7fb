//! Dashboard Composers.
//!
//! Views that join relational records with the reviews written against them.
//! Independent fetches run concurrently and the view is assembled once all
//! of them completed; nothing is cached between requests.

use super::PlatformEnvironment;
use futures::future::try_join_all;
use serde::Serialize;
use stayhub_core::model::{Booking, BookingId, Money, Property, PropertyId, User, UserId};
use stayhub_core::review::{PropertyRating, RECENT_REVIEWS, Review};
use stayhub_core::{DocumentStore, RelationalStore, ServiceError};
use std::sync::Arc;

/// Everything a guest has booked and reviewed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserDashboard {
    /// The guest
    pub user: User,
    /// Bookings made by the guest
    pub bookings: Vec<Booking>,
    /// Reviews written for those bookings
    pub reviews: Vec<Review>,
    /// Sum of booking prices
    pub total_spent: Money,
    /// Number of bookings
    pub total_bookings: usize,
    /// Number of reviews
    pub total_reviews: usize,
}

/// Everything a host lists, earns and is reviewed for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostDashboard {
    /// The host
    pub host: User,
    /// Listed properties
    pub properties: Vec<Property>,
    /// Bookings across all listed properties
    pub bookings: Vec<Booking>,
    /// Reviews across all listed properties
    pub reviews: Vec<Review>,
    /// Sum of booking prices
    pub total_earnings: Money,
    /// Number of properties
    pub total_properties: usize,
    /// Number of bookings
    pub total_bookings: usize,
    /// Number of reviews
    pub total_reviews: usize,
}

/// A listing with its rating summary and newest reviews.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDetails {
    /// The listing
    #[serde(flatten)]
    pub property: Property,
    /// Rating summary, absent until the property has been rated
    pub rating: Option<PropertyRating>,
    /// Newest reviews first
    pub recent_reviews: Vec<Review>,
}

/// Builds the cross-store dashboards.
#[derive(Clone)]
pub struct DashboardComposer {
    relational: Arc<dyn RelationalStore>,
    documents: Arc<dyn DocumentStore>,
}

impl DashboardComposer {
    /// Create the composer
    #[must_use]
    pub fn new(env: &PlatformEnvironment) -> Self {
        Self {
            relational: Arc::clone(&env.relational),
            documents: Arc::clone(&env.documents),
        }
    }

    /// Dashboard of a guest.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::NotFound`] when the user does not exist
    /// - [`ServiceError::StoreUnavailable`] when any fetch fails
    #[tracing::instrument(skip(self))]
    pub async fn user_dashboard(&self, user_id: UserId) -> Result<UserDashboard, ServiceError> {
        let (user, bookings) = futures::try_join!(
            self.relational.get_user(user_id),
            self.relational.bookings_by_guest(user_id),
        )?;
        let user = user.ok_or_else(|| ServiceError::not_found("User", user_id))?;

        let booking_ids: Vec<BookingId> = bookings.iter().map(|booking| booking.id).collect();
        let reviews = self.documents.reviews_by_booking_ids(&booking_ids).await?;

        let total_spent: Money = bookings.iter().map(|booking| booking.price).sum();
        tracing::debug!(
            bookings = bookings.len(),
            reviews = reviews.len(),
            %total_spent,
            "User dashboard composed"
        );

        Ok(UserDashboard {
            user,
            total_bookings: bookings.len(),
            total_reviews: reviews.len(),
            total_spent,
            bookings,
            reviews,
        })
    }

    /// Dashboard of a host.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::NotFound`] when the host does not exist
    /// - [`ServiceError::StoreUnavailable`] when any fetch fails
    #[tracing::instrument(skip(self))]
    pub async fn host_dashboard(&self, host_id: UserId) -> Result<HostDashboard, ServiceError> {
        let (host, properties) = futures::try_join!(
            self.relational.get_user(host_id),
            self.relational.properties_by_host(host_id),
        )?;
        let host = host.ok_or_else(|| ServiceError::not_found("User", host_id))?;

        let property_ids: Vec<PropertyId> = properties.iter().map(|property| property.id).collect();
        let (bookings_per_property, reviews) = futures::try_join!(
            try_join_all(
                property_ids
                    .iter()
                    .map(|id| self.relational.bookings_by_property(*id))
            ),
            self.documents.reviews_by_property_ids(&property_ids),
        )?;
        let bookings: Vec<Booking> = bookings_per_property.into_iter().flatten().collect();

        let total_earnings: Money = bookings.iter().map(|booking| booking.price).sum();
        tracing::debug!(
            properties = properties.len(),
            bookings = bookings.len(),
            reviews = reviews.len(),
            %total_earnings,
            "Host dashboard composed"
        );

        Ok(HostDashboard {
            host,
            total_properties: properties.len(),
            total_bookings: bookings.len(),
            total_reviews: reviews.len(),
            total_earnings,
            properties,
            bookings,
            reviews,
        })
    }

    /// A property with its rating summary and ten newest reviews.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::NotFound`] when the property does not exist
    /// - [`ServiceError::StoreUnavailable`] when any fetch fails
    #[tracing::instrument(skip(self))]
    pub async fn property_details(
        &self,
        property_id: PropertyId,
    ) -> Result<PropertyDetails, ServiceError> {
        let (property, rating, recent_reviews) = futures::try_join!(
            self.relational.get_property(property_id),
            self.documents.get_rating(property_id),
            self.documents.recent_reviews(property_id, RECENT_REVIEWS),
        )?;
        let property = property.ok_or_else(|| ServiceError::not_found("Property", property_id))?;

        Ok(PropertyDetails {
            property,
            rating,
            recent_reviews,
        })
    }
}
