//! Catalogue of the stored routines the gateway calls.

use std::fmt;

/// A stored routine of the relational store.
///
/// Each variant knows its SQL name and the statement that invokes it. The
/// statements are static so they can be handed to `sqlx::query` directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Procedure {
    /// `add_user(name, email, mobile) -> id`
    AddUser,
    /// `get_user(email) -> user row`
    GetUser,
    /// `get_user_by_id(id) -> user row`
    GetUserById,
    /// `update_user(id, name?, email?, mobile?) -> affected rows`
    UpdateUser,
    /// `delete_user(id) -> affected rows`
    DeleteUser,
    /// `add_property(host, price, room type, capacity, bedrooms?, centre?, metro?, city) -> id`
    AddProperty,
    /// `get_property(id) -> property row`
    GetProperty,
    /// `update_property(id, 7 nullable fields) -> affected rows`
    UpdateProperty,
    /// `delete_property(id) -> affected rows`
    DeleteProperty,
    /// `get_properties_by_host_id(host) -> property rows`
    GetPropertiesByHostId,
    /// `add_booking(property, guest, start, end) -> id`
    AddBooking,
    /// `get_booking(id) -> booking row`
    GetBooking,
    /// `update_booking(id, start?, end?) -> affected rows`
    UpdateBooking,
    /// `delete_booking(id) -> affected rows`
    DeleteBooking,
    /// `get_bookings_by_property_id(property) -> booking rows`
    GetBookingsByPropertyId,
    /// `get_bookings_by_guest_id(guest) -> booking rows`
    GetBookingsByGuestId,
    /// `get_all_bookings() -> guest booking rows`
    GetAllBookings,
    /// `validate_booking_exists(booking, property) -> flag`
    ValidateBookingExists,
    /// `is_booking_completed(booking) -> flag`
    IsBookingCompleted,
    /// `get_guest_info_from_booking(booking) -> guest booking row`
    GetGuestInfoFromBooking,
}

impl Procedure {
    /// Every routine, in catalogue order
    #[cfg(test)]
    const ALL: [Self; 20] = [
        Self::AddUser,
        Self::GetUser,
        Self::GetUserById,
        Self::UpdateUser,
        Self::DeleteUser,
        Self::AddProperty,
        Self::GetProperty,
        Self::UpdateProperty,
        Self::DeleteProperty,
        Self::GetPropertiesByHostId,
        Self::AddBooking,
        Self::GetBooking,
        Self::UpdateBooking,
        Self::DeleteBooking,
        Self::GetBookingsByPropertyId,
        Self::GetBookingsByGuestId,
        Self::GetAllBookings,
        Self::ValidateBookingExists,
        Self::IsBookingCompleted,
        Self::GetGuestInfoFromBooking,
    ];

    /// SQL name of the routine
    #[must_use]
    pub const fn routine(&self) -> &'static str {
        match self {
            Self::AddUser => "add_user",
            Self::GetUser => "get_user",
            Self::GetUserById => "get_user_by_id",
            Self::UpdateUser => "update_user",
            Self::DeleteUser => "delete_user",
            Self::AddProperty => "add_property",
            Self::GetProperty => "get_property",
            Self::UpdateProperty => "update_property",
            Self::DeleteProperty => "delete_property",
            Self::GetPropertiesByHostId => "get_properties_by_host_id",
            Self::AddBooking => "add_booking",
            Self::GetBooking => "get_booking",
            Self::UpdateBooking => "update_booking",
            Self::DeleteBooking => "delete_booking",
            Self::GetBookingsByPropertyId => "get_bookings_by_property_id",
            Self::GetBookingsByGuestId => "get_bookings_by_guest_id",
            Self::GetAllBookings => "get_all_bookings",
            Self::ValidateBookingExists => "validate_booking_exists",
            Self::IsBookingCompleted => "is_booking_completed",
            Self::GetGuestInfoFromBooking => "get_guest_info_from_booking",
        }
    }

    /// Number of arguments the routine takes
    #[cfg(test)]
    const fn arity(&self) -> usize {
        match self {
            Self::GetAllBookings => 0,
            Self::GetUser
            | Self::GetUserById
            | Self::DeleteUser
            | Self::GetProperty
            | Self::DeleteProperty
            | Self::GetPropertiesByHostId
            | Self::GetBooking
            | Self::DeleteBooking
            | Self::GetBookingsByPropertyId
            | Self::GetBookingsByGuestId
            | Self::IsBookingCompleted
            | Self::GetGuestInfoFromBooking => 1,
            Self::ValidateBookingExists => 2,
            Self::AddUser | Self::UpdateBooking => 3,
            Self::UpdateUser | Self::AddBooking => 4,
            Self::AddProperty | Self::UpdateProperty => 8,
        }
    }

    /// Statement invoking the routine with positional parameters.
    ///
    /// Scalar routines come back as a single column named after the routine;
    /// table routines as their declared columns.
    #[must_use]
    pub const fn sql(&self) -> &'static str {
        match self {
            Self::AddUser => "SELECT * FROM add_user($1, $2, $3)",
            Self::GetUser => "SELECT * FROM get_user($1)",
            Self::GetUserById => "SELECT * FROM get_user_by_id($1)",
            Self::UpdateUser => "SELECT * FROM update_user($1, $2, $3, $4)",
            Self::DeleteUser => "SELECT * FROM delete_user($1)",
            Self::AddProperty => {
                "SELECT * FROM add_property($1, $2, $3, $4, $5, $6, $7, $8)"
            }
            Self::GetProperty => "SELECT * FROM get_property($1)",
            Self::UpdateProperty => {
                "SELECT * FROM update_property($1, $2, $3, $4, $5, $6, $7, $8)"
            }
            Self::DeleteProperty => "SELECT * FROM delete_property($1)",
            Self::GetPropertiesByHostId => "SELECT * FROM get_properties_by_host_id($1)",
            Self::AddBooking => "SELECT * FROM add_booking($1, $2, $3, $4)",
            Self::GetBooking => "SELECT * FROM get_booking($1)",
            Self::UpdateBooking => "SELECT * FROM update_booking($1, $2, $3)",
            Self::DeleteBooking => "SELECT * FROM delete_booking($1)",
            Self::GetBookingsByPropertyId => "SELECT * FROM get_bookings_by_property_id($1)",
            Self::GetBookingsByGuestId => "SELECT * FROM get_bookings_by_guest_id($1)",
            Self::GetAllBookings => "SELECT * FROM get_all_bookings()",
            Self::ValidateBookingExists => "SELECT * FROM validate_booking_exists($1, $2)",
            Self::IsBookingCompleted => "SELECT * FROM is_booking_completed($1)",
            Self::GetGuestInfoFromBooking => "SELECT * FROM get_guest_info_from_booking($1)",
        }
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.routine())
    }
}
