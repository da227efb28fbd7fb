//! `PostgreSQL` implementation of [`RelationalStore`].

use crate::flag::RawFlag;
use crate::procedure::Procedure;
use crate::rows::{BookingRow, GuestBookingRow, PropertyRow, UserRow};
use sqlx::PgPool;
use stayhub_core::gateway::{RelationalStore, StoreFuture};
use stayhub_core::model::{
    Booking, BookingId, BookingPatch, GuestBookingInfo, Money, NewBooking, NewProperty, NewUser,
    Property, PropertyId, PropertyPatch, User, UserId, UserPatch,
};
use stayhub_core::StoreError;

/// Relational store gateway backed by a `sqlx` connection pool.
///
/// Every operation is a single call to a stored routine (see [`Procedure`]).
#[derive(Clone, Debug)]
pub struct PgRelationalStore {
    pool: PgPool,
}

impl PgRelationalStore {
    /// Connect to `PostgreSQL` with default pool settings.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unavailable`] if the connection cannot be established.
    pub async fn new(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to connect: {e}")))?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the tables and (re)define the stored routines.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unavailable`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to run migrations: {e}")))?;
        tracing::info!("Relational migrations applied");
        Ok(())
    }
}

/// Count a routine invocation.
fn record_call(procedure: Procedure) {
    tracing::debug!(routine = procedure.routine(), "Calling stored routine");
    metrics::counter!("relational.routine.calls", "routine" => procedure.routine()).increment(1);
}

/// Classify a driver error raised by a routine call.
fn routine_error(procedure: Procedure, err: sqlx::Error) -> StoreError {
    use sqlx::error::ErrorKind;

    metrics::counter!("relational.routine.errors", "routine" => procedure.routine()).increment(1);

    let mapped = match err {
        sqlx::Error::Database(db) => match db.kind() {
            ErrorKind::UniqueViolation
            | ErrorKind::ForeignKeyViolation
            | ErrorKind::NotNullViolation
            | ErrorKind::CheckViolation => {
                StoreError::Constraint(format!("{procedure} rejected: {}", db.message()))
            }
            _ => StoreError::Unavailable(format!("{procedure} failed: {}", db.message())),
        },
        sqlx::Error::RowNotFound => {
            StoreError::Malformed(format!("{procedure} returned no row"))
        }
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::TypeNotFound { .. } => {
            StoreError::Malformed(format!("Failed to decode {procedure} result: {err}"))
        }
        other => StoreError::Unavailable(format!("Failed to call {procedure}: {other}")),
    };

    tracing::warn!(routine = procedure.routine(), error = %mapped, "Stored routine failed");
    mapped
}

/// Cents as the `BIGINT` the routines expect.
fn cents(money: Money) -> Result<i64, StoreError> {
    i64::try_from(money.cents())
        .map_err(|_| StoreError::Constraint(format!("Amount {money} is out of range")))
}

/// Turn an affected-row count into `NotFound` when nothing matched.
fn expect_affected(affected: i32, entity: &'static str, id: impl ToString) -> Result<(), StoreError> {
    if affected == 0 {
        Err(StoreError::not_found(entity, id))
    } else {
        Ok(())
    }
}

impl RelationalStore for PgRelationalStore {
    fn add_user(&self, user: NewUser) -> StoreFuture<'_, UserId> {
        Box::pin(async move {
            let procedure = Procedure::AddUser;
            record_call(procedure);
            let id: i32 = sqlx::query_scalar(procedure.sql())
                .bind(user.name)
                .bind(user.email)
                .bind(user.mobile)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| routine_error(procedure, e))?;
            Ok(UserId::new(id))
        })
    }

    fn get_user(&self, id: UserId) -> StoreFuture<'_, Option<User>> {
        Box::pin(async move {
            let procedure = Procedure::GetUserById;
            record_call(procedure);
            let row: Option<UserRow> = sqlx::query_as(procedure.sql())
                .bind(id.get())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| routine_error(procedure, e))?;
            Ok(row.map(User::from))
        })
    }

    fn get_user_by_email<'a>(&'a self, email: &'a str) -> StoreFuture<'a, Option<User>> {
        Box::pin(async move {
            let procedure = Procedure::GetUser;
            record_call(procedure);
            let row: Option<UserRow> = sqlx::query_as(procedure.sql())
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| routine_error(procedure, e))?;
            Ok(row.map(User::from))
        })
    }

    fn update_user(&self, id: UserId, patch: UserPatch) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let procedure = Procedure::UpdateUser;
            record_call(procedure);
            let affected: i32 = sqlx::query_scalar(procedure.sql())
                .bind(id.get())
                .bind(patch.name)
                .bind(patch.email)
                .bind(patch.mobile)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| routine_error(procedure, e))?;
            expect_affected(affected, "User", id)
        })
    }

    fn delete_user(&self, id: UserId) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let procedure = Procedure::DeleteUser;
            record_call(procedure);
            let affected: i32 = sqlx::query_scalar(procedure.sql())
                .bind(id.get())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| routine_error(procedure, e))?;
            expect_affected(affected, "User", id)
        })
    }

    fn add_property(&self, property: NewProperty) -> StoreFuture<'_, PropertyId> {
        Box::pin(async move {
            let procedure = Procedure::AddProperty;
            record_call(procedure);
            let id: i32 = sqlx::query_scalar(procedure.sql())
                .bind(property.host_id.get())
                .bind(cents(property.price)?)
                .bind(property.room_type)
                .bind(property.person_capacity)
                .bind(property.bedrooms)
                .bind(property.center_distance)
                .bind(property.metro_distance)
                .bind(property.city)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| routine_error(procedure, e))?;
            Ok(PropertyId::new(id))
        })
    }

    fn get_property(&self, id: PropertyId) -> StoreFuture<'_, Option<Property>> {
        Box::pin(async move {
            let procedure = Procedure::GetProperty;
            record_call(procedure);
            let row: Option<PropertyRow> = sqlx::query_as(procedure.sql())
                .bind(id.get())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| routine_error(procedure, e))?;
            row.map(Property::try_from).transpose()
        })
    }

    fn update_property(&self, id: PropertyId, patch: PropertyPatch) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let procedure = Procedure::UpdateProperty;
            record_call(procedure);
            let price = patch.price.map(cents).transpose()?;
            let affected: i32 = sqlx::query_scalar(procedure.sql())
                .bind(id.get())
                .bind(price)
                .bind(patch.room_type)
                .bind(patch.person_capacity)
                .bind(patch.bedrooms)
                .bind(patch.center_distance)
                .bind(patch.metro_distance)
                .bind(patch.city)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| routine_error(procedure, e))?;
            expect_affected(affected, "Property", id)
        })
    }

    fn delete_property(&self, id: PropertyId) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let procedure = Procedure::DeleteProperty;
            record_call(procedure);
            let affected: i32 = sqlx::query_scalar(procedure.sql())
                .bind(id.get())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| routine_error(procedure, e))?;
            expect_affected(affected, "Property", id)
        })
    }

    fn properties_by_host(&self, host_id: UserId) -> StoreFuture<'_, Vec<Property>> {
        Box::pin(async move {
            let procedure = Procedure::GetPropertiesByHostId;
            record_call(procedure);
            let rows: Vec<PropertyRow> = sqlx::query_as(procedure.sql())
                .bind(host_id.get())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| routine_error(procedure, e))?;
            rows.into_iter().map(Property::try_from).collect()
        })
    }

    fn add_booking(&self, booking: NewBooking) -> StoreFuture<'_, BookingId> {
        Box::pin(async move {
            let procedure = Procedure::AddBooking;
            record_call(procedure);
            let id: i32 = sqlx::query_scalar(procedure.sql())
                .bind(booking.property_id.get())
                .bind(booking.guest_id.get())
                .bind(booking.start_date)
                .bind(booking.end_date)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| routine_error(procedure, e))?;
            Ok(BookingId::new(id))
        })
    }

    fn get_booking(&self, id: BookingId) -> StoreFuture<'_, Option<Booking>> {
        Box::pin(async move {
            let procedure = Procedure::GetBooking;
            record_call(procedure);
            let row: Option<BookingRow> = sqlx::query_as(procedure.sql())
                .bind(id.get())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| routine_error(procedure, e))?;
            row.map(Booking::try_from).transpose()
        })
    }

    fn update_booking(&self, id: BookingId, patch: BookingPatch) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let procedure = Procedure::UpdateBooking;
            record_call(procedure);
            let affected: i32 = sqlx::query_scalar(procedure.sql())
                .bind(id.get())
                .bind(patch.start_date)
                .bind(patch.end_date)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| routine_error(procedure, e))?;
            expect_affected(affected, "Booking", id)
        })
    }

    fn delete_booking(&self, id: BookingId) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let procedure = Procedure::DeleteBooking;
            record_call(procedure);
            let affected: i32 = sqlx::query_scalar(procedure.sql())
                .bind(id.get())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| routine_error(procedure, e))?;
            expect_affected(affected, "Booking", id)
        })
    }

    fn bookings_by_property(&self, property_id: PropertyId) -> StoreFuture<'_, Vec<Booking>> {
        Box::pin(async move {
            let procedure = Procedure::GetBookingsByPropertyId;
            record_call(procedure);
            let rows: Vec<BookingRow> = sqlx::query_as(procedure.sql())
                .bind(property_id.get())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| routine_error(procedure, e))?;
            rows.into_iter().map(Booking::try_from).collect()
        })
    }

    fn bookings_by_guest(&self, guest_id: UserId) -> StoreFuture<'_, Vec<Booking>> {
        Box::pin(async move {
            let procedure = Procedure::GetBookingsByGuestId;
            record_call(procedure);
            let rows: Vec<BookingRow> = sqlx::query_as(procedure.sql())
                .bind(guest_id.get())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| routine_error(procedure, e))?;
            rows.into_iter().map(Booking::try_from).collect()
        })
    }

    fn all_bookings(&self) -> StoreFuture<'_, Vec<GuestBookingInfo>> {
        Box::pin(async move {
            let procedure = Procedure::GetAllBookings;
            record_call(procedure);
            let rows: Vec<GuestBookingRow> = sqlx::query_as(procedure.sql())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| routine_error(procedure, e))?;
            rows.into_iter().map(GuestBookingInfo::try_from).collect()
        })
    }

    fn validate_booking_exists(
        &self,
        booking_id: BookingId,
        property_id: PropertyId,
    ) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            let procedure = Procedure::ValidateBookingExists;
            record_call(procedure);
            let row = sqlx::query(procedure.sql())
                .bind(booking_id.get())
                .bind(property_id.get())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| routine_error(procedure, e))?;
            RawFlag::from_row(&row)?.normalize()
        })
    }

    fn is_booking_completed(&self, booking_id: BookingId) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            let procedure = Procedure::IsBookingCompleted;
            record_call(procedure);
            let row = sqlx::query(procedure.sql())
                .bind(booking_id.get())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| routine_error(procedure, e))?;
            RawFlag::from_row(&row)?.normalize()
        })
    }

    fn guest_info(&self, booking_id: BookingId) -> StoreFuture<'_, Option<GuestBookingInfo>> {
        Box::pin(async move {
            let procedure = Procedure::GetGuestInfoFromBooking;
            record_call(procedure);
            let row: Option<GuestBookingRow> = sqlx::query_as(procedure.sql())
                .bind(booking_id.get())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| routine_error(procedure, e))?;
            row.map(GuestBookingInfo::try_from).transpose()
        })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Unavailable(format!("Ping failed: {e}")))?;
            Ok(())
        })
    }
}
