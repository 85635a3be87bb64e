use async_trait::async_trait;
use ulid::Ulid;

use crate::error::BookingError;
use crate::model::*;

/// Persistence seen from the booking core.
///
/// Implementations decide how records are stored. The conflict check reads
/// via [`Repository::find_approved_bookings`] and then writes via
/// [`Repository::create_booking`]; nothing here serializes the two, so an
/// implementation that needs strict slot exclusivity must enforce it itself.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Bookings that block new submissions for `venue_id` on `date`.
    async fn find_approved_bookings(&self, venue_id: Ulid, date: &str) -> Result<Vec<Booking>, BookingError>;

    async fn create_booking(&self, fields: NewBooking) -> Result<Booking, BookingError>;

    async fn find_booking_by_id(&self, id: Ulid) -> Result<Option<Booking>, BookingError>;

    /// Overwrite the status. `NotFound` if the booking is gone.
    async fn update_booking_status(&self, id: Ulid, status: BookingStatus) -> Result<Booking, BookingError>;

    /// Bookings matching `filter`; restricted to venues owned by `admin_id` when given.
    async fn find_bookings(&self, filter: &BookingFilter, admin_id: Option<Ulid>) -> Result<Vec<Booking>, BookingError>;

    /// Reuse the user registered under `contact.email`, or register a new one of `kind`.
    async fn find_or_create_user(&self, contact: &Contact, kind: UserKind) -> Result<User, BookingError>;

    async fn find_user(&self, id: Ulid) -> Result<Option<User>, BookingError>;

    async fn create_venue(&self, admin_id: Ulid, fields: NewVenue) -> Result<Venue, BookingError>;

    async fn find_venue(&self, id: Ulid) -> Result<Option<Venue>, BookingError>;

    async fn list_venues(&self) -> Result<Vec<Venue>, BookingError>;

    async fn update_venue(&self, id: Ulid, patch: VenuePatch) -> Result<Venue, BookingError>;

    /// Delete the venue with its resources and bookings as one unit.
    async fn delete_venue(&self, id: Ulid) -> Result<(), BookingError>;
}
