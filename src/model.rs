use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::BookingError;
use crate::limits::*;
use crate::timeframe::Timeframe;

/// Where a booking sits in its lifecycle.
///
/// `pending` is the only state with transitions out of it in the intended
/// flow; `approved`, `rejected` and `disabled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
    Disabled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Disabled => "disabled",
        }
    }

    /// Statuses that block new submissions during the conflict check.
    pub fn is_blocking(&self) -> bool {
        matches!(self, BookingStatus::Approved)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "approved" => Ok(BookingStatus::Approved),
            "rejected" => Ok(BookingStatus::Rejected),
            "disabled" => Ok(BookingStatus::Disabled),
            other => Err(BookingError::InvalidFilter(format!("unknown status: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserKind {
    Admin,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Ulid,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub kind: UserKind,
}

/// Contact details supplied with a booking request. The requester is
/// resolved (or registered) by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl Contact {
    pub fn validate(&self) -> Result<(), BookingError> {
        require_text(&self.name, MAX_NAME_LEN, "contact name")?;
        require_text(&self.email, MAX_EMAIL_LEN, "contact email")?;
        require_text(&self.phone, MAX_PHONE_LEN, "contact phone")
    }
}

/// The administrator performing an operation. Passed explicitly to every
/// operation that acts on behalf of an admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admin {
    pub id: Ulid,
    pub name: String,
    pub email: String,
}

impl From<&User> for Admin {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: Ulid,
    pub venue_id: Ulid,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewResource {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    pub id: Ulid,
    pub title: String,
    pub address: String,
    pub capacity: u32,
    /// Default window, used when a slot is disabled without a timeframe.
    pub time_allowed: Timeframe,
    pub admin_id: Ulid,
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVenue {
    pub title: String,
    pub address: String,
    pub capacity: u32,
    pub time_allowed: Timeframe,
    pub resources: Vec<NewResource>,
}

/// Partial venue update. `None` leaves a field unchanged; `Some(resources)`
/// replaces the venue's resources wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VenuePatch {
    pub title: Option<String>,
    pub address: Option<String>,
    pub capacity: Option<u32>,
    pub time_allowed: Option<Timeframe>,
    pub resources: Option<Vec<NewResource>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Ulid,
    pub event_title: String,
    pub event_description: String,
    /// Venue-local calendar date, kept as text.
    pub date: String,
    pub timeframe: Timeframe,
    pub venue_id: Ulid,
    pub requester_id: Ulid,
    pub status: BookingStatus,
}

/// Fields for a booking about to be created; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub event_title: String,
    pub event_description: String,
    pub date: String,
    pub timeframe: Timeframe,
    pub venue_id: Ulid,
    pub requester: Requester,
    pub status: BookingStatus,
}

/// Who a new booking belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requester {
    /// An already registered user.
    Id(Ulid),
    /// Resolved by email inside the store; registered together with the
    /// booking when unknown.
    Contact(Contact),
}

/// A visitor's booking request as handed over by the request layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub event_title: String,
    pub event_description: String,
    pub date: String,
    pub timeframe: Timeframe,
    pub contact: Contact,
    pub venue_id: Ulid,
}

impl BookingRequest {
    pub fn validate(&self) -> Result<(), BookingError> {
        require_text(&self.event_title, MAX_TITLE_LEN, "event title")?;
        require_text(&self.event_description, MAX_DESCRIPTION_LEN, "event description")?;
        validate_date(&self.date)?;
        self.timeframe.hours()?;
        self.contact.validate()
    }
}

/// Enumerated booking filter. Every field is optional; an empty filter
/// matches every booking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub venue_id: Option<Ulid>,
    pub date: Option<String>,
}

impl BookingFilter {
    /// Build a filter from raw query pairs. Unknown keys are rejected.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, BookingError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut filter = BookingFilter::default();
        for (key, value) in pairs {
            match key {
                "status" => filter.status = Some(value.parse()?),
                "venueId" | "venue_id" => {
                    let id = Ulid::from_string(value.trim()).map_err(|_| {
                        BookingError::InvalidFilter(format!("invalid venue id: {value}"))
                    })?;
                    filter.venue_id = Some(id);
                }
                "date" => filter.date = Some(value.trim().to_string()),
                other => {
                    return Err(BookingError::InvalidFilter(format!("unknown filter key: {other}")));
                }
            }
        }
        filter.validate()?;
        Ok(filter)
    }

    pub fn validate(&self) -> Result<(), BookingError> {
        if let Some(date) = &self.date {
            validate_date(date).map_err(|_| BookingError::InvalidFilter(format!("invalid date: {date:?}")))?;
        }
        Ok(())
    }

    pub fn matches(&self, booking: &Booking) -> bool {
        self.status.is_none_or(|s| booking.status == s)
            && self.venue_id.is_none_or(|v| booking.venue_id == v)
            && self.date.as_ref().is_none_or(|d| booking.date == *d)
    }
}

pub(crate) fn require_text(value: &str, max: usize, what: &'static str) -> Result<(), BookingError> {
    if value.trim().is_empty() {
        return Err(BookingError::MissingField(what));
    }
    if value.len() > max {
        return Err(BookingError::LimitExceeded(what));
    }
    Ok(())
}

pub(crate) fn validate_date(date: &str) -> Result<(), BookingError> {
    require_text(date, MAX_DATE_LEN, "date")
}

/// Store mutations; also the WAL record format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    UserCreated { user: User },
    VenueCreated { venue: Venue },
    VenueUpdated { venue: Venue },
    /// Removes the venue together with its resources and bookings.
    VenueDeleted { id: Ulid },
    BookingCreated { booking: Booking },
    BookingStatusChanged { id: Ulid, status: BookingStatus },
    /// A first-time requester and their booking, committed together.
    RequesterBooked { user: User, booking: Booking },
}
