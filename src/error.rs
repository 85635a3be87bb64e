use ulid::Ulid;

#[derive(Debug)]
pub enum BookingError {
    InvalidTimeFormat(String),
    InvalidTimeframe {
        start: String,
        end: String,
    },
    /// Candidate overlaps this approved booking.
    BookingConflict(Ulid),
    NotFound(Ulid),
    Unauthorized {
        venue: Ulid,
        admin: Ulid,
    },
    NotAnAdmin(Ulid),
    InvalidFilter(String),
    MissingField(&'static str),
    LimitExceeded(&'static str),
    StoreError(String),
}

impl BookingError {
    /// Errors caused by the caller's input, as opposed to store failures.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, BookingError::StoreError(_))
    }
}

impl std::fmt::Display for BookingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingError::InvalidTimeFormat(token) => write!(f, "invalid time format: {token:?}"),
            BookingError::InvalidTimeframe { start, end } => {
                write!(f, "invalid timeframe [{start}, {end}]: start must be before end")
            }
            BookingError::BookingConflict(id) => {
                write!(f, "booking timeframe conflicts with accepted booking: {id}")
            }
            BookingError::NotFound(id) => write!(f, "not found: {id}"),
            BookingError::Unauthorized { venue, admin } => {
                write!(f, "admin {admin} does not own venue {venue}")
            }
            BookingError::NotAnAdmin(id) => write!(f, "user {id} is not an admin"),
            BookingError::InvalidFilter(msg) => write!(f, "invalid filter: {msg}"),
            BookingError::MissingField(field) => write!(f, "missing field: {field}"),
            BookingError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            BookingError::StoreError(e) => write!(f, "store error: {e}"),
        }
    }
}

impl std::error::Error for BookingError {}
