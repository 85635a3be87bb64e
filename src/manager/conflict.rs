use crate::error::BookingError;
use crate::model::Booking;
use crate::timeframe::Timeframe;

/// Fail with the first accepted booking the candidate conflicts with.
pub fn check_no_conflict(candidate: &Timeframe, accepted: &[Booking]) -> Result<(), BookingError> {
    let candidate_hours = candidate.convert()?;
    for booking in accepted {
        let existing = booking.timeframe.convert()?;
        if candidate_hours.conflicts_with(&existing) {
            tracing::debug!(
                "timeframe {candidate} conflicts with booking {} {}",
                booking.id,
                booking.timeframe
            );
            return Err(BookingError::BookingConflict(booking.id));
        }
    }
    Ok(())
}
