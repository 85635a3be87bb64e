use tracing::info;
use ulid::Ulid;

use crate::error::BookingError;
use crate::model::*;
use crate::notify::Notification;
use crate::observability::*;
use crate::timeframe::Timeframe;

use super::{check_no_conflict, BookingManager};

const DISABLED_TITLE: &str = "Date Not Available";
const DISABLED_DESCRIPTION: &str = "Booking of this venue on this date is restricted";

impl BookingManager {
    /// Submit a visitor's booking request.
    ///
    /// Fails with `BookingConflict` if the timeframe overlaps an approved
    /// booking for the same venue and date; nothing is written in that case.
    /// On success the booking is `pending` and the venue admin is notified.
    pub async fn submit_booking(&self, request: BookingRequest) -> Result<Booking, BookingError> {
        request.validate()?;
        let venue = self
            .repo
            .find_venue(request.venue_id)
            .await?
            .ok_or(BookingError::NotFound(request.venue_id))?;

        let accepted = self
            .repo
            .find_approved_bookings(venue.id, &request.date)
            .await?;
        if let Err(e) = check_no_conflict(&request.timeframe, &accepted) {
            metrics::counter!(BOOKING_CONFLICTS_TOTAL).increment(1);
            return Err(e);
        }

        let booking = self
            .repo
            .create_booking(NewBooking {
                event_title: request.event_title,
                event_description: request.event_description,
                date: request.date,
                timeframe: request.timeframe,
                venue_id: venue.id,
                requester: Requester::Contact(request.contact.clone()),
                status: BookingStatus::Pending,
            })
            .await?;
        metrics::counter!(BOOKINGS_SUBMITTED_TOTAL).increment(1);
        info!(
            "booking {} submitted for venue {} on {} {}",
            booking.id, venue.id, booking.date, booking.timeframe
        );

        match self.repo.find_user(venue.admin_id).await {
            Ok(Some(admin)) => {
                self.notify_best_effort(Notification {
                    from: self.from_address.clone(),
                    to: admin.email,
                    bcc: vec![request.contact.email],
                    reply_to: None,
                    subject: "New Venue Booking".into(),
                    body: format!(
                        "Hello {},\n\nA new booking has been made for the venue: {}",
                        admin.username, venue.title
                    ),
                })
                .await;
            }
            Ok(None) => tracing::warn!("venue {} has no admin record, skipping notification", venue.id),
            Err(e) => tracing::warn!("admin lookup for venue {} failed: {e}", venue.id),
        }
        Ok(booking)
    }

    /// Mark a booking approved. No re-validation against other bookings, and
    /// no guard on the current status.
    pub async fn approve_booking(&self, admin: &Admin, booking_id: Ulid) -> Result<Booking, BookingError> {
        self.transition(
            admin,
            booking_id,
            BookingStatus::Approved,
            "Venue Booking Approved",
            "Your venue booking has been approved. You will be duly contacted regarding the negotiations soon",
        )
        .await
    }

    /// Mark a booking rejected. Same rules as [`BookingManager::approve_booking`].
    pub async fn reject_booking(&self, admin: &Admin, booking_id: Ulid) -> Result<Booking, BookingError> {
        self.transition(
            admin,
            booking_id,
            BookingStatus::Rejected,
            "Venue Booking Rejected",
            "Your venue booking has been rejected.",
        )
        .await
    }

    async fn transition(
        &self,
        admin: &Admin,
        booking_id: Ulid,
        status: BookingStatus,
        subject: &str,
        message: &str,
    ) -> Result<Booking, BookingError> {
        let current = self
            .repo
            .find_booking_by_id(booking_id)
            .await?
            .ok_or(BookingError::NotFound(booking_id))?;
        let booking = self.repo.update_booking_status(booking_id, status).await?;
        metrics::counter!(BOOKING_TRANSITIONS_TOTAL, "status" => status.as_str()).increment(1);
        info!(
            "booking {booking_id}: {} -> {status} by admin {}",
            current.status, admin.id
        );

        match self.repo.find_user(booking.requester_id).await {
            Ok(Some(requester)) => {
                self.notify_best_effort(Notification {
                    from: admin.email.clone(),
                    to: requester.email,
                    bcc: vec![admin.email.clone()],
                    reply_to: Some(admin.email.clone()),
                    subject: subject.to_string(),
                    body: format!("Hello {},\n\n{message}", requester.username),
                })
                .await;
            }
            Ok(None) => tracing::warn!("booking {booking_id} has no requester record, skipping notification"),
            Err(e) => tracing::warn!("requester lookup for booking {booking_id} failed: {e}"),
        }
        Ok(booking)
    }

    /// Block a slot on a venue. Creates a `disabled` booking without looking
    /// at existing bookings; the venue's allowed window is used when no
    /// timeframe is given.
    pub async fn disable_slot(
        &self,
        admin: &Admin,
        venue_id: Ulid,
        date: &str,
        timeframe: Option<Timeframe>,
    ) -> Result<Booking, BookingError> {
        validate_date(date)?;
        let venue = self
            .repo
            .find_venue(venue_id)
            .await?
            .ok_or(BookingError::NotFound(venue_id))?;
        let timeframe = timeframe.unwrap_or(venue.time_allowed);
        timeframe.hours()?;

        let booking = self
            .repo
            .create_booking(NewBooking {
                event_title: DISABLED_TITLE.into(),
                event_description: DISABLED_DESCRIPTION.into(),
                date: date.to_string(),
                timeframe,
                venue_id,
                requester: Requester::Id(admin.id),
                status: BookingStatus::Disabled,
            })
            .await?;
        metrics::counter!(SLOTS_DISABLED_TOTAL).increment(1);
        info!(
            "venue {venue_id} disabled on {date} {} by admin {}",
            booking.timeframe, admin.id
        );
        Ok(booking)
    }

    /// List bookings matching `filter`. With an admin, only bookings on
    /// venues that admin owns are returned.
    pub async fn list_bookings(
        &self,
        admin: Option<&Admin>,
        filter: &BookingFilter,
    ) -> Result<Vec<Booking>, BookingError> {
        filter.validate()?;
        self.repo.find_bookings(filter, admin.map(|a| a.id)).await
    }
}
