use std::collections::{BTreeMap, HashMap};

use ulid::Ulid;

use crate::model::*;

/// The materialized state: every store mutation is an [`Event`] applied here.
#[derive(Debug, Default)]
pub(super) struct Tables {
    pub users: HashMap<Ulid, User>,
    /// Lowercased email -> user id.
    pub users_by_email: HashMap<String, Ulid>,
    pub venues: BTreeMap<Ulid, Venue>,
    pub bookings: BTreeMap<Ulid, Booking>,
}

impl Tables {
    pub fn from_events(events: &[Event]) -> Self {
        let mut tables = Tables::default();
        for event in events {
            tables.apply(event);
        }
        tables
    }

    pub fn apply(&mut self, event: &Event) {
        match event {
            Event::UserCreated { user } => self.insert_user(user),
            Event::VenueCreated { venue } | Event::VenueUpdated { venue } => {
                self.venues.insert(venue.id, venue.clone());
            }
            Event::VenueDeleted { id } => {
                // Resources live inside the venue; bookings go with it.
                self.venues.remove(id);
                self.bookings.retain(|_, b| b.venue_id != *id);
            }
            Event::BookingCreated { booking } => {
                self.bookings.insert(booking.id, booking.clone());
            }
            Event::BookingStatusChanged { id, status } => {
                if let Some(booking) = self.bookings.get_mut(id) {
                    booking.status = *status;
                }
            }
            Event::RequesterBooked { user, booking } => {
                self.insert_user(user);
                self.bookings.insert(booking.id, booking.clone());
            }
        }
    }

    fn insert_user(&mut self, user: &User) {
        self.users_by_email
            .insert(user.email.to_ascii_lowercase(), user.id);
        self.users.insert(user.id, user.clone());
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users_by_email
            .get(&email.to_ascii_lowercase())
            .and_then(|id| self.users.get(id))
    }

    /// Minimal event list that recreates the current state.
    pub fn snapshot(&self) -> Vec<Event> {
        let mut users: Vec<&User> = self.users.values().collect();
        users.sort_by_key(|u| u.id);

        let mut events = Vec::with_capacity(users.len() + self.venues.len() + self.bookings.len());
        events.extend(users.into_iter().map(|u| Event::UserCreated { user: u.clone() }));
        events.extend(
            self.venues
                .values()
                .map(|v| Event::VenueCreated { venue: v.clone() }),
        );
        events.extend(
            self.bookings
                .values()
                .map(|b| Event::BookingCreated { booking: b.clone() }),
        );
        events
    }
}
