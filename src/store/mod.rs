mod tables;

use std::io;
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, RwLock};
use ulid::Ulid;

use crate::error::BookingError;
use crate::model::*;
use crate::repository::Repository;
use crate::wal::Wal;

use tables::Tables;

// ── Group-commit WAL channel ─────────────────────────────

enum WalCommand {
    Append {
        event: Event,
        response: oneshot::Sender<io::Result<()>>,
    },
    Control(WalControl),
}

/// Commands that are never batched with appends.
enum WalControl {
    Compact {
        snapshot: Vec<Event>,
        response: oneshot::Sender<io::Result<()>>,
    },
    AppendsSinceCompact {
        response: oneshot::Sender<u64>,
    },
}

/// Owns the WAL. Appends that are already queued when the first one arrives
/// are written as one batch behind a single fsync.
async fn wal_writer_loop(mut wal: Wal, mut rx: mpsc::Receiver<WalCommand>) {
    while let Some(cmd) = rx.recv().await {
        let (event, response) = match cmd {
            WalCommand::Append { event, response } => (event, response),
            WalCommand::Control(control) => {
                handle_control(&mut wal, control);
                continue;
            }
        };
        let mut batch = vec![(event, response)];
        let mut deferred = None;
        loop {
            match rx.try_recv() {
                Ok(WalCommand::Append { event, response }) => batch.push((event, response)),
                Ok(WalCommand::Control(control)) => {
                    deferred = Some(control);
                    break;
                }
                Err(_) => break,
            }
        }

        metrics::histogram!(crate::observability::WAL_FLUSH_BATCH_SIZE).record(batch.len() as f64);
        let flush_start = std::time::Instant::now();
        let result = flush_batch(&mut wal, &batch);
        metrics::histogram!(crate::observability::WAL_FLUSH_DURATION_SECONDS)
            .record(flush_start.elapsed().as_secs_f64());
        for (_, tx) in batch {
            let _ = tx.send(match &result {
                Ok(()) => Ok(()),
                Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
            });
        }

        if let Some(control) = deferred {
            handle_control(&mut wal, control);
        }
    }
}

fn flush_batch(wal: &mut Wal, batch: &[(Event, oneshot::Sender<io::Result<()>>)]) -> io::Result<()> {
    let appended = batch
        .iter()
        .try_for_each(|(event, _)| wal.append_buffered(event));
    // Flush regardless so a half-written batch doesn't leak into the next one.
    let flushed = wal.flush_sync();
    appended.and(flushed)
}

fn handle_control(wal: &mut Wal, control: WalControl) {
    match control {
        WalControl::Compact { snapshot, response } => {
            let _ = response.send(wal.compact(&snapshot));
        }
        WalControl::AppendsSinceCompact { response } => {
            let _ = response.send(wal.appends_since_compact());
        }
    }
}

/// Event-sourced [`Repository`]: in-memory tables, optionally backed by a WAL.
///
/// Every mutation takes the table write lock, logs its event, then applies
/// it, so readers never observe an event that failed to persist.
pub struct BookingStore {
    tables: RwLock<Tables>,
    wal_tx: Option<mpsc::Sender<WalCommand>>,
}

impl BookingStore {
    /// A store that forgets everything on drop.
    pub fn in_memory() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            wal_tx: None,
        }
    }

    /// Replay the WAL at `path` (if any) and keep appending to it. A torn
    /// tail is cut off first. Must be called inside a tokio runtime.
    pub fn open(path: &Path) -> io::Result<Self> {
        let events = Wal::recover(path)?;
        let tables = Tables::from_events(&events);
        tracing::info!(
            "replayed {} events from {}: {} venues, {} bookings",
            events.len(),
            path.display(),
            tables.venues.len(),
            tables.bookings.len()
        );
        let wal = Wal::open(path)?;
        let (wal_tx, wal_rx) = mpsc::channel(4096);
        tokio::spawn(wal_writer_loop(wal, wal_rx));
        Ok(Self {
            tables: RwLock::new(tables),
            wal_tx: Some(wal_tx),
        })
    }

    pub fn is_durable(&self) -> bool {
        self.wal_tx.is_some()
    }

    pub async fn counts(&self) -> (usize, usize, usize) {
        let tables = self.tables.read().await;
        (tables.users.len(), tables.venues.len(), tables.bookings.len())
    }

    async fn wal_append(&self, event: &Event) -> Result<(), BookingError> {
        let Some(wal_tx) = &self.wal_tx else {
            return Ok(());
        };
        let (tx, rx) = oneshot::channel();
        wal_tx
            .send(WalCommand::Append {
                event: event.clone(),
                response: tx,
            })
            .await
            .map_err(|_| BookingError::StoreError("WAL writer shut down".into()))?;
        rx.await
            .map_err(|_| BookingError::StoreError("WAL writer dropped response".into()))?
            .map_err(|e| BookingError::StoreError(e.to_string()))
    }

    /// WAL-append then apply. Caller holds the write lock.
    async fn commit(&self, tables: &mut Tables, event: Event) -> Result<(), BookingError> {
        self.wal_append(&event).await?;
        tables.apply(&event);
        Ok(())
    }

    /// Rewrite the WAL as a snapshot of the current state. No-op when in memory.
    pub async fn compact(&self) -> Result<(), BookingError> {
        let Some(wal_tx) = &self.wal_tx else {
            return Ok(());
        };
        // Mutations append under the write lock, so holding it pins the
        // snapshot to everything already in the log.
        let tables = self.tables.write().await;
        let snapshot = tables.snapshot();
        let (tx, rx) = oneshot::channel();
        wal_tx
            .send(WalCommand::Control(WalControl::Compact { snapshot, response: tx }))
            .await
            .map_err(|_| BookingError::StoreError("WAL writer shut down".into()))?;
        rx.await
            .map_err(|_| BookingError::StoreError("WAL writer dropped response".into()))?
            .map_err(|e| BookingError::StoreError(e.to_string()))
    }

    pub async fn wal_appends_since_compact(&self) -> u64 {
        let Some(wal_tx) = &self.wal_tx else {
            return 0;
        };
        let (tx, rx) = oneshot::channel();
        if wal_tx
            .send(WalCommand::Control(WalControl::AppendsSinceCompact { response: tx }))
            .await
            .is_err()
        {
            return 0;
        }
        rx.await.unwrap_or(0)
    }
}

fn new_user(contact: &Contact, kind: UserKind) -> User {
    User {
        id: Ulid::new(),
        username: contact.name.clone(),
        email: contact.email.clone(),
        phone: contact.phone.clone(),
        kind,
    }
}

fn build_resources(venue_id: Ulid, resources: Vec<NewResource>) -> Vec<Resource> {
    resources
        .into_iter()
        .map(|r| Resource {
            id: Ulid::new(),
            venue_id,
            name: r.name,
            value: r.value,
        })
        .collect()
}

#[async_trait]
impl Repository for BookingStore {
    async fn find_approved_bookings(&self, venue_id: Ulid, date: &str) -> Result<Vec<Booking>, BookingError> {
        let tables = self.tables.read().await;
        Ok(tables
            .bookings
            .values()
            .filter(|b| b.venue_id == venue_id && b.date == date && b.status.is_blocking())
            .cloned()
            .collect())
    }

    async fn create_booking(&self, fields: NewBooking) -> Result<Booking, BookingError> {
        let mut tables = self.tables.write().await;
        if !tables.venues.contains_key(&fields.venue_id) {
            return Err(BookingError::NotFound(fields.venue_id));
        }
        let (requester_id, registered) = match &fields.requester {
            Requester::Id(id) if tables.users.contains_key(id) => (*id, None),
            Requester::Id(id) => return Err(BookingError::NotFound(*id)),
            Requester::Contact(contact) => match tables.user_by_email(&contact.email) {
                Some(user) => (user.id, None),
                None => {
                    let user = new_user(contact, UserKind::User);
                    (user.id, Some(user))
                }
            },
        };
        let booking = Booking {
            id: Ulid::new(),
            event_title: fields.event_title,
            event_description: fields.event_description,
            date: fields.date,
            timeframe: fields.timeframe,
            venue_id: fields.venue_id,
            requester_id,
            status: fields.status,
        };
        let event = match registered {
            Some(user) => Event::RequesterBooked { user, booking: booking.clone() },
            None => Event::BookingCreated { booking: booking.clone() },
        };
        self.commit(&mut tables, event).await?;
        Ok(booking)
    }

    async fn find_booking_by_id(&self, id: Ulid) -> Result<Option<Booking>, BookingError> {
        Ok(self.tables.read().await.bookings.get(&id).cloned())
    }

    async fn update_booking_status(&self, id: Ulid, status: BookingStatus) -> Result<Booking, BookingError> {
        let mut tables = self.tables.write().await;
        if !tables.bookings.contains_key(&id) {
            return Err(BookingError::NotFound(id));
        }
        self.commit(&mut tables, Event::BookingStatusChanged { id, status })
            .await?;
        tables
            .bookings
            .get(&id)
            .cloned()
            .ok_or(BookingError::NotFound(id))
    }

    async fn find_bookings(&self, filter: &BookingFilter, admin_id: Option<Ulid>) -> Result<Vec<Booking>, BookingError> {
        filter.validate()?;
        let tables = self.tables.read().await;
        Ok(tables
            .bookings
            .values()
            .filter(|b| filter.matches(b))
            .filter(|b| {
                admin_id.is_none_or(|admin| {
                    tables
                        .venues
                        .get(&b.venue_id)
                        .is_some_and(|v| v.admin_id == admin)
                })
            })
            .cloned()
            .collect())
    }

    async fn find_or_create_user(&self, contact: &Contact, kind: UserKind) -> Result<User, BookingError> {
        let mut tables = self.tables.write().await;
        if let Some(user) = tables.user_by_email(&contact.email) {
            return Ok(user.clone());
        }
        let user = new_user(contact, kind);
        self.commit(&mut tables, Event::UserCreated { user: user.clone() })
            .await?;
        Ok(user)
    }

    async fn find_user(&self, id: Ulid) -> Result<Option<User>, BookingError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create_venue(&self, admin_id: Ulid, fields: NewVenue) -> Result<Venue, BookingError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&admin_id) {
            return Err(BookingError::NotFound(admin_id));
        }
        let id = Ulid::new();
        let venue = Venue {
            id,
            title: fields.title,
            address: fields.address,
            capacity: fields.capacity,
            time_allowed: fields.time_allowed,
            admin_id,
            resources: build_resources(id, fields.resources),
        };
        self.commit(&mut tables, Event::VenueCreated { venue: venue.clone() })
            .await?;
        Ok(venue)
    }

    async fn find_venue(&self, id: Ulid) -> Result<Option<Venue>, BookingError> {
        Ok(self.tables.read().await.venues.get(&id).cloned())
    }

    async fn list_venues(&self) -> Result<Vec<Venue>, BookingError> {
        Ok(self.tables.read().await.venues.values().cloned().collect())
    }

    async fn update_venue(&self, id: Ulid, patch: VenuePatch) -> Result<Venue, BookingError> {
        let mut tables = self.tables.write().await;
        let mut venue = tables
            .venues
            .get(&id)
            .cloned()
            .ok_or(BookingError::NotFound(id))?;
        if let Some(title) = patch.title {
            venue.title = title;
        }
        if let Some(address) = patch.address {
            venue.address = address;
        }
        if let Some(capacity) = patch.capacity {
            venue.capacity = capacity;
        }
        if let Some(time_allowed) = patch.time_allowed {
            venue.time_allowed = time_allowed;
        }
        if let Some(resources) = patch.resources {
            venue.resources = build_resources(id, resources);
        }
        self.commit(&mut tables, Event::VenueUpdated { venue: venue.clone() })
            .await?;
        Ok(venue)
    }

    async fn delete_venue(&self, id: Ulid) -> Result<(), BookingError> {
        let mut tables = self.tables.write().await;
        if !tables.venues.contains_key(&id) {
            return Err(BookingError::NotFound(id));
        }
        self.commit(&mut tables, Event::VenueDeleted { id }).await
    }
}
