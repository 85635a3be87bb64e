use tracing::info;
use ulid::Ulid;

use crate::error::BookingError;
use crate::limits::*;
use crate::model::*;

use super::BookingManager;

fn ensure_owner(venue: &Venue, admin: &Admin) -> Result<(), BookingError> {
    if venue.admin_id != admin.id {
        return Err(BookingError::Unauthorized {
            venue: venue.id,
            admin: admin.id,
        });
    }
    Ok(())
}

fn validate_resources(resources: &[NewResource]) -> Result<(), BookingError> {
    if resources.len() > MAX_RESOURCES_PER_VENUE {
        return Err(BookingError::LimitExceeded("too many resources"));
    }
    for resource in resources {
        require_text(&resource.name, MAX_NAME_LEN, "resource name")?;
        require_text(&resource.value, MAX_RESOURCE_VALUE_LEN, "resource value")?;
    }
    Ok(())
}

impl BookingManager {
    /// Register (or look up by email) an administrator account.
    pub async fn register_admin(&self, contact: &Contact) -> Result<Admin, BookingError> {
        contact.validate()?;
        let user = self
            .repo
            .find_or_create_user(contact, UserKind::Admin)
            .await?;
        if user.kind != UserKind::Admin {
            tracing::warn!("{} is registered as a plain user", user.email);
            return Err(BookingError::NotAnAdmin(user.id));
        }
        Ok(Admin::from(&user))
    }

    pub async fn create_venue(&self, admin: &Admin, venue: NewVenue) -> Result<Venue, BookingError> {
        require_text(&venue.title, MAX_TITLE_LEN, "venue title")?;
        require_text(&venue.address, MAX_ADDRESS_LEN, "venue address")?;
        venue.time_allowed.hours()?;
        validate_resources(&venue.resources)?;

        let venue = self.repo.create_venue(admin.id, venue).await?;
        info!(
            "venue {} created by admin {} with {} resources",
            venue.id,
            admin.id,
            venue.resources.len()
        );
        Ok(venue)
    }

    /// Apply `patch` to a venue the admin owns.
    pub async fn update_venue(
        &self,
        admin: &Admin,
        venue_id: Ulid,
        patch: VenuePatch,
    ) -> Result<Venue, BookingError> {
        let venue = self.get_venue(venue_id).await?;
        ensure_owner(&venue, admin)?;

        if let Some(title) = &patch.title {
            require_text(title, MAX_TITLE_LEN, "venue title")?;
        }
        if let Some(address) = &patch.address {
            require_text(address, MAX_ADDRESS_LEN, "venue address")?;
        }
        if let Some(time_allowed) = &patch.time_allowed {
            time_allowed.hours()?;
        }
        if let Some(resources) = &patch.resources {
            validate_resources(resources)?;
        }

        let venue = self.repo.update_venue(venue_id, patch).await?;
        info!("venue {venue_id} updated by admin {}", admin.id);
        Ok(venue)
    }

    /// Delete a venue the admin owns, with its resources and bookings.
    pub async fn delete_venue(&self, admin: &Admin, venue_id: Ulid) -> Result<(), BookingError> {
        let venue = self.get_venue(venue_id).await?;
        ensure_owner(&venue, admin)?;
        self.repo.delete_venue(venue_id).await?;
        metrics::counter!(crate::observability::VENUES_DELETED_TOTAL).increment(1);
        info!("venue {venue_id} deleted by admin {}", admin.id);
        Ok(())
    }

    pub async fn get_venue(&self, venue_id: Ulid) -> Result<Venue, BookingError> {
        self.repo
            .find_venue(venue_id)
            .await?
            .ok_or(BookingError::NotFound(venue_id))
    }

    pub async fn list_venues(&self) -> Result<Vec<Venue>, BookingError> {
        self.repo.list_venues().await
    }
}
