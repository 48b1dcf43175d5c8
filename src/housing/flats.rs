use std::sync::Arc;

use crate::db::{FlatStore, HouseStore};
use crate::types::{CreateFlatRequest, Flat, FlatStatus, NewFlat, Result, Role, ValidationError};
use crate::utils::clock::SharedClock;

/// Statuses a role is allowed to see.
///
/// Clients only see approved flats. Moderators see everything except flats
/// that are currently on moderation.
pub fn visible_statuses(role: Role) -> &'static [FlatStatus] {
    match role {
        Role::Client => &[FlatStatus::Approved],
        Role::Moderator => &[
            FlatStatus::Created,
            FlatStatus::Approved,
            FlatStatus::Declined,
        ],
    }
}

/// Flat lifecycle: creation, moderation transitions and role-filtered reads.
///
/// Any recognised status may move to any recognised status, including back
/// to `created`. Every successful write moves the parent house's
/// `updated_at` to the current time.
pub struct FlatStatusMachine {
    flats: Arc<dyn FlatStore>,
    houses: Arc<dyn HouseStore>,
    clock: SharedClock,
}

impl FlatStatusMachine {
    pub fn new(flats: Arc<dyn FlatStore>, houses: Arc<dyn HouseStore>, clock: SharedClock) -> Self {
        Self {
            flats,
            houses,
            clock,
        }
    }

    /// Adds a flat to a house in status `created`.
    pub async fn create_flat(&self, request: CreateFlatRequest) -> Result<Flat> {
        if request.number <= 0 {
            return Err(ValidationError::InvalidFlat("number must be positive".to_string()).into());
        }
        if request.rooms <= 0 {
            return Err(ValidationError::InvalidFlat("rooms must be positive".to_string()).into());
        }
        if request.price < 0 {
            return Err(
                ValidationError::InvalidFlat("price must not be negative".to_string()).into(),
            );
        }

        let new_flat = NewFlat {
            house_id: request.house_id,
            number: request.number,
            rooms: request.rooms,
            price: request.price,
        };
        let flat = self.flats.create_flat(&new_flat, self.clock.utc()).await?;

        tracing::info!(flat_id = flat.id, house_id = flat.house_id, "flat created");

        Ok(flat)
    }

    /// Moves a flat to `target`.
    ///
    /// The target is parsed before storage is touched, so an unknown status
    /// leaves the flat and its house untouched. Any known status is accepted
    /// as a target, including moves out of `approved` or `declined`.
    pub async fn apply_transition(&self, flat_id: i64, target: &str) -> Result<Flat> {
        let status: FlatStatus = target.parse()?;

        let current = self.flats.get_flat(flat_id).await?;
        let flat = self
            .flats
            .update_flat_status(flat_id, status, self.clock.utc())
            .await?;

        tracing::info!(
            flat_id,
            house_id = flat.house_id,
            from = %current.status,
            to = %flat.status,
            "flat status changed"
        );

        Ok(flat)
    }

    /// Flats of a house filtered by what `role` may see.
    pub async fn list_visible(&self, house_id: i64, role: Role) -> Result<Vec<Flat>> {
        self.houses.get_house(house_id).await?;

        self.flats
            .list_flats(house_id, visible_statuses(role))
            .await
    }
}
