use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::traits::{CredentialStore, FlatStore, HouseStore};
use crate::types::{AppError, Flat, FlatStatus, House, NewFlat, NewHouse, Result, Role, User};

#[derive(Default)]
struct Tables {
    /// Keyed by email.
    users: HashMap<String, User>,
    houses: BTreeMap<i64, House>,
    flats: BTreeMap<i64, Flat>,
    last_house_id: i64,
    last_flat_id: i64,
}

/// In-process backend.
///
/// All tables sit behind a single lock, so every trait method is atomic
/// without further coordination.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn house_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("house {} not found", id))
}

fn flat_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("flat {} not found", id))
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create_user(&self, email: &str, password_hash: &str, role: Role) -> Result<User> {
        let mut tables = self.tables.write();

        if tables.users.contains_key(email) {
            return Err(AppError::Conflict("user already exists".to_string()));
        }

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role,
        };
        tables.users.insert(user.email.clone(), user.clone());

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<User> {
        self.tables
            .read()
            .users
            .get(email)
            .cloned()
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))
    }
}

#[async_trait]
impl HouseStore for MemoryStore {
    async fn create_house(&self, house: &NewHouse, created_at: DateTime<Utc>) -> Result<House> {
        let mut tables = self.tables.write();

        if tables.houses.values().any(|h| h.address == house.address) {
            return Err(AppError::Conflict(format!(
                "house at '{}' already exists",
                house.address
            )));
        }

        tables.last_house_id += 1;
        let record = House {
            id: tables.last_house_id,
            address: house.address.clone(),
            year: house.year,
            developer: house.developer.clone(),
            created_at,
            updated_at: created_at,
        };
        tables.houses.insert(record.id, record.clone());

        Ok(record)
    }

    async fn get_house(&self, id: i64) -> Result<House> {
        self.tables
            .read()
            .houses
            .get(&id)
            .cloned()
            .ok_or_else(|| house_not_found(id))
    }
}

#[async_trait]
impl FlatStore for MemoryStore {
    async fn create_flat(&self, flat: &NewFlat, touched_at: DateTime<Utc>) -> Result<Flat> {
        let mut guard = self.tables.write();
        let tables = &mut *guard;

        let house = tables
            .houses
            .get_mut(&flat.house_id)
            .ok_or_else(|| house_not_found(flat.house_id))?;

        if tables
            .flats
            .values()
            .any(|f| f.house_id == flat.house_id && f.number == flat.number)
        {
            return Err(AppError::Conflict(format!(
                "flat {} already exists in house {}",
                flat.number, flat.house_id
            )));
        }

        tables.last_flat_id += 1;
        let record = Flat {
            id: tables.last_flat_id,
            house_id: flat.house_id,
            status: FlatStatus::Created,
            number: flat.number,
            rooms: flat.rooms,
            price: flat.price,
        };
        tables.flats.insert(record.id, record.clone());
        house.updated_at = touched_at;

        Ok(record)
    }

    async fn get_flat(&self, id: i64) -> Result<Flat> {
        self.tables
            .read()
            .flats
            .get(&id)
            .cloned()
            .ok_or_else(|| flat_not_found(id))
    }

    async fn update_flat_status(
        &self,
        id: i64,
        status: FlatStatus,
        touched_at: DateTime<Utc>,
    ) -> Result<Flat> {
        let mut guard = self.tables.write();
        let tables = &mut *guard;

        let flat = tables.flats.get_mut(&id).ok_or_else(|| flat_not_found(id))?;
        // Resolve the house before mutating anything.
        let house = tables
            .houses
            .get_mut(&flat.house_id)
            .ok_or_else(|| house_not_found(flat.house_id))?;

        flat.status = status;
        house.updated_at = touched_at;

        Ok(flat.clone())
    }

    async fn list_flats(&self, house_id: i64, statuses: &[FlatStatus]) -> Result<Vec<Flat>> {
        Ok(self
            .tables
            .read()
            .flats
            .values()
            .filter(|f| f.house_id == house_id && statuses.contains(&f.status))
            .cloned()
            .collect())
    }
}
