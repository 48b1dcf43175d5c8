//! Storage abstraction traits
//!
//! Services depend on these traits rather than on a concrete backend. One
//! backend type implements all three and is shared behind an [`Arc`] through
//! [`Stores`].
//!
//! # Example
//!
//! ```rust,ignore
//! use house_service::db::DatabaseProvider;
//!
//! // Everything in process memory (tests, demos)
//! let stores = DatabaseProvider::Memory.create_stores().await?;
//!
//! // File-based SQLite through libsql
//! let stores = DatabaseProvider::SQLite { path: "data/house.db".into() }
//!     .create_stores()
//!     .await?;
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::types::{Flat, FlatStatus, House, NewFlat, NewHouse, Result, Role, User};

/// Where the stores live.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DatabaseProvider {
    /// Process memory, lost on restart.
    #[default]
    Memory,
    /// File-based SQLite database.
    SQLite {
        /// Path to the database file. Parent directories are created.
        path: String,
    },
    /// Remote Turso database.
    #[cfg(feature = "turso")]
    Turso {
        /// Database URL, e.g. `libsql://your-db.turso.io`
        url: String,
        /// Authentication token for the database
        auth_token: String,
    },
}

impl DatabaseProvider {
    /// Opens the backend and returns the three store handles.
    pub async fn create_stores(&self) -> Result<Stores> {
        match self {
            DatabaseProvider::Memory => {
                Ok(Stores::from_backend(Arc::new(super::memory::MemoryStore::new())))
            }
            DatabaseProvider::SQLite { path } => {
                let client = super::turso::TursoClient::new_local(path).await?;
                Ok(Stores::from_backend(Arc::new(client)))
            }
            #[cfg(feature = "turso")]
            DatabaseProvider::Turso { url, auth_token } => {
                let client =
                    super::turso::TursoClient::new_remote(url.clone(), auth_token.clone()).await?;
                Ok(Stores::from_backend(Arc::new(client)))
            }
        }
    }
}

/// Handles to the three stores, usually backed by the same object.
#[derive(Clone)]
pub struct Stores {
    pub credentials: Arc<dyn CredentialStore>,
    pub houses: Arc<dyn HouseStore>,
    pub flats: Arc<dyn FlatStore>,
}

impl Stores {
    /// Shares one backend across all three store roles.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: CredentialStore + HouseStore + FlatStore + 'static,
    {
        Self {
            credentials: backend.clone(),
            houses: backend.clone(),
            flats: backend,
        }
    }
}

/// Account persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persists a new account and returns it with its generated id.
    ///
    /// Fails with [`AppError::Conflict`](crate::types::AppError::Conflict) if
    /// the email is already taken. The uniqueness check and the insert are
    /// atomic with respect to concurrent registrations.
    async fn create_user(&self, email: &str, password_hash: &str, role: Role) -> Result<User>;

    /// Looks up an account by exact email.
    ///
    /// Fails with [`AppError::NotFound`](crate::types::AppError::NotFound)
    /// if there is none.
    async fn find_user_by_email(&self, email: &str) -> Result<User>;
}

/// House persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HouseStore: Send + Sync {
    /// Inserts a house with both timestamps set to `created_at`.
    ///
    /// A duplicate address is a conflict.
    async fn create_house(&self, house: &NewHouse, created_at: DateTime<Utc>) -> Result<House>;

    async fn get_house(&self, id: i64) -> Result<House>;
}

/// Flat persistence.
///
/// Every write also moves the parent house's `updated_at` to `touched_at`.
/// The flat write and the house touch commit together or not at all.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FlatStore: Send + Sync {
    /// Inserts a flat in status `created`.
    ///
    /// Unknown house is not-found; a second flat with the same number in the
    /// same house is a conflict.
    async fn create_flat(&self, flat: &NewFlat, touched_at: DateTime<Utc>) -> Result<Flat>;

    async fn get_flat(&self, id: i64) -> Result<Flat>;

    /// Sets the status of an existing flat and returns the updated record.
    async fn update_flat_status(
        &self,
        id: i64,
        status: FlatStatus,
        touched_at: DateTime<Utc>,
    ) -> Result<Flat>;

    /// Flats of a house whose status is in `statuses`, ordered by id.
    async fn list_flats(&self, house_id: i64, statuses: &[FlatStatus]) -> Result<Vec<Flat>>;
}
