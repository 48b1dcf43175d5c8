use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{
    params::Params, Builder, Connection, Database, Row, Transaction, TransactionBehavior, Value,
};

use super::traits::{CredentialStore, FlatStore, HouseStore};
use crate::types::{AppError, Flat, FlatStatus, House, NewFlat, NewHouse, Result, Role, User};

/// libsql-backed stores, local file or remote Turso.
///
/// A fresh connection is opened per operation. Multi-statement writes run in
/// an IMMEDIATE transaction on that connection, and a locked database is
/// waited on for up to [`BUSY_TIMEOUT`] before the write fails.
pub struct TursoClient {
    db: Database,
}

/// How long a connection waits on another writer's lock.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const USER_COLUMNS: &str = "id, email, password_hash, role";
const HOUSE_COLUMNS: &str = "id, address, year, developer, created_at, updated_at";
const FLAT_COLUMNS: &str = "id, house_id, status, number, rooms, price";

impl TursoClient {
    /// Opens (or creates) a SQLite file.
    pub async fn new_local(path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Database(format!("Failed to create database directory: {}", e))
                })?;
            }
        }

        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {}", e)))?;

        let client = Self { db };
        client.enable_wal().await?;
        client.initialize_schema().await?;
        tracing::info!(path = %path, "opened sqlite database");

        Ok(client)
    }

    /// Connects to a remote Turso database.
    #[cfg(feature = "turso")]
    pub async fn new_remote(url: String, auth_token: String) -> Result<Self> {
        let db = Builder::new_remote(url, auth_token)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Turso: {}", e)))?;

        let client = Self { db };
        client.initialize_schema().await?;
        tracing::info!("connected to remote turso database");

        Ok(client)
    }

    pub fn connection(&self) -> Result<Connection> {
        let conn = self
            .db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))?;

        // Remote connections have no local lock to wait on.
        if let Err(e) = conn.busy_timeout(BUSY_TIMEOUT) {
            tracing::debug!(error = %e, "busy timeout not applied");
        }

        Ok(conn)
    }

    /// Readers keep going while a writer holds the lock.
    async fn enable_wal(&self) -> Result<()> {
        let conn = self.connection()?;
        let mut rows = conn
            .query("PRAGMA journal_mode = WAL", ())
            .await
            .map_err(db_err("Failed to set journal mode"))?;
        while rows
            .next()
            .await
            .map_err(db_err("Failed to set journal mode"))?
            .is_some()
        {}

        Ok(())
    }

    async fn begin_write(conn: &Connection) -> Result<Transaction> {
        conn.transaction_with_behavior(TransactionBehavior::Immediate)
            .await
            .map_err(db_err("Failed to begin transaction"))
    }

    async fn initialize_schema(&self) -> Result<()> {
        let conn = self.connection()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL CHECK (role IN ('client', 'moderator')),
                created_at INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create users table: {}", e)))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS houses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                address TEXT UNIQUE NOT NULL,
                year INTEGER NOT NULL,
                developer TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create houses table: {}", e)))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS flats (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                house_id INTEGER NOT NULL,
                status TEXT NOT NULL
                    CHECK (status IN ('created', 'on_moderation', 'approved', 'declined')),
                number INTEGER NOT NULL,
                rooms INTEGER NOT NULL,
                price INTEGER NOT NULL,
                FOREIGN KEY (house_id) REFERENCES houses(id),
                UNIQUE(house_id, number)
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create flats table: {}", e)))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_flats_house ON flats(house_id)",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create flats index: {}", e)))?;

        Ok(())
    }
}

// ============= Row mapping =============

fn db_err(context: &'static str) -> impl Fn(libsql::Error) -> AppError {
    move |e| AppError::Database(format!("{}: {}", context, e))
}

fn is_unique_violation(e: &libsql::Error) -> bool {
    e.to_string().contains("UNIQUE constraint failed")
}

fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| AppError::Database(format!("timestamp {} out of range", ms)))
}

fn narrow(value: i64, column: &str) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| AppError::Database(format!("{} value {} out of range", column, value)))
}

fn user_from_row(row: &Row) -> Result<User> {
    let role: String = row.get(3).map_err(db_err("Failed to read user"))?;

    Ok(User {
        id: row.get(0).map_err(db_err("Failed to read user"))?,
        email: row.get(1).map_err(db_err("Failed to read user"))?,
        password_hash: row.get(2).map_err(db_err("Failed to read user"))?,
        role: role
            .parse()
            .map_err(|e| AppError::Database(format!("Stored user has bad role: {}", e)))?,
    })
}

fn house_from_row(row: &Row) -> Result<House> {
    let developer = match row.get_value(3).map_err(db_err("Failed to read house"))? {
        Value::Text(text) => Some(text),
        _ => None,
    };

    Ok(House {
        id: row.get(0).map_err(db_err("Failed to read house"))?,
        address: row.get(1).map_err(db_err("Failed to read house"))?,
        year: narrow(row.get(2).map_err(db_err("Failed to read house"))?, "year")?,
        developer,
        created_at: from_millis(row.get(4).map_err(db_err("Failed to read house"))?)?,
        updated_at: from_millis(row.get(5).map_err(db_err("Failed to read house"))?)?,
    })
}

fn flat_from_row(row: &Row) -> Result<Flat> {
    let status: String = row.get(2).map_err(db_err("Failed to read flat"))?;

    Ok(Flat {
        id: row.get(0).map_err(db_err("Failed to read flat"))?,
        house_id: row.get(1).map_err(db_err("Failed to read flat"))?,
        status: status
            .parse()
            .map_err(|e| AppError::Database(format!("Stored flat has bad status: {}", e)))?,
        number: narrow(row.get(3).map_err(db_err("Failed to read flat"))?, "number")?,
        rooms: narrow(row.get(4).map_err(db_err("Failed to read flat"))?, "rooms")?,
        price: row.get(5).map_err(db_err("Failed to read flat"))?,
    })
}

async fn fetch_flat(conn: &Connection, id: i64) -> Result<Option<Flat>> {
    let mut rows = conn
        .query(
            &format!("SELECT {} FROM flats WHERE id = ?", FLAT_COLUMNS),
            [id],
        )
        .await
        .map_err(db_err("Failed to query flat"))?;

    match rows.next().await.map_err(db_err("Failed to read flat"))? {
        Some(row) => Ok(Some(flat_from_row(&row)?)),
        None => Ok(None),
    }
}

async fn fetch_house(conn: &Connection, id: i64) -> Result<Option<House>> {
    let mut rows = conn
        .query(
            &format!("SELECT {} FROM houses WHERE id = ?", HOUSE_COLUMNS),
            [id],
        )
        .await
        .map_err(db_err("Failed to query house"))?;

    match rows.next().await.map_err(db_err("Failed to read house"))? {
        Some(row) => Ok(Some(house_from_row(&row)?)),
        None => Ok(None),
    }
}

/// Moves a house's watermark inside an open transaction.
async fn touch_house(tx: &Transaction, house_id: i64, at: DateTime<Utc>) -> Result<()> {
    let touched = tx
        .execute(
            "UPDATE houses SET updated_at = ? WHERE id = ?",
            (to_millis(at), house_id),
        )
        .await
        .map_err(db_err("Failed to touch house"))?;

    if touched == 0 {
        return Err(AppError::NotFound(format!("house {} not found", house_id)));
    }

    Ok(())
}

/// Commits on success, rolls back on failure.
async fn finish<T>(tx: Transaction, outcome: Result<T>) -> Result<T> {
    match outcome {
        Ok(value) => {
            tx.commit().await.map_err(db_err("Failed to commit"))?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = tx.rollback().await {
                tracing::warn!(error = %rollback, "rollback failed");
            }
            Err(e)
        }
    }
}

// ============= Store implementations =============

#[async_trait]
impl CredentialStore for TursoClient {
    async fn create_user(&self, email: &str, password_hash: &str, role: Role) -> Result<User> {
        let conn = self.connection()?;

        let mut existing = conn
            .query("SELECT 1 FROM users WHERE email = ?", [email])
            .await
            .map_err(db_err("Failed to query user"))?;
        if existing
            .next()
            .await
            .map_err(db_err("Failed to read user"))?
            .is_some()
        {
            return Err(AppError::Conflict("user already exists".to_string()));
        }

        // The UNIQUE constraint still decides races between concurrent inserts.
        let id = uuid::Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO users (id, email, password_hash, role, created_at)
             VALUES (?, ?, ?, ?, ?)",
            (
                id.as_str(),
                email,
                password_hash,
                role.as_str(),
                to_millis(Utc::now()),
            ),
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("user already exists".to_string())
            } else {
                AppError::Database(format!("Failed to create user: {}", e))
            }
        })?;

        Ok(User {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role,
        })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<User> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                &format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS),
                [email],
            )
            .await
            .map_err(db_err("Failed to query user"))?;

        match rows.next().await.map_err(db_err("Failed to read user"))? {
            Some(row) => user_from_row(&row),
            None => Err(AppError::NotFound("user not found".to_string())),
        }
    }
}

#[async_trait]
impl HouseStore for TursoClient {
    async fn create_house(&self, house: &NewHouse, created_at: DateTime<Utc>) -> Result<House> {
        let conn = self.connection()?;
        let at = to_millis(created_at);
        let developer = match &house.developer {
            Some(name) => Value::Text(name.clone()),
            None => Value::Null,
        };

        conn.execute(
            "INSERT INTO houses (address, year, developer, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
            (house.address.as_str(), i64::from(house.year), developer, at, at),
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("house at '{}' already exists", house.address))
            } else {
                AppError::Database(format!("Failed to create house: {}", e))
            }
        })?;

        Ok(House {
            id: conn.last_insert_rowid(),
            address: house.address.clone(),
            year: house.year,
            developer: house.developer.clone(),
            created_at: from_millis(at)?,
            updated_at: from_millis(at)?,
        })
    }

    async fn get_house(&self, id: i64) -> Result<House> {
        let conn = self.connection()?;

        fetch_house(&conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("house {} not found", id)))
    }
}

async fn insert_flat(tx: &Transaction, flat: &NewFlat, touched_at: DateTime<Utc>) -> Result<Flat> {
    if fetch_house(tx, flat.house_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "house {} not found",
            flat.house_id
        )));
    }

    tx.execute(
        "INSERT INTO flats (house_id, status, number, rooms, price)
         VALUES (?, ?, ?, ?, ?)",
        (
            flat.house_id,
            FlatStatus::Created.as_str(),
            i64::from(flat.number),
            i64::from(flat.rooms),
            flat.price,
        ),
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(format!(
                "flat {} already exists in house {}",
                flat.number, flat.house_id
            ))
        } else {
            AppError::Database(format!("Failed to create flat: {}", e))
        }
    })?;
    let id = tx.last_insert_rowid();

    touch_house(tx, flat.house_id, touched_at).await?;

    Ok(Flat {
        id,
        house_id: flat.house_id,
        status: FlatStatus::Created,
        number: flat.number,
        rooms: flat.rooms,
        price: flat.price,
    })
}

async fn set_flat_status(
    tx: &Transaction,
    id: i64,
    status: FlatStatus,
    touched_at: DateTime<Utc>,
) -> Result<Flat> {
    let changed = tx
        .execute(
            "UPDATE flats SET status = ? WHERE id = ?",
            (status.as_str(), id),
        )
        .await
        .map_err(db_err("Failed to update flat"))?;

    if changed == 0 {
        return Err(AppError::NotFound(format!("flat {} not found", id)));
    }

    let flat = fetch_flat(tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("flat {} not found", id)))?;

    touch_house(tx, flat.house_id, touched_at).await?;

    Ok(flat)
}

#[async_trait]
impl FlatStore for TursoClient {
    async fn create_flat(&self, flat: &NewFlat, touched_at: DateTime<Utc>) -> Result<Flat> {
        let conn = self.connection()?;
        let tx = Self::begin_write(&conn).await?;

        let outcome = insert_flat(&tx, flat, touched_at).await;
        finish(tx, outcome).await
    }

    async fn get_flat(&self, id: i64) -> Result<Flat> {
        let conn = self.connection()?;

        fetch_flat(&conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("flat {} not found", id)))
    }

    async fn update_flat_status(
        &self,
        id: i64,
        status: FlatStatus,
        touched_at: DateTime<Utc>,
    ) -> Result<Flat> {
        let conn = self.connection()?;
        let tx = Self::begin_write(&conn).await?;

        let outcome = set_flat_status(&tx, id, status, touched_at).await;
        finish(tx, outcome).await
    }

    async fn list_flats(&self, house_id: i64, statuses: &[FlatStatus]) -> Result<Vec<Flat>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.connection()?;
        let placeholders = vec!["?"; statuses.len()].join(", ");
        let sql = format!(
            "SELECT {} FROM flats WHERE house_id = ? AND status IN ({}) ORDER BY id",
            FLAT_COLUMNS, placeholders
        );

        let mut values = Vec::with_capacity(statuses.len() + 1);
        values.push(Value::Integer(house_id));
        values.extend(statuses.iter().map(|s| Value::Text(s.as_str().to_string())));

        let mut rows = conn
            .query(&sql, Params::Positional(values))
            .await
            .map_err(db_err("Failed to query flats"))?;

        let mut flats = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err("Failed to read flat"))? {
            flats.push(flat_from_row(&row)?);
        }

        Ok(flats)
    }
}
