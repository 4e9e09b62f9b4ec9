//! SQLite store implementation.
//!
//! Each location is one row. Facilities, opening times and the embedded
//! reviews are JSON columns, so a location is read and written as a whole
//! document. Read-modify-write mutations run inside an immediate
//! transaction, so concurrent writers queue on the write lock instead of
//! failing with `SQLITE_BUSY`.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use entities::{
    GeoPoint, Location, LocationPatch, OpeningTime, Review, ReviewPatch, User, is_valid_rating,
};
use std::{str::FromStr, time::Duration};

use sqlx::{
    FromRow, Pool, Sqlite, SqliteConnection, Transaction,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use uuid::Uuid;

use crate::{LocationStore, NearbyLocation, ProximityQuery, StoreError, StoreResult};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS locations (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        address TEXT,
        facilities TEXT NOT NULL,
        lng REAL NOT NULL,
        lat REAL NOT NULL,
        opening_times TEXT NOT NULL,
        rating REAL NOT NULL DEFAULT 0,
        reviews TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_locations_lat_lng
    ON locations (lat, lng)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        salt TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
];

/// How long a connection waits for another writer before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

const LOCATION_COLUMNS: &str = "id, name, address, facilities, lng, lat, opening_times, rating, \
                                reviews, created_at, updated_at";

/// Database row for Location
#[derive(Debug, FromRow)]
struct LocationRow {
    id: String,
    name: String,
    address: Option<String>,
    facilities: String,
    lng: f64,
    lat: f64,
    opening_times: String,
    rating: f64,
    reviews: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<LocationRow> for Location {
    type Error = StoreError;

    fn try_from(row: LocationRow) -> StoreResult<Self> {
        Ok(Location {
            id: parse_id(&row.id)?,
            name: row.name,
            address: row.address,
            facilities: serde_json::from_str(&row.facilities)?,
            coords: GeoPoint::new(row.lng, row.lat),
            opening_times: serde_json::from_str::<Vec<OpeningTime>>(&row.opening_times)?,
            rating: row.rating,
            reviews: serde_json::from_str::<Vec<Review>>(&row.reviews)?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

/// Database row for User
#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    email: String,
    name: String,
    password_hash: String,
    salt: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> StoreResult<Self> {
        Ok(User {
            id: parse_id(&row.id)?,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            salt: row.salt,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

fn parse_id(raw: &str) -> StoreResult<Uuid> {
    raw.parse()
        .map_err(|_| StoreError::Other(format!("Invalid stored id: {raw}")))
}

fn parse_timestamp(raw: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Other(format!("Invalid stored timestamp {raw}: {e}")))
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

async fn fetch_location(conn: &mut SqliteConnection, id: Uuid) -> StoreResult<Option<Location>> {
    let row: Option<LocationRow> = sqlx::query_as(&format!(
        "SELECT {LOCATION_COLUMNS} FROM locations WHERE id = ?"
    ))
    .bind(id.to_string())
    .fetch_optional(&mut *conn)
    .await?;

    row.map(Location::try_from).transpose()
}

async fn fetch_location_for_update(
    conn: &mut SqliteConnection,
    id: Uuid,
) -> StoreResult<Location> {
    fetch_location(conn, id)
        .await?
        .ok_or_else(|| StoreError::not_found("Location", id.to_string()))
}

/// Writes every mutable column of an existing location.
async fn save_location(conn: &mut SqliteConnection, location: &Location) -> StoreResult<()> {
    location.validate()?;

    sqlx::query(
        r#"
        UPDATE locations
        SET name = ?, address = ?, facilities = ?, lng = ?, lat = ?,
            opening_times = ?, rating = ?, reviews = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&location.name)
    .bind(&location.address)
    .bind(serde_json::to_string(&location.facilities)?)
    .bind(location.coords.lng)
    .bind(location.coords.lat)
    .bind(serde_json::to_string(&location.opening_times)?)
    .bind(location.rating)
    .bind(serde_json::to_string(&location.reviews)?)
    .bind(format_timestamp(&location.updated_at))
    .bind(location.id.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// SQLite-backed store.
#[derive(Clone)]
pub struct SqliteLocationStore {
    pool: Pool<Sqlite>,
}

impl std::fmt::Debug for SqliteLocationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteLocationStore").finish_non_exhaustive()
    }
}

impl SqliteLocationStore {
    /// Wraps an existing pool. Call [`init`](Self::init) before use.
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Opens a pool for `database_url` and creates the schema.
    ///
    /// In-memory databases are private to a connection, so they get a pool
    /// of one.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let options = SqliteConnectOptions::from_str(database_url)?.busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let store = Self::new(pool);
        store.init().await?;
        Ok(store)
    }

    /// Creates tables and indexes if they do not exist.
    pub async fn init(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(*statement).execute(&self.pool).await?;
        }
        tracing::debug!("Location store schema ready");
        Ok(())
    }

    /// Begins a transaction that holds the write lock from its first read.
    async fn begin_write(&self) -> StoreResult<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin_with("BEGIN IMMEDIATE").await?)
    }
}

#[async_trait]
impl LocationStore for SqliteLocationStore {
    // =========================================================================
    // Location operations
    // =========================================================================

    async fn create_location(&self, location: Location) -> StoreResult<Location> {
        location.validate()?;

        let result = sqlx::query(&format!(
            "INSERT INTO locations ({LOCATION_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(location.id.to_string())
        .bind(&location.name)
        .bind(&location.address)
        .bind(serde_json::to_string(&location.facilities)?)
        .bind(location.coords.lng)
        .bind(location.coords.lat)
        .bind(serde_json::to_string(&location.opening_times)?)
        .bind(location.rating)
        .bind(serde_json::to_string(&location.reviews)?)
        .bind(format_timestamp(&location.created_at))
        .bind(format_timestamp(&location.updated_at))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(location),
            Err(e) if is_unique_violation(&e) => Err(StoreError::already_exists(
                "Location",
                location.id.to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_location(&self, id: Uuid) -> StoreResult<Option<Location>> {
        let mut conn = self.pool.acquire().await?;
        fetch_location(&mut *conn, id).await
    }

    async fn list_locations_near(
        &self,
        query: ProximityQuery,
    ) -> StoreResult<Vec<NearbyLocation>> {
        let span = GeoPoint::latitude_span(query.max_distance_meters);

        let rows: Vec<LocationRow> = sqlx::query_as(&format!(
            "SELECT {LOCATION_COLUMNS} FROM locations WHERE lat BETWEEN ? AND ? ORDER BY created_at"
        ))
        .bind(query.origin.lat - span)
        .bind(query.origin.lat + span)
        .fetch_all(&self.pool)
        .await?;

        let candidates = rows
            .into_iter()
            .map(Location::try_from)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(query.rank(candidates))
    }

    async fn update_location(&self, id: Uuid, patch: LocationPatch) -> StoreResult<Location> {
        let mut tx = self.begin_write().await?;

        let mut location = fetch_location_for_update(&mut *tx, id).await?;
        location.apply(patch);
        save_location(&mut *tx, &location).await?;

        tx.commit().await?;
        Ok(location)
    }

    async fn delete_location(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM locations WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Location", id.to_string()));
        }
        Ok(())
    }

    async fn set_location_rating(&self, id: Uuid, rating: f64) -> StoreResult<()> {
        if !is_valid_rating(rating) {
            return Err(StoreError::Other(format!("rating out of range: {rating}")));
        }

        let result = sqlx::query("UPDATE locations SET rating = ? WHERE id = ?")
            .bind(rating)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Location", id.to_string()));
        }
        Ok(())
    }

    // =========================================================================
    // Review operations
    // =========================================================================

    async fn add_review(&self, location_id: Uuid, review: Review) -> StoreResult<Review> {
        review.validate()?;

        let mut tx = self.begin_write().await?;

        let mut location = fetch_location_for_update(&mut *tx, location_id).await?;
        location.reviews.push(review.clone());
        location.updated_at = Utc::now();
        save_location(&mut *tx, &location).await?;

        tx.commit().await?;
        Ok(review)
    }

    async fn update_review(
        &self,
        location_id: Uuid,
        review_id: Uuid,
        patch: ReviewPatch,
    ) -> StoreResult<Review> {
        let mut tx = self.begin_write().await?;

        let mut location = fetch_location_for_update(&mut *tx, location_id).await?;
        let review = location
            .review_mut(review_id)
            .ok_or_else(|| StoreError::not_found("Review", review_id.to_string()))?;
        review.apply(patch);
        let review = review.clone();
        location.updated_at = Utc::now();
        save_location(&mut *tx, &location).await?;

        tx.commit().await?;
        Ok(review)
    }

    async fn delete_review(&self, location_id: Uuid, review_id: Uuid) -> StoreResult<()> {
        let mut tx = self.begin_write().await?;

        let mut location = fetch_location_for_update(&mut *tx, location_id).await?;
        if location.remove_review(review_id).is_none() {
            return Err(StoreError::not_found("Review", review_id.to_string()));
        }
        location.updated_at = Utc::now();
        save_location(&mut *tx, &location).await?;

        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    // User operations
    // =========================================================================

    async fn create_user(&self, user: User) -> StoreResult<User> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, email, name, password_hash, salt, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(&user.salt)
        .bind(format_timestamp(&user.created_at))
        .bind(format_timestamp(&user.updated_at))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(user),
            Err(e) if is_unique_violation(&e) => {
                Err(StoreError::already_exists("User", user.email.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, name, password_hash, salt, created_at, updated_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }
}
