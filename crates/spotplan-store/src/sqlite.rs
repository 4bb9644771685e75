//! SQLite-backed record store for spots.
//!
//! One connection behind a mutex: every write is serialised, so two requests
//! racing on the same id resolve as last-writer-wins. The lock is only held
//! for the duration of a single synchronous call.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, error, info};

use crate::schema::SCHEMA_SQL;
use spotplan_core::{Error, Location, Result, Spot, SpotCategory, SpotDraft};

const DB_FILE: &str = "spots.db";

const SPOT_COLUMNS: &str = "id, name, city, category, description, recommended_time_hours, \
     target_audience_json, email, start_time, latitude, longitude, tags_json, \
     open_hours, entry_fee, created_at, updated_at";

/// SQLite store holding every spot record.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open or create the store.
    ///
    /// `db_dir` is the data directory (e.g., `data/`). The file will be `db_dir/spots.db`.
    pub fn open(db_dir: impl AsRef<Path>) -> Result<Self> {
        let db_dir = db_dir.as_ref();
        std::fs::create_dir_all(db_dir).map_err(|e| Error::Storage(e.to_string()))?;
        let db_path = db_dir.join(DB_FILE);

        let conn = Connection::open(&db_path).map_err(storage_err)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(storage_err)?;
        Self::init_schema(&conn)?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path: Some(db_path),
        };
        info!(
            "SqliteStore initialized: {} spots, path={}",
            store.count()?,
            store.db_path().map(|p| p.display().to_string()).unwrap_or_default()
        );
        Ok(store)
    }

    /// Open a throwaway in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(storage_err)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Storage(format!("Schema init failed: {}", e)))
    }

    /// Path of the database file, `None` for in-memory stores.
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    // ---------------------------------------------------------------
    // Spot CRUD
    // ---------------------------------------------------------------

    /// Validate, assign an id, and persist a new spot.
    pub fn create(&self, draft: &SpotDraft) -> Result<Spot> {
        draft.check()?;
        let spot = Spot {
            id: uuid::Uuid::new_v4().to_string(),
            fields: draft.clone(),
            created_at: now_millis(),
            updated_at: None,
        };

        let conn = self.conn.lock();
        insert_spot(&conn, &spot)?;
        debug!("Stored spot {} ({})", spot.id, spot.fields.name);
        Ok(spot)
    }

    /// Get a spot by id.
    pub fn get(&self, id: &str) -> Result<Option<Spot>> {
        let conn = self.conn.lock();
        let sql = format!("SELECT {} FROM spots WHERE id = ?1", SPOT_COLUMNS);
        let spot = conn
            .prepare_cached(&sql)
            .map_err(storage_err)?
            .query_row(params![id], row_to_spot)
            .optional()
            .map_err(storage_err)?;
        Ok(spot)
    }

    /// All spots in insertion order.
    pub fn list(&self) -> Result<Vec<Spot>> {
        let conn = self.conn.lock();
        let sql = format!("SELECT {} FROM spots ORDER BY rowid ASC", SPOT_COLUMNS);
        let mut stmt = conn.prepare_cached(&sql).map_err(storage_err)?;
        let rows = stmt.query_map([], row_to_spot).map_err(storage_err)?;
        let spots = rows
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(storage_err)?;
        Ok(spots)
    }

    /// Replace every mutable field of an existing spot.
    pub fn update(&self, id: &str, draft: &SpotDraft) -> Result<Spot> {
        draft.check()?;
        let now = now_millis();
        let location = draft.location;

        let conn = self.conn.lock();
        let count = conn
            .prepare_cached(
                "UPDATE spots SET name = ?1, city = ?2, category = ?3, description = ?4, \
                 recommended_time_hours = ?5, target_audience_json = ?6, email = ?7, \
                 start_time = ?8, latitude = ?9, longitude = ?10, tags_json = ?11, \
                 open_hours = ?12, entry_fee = ?13, updated_at = ?14 WHERE id = ?15",
            )
            .map_err(storage_err)?
            .execute(params![
                draft.name,
                draft.city,
                draft.category.as_str(),
                draft.description,
                draft.recommended_time_hours,
                serde_json::to_string(&draft.target_audience)?,
                draft.email,
                draft.start_time,
                location.map(|l| l.latitude),
                location.map(|l| l.longitude),
                serde_json::to_string(&draft.tags)?,
                draft.open_hours,
                draft.entry_fee,
                now,
                id,
            ])
            .map_err(storage_err)?;
        if count == 0 {
            return Err(Error::spot_not_found(id));
        }

        let sql = format!("SELECT {} FROM spots WHERE id = ?1", SPOT_COLUMNS);
        let spot = conn
            .prepare_cached(&sql)
            .map_err(storage_err)?
            .query_row(params![id], row_to_spot)
            .map_err(storage_err)?;
        Ok(spot)
    }

    /// Permanently remove a spot.
    pub fn delete(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock();
        let count = conn
            .execute("DELETE FROM spots WHERE id = ?1", params![id])
            .map_err(storage_err)?;
        if count == 0 {
            return Err(Error::spot_not_found(id));
        }
        debug!("Deleted spot {}", id);
        Ok(())
    }

    /// Insert many drafts in one transaction. Returns how many were stored.
    ///
    /// Each draft is validated on its own; the caller is expected to have
    /// filtered out invalid ones, so any invalid draft here aborts the batch.
    pub fn bulk_create(&self, drafts: &[SpotDraft]) -> Result<usize> {
        for draft in drafts {
            draft.check()?;
        }
        let created_at = now_millis();

        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(storage_err)?;
        for draft in drafts {
            let spot = Spot {
                id: uuid::Uuid::new_v4().to_string(),
                fields: draft.clone(),
                created_at,
                updated_at: None,
            };
            insert_spot(&tx, &spot)?;
        }
        tx.commit().map_err(storage_err)?;
        debug!("Bulk stored {} spots", drafts.len());
        Ok(drafts.len())
    }

    /// Count stored spots.
    pub fn count(&self) -> Result<i64> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM spots", [], |row| row.get(0))
            .map_err(storage_err)?;
        Ok(count)
    }
}

fn insert_spot(conn: &Connection, spot: &Spot) -> Result<()> {
    let f = &spot.fields;
    conn.prepare_cached(
        "INSERT INTO spots (id, name, city, category, description, recommended_time_hours, \
         target_audience_json, email, start_time, latitude, longitude, tags_json, \
         open_hours, entry_fee, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
    )
    .map_err(storage_err)?
    .execute(params![
        spot.id,
        f.name,
        f.city,
        f.category.as_str(),
        f.description,
        f.recommended_time_hours,
        serde_json::to_string(&f.target_audience)?,
        f.email,
        f.start_time,
        f.location.map(|l| l.latitude),
        f.location.map(|l| l.longitude),
        serde_json::to_string(&f.tags)?,
        f.open_hours,
        f.entry_fee,
        spot.created_at,
    ])
    .map_err(storage_err)?;
    Ok(())
}

fn row_to_spot(row: &Row<'_>) -> rusqlite::Result<Spot> {
    let category: String = row.get("category")?;
    let category: SpotCategory = category
        .parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

    let latitude: Option<f64> = row.get("latitude")?;
    let longitude: Option<f64> = row.get("longitude")?;
    let location = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(Location { latitude, longitude }),
        _ => None,
    };

    Ok(Spot {
        id: row.get("id")?,
        fields: SpotDraft {
            name: row.get("name")?,
            city: row.get("city")?,
            category,
            description: row.get("description")?,
            recommended_time_hours: row.get("recommended_time_hours")?,
            target_audience: json_list(row, "target_audience_json", 6)?,
            email: row.get("email")?,
            start_time: row.get("start_time")?,
            location,
            tags: json_list(row, "tags_json", 11)?,
            open_hours: row.get("open_hours")?,
            entry_fee: row.get("entry_fee")?,
        },
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn json_list(row: &Row<'_>, column: &str, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(column)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn storage_err(e: rusqlite::Error) -> Error {
    error!("SQLite error: {}", e);
    Error::Storage(e.to_string())
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
