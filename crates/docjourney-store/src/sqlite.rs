//! SQLite script cache.
//!
//! One row per domain key. The store owns every write; ingestion goes
//! through [`ScriptStore::find_or_create`], which resolves concurrent
//! first-time inserts of the same key inside a single transaction instead
//! of letting the loser trip the uniqueness constraint.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use tracing::{debug, info};

use crate::schema::{SCHEMA_SQL, TOUCH_TRIGGER_SQL};
use crate::types::*;
use docjourney_core::{Error, Result};

const SELECT_COLUMNS: &str =
    "id, root_url, original_url, script_content, created_at, updated_at";

/// SQLite-backed script cache.
pub struct ScriptStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl ScriptStore {
    /// Open or create the store at `db_path`, creating the schema if absent.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| Error::Database(e.to_string()))?;
            }
        }

        let conn = Self::create_connection(&db_path)?;
        Self::init_schema(&conn)?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path,
        };

        info!(
            "ScriptStore initialized: {} cached scripts, path={}",
            store.count()?,
            store.db_path.display()
        );

        Ok(store)
    }

    fn create_connection(db_path: &Path) -> Result<Connection> {
        let conn = Connection::open(db_path).map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(conn)
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        let full_schema = format!("{}\n{}", SCHEMA_SQL, TOUCH_TRIGGER_SQL);
        conn.execute_batch(&full_schema)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))?;
        Ok(())
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    // ---------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------

    /// Look up the cached script for a domain key.
    pub fn get(&self, root_url: &str) -> Result<Option<DocumentationScript>> {
        let conn = self.conn.lock();
        Self::select_by_key(&conn, root_url)
    }

    /// List every cached script, oldest first.
    pub fn list(&self) -> Result<Vec<ScriptSummary>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT root_url, original_url, created_at
                 FROM documentation_scripts ORDER BY created_at, id",
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ScriptSummary {
                    root_url: row.get(0)?,
                    original_url: row.get(1)?,
                    created_at: timestamp_column(row, 2)?,
                })
            })
            .map_err(|e| Error::Database(e.to_string()))?;

        let scripts = rows
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(scripts)
    }

    /// Number of cached scripts.
    pub fn count(&self) -> Result<i64> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM documentation_scripts", [], |row| {
                row.get(0)
            })
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(count)
    }

    // ---------------------------------------------------------------
    // Writes
    // ---------------------------------------------------------------

    /// Insert a new script. Fails with [`Error::DuplicateKey`] if the key is
    /// already cached.
    pub fn put(
        &self,
        root_url: &str,
        original_url: &str,
        script_content: &str,
    ) -> Result<DocumentationScript> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::Database(e.to_string()))?;

        let now = now_timestamp();
        tx.execute(
            "INSERT INTO documentation_scripts
                 (root_url, original_url, script_content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![root_url, original_url, script_content, now],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::DuplicateKey(root_url.to_string())
            } else {
                Error::Database(e.to_string())
            }
        })?;

        let row = Self::select_by_key(&tx, root_url)?
            .ok_or_else(|| Error::Internal(format!("inserted row for {} vanished", root_url)))?;
        tx.commit().map_err(|e| Error::Database(e.to_string()))?;

        debug!("Cached script for {} ({} chars)", root_url, script_content.len());
        Ok(row)
    }

    /// Insert a script unless one already exists for the key.
    ///
    /// Returns the row now stored for the key and whether this call created
    /// it. When another writer got there first, its row is returned and the
    /// given content is discarded.
    pub fn find_or_create(
        &self,
        root_url: &str,
        original_url: &str,
        script_content: &str,
    ) -> Result<(DocumentationScript, bool)> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::Database(e.to_string()))?;

        let now = now_timestamp();
        let inserted = tx
            .execute(
                "INSERT INTO documentation_scripts
                     (root_url, original_url, script_content, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)
                 ON CONFLICT(root_url) DO NOTHING",
                params![root_url, original_url, script_content, now],
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        let row = Self::select_by_key(&tx, root_url)?
            .ok_or_else(|| Error::Internal(format!("no row for {} after upsert", root_url)))?;
        tx.commit().map_err(|e| Error::Database(e.to_string()))?;

        let created = inserted == 1;
        if created {
            debug!("Cached script for {} ({} chars)", root_url, script_content.len());
        } else {
            debug!("Script for {} already cached, keeping existing row", root_url);
        }
        Ok((row, created))
    }

    // ---------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------

    fn select_by_key(conn: &Connection, root_url: &str) -> Result<Option<DocumentationScript>> {
        conn.prepare_cached(&format!(
            "SELECT {} FROM documentation_scripts WHERE root_url = ?1",
            SELECT_COLUMNS
        ))
        .map_err(|e| Error::Database(e.to_string()))?
        .query_row(params![root_url], Self::row_to_script)
        .optional()
        .map_err(|e| Error::Database(e.to_string()))
    }

    fn row_to_script(row: &rusqlite::Row<'_>) -> rusqlite::Result<DocumentationScript> {
        Ok(DocumentationScript {
            id: row.get(0)?,
            root_url: row.get(1)?,
            original_url: row.get(2)?,
            script_content: row.get(3)?,
            created_at: timestamp_column(row, 4)?,
            updated_at: timestamp_column(row, 5)?,
        })
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn timestamp_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation
    )
}
