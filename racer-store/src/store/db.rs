use std::{fs, path::Path};

use racer_core::{Ledger, StoreError};
use rusqlite::{params, Connection, OptionalExtension};

/// One track's row across the three ledger tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRow {
    pub track_id: String,
    pub best_time_ms: Option<u64>,
    pub creator_time_ms: Option<u64>,
    pub creator_beaten: bool,
}

/// SQLite-backed best-time ledger.
///
/// The schema matches the game's historical `best_times.db`, so existing
/// record files open unchanged.
pub struct SqliteLedger {
    conn: Connection,
}

impl SqliteLedger {
    /// Open (or create) the ledger database, creating its directory.
    ///
    /// Creator-beaten rows stored with a zero flag are dropped on open; an
    /// absent row already means "not beaten".
    pub fn open(path: &Path) -> Result<Self, String> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    format!("failed to create ledger dir {}: {e}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| format!("failed to open SQLite at {}: {e}", path.display()))?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA busy_timeout=5000;
             PRAGMA synchronous=NORMAL;",
        )
        .map_err(|e| format!("failed to set pragmas: {e}"))?;

        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, String> {
        let conn = Connection::open_in_memory()
            .map_err(|e| format!("failed to open in-memory SQLite: {e}"))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, String> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS best_times (
                track_id        TEXT PRIMARY KEY,
                best_time_ms    INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS creator_times (
                track_id        TEXT PRIMARY KEY,
                creator_time_ms INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS creator_beaten (
                track_id        TEXT PRIMARY KEY,
                beaten          INTEGER NOT NULL
             );",
        )
        .map_err(|e| format!("failed to create schema: {e}"))?;

        Ok(Self { conn })
    }

    fn read_time(&self, sql: &str, track_id: &str) -> Result<Option<u64>, String> {
        let value: Option<i64> = self
            .conn
            .query_row(sql, params![track_id], |row| row.get(0))
            .optional()
            .map_err(|e| format!("failed to read time for {track_id}: {e}"))?;
        value
            .map(|ms| {
                u64::try_from(ms).map_err(|_| format!("negative time {ms} stored for {track_id}"))
            })
            .transpose()
    }

    fn write(&self, sql: &str, params: impl rusqlite::Params, what: &str) -> Result<(), String> {
        self.conn
            .execute(sql, params)
            .map(|_| ())
            .map_err(|e| format!("failed to write {what}: {e}"))
    }

    /// Every track with at least one record, ordered by id.
    pub fn rows(&self) -> Result<Vec<LedgerRow>, String> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT ids.track_id, b.best_time_ms, c.creator_time_ms, f.beaten
                 FROM (
                    SELECT track_id FROM best_times
                    UNION SELECT track_id FROM creator_times
                    UNION SELECT track_id FROM creator_beaten
                 ) AS ids
                 LEFT JOIN best_times b ON b.track_id = ids.track_id
                 LEFT JOIN creator_times c ON c.track_id = ids.track_id
                 LEFT JOIN creator_beaten f ON f.track_id = ids.track_id
                 ORDER BY ids.track_id",
            )
            .map_err(|e| format!("failed to prepare ledger listing: {e}"))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<i64>>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                ))
            })
            .map_err(|e| format!("failed to list ledger rows: {e}"))?;

        let mut listing = Vec::new();
        for row in rows {
            let (track_id, best, creator, beaten) =
                row.map_err(|e| format!("failed to decode ledger row: {e}"))?;
            listing.push(LedgerRow {
                track_id,
                best_time_ms: best.and_then(|ms| u64::try_from(ms).ok()),
                creator_time_ms: creator.and_then(|ms| u64::try_from(ms).ok()),
                creator_beaten: beaten.is_some_and(|flag| flag != 0),
            });
        }
        Ok(listing)
    }
}

fn to_sql_ms(ms: u64) -> Result<i64, StoreError> {
    i64::try_from(ms).map_err(|_| StoreError::new(format!("time {ms} ms does not fit the ledger")))
}

impl Ledger for SqliteLedger {
    fn best_time(&self, track_id: &str) -> Result<Option<u64>, StoreError> {
        Ok(self.read_time(
            "SELECT best_time_ms FROM best_times WHERE track_id = ?1",
            track_id,
        )?)
    }

    fn set_best_time(&mut self, track_id: &str, ms: u64) -> Result<(), StoreError> {
        let ms = to_sql_ms(ms)?;
        Ok(self.write(
            "INSERT INTO best_times (track_id, best_time_ms) VALUES (?1, ?2)
             ON CONFLICT(track_id) DO UPDATE SET best_time_ms = excluded.best_time_ms",
            params![track_id, ms],
            "best time",
        )?)
    }

    fn clear_best_time(&mut self, track_id: &str) -> Result<(), StoreError> {
        Ok(self.write(
            "DELETE FROM best_times WHERE track_id = ?1",
            params![track_id],
            "best time",
        )?)
    }

    fn creator_time(&self, track_id: &str) -> Result<Option<u64>, StoreError> {
        Ok(self.read_time(
            "SELECT creator_time_ms FROM creator_times WHERE track_id = ?1",
            track_id,
        )?)
    }

    fn set_creator_time(&mut self, track_id: &str, ms: u64) -> Result<(), StoreError> {
        let ms = to_sql_ms(ms)?;
        Ok(self.write(
            "INSERT INTO creator_times (track_id, creator_time_ms) VALUES (?1, ?2)
             ON CONFLICT(track_id) DO UPDATE SET creator_time_ms = excluded.creator_time_ms",
            params![track_id, ms],
            "creator time",
        )?)
    }

    fn creator_beaten(&self, track_id: &str) -> Result<bool, StoreError> {
        let flag: Option<i64> = self
            .conn
            .query_row(
                "SELECT beaten FROM creator_beaten WHERE track_id = ?1",
                params![track_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| format!("failed to read creator flag for {track_id}: {e}"))?;
        Ok(flag.is_some_and(|flag| flag != 0))
    }

    fn set_creator_beaten(&mut self, track_id: &str) -> Result<(), StoreError> {
        Ok(self.write(
            "INSERT INTO creator_beaten (track_id, beaten) VALUES (?1, 1)
             ON CONFLICT(track_id) DO UPDATE SET beaten = excluded.beaten",
            params![track_id],
            "creator flag",
        )?)
    }

    fn clear_creator_beaten(&mut self, track_id: &str) -> Result<(), StoreError> {
        Ok(self.write(
            "DELETE FROM creator_beaten WHERE track_id = ?1",
            params![track_id],
            "creator flag",
        )?)
    }

    fn clear_all_best_times(&mut self) -> Result<(), StoreError> {
        Ok(self.write("DELETE FROM best_times", [], "best times")?)
    }

    fn clear_all_creator_beaten(&mut self) -> Result<(), StoreError> {
        Ok(self.write("DELETE FROM creator_beaten", [], "creator flags")?)
    }
}
