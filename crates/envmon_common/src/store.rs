//! Reading storage.
//!
//! Schema:
//! - readings: timestamp (unix ms) plus one column per metric
//!
//! The query path only ever reads a single projected column ordered by time.

use crate::metric::MetricType;
use crate::reading::{DataPoint, NewReading};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Default readings database path
pub const READINGS_DB_PATH: &str = "/var/lib/envmon/readings.db";

/// Storage failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("no reading store configured")]
    NotConfigured,

    #[error("store connection lock poisoned")]
    Poisoned,

    #[error("stored timestamp out of range: {0}")]
    InvalidTimestamp(i64),
}

/// Read/write access to stored readings
pub trait ReadingStore: Send + Sync {
    /// Points of one metric with `timestamp >= since`, oldest first
    fn readings_since(
        &self,
        metric: MetricType,
        since: DateTime<Utc>,
    ) -> Result<Vec<DataPoint>, StoreError>;

    /// Store one reading, returning its id
    fn insert(&self, reading: &NewReading) -> Result<i64, StoreError>;

    /// Store many readings in one transaction
    fn insert_batch(&self, readings: &[NewReading]) -> Result<usize, StoreError>;

    /// Delete every reading, returning how many were removed
    fn clear(&self) -> Result<usize, StoreError>;

    fn count(&self) -> Result<u64, StoreError>;
}

/// SQLite-backed reading store
pub struct SqliteReadingStore {
    conn: Mutex<Connection>,
}

impl SqliteReadingStore {
    /// Open at a specific path (for testing or the daemon)
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;

        // WAL lets the CLI seed while the daemon reads
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        Self::init(conn)
    }

    /// Non-persistent store, mainly for tests
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS readings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp_ms INTEGER NOT NULL,
                temperature REAL NOT NULL,
                humidity REAL NOT NULL,
                power_consumption REAL NOT NULL,
                rms_current REAL NOT NULL,
                air_quality INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_readings_timestamp ON readings(timestamp_ms);
            "#,
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

const INSERT_SQL: &str = "INSERT INTO readings
    (timestamp_ms, temperature, humidity, power_consumption, rms_current, air_quality)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

impl ReadingStore for SqliteReadingStore {
    fn readings_since(
        &self,
        metric: MetricType,
        since: DateTime<Utc>,
    ) -> Result<Vec<DataPoint>, StoreError> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT timestamp_ms, {} FROM readings
             WHERE timestamp_ms >= ?1
             ORDER BY timestamp_ms ASC, id ASC",
            metric.column()
        );
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt.query_map(params![since.timestamp_millis()], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?))
        })?;

        let mut points = Vec::new();
        for row in rows {
            let (ms, value) = row?;
            let timestamp =
                DateTime::from_timestamp_millis(ms).ok_or(StoreError::InvalidTimestamp(ms))?;
            points.push(DataPoint::new(timestamp, value));
        }
        Ok(points)
    }

    fn insert(&self, reading: &NewReading) -> Result<i64, StoreError> {
        let conn = self.conn()?;
        conn.execute(
            INSERT_SQL,
            params![
                reading.timestamp.timestamp_millis(),
                reading.temperature,
                reading.humidity,
                reading.power_consumption,
                reading.rms_current,
                reading.air_quality
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn insert_batch(&self, readings: &[NewReading]) -> Result<usize, StoreError> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(INSERT_SQL)?;
            for reading in readings {
                stmt.execute(params![
                    reading.timestamp.timestamp_millis(),
                    reading.temperature,
                    reading.humidity,
                    reading.power_consumption,
                    reading.rms_current,
                    reading.air_quality
                ])?;
            }
        }
        tx.commit()?;
        Ok(readings.len())
    }

    fn clear(&self) -> Result<usize, StoreError> {
        let conn = self.conn()?;
        Ok(conn.execute("DELETE FROM readings", [])?)
    }

    fn count(&self) -> Result<u64, StoreError> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM readings", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
