//! SQLite storage for call logs.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::types::orders::OrderSet;
use crate::{EvalError, EvalResult};

use super::floats;
use super::record::CallRecord;
use super::store::LogStore;

/// Log stored in the `calls` table of an SQLite database.
///
/// Saves replace the table contents inside one transaction. SQLite reads a
/// bound NaN as NULL, so NaN values are kept in the `value_nan` flag.
pub struct SqliteStore {
    conn: Connection,
    location: String,
}

impl SqliteStore {
    /// Opens or creates the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> EvalResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        Self::with_connection(conn, path.display().to_string())
    }

    /// In-memory database, mostly for tests.
    pub fn in_memory() -> EvalResult<Self> {
        Self::with_connection(Connection::open_in_memory()?, ":memory:".to_string())
    }

    fn with_connection(conn: Connection, location: String) -> EvalResult<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS calls (
                idx INTEGER PRIMARY KEY,
                point TEXT NOT NULL,
                requested_orders TEXT NOT NULL,
                value REAL,
                value_nan INTEGER NOT NULL DEFAULT 0,
                error TEXT,
                recorded_at TEXT NOT NULL
            );
        "#,
        )?;

        Ok(Self { conn, location })
    }
}

impl LogStore for SqliteStore {
    fn load(&mut self) -> EvalResult<Vec<CallRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT idx, point, requested_orders, value, value_nan, error, recorded_at
             FROM calls ORDER BY idx",
        )?;

        let rows = stmt.query_map([], |row: &rusqlite::Row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<f64>>(3)?,
                row.get::<_, bool>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (idx, point, orders, value, value_nan, error, recorded_at) = row?;
            let point = floats::point_from_json(&point)?;
            let value = if value_nan { Some(f64::NAN) } else { value };
            let requested_orders: OrderSet = serde_json::from_str(&orders)?;
            let recorded_at = DateTime::parse_from_rfc3339(&recorded_at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| EvalError::log_store(format!("bad timestamp in row {}: {}", idx, e)))?;

            records.push(CallRecord {
                index: idx as u64,
                point,
                requested_orders,
                value,
                error,
                recorded_at,
            });
        }

        Ok(records)
    }

    fn save(&mut self, records: &[CallRecord]) -> EvalResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM calls", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO calls
                 (idx, point, requested_orders, value, value_nan, error, recorded_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )?;
            for record in records {
                stmt.execute(params![
                    record.index as i64,
                    floats::point_to_json(&record.point)?,
                    serde_json::to_string(&record.requested_orders)?,
                    record.value.filter(|v| !v.is_nan()),
                    record.value.is_some_and(f64::is_nan),
                    record.error,
                    record.recorded_at.to_rfc3339(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn location(&self) -> String {
        self.location.clone()
    }
}
