//! Per-day resume points for submission checks.
//!
//! The registry numbers the documents of a day with an increasing
//! `seqNumber`, so remembering how many documents of a day were already
//! looked at is enough to resume from the first new one.

use crate::api::{DocumentList, DocumentSummary};
use crate::error::{DataError, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

/// SQLite store of processed result counts, keyed by day.
#[derive(Debug)]
pub struct HistoryStore {
    conn: Connection,
}

impl HistoryStore {
    /// Open (or create) the database at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS list_counts (
                date TEXT PRIMARY KEY,
                result_count INTEGER NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Result count already processed for a day.
    pub fn get_count(&self, date: NaiveDate) -> Result<Option<u32>> {
        let result = self
            .conn
            .query_row(
                "SELECT result_count FROM list_counts WHERE date = ?1",
                params![date.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        Ok(result)
    }

    /// Record the result count processed for a day.
    pub fn put_count(&self, date: NaiveDate, count: u32) -> Result<()> {
        let updated_at = Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT OR REPLACE INTO list_counts (date, result_count, updated_at)
             VALUES (?1, ?2, ?3)",
            params![date.to_string(), count, updated_at],
        )?;

        Ok(())
    }

    /// Every recorded day with its count, oldest first.
    pub fn entries(&self) -> Result<Vec<(NaiveDate, u32)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT date, result_count FROM list_counts ORDER BY date")?;
        let rows = stmt.query_map([], |row| {
            let date: String = row.get(0)?;
            let count: u32 = row.get(1)?;
            Ok((date, count))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (date, count) = row?;
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map_err(|e| DataError::Parse(format!("Invalid history date {date}: {e}")))?;
            entries.push((date, count));
        }
        Ok(entries)
    }

    /// Forget every recorded day.
    pub fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM list_counts", [])?;
        Ok(())
    }
}

/// Documents of `list` not covered by a stored count.
///
/// With no stored count every document is new. A list whose count does not
/// exceed the stored one has nothing new; otherwise the documents numbered
/// past the stored count are returned.
pub fn new_documents(list: &DocumentList, stored: Option<u32>) -> Vec<&DocumentSummary> {
    let Some(stored) = stored else {
        return list.results.iter().collect();
    };
    if list.result_count() <= stored {
        return Vec::new();
    }
    list.results
        .iter()
        .filter(|doc| doc.seq_number > stored)
        .collect()
}
