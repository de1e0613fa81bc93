//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The mapping engine hands over storage rows; it never executes SQL.

use crate::error::ReportResult;
use rusqlite::Connection;

mod audit;
mod records;

pub use records::create_table_sql;

pub struct ReportStore {
    conn: Connection,
}

impl ReportStore {
    /// Open (or create) the report database at `path`.
    pub fn open(path: &str) -> ReportResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only applies to real files; :memory: ignores it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> ReportResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> ReportResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_ingest_log.sql"))?;
        Ok(())
    }
}
