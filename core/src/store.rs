//! SQLite persistence for rate and chain rules.
//!
//! RULE: only store.rs and its submodules talk to the database.
//! The engine calls store methods — it never executes SQL directly.
//!
//! Rules used to live as one file per (mode, number); the keyed
//! tables keep the same set/list/clear-by-mode contract without
//! filesystem scanning.

use crate::error::DrawResult;
use crate::types::Mode;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;

mod chain;
mod rate;

pub use chain::{ChainFiring, ChainRuleRow};
pub use rate::{RateInfo, RateOutcome, RateRuleRow};

pub struct RuleStore {
    conn: Connection,
}

impl RuleStore {
    /// Open (or create) the rule database at `path`.
    pub fn open(path: impl AsRef<Path>) -> DrawResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        // WAL mode: readers never block the writer.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> DrawResult<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> DrawResult<()> {
        self.conn
            .execute_batch(include_str!("../migrations/001_rules.sql"))?;
        Ok(())
    }

    /// Delete every row of `table`, or only one mode's rows.
    fn clear_table(&self, table: &str, mode: Option<Mode>) -> DrawResult<usize> {
        let deleted = match mode {
            Some(m) => self.conn.execute(
                &format!("DELETE FROM {table} WHERE mode = ?1"),
                params![m.as_str()],
            )?,
            None => self.conn.execute(&format!("DELETE FROM {table}"), [])?,
        };
        Ok(deleted)
    }
}

/// Timestamps are stored as RFC 3339 text; anything unparsable reads
/// back as None rather than failing the row.
fn parse_timestamp(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
