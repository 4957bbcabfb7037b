//! Structured draw records and the sinks that carry them.
//!
//! Every accepted pick emits one DrawRecord. Delivery is
//! fire-and-forget: a sink that fails to write must never abort the
//! draw that produced the record.

use crate::codec::{Codec, KeyRing};
use crate::store::{ChainFiring, RateInfo};
use crate::types::{Gender, Mode, Number};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// One decision record per accepted pick: what was drawn, which
/// branch of the pick state machine produced it, every rate rule
/// evaluated, any chain firings it set off, and the filter in force.
#[derive(Debug, Clone, Serialize)]
pub struct DrawRecord {
    pub batch_id: String,
    pub mode: Mode,
    pub drawn_number: Number,
    pub source: DrawSource,
    pub rate_info: Vec<RateInfo>,
    pub chain_info: Vec<ChainFiring>,
    pub person: Option<PersonInfo>,
    pub gender_restriction: Option<Gender>,
    pub time: DateTime<Utc>,
}

/// Which branch of the pick state machine produced the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawSource {
    /// A pending chain target was owed and still available.
    ChainTarget,
    /// Chosen uniformly among the rate rules that fired.
    RateTriggered,
    /// Plain randomness over the rate-pruned pool.
    Random,
    /// Every candidate was rate-suppressed; fell back to the full pool.
    Fallback,
}

/// Roster resolution for the drawn number, when known.
#[derive(Debug, Clone, Serialize)]
pub struct PersonInfo {
    pub name: String,
    pub gender: Gender,
}

pub trait AuditSink {
    fn emit(&mut self, record: &DrawRecord);
}

/// Writes each record to the `log` facade as one JSON line.
pub struct LogAuditSink;

impl AuditSink for LogAuditSink {
    fn emit(&mut self, record: &DrawRecord) {
        match serde_json::to_string(record) {
            Ok(json) => log::info!(target: "numdraw::audit", "{json}"),
            Err(e) => log::warn!("audit record not serializable: {e}"),
        }
    }
}

/// Appends one masked JSON line per record to a file. Masking uses
/// the audit key — same casual-tamper resistance as the ledger.
pub struct FileAuditSink {
    path: PathBuf,
    codec: Codec,
}

impl FileAuditSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            codec: KeyRing::audit(),
        }
    }
}

impl AuditSink for FileAuditSink {
    fn emit(&mut self, record: &DrawRecord) {
        let Ok(json) = serde_json::to_string(record) else {
            log::warn!("audit record not serializable, dropped");
            return;
        };
        let masked = self.codec.mask(&json);
        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut f| writeln!(f, "{masked}"));
        if let Err(e) = written {
            log::warn!("audit append failed: {e}");
        }
    }
}

/// Keeps records in memory. Test helper.
#[derive(Default)]
pub struct MemoryAuditSink {
    pub records: Vec<DrawRecord>,
}

impl AuditSink for MemoryAuditSink {
    fn emit(&mut self, record: &DrawRecord) {
        self.records.push(record.clone());
    }
}
