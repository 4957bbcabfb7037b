//! On-disk layout of the engine's data directory.
//!
//! Everything lives under one root:
//!   <root>/records/   masked per-mode ledger files
//!   <root>/roster/    boys.txt / girls.txt
//!   <root>/rules.db   rate and chain rules (SQLite)
//!   <root>/audit.log  masked audit lines (when the file sink is used)

use crate::error::DrawResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    pub root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn ledger_dir(&self) -> PathBuf {
        self.root.join("records")
    }

    pub fn roster_dir(&self) -> PathBuf {
        self.root.join("roster")
    }

    pub fn rules_db(&self) -> PathBuf {
        self.root.join("rules.db")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.root.join("audit.log")
    }

    /// Create the directory tree if missing. Idempotent.
    pub fn bootstrap(&self) -> DrawResult<()> {
        fs::create_dir_all(self.ledger_dir())?;
        fs::create_dir_all(self.roster_dir())?;
        Ok(())
    }
}
