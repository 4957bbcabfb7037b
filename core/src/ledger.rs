//! Per-mode ledger of previously drawn numbers.
//!
//! One append-only text file per mode, one masked line per number.
//! The full set is cached in memory at construction — `contains`
//! never touches the disk. The ledger is an audit trail, not an
//! exclusion filter: the engine may draw a recorded number again.

use crate::codec::Codec;
use crate::error::DrawResult;
use crate::types::{Mode, Number};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct LedgerStore {
    dir: PathBuf,
    codec: Codec,
    cache: BTreeMap<Mode, BTreeSet<Number>>,
}

impl LedgerStore {
    /// Open the ledger directory, creating it if missing, and load
    /// every mode's file into the cache. Unreadable files and
    /// unparsable lines are skipped; they never fail construction.
    pub fn open(dir: impl Into<PathBuf>, codec: Codec) -> DrawResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let mut cache = BTreeMap::new();
        for mode in Mode::ALL {
            cache.insert(mode, Self::load_mode(&dir, &codec, mode));
        }
        Ok(Self { dir, codec, cache })
    }

    fn file_for(dir: &Path, mode: Mode) -> PathBuf {
        dir.join(format!("{}.led", mode.as_str()))
    }

    fn load_mode(dir: &Path, codec: &Codec, mode: Mode) -> BTreeSet<Number> {
        let Ok(content) = fs::read_to_string(Self::file_for(dir, mode)) else {
            return BTreeSet::new();
        };
        let mut numbers = BTreeSet::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match codec.unmask(line).map(|s| s.parse::<Number>()) {
                Ok(Ok(n)) if n >= 1 => {
                    numbers.insert(n);
                }
                _ => log::warn!("ledger {mode}: skipping unreadable line"),
            }
        }
        numbers
    }

    pub fn contains(&self, mode: Mode, number: Number) -> bool {
        self.cache.get(&mode).is_some_and(|s| s.contains(&number))
    }

    /// Every number recorded for `mode`.
    pub fn numbers(&self, mode: Mode) -> BTreeSet<Number> {
        self.cache.get(&mode).cloned().unwrap_or_default()
    }

    /// Append `numbers` to the mode's file, one masked line each.
    /// Append-only: prior lines are never rewritten, so a failed
    /// append cannot lose history. Returns false (and logs) on
    /// failure; the cache is only updated after a successful write.
    pub fn append(&mut self, mode: Mode, numbers: &BTreeSet<Number>) -> bool {
        if numbers.is_empty() {
            return true;
        }
        match self.try_append(mode, numbers) {
            Ok(()) => true,
            Err(e) => {
                log::error!("ledger {mode}: append failed: {e}");
                false
            }
        }
    }

    fn try_append(&mut self, mode: Mode, numbers: &BTreeSet<Number>) -> DrawResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(Self::file_for(&self.dir, mode))?;
        for n in numbers {
            writeln!(file, "{}", self.codec.mask(&n.to_string()))?;
        }
        self.cache.entry(mode).or_default().extend(numbers.iter().copied());
        Ok(())
    }

    /// Bulk-import plaintext history: one candidate per line, ASCII
    /// digits only, anything else ignored. Rejects a source that
    /// yields zero valid numbers — nothing is written in that case.
    pub fn import(&mut self, mode: Mode, source: &str) -> bool {
        let numbers: BTreeSet<Number> = source
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && l.bytes().all(|b| b.is_ascii_digit()))
            .filter_map(|l| l.parse().ok())
            .filter(|&n| n >= 1)
            .collect();
        if numbers.is_empty() {
            log::warn!("ledger {mode}: import yielded no valid numbers, nothing written");
            return false;
        }
        self.append(mode, &numbers)
    }

    /// Truncate one mode's file, or every mode's, and clear the cache.
    pub fn reset(&mut self, mode: Option<Mode>) -> bool {
        let modes: Vec<Mode> = match mode {
            Some(m) => vec![m],
            None => Mode::ALL.to_vec(),
        };
        let mut ok = true;
        for m in modes {
            match fs::write(Self::file_for(&self.dir, m), "") {
                Ok(()) => {
                    self.cache.insert(m, BTreeSet::new());
                }
                Err(e) => {
                    log::error!("ledger {m}: reset failed: {e}");
                    ok = false;
                }
            }
        }
        ok
    }
}
