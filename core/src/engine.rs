//! The draw engine — one pick at a time.
//!
//! PICK PRIORITY (fixed, never reordered):
//!   1. Pending chain target, when still available. Rate evaluation
//!      is skipped for this pick and the target's counter stays put.
//!   2. Rate rules that fired this round (uniform among them).
//!   3. Plain randomness over the rate-pruned pool, falling back to
//!      the full pool when pruning leaves nothing.
//!
//! After every accepted pick the chain rules run against the
//! remaining pool, so a firing is honored by the very next pick of
//! the same batch. The engine always produces a number while the
//! pool is non-empty, even with completely unreadable rule stores —
//! broken rules degrade to "no rules configured".

use crate::{
    audit::{AuditSink, DrawRecord, DrawSource, PersonInfo},
    codec::KeyRing,
    config::DataPaths,
    error::DrawResult,
    ledger::LedgerStore,
    rng::DrawRng,
    roster::RosterStore,
    store::RuleStore,
    types::{Gender, Mode, Number},
};
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

pub struct DrawEngine {
    ledger: LedgerStore,
    roster: RosterStore,
    rules: RuleStore,
    rng: DrawRng,
    /// Pending chain targets, one slot per mode. Set when a chain
    /// rule fires, cleared the moment the target is drawn. Never
    /// persisted — a restart forgets an unconsumed target.
    pending: BTreeMap<Mode, Number>,
    sink: Box<dyn AuditSink>,
}

/// Outcome of one batch of draws.
#[derive(Debug, Clone)]
pub struct DrawBatch {
    /// Accepted numbers, in draw order.
    pub numbers: Vec<Number>,
    /// One record per accepted number.
    pub records: Vec<DrawRecord>,
    /// True when the filtered pool ran out before the requested count.
    pub pool_exhausted: bool,
}

impl DrawEngine {
    pub fn new(
        ledger: LedgerStore,
        roster: RosterStore,
        rules: RuleStore,
        rng: DrawRng,
        sink: Box<dyn AuditSink>,
    ) -> Self {
        Self {
            ledger,
            roster,
            rules,
            rng,
            pending: BTreeMap::new(),
            sink,
        }
    }

    /// Wire an engine over the standard on-disk layout.
    pub fn open(paths: &DataPaths, seed: u64, sink: Box<dyn AuditSink>) -> DrawResult<Self> {
        paths.bootstrap()?;
        let ledger = LedgerStore::open(paths.ledger_dir(), KeyRing::ledger())?;
        let roster = RosterStore::open(paths.roster_dir())?;
        let rules = RuleStore::open(paths.rules_db())?;
        Ok(Self::new(ledger, roster, rules, DrawRng::new(seed), sink))
    }

    pub fn ledger(&self) -> &LedgerStore {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut LedgerStore {
        &mut self.ledger
    }

    pub fn roster(&self) -> &RosterStore {
        &self.roster
    }

    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    /// The chain target currently owed in `mode`, if any.
    pub fn pending_target(&self, mode: Mode) -> Option<Number> {
        self.pending.get(&mode).copied()
    }

    /// Draw `quantity` numbers without replacement from 1..=max_number,
    /// optionally restricted to one gender.
    pub fn draw_batch(
        &mut self,
        mode: Mode,
        max_number: Number,
        quantity: usize,
        gender: Option<Gender>,
    ) -> DrawBatch {
        self.draw_from_pool(mode, (1..=max_number).collect(), quantity, gender)
    }

    /// Draw `quantity` numbers without replacement from an explicit
    /// pool. Each pick runs the full priority ladder; the ledger is
    /// appended once, at batch end, with everything drawn. Previously
    /// recorded numbers are NOT excluded — the ledger is audit-only.
    pub fn draw_from_pool(
        &mut self,
        mode: Mode,
        pool: BTreeSet<Number>,
        quantity: usize,
        gender: Option<Gender>,
    ) -> DrawBatch {
        let filter = gender.map(|g| self.roster.numbers_for(g));
        let mut available: BTreeSet<Number> = match &filter {
            Some(f) => pool.intersection(f).copied().collect(),
            None => pool,
        };

        let batch_id = Uuid::new_v4().to_string();
        let mut numbers = Vec::new();
        let mut records = Vec::new();
        for _ in 0..quantity {
            if available.is_empty() {
                break;
            }
            let record = self.draw_one(mode, &mut available, filter.as_ref(), gender, &batch_id);
            numbers.push(record.drawn_number);
            self.sink.emit(&record);
            records.push(record);
        }

        if numbers.is_empty() {
            log::info!("draw {mode}: no drawable numbers in the filtered pool");
        } else {
            let drawn_set: BTreeSet<Number> = numbers.iter().copied().collect();
            self.ledger.append(mode, &drawn_set);
        }

        let pool_exhausted = numbers.len() < quantity;
        DrawBatch {
            numbers,
            records,
            pool_exhausted,
        }
    }

    /// One pick. `available` must be non-empty; the drawn number is
    /// removed from it before chain evaluation runs.
    fn draw_one(
        &mut self,
        mode: Mode,
        available: &mut BTreeSet<Number>,
        filter: Option<&BTreeSet<Number>>,
        gender: Option<Gender>,
        batch_id: &str,
    ) -> DrawRecord {
        let pending = self.pending.get(&mode).copied();
        let mut rate_info = Vec::new();

        let (number, source) = if let Some(target) = pending.filter(|t| available.contains(t)) {
            self.pending.remove(&mode);
            log::debug!("draw {mode}: owed chain target {target}");
            (target, DrawSource::ChainTarget)
        } else {
            let outcome = self.rules.check_and_advance(mode, available, filter, pending);
            rate_info = outcome.info;
            if let Some(n) = self.rng.choose(&outcome.fired) {
                (n, DrawSource::RateTriggered)
            } else {
                let normal: Vec<Number> = outcome.survivors.iter().copied().collect();
                if let Some(n) = self.rng.choose(&normal) {
                    (n, DrawSource::Random)
                } else {
                    // Every candidate is rate-suppressed; a pick must
                    // still happen while the pool is non-empty.
                    let all: Vec<Number> = available.iter().copied().collect();
                    let idx = self.rng.next_u64_below(all.len() as u64) as usize;
                    (all[idx], DrawSource::Fallback)
                }
            }
        };

        available.remove(&number);

        // A chain effect set up by this pick applies to the next one.
        // Evaluation sees the remaining pool, so a recorded firing is
        // always honorable.
        let firings = self.rules.check_and_fire(mode, &[number], available, filter);
        if let Some(f) = firings.last() {
            self.pending.insert(mode, f.target);
        }

        DrawRecord {
            batch_id: batch_id.to_string(),
            mode,
            drawn_number: number,
            source,
            rate_info,
            chain_info: firings,
            person: self.roster.resolve(number).map(|(name, g)| PersonInfo {
                name: name.to_string(),
                gender: g,
            }),
            gender_restriction: gender,
            time: Utc::now(),
        }
    }
}
