//! Rate rules: forced-periodic triggers.
//!
//! A rule (mode, number, rate) advances its counter once per
//! qualifying pick and fires when the counter lands on an exact
//! multiple of the rate. While a rule is not firing, its number is
//! suppressed from plain randomness — it can only be won when the
//! period comes due.

use super::{parse_timestamp, RuleStore};
use crate::error::{DrawError, DrawResult};
use crate::types::{Mode, Number};
use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::Serialize;
use std::collections::BTreeSet;

/// One persisted rate rule, as listed for display.
#[derive(Debug, Clone, Serialize)]
pub struct RateRuleRow {
    pub number: Number,
    pub rate: u32,
    pub count: u64,
    pub last_draw: Option<DateTime<Utc>>,
}

/// Per-rule diagnostic from one evaluation round. Carried on the
/// audit record.
#[derive(Debug, Clone, Serialize)]
pub struct RateInfo {
    pub number: Number,
    pub rate: u32,
    pub count: u64,
    pub fired: bool,
}

/// Result of [`RuleStore::check_and_advance`] for a single pick.
#[derive(Debug, Clone)]
pub struct RateOutcome {
    /// Numbers whose rule fired this round.
    pub fired: Vec<Number>,
    /// Diagnostics for every rule that was evaluated.
    pub info: Vec<RateInfo>,
    /// Candidates still eligible for plain randomness: the input pool
    /// minus every rate-controlled number that did not fire.
    pub survivors: BTreeSet<Number>,
}

impl RuleStore {
    /// Create or overwrite the rule for (mode, number). The rate is
    /// clamped to a minimum of 1 and the counter always restarts at
    /// zero. Returns false (and logs) on failure.
    pub fn set_rate(&self, mode: Mode, number: Number, rate: u32) -> bool {
        match self.try_set_rate(mode, number, rate) {
            Ok(()) => true,
            Err(e) => {
                log::error!("set_rate ({mode}, {number}): {e}");
                false
            }
        }
    }

    fn try_set_rate(&self, mode: Mode, number: Number, rate: u32) -> DrawResult<()> {
        if number == 0 {
            return Err(DrawError::Validation {
                field: "number",
                reason: "must be >= 1".into(),
            });
        }
        let rate = rate.max(1);
        self.conn.execute(
            "INSERT INTO rate_rule (mode, number, rate, count, last_draw)
             VALUES (?1, ?2, ?3, 0, NULL)
             ON CONFLICT (mode, number) DO UPDATE
             SET rate = excluded.rate, count = 0, last_draw = NULL",
            params![mode.as_str(), number, rate],
        )?;
        Ok(())
    }

    /// Evaluate every rate rule for `mode` whose number is in
    /// `candidates` (and in `gender_filter`, when one is given).
    ///
    /// Each qualifying rule's counter advances by one — except the
    /// pending chain target, which bypasses rate counting entirely.
    /// A rule fires when its counter is an exact multiple of its
    /// rate. The new counter and last_draw are persisted immediately,
    /// rule by rule, before the overall pick is decided: the counters
    /// are the durability boundary, not the draw.
    ///
    /// Numbers whose rule did not fire are removed from `survivors`;
    /// a suppressed number cannot be won through plain randomness.
    /// Numbers with no rule at all pass through untouched. Rows that
    /// fail to load are logged and skipped.
    pub fn check_and_advance(
        &self,
        mode: Mode,
        candidates: &BTreeSet<Number>,
        gender_filter: Option<&BTreeSet<Number>>,
        pending_target: Option<Number>,
    ) -> RateOutcome {
        let mut outcome = RateOutcome {
            fired: Vec::new(),
            info: Vec::new(),
            survivors: candidates.clone(),
        };
        let rows = match self.load_rate_rows(mode) {
            Ok(rows) => rows,
            Err(e) => {
                log::warn!("rate rules unreadable for {mode}: {e}");
                return outcome;
            }
        };
        for row in rows {
            if !candidates.contains(&row.number) {
                continue;
            }
            if let Some(filter) = gender_filter {
                if !filter.contains(&row.number) {
                    continue;
                }
            }

            // Chain targets skip rate counting.
            let is_chain_target = pending_target == Some(row.number);
            let count = if is_chain_target { row.count } else { row.count + 1 };
            let fired = count % u64::from(row.rate) == 0;

            if let Err(e) = self.persist_rate_count(mode, row.number, count) {
                log::warn!("rate rule ({mode}, {}): persist failed: {e}", row.number);
            }

            log::debug!(
                "rate ({mode}, {}): count {count}/{}{}",
                row.number,
                row.rate,
                if fired { " fired" } else { "" }
            );

            outcome.info.push(RateInfo {
                number: row.number,
                rate: row.rate,
                count,
                fired,
            });
            if fired {
                outcome.fired.push(row.number);
            } else {
                outcome.survivors.remove(&row.number);
            }
        }
        outcome
    }

    fn persist_rate_count(&self, mode: Mode, number: Number, count: u64) -> DrawResult<()> {
        self.conn.execute(
            "UPDATE rate_rule SET count = ?3, last_draw = ?4
             WHERE mode = ?1 AND number = ?2",
            params![mode.as_str(), number, count as i64, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Delete one mode's rate rules, or every mode's.
    pub fn clear_rates(&self, mode: Option<Mode>) -> bool {
        match self.clear_table("rate_rule", mode) {
            Ok(n) => {
                log::debug!("cleared {n} rate rules");
                true
            }
            Err(e) => {
                log::error!("clear_rates failed: {e}");
                false
            }
        }
    }

    /// Every rate rule, grouped by mode, numbers ascending. Modes
    /// with no rules are omitted.
    pub fn list_rates(&self) -> Vec<(Mode, Vec<RateRuleRow>)> {
        let mut grouped = Vec::new();
        for mode in Mode::ALL {
            match self.load_rate_rows(mode) {
                Ok(rows) if !rows.is_empty() => grouped.push((mode, rows)),
                Ok(_) => {}
                Err(e) => log::warn!("rate rules unreadable for {mode}: {e}"),
            }
        }
        grouped
    }

    fn load_rate_rows(&self, mode: Mode) -> DrawResult<Vec<RateRuleRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT number, rate, count, last_draw FROM rate_rule
             WHERE mode = ?1 ORDER BY number ASC",
        )?;
        let rows = stmt.query_map(params![mode.as_str()], |r| {
            Ok((
                r.get::<_, i64>(0)?,
                r.get::<_, i64>(1)?,
                r.get::<_, i64>(2)?,
                r.get::<_, Option<String>>(3)?,
            ))
        })?;
        let mut result = Vec::new();
        for row in rows {
            let Ok((number, rate, count, last_draw)) = row else {
                log::warn!("rate rule for {mode}: skipping unreadable row");
                continue;
            };
            let number = match u32::try_from(number) {
                Ok(n) if n >= 1 => n,
                _ => {
                    log::warn!("rate rule for {mode}: skipping row with bad number {number}");
                    continue;
                }
            };
            let rate = match u32::try_from(rate) {
                Ok(r) if r >= 1 => r,
                _ => {
                    log::warn!("rate rule ({mode}, {number}): skipping row with bad rate {rate}");
                    continue;
                }
            };
            result.push(RateRuleRow {
                number,
                rate,
                count: count.max(0) as u64,
                last_draw: parse_timestamp(last_draw),
            });
        }
        Ok(result)
    }
}
