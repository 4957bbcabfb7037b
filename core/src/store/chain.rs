//! Chain rules: conditional follow-up triggers.
//!
//! A rule (mode, trigger, target) fires when `trigger` shows up among
//! the just-drawn numbers while `target` is still drawable; the
//! engine then owes `target` as its next pick in that mode.

use super::{parse_timestamp, RuleStore};
use crate::error::{DrawError, DrawResult};
use crate::types::{Mode, Number};
use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::Serialize;
use std::collections::BTreeSet;

/// One persisted chain rule, as listed for display.
#[derive(Debug, Clone, Serialize)]
pub struct ChainRuleRow {
    pub trigger: Number,
    pub target: Number,
    pub last_draw: Option<DateTime<Utc>>,
}

/// A chain rule that fired after a pick.
#[derive(Debug, Clone, Serialize)]
pub struct ChainFiring {
    pub trigger: Number,
    pub target: Number,
    pub fired_at: DateTime<Utc>,
}

impl RuleStore {
    /// Create or overwrite the rule keyed by (mode, trigger).
    /// Returns false (and logs) on failure.
    pub fn set_chain(&self, mode: Mode, trigger: Number, target: Number) -> bool {
        match self.try_set_chain(mode, trigger, target) {
            Ok(()) => true,
            Err(e) => {
                log::error!("set_chain ({mode}, {trigger} -> {target}): {e}");
                false
            }
        }
    }

    fn try_set_chain(&self, mode: Mode, trigger: Number, target: Number) -> DrawResult<()> {
        if trigger == 0 || target == 0 {
            return Err(DrawError::Validation {
                field: "number",
                reason: "trigger and target must be >= 1".into(),
            });
        }
        self.conn.execute(
            "INSERT INTO chain_rule (mode, trigger_number, target_number, last_draw)
             VALUES (?1, ?2, ?3, NULL)
             ON CONFLICT (mode, trigger_number) DO UPDATE
             SET target_number = excluded.target_number, last_draw = NULL",
            params![mode.as_str(), trigger, target],
        )?;
        Ok(())
    }

    /// Fire every rule in `mode` whose trigger is among `just_drawn`
    /// and whose target is still in `available` (and passes the
    /// gender filter). Each firing persists last_draw right away.
    /// All firings are returned; the caller keeps the last one's
    /// target as the pending target. Unreadable rows are logged and
    /// skipped — one bad rule never aborts the rest.
    pub fn check_and_fire(
        &self,
        mode: Mode,
        just_drawn: &[Number],
        available: &BTreeSet<Number>,
        gender_filter: Option<&BTreeSet<Number>>,
    ) -> Vec<ChainFiring> {
        let rows = match self.load_chain_rows(mode) {
            Ok(rows) => rows,
            Err(e) => {
                log::warn!("chain rules unreadable for {mode}: {e}");
                return Vec::new();
            }
        };
        let mut firings = Vec::new();
        for row in rows {
            if !just_drawn.contains(&row.trigger) {
                continue;
            }
            if !available.contains(&row.target) {
                continue;
            }
            if let Some(filter) = gender_filter {
                if !filter.contains(&row.target) {
                    continue;
                }
            }
            let fired_at = Utc::now();
            if let Err(e) = self.persist_chain_fired(mode, row.trigger, fired_at) {
                log::warn!("chain rule ({mode}, {}): persist failed: {e}", row.trigger);
            }
            log::debug!("chain ({mode}, {} -> {}) fired", row.trigger, row.target);
            firings.push(ChainFiring {
                trigger: row.trigger,
                target: row.target,
                fired_at,
            });
        }
        firings
    }

    fn persist_chain_fired(
        &self,
        mode: Mode,
        trigger: Number,
        fired_at: DateTime<Utc>,
    ) -> DrawResult<()> {
        self.conn.execute(
            "UPDATE chain_rule SET last_draw = ?3
             WHERE mode = ?1 AND trigger_number = ?2",
            params![mode.as_str(), trigger, fired_at.to_rfc3339()],
        )?;
        Ok(())
    }

    /// Delete one mode's chain rules, or every mode's.
    pub fn clear_chains(&self, mode: Option<Mode>) -> bool {
        match self.clear_table("chain_rule", mode) {
            Ok(n) => {
                log::debug!("cleared {n} chain rules");
                true
            }
            Err(e) => {
                log::error!("clear_chains failed: {e}");
                false
            }
        }
    }

    /// Every chain rule, grouped by mode, triggers ascending. Modes
    /// with no rules are omitted.
    pub fn list_chains(&self) -> Vec<(Mode, Vec<ChainRuleRow>)> {
        let mut grouped = Vec::new();
        for mode in Mode::ALL {
            match self.load_chain_rows(mode) {
                Ok(rows) if !rows.is_empty() => grouped.push((mode, rows)),
                Ok(_) => {}
                Err(e) => log::warn!("chain rules unreadable for {mode}: {e}"),
            }
        }
        grouped
    }

    fn load_chain_rows(&self, mode: Mode) -> DrawResult<Vec<ChainRuleRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT trigger_number, target_number, last_draw FROM chain_rule
             WHERE mode = ?1 ORDER BY trigger_number ASC",
        )?;
        let rows = stmt.query_map(params![mode.as_str()], |r| {
            Ok((
                r.get::<_, i64>(0)?,
                r.get::<_, i64>(1)?,
                r.get::<_, Option<String>>(2)?,
            ))
        })?;
        let mut result = Vec::new();
        for row in rows {
            let Ok((trigger, target, last_draw)) = row else {
                log::warn!("chain rule for {mode}: skipping unreadable row");
                continue;
            };
            let (Ok(trigger), Ok(target)) = (u32::try_from(trigger), u32::try_from(target)) else {
                log::warn!("chain rule for {mode}: skipping row with bad numbers");
                continue;
            };
            if trigger == 0 || target == 0 {
                log::warn!("chain rule for {mode}: skipping row with zero number");
                continue;
            }
            result.push(ChainRuleRow {
                trigger,
                target,
                last_draw: parse_timestamp(last_draw),
            });
        }
        Ok(result)
    }
}
