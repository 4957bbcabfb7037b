//! Shared primitive types used across the whole engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A drawable slot identifier. Always >= 1. The upper bound of the
/// pool is supplied by the caller per batch — never hardcoded here.
pub type Number = u32;

/// The five draw namespaces. Every piece of persisted state (ledger,
/// rate rules, chain rules) is partitioned by mode; nothing crosses
/// between namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "mode1")]
    One,
    #[serde(rename = "mode2")]
    Two,
    #[serde(rename = "mode3")]
    Three,
    #[serde(rename = "mode4")]
    Four,
    #[serde(rename = "mode5")]
    Five,
}

impl Mode {
    pub const ALL: [Mode; 5] = [Mode::One, Mode::Two, Mode::Three, Mode::Four, Mode::Five];

    /// Stable string form. Used for file names and database keys —
    /// never change an existing mapping.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::One => "mode1",
            Mode::Two => "mode2",
            Mode::Three => "mode3",
            Mode::Four => "mode4",
            Mode::Five => "mode5",
        }
    }

    pub fn parse(s: &str) -> Option<Mode> {
        Mode::ALL.into_iter().find(|m| m.as_str() == s)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gender tag carried by roster entries and used as a draw filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn parse(s: &str) -> Option<Gender> {
        match s {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
