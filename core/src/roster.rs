//! Roster of the people behind the numbers.
//!
//! Two plain-text files, one line per person: `<number> <name...>`,
//! gender implied by which file the line is in. Loaded once at
//! startup; the draw engine never mutates it.

use crate::error::DrawResult;
use crate::types::{Gender, Number};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

pub struct RosterStore {
    people: BTreeMap<Number, (String, Gender)>,
    by_gender: BTreeMap<Gender, BTreeSet<Number>>,
}

impl RosterStore {
    /// Load `boys.txt` and `girls.txt` from `dir`, creating the
    /// directory if missing. Malformed lines are skipped; a missing
    /// file just means an empty gender.
    pub fn open(dir: impl AsRef<Path>) -> DrawResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let mut store = Self {
            people: BTreeMap::new(),
            by_gender: BTreeMap::new(),
        };
        store.by_gender.insert(Gender::Male, BTreeSet::new());
        store.by_gender.insert(Gender::Female, BTreeSet::new());
        store.load_file(&dir.join("boys.txt"), Gender::Male);
        store.load_file(&dir.join("girls.txt"), Gender::Female);
        Ok(store)
    }

    fn load_file(&mut self, path: &PathBuf, gender: Gender) {
        let Ok(content) = fs::read_to_string(path) else {
            return;
        };
        for line in content.lines() {
            let mut parts = line.split_whitespace();
            let Some(first) = parts.next() else { continue };
            let Ok(number) = first.parse::<Number>() else {
                log::warn!("roster {}: skipping malformed line", path.display());
                continue;
            };
            if number == 0 {
                continue;
            }
            let name = parts.collect::<Vec<_>>().join(" ");
            if name.is_empty() {
                continue;
            }
            self.people.insert(number, (name, gender));
            self.by_gender.entry(gender).or_default().insert(number);
        }
    }

    /// Display name and gender for a number, if the roster knows it.
    pub fn resolve(&self, number: Number) -> Option<(&str, Gender)> {
        self.people.get(&number).map(|(n, g)| (n.as_str(), *g))
    }

    /// Numbers tagged with `gender`. This set is the draw's gender
    /// filter.
    pub fn numbers_for(&self, gender: Gender) -> BTreeSet<Number> {
        self.by_gender.get(&gender).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}
