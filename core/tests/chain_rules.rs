//! Chain rule store tests: firing conditions, overwrite, clearing,
//! grouping, and corruption tolerance.

use numdraw_core::store::RuleStore;
use numdraw_core::types::Mode;
use std::collections::BTreeSet;
use tempfile::tempdir;

fn set(numbers: &[u32]) -> BTreeSet<u32> {
    numbers.iter().copied().collect()
}

#[test]
fn fires_when_trigger_drawn_and_target_available() {
    let store = RuleStore::in_memory().unwrap();
    assert!(store.set_chain(Mode::One, 5, 9));

    let firings = store.check_and_fire(Mode::One, &[5], &set(&[9, 20]), None);
    assert_eq!(firings.len(), 1);
    assert_eq!(firings[0].trigger, 5);
    assert_eq!(firings[0].target, 9);
}

#[test]
fn does_not_fire_without_its_trigger() {
    let store = RuleStore::in_memory().unwrap();
    store.set_chain(Mode::One, 5, 9);

    assert!(store.check_and_fire(Mode::One, &[6], &set(&[9]), None).is_empty());
}

#[test]
fn does_not_fire_when_target_unavailable() {
    let store = RuleStore::in_memory().unwrap();
    store.set_chain(Mode::One, 5, 9);

    assert!(store.check_and_fire(Mode::One, &[5], &set(&[20]), None).is_empty());
}

#[test]
fn does_not_fire_across_modes() {
    let store = RuleStore::in_memory().unwrap();
    store.set_chain(Mode::Two, 5, 9);

    assert!(store.check_and_fire(Mode::One, &[5], &set(&[9]), None).is_empty());
}

#[test]
fn gender_filter_blocks_the_target() {
    let store = RuleStore::in_memory().unwrap();
    store.set_chain(Mode::One, 5, 9);

    let filter = set(&[1, 2, 3]);
    assert!(store
        .check_and_fire(Mode::One, &[5], &set(&[9]), Some(&filter))
        .is_empty());

    let filter = set(&[9]);
    assert_eq!(
        store
            .check_and_fire(Mode::One, &[5], &set(&[9]), Some(&filter))
            .len(),
        1
    );
}

#[test]
fn multiple_triggers_all_fire() {
    let store = RuleStore::in_memory().unwrap();
    store.set_chain(Mode::One, 5, 9);
    store.set_chain(Mode::One, 6, 10);

    let firings = store.check_and_fire(Mode::One, &[5, 6], &set(&[9, 10]), None);
    assert_eq!(firings.len(), 2);
}

#[test]
fn overwrite_replaces_target_and_resets_last_draw() {
    let store = RuleStore::in_memory().unwrap();
    assert!(store.set_chain(Mode::One, 5, 9));
    store.check_and_fire(Mode::One, &[5], &set(&[9]), None);

    assert!(store.set_chain(Mode::One, 5, 11));
    let listed = store.list_chains();
    assert_eq!(listed.len(), 1);
    let rules = &listed[0].1;
    assert_eq!(rules.len(), 1, "exactly one rule for the key");
    assert_eq!(rules[0].target, 11);
    assert!(rules[0].last_draw.is_none());
}

#[test]
fn zero_numbers_are_rejected() {
    let store = RuleStore::in_memory().unwrap();
    assert!(!store.set_chain(Mode::One, 0, 9));
    assert!(!store.set_chain(Mode::One, 5, 0));
    assert!(store.list_chains().is_empty());
}

#[test]
fn firing_persists_last_draw() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("rules.db");
    {
        let store = RuleStore::open(&db).unwrap();
        store.set_chain(Mode::One, 5, 9);
        store.check_and_fire(Mode::One, &[5], &set(&[9]), None);
    }
    let store = RuleStore::open(&db).unwrap();
    let listed = store.list_chains();
    assert!(listed[0].1[0].last_draw.is_some());
}

#[test]
fn clear_by_mode_and_clear_all() {
    let store = RuleStore::in_memory().unwrap();
    store.set_chain(Mode::One, 1, 2);
    store.set_chain(Mode::Two, 3, 4);

    assert!(store.clear_chains(Some(Mode::One)));
    let listed = store.list_chains();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].0, Mode::Two);

    assert!(store.clear_chains(None));
    assert!(store.list_chains().is_empty());
}

#[test]
fn corrupt_rows_are_skipped_and_evaluation_continues() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("rules.db");
    let store = RuleStore::open(&db).unwrap();
    assert!(store.set_chain(Mode::One, 5, 9));

    let conn = rusqlite::Connection::open(&db).unwrap();
    conn.execute(
        "INSERT INTO chain_rule (mode, trigger_number, target_number, last_draw)
         VALUES ('mode1', 2, 'junk', NULL)",
        [],
    )
    .unwrap();

    let firings = store.check_and_fire(Mode::One, &[2, 5], &set(&[9, 20]), None);
    assert_eq!(firings.len(), 1, "valid rule still evaluated");
    assert_eq!(firings[0].target, 9);
}
