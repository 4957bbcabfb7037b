//! Ledger store tests: additive appends, reset, persistence across
//! reopen, import validation, and tolerance of corrupt lines.

use numdraw_core::codec::KeyRing;
use numdraw_core::ledger::LedgerStore;
use numdraw_core::types::Mode;
use std::collections::BTreeSet;
use std::fs;
use tempfile::tempdir;

fn set(numbers: &[u32]) -> BTreeSet<u32> {
    numbers.iter().copied().collect()
}

#[test]
fn append_is_additive() {
    let dir = tempdir().unwrap();
    let mut ledger = LedgerStore::open(dir.path(), KeyRing::ledger()).unwrap();

    assert!(ledger.append(Mode::One, &set(&[1, 2])));
    assert!(ledger.append(Mode::One, &set(&[3])));

    assert_eq!(ledger.numbers(Mode::One), set(&[1, 2, 3]));
    assert!(ledger.contains(Mode::One, 2));
    assert!(!ledger.contains(Mode::One, 9));
    // Other modes are untouched.
    assert!(ledger.numbers(Mode::Two).is_empty());
}

#[test]
fn records_survive_reopen() {
    let dir = tempdir().unwrap();
    {
        let mut ledger = LedgerStore::open(dir.path(), KeyRing::ledger()).unwrap();
        assert!(ledger.append(Mode::Three, &set(&[10, 20, 30])));
    }
    let reopened = LedgerStore::open(dir.path(), KeyRing::ledger()).unwrap();
    assert_eq!(reopened.numbers(Mode::Three), set(&[10, 20, 30]));
}

#[test]
fn records_are_masked_at_rest() {
    let dir = tempdir().unwrap();
    let mut ledger = LedgerStore::open(dir.path(), KeyRing::ledger()).unwrap();
    assert!(ledger.append(Mode::One, &set(&[42])));

    let content = fs::read_to_string(dir.path().join("mode1.led")).unwrap();
    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        assert!(line.parse::<u32>().is_err(), "line stored in cleartext: {line}");
    }
}

#[test]
fn reset_one_mode_leaves_others() {
    let dir = tempdir().unwrap();
    let mut ledger = LedgerStore::open(dir.path(), KeyRing::ledger()).unwrap();
    ledger.append(Mode::One, &set(&[1]));
    ledger.append(Mode::Two, &set(&[2]));

    assert!(ledger.reset(Some(Mode::One)));
    assert!(ledger.numbers(Mode::One).is_empty());
    assert_eq!(ledger.numbers(Mode::Two), set(&[2]));

    // And the emptiness persists.
    let reopened = LedgerStore::open(dir.path(), KeyRing::ledger()).unwrap();
    assert!(reopened.numbers(Mode::One).is_empty());
}

#[test]
fn reset_all_modes() {
    let dir = tempdir().unwrap();
    let mut ledger = LedgerStore::open(dir.path(), KeyRing::ledger()).unwrap();
    ledger.append(Mode::One, &set(&[1]));
    ledger.append(Mode::Five, &set(&[5]));

    assert!(ledger.reset(None));
    for mode in Mode::ALL {
        assert!(ledger.numbers(mode).is_empty());
    }
}

#[test]
fn corrupt_lines_are_skipped_not_fatal() {
    let dir = tempdir().unwrap();
    let codec = KeyRing::ledger();
    let good = codec.mask("5");
    fs::write(
        dir.path().join("mode1.led"),
        format!("%%% not base64 %%%\n{good}\n\n"),
    )
    .unwrap();

    let ledger = LedgerStore::open(dir.path(), KeyRing::ledger()).unwrap();
    assert_eq!(ledger.numbers(Mode::One), set(&[5]));
}

#[test]
fn missing_files_mean_empty_sets() {
    let dir = tempdir().unwrap();
    let ledger = LedgerStore::open(dir.path(), KeyRing::ledger()).unwrap();
    for mode in Mode::ALL {
        assert!(ledger.numbers(mode).is_empty());
    }
}

#[test]
fn import_parses_digit_lines_only() {
    let dir = tempdir().unwrap();
    let mut ledger = LedgerStore::open(dir.path(), KeyRing::ledger()).unwrap();

    assert!(ledger.import(Mode::Two, "12\nabc\n 7 \n-3\n\n12\n"));
    assert_eq!(ledger.numbers(Mode::Two), set(&[7, 12]));

    // Imported entries are masked at rest like any other record.
    let reopened = LedgerStore::open(dir.path(), KeyRing::ledger()).unwrap();
    assert_eq!(reopened.numbers(Mode::Two), set(&[7, 12]));
}

#[test]
fn import_with_no_valid_numbers_is_rejected() {
    let dir = tempdir().unwrap();
    let mut ledger = LedgerStore::open(dir.path(), KeyRing::ledger()).unwrap();

    assert!(!ledger.import(Mode::Two, "abc\n-1\n0\n"));
    assert!(ledger.numbers(Mode::Two).is_empty());
}
