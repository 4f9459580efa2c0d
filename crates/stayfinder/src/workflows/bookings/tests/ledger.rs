use std::fs;

use super::common::*;
use crate::workflows::bookings::{
    BookingId, JsonFileLedger, LedgerError, LedgerState, LedgerStore, ReservationEngine,
};

#[test]
fn missing_or_blank_file_opens_as_empty_ledger() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bookings.json");

    let ledger = JsonFileLedger::new(&path);
    assert_eq!(ledger.load().expect("missing file"), LedgerState::default());

    fs::write(&path, "  \n").expect("seed blank file");
    assert_eq!(ledger.load().expect("blank file"), LedgerState::default());
}

#[test]
fn commits_survive_reopen_with_counter_intact() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("data").join("bookings.json");

    let engine = ReservationEngine::open(JsonFileLedger::new(&path)).expect("open");
    engine
        .create_reservation(guest(), LISTING, date("2024-07-01"), date("2024-07-05"))
        .expect("book");
    engine
        .create_reservation(guest(), LISTING, date("2024-07-05"), date("2024-07-08"))
        .expect("book back-to-back");
    assert!(engine
        .cancel_reservation(BookingId(2), &guest())
        .expect("cancel"));
    drop(engine);

    let reopened = ReservationEngine::open(JsonFileLedger::new(&path)).expect("reopen");
    assert_eq!(reopened.len(), 1);
    assert!(!reopened
        .is_available(LISTING, date("2024-07-03"), date("2024-07-04"))
        .expect("valid range"));
    let next = reopened
        .create_reservation(other_guest(), LISTING, date("2024-07-05"), date("2024-07-08"))
        .expect("rebook");
    assert_eq!(next.booking_id, BookingId(3));
}

#[test]
fn legacy_array_files_resume_numbering_after_highest_id() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bookings.json");
    fs::write(
        &path,
        r#"[
            {"booking_id": 1, "user_id": "usr-000001", "listing_id": 42, "check_in": "2024-07-01", "check_out": "2024-07-05"},
            {"booking_id": 4, "user_id": "usr-000002", "listing_id": 8, "check_in": "2024-09-01", "check_out": "2024-09-02"}
        ]"#,
    )
    .expect("seed legacy ledger");

    let engine = ReservationEngine::open(JsonFileLedger::new(&path)).expect("open legacy");
    assert_eq!(engine.len(), 2);
    let created = engine
        .create_reservation(guest(), LISTING, date("2024-07-05"), date("2024-07-06"))
        .expect("book");
    assert_eq!(created.booking_id, BookingId(5));

    let rewritten: serde_json::Value =
        serde_json::from_slice(&fs::read(&path).expect("read")).expect("json");
    assert_eq!(rewritten["next_booking_id"], 6);
}

#[test]
fn corrupt_file_is_reported_not_discarded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bookings.json");
    fs::write(&path, "{ definitely not json").expect("seed corrupt file");

    match ReservationEngine::open(JsonFileLedger::new(&path)) {
        Err(LedgerError::Corrupt { path: reported, .. }) => assert_eq!(reported, path),
        Err(other) => panic!("expected corrupt ledger, got {other:?}"),
        Ok(_) => panic!("corrupt ledger must not open"),
    }
    assert_eq!(
        fs::read_to_string(&path).expect("read"),
        "{ definitely not json"
    );
}

#[test]
fn unwritable_location_fails_commit_and_keeps_state() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "a file where a directory should be").expect("seed blocker");

    let engine =
        ReservationEngine::open(JsonFileLedger::new(blocker.join("bookings.json"))).expect("open");
    match engine.create_reservation(guest(), LISTING, date("2024-07-01"), date("2024-07-05")) {
        Err(crate::workflows::bookings::ReservationError::Ledger(LedgerError::Io { .. })) => {}
        other => panic!("expected io failure, got {other:?}"),
    }
    assert!(engine.is_empty());
}
