//! Booking scenarios exercised through the public engine over a file-backed ledger.

use chrono::NaiveDate;

use stayfinder::workflows::bookings::{
    BookingId, JsonFileLedger, ReservationEngine, ReservationError,
};
use stayfinder::workflows::catalog::ListingId;
use stayfinder::workflows::profiles::UserId;

fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid date")
}

#[test]
fn availability_scenario_around_an_existing_stay() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = ReservationEngine::open(JsonFileLedger::new(dir.path().join("bookings.json")))
        .expect("open ledger");
    let guest = UserId::from("usr-000001");

    engine
        .create_reservation(guest.clone(), ListingId(42), date("2024-07-01"), date("2024-07-05"))
        .expect("initial stay");

    assert!(engine
        .is_available(ListingId(42), date("2024-07-05"), date("2024-07-08"))
        .expect("valid range"));
    assert!(!engine
        .is_available(ListingId(42), date("2024-07-04"), date("2024-07-06"))
        .expect("valid range"));
}

#[test]
fn availability_answer_is_not_a_hold() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = ReservationEngine::open(JsonFileLedger::new(dir.path().join("bookings.json")))
        .expect("open ledger");
    let (first, second) = (UserId::from("usr-000001"), UserId::from("usr-000002"));

    let free = engine
        .is_available(ListingId(42), date("2024-08-10"), date("2024-08-12"))
        .expect("valid range");
    assert!(free);

    engine
        .create_reservation(second, ListingId(42), date("2024-08-11"), date("2024-08-13"))
        .expect("someone else books first");

    match engine.create_reservation(first, ListingId(42), date("2024-08-10"), date("2024-08-12")) {
        Err(ReservationError::BookingConflict { conflicting, .. }) => {
            assert_eq!(conflicting, BookingId(1))
        }
        other => panic!("expected conflict at commit time, got {other:?}"),
    }
}

#[test]
fn change_of_dates_is_cancel_then_rebook() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = ReservationEngine::open(JsonFileLedger::new(dir.path().join("bookings.json")))
        .expect("open ledger");
    let guest = UserId::from("usr-000001");

    let original = engine
        .create_reservation(guest.clone(), ListingId(3), date("2024-09-01"), date("2024-09-04"))
        .expect("book");
    assert!(engine
        .cancel_reservation(original.booking_id, &guest)
        .expect("cancel"));
    let moved = engine
        .create_reservation(guest.clone(), ListingId(3), date("2024-09-02"), date("2024-09-06"))
        .expect("rebook");

    assert_ne!(moved.booking_id, original.booking_id);
    assert_eq!(engine.list_for_user(&guest), vec![moved]);
}
