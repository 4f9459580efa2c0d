use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;

use crate::workflows::bookings::{
    InMemoryLedger, LedgerError, LedgerState, LedgerStore, ReservationEngine,
};
use crate::workflows::catalog::ListingId;
use crate::workflows::profiles::UserId;

pub(super) const LISTING: ListingId = ListingId(42);

pub(super) fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid date literal")
}

pub(super) fn guest() -> UserId {
    UserId::from("usr-000001")
}

pub(super) fn other_guest() -> UserId {
    UserId::from("usr-000002")
}

pub(super) fn memory_engine() -> ReservationEngine<InMemoryLedger> {
    ReservationEngine::open(InMemoryLedger::default()).expect("in-memory ledger opens")
}

/// Engine seeded with booking 1 on listing 42 for 2024-07-01 to 2024-07-05.
pub(super) fn engine_with_july_stay() -> ReservationEngine<InMemoryLedger> {
    let engine = memory_engine();
    engine
        .create_reservation(guest(), LISTING, date("2024-07-01"), date("2024-07-05"))
        .expect("seed reservation");
    engine
}

/// Store whose writes can be switched off to simulate an unwritable disk.
#[derive(Default)]
pub(super) struct FlakyLedger {
    inner: InMemoryLedger,
    failing: AtomicBool,
}

impl FlakyLedger {
    pub(super) fn fail_writes(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub(super) fn persisted(&self) -> LedgerState {
        self.inner.snapshot()
    }
}

impl LedgerStore for FlakyLedger {
    fn load(&self) -> Result<LedgerState, LedgerError> {
        self.inner.load()
    }

    fn persist(&self, state: &LedgerState) -> Result<(), LedgerError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable("disk full".to_string()));
        }
        self.inner.persist(state)
    }
}
