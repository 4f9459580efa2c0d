//! Reservation ledger and the engine that keeps it free of double bookings.

mod domain;
mod engine;
mod ledger;

#[cfg(test)]
mod tests;

pub use domain::{BookingId, InvalidDateRange, Reservation, StayRange};
pub use engine::{ReservationEngine, ReservationError};
pub use ledger::{InMemoryLedger, JsonFileLedger, LedgerError, LedgerState, LedgerStore};
