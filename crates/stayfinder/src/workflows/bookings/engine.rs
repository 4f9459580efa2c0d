use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use super::domain::{BookingId, InvalidDateRange, Reservation, StayRange};
use super::ledger::{LedgerError, LedgerState, LedgerStore};
use crate::workflows::catalog::ListingId;
use crate::workflows::profiles::UserId;

/// Guards the ledger so no listing ever holds two overlapping live reservations.
///
/// The ledger lock is held across check-then-commit, which serializes writers within
/// the process; a commit is published only after the store has persisted it.
pub struct ReservationEngine<L> {
    store: L,
    state: Mutex<LedgerState>,
}

impl<L> ReservationEngine<L>
where
    L: LedgerStore,
{
    pub fn open(store: L) -> Result<Self, LedgerError> {
        let state = store.load()?;
        info!(
            reservations = state.reservations.len(),
            next_booking_id = state.next_booking_id,
            "reservation ledger loaded"
        );
        Ok(Self {
            store,
            state: Mutex::new(state),
        })
    }

    pub fn store(&self) -> &L {
        &self.store
    }

    /// Whether `listing_id` is free for every night in `[check_in, check_out)`.
    pub fn is_available(
        &self,
        listing_id: ListingId,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<bool, ReservationError> {
        let stay = StayRange::new(check_in, check_out)?;
        let state = self.lock();
        Ok(find_conflict(&state, listing_id, &stay).is_none())
    }

    /// Commit a reservation, re-checking availability under the ledger lock.
    ///
    /// An earlier `is_available` answer is not a hold; only this call decides.
    pub fn create_reservation(
        &self,
        user_id: UserId,
        listing_id: ListingId,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Reservation, ReservationError> {
        let stay = StayRange::new(check_in, check_out)?;
        let mut state = self.lock();

        if let Some(existing) = find_conflict(&state, listing_id, &stay) {
            warn!(
                %listing_id,
                %stay,
                conflicting_booking = %existing.booking_id,
                "reservation rejected: dates already booked"
            );
            return Err(ReservationError::BookingConflict {
                listing_id,
                requested: stay,
                conflicting: existing.booking_id,
            });
        }

        let reservation = Reservation {
            booking_id: BookingId(state.next_booking_id),
            user_id,
            listing_id,
            check_in,
            check_out,
            created_at: Some(Utc::now()),
        };

        let mut next = state.clone();
        next.next_booking_id += 1;
        next.reservations.push(reservation.clone());
        self.store.persist(&next)?;
        *state = next;

        info!(
            booking_id = %reservation.booking_id,
            user_id = %reservation.user_id,
            %listing_id,
            %stay,
            "reservation committed"
        );
        Ok(reservation)
    }

    /// Remove a booking owned by `requesting_user`.
    ///
    /// `Ok(false)` covers both an unknown booking and one held by someone else.
    pub fn cancel_reservation(
        &self,
        booking_id: BookingId,
        requesting_user: &UserId,
    ) -> Result<bool, LedgerError> {
        let mut state = self.lock();
        let Some(position) = state.reservations.iter().position(|reservation| {
            reservation.booking_id == booking_id && &reservation.user_id == requesting_user
        }) else {
            info!(%booking_id, user_id = %requesting_user, "nothing to cancel");
            return Ok(false);
        };

        let mut next = state.clone();
        next.reservations.remove(position);
        self.store.persist(&next)?;
        *state = next;

        info!(%booking_id, user_id = %requesting_user, "reservation cancelled");
        Ok(true)
    }

    pub fn get(&self, booking_id: BookingId) -> Option<Reservation> {
        self.lock()
            .reservations
            .iter()
            .find(|reservation| reservation.booking_id == booking_id)
            .cloned()
    }

    /// Reservations held by `user_id`, in ledger order.
    pub fn list_for_user(&self, user_id: &UserId) -> Vec<Reservation> {
        self.lock()
            .reservations
            .iter()
            .filter(|reservation| &reservation.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Reservations against `listing_id`, in ledger order.
    pub fn list_for_listing(&self, listing_id: ListingId) -> Vec<Reservation> {
        self.lock()
            .reservations
            .iter()
            .filter(|reservation| reservation.listing_id == listing_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().reservations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // The cached state only changes after a successful persist, so it stays
    // consistent even if a holder panicked.
    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn find_conflict<'a>(
    state: &'a LedgerState,
    listing_id: ListingId,
    stay: &StayRange,
) -> Option<&'a Reservation> {
    state
        .reservations
        .iter()
        .filter(|reservation| reservation.listing_id == listing_id)
        .find(|reservation| reservation.occupies(stay))
}

#[derive(Debug, thiserror::Error)]
pub enum ReservationError {
    #[error(transparent)]
    DateRangeInvalid(#[from] InvalidDateRange),
    #[error("listing {listing_id} is already booked for {requested} (booking {conflicting})")]
    BookingConflict {
        listing_id: ListingId,
        requested: StayRange,
        conflicting: BookingId,
    },
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
