use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use super::domain::Reservation;
use crate::storage;

/// Everything the ledger persists: live reservations plus the id counter.
///
/// The counter travels with the reservations so ids stay unique across
/// cancellations and restarts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    pub next_booking_id: u64,
    pub reservations: Vec<Reservation>,
}

impl Default for LedgerState {
    fn default() -> Self {
        Self {
            next_booking_id: 1,
            reservations: Vec::new(),
        }
    }
}

impl LedgerState {
    /// Rebuild a state from a bare list of reservations, resuming the counter after the highest id.
    pub fn from_reservations(reservations: Vec<Reservation>) -> Self {
        let next_booking_id = reservations
            .iter()
            .map(|reservation| reservation.booking_id.0)
            .max()
            .map_or(1, |max| max + 1);
        Self {
            next_booking_id,
            reservations,
        }
    }
}

/// Durable backend for the reservation ledger.
///
/// `persist` must be all-or-nothing: on error the previously persisted state stays readable.
pub trait LedgerStore: Send + Sync {
    fn load(&self) -> Result<LedgerState, LedgerError>;
    fn persist(&self, state: &LedgerState) -> Result<(), LedgerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("failed to access ledger {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("ledger {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Volatile ledger for tests, demos, and embedding.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    pub fn seeded(state: LedgerState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn snapshot(&self) -> LedgerState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LedgerStore for InMemoryLedger {
    fn load(&self) -> Result<LedgerState, LedgerError> {
        Ok(self.snapshot())
    }

    fn persist(&self, state: &LedgerState) -> Result<(), LedgerError> {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state.clone();
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LedgerDocument {
    Current(LedgerState),
    Legacy(Vec<Reservation>),
}

/// Ledger kept as one pretty-printed JSON document, replaced atomically on every commit.
#[derive(Debug, Clone)]
pub struct JsonFileLedger {
    path: PathBuf,
}

impl JsonFileLedger {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> LedgerError {
        LedgerError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl LedgerStore for JsonFileLedger {
    fn load(&self) -> Result<LedgerState, LedgerError> {
        let Some(bytes) = storage::read_optional(&self.path).map_err(|err| self.io_error(err))?
        else {
            return Ok(LedgerState::default());
        };
        if storage::is_blank(&bytes) {
            return Ok(LedgerState::default());
        }

        match serde_json::from_slice::<LedgerDocument>(&bytes) {
            Ok(LedgerDocument::Current(state)) => Ok(state),
            Ok(LedgerDocument::Legacy(reservations)) => {
                Ok(LedgerState::from_reservations(reservations))
            }
            Err(source) => Err(LedgerError::Corrupt {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn persist(&self, state: &LedgerState) -> Result<(), LedgerError> {
        let bytes = serde_json::to_vec_pretty(state).map_err(|source| LedgerError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        storage::write_atomic(&self.path, &bytes).map_err(|err| self.io_error(err))
    }
}
