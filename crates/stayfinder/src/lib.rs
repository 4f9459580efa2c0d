//! Rental catalog, preference-based recommendations, and a conflict-free reservation ledger.

pub mod config;
pub mod error;
mod storage;
pub mod telemetry;
pub mod workflows;
