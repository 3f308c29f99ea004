//! Reservation transaction engine for Carrel.
//!
//! This crate ties the domain schema and the record store together into
//! the `Engine` — the narrow contract exposed to callers: seed the room
//! catalog, search availability, reserve a slot, cancel a reservation.
//! Slot uniqueness is enforced by the store's conditional commit, never
//! by an application lock, so the engine is correct under arbitrary
//! concurrent callers.

pub mod delay;
pub mod engine;
pub mod search;
pub mod seed;

pub use delay::Delay;
pub use engine::Engine;
pub use search::{AmenityFilter, SearchCriteria};
pub use seed::SeedReport;

use thiserror::Error;

/// Everything a reservation operation can fail with. All variants are
/// expected domain outcomes returned as values; none escalate as panics.
#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("invalid request: {0}")]
    Validation(#[from] carrel_schema::SchemaError),
    #[error("room '{0}' not found")]
    RoomNotFound(String),
    #[error("requested a {requested} but room is a {actual}")]
    RoomTypeMismatch {
        requested: carrel_schema::RoomType,
        actual: carrel_schema::RoomType,
    },
    #[error("room not available on {0}")]
    RoomNotAvailableOnDate(String),
    #[error("room not available at {0}")]
    RoomNotAvailableAtTime(String),
    #[error("no available times left for this room")]
    NoAvailableTimesLeft,
    #[error("room is already reserved at this date and time")]
    RoomAlreadyReserved,
    #[error("reservation not found")]
    ReservationNotFound,
    #[error("reservation data does not match the stored reservation")]
    ReservationDataMismatch,
    #[error("cancellation failed due to a concurrent modification")]
    CancellationFailed,
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] carrel_store::StoreError),
}
