//! Idempotent catalog bootstrap.
//!
//! Runs once at process start. A room already in the store is left
//! untouched, so reservations made before a restart keep their effect on
//! availability. Only store failure is fatal to the caller.

use crate::ReservationError;
use carrel_schema::Room;
use carrel_store::{AtomicOp, Precondition, RecordKey, RecordStore};
use tracing::{debug, info};

/// What seeding did, for logging and operator display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct SeedReport {
    pub created: usize,
    pub skipped: usize,
}

/// Seed `catalog` into `store`, creating only rooms that do not exist yet.
///
/// Creation uses an `Absent` precondition, so two processes seeding the
/// same store concurrently cannot clobber each other; losing that race is
/// treated as "already present".
pub(crate) fn seed_rooms(
    store: &dyn RecordStore,
    catalog: &[Room],
) -> Result<SeedReport, ReservationError> {
    let mut report = SeedReport::default();

    for room in catalog {
        room.validate()?;
        let key = RecordKey::room(&room.id);
        if store.get(&key)?.is_some() {
            debug!("room '{}' already present, leaving untouched", room.id);
            report.skipped += 1;
            continue;
        }

        let value = serde_json::to_value(room).map_err(carrel_store::StoreError::from)?;
        let outcome = store.atomic(
            &[Precondition::Absent(key.clone())],
            &[AtomicOp::Put(key, value)],
        )?;
        if outcome.is_committed() {
            report.created += 1;
        } else {
            debug!("lost seeding race for room '{}', treating as present", room.id);
            report.skipped += 1;
        }
    }

    info!(
        "catalog seeded: {} created, {} already present",
        report.created, report.skipped
    );
    Ok(report)
}
