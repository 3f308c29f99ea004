//! The reservation engine: the narrow contract the presentation layer
//! calls into.
//!
//! Every operation re-reads current state (with version tokens)
//! immediately before mutating; the engine holds no authoritative copies
//! between requests. Reserve and cancel each commit exactly one atomic
//! transaction with two preconditions and two writes — if either
//! precondition fails the store stays as if the operation never ran.

use crate::delay::Delay;
use crate::search::{room_matches, SearchCriteria};
use crate::seed::{seed_rooms, SeedReport};
use crate::ReservationError;
use carrel_schema::{validate_request, Reservation, ReservationRequest, Room};
use carrel_store::{AtomicOp, Precondition, RecordKey, RecordStore, StoreError};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct Engine {
    store: Arc<dyn RecordStore>,
    delay: Delay,
}

impl Engine {
    /// Engine with no artificial latency.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_delay(store, Delay::none())
    }

    /// Engine that pauses for a bounded random interval before each
    /// operation, emulating network latency.
    pub fn with_delay(store: Arc<dyn RecordStore>, delay: Delay) -> Self {
        Self { store, delay }
    }

    /// Seed the room catalog. Idempotent; rooms already present are left
    /// untouched. Intended to run once at process start — a store failure
    /// here means the process cannot begin serving.
    pub fn seed(&self, catalog: &[Room]) -> Result<SeedReport, ReservationError> {
        seed_rooms(self.store.as_ref(), catalog)
    }

    /// Rooms satisfying every supplied criterion.
    ///
    /// Read-only and lock-free; the result is a best-effort snapshot, not
    /// a reservation guarantee — a slot shown open here can still lose
    /// the race at [`reserve`](Self::reserve) time.
    pub fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Room>, ReservationError> {
        self.delay.pause();

        let mut results = Vec::new();
        for (key, value) in self.store.scan(&RecordKey::rooms_prefix())? {
            let room: Room = match serde_json::from_value(value) {
                Ok(room) => room,
                Err(e) => {
                    warn!("skipping undecodable room record '{key}': {e}");
                    continue;
                }
            };
            if !room_matches(&room, criteria) {
                continue;
            }
            if let Some(time) = &criteria.time {
                // The slot must also be free of a competing reservation.
                // Without an explicit date criterion the room's own date
                // is the only date a reservation for it could carry.
                let date = criteria
                    .date
                    .map_or_else(|| room.date.clone(), |d| d.to_string());
                let reservation_key = RecordKey::reservation(&room.id, &date, time);
                if self.store.get(&reservation_key)?.is_some() {
                    continue;
                }
            }
            results.push(room);
        }

        debug!("search matched {} room(s)", results.len());
        Ok(results)
    }

    /// Reserve a slot.
    ///
    /// Slot uniqueness is enforced by the store's conditional commit: two
    /// concurrent reservations for the same `(room, date, time)` race at
    /// the commit and exactly one wins; the loser observes
    /// [`ReservationError::RoomAlreadyReserved`].
    pub fn reserve(&self, request: &ReservationRequest) -> Result<Reservation, ReservationError> {
        self.delay.pause();
        validate_request(request)?;

        let base = request.base();
        let room_key = RecordKey::room(&base.room_id);
        let room_record = self
            .store
            .get(&room_key)?
            .ok_or_else(|| ReservationError::RoomNotFound(base.room_id.to_string()))?;
        let mut room: Room = decode(room_record.value)?;

        if room.room_type != request.room_type() {
            return Err(ReservationError::RoomTypeMismatch {
                requested: request.room_type(),
                actual: room.room_type,
            });
        }
        if room.date != base.date {
            return Err(ReservationError::RoomNotAvailableOnDate(base.date.clone()));
        }
        if !room.available_times.contains(&base.time) {
            return Err(ReservationError::RoomNotAvailableAtTime(base.time.clone()));
        }

        // A room with zero remaining slots for its date counts as fully
        // booked; refuse the removal rather than persist an empty list.
        if room.available_times.len() == 1 {
            return Err(ReservationError::NoAvailableTimesLeft);
        }
        room.available_times.retain(|t| t != &base.time);

        let reservation =
            request.to_reservation(&room, chrono::Utc::now().to_rfc3339());
        let reservation_key = RecordKey::reservation(&base.room_id, &base.date, &base.time);

        let outcome = self.store.atomic(
            &[
                Precondition::Absent(reservation_key.clone()),
                Precondition::VersionIs(room_key.clone(), room_record.version),
            ],
            &[
                AtomicOp::Put(room_key, encode(&room)?),
                AtomicOp::Put(reservation_key, encode(&reservation)?),
            ],
        )?;
        if !outcome.is_committed() {
            debug!(
                "reserve lost the commit race for room '{}' at {} {}",
                base.room_id, base.date, base.time
            );
            return Err(ReservationError::RoomAlreadyReserved);
        }

        info!(
            "reserved room '{}' at {} {} for {}",
            base.room_id, base.date, base.time, base.full_name
        );
        Ok(reservation)
    }

    /// Cancel a reservation, restoring the freed slot.
    ///
    /// The caller must supply the reservation exactly as it was returned
    /// by [`reserve`](Self::reserve); any field difference against the
    /// stored record is rejected, which defends against cancellation from
    /// stale or forged client-held data.
    pub fn cancel(&self, reservation: &Reservation) -> Result<Reservation, ReservationError> {
        self.delay.pause();

        let reservation_key = RecordKey::reservation(
            &reservation.room_id,
            &reservation.date,
            &reservation.time,
        );
        let stored_record = self
            .store
            .get(&reservation_key)?
            .ok_or(ReservationError::ReservationNotFound)?;
        let stored: Reservation = decode(stored_record.value)?;
        if stored != *reservation {
            return Err(ReservationError::ReservationDataMismatch);
        }

        let room_key = RecordKey::room(&reservation.room_id);
        let room_record = self
            .store
            .get(&room_key)?
            .ok_or_else(|| ReservationError::RoomNotFound(reservation.room_id.to_string()))?;
        let mut room: Room = decode(room_record.value)?;

        // Restore the slot without ever introducing a duplicate, and keep
        // the list in canonical order for display.
        if !room.available_times.contains(&reservation.time) {
            room.available_times.push(reservation.time.clone());
        }
        room.available_times.sort();

        let outcome = self.store.atomic(
            &[
                Precondition::VersionIs(reservation_key.clone(), stored_record.version),
                Precondition::VersionIs(room_key.clone(), room_record.version),
            ],
            &[
                AtomicOp::Delete(reservation_key),
                AtomicOp::Put(room_key, encode(&room)?),
            ],
        )?;
        if !outcome.is_committed() {
            debug!(
                "cancel lost the commit race for room '{}' at {} {}",
                reservation.room_id, reservation.date, reservation.time
            );
            return Err(ReservationError::CancellationFailed);
        }

        info!(
            "cancelled reservation for room '{}' at {} {}",
            reservation.room_id, reservation.date, reservation.time
        );
        Ok(reservation.clone())
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T, ReservationError> {
    serde_json::from_value(value)
        .map_err(|e| ReservationError::StoreUnavailable(StoreError::from(e)))
}

fn encode<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, ReservationError> {
    serde_json::to_value(value).map_err(|e| ReservationError::StoreUnavailable(StoreError::from(e)))
}
