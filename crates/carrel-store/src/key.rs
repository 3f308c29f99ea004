//! Hierarchical string keys for the record store.
//!
//! Persisted state lives in two namespaces: `rooms/<room_id>` and
//! `reservations/<room_id>/<date>/<time>`. The reservation key is the
//! uniqueness boundary for a slot — at most one reservation may exist per
//! `(room_id, date, time)` at any moment.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const ROOMS_NS: &str = "rooms";
pub const RESERVATIONS_NS: &str = "reservations";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordKey(Vec<String>);

impl RecordKey {
    pub fn new(segments: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Key of a room record.
    pub fn room(room_id: &str) -> Self {
        Self::new([ROOMS_NS, room_id])
    }

    /// Key of the reservation occupying a slot.
    pub fn reservation(room_id: &str, date: &str, time: &str) -> Self {
        Self::new([RESERVATIONS_NS, room_id, date, time])
    }

    /// Prefix covering every room record.
    pub fn rooms_prefix() -> Self {
        Self::new([ROOMS_NS])
    }

    /// Prefix covering every reservation record.
    pub fn reservations_prefix() -> Self {
        Self::new([RESERVATIONS_NS])
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The top-level namespace segment, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn starts_with(&self, prefix: &RecordKey) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}
