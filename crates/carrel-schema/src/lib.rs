//! Domain types and request validation for Carrel.
//!
//! This crate defines the reservation domain: library `Branch`es, bookable
//! `Room`s with their amenity flags and open time slots, `Reservation`
//! records, and the tagged `ReservationRequest` accepted at the engine
//! boundary. It also ships the built-in room catalog used to seed a fresh
//! store and the structural validation that runs before any store access.

pub mod catalog;
pub mod reservation;
pub mod room;
pub mod types;
pub mod validate;

pub use catalog::{builtin_rooms, BUILTIN_CATALOG};
pub use reservation::{RequestBase, Reservation, ReservationRequest};
pub use room::{Amenities, Branch, Room, RoomType};
pub use types::{BranchName, RoomId, RoomName};
pub use validate::validate_request;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("malformed email address: {0}")]
    InvalidEmail(String),
    #[error("malformed phone number: {0}")]
    InvalidPhone(String),
    #[error("malformed website URL: {0}")]
    InvalidUrl(String),
    #[error("invalid calendar date: {0}")]
    InvalidDate(String),
    #[error("invalid room definition for '{id}': {reason}")]
    InvalidRoom { id: String, reason: String },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
