//! The room catalog data model: branches, amenity flags, and rooms.

use crate::types::{BranchName, RoomId, RoomName};
use crate::SchemaError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A library branch. Immutable once loaded; embedded in each room rather
/// than referenced, so a room record is self-contained.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Branch {
    pub name: BranchName,
    pub floor: u32,
    pub address: String,
    pub image: String,
}

/// Equipment flags for a room. A search criterion may constrain any subset
/// of these; unset criteria impose no constraint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Amenities {
    pub screen_mirroring: bool,
    pub video_output: bool,
    pub whiteboard: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RoomType {
    MeetingRoom,
    SharedLearningRoom,
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomType::MeetingRoom => write!(f, "meeting-room"),
            RoomType::SharedLearningRoom => write!(f, "shared-learning-room"),
        }
    }
}

/// A bookable room: its branch, type, capacity, amenities, and the open
/// time slots for its single applicable date.
///
/// `available_times` is duplicate-free; a reservation removes exactly one
/// label and a cancellation restores it. The store version token returned
/// alongside a room on read is what makes conditional writes safe — the
/// room value itself carries no version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub name: RoomName,
    pub room_type: RoomType,
    pub capacity: u32,
    pub amenities: Amenities,
    /// ISO calendar day (`YYYY-MM-DD`) the time slots apply to.
    pub date: String,
    pub available_times: Vec<String>,
    pub branch: Branch,
}

impl Room {
    /// Check the structural invariants a catalog entry must satisfy before
    /// it may be seeded into the store.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.capacity == 0 {
            return Err(SchemaError::InvalidRoom {
                id: self.id.to_string(),
                reason: "capacity must be positive".to_owned(),
            });
        }
        for (i, time) in self.available_times.iter().enumerate() {
            if self.available_times[..i].contains(time) {
                return Err(SchemaError::InvalidRoom {
                    id: self.id.to_string(),
                    reason: format!("duplicate time slot '{time}'"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_room() -> Room {
        Room {
            id: RoomId::new("r1"),
            name: RoomName::new("Test Room"),
            room_type: RoomType::SharedLearningRoom,
            capacity: 6,
            amenities: Amenities {
                screen_mirroring: true,
                video_output: false,
                whiteboard: true,
            },
            date: "2024-10-14".to_owned(),
            available_times: vec!["2:00 PM".to_owned(), "2:30 PM".to_owned()],
            branch: Branch {
                name: BranchName::new("Central Library"),
                floor: 3,
                address: "710 W. César Chávez St.".to_owned(),
                image: "central.webp".to_owned(),
            },
        }
    }

    #[test]
    fn room_type_serde_uses_kebab_case() {
        assert_eq!(
            serde_json::to_string(&RoomType::MeetingRoom).unwrap(),
            "\"meeting-room\""
        );
        let t: RoomType = serde_json::from_str("\"shared-learning-room\"").unwrap();
        assert_eq!(t, RoomType::SharedLearningRoom);
    }

    #[test]
    fn room_type_display_matches_serde() {
        assert_eq!(RoomType::MeetingRoom.to_string(), "meeting-room");
        assert_eq!(
            RoomType::SharedLearningRoom.to_string(),
            "shared-learning-room"
        );
    }

    #[test]
    fn room_serde_roundtrip() {
        let room = sample_room();
        let json = serde_json::to_string(&room).unwrap();
        let back: Room = serde_json::from_str(&json).unwrap();
        assert_eq!(back, room);
    }

    #[test]
    fn validate_accepts_sample() {
        assert!(sample_room().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_capacity() {
        let mut room = sample_room();
        room.capacity = 0;
        assert!(room.validate().is_err());
    }

    #[test]
    fn validate_rejects_duplicate_times() {
        let mut room = sample_room();
        room.available_times.push("2:00 PM".to_owned());
        let err = room.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate time slot"));
    }
}
