//! Reservation records and the tagged request type accepted at the engine
//! boundary.

use crate::room::{Room, RoomType};
use crate::types::{BranchName, RoomId, RoomName};
use serde::{Deserialize, Serialize};

/// Fields shared by both reservation kinds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestBase {
    pub room_id: RoomId,
    pub meeting_topic: String,
    pub full_name: String,
    pub email_address: String,
    /// ISO calendar day (`YYYY-MM-DD`).
    pub date: String,
    /// Time slot label exactly as it appears in the room's open slots.
    pub time: String,
}

/// A reservation request, discriminated by `room_type`.
///
/// Meeting rooms require organization details on top of the shared base;
/// shared learning rooms require nothing further. A payload whose
/// `room_type` matches neither variant fails deserialization outright and
/// never reaches the store layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "room_type", rename_all = "kebab-case")]
pub enum ReservationRequest {
    MeetingRoom {
        #[serde(flatten)]
        base: RequestBase,
        org_name: String,
        org_purpose: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        website: Option<String>,
        phone_number: String,
    },
    SharedLearningRoom {
        #[serde(flatten)]
        base: RequestBase,
    },
}

impl ReservationRequest {
    pub fn base(&self) -> &RequestBase {
        match self {
            ReservationRequest::MeetingRoom { base, .. }
            | ReservationRequest::SharedLearningRoom { base } => base,
        }
    }

    pub fn room_type(&self) -> RoomType {
        match self {
            ReservationRequest::MeetingRoom { .. } => RoomType::MeetingRoom,
            ReservationRequest::SharedLearningRoom { .. } => RoomType::SharedLearningRoom,
        }
    }

    /// Build the reservation record this request commits as, denormalizing
    /// the room and branch names so later display and cancellation need no
    /// fresh room lookup.
    pub fn to_reservation(&self, room: &Room, created_at: String) -> Reservation {
        let base = self.base();
        let (org_name, org_purpose, website, phone_number) = match self {
            ReservationRequest::MeetingRoom {
                org_name,
                org_purpose,
                website,
                phone_number,
                ..
            } => (
                Some(org_name.clone()),
                Some(org_purpose.clone()),
                website.clone(),
                Some(phone_number.clone()),
            ),
            ReservationRequest::SharedLearningRoom { .. } => (None, None, None, None),
        };
        Reservation {
            room_id: base.room_id.clone(),
            meeting_topic: base.meeting_topic.clone(),
            full_name: base.full_name.clone(),
            email_address: base.email_address.clone(),
            date: base.date.clone(),
            time: base.time.clone(),
            room_type: self.room_type(),
            room_name: room.name.clone(),
            branch_name: room.branch.name.clone(),
            org_name,
            org_purpose,
            website,
            phone_number,
            created_at,
        }
    }
}

/// A committed reservation, keyed in the store by
/// `(room_id, date, time)`. Created only by a successful reserve
/// transaction, deleted only by a successful cancellation.
///
/// Cancellation compares the caller-supplied value against the stored one
/// field for field, so every field here participates in that guard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reservation {
    pub room_id: RoomId,
    pub meeting_topic: String,
    pub full_name: String,
    pub email_address: String,
    pub date: String,
    pub time: String,
    pub room_type: RoomType,
    pub room_name: RoomName,
    pub branch_name: BranchName,
    // Present only for meeting rooms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub created_at: String,
}
