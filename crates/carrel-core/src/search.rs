//! Availability search criteria and the pure matching predicate.
//!
//! Every criterion is optional; an absent criterion imposes no
//! constraint. The one check that needs store access — whether a
//! competing reservation occupies the requested slot — lives in the
//! engine; everything here is a pure function of the room.

use carrel_schema::Room;
use chrono::NaiveDate;
use tracing::warn;

/// Partial amenity constraints. A supplied flag must equal the room's
/// flag exactly, so `Some(false)` finds rooms *without* the amenity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AmenityFilter {
    pub screen_mirroring: Option<bool>,
    pub video_output: Option<bool>,
    pub whiteboard: Option<bool>,
}

impl AmenityFilter {
    fn matches(&self, room: &Room) -> bool {
        let flag_ok = |want: Option<bool>, have: bool| want.is_none_or(|w| w == have);
        flag_ok(self.screen_mirroring, room.amenities.screen_mirroring)
            && flag_ok(self.video_output, room.amenities.video_output)
            && flag_ok(self.whiteboard, room.amenities.whiteboard)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    /// Branch name, matched by equality.
    pub location: Option<String>,
    /// Calendar day the room must be bookable on.
    pub date: Option<NaiveDate>,
    /// Time label that must be among the room's open slots (and, checked
    /// by the engine, not already reserved).
    pub time: Option<String>,
    /// Minimum seat count.
    pub capacity: Option<u32>,
    pub amenities: AmenityFilter,
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Whether `room` satisfies every store-independent criterion.
pub(crate) fn room_matches(room: &Room, criteria: &SearchCriteria) -> bool {
    if let Some(location) = &criteria.location {
        if room.branch.name != *location {
            return false;
        }
    }
    if let Some(date) = criteria.date {
        // Calendar-day comparison, not string comparison; a room whose
        // stored date does not parse can never match a date criterion.
        match room.date.parse::<NaiveDate>() {
            Ok(room_date) if room_date == date => {}
            Ok(_) => return false,
            Err(e) => {
                warn!("room '{}' has unparseable date '{}': {e}", room.id, room.date);
                return false;
            }
        }
    }
    if let Some(time) = &criteria.time {
        if !room.available_times.contains(time) {
            return false;
        }
    }
    if let Some(capacity) = criteria.capacity {
        if room.capacity < capacity {
            return false;
        }
    }
    criteria.amenities.matches(room)
}

#[cfg(test)]
mod tests {
    use super::*;
    use carrel_schema::{Amenities, Branch, BranchName, RoomId, RoomName, RoomType};

    fn sample_room() -> Room {
        Room {
            id: RoomId::new("r1"),
            name: RoomName::new("Bluebonnet Room"),
            room_type: RoomType::MeetingRoom,
            capacity: 12,
            amenities: Amenities {
                screen_mirroring: true,
                video_output: false,
                whiteboard: true,
            },
            date: "2024-10-14".to_owned(),
            available_times: vec!["2:00 PM".to_owned(), "2:30 PM".to_owned()],
            branch: Branch {
                name: BranchName::new("Central Library"),
                floor: 4,
                address: "710 W. Cesar Chavez St.".to_owned(),
                image: "branches/central.webp".to_owned(),
            },
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn empty_criteria_match_everything() {
        assert!(room_matches(&sample_room(), &SearchCriteria::new()));
    }

    #[test]
    fn location_equality() {
        let mut criteria = SearchCriteria::new();
        criteria.location = Some("Central Library".to_owned());
        assert!(room_matches(&sample_room(), &criteria));
        criteria.location = Some("Riverside Branch".to_owned());
        assert!(!room_matches(&sample_room(), &criteria));
    }

    #[test]
    fn date_is_calendar_day_equality() {
        let mut criteria = SearchCriteria::new();
        criteria.date = Some(date("2024-10-14"));
        assert!(room_matches(&sample_room(), &criteria));
        criteria.date = Some(date("2024-10-15"));
        assert!(!room_matches(&sample_room(), &criteria));
    }

    #[test]
    fn unparseable_room_date_never_matches() {
        let mut room = sample_room();
        room.date = "October 14th".to_owned();
        let mut criteria = SearchCriteria::new();
        criteria.date = Some(date("2024-10-14"));
        assert!(!room_matches(&room, &criteria));
        // ...but a room with a bad date still matches date-free criteria.
        assert!(room_matches(&room, &SearchCriteria::new()));
    }

    #[test]
    fn time_requires_open_slot() {
        let mut criteria = SearchCriteria::new();
        criteria.time = Some("2:30 PM".to_owned());
        assert!(room_matches(&sample_room(), &criteria));
        criteria.time = Some("9:00 AM".to_owned());
        assert!(!room_matches(&sample_room(), &criteria));
    }

    #[test]
    fn capacity_is_a_minimum() {
        let mut criteria = SearchCriteria::new();
        criteria.capacity = Some(12);
        assert!(room_matches(&sample_room(), &criteria));
        criteria.capacity = Some(13);
        assert!(!room_matches(&sample_room(), &criteria));
    }

    #[test]
    fn amenity_flags_must_equal_when_supplied() {
        let mut criteria = SearchCriteria::new();
        criteria.amenities.screen_mirroring = Some(true);
        criteria.amenities.whiteboard = Some(true);
        assert!(room_matches(&sample_room(), &criteria));

        // Some(false) means "must not have it".
        criteria.amenities.video_output = Some(false);
        assert!(room_matches(&sample_room(), &criteria));
        criteria.amenities.video_output = Some(true);
        assert!(!room_matches(&sample_room(), &criteria));
    }

    #[test]
    fn all_criteria_combine_conjunctively() {
        let mut criteria = SearchCriteria::new();
        criteria.location = Some("Central Library".to_owned());
        criteria.date = Some(date("2024-10-14"));
        criteria.time = Some("2:00 PM".to_owned());
        criteria.capacity = Some(10);
        criteria.amenities.whiteboard = Some(true);
        assert!(room_matches(&sample_room(), &criteria));

        criteria.capacity = Some(100);
        assert!(!room_matches(&sample_room(), &criteria));
    }
}
