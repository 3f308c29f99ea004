//! Built-in room catalog used to seed a fresh store.
//!
//! The catalog is the immutable initial set of rooms; seeding never
//! overwrites a room that already exists in the store, so live
//! availability survives a restart.

use crate::room::Room;
use crate::SchemaError;

/// The built-in catalog, embedded so a fresh store can be seeded without
/// any external data file.
pub const BUILTIN_CATALOG: &str = r#"[
  {
    "id": "central-mr-4a",
    "name": "Bluebonnet Room",
    "room_type": "meeting-room",
    "capacity": 20,
    "amenities": { "screen_mirroring": true, "video_output": true, "whiteboard": true },
    "date": "2025-09-08",
    "available_times": ["10:00 AM", "11:00 AM", "1:00 PM", "2:00 PM", "3:30 PM"],
    "branch": {
      "name": "Central Library",
      "floor": 4,
      "address": "710 W. Cesar Chavez St.",
      "image": "branches/central.webp"
    }
  },
  {
    "id": "central-slr-2b",
    "name": "Mockingbird Study",
    "room_type": "shared-learning-room",
    "capacity": 6,
    "amenities": { "screen_mirroring": true, "video_output": false, "whiteboard": true },
    "date": "2025-09-08",
    "available_times": ["9:30 AM", "10:30 AM", "12:00 PM", "2:30 PM", "4:00 PM"],
    "branch": {
      "name": "Central Library",
      "floor": 2,
      "address": "710 W. Cesar Chavez St.",
      "image": "branches/central.webp"
    }
  },
  {
    "id": "central-slr-2c",
    "name": "Pecan Study",
    "room_type": "shared-learning-room",
    "capacity": 4,
    "amenities": { "screen_mirroring": false, "video_output": false, "whiteboard": true },
    "date": "2025-09-08",
    "available_times": ["9:30 AM", "11:30 AM", "1:30 PM", "3:30 PM"],
    "branch": {
      "name": "Central Library",
      "floor": 2,
      "address": "710 W. Cesar Chavez St.",
      "image": "branches/central.webp"
    }
  },
  {
    "id": "riverside-mr-1",
    "name": "Cypress Room",
    "room_type": "meeting-room",
    "capacity": 12,
    "amenities": { "screen_mirroring": false, "video_output": true, "whiteboard": true },
    "date": "2025-09-08",
    "available_times": ["10:00 AM", "12:00 PM", "2:00 PM", "4:00 PM"],
    "branch": {
      "name": "Riverside Branch",
      "floor": 1,
      "address": "2410 Grove Blvd.",
      "image": "branches/riverside.webp"
    }
  },
  {
    "id": "riverside-slr-3",
    "name": "Willow Study",
    "room_type": "shared-learning-room",
    "capacity": 8,
    "amenities": { "screen_mirroring": true, "video_output": true, "whiteboard": false },
    "date": "2025-09-09",
    "available_times": ["9:00 AM", "10:00 AM", "11:00 AM", "1:00 PM"],
    "branch": {
      "name": "Riverside Branch",
      "floor": 1,
      "address": "2410 Grove Blvd.",
      "image": "branches/riverside.webp"
    }
  },
  {
    "id": "northvillage-mr-2",
    "name": "Laurel Room",
    "room_type": "meeting-room",
    "capacity": 30,
    "amenities": { "screen_mirroring": true, "video_output": true, "whiteboard": false },
    "date": "2025-09-09",
    "available_times": ["10:30 AM", "1:30 PM", "3:00 PM", "5:00 PM"],
    "branch": {
      "name": "North Village Branch",
      "floor": 2,
      "address": "2505 Steck Ave.",
      "image": "branches/north-village.webp"
    }
  }
]"#;

/// Parse the built-in catalog and check each entry's invariants.
pub fn builtin_rooms() -> Result<Vec<Room>, SchemaError> {
    let rooms: Vec<Room> = serde_json::from_str(BUILTIN_CATALOG)?;
    for room in &rooms {
        room.validate()?;
    }
    Ok(rooms)
}
