use carrel_core::{Engine, SearchCriteria};
use carrel_schema::{
    Amenities, Branch, BranchName, RequestBase, ReservationRequest, Room, RoomId, RoomName,
    RoomType,
};
use carrel_store::MemoryStore;
use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

fn bench_room(id: &str, slots: usize) -> Room {
    Room {
        id: RoomId::new(id),
        name: RoomName::new("Bench Room"),
        room_type: RoomType::SharedLearningRoom,
        capacity: 8,
        amenities: Amenities {
            screen_mirroring: true,
            video_output: true,
            whiteboard: true,
        },
        date: "2024-10-14".to_owned(),
        available_times: (0..slots).map(|i| format!("{i:02}:00")).collect(),
        branch: Branch {
            name: BranchName::new("Central Library"),
            floor: 1,
            address: "710 W. Cesar Chavez St.".to_owned(),
            image: "branches/central.webp".to_owned(),
        },
    }
}

fn request(room_id: &str, time: &str) -> ReservationRequest {
    ReservationRequest::SharedLearningRoom {
        base: RequestBase {
            room_id: RoomId::new(room_id),
            meeting_topic: "Bench".to_owned(),
            full_name: "Bench User".to_owned(),
            email_address: "bench@example.com".to_owned(),
            date: "2024-10-14".to_owned(),
            time: time.to_owned(),
        },
    }
}

fn reserve_cancel_roundtrip(c: &mut Criterion) {
    let engine = Engine::new(Arc::new(MemoryStore::new()));
    engine.seed(&[bench_room("r1", 8)]).unwrap();

    c.bench_function("reserve_cancel_roundtrip", |b| {
        b.iter(|| {
            let reservation = engine.reserve(&request("r1", "03:00")).unwrap();
            engine.cancel(&reservation).unwrap();
        });
    });
}

fn search_hundred_rooms(c: &mut Criterion) {
    let engine = Engine::new(Arc::new(MemoryStore::new()));
    let catalog: Vec<Room> = (0..100).map(|i| bench_room(&format!("r{i}"), 8)).collect();
    engine.seed(&catalog).unwrap();

    let mut criteria = SearchCriteria::new();
    criteria.capacity = Some(4);
    criteria.time = Some("03:00".to_owned());

    c.bench_function("search_hundred_rooms", |b| {
        b.iter(|| engine.search(&criteria).unwrap());
    });
}

criterion_group!(benches, reserve_cancel_roundtrip, search_hundred_rooms);
criterion_main!(benches);
