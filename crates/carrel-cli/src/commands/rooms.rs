use super::{colorize_room_type, json_pretty, report_error, spinner, EXIT_SUCCESS};
use carrel_core::{Engine, SearchCriteria};

pub fn run(engine: &Engine, criteria: &SearchCriteria, json: bool) -> Result<u8, String> {
    let rooms = if json {
        engine.search(criteria)
    } else {
        let pb = spinner("searching rooms...");
        let result = engine.search(criteria);
        pb.finish_and_clear();
        result
    };
    let rooms = match rooms {
        Ok(rooms) => rooms,
        Err(e) => return Ok(report_error(&e)),
    };

    if json {
        println!("{}", json_pretty(&rooms)?);
    } else if rooms.is_empty() {
        println!("no rooms match");
    } else {
        println!(
            "{:<20} {:<22} {:<22} {:>4}  {:<12} TIMES",
            "ID", "BRANCH", "TYPE", "CAP", "DATE"
        );
        for room in &rooms {
            println!(
                "{:<20} {:<22} {:<22} {:>4}  {:<12} {}",
                room.id,
                room.branch.name,
                colorize_room_type(&room.room_type.to_string()),
                room.capacity,
                room.date,
                room.available_times.join(", ")
            );
        }
    }
    Ok(EXIT_SUCCESS)
}
