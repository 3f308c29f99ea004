use super::{
    json_pretty, report_error, spin_fail, spin_ok, spinner, EXIT_FAILURE, EXIT_SUCCESS,
    EXIT_VALIDATION_ERROR,
};
use carrel_core::Engine;
use carrel_schema::Reservation;
use std::path::Path;

pub fn run(engine: &Engine, file: &Path, json: bool) -> Result<u8, String> {
    // An unreadable file is an I/O problem; only content that fails to
    // parse as a reservation is a validation problem.
    let content = match std::fs::read_to_string(file) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("error: reading {}: {e}", file.display());
            return Ok(EXIT_FAILURE);
        }
    };
    let reservation: Reservation = match serde_json::from_str(&content) {
        Ok(reservation) => reservation,
        Err(e) => {
            eprintln!("error: {} is not a reservation: {e}", file.display());
            return Ok(EXIT_VALIDATION_ERROR);
        }
    };

    let cancelled = if json {
        engine.cancel(&reservation)
    } else {
        let pb = spinner("cancelling reservation...");
        let result = engine.cancel(&reservation);
        match &result {
            Ok(r) => spin_ok(&pb, &format!("cancelled {} at {} {}", r.room_name, r.date, r.time)),
            Err(_) => spin_fail(&pb),
        }
        result
    };
    match cancelled {
        Ok(cancelled) => {
            if json {
                println!("{}", json_pretty(&cancelled)?);
            } else {
                println!(
                    "slot {} {} at {} is open again",
                    cancelled.date, cancelled.time, cancelled.branch_name
                );
            }
            Ok(EXIT_SUCCESS)
        }
        Err(e) => Ok(report_error(&e)),
    }
}
