use super::{json_pretty, report_error, spin_fail, spin_ok, spinner, EXIT_SUCCESS};
use carrel_core::Engine;
use carrel_schema::ReservationRequest;
use std::path::Path;

pub fn run(
    engine: &Engine,
    request: &ReservationRequest,
    out: Option<&Path>,
    json: bool,
) -> Result<u8, String> {
    let reservation = if json {
        engine.reserve(request)
    } else {
        let pb = spinner("reserving room...");
        let result = engine.reserve(request);
        match &result {
            Ok(r) => spin_ok(&pb, &format!("reserved {} at {} {}", r.room_name, r.date, r.time)),
            Err(_) => spin_fail(&pb),
        }
        result
    };
    let reservation = match reservation {
        Ok(reservation) => reservation,
        Err(e) => return Ok(report_error(&e)),
    };

    // The cancel command takes this file back, so always offer the JSON.
    if let Some(path) = out {
        let payload = json_pretty(&reservation)?;
        std::fs::write(path, payload).map_err(|e| format!("writing {}: {e}", path.display()))?;
    }

    if json {
        println!("{}", json_pretty(&reservation)?);
    } else {
        println!("room:    {} ({})", reservation.room_name, reservation.room_id);
        println!("branch:  {}", reservation.branch_name);
        println!("slot:    {} {}", reservation.date, reservation.time);
        println!("holder:  {} <{}>", reservation.full_name, reservation.email_address);
        if let Some(out) = out {
            println!("saved:   {}", out.display());
        }
    }
    Ok(EXIT_SUCCESS)
}
