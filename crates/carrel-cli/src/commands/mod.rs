pub mod cancel;
pub mod reserve;
pub mod rooms;
pub mod seed;

use carrel_core::ReservationError;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_VALIDATION_ERROR: u8 = 2;
pub const EXIT_STORE_ERROR: u8 = 3;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

/// Print a domain error and pick the exit code for its kind.
pub fn report_error(e: &ReservationError) -> u8 {
    eprintln!("error: {e}");
    match e {
        ReservationError::Validation(_) => EXIT_VALIDATION_ERROR,
        ReservationError::StoreUnavailable(_) => EXIT_STORE_ERROR,
        _ => EXIT_FAILURE,
    }
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .expect("valid template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn spin_ok(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✓ {msg}"));
}

pub fn spin_fail(pb: &ProgressBar) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message("✗ failed".to_owned());
}

pub fn colorize_room_type(room_type: &str) -> String {
    match room_type {
        "meeting-room" => console::style(room_type).magenta().to_string(),
        "shared-learning-room" => console::style(room_type).cyan().to_string(),
        other => other.to_owned(),
    }
}
