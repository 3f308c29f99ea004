use super::{json_pretty, EXIT_SUCCESS};
use carrel_core::SeedReport;

pub fn run(report: &SeedReport, json: bool) -> Result<u8, String> {
    if json {
        println!("{}", json_pretty(report)?);
    } else {
        println!(
            "catalog seeded: {} created, {} already present",
            report.created, report.skipped
        );
    }
    Ok(EXIT_SUCCESS)
}
