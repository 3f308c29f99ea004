mod commands;

use clap::{Parser, Subcommand};
use commands::{EXIT_STORE_ERROR, EXIT_VALIDATION_ERROR};
use carrel_core::{AmenityFilter, Delay, Engine, SearchCriteria};
use carrel_schema::{builtin_rooms, RequestBase, ReservationRequest, RoomId};
use carrel_store::FileStore;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(
    name = "carrel",
    version,
    about = "Reserve library meeting rooms from the terminal"
)]
struct Cli {
    /// Path to the reservation store directory.
    #[arg(long, default_value = "~/.local/share/carrel")]
    store: String,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    /// Maximum artificial latency in milliseconds (0 disables). Useful
    /// when exercising a front end's loading states.
    #[arg(long, default_value_t = 0, global = true)]
    delay_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Seed the built-in room catalog into the store.
    Seed,
    /// List rooms matching the given criteria.
    Rooms {
        /// Branch name (exact match).
        #[arg(long)]
        location: Option<String>,
        /// Calendar day, YYYY-MM-DD.
        #[arg(long)]
        date: Option<String>,
        /// Time slot label, e.g. "2:30 PM".
        #[arg(long)]
        time: Option<String>,
        /// Minimum seat count.
        #[arg(long)]
        capacity: Option<u32>,
        /// Require (true) or exclude (false) screen mirroring.
        #[arg(long)]
        screen_mirroring: Option<bool>,
        /// Require (true) or exclude (false) video output.
        #[arg(long)]
        video_output: Option<bool>,
        /// Require (true) or exclude (false) a whiteboard.
        #[arg(long)]
        whiteboard: Option<bool>,
    },
    /// Reserve a room slot.
    Reserve {
        #[arg(long)]
        room_id: String,
        /// "meeting-room" or "shared-learning-room".
        #[arg(long)]
        room_type: String,
        #[arg(long)]
        topic: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Calendar day, YYYY-MM-DD.
        #[arg(long)]
        date: String,
        /// Time slot label, e.g. "2:30 PM".
        #[arg(long)]
        time: String,
        /// Organization name (meeting rooms only).
        #[arg(long)]
        org_name: Option<String>,
        /// Organization purpose (meeting rooms only).
        #[arg(long)]
        org_purpose: Option<String>,
        /// Organization website (meeting rooms only, optional).
        #[arg(long)]
        website: Option<String>,
        /// Contact phone number (meeting rooms only).
        #[arg(long)]
        phone: Option<String>,
        /// Write the reservation JSON here; `cancel --file` takes it back.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Cancel a reservation from its saved JSON file.
    Cancel {
        /// Reservation JSON, as written by `reserve --out` or `--json`.
        #[arg(long)]
        file: PathBuf,
    },
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe") || msg.contains("failed printing to stdout") {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("CARREL_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .init();

    let store = match FileStore::open(expand_tilde(&cli.store)) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("error: opening store: {e}");
            return ExitCode::from(EXIT_STORE_ERROR);
        }
    };
    let engine = Engine::with_delay(
        Arc::new(store),
        Delay::up_to(Duration::from_millis(cli.delay_ms)),
    );

    // Bootstrap the catalog once per process; idempotent, and only store
    // failure is fatal.
    let catalog = match builtin_rooms() {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("error: built-in catalog: {e}");
            return ExitCode::from(EXIT_STORE_ERROR);
        }
    };
    let seed_report = match engine.seed(&catalog) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: seeding catalog: {e}");
            return ExitCode::from(EXIT_STORE_ERROR);
        }
    };

    let json = cli.json;
    let result = match cli.command {
        Commands::Seed => commands::seed::run(&seed_report, json),
        Commands::Rooms {
            location,
            date,
            time,
            capacity,
            screen_mirroring,
            video_output,
            whiteboard,
        } => {
            let date = match date.as_deref().map(str::parse::<chrono::NaiveDate>) {
                None => None,
                Some(Ok(date)) => Some(date),
                Some(Err(e)) => {
                    eprintln!("error: --date must be YYYY-MM-DD: {e}");
                    return ExitCode::from(EXIT_VALIDATION_ERROR);
                }
            };
            let criteria = SearchCriteria {
                location,
                date,
                time,
                capacity,
                amenities: AmenityFilter {
                    screen_mirroring,
                    video_output,
                    whiteboard,
                },
            };
            commands::rooms::run(&engine, &criteria, json)
        }
        Commands::Reserve {
            room_id,
            room_type,
            topic,
            name,
            email,
            date,
            time,
            org_name,
            org_purpose,
            website,
            phone,
            out,
        } => {
            let base = RequestBase {
                room_id: RoomId::new(room_id),
                meeting_topic: topic,
                full_name: name,
                email_address: email,
                date,
                time,
            };
            let request = match room_type.as_str() {
                "meeting-room" => ReservationRequest::MeetingRoom {
                    base,
                    org_name: org_name.unwrap_or_default(),
                    org_purpose: org_purpose.unwrap_or_default(),
                    website,
                    phone_number: phone.unwrap_or_default(),
                },
                "shared-learning-room" => ReservationRequest::SharedLearningRoom { base },
                other => {
                    eprintln!(
                        "error: unknown room type '{other}' \
                         (expected 'meeting-room' or 'shared-learning-room')"
                    );
                    return ExitCode::from(EXIT_VALIDATION_ERROR);
                }
            };
            commands::reserve::run(&engine, &request, out.as_deref(), json)
        }
        Commands::Cancel { file } => commands::cancel::run(&engine, &file, json),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(commands::EXIT_FAILURE)
        }
    }
}
