//! `timetable` CLI — check and book class sessions against a timetable file.
//!
//! The timetable file is a JSON array of sessions. Candidates are JSON
//! objects with `date`, `start`, `end`, `group` and optional `room`,
//! `teacher` and `subject`.
//!
//! ## Usage
//!
//! ```sh
//! # Would this session clash with anything? (candidate on stdin)
//! echo '{"date":"2025-11-10","start":"08:30","end":"10:00","room":{"id":"A9"},"group":{"id":"G2"}}' \
//!   | timetable check -s sessions.json
//!
//! # Book it if it doesn't clash
//! timetable add -s sessions.json -c candidate.json
//!
//! # Move session 4, ignoring its own previous slot
//! timetable update -s sessions.json --id 4 -c candidate.json
//!
//! # Drop a session, or list one day
//! timetable remove -s sessions.json --id 4
//! timetable day -s sessions.json --date 2025-11-10
//! ```
//!
//! `--sessions` may be replaced by the `TIMETABLE_SESSIONS` environment
//! variable. Logs go to stderr; set `RUST_LOG` or pass `-v` / `-vv`.
//! Exit status is 0 on success, 2 when the candidate conflicts, 1 on errors.

use std::io::{self, Read, Write};
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};
use tempfile::NamedTempFile;
use timetable_engine::{
    Candidate, Conflict, Session, SessionId, SessionInput, Timetable, TimetableError,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Exit status used when the candidate clashes with the timetable.
const CONFLICT_EXIT_CODE: i32 = 2;

#[derive(Parser)]
#[command(
    name = "timetable",
    version,
    about = "Check and book class sessions without room, teacher or group clashes"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// More logging on stderr (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Args)]
struct Store {
    /// Timetable file (JSON array of sessions); a missing file is an empty timetable
    #[arg(short, long, env = "TIMETABLE_SESSIONS")]
    sessions: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Report the conflicts a candidate session would cause
    Check {
        #[command(flatten)]
        store: Store,
        /// Candidate JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        candidate: Option<String>,
        /// Session id to ignore, when re-checking an existing session
        #[arg(long)]
        exclude: Option<u64>,
    },
    /// Store a new session unless it conflicts
    Add {
        #[command(flatten)]
        store: Store,
        /// Candidate JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        candidate: Option<String>,
    },
    /// Replace an existing session unless the new version conflicts
    Update {
        #[command(flatten)]
        store: Store,
        /// Id of the session to replace
        #[arg(long)]
        id: u64,
        /// Candidate JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        candidate: Option<String>,
    },
    /// Delete a session
    Remove {
        #[command(flatten)]
        store: Store,
        /// Id of the session to delete
        #[arg(long)]
        id: u64,
    },
    /// List the sessions of one day, ordered by start time
    Day {
        #[command(flatten)]
        store: Store,
        /// Calendar date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Check {
            store,
            candidate,
            exclude,
        } => {
            let timetable = load_timetable(&store.sessions)?;
            let mut candidate = read_candidate(candidate.as_deref())?;
            if let Some(id) = exclude {
                candidate.exclude_id = Some(SessionId(id));
            }

            let conflicts = timetable.check(&candidate);
            if !conflicts.is_empty() {
                exit_with_conflicts(&conflicts)?;
            }
            info!(date = %candidate.date, time = %candidate.time, "no conflicts");
            println!("[]");
        }
        Commands::Add { store, candidate } => {
            let mut timetable = load_timetable(&store.sessions)?;
            let candidate = read_candidate(candidate.as_deref())?;

            let created = match timetable.create(candidate) {
                Ok(session) => session.clone(),
                Err(TimetableError::Conflict(conflicts)) => return exit_with_conflicts(&conflicts),
                Err(e) => return Err(e).context("Failed to add session"),
            };

            save_timetable(&store.sessions, timetable)?;
            print_json(&created)?;
        }
        Commands::Update {
            store,
            id,
            candidate,
        } => {
            let mut timetable = load_timetable(&store.sessions)?;
            let candidate = read_candidate(candidate.as_deref())?;

            let updated = match timetable.update(SessionId(id), candidate) {
                Ok(session) => session.clone(),
                Err(TimetableError::Conflict(conflicts)) => return exit_with_conflicts(&conflicts),
                Err(e) => return Err(e).context("Failed to update session"),
            };

            save_timetable(&store.sessions, timetable)?;
            print_json(&updated)?;
        }
        Commands::Remove { store, id } => {
            let mut timetable = load_timetable(&store.sessions)?;
            let removed = timetable
                .remove(SessionId(id))
                .context("Failed to remove session")?;

            save_timetable(&store.sessions, timetable)?;
            print_json(&removed)?;
        }
        Commands::Day { store, date } => {
            let timetable = load_timetable(&store.sessions)?;
            let day = timetable.sessions_on(date);
            print_json(&day)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Print the conflict list on stdout and leave with [`CONFLICT_EXIT_CODE`].
fn exit_with_conflicts(conflicts: &[Conflict]) -> Result<()> {
    print_json(conflicts)?;
    for conflict in conflicts {
        eprintln!("conflict ({}): {}", conflict.kind, conflict.message);
    }
    process::exit(CONFLICT_EXIT_CODE);
}

fn load_timetable(path: &str) -> Result<Timetable> {
    if !Path::new(path).exists() {
        debug!(path, "timetable file missing, starting empty");
        return Ok(Timetable::new());
    }

    let raw =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))?;
    let sessions: Vec<Session> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse timetable file: {}", path))?;
    debug!(path, sessions = sessions.len(), "timetable loaded");

    Timetable::from_sessions(sessions)
        .with_context(|| format!("Failed to load timetable: {}", path))
}

/// Replace the timetable file atomically: the new contents go to a temporary
/// file in the same directory, which is then renamed over `path`.
fn save_timetable(path: &str, timetable: Timetable) -> Result<()> {
    let sessions = timetable.into_sessions();
    let mut json = serde_json::to_string_pretty(&sessions)?;
    json.push('\n');

    let dir = match Path::new(path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    tmp.write_all(json.as_bytes())
        .and_then(|()| tmp.as_file().sync_all())
        .with_context(|| format!("Failed to write temporary file for {}", path))?;
    tmp.persist(path)
        .with_context(|| format!("Failed to write file: {}", path))?;

    debug!(path, sessions = sessions.len(), "timetable saved");
    Ok(())
}

fn read_candidate(path: Option<&str>) -> Result<Candidate> {
    let raw = read_input(path)?;
    let input: SessionInput =
        serde_json::from_str(&raw).context("Failed to parse candidate JSON")?;
    input
        .into_candidate()
        .context("Candidate session is not valid")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
