//! Error types for timetable-engine operations.

use thiserror::Error;

use crate::conflict::Conflict;
use crate::session::SessionId;
use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum TimetableError {
    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Invalid time slot: {0}")]
    InvalidTimeSlot(String),

    #[error("No session ids left")]
    IdsExhausted,

    #[error("Invalid session: {}", join_messages(.0))]
    Invalid(Vec<ValidationError>),

    #[error("Session {0} not found")]
    NotFound(SessionId),

    #[error("Session {0} already exists")]
    DuplicateSession(SessionId),

    /// The write was rejected because the session clashes with existing bookings.
    #[error("Scheduling conflict: {}", join_conflicts(.0))]
    Conflict(Vec<Conflict>),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

fn join_conflicts(conflicts: &[Conflict]) -> String {
    conflicts
        .iter()
        .map(|c| c.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, TimetableError>;
