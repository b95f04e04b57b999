//! # timetable-engine
//!
//! Deterministic conflict detection for university timetables.
//!
//! Given a proposed class session (date, time range, room, teacher, student
//! group) and the sessions already booked that day, the engine reports every
//! overlap that puts the same room, teacher or group in two places at once.
//! Detection is a pure function over in-memory data; fetching the day's
//! sessions and persisting the result belong to the caller.
//!
//! ## Modules
//!
//! - [`clock`] — Minutes-since-midnight time of day, time slots, and the UTC
//!   wall-clock conversion for stored timestamps
//! - [`session`] — Sessions, candidates and schedulable resources
//! - [`conflict`] — Room / teacher / group clash detection
//! - [`pool`] — Select the same-day sessions a candidate must be checked against
//! - [`validation`] — Caller-side checks on raw session input
//! - [`timetable`] — In-memory schedule that rejects clashing writes
//! - [`error`] — Error types

pub mod clock;
pub mod conflict;
pub mod error;
pub mod pool;
pub mod session;
pub mod timetable;
pub mod validation;

pub use clock::{wall_clock, ClockTime, TimeSlot};
pub use conflict::{detect_conflicts, Conflict, ConflictKind};
pub use error::TimetableError;
pub use pool::candidate_pool;
pub use session::{Candidate, Resource, Session, SessionId, StoredSession};
pub use timetable::Timetable;
pub use validation::{validate_candidate, SessionInput, ValidationError, ValidationErrorKind};
