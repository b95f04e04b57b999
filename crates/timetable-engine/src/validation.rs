//! Caller-side validation of session input.
//!
//! The conflict detector assumes a well-formed candidate. Anything arriving
//! from a form or an API body goes through [`validate_candidate`] first, which
//! reports every problem at once instead of stopping at the first one:
//! - Missing date, start, end or group
//! - Unparseable dates and times
//! - Empty or inverted time ranges
//! - Blank resource identifiers

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::clock::{wall_clock, ClockTime, TimeSlot};
use crate::error::{Result, TimetableError};
use crate::session::{Candidate, Resource, SessionId};

/// Validation result.
pub type ValidationResult<T> = std::result::Result<T, Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    /// Input field the error refers to.
    pub field: &'static str,
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// A required field is absent or blank.
    Missing,
    /// A field could not be parsed.
    Malformed,
    /// The end time is not after the start time.
    EmptyTimeRange,
    /// A resource was given with a blank id.
    EmptyIdentifier,
}

impl ValidationError {
    fn new(field: &'static str, kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            field,
            kind,
            message: message.into(),
        }
    }
}

/// A proposed session as submitted by a client, before any checking.
///
/// `date` accepts either `YYYY-MM-DD` or an RFC 3339 timestamp, whose UTC
/// calendar date is used. `start` and `end` are `HH:MM`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionInput {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub room: Option<Resource>,
    #[serde(default)]
    pub teacher: Option<Resource>,
    #[serde(default)]
    pub group: Option<Resource>,
    #[serde(default)]
    pub subject: Option<Resource>,
    #[serde(default)]
    pub exclude_id: Option<SessionId>,
}

impl SessionInput {
    /// Validate and convert, folding all problems into [`TimetableError::Invalid`].
    pub fn into_candidate(self) -> Result<Candidate> {
        validate_candidate(&self).map_err(TimetableError::Invalid)
    }
}

/// Validates a session input and builds the candidate the detector expects.
///
/// # Returns
/// `Ok(candidate)` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_candidate(input: &SessionInput) -> ValidationResult<Candidate> {
    let mut errors = Vec::new();

    let date = required(&input.date, "date", &mut errors).and_then(|raw| match parse_date(raw) {
        Some(date) => Some(date),
        None => {
            errors.push(ValidationError::new(
                "date",
                ValidationErrorKind::Malformed,
                format!("'{}' is not a date (expected YYYY-MM-DD)", raw),
            ));
            None
        }
    });

    let start = parse_clock(&input.start, "start", &mut errors);
    let end = parse_clock(&input.end, "end", &mut errors);

    let time = match (start, end) {
        (Some(start), Some(end)) => match TimeSlot::new(start, end) {
            Ok(slot) => Some(slot),
            Err(_) => {
                errors.push(ValidationError::new(
                    "end",
                    ValidationErrorKind::EmptyTimeRange,
                    format!("end {} must be after start {}", end, start),
                ));
                None
            }
        },
        _ => None,
    };

    let group = match &input.group {
        Some(group) => Some(group.clone()),
        None => {
            errors.push(ValidationError::new(
                "group",
                ValidationErrorKind::Missing,
                "group is required",
            ));
            None
        }
    };

    for (field, resource) in [
        ("room", &input.room),
        ("teacher", &input.teacher),
        ("group", &input.group),
        ("subject", &input.subject),
    ] {
        if let Some(resource) = resource {
            if resource.id.trim().is_empty() {
                errors.push(ValidationError::new(
                    field,
                    ValidationErrorKind::EmptyIdentifier,
                    format!("{} id must not be blank", field),
                ));
            }
        }
    }

    match (date, time, group) {
        (Some(date), Some(time), Some(group)) if errors.is_empty() => Ok(Candidate {
            date,
            time,
            room: input.room.clone(),
            teacher: input.teacher.clone(),
            group,
            subject: input.subject.clone(),
            exclude_id: input.exclude_id,
        }),
        _ => Err(errors),
    }
}

fn required<'a>(
    value: &'a Option<String>,
    field: &'static str,
    errors: &mut Vec<ValidationError>,
) -> Option<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(raw),
        _ => {
            errors.push(ValidationError::new(
                field,
                ValidationErrorKind::Missing,
                format!("{} is required", field),
            ));
            None
        }
    }
}

fn parse_clock(
    value: &Option<String>,
    field: &'static str,
    errors: &mut Vec<ValidationError>,
) -> Option<ClockTime> {
    let raw = required(value, field, errors)?;
    match raw.parse::<ClockTime>() {
        Ok(time) => Some(time),
        Err(_) => {
            errors.push(ValidationError::new(
                field,
                ValidationErrorKind::Malformed,
                format!("'{}' is not a time of day (expected HH:MM)", raw),
            ));
            None
        }
    }
}

/// Accept a plain calendar date, or a timestamp whose UTC date is taken.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| wall_clock(&ts).0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> SessionInput {
        SessionInput {
            date: Some("2025-11-10".into()),
            start: Some("08:30".into()),
            end: Some("10:00".into()),
            room: Some(Resource::named("A9")),
            teacher: None,
            group: Some(Resource::named("G1")),
            subject: None,
            exclude_id: None,
        }
    }

    fn kinds(errors: &[ValidationError]) -> Vec<(&'static str, ValidationErrorKind)> {
        errors.iter().map(|e| (e.field, e.kind)).collect()
    }

    #[test]
    fn valid_input_builds_candidate() {
        let candidate = validate_candidate(&input()).unwrap();
        assert_eq!(candidate.date, NaiveDate::from_ymd_opt(2025, 11, 10).unwrap());
        assert_eq!(candidate.time.to_string(), "08:30-10:00");
        assert_eq!(candidate.group.id, "G1");
    }

    #[test]
    fn reports_every_missing_field() {
        let errors = validate_candidate(&SessionInput::default()).unwrap_err();
        assert_eq!(
            kinds(&errors),
            vec![
                ("date", ValidationErrorKind::Missing),
                ("start", ValidationErrorKind::Missing),
                ("end", ValidationErrorKind::Missing),
                ("group", ValidationErrorKind::Missing),
            ]
        );
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let mut raw = input();
        raw.start = Some("  ".into());
        let errors = validate_candidate(&raw).unwrap_err();
        assert_eq!(kinds(&errors), vec![("start", ValidationErrorKind::Missing)]);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let mut raw = input();
        raw.end = Some("08:30".into());
        let errors = validate_candidate(&raw).unwrap_err();
        assert_eq!(
            kinds(&errors),
            vec![("end", ValidationErrorKind::EmptyTimeRange)]
        );
    }

    #[test]
    fn malformed_values_are_reported() {
        let mut raw = input();
        raw.date = Some("10/11/2025".into());
        raw.start = Some("8h30".into());
        raw.teacher = Some(Resource::named(" "));
        let errors = validate_candidate(&raw).unwrap_err();
        assert_eq!(
            kinds(&errors),
            vec![
                ("date", ValidationErrorKind::Malformed),
                ("start", ValidationErrorKind::Malformed),
                ("teacher", ValidationErrorKind::EmptyIdentifier),
            ]
        );
    }

    #[test]
    fn timestamp_dates_use_the_utc_calendar_day() {
        let mut raw = input();
        // 00:30 in Paris is still the previous day in UTC.
        raw.date = Some("2025-11-11T00:30:00+01:00".into());
        let candidate = validate_candidate(&raw).unwrap();
        assert_eq!(candidate.date, NaiveDate::from_ymd_opt(2025, 11, 10).unwrap());
    }
}
