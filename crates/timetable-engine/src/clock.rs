//! Canonical time-of-day values for same-day session comparison.
//!
//! All overlap arithmetic in this crate happens on [`ClockTime`], a count of
//! minutes since midnight. Stored session timestamps carry wall-clock time
//! encoded as UTC, so the only correct way to obtain a `ClockTime` from a
//! timestamp is to convert it to UTC first and read the hour and minute there.
//! [`wall_clock`] is that conversion; nothing else in the crate touches
//! timezones.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TimetableError};

/// Number of minutes in a calendar day.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A time of day, stored as minutes since midnight (`0..1440`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u16);

impl ClockTime {
    /// Build a time of day from an hour (`0..24`) and minute (`0..60`).
    pub fn from_hm(hour: u32, minute: u32) -> Result<Self> {
        if hour >= 24 || minute >= 60 {
            return Err(TimetableError::InvalidTime(format!(
                "{:02}:{:02} is outside 00:00-23:59",
                hour, minute
            )));
        }
        Ok(ClockTime((hour * 60 + minute) as u16))
    }

    /// Build a time of day from minutes since midnight.
    pub fn from_minutes(minutes: u16) -> Result<Self> {
        if minutes >= MINUTES_PER_DAY {
            return Err(TimetableError::InvalidTime(format!(
                "{} minutes is past the end of the day",
                minutes
            )));
        }
        Ok(ClockTime(minutes))
    }

    /// Build a time of day from fixed-point decimal hours (e.g. `8.5` is 08:30).
    ///
    /// Fractions are rounded to the nearest minute.
    pub fn from_decimal_hours(hours: f64) -> Result<Self> {
        if !hours.is_finite() || hours < 0.0 {
            return Err(TimetableError::InvalidTime(format!(
                "{} is not a valid hour value",
                hours
            )));
        }
        let minutes = (hours * 60.0).round();
        if minutes >= f64::from(MINUTES_PER_DAY) {
            return Err(TimetableError::InvalidTime(format!(
                "{} hours is past the end of the day",
                hours
            )));
        }
        Ok(ClockTime(minutes as u16))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = TimetableError;

    /// Parse `HH:MM` or `HH:MM:SS`. Seconds are truncated.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let time = NaiveTime::parse_from_str(trimmed, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
            .map_err(|e| TimetableError::InvalidTime(format!("'{}': {}", s, e)))?;
        ClockTime::from_hm(time.hour(), time.minute())
    }
}

impl TryFrom<String> for ClockTime {
    type Error = TimetableError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

/// Extract the calendar date and canonical time of day from a stored timestamp.
///
/// The timestamp is normalised to UTC before either component is read, so the
/// same instant yields the same result whatever zone it is expressed in.
pub fn wall_clock<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> (NaiveDate, ClockTime) {
    let utc = timestamp.with_timezone(&Utc);
    let minutes = utc.hour() * 60 + utc.minute();
    (utc.date_naive(), ClockTime(minutes as u16))
}

/// A half-open time range `[start, end)` within one day.
///
/// `start < end` always holds; the constructor and deserializer reject
/// anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSlot {
    start: ClockTime,
    end: ClockTime,
}

impl TimeSlot {
    pub fn new(start: ClockTime, end: ClockTime) -> Result<Self> {
        if start >= end {
            return Err(TimetableError::InvalidTimeSlot(format!(
                "start {} must be before end {}",
                start, end
            )));
        }
        Ok(TimeSlot { start, end })
    }

    pub fn start(&self) -> ClockTime {
        self.start
    }

    pub fn end(&self) -> ClockTime {
        self.end
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end.0 - self.start.0
    }

    /// Two slots overlap iff `a.start < b.end && b.start < a.end`.
    ///
    /// Touching slots (one ends exactly when the other starts) do not overlap.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Length of the shared part of two slots, or `None` when they do not overlap.
    pub fn overlap_minutes(&self, other: &TimeSlot) -> Option<u16> {
        if !self.overlaps(other) {
            return None;
        }
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        Some(end.0 - start.0)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for TimeSlot {
    type Err = TimetableError;

    /// Parse `HH:MM-HH:MM`.
    fn from_str(s: &str) -> Result<Self> {
        let (start, end) = s.split_once('-').ok_or_else(|| {
            TimetableError::InvalidTimeSlot(format!("'{}' is not of the form HH:MM-HH:MM", s))
        })?;
        TimeSlot::new(start.parse()?, end.parse()?)
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = TimetableError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TimeSlot> for String {
    fn from(value: TimeSlot) -> Self {
        value.to_string()
    }
}
