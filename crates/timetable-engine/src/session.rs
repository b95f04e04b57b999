//! Scheduled sessions and proposed candidates.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::{wall_clock, TimeSlot};
use crate::error::{Result, TimetableError};

/// Identifier of a persisted session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A schedulable resource: a room, a teacher, a student group or a subject.
///
/// Two resources are the same resource iff their `id`s match (see
/// [`Resource::same_as`]); `name` is only used when rendering conflict
/// messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl Resource {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// A resource whose display name is its id.
    pub fn named(id: impl Into<String>) -> Self {
        Self::new(id, "")
    }

    /// Display name, falling back to the id when no name was given.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    pub fn same_as(&self, other: &Resource) -> bool {
        self.id == other.id
    }
}

/// A persisted class session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub date: NaiveDate,
    pub time: TimeSlot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<Resource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher: Option<Resource>,
    pub group: Resource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Resource>,
}

/// A session proposed for creation or update, checked before it is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub date: NaiveDate,
    pub time: TimeSlot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<Resource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher: Option<Resource>,
    pub group: Resource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Resource>,
    /// The session being updated, which must never conflict with itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_id: Option<SessionId>,
}

impl Candidate {
    /// Re-validate an existing session, excluding the session itself.
    pub fn for_update(session: &Session) -> Self {
        Candidate {
            date: session.date,
            time: session.time,
            room: session.room.clone(),
            teacher: session.teacher.clone(),
            group: session.group.clone(),
            subject: session.subject.clone(),
            exclude_id: Some(session.id),
        }
    }

    pub fn into_session(self, id: SessionId) -> Session {
        Session {
            id,
            date: self.date,
            time: self.time,
            room: self.room,
            teacher: self.teacher,
            group: self.group,
            subject: self.subject,
        }
    }

    /// True when `session` is the one this candidate is an update of.
    pub fn excludes(&self, session: &Session) -> bool {
        self.exclude_id == Some(session.id)
    }
}

/// A session row as the persistence layer keeps it: wall-clock time encoded
/// as UTC timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub id: SessionId,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub room: Option<Resource>,
    #[serde(default)]
    pub teacher: Option<Resource>,
    pub group: Resource,
    #[serde(default)]
    pub subject: Option<Resource>,
}

impl TryFrom<StoredSession> for Session {
    type Error = TimetableError;

    fn try_from(stored: StoredSession) -> Result<Self> {
        let (date, start) = wall_clock(&stored.starts_at);
        let (end_date, end) = wall_clock(&stored.ends_at);
        if end_date != date {
            return Err(TimetableError::InvalidTimeSlot(format!(
                "session {} starts on {} but ends on {}",
                stored.id, date, end_date
            )));
        }
        Ok(Session {
            id: stored.id,
            date,
            time: TimeSlot::new(start, end)?,
            room: stored.room,
            teacher: stored.teacher,
            group: stored.group,
            subject: stored.subject,
        })
    }
}
