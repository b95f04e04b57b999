//! Detect room, teacher and group clashes between a candidate and a day's sessions.
//!
//! A clash needs two things: the time slots overlap (closed-open, so touching
//! slots are fine) and both sessions use the same resource. Each of the three
//! resource kinds is checked independently, so one overlapping session can
//! produce up to three conflicts.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::session::{Candidate, Resource, Session, SessionId};

/// The resource that two sessions both claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictKind {
    Room,
    Teacher,
    Group,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConflictKind::Room => "room",
            ConflictKind::Teacher => "teacher",
            ConflictKind::Group => "group",
        };
        f.write_str(name)
    }
}

/// A detected clash between the candidate and an existing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub message: String,
    pub conflicting_session: Session,
    pub overlap_minutes: u16,
}

/// Find every clash between `candidate` and the sessions in `pool`.
///
/// The pool must only hold sessions on the candidate's date; passing a session
/// from another day is a caller bug and panics. A session whose id equals
/// `candidate.exclude_id` is skipped. Conflicts are returned in discovery
/// order (pool order, then room, teacher, group) with duplicate
/// `(session id, kind)` pairs removed. An empty result means the candidate
/// can be stored safely.
pub fn detect_conflicts<'a, I>(candidate: &Candidate, pool: I) -> Vec<Conflict>
where
    I: IntoIterator<Item = &'a Session>,
{
    let mut seen: HashSet<(SessionId, ConflictKind)> = HashSet::new();
    let mut conflicts = Vec::new();

    for existing in pool {
        assert_eq!(
            existing.date, candidate.date,
            "session {} is not on the candidate's date",
            existing.id
        );

        if candidate.excludes(existing) {
            continue;
        }

        let Some(overlap_minutes) = candidate.time.overlap_minutes(&existing.time) else {
            continue;
        };

        for (kind, resource) in clashes(candidate, existing) {
            if !seen.insert((existing.id, kind)) {
                continue;
            }
            debug!(session = %existing.id, %kind, overlap_minutes, "clash detected");
            conflicts.push(Conflict {
                kind,
                message: describe(kind, resource, existing),
                conflicting_session: existing.clone(),
                overlap_minutes,
            });
        }
    }

    conflicts
}

/// The resources shared by two time-overlapping sessions, in report order.
fn clashes<'s>(
    candidate: &Candidate,
    existing: &'s Session,
) -> Vec<(ConflictKind, &'s Resource)> {
    let mut shared = Vec::with_capacity(3);
    if let Some(room) = shared_resource(&candidate.room, &existing.room) {
        shared.push((ConflictKind::Room, room));
    }
    // Unassigned teachers never clash, on either side.
    if let Some(teacher) = shared_resource(&candidate.teacher, &existing.teacher) {
        shared.push((ConflictKind::Teacher, teacher));
    }
    if candidate.group.same_as(&existing.group) {
        shared.push((ConflictKind::Group, &existing.group));
    }
    shared
}

fn shared_resource<'s>(
    ours: &Option<Resource>,
    theirs: &'s Option<Resource>,
) -> Option<&'s Resource> {
    match (ours, theirs) {
        (Some(ours), Some(theirs)) if ours.same_as(theirs) => Some(theirs),
        _ => None,
    }
}

fn describe(kind: ConflictKind, resource: &Resource, existing: &Session) -> String {
    let subject = existing
        .subject
        .as_ref()
        .map(Resource::label)
        .unwrap_or("another session");
    let group = existing.group.label();
    let time = existing.time;

    match kind {
        ConflictKind::Room => format!(
            "Room {} is already booked from {} to {} for {} (group {})",
            resource.label(),
            time.start(),
            time.end(),
            subject,
            group
        ),
        ConflictKind::Teacher => format!(
            "Teacher {} is already teaching {} to group {} from {} to {}",
            resource.label(),
            subject,
            group,
            time.start(),
            time.end()
        ),
        ConflictKind::Group => {
            let place = existing
                .room
                .as_ref()
                .map(|r| format!(" in room {}", r.label()))
                .unwrap_or_default();
            format!(
                "Group {} already has {} from {} to {}{}",
                resource.label(),
                subject,
                time.start(),
                time.end(),
                place
            )
        }
    }
}
