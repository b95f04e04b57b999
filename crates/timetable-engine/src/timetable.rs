//! In-memory timetable that refuses to store clashing sessions.
//!
//! Every write runs the same sequence as the create and update endpoints:
//! select the candidate pool, run the detector, and only store the session
//! when no conflict came back. Check and commit happen under a single
//! `&mut self` borrow, so no other writer can slip a clashing session in
//! between them. Share a `Timetable` across threads behind a `Mutex` to keep
//! that guarantee.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::conflict::{detect_conflicts, Conflict};
use crate::error::{Result, TimetableError};
use crate::pool::candidate_pool;
use crate::session::{Candidate, Session, SessionId};

#[derive(Debug, Clone)]
pub struct Timetable {
    sessions: BTreeMap<SessionId, Session>,
    /// `None` once an id of `u64::MAX` has been handed out or loaded.
    next_id: Option<u64>,
}

impl Default for Timetable {
    fn default() -> Self {
        Self::new()
    }
}

impl Timetable {
    /// An empty timetable. Ids are handed out from 1.
    pub fn new() -> Self {
        Timetable {
            sessions: BTreeMap::new(),
            next_id: Some(1),
        }
    }

    /// Load already-persisted sessions. Existing clashes are kept as they are;
    /// only new writes are checked.
    pub fn from_sessions(sessions: impl IntoIterator<Item = Session>) -> Result<Self> {
        let mut timetable = Timetable::new();
        for session in sessions {
            let id = session.id;
            if timetable.sessions.insert(id, session).is_some() {
                return Err(TimetableError::DuplicateSession(id));
            }
            timetable.next_id = timetable
                .next_id
                .and_then(|next| id.0.checked_add(1).map(|after| next.max(after)));
        }
        Ok(timetable)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    /// All sessions, ordered by id.
    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    /// Sessions on `date`, ordered by start time then id.
    pub fn sessions_on(&self, date: NaiveDate) -> Vec<&Session> {
        let mut day: Vec<&Session> = self.sessions.values().filter(|s| s.date == date).collect();
        day.sort_by_key(|s| (s.time.start(), s.id));
        day
    }

    /// Run the detector for `candidate` against the stored sessions.
    pub fn check(&self, candidate: &Candidate) -> Vec<Conflict> {
        let pool = candidate_pool(candidate, self.sessions.values());
        detect_conflicts(candidate, pool)
    }

    /// Store a new session, or reject it with every conflict it would cause.
    ///
    /// Any `exclude_id` on the candidate is ignored: a new session has nothing
    /// to be excluded from.
    pub fn create(&mut self, mut candidate: Candidate) -> Result<&Session> {
        candidate.exclude_id = None;
        let conflicts = self.check(&candidate);
        if !conflicts.is_empty() {
            warn!(
                date = %candidate.date,
                time = %candidate.time,
                conflicts = conflicts.len(),
                "session rejected"
            );
            return Err(TimetableError::Conflict(conflicts));
        }

        let id = SessionId(self.next_id.ok_or(TimetableError::IdsExhausted)?);
        match self.sessions.entry(id) {
            Entry::Occupied(_) => Err(TimetableError::DuplicateSession(id)),
            Entry::Vacant(slot) => {
                self.next_id = id.0.checked_add(1);
                info!(
                    session = %id,
                    date = %candidate.date,
                    time = %candidate.time,
                    "session created"
                );
                Ok(slot.insert(candidate.into_session(id)))
            }
        }
    }

    /// Replace session `id`, checking the new version against everything but itself.
    pub fn update(&mut self, id: SessionId, mut candidate: Candidate) -> Result<&Session> {
        if !self.sessions.contains_key(&id) {
            return Err(TimetableError::NotFound(id));
        }

        candidate.exclude_id = Some(id);
        let conflicts = self.check(&candidate);
        if !conflicts.is_empty() {
            warn!(session = %id, conflicts = conflicts.len(), "session update rejected");
            return Err(TimetableError::Conflict(conflicts));
        }

        info!(session = %id, date = %candidate.date, time = %candidate.time, "session updated");
        let slot = self
            .sessions
            .get_mut(&id)
            .ok_or(TimetableError::NotFound(id))?;
        *slot = candidate.into_session(id);
        Ok(slot)
    }

    pub fn remove(&mut self, id: SessionId) -> Result<Session> {
        let session = self
            .sessions
            .remove(&id)
            .ok_or(TimetableError::NotFound(id))?;
        info!(session = %id, "session removed");
        Ok(session)
    }

    pub fn into_sessions(self) -> Vec<Session> {
        self.sessions.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Resource;

    fn candidate(time: &str, room: &str, group: &str) -> Candidate {
        Candidate {
            date: NaiveDate::from_ymd_opt(2025, 11, 10).unwrap(),
            time: time.parse().unwrap(),
            room: Some(Resource::named(room)),
            teacher: None,
            group: Resource::named(group),
            subject: None,
            exclude_id: None,
        }
    }

    #[test]
    fn ids_continue_after_loaded_sessions() {
        let loaded = candidate("08:30-10:00", "A9", "G1").into_session(SessionId(41));
        let mut timetable = Timetable::from_sessions(vec![loaded]).unwrap();
        let created = timetable
            .create(candidate("10:00-11:30", "A9", "G1"))
            .unwrap();
        assert_eq!(created.id, SessionId(42));
    }

    #[test]
    fn duplicate_ids_are_rejected_on_load() {
        let a = candidate("08:30-10:00", "A9", "G1").into_session(SessionId(1));
        let b = candidate("12:00-13:00", "B7", "G2").into_session(SessionId(1));
        let err = Timetable::from_sessions(vec![a, b]).unwrap_err();
        assert!(matches!(err, TimetableError::DuplicateSession(SessionId(1))));
    }

    #[test]
    fn loading_the_largest_id_does_not_overflow() {
        let loaded = candidate("08:30-10:00", "A9", "G1").into_session(SessionId(u64::MAX));
        let mut timetable = Timetable::from_sessions(vec![loaded]).unwrap();
        assert_eq!(timetable.len(), 1);

        let err = timetable
            .create(candidate("10:00-11:30", "A9", "G1"))
            .unwrap_err();
        assert!(matches!(err, TimetableError::IdsExhausted));
        assert_eq!(timetable.len(), 1);
    }

    #[test]
    fn last_id_is_handed_out_once() {
        let loaded = candidate("08:30-10:00", "A9", "G1").into_session(SessionId(u64::MAX - 1));
        let mut timetable = Timetable::from_sessions(vec![loaded]).unwrap();

        let created = timetable
            .create(candidate("10:00-11:30", "A9", "G1"))
            .unwrap();
        assert_eq!(created.id, SessionId(u64::MAX));
        assert!(matches!(
            timetable.create(candidate("12:00-13:00", "A9", "G1")),
            Err(TimetableError::IdsExhausted)
        ));
    }

    #[test]
    fn create_never_overwrites_a_taken_id() {
        let loaded = candidate("08:30-10:00", "A9", "G1").into_session(SessionId(3));
        let mut timetable = Timetable::from_sessions(vec![loaded.clone()]).unwrap();
        timetable.next_id = Some(3);

        let err = timetable
            .create(candidate("10:00-11:30", "B7", "G2"))
            .unwrap_err();
        assert!(matches!(err, TimetableError::DuplicateSession(SessionId(3))));
        assert_eq!(timetable.get(SessionId(3)), Some(&loaded));
        assert_eq!(timetable.next_id, Some(3));
    }

    #[test]
    fn sessions_on_orders_by_start() {
        let mut timetable = Timetable::new();
        timetable.create(candidate("14:00-15:00", "A9", "G1")).unwrap();
        timetable.create(candidate("08:00-09:00", "A9", "G1")).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 11, 10).unwrap();
        let starts: Vec<String> = timetable
            .sessions_on(date)
            .iter()
            .map(|s| s.time.start().to_string())
            .collect();
        assert_eq!(starts, vec!["08:00", "14:00"]);
    }
}
