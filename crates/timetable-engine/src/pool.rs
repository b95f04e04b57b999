//! Select the sessions a candidate has to be checked against.

use crate::session::{Candidate, Session};

/// Sessions on the candidate's date that share its room, teacher or group.
///
/// This mirrors the query the create and update paths run against storage:
/// `date = candidate.date AND id <> exclude_id AND (room OR teacher OR group)`.
/// The result keeps the input order.
pub fn candidate_pool<'a, I>(candidate: &Candidate, sessions: I) -> Vec<&'a Session>
where
    I: IntoIterator<Item = &'a Session>,
{
    sessions
        .into_iter()
        .filter(|s| s.date == candidate.date)
        .filter(|s| !candidate.excludes(s))
        .filter(|s| shares_any_resource(candidate, s))
        .collect()
}

fn shares_any_resource(candidate: &Candidate, session: &Session) -> bool {
    let same_room = matches!(
        (&candidate.room, &session.room),
        (Some(a), Some(b)) if a.same_as(b)
    );
    let same_teacher = matches!(
        (&candidate.teacher, &session.teacher),
        (Some(a), Some(b)) if a.same_as(b)
    );
    same_room || same_teacher || candidate.group.same_as(&session.group)
}
