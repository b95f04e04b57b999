//! Property-based tests for conflict detection using proptest.
//!
//! These tests verify invariants that should hold for *any* same-day pool,
//! not just the hand-picked scenarios in `conflict_tests.rs`.

use chrono::NaiveDate;
use proptest::prelude::*;
use timetable_engine::{
    detect_conflicts, Candidate, ClockTime, ConflictKind, Resource, Session, SessionId, TimeSlot,
};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// A slot between 07:00 and 21:00, 15-180 minutes long, on a 5-minute grid.
fn arb_slot() -> impl Strategy<Value = TimeSlot> {
    (84u16..=240, 3u16..=36).prop_map(|(start, len)| {
        let start = ClockTime::from_minutes(start * 5).unwrap();
        let end = ClockTime::from_minutes(start.minutes() + len * 5).unwrap();
        TimeSlot::new(start, end).unwrap()
    })
}

/// Small id spaces so that shared rooms, teachers and groups are common.
fn arb_room() -> impl Strategy<Value = Option<Resource>> {
    prop::option::weighted(0.9, (0u8..4).prop_map(|r| Resource::named(format!("R{r}"))))
}

fn arb_teacher() -> impl Strategy<Value = Option<Resource>> {
    prop::option::of((0u8..4).prop_map(|t| Resource::named(format!("T{t}"))))
}

fn arb_group() -> impl Strategy<Value = Resource> {
    (0u8..4).prop_map(|g| Resource::named(format!("G{g}")))
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 10).unwrap()
}

fn arb_candidate() -> impl Strategy<Value = Candidate> {
    (arb_slot(), arb_room(), arb_teacher(), arb_group()).prop_map(|(time, room, teacher, group)| {
        Candidate {
            date: day(),
            time,
            room,
            teacher,
            group,
            subject: None,
            exclude_id: None,
        }
    })
}

fn arb_pool() -> impl Strategy<Value = Vec<Session>> {
    prop::collection::vec(
        (arb_slot(), arb_room(), arb_teacher(), arb_group()),
        0..20,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (time, room, teacher, group))| Session {
                id: SessionId(i as u64 + 1),
                date: day(),
                time,
                room,
                teacher,
                group,
                subject: None,
            })
            .collect()
    })
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn overlap_is_symmetric(a in arb_slot(), b in arb_slot()) {
        prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        prop_assert_eq!(a.overlap_minutes(&b), b.overlap_minutes(&a));
    }

    #[test]
    fn overlap_matches_interval_definition(a in arb_slot(), b in arb_slot()) {
        let expected = a.start() < b.end() && b.start() < a.end();
        prop_assert_eq!(a.overlaps(&b), expected);
    }

    #[test]
    fn detection_is_deterministic(candidate in arb_candidate(), pool in arb_pool()) {
        let first = detect_conflicts(&candidate, &pool);
        let second = detect_conflicts(&candidate, &pool);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn every_conflict_is_a_real_overlapping_clash(
        candidate in arb_candidate(),
        pool in arb_pool(),
    ) {
        for conflict in detect_conflicts(&candidate, &pool) {
            let existing = &conflict.conflicting_session;
            prop_assert!(candidate.time.overlaps(&existing.time));
            let shared = match conflict.kind {
                ConflictKind::Room => candidate.room.is_some() && candidate.room == existing.room,
                ConflictKind::Teacher => {
                    candidate.teacher.is_some() && candidate.teacher == existing.teacher
                }
                ConflictKind::Group => candidate.group == existing.group,
            };
            prop_assert!(shared, "{:?} reported without a shared resource", conflict.kind);
        }
    }

    #[test]
    fn no_clash_is_missed(candidate in arb_candidate(), pool in arb_pool()) {
        let conflicts = detect_conflicts(&candidate, &pool);
        for existing in &pool {
            if !candidate.time.overlaps(&existing.time) {
                continue;
            }
            let reported = |kind: ConflictKind| {
                conflicts
                    .iter()
                    .any(|c| c.kind == kind && c.conflicting_session.id == existing.id)
            };
            if candidate.room.is_some() && candidate.room == existing.room {
                prop_assert!(reported(ConflictKind::Room));
            }
            if candidate.teacher.is_some() && candidate.teacher == existing.teacher {
                prop_assert!(reported(ConflictKind::Teacher));
            }
            if candidate.group == existing.group {
                prop_assert!(reported(ConflictKind::Group));
            }
        }
    }

    #[test]
    fn session_never_conflicts_with_itself(pool in arb_pool(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!pool.is_empty());
        let own = &pool[pick.index(pool.len())];
        let candidate = Candidate::for_update(own);

        prop_assert!(detect_conflicts(&candidate, std::slice::from_ref(own)).is_empty());
        prop_assert!(detect_conflicts(&candidate, &pool)
            .iter()
            .all(|c| c.conflicting_session.id != own.id));
    }

    #[test]
    fn at_most_one_conflict_per_session_and_kind(
        candidate in arb_candidate(),
        pool in arb_pool(),
    ) {
        // Feed every row twice to exercise de-duplication.
        let doubled: Vec<Session> = pool.iter().chain(pool.iter()).cloned().collect();
        let conflicts = detect_conflicts(&candidate, &doubled);
        let mut keys: Vec<(SessionId, ConflictKind)> = conflicts
            .iter()
            .map(|c| (c.conflicting_session.id, c.kind))
            .collect();
        let before = keys.len();
        keys.sort_by_key(|(id, kind)| (*id, *kind as u8));
        keys.dedup();
        prop_assert_eq!(keys.len(), before);
        prop_assert_eq!(conflicts, detect_conflicts(&candidate, &pool));
    }
}
