use super::*;
use crate::helpers::*;

fn clean(meeting: Meeting) -> Meeting {
    Meeting { dirty: false, ..meeting }
}

#[test]
fn can_seed_from_dirty_meetings() {
    let mut snapshot = Snapshot::default();
    snapshot.meetings.push(test_meeting(1, &[1], (HOUR, 10. * HOUR), HOUR));
    snapshot.meetings.push(clean(test_meeting(2, &[2], (HOUR, 10. * HOUR), HOUR)));

    let problem = build_problem(&mut snapshot, 0., ProblemLimits::default());

    assert!(problem.free.contains(&1));
    assert!(!problem.free.contains(&2));
    assert_eq!(problem.provenance.get(&1).map(String::as_str), Some("dirty"));
    assert!(snapshot.meetings.iter().all(|m| !m.dirty));
}

#[test]
fn can_seed_from_conflicting_change() {
    let mut snapshot = Snapshot::default();
    snapshot.meetings.push(clean(Meeting {
        draft_start: Some(2. * HOUR),
        ..test_meeting(1, &[1], (0., 10. * HOUR), HOUR)
    }));
    snapshot.changes.push(Change {
        window: TimeWindow::new(2. * HOUR, 3. * HOUR),
        users: vec![1],
        conflict: true,
    });

    let problem = build_problem(&mut snapshot, 0., ProblemLimits::default());

    assert!(problem.free.contains(&1));
    assert_eq!(problem.provenance.get(&1).map(String::as_str), Some("change_conflict"));
    assert!(snapshot.changes.is_empty());
}

#[test]
fn can_seed_unplaced_meetings_from_freed_space() {
    let mut snapshot = Snapshot::default();
    snapshot.meetings.push(clean(Meeting {
        state: MeetingState::Unscheduled,
        ..test_meeting(1, &[1], (0., 10. * HOUR), HOUR)
    }));
    snapshot.meetings.push(clean(Meeting {
        draft_start: Some(5. * HOUR),
        ..test_meeting(2, &[2], (0., 10. * HOUR), HOUR)
    }));
    snapshot.changes.push(Change {
        window: TimeWindow::new(2. * HOUR, 3. * HOUR),
        users: vec![1, 2],
        conflict: false,
    });

    let problem = build_problem(&mut snapshot, 0., ProblemLimits::default());

    // only the unplaced meeting retries; the placed one is not disturbed
    assert!(problem.free.contains(&1));
    assert_eq!(problem.provenance.get(&1).map(String::as_str), Some("change_space"));
    assert!(!problem.free.contains(&2));
}

#[test]
fn can_seed_from_dirty_fixed_entry() {
    let mut snapshot = Snapshot::default();
    snapshot.meetings.push(clean(Meeting {
        draft_start: Some(2. * HOUR),
        ..test_meeting(1, &[1], (0., 10. * HOUR), HOUR)
    }));
    snapshot.fixed.push(FixedEntry { dirty: true, ..test_busy(10, 1, 2. * HOUR, 3. * HOUR) });

    let problem = build_problem(&mut snapshot, 0., ProblemLimits::default());

    assert!(problem.free.contains(&1));
    assert_eq!(problem.provenance.get(&1).map(String::as_str), Some("dirty_fixed"));
    assert!(snapshot.fixed.iter().all(|e| !e.dirty));
}

#[test]
fn can_expand_along_shared_attendees() {
    let mut snapshot = Snapshot::default();
    snapshot.meetings.push(test_meeting(1, &[1], (0., 10. * HOUR), HOUR));
    snapshot.meetings.push(clean(Meeting {
        draft_start: Some(5. * HOUR),
        ..test_meeting(2, &[1, 2], (0., 10. * HOUR), HOUR)
    }));
    snapshot.meetings.push(clean(Meeting {
        draft_start: Some(7. * HOUR),
        ..test_meeting(3, &[2], (0., 10. * HOUR), HOUR)
    }));
    snapshot.meetings.push(clean(test_meeting(4, &[9], (0., 10. * HOUR), HOUR)));

    let problem = build_problem(&mut snapshot, 0., ProblemLimits::default());

    // 1 is dirty, 2 shares user 1 with it, 3 shares user 2 with 2
    assert!(problem.free.contains(&1));
    assert!(problem.free.contains(&2));
    assert!(problem.free.contains(&3));
    assert!(!problem.free.contains(&4));
    assert_eq!(problem.provenance.get(&2).map(String::as_str), Some("expand-0"));
    assert_eq!(problem.provenance.get(&3).map(String::as_str), Some("expand-1"));
}

#[test]
fn can_bound_expansion_by_max_size() {
    let mut snapshot = Snapshot::default();
    snapshot.meetings.push(test_meeting(1, &[1], (0., 10. * HOUR), HOUR));
    for id in 2..10 {
        snapshot.meetings.push(clean(test_meeting(id, &[1], (0., 10. * HOUR), HOUR)));
    }

    let limits = ProblemLimits { max_size: 3, max_iterations: 4 };
    let problem = build_problem(&mut snapshot, 0., limits);

    assert_eq!(problem.free.len(), 3);
    assert!(problem.free.contains(&1));
}

#[test]
fn can_skip_expired_and_started_meetings() {
    let now = 5. * HOUR;
    let mut snapshot = Snapshot::default();
    snapshot.meetings.push(test_meeting(1, &[1], (0., 4. * HOUR), HOUR));
    snapshot.meetings.push(Meeting {
        draft_start: Some(4.5 * HOUR),
        ..test_meeting(2, &[1], (0., 10. * HOUR), HOUR)
    });
    snapshot.meetings.push(test_meeting(3, &[1], (0., 10. * HOUR), HOUR));

    let problem = build_problem(&mut snapshot, now, ProblemLimits::default());

    // 1's window closed, 2 already started
    assert!(!problem.free.contains(&1));
    assert!(!problem.free.contains(&2));
    assert!(problem.free.contains(&3));
}

#[test]
fn can_keep_finals_out_of_expansion() {
    let mut snapshot = Snapshot::default();
    snapshot.meetings.push(test_meeting(1, &[1], (0., 10. * HOUR), HOUR));
    snapshot.meetings.push(clean(Meeting {
        is_final: true,
        draft_start: Some(5. * HOUR),
        ..test_meeting(2, &[1], (0., 10. * HOUR), HOUR)
    }));

    let problem = build_problem(&mut snapshot, 0., ProblemLimits::default());

    assert!(problem.free.contains(&1));
    assert!(!problem.free.contains(&2));
}

#[test]
fn can_return_empty_problem_for_clean_snapshot() {
    let mut snapshot = Snapshot::default();
    snapshot.meetings.push(clean(test_meeting(1, &[1], (0., 10. * HOUR), HOUR)));

    let problem = build_problem(&mut snapshot, 0., ProblemLimits::default());

    assert!(problem.is_empty());
}
