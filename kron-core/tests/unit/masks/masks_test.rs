use super::*;
use crate::helpers::*;

#[test]
fn can_build_window_mask() {
    let mask = window_mask(0., 4. * HOUR, HOUR);

    assert!(mask.value_at(-1.).is_infinite());
    assert_eq!(mask.value_at(0.), 0.);
    assert_eq!(mask.value_at(3. * HOUR), 0.);
    assert!(mask.value_at(3. * HOUR + 1.).is_infinite());
}

#[test]
fn can_build_window_mask_for_too_short_window() {
    let mask = window_mask(0., HOUR, 2. * HOUR);

    assert!(mask.is_infinite());
}

#[test]
fn can_build_fixed_mask_with_open_interval() {
    let mask = fixed_mask(TimeWindow::new(2. * HOUR, 3. * HOUR), HOUR);

    // touching the block at either end is allowed
    assert_eq!(mask.value_at(HOUR), 0.);
    assert!(mask.value_at(HOUR + 1.).is_infinite());
    assert!(mask.value_at(2.5 * HOUR).is_infinite());
    assert!(mask.value_at(3. * HOUR - 1.).is_infinite());
    assert_eq!(mask.value_at(3. * HOUR), 0.);
}

#[test]
fn can_build_ifneeded_trapezoid() {
    let mask = ifneeded_mask(TimeWindow::new(2. * HOUR, 3. * HOUR), HOUR, 1.);

    assert_eq!(mask.value_at(0.), 0.);
    assert_eq!(mask.value_at(HOUR), 0.);
    assert_eq!(mask.value_at(1.5 * HOUR), 250.);
    assert_eq!(mask.value_at(2. * HOUR), 500.);
    assert_eq!(mask.value_at(2.5 * HOUR), 250.);
    assert_eq!(mask.value_at(3. * HOUR), 0.);
    assert_eq!(mask.value_at(4. * HOUR), 0.);
}

#[test]
fn can_scale_ifneeded_peak_by_overlap() {
    // the block is shorter than the meeting: the peak tracks the maximal overlap
    let mask = ifneeded_mask(TimeWindow::new(2. * HOUR, 2.5 * HOUR), 2. * HOUR, 1.);

    let peak = mask.value_at(2. * HOUR);
    assert_eq!(peak, 250.);
}

parameterized_test! {can_trim_window_start, (meeting, now, expected), {
    assert_eq!(trim_window_start(&meeting, now), expected);
}}

can_trim_window_start! {
    case01_future_window: (test_meeting(1, &[1], (10. * HOUR, 20. * HOUR), HOUR), 0., 10. * HOUR),
    case02_window_in_past: (test_meeting(1, &[1], (0., 20. * HOUR), HOUR), 5. * HOUR, 5. * HOUR),
    case03_freeze_pushes_start: (
        Meeting { freeze_horizon: 2. * HOUR, ..test_meeting(1, &[1], (0., 20. * HOUR), HOUR) },
        5. * HOUR,
        7. * HOUR),
    case04_final_keeps_draft_inside_freeze: (
        Meeting {
            is_final: true,
            freeze_horizon: 2. * HOUR,
            draft_start: Some(6. * HOUR),
            ..test_meeting(1, &[1], (0., 20. * HOUR), HOUR)
        },
        5. * HOUR,
        6. * HOUR),
    case05_final_with_movable_draft: (
        Meeting {
            is_final: true,
            freeze_horizon: 2. * HOUR,
            draft_start: Some(10. * HOUR),
            ..test_meeting(1, &[1], (0., 20. * HOUR), HOUR)
        },
        5. * HOUR,
        7. * HOUR),
}

#[test]
fn can_build_kronduty_mask() {
    let mask = kronduty_mask(&[TimeWindow::new(HOUR, 5. * HOUR)], HOUR);

    assert!(mask.value_at(0.5 * HOUR).is_infinite());
    assert_eq!(mask.value_at(HOUR), 0.);
    assert_eq!(mask.value_at(4. * HOUR), 0.);
    assert!(mask.value_at(4.5 * HOUR).is_infinite());
}

#[test]
fn can_merge_overlapping_duty_blocks() {
    let mask = kronduty_mask(
        &[TimeWindow::new(HOUR, 3. * HOUR), TimeWindow::new(2. * HOUR, 5. * HOUR)],
        HOUR,
    );

    // [1h, 5h] merged: a start at 2.5h fits even though it straddles the seam
    assert_eq!(mask.value_at(2.5 * HOUR), 0.);
    assert_eq!(mask.value_at(4. * HOUR), 0.);
    assert!(mask.value_at(4.5 * HOUR).is_infinite());
}

#[test]
fn can_forbid_all_starts_without_coverage() {
    assert!(kronduty_mask(&[], HOUR).is_infinite());
}

#[test]
fn can_treat_duty_not_covering_attendee_as_unavailable() {
    let mut snapshot = Snapshot::default();
    snapshot.meetings.push(test_meeting(1, &[1], (0., 4. * HOUR), HOUR));
    snapshot.fixed.push(FixedEntry {
        costs: DutyCosts { everyone: None, per_user: [(2, 0.)].into_iter().collect() },
        ..test_duty(10, 1, 0., 8. * HOUR)
    });
    let free = [1].into_iter().collect();

    let mask = make_event_mask(&snapshot.meetings[0], &snapshot, &free, 0.);

    // a duty entry pricing only user 2 grants user 1 no coverage at all
    assert!(mask.required.is_impossible());
}

#[test]
fn can_charge_ifneeded_for_priced_duty_coverage() {
    let mut snapshot = Snapshot::default();
    snapshot.meetings.push(test_meeting(1, &[1], (0., 8. * HOUR), HOUR));
    snapshot.fixed.push(test_duty(10, 1, 0., 4. * HOUR));
    snapshot.fixed.push(FixedEntry {
        costs: DutyCosts { everyone: Some(2.), per_user: Default::default() },
        ..test_duty(11, 1, HOUR, 2. * HOUR)
    });
    let free = [1].into_iter().collect();

    let mask = make_event_mask(&snapshot.meetings[0], &snapshot, &free, 0.);

    // covered everywhere, but landing on the priced segment costs extra
    assert_eq!(mask.required.hard.value_at(0.), 0.);
    assert_eq!(mask.required.hard.value_at(HOUR), 0.);
    assert_eq!(mask.required.ifneeded.value_at(0.), 0.);
    assert_eq!(mask.required.ifneeded.value_at(HOUR), 2. * IFNEEDED_WEIGHT);
}

#[test]
fn can_short_circuit_infeasible_window() {
    let mut snapshot = Snapshot::default();
    snapshot.meetings.push(test_meeting(1, &[1], (0., HOUR), 2. * HOUR));
    let free = [1].into_iter().collect();

    let mask = make_event_mask(&snapshot.meetings[0], &snapshot, &free, 0.);

    assert!(mask.required.is_impossible());
    assert!(mask.optional.is_empty());
}

#[test]
fn can_build_sooner_slope() {
    let mask = sooner_mask(0., 4. * HOUR, HOUR);

    assert_eq!(mask.value_at(0.), 0.);
    let at_latest = mask.value_at(3. * HOUR);
    assert!((at_latest - SOONER_WEIGHT).abs() < 1e-9);
}

#[test]
fn can_compile_event_mask_against_busy_calendar() {
    let mut snapshot = Snapshot::default();
    snapshot.meetings.push(test_meeting(1, &[1], (0., 8. * HOUR), HOUR));
    snapshot.fixed.push(test_busy(10, 1, 2. * HOUR, 3. * HOUR));
    snapshot.fixed.push(test_ifneeded(11, 1, 5. * HOUR, 6. * HOUR, 1.));
    let free = [1].into_iter().collect();

    let mask = make_event_mask(&snapshot.meetings[0], &snapshot, &free, 0.);

    assert!(!mask.required.is_impossible());
    assert!(mask.required.hard.value_at(2.5 * HOUR).is_infinite());
    assert_eq!(mask.required.hard.value_at(3. * HOUR), 0.);
    // the if-needed block costs but does not forbid
    assert!(mask.required.hard.value_at(5. * HOUR).is_finite());
    assert_eq!(mask.required.ifneeded.value_at(5. * HOUR), 500.);
}

#[test]
fn can_treat_foreign_drafts_as_busy() {
    let mut snapshot = Snapshot::default();
    snapshot.meetings.push(test_meeting(1, &[1], (0., 8. * HOUR), HOUR));
    snapshot.meetings.push(Meeting {
        draft_start: Some(2. * HOUR),
        state: MeetingState::Scheduled,
        dirty: false,
        ..test_meeting(2, &[1], (0., 8. * HOUR), HOUR)
    });
    let free = [1].into_iter().collect();

    let mask = make_event_mask(&snapshot.meetings[0], &snapshot, &free, 0.);

    assert!(mask.required.hard.value_at(2.5 * HOUR).is_infinite());
    assert_eq!(mask.required.hard.value_at(3. * HOUR), 0.);
}

#[test]
fn can_ignore_drafts_of_free_meetings() {
    let mut snapshot = Snapshot::default();
    snapshot.meetings.push(test_meeting(1, &[1], (0., 8. * HOUR), HOUR));
    snapshot.meetings.push(Meeting {
        draft_start: Some(2. * HOUR),
        state: MeetingState::Scheduled,
        ..test_meeting(2, &[1], (0., 8. * HOUR), HOUR)
    });
    let free = [1, 2].into_iter().collect();

    let mask = make_event_mask(&snapshot.meetings[0], &snapshot, &free, 0.);

    assert!(mask.required.hard.value_at(2.5 * HOUR).is_finite());
}

#[test]
fn can_compile_optional_attendee_surfaces() {
    let mut snapshot = Snapshot::default();
    snapshot.meetings.push(Meeting {
        optional_attendees: vec![OptionalAttendee { user: 2, priority: 3 }],
        ..test_meeting(1, &[1], (0., 8. * HOUR), HOUR)
    });
    snapshot.fixed.push(test_busy(10, 2, 2. * HOUR, 3. * HOUR));
    let free = [1].into_iter().collect();

    let mask = make_event_mask(&snapshot.meetings[0], &snapshot, &free, 0.);

    // the optional attendee's conflict does not make the meeting itself infeasible
    assert!(mask.required.hard.value_at(2.5 * HOUR).is_finite());
    let surface = mask.optional.get(&2).unwrap();
    assert!(surface.value_at(2.5 * HOUR).is_infinite());
    assert!(surface.value_at(4. * HOUR).is_finite());
    // the meeting window bounds the surface too
    assert!(surface.value_at(7.5 * HOUR).is_infinite());
}

#[test]
fn can_restrict_optional_surface_to_their_duty_coverage() {
    let mut snapshot = Snapshot::default();
    snapshot.meetings.push(Meeting {
        optional_attendees: vec![OptionalAttendee { user: 2, priority: 1 }],
        ..test_meeting(1, &[1], (0., 8. * HOUR), HOUR)
    });
    snapshot.fixed.push(test_duty(10, 2, 4. * HOUR, 6. * HOUR));
    let free = [1].into_iter().collect();

    let mask = make_event_mask(&snapshot.meetings[0], &snapshot, &free, 0.);

    // user 2's duty only admits starts keeping the whole meeting inside [4h, 6h]
    let surface = mask.optional.get(&2).unwrap();
    assert!(surface.value_at(HOUR).is_infinite());
    assert_eq!(surface.value_at(4. * HOUR), 0.);
    assert_eq!(surface.value_at(5. * HOUR), 0.);
    assert!(surface.value_at(5.5 * HOUR).is_infinite());
}
