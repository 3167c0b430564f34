//! Tests for availability normalization: multi-source merging, working-hours
//! envelopes, and free-interval subtraction.

use chrono::{NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday};
use slot_engine::error::ScheduleError;
use slot_engine::model::{
    BusySource, Instant, Interval, LocalInterval, Participant, Role, WorkingHours,
};
use slot_engine::normalizer::{merge_busy_periods, normalize, subtract};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn utc(h: u32, m: u32) -> Instant {
    Utc.with_ymd_and_hms(2026, 3, 16, h, m, 0).unwrap()
}

fn span(sh: u32, sm: u32, eh: u32, em: u32) -> Interval {
    Interval::new(utc(sh, sm), utc(eh, em)).unwrap()
}

fn local(s: &str) -> NaiveDateTime {
    s.parse().unwrap()
}

fn source(id: &str, timezone: &str, busy: &[(&str, &str)]) -> BusySource {
    BusySource {
        source_id: id.to_string(),
        timezone: timezone.to_string(),
        busy: busy
            .iter()
            .map(|(s, e)| LocalInterval {
                start: local(s),
                end: local(e),
            })
            .collect(),
    }
}

fn participant(sources: Vec<BusySource>) -> Participant {
    Participant {
        id: "alice".to_string(),
        role: Role::Interviewer,
        timezone: "UTC".to_string(),
        working_hours: None,
        busy_sources: sources,
        constraints: vec![],
        scheduled_interviews: vec![],
    }
}

fn horizon() -> Interval {
    span(8, 0, 17, 0)
}

// ── Merging ─────────────────────────────────────────────────────────────────

#[test]
fn single_busy_block_produces_two_free_intervals() {
    let p = participant(vec![source(
        "work",
        "UTC",
        &[("2026-03-16T10:00:00", "2026-03-16T11:00:00")],
    )]);

    let availability = normalize(&p, horizon()).unwrap();

    assert_eq!(availability.busy, vec![span(10, 0, 11, 0)]);
    assert_eq!(availability.free, vec![span(8, 0, 10, 0), span(11, 0, 17, 0)]);
}

#[test]
fn overlapping_sources_merge_into_one_block() {
    let p = participant(vec![
        source("work", "UTC", &[("2026-03-16T09:00:00", "2026-03-16T11:00:00")]),
        source(
            "personal",
            "UTC",
            &[("2026-03-16T10:00:00", "2026-03-16T12:00:00")],
        ),
    ]);

    let availability = normalize(&p, horizon()).unwrap();

    assert_eq!(availability.busy, vec![span(9, 0, 12, 0)]);
    assert_eq!(availability.free, vec![span(8, 0, 9, 0), span(12, 0, 17, 0)]);
}

#[test]
fn adjacent_blocks_merge() {
    let merged = merge_busy_periods(&[span(9, 0, 10, 0), span(10, 0, 11, 0)], horizon());
    assert_eq!(merged, vec![span(9, 0, 11, 0)]);
}

#[test]
fn unsorted_input_is_sorted_before_merging() {
    let merged = merge_busy_periods(
        &[span(14, 0, 15, 0), span(9, 0, 10, 0), span(9, 30, 9, 45)],
        horizon(),
    );
    assert_eq!(merged, vec![span(9, 0, 10, 0), span(14, 0, 15, 0)]);
}

#[test]
fn sources_in_different_timezones_are_resolved_to_instants() {
    // 06:00-07:00 in New York (EDT, UTC-4) is 10:00-11:00 UTC.
    let p = participant(vec![source(
        "ny-calendar",
        "America/New_York",
        &[("2026-03-16T06:00:00", "2026-03-16T07:00:00")],
    )]);

    let availability = normalize(&p, horizon()).unwrap();

    assert_eq!(availability.busy, vec![span(10, 0, 11, 0)]);
}

// ── Edge cases ──────────────────────────────────────────────────────────────

#[test]
fn zero_length_busy_intervals_are_dropped() {
    let p = participant(vec![source(
        "work",
        "UTC",
        &[("2026-03-16T10:00:00", "2026-03-16T10:00:00")],
    )]);

    let availability = normalize(&p, horizon()).unwrap();

    assert!(availability.busy.is_empty());
    assert_eq!(availability.free, vec![horizon()]);
}

#[test]
fn busy_outside_horizon_is_ignored() {
    let p = participant(vec![source(
        "work",
        "UTC",
        &[
            ("2026-03-16T06:00:00", "2026-03-16T07:00:00"),
            ("2026-03-16T18:00:00", "2026-03-16T19:00:00"),
        ],
    )]);

    let availability = normalize(&p, horizon()).unwrap();

    assert!(availability.busy.is_empty());
    assert_eq!(availability.free, vec![horizon()]);
}

#[test]
fn busy_straddling_horizon_edge_is_clipped() {
    let p = participant(vec![source(
        "work",
        "UTC",
        &[("2026-03-16T07:00:00", "2026-03-16T09:00:00")],
    )]);

    let availability = normalize(&p, horizon()).unwrap();

    assert_eq!(availability.busy, vec![span(8, 0, 9, 0)]);
    assert_eq!(availability.free, vec![span(9, 0, 17, 0)]);
}

#[test]
fn no_working_hours_means_whole_horizon() {
    let availability = normalize(&participant(vec![]), horizon()).unwrap();
    assert_eq!(availability.free, vec![horizon()]);
    assert_eq!(availability.total_free_minutes(), 540);
}

#[test]
fn busy_filling_horizon_leaves_no_free_time() {
    let p = participant(vec![source(
        "work",
        "UTC",
        &[("2026-03-16T08:00:00", "2026-03-16T17:00:00")],
    )]);

    let availability = normalize(&p, horizon()).unwrap();

    assert!(availability.free.is_empty());
}

#[test]
fn reversed_busy_interval_is_rejected() {
    let p = participant(vec![source(
        "work",
        "UTC",
        &[("2026-03-16T11:00:00", "2026-03-16T10:00:00")],
    )]);

    let err = normalize(&p, horizon()).unwrap_err();

    match err {
        ScheduleError::InvalidRequest(msg) => {
            assert!(msg.contains("alice"), "message should name the participant: {msg}");
            assert!(msg.contains("work"), "message should name the source: {msg}");
        }
        other => panic!("expected InvalidRequest, got {other:?}"),
    }
}

#[test]
fn ambiguous_source_time_is_rejected() {
    // 01:30 on 2026-11-01 happens twice in New York.
    let p = participant(vec![source(
        "ny",
        "America/New_York",
        &[("2026-11-01T01:30:00", "2026-11-01T03:00:00")],
    )]);
    let horizon = Interval::new(
        Utc.with_ymd_and_hms(2026, 11, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 11, 2, 0, 0, 0).unwrap(),
    )
    .unwrap();

    let err = normalize(&p, horizon).unwrap_err();

    assert!(matches!(err, ScheduleError::AmbiguousLocalTime { .. }));
}

// ── Working hours ───────────────────────────────────────────────────────────

#[test]
fn busy_time_is_subtracted_from_working_hours() {
    let mut p = participant(vec![source(
        "work",
        "UTC",
        &[("2026-03-16T12:00:00", "2026-03-16T13:00:00")],
    )]);
    p.working_hours = Some(WorkingHours {
        start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
        days: vec![Weekday::Mon],
    });

    let availability = normalize(&p, horizon()).unwrap();

    assert_eq!(availability.free, vec![span(9, 0, 12, 0), span(13, 0, 15, 0)]);
    // Busy time outside working hours is still reported.
    assert_eq!(availability.busy, vec![span(12, 0, 13, 0)]);
}

#[test]
fn subtract_handles_busy_spanning_windows() {
    let windows = vec![span(9, 0, 10, 0), span(11, 0, 12, 0), span(13, 0, 14, 0)];
    let busy = vec![span(9, 30, 11, 30)];

    let free = subtract(&windows, &busy);

    assert_eq!(
        free,
        vec![span(9, 0, 9, 30), span(11, 30, 12, 0), span(13, 0, 14, 0)]
    );
}

#[test]
fn normalization_is_idempotent() {
    let p = participant(vec![
        source("a", "UTC", &[("2026-03-16T09:00:00", "2026-03-16T10:30:00")]),
        source("b", "UTC", &[("2026-03-16T10:00:00", "2026-03-16T11:00:00")]),
        source("c", "UTC", &[("2026-03-16T14:00:00", "2026-03-16T15:00:00")]),
    ]);
    let first = normalize(&p, horizon()).unwrap();

    // Feed the merged busy set back in as a single source.
    let merged = participant(vec![BusySource {
        source_id: "merged".to_string(),
        timezone: "UTC".to_string(),
        busy: first
            .busy
            .iter()
            .map(|b| LocalInterval {
                start: b.start.naive_utc(),
                end: b.end.naive_utc(),
            })
            .collect(),
    }]);
    let second = normalize(&merged, horizon()).unwrap();

    assert_eq!(first.free, second.free);
    assert_eq!(first.busy, second.busy);
}

#[test]
fn covers_checks_a_single_free_interval() {
    let p = participant(vec![source(
        "work",
        "UTC",
        &[("2026-03-16T10:00:00", "2026-03-16T11:00:00")],
    )]);
    let availability = normalize(&p, horizon()).unwrap();

    assert!(availability.covers(&span(9, 0, 10, 0)));
    assert!(availability.covers(&span(11, 0, 11, 30)));
    assert!(!availability.covers(&span(9, 30, 10, 30)));
    assert!(!availability.covers(&span(7, 0, 8, 30)));
}
