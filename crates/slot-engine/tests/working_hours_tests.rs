//! Tests for working-hours envelope expansion.

use chrono::{NaiveTime, TimeZone, Utc, Weekday};
use slot_engine::error::ScheduleError;
use slot_engine::model::{Instant, Interval, WorkingHours};
use slot_engine::working_hours::expand_working_hours;

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> Instant {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn hours(start: u32, end: u32, days: &[Weekday]) -> WorkingHours {
    WorkingHours {
        start: NaiveTime::from_hms_opt(start, 0, 0).unwrap(),
        end: NaiveTime::from_hms_opt(end, 0, 0).unwrap(),
        days: days.to_vec(),
    }
}

const EVERY_DAY: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[test]
fn weekdays_only_in_utc() {
    // Mon 2026-03-02 .. Mon 2026-03-09: five weekday windows.
    let horizon = Interval::new(utc(2026, 3, 2, 0, 0), utc(2026, 3, 9, 0, 0)).unwrap();
    let envelope = hours(
        9,
        17,
        &[
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ],
    );

    let windows = expand_working_hours(&envelope, "UTC", horizon).unwrap();

    assert_eq!(windows.len(), 5);
    assert_eq!(windows[0].start, utc(2026, 3, 2, 9, 0));
    assert_eq!(windows[0].end, utc(2026, 3, 2, 17, 0));
    assert_eq!(windows[4].start, utc(2026, 3, 6, 9, 0));
    assert_eq!(windows[4].end, utc(2026, 3, 6, 17, 0));
}

#[test]
fn windows_follow_wall_clock_across_spring_forward() {
    // New York springs forward on Sunday 2026-03-08.
    // 09:00-17:00 EST = 14:00-22:00 UTC; 09:00-17:00 EDT = 13:00-21:00 UTC.
    let horizon = Interval::new(utc(2026, 3, 7, 0, 0), utc(2026, 3, 10, 0, 0)).unwrap();
    let envelope = hours(9, 17, &EVERY_DAY);

    let windows = expand_working_hours(&envelope, "America/New_York", horizon).unwrap();

    assert_eq!(
        windows,
        vec![
            Interval::new(utc(2026, 3, 7, 14, 0), utc(2026, 3, 7, 22, 0)).unwrap(),
            Interval::new(utc(2026, 3, 8, 13, 0), utc(2026, 3, 8, 21, 0)).unwrap(),
            Interval::new(utc(2026, 3, 9, 13, 0), utc(2026, 3, 9, 21, 0)).unwrap(),
        ]
    );
    // Exactly one hour of shift, and still eight hours long.
    assert_eq!(
        (windows[0].start - windows[1].start) + chrono::Duration::days(1),
        chrono::Duration::hours(1)
    );
    assert!(windows.iter().all(|w| w.duration_minutes() == 480));
}

#[test]
fn windows_are_clipped_to_the_horizon() {
    let horizon = Interval::new(utc(2026, 3, 2, 12, 0), utc(2026, 3, 3, 10, 0)).unwrap();
    let envelope = hours(9, 17, &EVERY_DAY);

    let windows = expand_working_hours(&envelope, "UTC", horizon).unwrap();

    assert_eq!(
        windows,
        vec![
            Interval::new(utc(2026, 3, 2, 12, 0), utc(2026, 3, 2, 17, 0)).unwrap(),
            Interval::new(utc(2026, 3, 3, 9, 0), utc(2026, 3, 3, 10, 0)).unwrap(),
        ]
    );
}

#[test]
fn empty_day_list_yields_no_windows() {
    let horizon = Interval::new(utc(2026, 3, 2, 0, 0), utc(2026, 3, 9, 0, 0)).unwrap();
    let windows = expand_working_hours(&hours(9, 17, &[]), "UTC", horizon).unwrap();
    assert!(windows.is_empty());
}

#[test]
fn overnight_envelope_is_rejected() {
    let horizon = Interval::new(utc(2026, 3, 2, 0, 0), utc(2026, 3, 9, 0, 0)).unwrap();
    let err = expand_working_hours(&hours(22, 6, &EVERY_DAY), "UTC", horizon).unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidRequest(_)));
}

#[test]
fn unknown_timezone_is_rejected() {
    let horizon = Interval::new(utc(2026, 3, 2, 0, 0), utc(2026, 3, 9, 0, 0)).unwrap();
    let err = expand_working_hours(&hours(9, 17, &EVERY_DAY), "Nowhere/Special", horizon)
        .unwrap_err();
    assert_eq!(
        err,
        ScheduleError::InvalidTimezone("Nowhere/Special".to_string())
    );
}

fn hours_hm(start: (u32, u32), end: (u32, u32), days: &[Weekday]) -> WorkingHours {
    WorkingHours {
        start: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
        end: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        days: days.to_vec(),
    }
}

const SAT_TO_MON: [Weekday; 3] = [Weekday::Sat, Weekday::Sun, Weekday::Mon];

fn nonexistent_local(err: ScheduleError) -> chrono::NaiveDateTime {
    match err {
        ScheduleError::NonexistentLocalTime { local, zone } => {
            assert_eq!(zone, "America/New_York");
            local
        }
        other => panic!("expected NonexistentLocalTime, got {other:?}"),
    }
}

#[test]
fn window_start_in_spring_forward_gap_is_rejected() {
    // 02:30 does not exist in New York on 2026-03-08.
    let horizon = Interval::new(utc(2026, 3, 7, 0, 0), utc(2026, 3, 10, 0, 0)).unwrap();
    let envelope = hours_hm((2, 30), (10, 0), &SAT_TO_MON);

    let err = expand_working_hours(&envelope, "America/New_York", horizon).unwrap_err();

    assert_eq!(
        nonexistent_local(err),
        "2026-03-08T02:30:00".parse().unwrap()
    );
}

#[test]
fn window_end_in_spring_forward_gap_is_rejected() {
    let horizon = Interval::new(utc(2026, 3, 7, 0, 0), utc(2026, 3, 10, 0, 0)).unwrap();
    let envelope = hours_hm((0, 0), (2, 30), &SAT_TO_MON);

    let err = expand_working_hours(&envelope, "America/New_York", horizon).unwrap_err();

    assert_eq!(
        nonexistent_local(err),
        "2026-03-08T02:30:00".parse().unwrap()
    );
}

#[test]
fn gap_day_outside_the_day_list_is_not_resolved() {
    // Sunday 2026-03-08 is skipped, so the 02:30 start never needs resolving.
    let horizon = Interval::new(utc(2026, 3, 7, 0, 0), utc(2026, 3, 10, 0, 0)).unwrap();
    let envelope = hours_hm((2, 30), (10, 0), &[Weekday::Sat, Weekday::Mon]);

    let windows = expand_working_hours(&envelope, "America/New_York", horizon).unwrap();

    assert_eq!(
        windows,
        vec![
            Interval::new(utc(2026, 3, 7, 7, 30), utc(2026, 3, 7, 15, 0)).unwrap(),
            Interval::new(utc(2026, 3, 9, 6, 30), utc(2026, 3, 9, 14, 0)).unwrap(),
        ]
    );
}
