//! Working-hours expansion: turns a recurring daily envelope into concrete
//! UTC windows over a horizon.
//!
//! The envelope is expressed as an RFC 5545 `FREQ=DAILY;BYDAY=...` rule with a
//! `TZID`-qualified DTSTART and expanded through the `rrule` crate, which
//! picks the local dates the envelope applies to. Both ends of each window are
//! then resolved on that local date, so "9:00-17:00 local" stays eight
//! wall-clock hours across DST transitions. An envelope boundary that falls
//! in a DST gap or fold is an error, never shifted.

use chrono::{Datelike, Weekday};
use rrule::RRuleSet;

use crate::error::{Result, ScheduleError};
use crate::model::{Interval, WorkingHours};
use crate::timezone::{local_date_in, parse_zone, to_instant_in};

/// Expand `hours` (in `zone`) into the windows that intersect `horizon`.
///
/// Windows are returned sorted, non-overlapping, and clipped to the horizon.
///
/// # Errors
/// - `InvalidRequest` if the envelope is empty or crosses midnight.
/// - `InvalidTimezone` if `zone` is not a valid IANA identifier.
/// - `InvalidRule` if the generated recurrence is rejected by `rrule`.
/// - `AmbiguousLocalTime` / `NonexistentLocalTime` if a window start or end
///   falls in a DST transition.
pub fn expand_working_hours(
    hours: &WorkingHours,
    zone: &str,
    horizon: Interval,
) -> Result<Vec<Interval>> {
    if hours.start >= hours.end {
        return Err(ScheduleError::InvalidRequest(format!(
            "working hours {}-{} must start before they end on the same day",
            hours.start, hours.end
        )));
    }

    let tz = parse_zone(zone)?;

    let mut days = hours.days.clone();
    days.sort_by_key(|d| d.num_days_from_monday());
    days.dedup();
    if days.is_empty() {
        return Ok(Vec::new());
    }

    let first_date = local_date_in(horizon.start, tz);
    let last_date = local_date_in(horizon.end, tz);

    // One occurrence per local calendar day touched by the horizon is an upper
    // bound; occurrences past the horizon are clipped away below.
    let span_days = (last_date - first_date).num_days() + 1;
    let count = u16::try_from(span_days).unwrap_or(u16::MAX);

    let byday: Vec<&str> = days.iter().map(|&d| ical_weekday(d)).collect();
    let dtstart = first_date
        .and_time(hours.start)
        .format("%Y%m%dT%H%M%S")
        .to_string();

    let rrule_text = format!(
        "DTSTART;TZID={}:{}\nRRULE:FREQ=DAILY;BYDAY={};COUNT={}",
        zone,
        dtstart,
        byday.join(","),
        count
    );

    let rrule_set: RRuleSet = rrule_text
        .parse()
        .map_err(|e| ScheduleError::InvalidRule(format!("{}", e)))?;

    let mut windows = Vec::new();
    for occurrence in rrule_set.all(count).dates {
        let local_date = occurrence.date_naive();

        // DTSTART itself may land on a day outside BYDAY.
        if !days.contains(&local_date.weekday()) {
            continue;
        }

        // Resolve both ends on the local date; rrule would shift a gap start forward.
        let start = to_instant_in(local_date.and_time(hours.start), tz, zone)?;
        let end = to_instant_in(local_date.and_time(hours.end), tz, zone)?;
        if let Some(window) = Interval::new(start, end).and_then(|w| w.intersect(&horizon)) {
            windows.push(window);
        }
    }

    windows.sort();
    windows.dedup();
    Ok(windows)
}

fn ical_weekday(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}
