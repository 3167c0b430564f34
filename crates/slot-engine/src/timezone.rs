//! Conversion between absolute instants and wall-clock time in IANA zones.
//!
//! Every boundary the engine compares is an [`Instant`]. Local times only
//! appear at the edges: raw busy data from calendar sources, working-hours
//! envelopes, and timezone-relative constraints ("not before 9am local").
//!
//! Local times that fall inside a DST transition are rejected instead of being
//! resolved to one of the candidate offsets:
//!
//! - a time inside the spring-forward gap yields
//!   [`ScheduleError::NonexistentLocalTime`]
//! - a time inside the fall-back fold yields
//!   [`ScheduleError::AmbiguousLocalTime`]

use chrono::{LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{Result, ScheduleError};
use crate::model::Instant;

/// Parse an IANA timezone identifier (e.g., "America/New_York").
pub fn parse_zone(zone: &str) -> Result<Tz> {
    zone.parse::<Tz>()
        .map_err(|_| ScheduleError::InvalidTimezone(zone.to_string()))
}

/// Resolve a wall-clock time in `zone` to the single instant it denotes.
///
/// # Errors
/// - `InvalidTimezone` if `zone` is not a known IANA identifier.
/// - `NonexistentLocalTime` if `local` is skipped by a DST transition.
/// - `AmbiguousLocalTime` if `local` occurs twice because of a DST transition.
pub fn to_instant(local: NaiveDateTime, zone: &str) -> Result<Instant> {
    let tz = parse_zone(zone)?;
    to_instant_in(local, tz, zone)
}

pub(crate) fn to_instant_in(local: NaiveDateTime, tz: Tz, zone: &str) -> Result<Instant> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(_, _) => Err(ScheduleError::AmbiguousLocalTime {
            local,
            zone: zone.to_string(),
        }),
        LocalResult::None => Err(ScheduleError::NonexistentLocalTime {
            local,
            zone: zone.to_string(),
        }),
    }
}

/// Render an instant as wall-clock time in `zone`.
///
/// Always unambiguous: every instant has exactly one local representation.
pub fn to_local(instant: Instant, zone: &str) -> Result<NaiveDateTime> {
    let tz = parse_zone(zone)?;
    Ok(to_local_in(instant, tz))
}

pub(crate) fn to_local_in(instant: Instant, tz: Tz) -> NaiveDateTime {
    instant.with_timezone(&tz).naive_local()
}

/// The calendar date `instant` falls on in `tz`.
pub(crate) fn local_date_in(instant: Instant, tz: Tz) -> NaiveDate {
    to_local_in(instant, tz).date()
}
