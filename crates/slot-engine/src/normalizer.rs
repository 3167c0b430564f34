//! Normalize a participant's raw busy data into free intervals.
//!
//! Accepts busy intervals from any number of calendar sources (each in its own
//! timezone), merges them into non-overlapping busy blocks within the horizon,
//! then subtracts the busy blocks from the participant's working-hours windows.
//! The result is a sorted, non-overlapping free-interval sequence.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ScheduleError};
use crate::model::{BusySource, Interval, Participant};
use crate::timezone::{parse_zone, to_instant_in};
use crate::working_hours::expand_working_hours;

/// A participant's normalized availability within one horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Availability {
    pub participant_id: String,
    /// Merged busy blocks (sorted by start, non-overlapping), clipped to the horizon.
    pub busy: Vec<Interval>,
    /// Free intervals (sorted by start, non-overlapping, never empty intervals).
    pub free: Vec<Interval>,
}

impl Availability {
    /// Whether one free interval contains the whole of `slot`.
    pub fn covers(&self, slot: &Interval) -> bool {
        let idx = self.free.partition_point(|f| f.start <= slot.start);
        idx > 0 && self.free[idx - 1].contains(slot)
    }

    pub fn total_free_minutes(&self) -> i64 {
        self.free.iter().map(Interval::duration_minutes).sum()
    }
}

/// Normalize `participant`'s busy sources and working hours over `horizon`.
///
/// A participant without working hours is available across the full horizon,
/// minus busy time.
///
/// # Errors
/// - `InvalidTimezone`, `AmbiguousLocalTime`, `NonexistentLocalTime` when a
///   source's wall times cannot be resolved.
/// - `InvalidRequest` when a source reports a reversed interval.
/// - Any error from [`expand_working_hours`].
pub fn normalize(participant: &Participant, horizon: Interval) -> Result<Availability> {
    let raw = resolve_sources(&participant.busy_sources)
        .map_err(|e| annotate(e, &participant.id))?;
    let busy = merge_busy_periods(&raw, horizon);

    let windows = match &participant.working_hours {
        Some(hours) => expand_working_hours(hours, &participant.timezone, horizon)?,
        None => vec![horizon],
    };
    let free = subtract(&windows, &busy);

    debug!(
        participant = %participant.id,
        sources = participant.busy_sources.len(),
        busy_blocks = busy.len(),
        windows = windows.len(),
        free_intervals = free.len(),
        "normalized availability"
    );

    Ok(Availability {
        participant_id: participant.id.clone(),
        busy,
        free,
    })
}

/// Resolve every source's wall-clock busy intervals to absolute intervals.
///
/// Zero-length intervals are dropped. The output is unsorted and may overlap.
pub fn resolve_sources(sources: &[BusySource]) -> Result<Vec<Interval>> {
    let mut out = Vec::new();
    for source in sources {
        let tz = parse_zone(&source.timezone)?;
        for local in &source.busy {
            let start = to_instant_in(local.start, tz, &source.timezone)?;
            let end = to_instant_in(local.end, tz, &source.timezone)?;
            if start > end {
                return Err(ScheduleError::InvalidRequest(format!(
                    "source '{}' reports a busy interval ending before it starts ({} > {})",
                    source.source_id, local.start, local.end
                )));
            }
            if let Some(interval) = Interval::new(start, end) {
                out.push(interval);
            }
        }
    }
    Ok(out)
}

/// Merge overlapping or adjacent busy periods, clipped to the given window.
///
/// Returns a sorted, non-overlapping list of intervals. Busy time entirely
/// outside the window is discarded.
pub fn merge_busy_periods(busy: &[Interval], window: Interval) -> Vec<Interval> {
    let mut intervals: Vec<Interval> = busy
        .iter()
        .filter_map(|b| b.intersect(&window))
        .collect();

    // Sort by start time (then by end time for stability).
    intervals.sort();

    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        if let Some(last) = merged.last_mut() {
            if interval.start <= last.end {
                // Overlapping or adjacent: extend the current interval.
                last.end = last.end.max(interval.end);
                continue;
            }
        }
        merged.push(interval);
    }

    merged
}

/// Subtract sorted, merged `busy` blocks from sorted, non-overlapping `windows`.
pub fn subtract(windows: &[Interval], busy: &[Interval]) -> Vec<Interval> {
    let mut free = Vec::new();
    let mut first = 0;

    for window in windows {
        while first < busy.len() && busy[first].end <= window.start {
            first += 1;
        }

        let mut cursor = window.start;
        for block in busy[first..].iter().take_while(|b| b.start < window.end) {
            if let Some(gap) = Interval::new(cursor, block.start) {
                free.push(gap);
            }
            cursor = cursor.max(block.end);
        }

        // Trailing free time after the last busy block in this window.
        if let Some(gap) = Interval::new(cursor, window.end) {
            free.push(gap);
        }
    }

    free
}

fn annotate(err: ScheduleError, participant_id: &str) -> ScheduleError {
    match err {
        ScheduleError::InvalidRequest(msg) => {
            ScheduleError::InvalidRequest(format!("participant '{}': {}", participant_id, msg))
        }
        other => other,
    }
}
