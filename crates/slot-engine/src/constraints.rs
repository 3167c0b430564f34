//! Evaluate a candidate interval against one participant's constraints.
//!
//! Hard constraints decide feasibility. Once one fails, the remaining hard
//! constraints are skipped, but soft constraints are still evaluated so the
//! caller can report every preference the slot misses.

use chrono::Duration;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::model::{Constraint, ConstraintKind, Instant, Interval, Participant};
use crate::normalizer::Availability;
use crate::timezone::{local_date_in, parse_zone, to_local_in};

/// Request-wide inputs every evaluation needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationContext {
    /// The "now" anchor for `MinNotice`.
    pub reference_time: Instant,
    /// Upper bound for soft-constraint weights.
    pub max_weight: f64,
}

/// How a single constraint judged the slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintOutcome {
    pub kind: ConstraintKind,
    pub hard: bool,
    pub satisfied: bool,
    /// Penalty contributed (always 0 for hard constraints).
    pub penalty: f64,
    pub detail: String,
}

/// The verdict of all of a participant's constraints on one slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// False if any hard constraint was violated.
    pub pass: bool,
    /// Sum of soft-constraint penalties (unweighted by role).
    pub penalty: f64,
    pub reasons: Vec<ConstraintOutcome>,
}

/// Evaluate `slot` against every constraint of `participant`.
///
/// `availability` is the participant's normalized availability; its busy
/// blocks feed `BufferAround`.
pub fn evaluate(
    slot: &Interval,
    participant: &Participant,
    availability: &Availability,
    ctx: &EvaluationContext,
) -> Result<Evaluation> {
    let tz = parse_zone(&participant.timezone)?;
    let max_weight = if ctx.max_weight.is_finite() && ctx.max_weight > 0.0 {
        ctx.max_weight
    } else {
        0.0
    };

    let mut pass = true;
    let mut penalty = 0.0;
    let mut reasons = Vec::with_capacity(participant.constraints.len());

    for constraint in &participant.constraints {
        if constraint.is_hard() && !pass {
            continue;
        }

        let outcome = match constraint {
            Constraint::BlackoutWindow { start, end } => blackout(slot, *start, *end),
            Constraint::MinNotice { minutes } => min_notice(slot, ctx.reference_time, *minutes)?,
            Constraint::MaxPerDay { count } => max_per_day(slot, participant, tz, *count),
            Constraint::PreferredWindow { start, end, weight } => {
                let inside = {
                    let local_start = to_local_in(slot.start, tz);
                    let local_end = to_local_in(slot.end, tz);
                    local_start.date() == local_end.date()
                        && local_start.time() >= *start
                        && local_end.time() <= *end
                };
                let weight = clamp_weight(*weight, max_weight);
                ConstraintOutcome {
                    kind: ConstraintKind::PreferredWindow,
                    hard: false,
                    satisfied: inside,
                    penalty: if inside { 0.0 } else { weight },
                    detail: format!("preferred {}-{} local", start, end),
                }
            }
            Constraint::BufferAround { minutes, weight } => buffer_around(
                slot,
                &availability.busy,
                *minutes,
                clamp_weight(*weight, max_weight),
            )?,
        };

        if constraint.is_hard() && !outcome.satisfied {
            pass = false;
        }
        penalty += outcome.penalty;
        reasons.push(outcome);
    }

    Ok(Evaluation {
        pass,
        penalty,
        reasons,
    })
}

/// Clamp an untrusted weight to `[0, max_weight]`. NaN counts as zero.
pub fn clamp_weight(weight: f64, max_weight: f64) -> f64 {
    if weight.is_nan() {
        0.0
    } else {
        weight.clamp(0.0, max_weight)
    }
}

/// Check a constraint's `minutes` parameter, if it has one.
///
/// Negative values and values too large for a `Duration` are
/// `InvalidRequest`.
pub fn check_minutes(constraint: &Constraint) -> Result<()> {
    match constraint {
        Constraint::MinNotice { minutes } => minutes_param("min_notice", *minutes).map(drop),
        Constraint::BufferAround { minutes, .. } => {
            minutes_param("buffer_around", *minutes).map(drop)
        }
        _ => Ok(()),
    }
}

fn minutes_param(name: &str, minutes: i64) -> Result<Duration> {
    Duration::try_minutes(minutes)
        .filter(|_| minutes >= 0)
        .ok_or_else(|| {
            ScheduleError::InvalidRequest(format!(
                "{} minutes must be non-negative and in range, got {}",
                name, minutes
            ))
        })
}

fn hard_outcome(kind: ConstraintKind, satisfied: bool, detail: String) -> ConstraintOutcome {
    ConstraintOutcome {
        kind,
        hard: true,
        satisfied,
        penalty: 0.0,
        detail,
    }
}

fn blackout(slot: &Interval, start: Instant, end: Instant) -> ConstraintOutcome {
    let clear = Interval::new(start, end).is_none_or(|b| !b.overlaps(slot));
    hard_outcome(
        ConstraintKind::BlackoutWindow,
        clear,
        format!("blackout {}..{}", start.to_rfc3339(), end.to_rfc3339()),
    )
}

fn min_notice(slot: &Interval, reference_time: Instant, minutes: i64) -> Result<ConstraintOutcome> {
    let required = minutes_param("min_notice", minutes)?;
    let notice = slot.start - reference_time;
    Ok(hard_outcome(
        ConstraintKind::MinNotice,
        notice >= required,
        format!(
            "{} min notice required, {} min given",
            minutes,
            notice.num_minutes()
        ),
    ))
}

fn max_per_day(slot: &Interval, participant: &Participant, tz: Tz, count: u32) -> ConstraintOutcome {
    let day = local_date_in(slot.start, tz);
    let booked = participant
        .scheduled_interviews
        .iter()
        .filter(|i| local_date_in(i.start, tz) == day)
        .count();
    hard_outcome(
        ConstraintKind::MaxPerDay,
        booked < count as usize,
        format!("{} of {} interviews already booked on {}", booked, count, day),
    )
}

fn buffer_around(
    slot: &Interval,
    busy: &[Interval],
    minutes: i64,
    weight: f64,
) -> Result<ConstraintOutcome> {
    let buffer = minutes_param("buffer_around", minutes)?;

    // Distance from the slot to the nearest busy block; zero if they overlap.
    let nearest = busy
        .iter()
        .map(|b| {
            if b.overlaps(slot) {
                Duration::zero()
            } else if b.end <= slot.start {
                slot.start - b.end
            } else {
                b.start - slot.end
            }
        })
        .min();

    let (satisfied, penalty) = match nearest {
        Some(gap) if minutes > 0 && gap < buffer => {
            let shortfall = (buffer - gap).num_seconds() as f64;
            (false, weight * shortfall / buffer.num_seconds() as f64)
        }
        _ => (true, 0.0),
    };

    Ok(ConstraintOutcome {
        kind: ConstraintKind::BufferAround,
        hard: false,
        satisfied,
        penalty,
        detail: match nearest {
            Some(gap) => format!(
                "{} min buffer wanted, nearest busy {} min away",
                minutes,
                gap.num_minutes()
            ),
            None => format!("{} min buffer wanted, no busy time nearby", minutes),
        },
    })
}
