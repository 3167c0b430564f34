//! Entry points for one scheduling run.
//!
//! [`schedule`] validates a request, normalizes every participant, sweeps the
//! required participants' free time for candidate slots, and ranks them.
//! [`revalidate_request`] re-checks a proposal against a request carrying
//! freshly fetched busy data. Both are pure: they read nothing but their
//! arguments and may be retried with identical results.

use std::collections::BTreeSet;

use chrono::Duration;
use tracing::{debug, info};

use crate::conflict::{revalidate, Revalidation};
use crate::constraints::check_minutes;
use crate::error::{Result, ScheduleError};
use crate::matcher::SlotMatcher;
use crate::model::{Interval, SchedulingRequest};
use crate::normalizer::{normalize, Availability};
use crate::ranker::{rank, Proposal};
use crate::timezone::parse_zone;

/// Longest horizon a single request may search.
pub const MAX_HORIZON_DAYS: i64 = 366;

/// Reject malformed requests before any computation. Returns the horizon.
pub fn validate(request: &SchedulingRequest) -> Result<Interval> {
    let invalid = |msg: String| Err(ScheduleError::InvalidRequest(msg));

    let Some(horizon) = request.horizon() else {
        return invalid(format!(
            "horizon start {} must be before end {}",
            request.horizon_start.to_rfc3339(),
            request.horizon_end.to_rfc3339()
        ));
    };
    if horizon.duration().num_days() > MAX_HORIZON_DAYS {
        return invalid(format!(
            "horizon spans {} days, more than the {} day limit",
            horizon.duration().num_days(),
            MAX_HORIZON_DAYS
        ));
    }
    let (duration, granularity) = slot_durations(request)?;
    if duration > horizon.duration() {
        return invalid(format!(
            "duration {} min does not fit in a {} min horizon",
            request.duration_minutes,
            horizon.duration_minutes()
        ));
    }
    if granularity > horizon.duration() {
        return invalid(format!(
            "granularity {} min is longer than the {} min horizon",
            request.granularity_minutes,
            horizon.duration_minutes()
        ));
    }
    if request.proposal_count == 0 {
        return invalid("proposal count must be at least 1".to_string());
    }
    if request.required.is_empty() {
        return invalid("at least one required participant is needed".to_string());
    }

    let scoring = &request.scoring;
    let multipliers = &scoring.role_multipliers;
    for (name, value) in [
        ("max_weight", scoring.max_weight),
        ("optional_absence_penalty", scoring.optional_absence_penalty),
        ("role_multipliers.candidate", multipliers.candidate),
        ("role_multipliers.interviewer", multipliers.interviewer),
        ("role_multipliers.recruiter", multipliers.recruiter),
    ] {
        if !value.is_finite() || value < 0.0 {
            return invalid(format!(
                "{} must be a finite non-negative number, got {}",
                name, value
            ));
        }
    }

    let mut seen = BTreeSet::new();
    for (participant, _) in request.participants() {
        if !seen.insert(participant.id.as_str()) {
            return invalid(format!("duplicate participant id '{}'", participant.id));
        }
        parse_zone(&participant.timezone)?;
        for constraint in &participant.constraints {
            check_minutes(constraint).map_err(|e| match e {
                ScheduleError::InvalidRequest(msg) => ScheduleError::InvalidRequest(format!(
                    "participant '{}': {}",
                    participant.id, msg
                )),
                other => other,
            })?;
        }
    }

    Ok(horizon)
}

/// The interview length and start-time step, both positive and in range.
fn slot_durations(request: &SchedulingRequest) -> Result<(Duration, Duration)> {
    let positive = |value: Option<Duration>, name: &str, minutes: i64| {
        value.filter(|d| *d > Duration::zero()).ok_or_else(|| {
            ScheduleError::InvalidRequest(format!(
                "{} must be positive and in range, got {} min",
                name, minutes
            ))
        })
    };
    Ok((
        positive(request.duration(), "duration", request.duration_minutes)?,
        positive(
            request.granularity(),
            "granularity",
            request.granularity_minutes,
        )?,
    ))
}

/// Normalize every participant of `request` over `horizon`, required first,
/// in request order.
pub fn normalize_all(request: &SchedulingRequest, horizon: Interval) -> Result<Vec<Availability>> {
    request
        .participants()
        .map(|(participant, _)| normalize(participant, horizon))
        .collect()
}

/// Validate and normalize `request`, returning the lazy candidate stream and
/// every participant's availability (required first).
///
/// # Errors
/// `InvalidRequest`, timezone errors, or `NoFeasibleSlot` if a required
/// participant has no free time at all.
pub fn match_slots(request: &SchedulingRequest) -> Result<(SlotMatcher, Vec<Availability>)> {
    let horizon = validate(request)?;
    let (duration, granularity) = slot_durations(request)?;
    let availability = normalize_all(request, horizon)?;

    let required = &availability[..request.required.len()];
    let matcher = SlotMatcher::new(required, duration, granularity, horizon.start)?;

    debug!(
        required = request.required.len(),
        optional = request.optional.len(),
        horizon = %horizon,
        "matching slots"
    );

    Ok((matcher, availability))
}

/// Run a full scheduling pass: validate, normalize, match, and rank.
///
/// Returns at most `request.proposal_count` proposals, best first.
///
/// # Errors
/// `NoFeasibleSlot` when no slot satisfies every required participant's
/// availability and hard constraints within the horizon. No partial results
/// are returned in that case.
pub fn schedule(request: &SchedulingRequest) -> Result<Vec<Proposal>> {
    let (matcher, availability) = match_slots(request)?;
    let proposals = rank(matcher, request, &availability)?;

    let Some(best) = proposals.first() else {
        return Err(ScheduleError::NoFeasibleSlot {
            reason: "no slot satisfies every required participant's availability \
                     and hard constraints within the horizon"
                .to_string(),
        });
    };

    info!(
        proposals = proposals.len(),
        best_start = %best.slot.start.to_rfc3339(),
        best_score = best.score,
        "scheduled interview"
    );

    Ok(proposals)
}

/// Revalidate `proposal` against the busy data in `fresh`, a request carrying
/// availability re-fetched at commit time.
///
/// Only the participants and horizon of `fresh` are used; its scoring fields
/// are ignored.
pub fn revalidate_request(proposal: &Proposal, fresh: &SchedulingRequest) -> Result<Revalidation> {
    let horizon = fresh.horizon().ok_or_else(|| {
        ScheduleError::InvalidRequest("fresh snapshot has an empty horizon".to_string())
    })?;
    let availability = normalize_all(fresh, horizon)?;
    Ok(revalidate(proposal, &availability))
}
