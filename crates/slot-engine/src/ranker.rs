//! Score candidate slots and keep the best few as ranked proposals.
//!
//! A slot's score is the sum, over every participant, of its soft-constraint
//! penalty times the participant's role multiplier. Optional participants who
//! cannot attend add the configured absence penalty (also role-weighted).
//! Lower is better. Proposals are totally ordered by
//! `(score, start, participant ids)`, so identical inputs always rank
//! identically.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constraints::{evaluate, ConstraintOutcome, EvaluationContext};
use crate::error::{Result, ScheduleError};
use crate::matcher::CandidateSlot;
use crate::model::{Participant, Role, SchedulingRequest};
use crate::normalizer::Availability;

/// One participant's contribution to a proposal's score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantBreakdown {
    pub participant_id: String,
    pub role: Role,
    pub required: bool,
    /// Whether the participant is free for the whole slot and passes their
    /// hard constraints.
    pub attends: bool,
    /// Penalty after the role multiplier is applied.
    pub weighted_penalty: f64,
    pub outcomes: Vec<ConstraintOutcome>,
}

/// A ranked, explainable wrapper around a [`CandidateSlot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    /// 1-based position in the ranked output.
    pub rank: usize,
    pub slot: CandidateSlot,
    pub score: f64,
    /// Optional participants able to attend, sorted by id.
    pub optional_attendees: Vec<String>,
    pub breakdown: Vec<ParticipantBreakdown>,
}

impl Proposal {
    /// Human-readable, role-tagged lines describing every missed preference.
    pub fn rationale(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for entry in &self.breakdown {
            if !entry.attends && !entry.required {
                lines.push(format!(
                    "{} {}: cannot attend",
                    entry.role, entry.participant_id
                ));
            }
            for outcome in entry.outcomes.iter().filter(|o| !o.satisfied) {
                lines.push(format!(
                    "{} {}: {} (+{:.2})",
                    entry.role, entry.participant_id, outcome.detail, outcome.penalty
                ));
            }
        }
        lines
    }
}

/// The ranking total order: lower score, then earlier start, then the
/// lexicographically smaller participant-id set.
pub fn compare(a: &Proposal, b: &Proposal) -> Ordering {
    a.score
        .total_cmp(&b.score)
        .then_with(|| a.slot.start.cmp(&b.slot.start))
        .then_with(|| a.slot.participant_ids.cmp(&b.slot.participant_ids))
}

/// Heap entry ordered by [`compare`]; the heap top is the worst kept proposal.
struct Ranked(Proposal);

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        compare(&self.0, &other.0) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(&self.0, &other.0)
    }
}

/// Score `candidates` and return at most `request.proposal_count` proposals,
/// best first.
///
/// Slots that a required participant is not free for, or that violate one of
/// their hard constraints, are dropped. `availability` must hold an entry for
/// every participant in the request (required and optional).
///
/// # Errors
/// `InvalidRequest` if a participant has no availability entry, or any
/// evaluation error (e.g., an unknown participant timezone).
pub fn rank<I>(
    candidates: I,
    request: &SchedulingRequest,
    availability: &[Availability],
) -> Result<Vec<Proposal>>
where
    I: IntoIterator<Item = CandidateSlot>,
{
    let limit = request.proposal_count;
    if limit == 0 {
        return Ok(Vec::new());
    }

    let participants: Vec<(&Participant, &Availability, bool)> = request
        .participants()
        .map(|(p, required)| {
            availability
                .iter()
                .find(|a| a.participant_id == p.id)
                .map(|a| (p, a, required))
                .ok_or_else(|| {
                    ScheduleError::InvalidRequest(format!(
                        "no availability supplied for participant '{}'",
                        p.id
                    ))
                })
        })
        .collect::<Result<_>>()?;

    let ctx = EvaluationContext {
        reference_time: request.reference_time,
        max_weight: request.scoring.max_weight,
    };
    let multipliers = request.scoring.role_multipliers;

    let mut heap: BinaryHeap<Ranked> = BinaryHeap::with_capacity(limit + 1);
    let mut considered = 0usize;
    let mut rejected = 0usize;

    'candidates: for slot in candidates {
        considered += 1;
        let interval = slot.interval();
        let mut score = 0.0;
        let mut optional_attendees = Vec::new();
        let mut breakdown = Vec::with_capacity(participants.len());

        for &(participant, avail, required) in &participants {
            let evaluation = evaluate(&interval, participant, avail, &ctx)?;
            let attends = evaluation.pass && avail.covers(&interval);
            if required && !attends {
                rejected += 1;
                continue 'candidates;
            }

            let multiplier = multipliers.for_role(participant.role);
            let mut weighted_penalty = multiplier * evaluation.penalty;
            if !required {
                if attends {
                    optional_attendees.push(participant.id.clone());
                } else {
                    weighted_penalty += multiplier * request.scoring.optional_absence_penalty;
                }
            }
            score += weighted_penalty;

            breakdown.push(ParticipantBreakdown {
                participant_id: participant.id.clone(),
                role: participant.role,
                required,
                attends,
                weighted_penalty,
                outcomes: evaluation.reasons,
            });
        }

        optional_attendees.sort();
        heap.push(Ranked(Proposal {
            rank: 0,
            slot,
            score,
            optional_attendees,
            breakdown,
        }));
        if heap.len() > limit {
            heap.pop();
        }
    }

    debug!(
        considered,
        rejected,
        kept = heap.len(),
        "ranked candidate slots"
    );

    Ok(heap
        .into_sorted_vec()
        .into_iter()
        .enumerate()
        .map(|(i, Ranked(mut proposal))| {
            proposal.rank = i + 1;
            proposal
        })
        .collect())
}
