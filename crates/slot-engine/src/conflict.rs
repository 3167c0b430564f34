//! Re-validate a proposal against freshly fetched availability.
//!
//! Called right before a proposal is committed to calendars. If any required
//! participant's fresh free time no longer covers the slot, the proposal is
//! stale and the caller should re-match instead of forcing the booking.
//! Adjacent busy time (ending exactly at the slot start, or starting exactly at
//! its end) is NOT a conflict.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::Interval;
use crate::normalizer::Availability;
use crate::ranker::Proposal;

/// A fresh busy block that overlaps the proposed slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub participant_id: String,
    pub busy: Interval,
    pub overlap_minutes: i64,
}

/// Why a proposal failed revalidation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConflictReason {
    /// The participant's fresh free time no longer covers the slot.
    StaleAvailability { participant_id: String },
    /// No fresh availability was supplied for a required participant.
    MissingAvailability { participant_id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revalidation {
    pub valid: bool,
    /// The first failure, in participant-id order. `None` when valid.
    pub reason: Option<ConflictReason>,
    pub conflicts: Vec<Conflict>,
}

/// Find every busy block that overlaps `slot`.
///
/// Two intervals overlap when `a.start < b.end && b.start < a.end`; the overlap
/// is `min(a.end, b.end) - max(a.start, b.start)`.
pub fn find_conflicts(participant_id: &str, slot: &Interval, busy: &[Interval]) -> Vec<Conflict> {
    busy.iter()
        .filter_map(|b| b.intersect(slot).map(|overlap| (b, overlap)))
        .map(|(b, overlap)| Conflict {
            participant_id: participant_id.to_string(),
            busy: *b,
            overlap_minutes: overlap.duration_minutes(),
        })
        .collect()
}

/// Check that every required participant of `proposal` is still free for it.
///
/// Pure and idempotent: the same proposal and snapshot always give the same
/// answer, so the orchestration layer may retry it freely.
pub fn revalidate(proposal: &Proposal, fresh: &[Availability]) -> Revalidation {
    let slot = proposal.slot.interval();
    let mut reason = None;
    let mut conflicts = Vec::new();

    for participant_id in &proposal.slot.participant_ids {
        let failure = match fresh.iter().find(|a| &a.participant_id == participant_id) {
            None => Some(ConflictReason::MissingAvailability {
                participant_id: participant_id.clone(),
            }),
            Some(availability) if !availability.covers(&slot) => {
                conflicts.extend(find_conflicts(participant_id, &slot, &availability.busy));
                Some(ConflictReason::StaleAvailability {
                    participant_id: participant_id.clone(),
                })
            }
            Some(_) => None,
        };

        if reason.is_none() {
            reason = failure;
        }
    }

    if let Some(reason) = &reason {
        warn!(
            slot = %slot,
            reason = ?reason,
            conflicts = conflicts.len(),
            "proposal failed revalidation"
        );
    }

    Revalidation {
        valid: reason.is_none(),
        reason,
        conflicts,
    }
}
