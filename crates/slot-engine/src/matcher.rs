//! Enumerate candidate slots common to every required participant.
//!
//! A sweep over the participants' sorted free-interval sequences keeps one
//! cursor per participant. At each step the overlap of the current intervals
//! is `[max(starts), min(ends))`; when it can hold the interview, every
//! grid-aligned start inside it is emitted. Then the cursor whose interval ends
//! first is advanced. Each overlap is visited once, so starts are strictly
//! increasing and never repeat.
//!
//! [`SlotMatcher`] is a lazy, finite iterator: a caller can stop after the
//! first N slots without paying for the rest of the horizon, and dropping it
//! mid-sweep leaves nothing to clean up.

use std::collections::BTreeSet;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::model::{Instant, Interval};
use crate::normalizer::Availability;

/// A feasible slot for all required participants.
///
/// Its duration always equals the requested interview length.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CandidateSlot {
    pub start: Instant,
    pub end: Instant,
    /// Required participants the slot was matched for.
    pub participant_ids: BTreeSet<String>,
}

impl CandidateSlot {
    pub fn interval(&self) -> Interval {
        Interval {
            start: self.start,
            end: self.end,
        }
    }
}

/// Lazy sweep-line producer of [`CandidateSlot`]s.
#[derive(Debug, Clone)]
pub struct SlotMatcher {
    free: Vec<Vec<Interval>>,
    participant_ids: BTreeSet<String>,
    duration: Duration,
    granularity: Duration,
    anchor: Instant,
    cursors: Vec<usize>,
    /// Next start to try and the end of the overlap it belongs to.
    pending: Option<(Instant, Instant)>,
    exhausted: bool,
}

impl SlotMatcher {
    /// Build a matcher over the required participants' normalized availability.
    ///
    /// Candidate starts are aligned to a grid of `granularity` steps anchored
    /// at `anchor` (normally the horizon start).
    ///
    /// # Errors
    /// - `InvalidRequest` if there are no participants, or `duration` or
    ///   `granularity` is not positive.
    /// - `NoFeasibleSlot` as soon as any participant has no free time at all.
    pub fn new(
        required: &[Availability],
        duration: Duration,
        granularity: Duration,
        anchor: Instant,
    ) -> Result<Self> {
        if required.is_empty() {
            return Err(ScheduleError::InvalidRequest(
                "at least one required participant is needed".to_string(),
            ));
        }
        if duration <= Duration::zero() || granularity <= Duration::zero() {
            return Err(ScheduleError::InvalidRequest(format!(
                "duration ({} min) and granularity ({} min) must be positive",
                duration.num_minutes(),
                granularity.num_minutes()
            )));
        }
        if let Some(empty) = required.iter().find(|a| a.free.is_empty()) {
            return Err(ScheduleError::NoFeasibleSlot {
                reason: format!(
                    "required participant '{}' has no free time in the horizon",
                    empty.participant_id
                ),
            });
        }

        Ok(Self {
            free: required.iter().map(|a| a.free.clone()).collect(),
            participant_ids: required.iter().map(|a| a.participant_id.clone()).collect(),
            duration,
            granularity,
            anchor,
            cursors: vec![0; required.len()],
            pending: None,
            exhausted: false,
        })
    }

    /// Rewind to the start of the horizon. The sequence replays identically.
    pub fn restart(&mut self) {
        self.cursors.iter_mut().for_each(|c| *c = 0);
        self.pending = None;
        self.exhausted = false;
    }

    /// Overlap of the intervals under the current cursors, if non-empty.
    fn current_overlap(&self) -> Option<Interval> {
        let mut current = self.free.iter().zip(&self.cursors).map(|(f, &c)| f[c]);
        let first = current.next()?;
        current.try_fold(first, |acc, next| acc.intersect(&next))
    }

    /// Advance the cursor whose interval ends first (lowest index on ties).
    fn advance(&mut self) {
        let earliest = (0..self.free.len()).min_by_key(|&i| self.free[i][self.cursors[i]].end);

        if let Some(i) = earliest {
            self.cursors[i] += 1;
            if self.cursors[i] >= self.free[i].len() {
                self.exhausted = true;
            }
        }
    }

    /// Smallest grid point at or after `t`, if it is representable.
    fn align(&self, t: Instant) -> Option<Instant> {
        let step = self.granularity.num_seconds().max(1);
        let offset = (t - self.anchor).num_seconds();
        let steps = offset.div_euclid(step) + i64::from(offset.rem_euclid(step) != 0);
        let shift = Duration::try_seconds(steps.checked_mul(step)?)?;
        let aligned = self.anchor.checked_add_signed(shift)?;
        if aligned < t {
            aligned.checked_add_signed(self.granularity)
        } else {
            Some(aligned)
        }
    }
}

impl Iterator for SlotMatcher {
    type Item = CandidateSlot;

    fn next(&mut self) -> Option<CandidateSlot> {
        loop {
            if let Some((start, overlap_end)) = self.pending {
                match start.checked_add_signed(self.duration) {
                    Some(end) if end <= overlap_end => {
                        let next = start
                            .checked_add_signed(self.granularity)
                            .unwrap_or(overlap_end);
                        self.pending = Some((next, overlap_end));
                        return Some(CandidateSlot {
                            start,
                            end,
                            participant_ids: self.participant_ids.clone(),
                        });
                    }
                    _ => {
                        self.pending = None;
                        self.advance();
                    }
                }
            }

            if self.exhausted {
                return None;
            }

            match self.current_overlap() {
                Some(overlap) if overlap.duration() >= self.duration => {
                    match self.align(overlap.start) {
                        Some(start) => self.pending = Some((start, overlap.end)),
                        None => self.advance(),
                    }
                }
                _ => self.advance(),
            }
        }
    }
}

impl std::iter::FusedIterator for SlotMatcher {}
