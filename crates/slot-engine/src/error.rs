//! Error types for slot-engine operations.

use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    /// A local time falls in a DST fold and maps to two instants.
    #[error("Ambiguous local time {local} in {zone}")]
    AmbiguousLocalTime { local: NaiveDateTime, zone: String },

    /// A local time falls in a DST gap and maps to no instant.
    #[error("Nonexistent local time {local} in {zone}")]
    NonexistentLocalTime { local: NaiveDateTime, zone: String },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("No feasible slot: {reason}")]
    NoFeasibleSlot { reason: String },

    #[error("Invalid working-hours rule: {0}")]
    InvalidRule(String),
}

impl ScheduleError {
    /// Whether re-invoking with identical inputs could produce a different outcome.
    ///
    /// The engine is deterministic, so every variant is final for its inputs.
    /// Callers widen the horizon, relax constraints, or fix the data instead.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
