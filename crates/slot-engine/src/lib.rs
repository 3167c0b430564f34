//! # slot-engine
//!
//! Deterministic interview slot matching and proposal ranking.
//!
//! Given each participant's busy data (from any number of calendar sources, in
//! any timezones), working hours, and constraints, the engine computes a
//! ranked list of conflict-free interview slots. It performs no I/O and holds
//! no state between calls: OAuth, calendar fetching, booking, and
//! notification belong to the caller.
//!
//! ## Modules
//!
//! - [`timezone`] — Instants ↔ wall-clock time, rejecting DST-ambiguous input
//! - [`model`] — Request, participant, and constraint types
//! - [`working_hours`] — Recurring working-hours envelope → UTC windows
//! - [`normalizer`] — Raw busy data → sorted, non-overlapping free intervals
//! - [`constraints`] — Hard/soft constraint evaluation for one slot
//! - [`matcher`] — Lazy sweep-line intersection producing candidate slots
//! - [`ranker`] — Scoring and deterministic ordering of proposals
//! - [`conflict`] — Commit-time revalidation against fresh availability
//! - [`engine`] — Request validation and the `schedule` entry point
//! - [`error`] — Error types

pub mod conflict;
pub mod constraints;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalizer;
pub mod ranker;
pub mod timezone;
pub mod working_hours;

pub use conflict::{revalidate, ConflictReason, Revalidation};
pub use constraints::{evaluate, Evaluation};
pub use engine::{match_slots, revalidate_request, schedule};
pub use error::ScheduleError;
pub use matcher::{CandidateSlot, SlotMatcher};
pub use model::{Constraint, Instant, Interval, Participant, Role, SchedulingRequest};
pub use normalizer::{normalize, Availability};
pub use ranker::{rank, Proposal};
pub use timezone::{to_instant, to_local};
