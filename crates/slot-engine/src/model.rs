//! Input data model for a scheduling run.
//!
//! A [`SchedulingRequest`] is the unit of work: it carries every participant,
//! their raw busy data and constraints, the horizon, and the scoring
//! configuration. Nothing here is read from process state; two identical
//! requests always produce identical results.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// An absolute, timezone-independent point in time.
pub type Instant = DateTime<Utc>;

/// Default step between candidate start times.
pub const DEFAULT_GRANULARITY_MINUTES: i64 = 15;

/// A half-open `[start, end)` span between two instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: Instant,
    pub end: Instant,
}

impl Interval {
    /// Build an interval, returning `None` when it would be empty or reversed.
    pub fn new(start: Instant, end: Instant) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn duration_minutes(&self) -> i64 {
        self.duration().num_minutes()
    }

    /// Adjacent intervals (one ends exactly where the other starts) do not overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn intersect(&self, other: &Interval) -> Option<Interval> {
        Interval::new(self.start.max(other.start), self.end.min(other.end))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

/// A busy span as reported by a calendar source, in that source's wall time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Busy data for one participant from one calendar source.
///
/// Provider-specific parsing happens before this point: every connector hands
/// the engine the same shape regardless of which calendar it talks to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusySource {
    /// Opaque identifier for the source (e.g., "work-google", "personal-icloud").
    pub source_id: String,
    /// IANA timezone the `busy` wall times are expressed in.
    pub timezone: String,
    pub busy: Vec<LocalInterval>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Candidate,
    Interviewer,
    Recruiter,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Candidate => "candidate",
            Role::Interviewer => "interviewer",
            Role::Recruiter => "recruiter",
        };
        f.write_str(name)
    }
}

/// A recurring daily availability window in the participant's home timezone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
    /// Weekdays the window applies to. Defaults to every day.
    #[serde(default = "every_day")]
    pub days: Vec<Weekday>,
}

fn every_day() -> Vec<Weekday> {
    vec![
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ]
}

/// A scheduling rule attached to a participant.
///
/// `BlackoutWindow`, `MinNotice` and `MaxPerDay` are hard: a violation
/// disqualifies the slot. `PreferredWindow` and `BufferAround` are soft: a
/// violation adds a penalty to the slot's score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Constraint {
    /// No interview may overlap `[start, end)`.
    BlackoutWindow { start: Instant, end: Instant },
    /// The slot must start at least `minutes` after the request's reference time.
    MinNotice { minutes: i64 },
    /// The slot should lie inside this local daily window.
    PreferredWindow {
        start: NaiveTime,
        end: NaiveTime,
        weight: f64,
    },
    /// At most `count` interviews may start on the same local day.
    MaxPerDay { count: u32 },
    /// The slot should keep `minutes` of clearance from other busy time.
    BufferAround { minutes: i64, weight: f64 },
}

/// Discriminant of [`Constraint`], used in explainability output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    BlackoutWindow,
    MinNotice,
    PreferredWindow,
    MaxPerDay,
    BufferAround,
}

impl Constraint {
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Constraint::BlackoutWindow { .. } => ConstraintKind::BlackoutWindow,
            Constraint::MinNotice { .. } => ConstraintKind::MinNotice,
            Constraint::PreferredWindow { .. } => ConstraintKind::PreferredWindow,
            Constraint::MaxPerDay { .. } => ConstraintKind::MaxPerDay,
            Constraint::BufferAround { .. } => ConstraintKind::BufferAround,
        }
    }

    pub fn is_hard(&self) -> bool {
        matches!(
            self,
            Constraint::BlackoutWindow { .. }
                | Constraint::MinNotice { .. }
                | Constraint::MaxPerDay { .. }
        )
    }
}

/// Someone whose calendar gates or influences the interview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub role: Role,
    /// Home timezone (IANA), used for working hours and local-time constraints.
    pub timezone: String,
    /// `None` means available across the whole horizon.
    #[serde(default)]
    pub working_hours: Option<WorkingHours>,
    #[serde(default)]
    pub busy_sources: Vec<BusySource>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    /// Interviews already booked for this participant, counted by `MaxPerDay`.
    #[serde(default)]
    pub scheduled_interviews: Vec<Interval>,
}

/// Per-role score multipliers. All three are required configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoleMultipliers {
    pub candidate: f64,
    pub interviewer: f64,
    pub recruiter: f64,
}

impl RoleMultipliers {
    pub fn for_role(&self, role: Role) -> f64 {
        match role {
            Role::Candidate => self.candidate,
            Role::Interviewer => self.interviewer,
            Role::Recruiter => self.recruiter,
        }
    }
}

/// Scoring configuration. Every field must be supplied explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Upper bound applied to every soft-constraint weight.
    pub max_weight: f64,
    pub role_multipliers: RoleMultipliers,
    /// Penalty for each optional participant who cannot attend a slot.
    pub optional_absence_penalty: f64,
}

fn default_granularity() -> i64 {
    DEFAULT_GRANULARITY_MINUTES
}

/// One matching run. Immutable once submitted; re-solving means a new request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingRequest {
    /// Participants whose availability gates feasibility.
    pub required: Vec<Participant>,
    /// Participants who improve a slot's score but never gate it.
    #[serde(default)]
    pub optional: Vec<Participant>,
    pub duration_minutes: i64,
    pub horizon_start: Instant,
    pub horizon_end: Instant,
    /// Maximum number of proposals to return.
    pub proposal_count: usize,
    #[serde(default = "default_granularity")]
    pub granularity_minutes: i64,
    /// The "now" anchor for `MinNotice`.
    pub reference_time: Instant,
    pub scoring: ScoringConfig,
}

impl SchedulingRequest {
    /// The interview length, or `None` if `duration_minutes` is out of range.
    pub fn duration(&self) -> Option<Duration> {
        Duration::try_minutes(self.duration_minutes)
    }

    /// The start-time step, or `None` if `granularity_minutes` is out of range.
    pub fn granularity(&self) -> Option<Duration> {
        Duration::try_minutes(self.granularity_minutes)
    }

    /// The search horizon, or `None` if it is empty or reversed.
    pub fn horizon(&self) -> Option<Interval> {
        Interval::new(self.horizon_start, self.horizon_end)
    }

    /// All participants, required first, each paired with whether it is required.
    pub fn participants(&self) -> impl Iterator<Item = (&Participant, bool)> {
        self.required
            .iter()
            .map(|p| (p, true))
            .chain(self.optional.iter().map(|p| (p, false)))
    }
}
