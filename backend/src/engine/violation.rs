//! Typed rule breaches and the result envelope returned to callers.

use serde::Serialize;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::interval::IsoWeek;

/// The six rule families, in the order the engine reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationKind {
    Availability,
    Skills,
    TimeLimits,
    ActivityRules,
    Conflicts,
    Coverage,
}

/// Why a local sub-interval of a shift is outside the user's availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum AvailabilityReason {
    /// The user has no work-hour rules at all.
    NoWorkHours,
    NoRuleForDay,
    DayOff,
    #[serde(rename_all = "camelCase")]
    OutsideWorkingHours {
        window_start_minute: u16,
        window_end_minute: u16,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityBreach {
    pub local_date: Date,
    pub day_of_week: u8,
    pub start_minute: u16,
    pub end_minute: u16,
    #[serde(flatten)]
    pub reason: AvailabilityReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum LimitPeriod {
    Daily {
        date: Date,
    },
    #[serde(rename_all = "camelCase")]
    Weekly {
        iso_year: i32,
        iso_week: u8,
    },
}

impl LimitPeriod {
    pub fn weekly(week: IsoWeek) -> Self {
        LimitPeriod::Weekly {
            iso_year: week.year,
            iso_week: week.week,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ActivityRule {
    #[serde(rename_all = "camelCase")]
    TooShort {
        duration_minutes: i64,
        min_duration_minutes: u32,
    },
    #[serde(rename_all = "camelCase")]
    TooLong {
        duration_minutes: i64,
        max_duration_minutes: u32,
    },
    #[serde(rename_all = "camelCase")]
    InsufficientRest {
        previous_shift_id: Uuid,
        gap_minutes: i64,
        required_minutes: u32,
    },
}

/// Structured evidence, one variant per rule family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ViolationData {
    #[serde(rename_all = "camelCase")]
    Availability {
        shift_id: Uuid,
        user_id: Uuid,
        breaches: Vec<AvailabilityBreach>,
    },
    #[serde(rename_all = "camelCase")]
    Skills {
        shift_id: Uuid,
        user_id: Uuid,
        position_id: Uuid,
        missing_skills: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    TimeLimits {
        user_id: Uuid,
        period: LimitPeriod,
        scheduled_minutes: i64,
        limit_minutes: u32,
        overage_minutes: i64,
        shift_ids: Vec<Uuid>,
    },
    #[serde(rename_all = "camelCase")]
    ActivityRules {
        shift_id: Uuid,
        user_id: Uuid,
        position_id: Uuid,
        #[serde(flatten)]
        rule: ActivityRule,
    },
    #[serde(rename_all = "camelCase")]
    Conflicts {
        user_id: Uuid,
        shift_ids: [Uuid; 2],
        overlap_minutes: i64,
    },
    #[serde(rename_all = "camelCase")]
    Coverage {
        date: Date,
        slot_index: u32,
        #[serde(with = "time::serde::rfc3339")]
        slot_start: OffsetDateTime,
        activity: String,
        required_agents: u32,
        scheduled_agents: u32,
        shortfall: u32,
    },
}

impl ViolationData {
    pub fn kind(&self) -> ViolationKind {
        match self {
            ViolationData::Availability { .. } => ViolationKind::Availability,
            ViolationData::Skills { .. } => ViolationKind::Skills,
            ViolationData::TimeLimits { .. } => ViolationKind::TimeLimits,
            ViolationData::ActivityRules { .. } => ViolationKind::ActivityRules,
            ViolationData::Conflicts { .. } => ViolationKind::Conflicts,
            ViolationData::Coverage { .. } => ViolationKind::Coverage,
        }
    }

    /// Default human-readable description of the breach.
    pub fn describe(&self) -> String {
        match self {
            ViolationData::Availability {
                shift_id, breaches, ..
            } => {
                let days: Vec<String> = breaches.iter().map(|b| b.local_date.to_string()).collect();
                format!(
                    "Shift {shift_id} falls outside the user's working hours on {}",
                    days.join(", ")
                )
            }
            ViolationData::Skills {
                shift_id,
                missing_skills,
                ..
            } => format!(
                "Shift {shift_id} is missing required skills: {}",
                missing_skills.join(", ")
            ),
            ViolationData::TimeLimits {
                user_id,
                period,
                scheduled_minutes,
                limit_minutes,
                overage_minutes,
                ..
            } => {
                let period = match period {
                    LimitPeriod::Daily { date } => format!("daily limit on {date}"),
                    LimitPeriod::Weekly { iso_year, iso_week } => {
                        format!("weekly limit in {iso_year}-W{iso_week:02}")
                    }
                };
                format!(
                    "User {user_id} is scheduled {scheduled_minutes} min, exceeding the {period} \
                     of {limit_minutes} min by {overage_minutes} min"
                )
            }
            ViolationData::ActivityRules { shift_id, rule, .. } => match rule {
                ActivityRule::TooShort {
                    duration_minutes,
                    min_duration_minutes,
                } => format!(
                    "Shift {shift_id} is too short: {duration_minutes} min, minimum is {min_duration_minutes} min"
                ),
                ActivityRule::TooLong {
                    duration_minutes,
                    max_duration_minutes,
                } => format!(
                    "Shift {shift_id} is too long: {duration_minutes} min, maximum is {max_duration_minutes} min"
                ),
                ActivityRule::InsufficientRest {
                    previous_shift_id,
                    gap_minutes,
                    required_minutes,
                } => format!(
                    "Shift {shift_id} starts {gap_minutes} min after stress shift {previous_shift_id}; \
                     at least {required_minutes} min of rest is required"
                ),
            },
            ViolationData::Conflicts {
                user_id,
                shift_ids,
                overlap_minutes,
            } => format!(
                "Shifts {} and {} for user {user_id} overlap by {overlap_minutes} min",
                shift_ids[0], shift_ids[1]
            ),
            ViolationData::Coverage {
                activity,
                slot_start,
                required_agents,
                scheduled_agents,
                shortfall,
                ..
            } => format!(
                "Slot starting {slot_start} for '{activity}' has {scheduled_agents} of \
                 {required_agents} required agents (short by {shortfall})"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    #[serde(rename = "type")]
    pub kind: ViolationKind,
    pub message: String,
    pub data: ViolationData,
    /// When the check ran; diagnostic only.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl Violation {
    pub fn new(data: ViolationData, timestamp: OffsetDateTime) -> Self {
        Self {
            kind: data.kind(),
            message: data.describe(),
            data,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub total_shifts: usize,
    pub total_users: usize,
    pub total_positions: usize,
    pub coverage_score: f64,
    pub skill_match_score: f64,
    pub availability_score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: ViolationKind,
    pub message: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub ok: bool,
    pub violations: Vec<Violation>,
    pub metrics: Metrics,
    pub suggestions: Vec<Suggestion>,
}

impl ValidationResult {
    pub fn count(&self, kind: ViolationKind) -> usize {
        self.violations.iter().filter(|v| v.kind == kind).count()
    }
}
