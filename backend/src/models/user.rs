use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minutes in one local day; the exclusive upper bound of a work-hour window.
pub const MINUTES_PER_DAY: u16 = 1440;

/// One weekday's working window, in minutes since local midnight.
///
/// `day_of_week` runs 0 (Sunday) through 6 (Saturday).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkHourRule {
    pub day_of_week: u8,
    pub start_minute: u16,
    pub end_minute: u16,
    pub is_working: bool,
}

impl WorkHourRule {
    /// Whether `[start, end)` lies fully inside this rule's working window.
    pub fn contains(&self, start_minute: u16, end_minute: u16) -> bool {
        self.is_working && start_minute >= self.start_minute && end_minute <= self.end_minute
    }
}

/// A schedulable agent as supplied by the roster provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// IANA timezone name, e.g. `Europe/Berlin`.
    pub timezone: String,
    #[serde(default)]
    pub work_hours: Vec<WorkHourRule>,
    #[serde(default)]
    pub skills: BTreeSet<String>,
    pub daily_max_minutes: u32,
    pub weekly_max_minutes: u32,
}

impl User {
    pub fn rule_for(&self, day_of_week: u8) -> Option<&WorkHourRule> {
        self.work_hours.iter().find(|r| r.day_of_week == day_of_week)
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// Subset returned by the eligibility endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableUsersResponse {
    pub available_users: Vec<UserSummary>,
}
