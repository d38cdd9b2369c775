use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An organizational activity a shift can be staffed against
/// (chat support, ticket handling, escalation, breaks, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: Uuid,
    pub name: String,
    /// Activity key shared with the demand forecast, e.g. `chat`.
    pub activity: String,
    #[serde(default)]
    pub required_skills: BTreeSet<String>,
    pub min_duration_minutes: u32,
    pub max_duration_minutes: u32,
    #[serde(default)]
    pub is_stress_position: bool,
}
