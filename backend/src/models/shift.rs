use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use crate::models::common::DateRange;

/// A scheduled (or proposed) assignment of one user to one position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: Uuid,
    pub user_id: Uuid,
    pub position_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_time: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ValidateScheduleRequest {
    #[validate(length(min = 1, message = "shifts must not be empty"))]
    pub shifts: Vec<Shift>,
    pub date_range: DateRange,
}

/// Candidate shift in a single-shift validation request. The owner and
/// position may be repeated here but are authoritative at the top level.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftDraft {
    pub id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub position_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_time: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateShiftRequest {
    pub shift: ShiftDraft,
    pub user_id: Uuid,
    pub position_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableUsersQuery {
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end: OffsetDateTime,
    pub position_id: Uuid,
}
