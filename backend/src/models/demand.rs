use serde::{Deserialize, Serialize};

/// Forecast demand for one `(date, slot_index, activity)` cell of the UTC slot grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandSlot {
    /// UTC calendar day the slot belongs to.
    pub date: time::Date,
    /// Zero-based slot number within the day (`slot_minutes` wide).
    pub slot_index: u32,
    pub activity: String,
    pub required_agents: u32,
}
