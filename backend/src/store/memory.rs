use async_trait::async_trait;

use super::{CatalogProvider, ForecastProvider, RosterProvider, ShiftProvider};
use crate::engine::Snapshot;
use crate::error::Result;
use crate::models::{
    common::DateRange, demand::DemandSlot, position::Position, shift::Shift, user::User,
};

/// Serves a fixed, already-materialized snapshot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: Snapshot,
}

impl MemoryStore {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl RosterProvider for MemoryStore {
    async fn get_users(&self) -> Result<Vec<User>> {
        Ok(self.snapshot.users.clone())
    }
}

#[async_trait]
impl CatalogProvider for MemoryStore {
    async fn get_positions(&self) -> Result<Vec<Position>> {
        Ok(self.snapshot.positions.clone())
    }
}

#[async_trait]
impl ForecastProvider for MemoryStore {
    async fn get_demand_slots(&self, range: DateRange) -> Result<Vec<DemandSlot>> {
        let (first, last) = utc_dates(range);
        Ok(self
            .snapshot
            .demand
            .iter()
            .filter(|slot| slot.date >= first && slot.date <= last)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ShiftProvider for MemoryStore {
    async fn get_shifts(&self, range: DateRange) -> Result<Vec<Shift>> {
        Ok(self
            .snapshot
            .shifts
            .iter()
            .filter(|s| range.intersects(s.start_time, s.end_time))
            .cloned()
            .collect())
    }
}

/// First and last UTC calendar dates a range touches, clamped to the
/// supported calendar.
pub(crate) fn utc_dates(range: DateRange) -> (time::Date, time::Date) {
    let utc = time::UtcOffset::UTC;
    (
        range
            .start
            .checked_to_offset(utc)
            .map_or(time::Date::MIN, |t| t.date()),
        range
            .end
            .checked_to_offset(utc)
            .map_or(time::Date::MAX, |t| t.date()),
    )
}
