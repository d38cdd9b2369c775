//! Collaborator interfaces the engine's inputs are fetched through.
//!
//! The engine itself never calls these; the HTTP layer gathers a
//! [`Snapshot`](crate::engine::Snapshot) from them before each call.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    common::DateRange, demand::DemandSlot, position::Position, shift::Shift, user::User,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait RosterProvider: Send + Sync {
    async fn get_users(&self) -> Result<Vec<User>>;
}

#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn get_positions(&self) -> Result<Vec<Position>>;
}

#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Demand slots on UTC dates touched by `range`; the engine narrows them
    /// to the exact slot grid.
    async fn get_demand_slots(&self, range: DateRange) -> Result<Vec<DemandSlot>>;
}

#[async_trait]
pub trait ShiftProvider: Send + Sync {
    /// Stored shifts of active users intersecting `range`.
    async fn get_shifts(&self, range: DateRange) -> Result<Vec<Shift>>;
}

/// A single backend serving all four collaborator roles.
pub trait ScheduleStore: RosterProvider + CatalogProvider + ForecastProvider + ShiftProvider {}

impl<T> ScheduleStore for T where T: RosterProvider + CatalogProvider + ForecastProvider + ShiftProvider {}
