//! Builders shared by the engine's unit tests.

use std::collections::BTreeSet;

use time::OffsetDateTime;
use uuid::Uuid;

pub use super::Snapshot;
use super::context::{ContextShifts, ScheduleContext};
use super::violation::ViolationData;
use super::EngineConfig;
use crate::models::{
    position::Position,
    shift::Shift,
    user::{User, WorkHourRule},
};

pub const MONDAY: u8 = 1;
pub const TUESDAY: u8 = 2;

pub fn id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

/// A UTC agent with no work hours, no skills and limits that never bind.
pub fn agent(n: u128) -> User {
    User {
        id: id(n),
        name: format!("Agent {n}"),
        timezone: "UTC".into(),
        work_hours: Vec::new(),
        skills: BTreeSet::new(),
        daily_max_minutes: 24 * 60,
        weekly_max_minutes: 7 * 24 * 60,
    }
}

pub trait UserFixture {
    fn with_rule(self, day_of_week: u8, start_minute: u16, end_minute: u16) -> Self;
    fn with_skills(self, skills: &[&str]) -> Self;
    fn with_limits(self, daily: u32, weekly: u32) -> Self;
    fn in_timezone(self, tz: &str) -> Self;
}

impl UserFixture for User {
    fn with_rule(mut self, day_of_week: u8, start_minute: u16, end_minute: u16) -> Self {
        self.work_hours.push(WorkHourRule {
            day_of_week,
            start_minute,
            end_minute,
            is_working: true,
        });
        self
    }

    fn with_skills(mut self, skills: &[&str]) -> Self {
        self.skills.extend(skills.iter().map(|s| s.to_string()));
        self
    }

    fn with_limits(mut self, daily: u32, weekly: u32) -> Self {
        self.daily_max_minutes = daily;
        self.weekly_max_minutes = weekly;
        self
    }

    fn in_timezone(mut self, tz: &str) -> Self {
        self.timezone = tz.into();
        self
    }
}

/// A non-stress position accepting any duration up to a full day.
pub fn position(n: u128, activity: &str) -> Position {
    Position {
        id: id(n),
        name: activity.to_uppercase(),
        activity: activity.into(),
        required_skills: BTreeSet::new(),
        min_duration_minutes: 1,
        max_duration_minutes: 24 * 60,
        is_stress_position: false,
    }
}

pub trait PositionFixture {
    fn requiring(self, skills: &[&str]) -> Self;
    fn with_duration(self, min: u32, max: u32) -> Self;
    fn stressful(self) -> Self;
}

impl PositionFixture for Position {
    fn requiring(mut self, skills: &[&str]) -> Self {
        self.required_skills.extend(skills.iter().map(|s| s.to_string()));
        self
    }

    fn with_duration(mut self, min: u32, max: u32) -> Self {
        self.min_duration_minutes = min;
        self.max_duration_minutes = max;
        self
    }

    fn stressful(mut self) -> Self {
        self.is_stress_position = true;
        self
    }
}

pub fn shift(
    n: u128,
    user: &User,
    position: &Position,
    start_time: OffsetDateTime,
    end_time: OffsetDateTime,
) -> Shift {
    Shift {
        id: id(n),
        user_id: user.id,
        position_id: position.id,
        start_time,
        end_time,
    }
}

impl Snapshot {
    /// Builds a context with every shift and demand slot in scope and runs
    /// a single validator over it.
    pub fn run<F>(&self, validator: F) -> Vec<ViolationData>
    where
        F: Fn(&ScheduleContext<'_>) -> Vec<ViolationData>,
    {
        let config = EngineConfig::default();
        let ctx = ScheduleContext::build(
            &config,
            &self.users,
            &self.positions,
            &self.shifts,
            self.shifts.iter().map(|s| s.id).collect(),
            ContextShifts::Strict,
            self.demand.iter().collect(),
        )
        .expect("fixture snapshot should build");
        validator(&ctx)
    }
}
