//! Read-only Postgres adapter for the collaborator interfaces.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::memory::utc_dates;
use super::{CatalogProvider, ForecastProvider, RosterProvider, ShiftProvider};
use crate::error::{AppError, Result};
use crate::models::{
    common::DateRange,
    demand::DemandSlot,
    position::Position,
    shift::Shift,
    user::{User, WorkHourRule},
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    timezone: String,
    daily_max_minutes: i32,
    weekly_max_minutes: i32,
}

#[derive(sqlx::FromRow)]
struct WorkHourRow {
    user_id: Uuid,
    day_of_week: i16,
    start_minute: i16,
    end_minute: i16,
    is_working: bool,
}

#[derive(sqlx::FromRow)]
struct SkillRow {
    user_id: Uuid,
    skill: String,
}

#[derive(sqlx::FromRow)]
struct PositionRow {
    id: Uuid,
    name: String,
    activity: String,
    required_skills: Vec<String>,
    min_duration_minutes: i32,
    max_duration_minutes: i32,
    is_stress_position: bool,
}

#[derive(sqlx::FromRow)]
struct ShiftRow {
    id: Uuid,
    user_id: Uuid,
    position_id: Uuid,
    start_time: OffsetDateTime,
    end_time: OffsetDateTime,
}

#[derive(sqlx::FromRow)]
struct DemandRow {
    slot_date: time::Date,
    slot_index: i32,
    activity: String,
    required_agents: i32,
}

/// Rejects negative database values instead of wrapping them.
fn non_negative<T, S>(value: S, column: &str) -> Result<T>
where
    S: Copy + std::fmt::Display,
    T: TryFrom<S>,
{
    T::try_from(value).map_err(|_| {
        AppError::Internal(anyhow::anyhow!("column {column} holds out-of-range value {value}"))
    })
}

#[async_trait]
impl RosterProvider for PgStore {
    async fn get_users(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, timezone, daily_max_minutes, weekly_max_minutes
            FROM users
            WHERE is_active = true
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let rules = sqlx::query_as::<_, WorkHourRow>(
            r#"
            SELECT user_id, day_of_week, start_minute, end_minute, is_working
            FROM work_hour_rules
            ORDER BY user_id, day_of_week
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let skills = sqlx::query_as::<_, SkillRow>(
            "SELECT user_id, skill FROM user_skills ORDER BY user_id, skill",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut rules_by_user: HashMap<Uuid, Vec<WorkHourRule>> = HashMap::new();
        for r in rules {
            rules_by_user.entry(r.user_id).or_default().push(WorkHourRule {
                day_of_week: non_negative(r.day_of_week, "work_hour_rules.day_of_week")?,
                start_minute: non_negative(r.start_minute, "work_hour_rules.start_minute")?,
                end_minute: non_negative(r.end_minute, "work_hour_rules.end_minute")?,
                is_working: r.is_working,
            });
        }

        let mut skills_by_user: HashMap<Uuid, BTreeSet<String>> = HashMap::new();
        for s in skills {
            skills_by_user.entry(s.user_id).or_default().insert(s.skill);
        }

        users
            .into_iter()
            .map(|u| -> Result<User> {
                Ok(User {
                    work_hours: rules_by_user.remove(&u.id).unwrap_or_default(),
                    skills: skills_by_user.remove(&u.id).unwrap_or_default(),
                    daily_max_minutes: non_negative(u.daily_max_minutes, "users.daily_max_minutes")?,
                    weekly_max_minutes: non_negative(u.weekly_max_minutes, "users.weekly_max_minutes")?,
                    id: u.id,
                    name: u.name,
                    timezone: u.timezone,
                })
            })
            .collect()
    }
}

#[async_trait]
impl CatalogProvider for PgStore {
    async fn get_positions(&self) -> Result<Vec<Position>> {
        let rows = sqlx::query_as::<_, PositionRow>(
            r#"
            SELECT id, name, activity, required_skills,
                   min_duration_minutes, max_duration_minutes, is_stress_position
            FROM positions
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|p| -> Result<Position> {
                Ok(Position {
                    id: p.id,
                    name: p.name,
                    activity: p.activity,
                    required_skills: p.required_skills.into_iter().collect(),
                    min_duration_minutes: non_negative(p.min_duration_minutes, "positions.min_duration_minutes")?,
                    max_duration_minutes: non_negative(p.max_duration_minutes, "positions.max_duration_minutes")?,
                    is_stress_position: p.is_stress_position,
                })
            })
            .collect()
    }
}

#[async_trait]
impl ForecastProvider for PgStore {
    async fn get_demand_slots(&self, range: DateRange) -> Result<Vec<DemandSlot>> {
        let (first, last) = utc_dates(range);
        let rows = sqlx::query_as::<_, DemandRow>(
            r#"
            SELECT slot_date, slot_index, activity, required_agents
            FROM demand_slots
            WHERE slot_date BETWEEN $1 AND $2
            ORDER BY slot_date, slot_index, activity
            "#,
        )
        .bind(first)
        .bind(last)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|d| -> Result<DemandSlot> {
                Ok(DemandSlot {
                    date: d.slot_date,
                    slot_index: non_negative(d.slot_index, "demand_slots.slot_index")?,
                    activity: d.activity,
                    required_agents: non_negative(d.required_agents, "demand_slots.required_agents")?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl ShiftProvider for PgStore {
    async fn get_shifts(&self, range: DateRange) -> Result<Vec<Shift>> {
        let rows = sqlx::query_as::<_, ShiftRow>(
            r#"
            SELECT s.id, s.user_id, s.position_id, s.start_time, s.end_time
            FROM shifts s
            JOIN users u ON u.id = s.user_id
            WHERE u.is_active = true
              AND s.start_time < $2 AND s.end_time > $1
            ORDER BY s.start_time, s.id
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Shift {
                id: r.id,
                user_id: r.user_id,
                position_id: r.position_id,
                start_time: r.start_time,
                end_time: r.end_time,
            })
            .collect())
    }
}
