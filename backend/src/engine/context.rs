//! Per-call index over a schedule snapshot.
//!
//! Built once per validation call and shared read-only by every validator:
//! lookups by id, each shift's local-day split, per-user start ordering and
//! the `(user, local date)` / `(user, ISO week)` minute buckets.

use std::collections::{BTreeMap, BTreeSet};

use chrono_tz::Tz;
use time::Date;
use uuid::Uuid;

use super::error::{EngineError, Result};
use super::interval::{local_segments, parse_timezone, Interval, IsoWeek, LocalSegment, SlotGrid};
use super::EngineConfig;
use crate::models::{
    demand::DemandSlot,
    position::Position,
    shift::Shift,
    user::{User, MINUTES_PER_DAY},
};

/// Minutes a user is scheduled for within one day or week.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bucket {
    pub minutes: i64,
    pub shift_ids: Vec<Uuid>,
}

impl Bucket {
    fn add(&mut self, shift_id: Uuid, minutes: i64) {
        self.minutes += minutes;
        if !self.shift_ids.contains(&shift_id) {
            self.shift_ids.push(shift_id);
        }
    }
}

#[derive(Debug)]
pub struct ShiftEntry<'a> {
    pub shift: &'a Shift,
    pub user: &'a User,
    pub position: &'a Position,
    pub interval: Interval,
    pub segments: Vec<LocalSegment>,
}

#[derive(Debug)]
pub struct ScheduleContext<'a> {
    pub config: &'a EngineConfig,
    pub grid: SlotGrid,
    pub users: BTreeMap<Uuid, &'a User>,
    pub positions: BTreeMap<Uuid, &'a Position>,
    /// Every shift in view, ordered by `(start_time, id)`.
    pub shifts: Vec<ShiftEntry<'a>>,
    /// Ids of the shifts the caller asked about; the rest are context only.
    pub evaluated: BTreeSet<Uuid>,
    /// Indices into `shifts` per user, in start order.
    pub by_user: BTreeMap<Uuid, Vec<usize>>,
    pub daily: BTreeMap<(Uuid, Date), Bucket>,
    pub weekly: BTreeMap<(Uuid, IsoWeek), Bucket>,
    /// Demand slots in scope, ordered by `(date, slot_index, activity)`.
    pub demand: Vec<&'a DemandSlot>,
}

/// How shifts outside the evaluated set are treated when they fail checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextShifts {
    /// Supplied by the caller: any defect fails the call.
    Strict,
    /// Loaded from storage: defective rows are logged and left out.
    Lenient,
}

impl<'a> ScheduleContext<'a> {
    pub fn build(
        config: &'a EngineConfig,
        users: &'a [User],
        positions: &'a [Position],
        shifts: &'a [Shift],
        evaluated: BTreeSet<Uuid>,
        context: ContextShifts,
        demand: Vec<&'a DemandSlot>,
    ) -> Result<Self> {
        let grid = SlotGrid::new(config.slot_minutes)?;
        let users = index_users(users)?;
        let positions = index_positions(positions)?;

        let mut seen = BTreeSet::new();
        let mut zones: BTreeMap<Uuid, Tz> = BTreeMap::new();
        let mut entries = Vec::with_capacity(shifts.len());

        for shift in shifts {
            let strict = context == ContextShifts::Strict || evaluated.contains(&shift.id);
            let resolved = if seen.insert(shift.id) {
                resolve_shift(shift, &users, &positions, &mut zones)
            } else {
                Err(EngineError::Input(format!("duplicate shift id {}", shift.id)))
            };
            match resolved {
                Ok(entry) => entries.push(entry),
                Err(e) if strict => return Err(e),
                Err(e) => {
                    tracing::warn!(shift_id = %shift.id, error = %e, "skipping stored shift");
                }
            }
        }

        let resolved: BTreeSet<Uuid> = entries.iter().map(|e| e.shift.id).collect();
        if let Some(missing) = evaluated.iter().find(|id| !resolved.contains(*id)) {
            return Err(EngineError::Computation(format!(
                "evaluated shift {missing} is not part of the snapshot"
            )));
        }

        entries.sort_by_key(|e| (e.shift.start_time, e.shift.id));

        let mut by_user: BTreeMap<Uuid, Vec<usize>> = BTreeMap::new();
        let mut daily: BTreeMap<(Uuid, Date), Bucket> = BTreeMap::new();
        let mut weekly: BTreeMap<(Uuid, IsoWeek), Bucket> = BTreeMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            let user_id = entry.user.id;
            by_user.entry(user_id).or_default().push(idx);
            for seg in &entry.segments {
                daily
                    .entry((user_id, seg.date))
                    .or_default()
                    .add(entry.shift.id, seg.minutes);
                weekly
                    .entry((user_id, IsoWeek::of(seg.date)))
                    .or_default()
                    .add(entry.shift.id, seg.minutes);
            }
        }

        let demand = index_demand(demand, &grid)?;

        Ok(Self {
            config,
            grid,
            users,
            positions,
            shifts: entries,
            evaluated,
            by_user,
            daily,
            weekly,
            demand,
        })
    }

    pub fn is_evaluated(&self, shift_id: Uuid) -> bool {
        self.evaluated.contains(&shift_id)
    }

    /// Evaluated shifts in `(start_time, id)` order.
    pub fn evaluated_shifts(&self) -> impl Iterator<Item = &ShiftEntry<'a>> {
        self.shifts.iter().filter(|e| self.is_evaluated(e.shift.id))
    }

    /// All shifts of `user_id` in start order.
    pub fn user_shifts(&self, user_id: Uuid) -> impl Iterator<Item = &ShiftEntry<'a>> {
        self.by_user
            .get(&user_id)
            .into_iter()
            .flatten()
            .map(|&idx| &self.shifts[idx])
    }
}

/// Checks one shift and its references, splitting it into local days.
fn resolve_shift<'a>(
    shift: &'a Shift,
    users: &BTreeMap<Uuid, &'a User>,
    positions: &BTreeMap<Uuid, &'a Position>,
    zones: &mut BTreeMap<Uuid, Tz>,
) -> Result<ShiftEntry<'a>> {
    let interval = Interval::new(shift.start_time, shift.end_time).map_err(|_| {
        EngineError::Input(format!("shift {} must start before it ends", shift.id))
    })?;
    let user = *users.get(&shift.user_id).ok_or_else(|| {
        EngineError::Reference(format!(
            "shift {} references unknown user {}",
            shift.id, shift.user_id
        ))
    })?;
    let position = *positions.get(&shift.position_id).ok_or_else(|| {
        EngineError::Reference(format!(
            "shift {} references unknown position {}",
            shift.id, shift.position_id
        ))
    })?;
    check_position(position)?;

    let tz = match zones.get(&user.id) {
        Some(tz) => *tz,
        None => {
            let tz = check_user(user)?;
            zones.insert(user.id, tz);
            tz
        }
    };

    Ok(ShiftEntry {
        shift,
        user,
        position,
        interval,
        segments: local_segments(&interval, tz)?,
    })
}

fn index_users(users: &[User]) -> Result<BTreeMap<Uuid, &User>> {
    let mut map = BTreeMap::new();
    for user in users {
        if map.insert(user.id, user).is_some() {
            return Err(EngineError::Input(format!("duplicate user id {}", user.id)));
        }
    }
    Ok(map)
}

fn index_positions(positions: &[Position]) -> Result<BTreeMap<Uuid, &Position>> {
    let mut map = BTreeMap::new();
    for position in positions {
        if map.insert(position.id, position).is_some() {
            return Err(EngineError::Input(format!(
                "duplicate position id {}",
                position.id
            )));
        }
    }
    Ok(map)
}

fn index_demand<'a>(mut demand: Vec<&'a DemandSlot>, grid: &SlotGrid) -> Result<Vec<&'a DemandSlot>> {
    demand.sort_by(|a, b| {
        (a.date, a.slot_index, &a.activity).cmp(&(b.date, b.slot_index, &b.activity))
    });
    for slot in &demand {
        if slot.slot_index >= grid.slots_per_day() {
            return Err(EngineError::Input(format!(
                "demand slot index {} on {} exceeds {} slots per day",
                slot.slot_index,
                slot.date,
                grid.slots_per_day()
            )));
        }
    }
    if let Some(pair) = demand.windows(2).find(|w| {
        (w[0].date, w[0].slot_index, &w[0].activity) == (w[1].date, w[1].slot_index, &w[1].activity)
    }) {
        return Err(EngineError::Input(format!(
            "duplicate demand slot {} #{} for '{}'",
            pair[0].date, pair[0].slot_index, pair[0].activity
        )));
    }
    Ok(demand)
}

/// Checks a user's work-hour rules and resolves their timezone.
pub fn check_user(user: &User) -> Result<Tz> {
    let mut days = BTreeSet::new();
    for rule in &user.work_hours {
        if rule.day_of_week > 6 {
            return Err(EngineError::Computation(format!(
                "user {} has a work-hour rule for day {}",
                user.id, rule.day_of_week
            )));
        }
        if !days.insert(rule.day_of_week) {
            return Err(EngineError::Computation(format!(
                "user {} has more than one work-hour rule for day {}",
                user.id, rule.day_of_week
            )));
        }
        if rule.is_working && (rule.start_minute >= rule.end_minute || rule.end_minute > MINUTES_PER_DAY)
        {
            return Err(EngineError::Computation(format!(
                "user {} has an invalid working window {}-{} on day {}",
                user.id, rule.start_minute, rule.end_minute, rule.day_of_week
            )));
        }
    }
    parse_timezone(&user.timezone)
}

pub fn check_position(position: &Position) -> Result<()> {
    if position.min_duration_minutes > position.max_duration_minutes {
        return Err(EngineError::Computation(format!(
            "position {} has min duration {} above max duration {}",
            position.id, position.min_duration_minutes, position.max_duration_minutes
        )));
    }
    Ok(())
}
