//! Shift scheduling constraint validation engine.
//!
//! [`ConstraintEngine`] takes a read-only [`Snapshot`] of users, positions,
//! shifts and forecast demand and certifies it against six rule families,
//! returning typed violations, normalized scores and remediation hints.
//! It owns no state between calls and performs no I/O: the same inputs always
//! produce the same [`ValidationResult`].

pub mod context;
pub mod eligibility;
pub mod error;
pub mod interval;
pub mod metrics;
pub mod suggestions;
pub mod validators;
pub mod violation;

#[cfg(test)]
pub(crate) mod fixtures;

use std::collections::BTreeSet;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::models::{
    common::DateRange, demand::DemandSlot, position::Position, shift::Shift, user::User,
};
use context::{ContextShifts, ScheduleContext};
use interval::{Interval, SlotGrid};
use metrics::Totals;
use validators::{activity_rules, availability, conflicts, coverage, skills, time_limits};

pub use error::{EngineError, Result};
pub use violation::{Metrics, Suggestion, ValidationResult, Violation, ViolationData, ViolationKind};

pub const DEFAULT_STRESS_COOLDOWN_MINUTES: u32 = 30;
pub const DEFAULT_SLOT_MINUTES: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Minimum rest between two stress-position shifts of the same user.
    pub stress_cooldown_minutes: u32,
    /// Width of the demand forecast grid; divides 1440.
    pub slot_minutes: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stress_cooldown_minutes: DEFAULT_STRESS_COOLDOWN_MINUTES,
            slot_minutes: DEFAULT_SLOT_MINUTES,
        }
    }
}

/// Everything one validation call sees.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub users: Vec<User>,
    pub positions: Vec<Position>,
    pub shifts: Vec<Shift>,
    pub demand: Vec<DemandSlot>,
}

impl Snapshot {
    pub fn new(users: Vec<User>, positions: Vec<Position>, shifts: Vec<Shift>) -> Self {
        Self {
            users,
            positions,
            shifts,
            demand: Vec::new(),
        }
    }

    pub fn with_demand(mut self, demand: Vec<DemandSlot>) -> Self {
        self.demand = demand;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ConstraintEngine {
    config: EngineConfig,
    grid: SlotGrid,
}

impl ConstraintEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let grid = SlotGrid::new(config.slot_minutes)?;
        Ok(Self { config, grid })
    }

    /// Validates every shift of `snapshot` that intersects `range`.
    ///
    /// All shifts, in range or not, must be well formed and reference known
    /// users and positions; those outside `range` only count toward totals
    /// and pairings of the evaluated ones. Demand slots outside `range` are
    /// ignored.
    pub fn validate_schedule(
        &self,
        snapshot: &Snapshot,
        range: DateRange,
        evaluated_at: OffsetDateTime,
    ) -> Result<ValidationResult> {
        if snapshot.shifts.is_empty() {
            return Err(EngineError::Input("at least one shift is required".into()));
        }
        let scope = Interval::new(range.start, range.end).map_err(|_| {
            EngineError::Input("dateRange.start must be before dateRange.end".into())
        })?;

        let evaluated: BTreeSet<Uuid> = snapshot
            .shifts
            .iter()
            .filter(|s| range.intersects(s.start_time, s.end_time))
            .map(|s| s.id)
            .collect();
        let demand = self.demand_within(&snapshot.demand, &scope);

        let ctx = ScheduleContext::build(
            &self.config,
            &snapshot.users,
            &snapshot.positions,
            &snapshot.shifts,
            evaluated,
            ContextShifts::Strict,
            demand,
        )?;
        let result = self.evaluate(&ctx, snapshot, evaluated_at);

        tracing::debug!(
            shifts = result.metrics.total_shifts,
            violations = result.violations.len(),
            "schedule validated"
        );
        Ok(result)
    }

    /// Validates one candidate shift against the user's other shifts.
    ///
    /// `snapshot.shifts` is the surrounding schedule; a stored shift with the
    /// candidate's id is replaced by the candidate. Only violations involving
    /// the candidate, and demand slots it touches, are reported.
    pub fn validate_shift(
        &self,
        snapshot: &Snapshot,
        candidate: &Shift,
        evaluated_at: OffsetDateTime,
    ) -> Result<ValidationResult> {
        let shifts: Vec<Shift> = snapshot
            .shifts
            .iter()
            .filter(|s| s.id != candidate.id)
            .cloned()
            .chain(std::iter::once(candidate.clone()))
            .collect();
        let scope = Interval::new(candidate.start_time, candidate.end_time)?;
        let demand = self.demand_within(&snapshot.demand, &scope);

        let ctx = ScheduleContext::build(
            &self.config,
            &snapshot.users,
            &snapshot.positions,
            &shifts,
            BTreeSet::from([candidate.id]),
            ContextShifts::Lenient,
            demand,
        )?;
        let result = self.evaluate(&ctx, snapshot, evaluated_at);

        tracing::debug!(
            shift_id = %candidate.id,
            violations = result.violations.len(),
            "shift validated"
        );
        Ok(result)
    }

    /// Users who could take `position_id` during `[start, end)` without an
    /// availability, skills or conflicts violation, in ascending id order.
    pub fn available_users(
        &self,
        snapshot: &Snapshot,
        position_id: Uuid,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<Uuid>> {
        let window = Interval::new(start, end)
            .map_err(|_| EngineError::Input("start must be before end".into()))?;
        let position = snapshot
            .positions
            .iter()
            .find(|p| p.id == position_id)
            .ok_or_else(|| EngineError::Reference(format!("unknown position {position_id}")))?;

        eligibility::available_users(&snapshot.users, position, &snapshot.shifts, window)
    }

    /// Runs the six validators in reporting order and assembles the result.
    fn evaluate(
        &self,
        ctx: &ScheduleContext<'_>,
        snapshot: &Snapshot,
        evaluated_at: OffsetDateTime,
    ) -> ValidationResult {
        let tally = coverage::tally(ctx);

        let violations: Vec<Violation> = [
            availability::validate(ctx),
            skills::validate(ctx),
            time_limits::validate(ctx),
            activity_rules::validate(ctx),
            conflicts::validate(ctx),
            coverage::violations(ctx, &tally),
        ]
        .into_iter()
        .flatten()
        .map(|data| Violation::new(data, evaluated_at))
        .collect();

        let totals = Totals {
            shifts: ctx.evaluated.len(),
            users: snapshot.users.len(),
            positions: snapshot.positions.len(),
        };

        ValidationResult {
            ok: violations.is_empty(),
            metrics: metrics::calculate(totals, &violations, &tally),
            suggestions: suggestions::generate(&violations),
            violations,
        }
    }

    fn demand_within<'a>(&self, demand: &'a [DemandSlot], scope: &Interval) -> Vec<&'a DemandSlot> {
        demand
            .iter()
            // Off-grid slots are kept so the context rejects them.
            .filter(|slot| {
                slot.slot_index >= self.grid.slots_per_day()
                    || self
                        .grid
                        .slot_interval(slot.date, slot.slot_index)
                        .is_some_and(|iv| iv.overlaps(scope))
            })
            .collect()
    }
}
