use std::collections::{BTreeMap, BTreeSet};

use time::Date;
use uuid::Uuid;

use crate::engine::context::ScheduleContext;
use crate::engine::interval::Interval;
use crate::engine::violation::ViolationData;
use crate::models::demand::DemandSlot;

/// Scheduled head count against one forecast slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotCoverage<'a> {
    pub slot: &'a DemandSlot,
    pub scheduled_agents: u32,
}

impl SlotCoverage<'_> {
    pub fn shortfall(&self) -> u32 {
        self.slot.required_agents.saturating_sub(self.scheduled_agents)
    }

    /// Agents that count toward the requirement.
    pub fn covered(&self) -> u32 {
        self.scheduled_agents.min(self.slot.required_agents)
    }
}

/// Counts distinct users per `(date, slot, activity)` over every shift in view,
/// and pairs each in-scope demand slot with its count. Only the part of a
/// shift that falls within the demand's span is enumerated.
pub fn tally<'a>(ctx: &ScheduleContext<'a>) -> Vec<SlotCoverage<'a>> {
    let span = demand_span(ctx);
    let mut staffed: BTreeMap<(Date, u32, &str), BTreeSet<Uuid>> = BTreeMap::new();
    for entry in &ctx.shifts {
        let Some(clipped) = span.and_then(|span| entry.interval.intersection(&span)) else {
            continue;
        };
        for (date, index) in ctx.grid.slots_touched(&clipped) {
            staffed
                .entry((date, index, entry.position.activity.as_str()))
                .or_default()
                .insert(entry.user.id);
        }
    }

    ctx.demand
        .iter()
        .map(|&slot| SlotCoverage {
            slot,
            scheduled_agents: staffed
                .get(&(slot.date, slot.slot_index, slot.activity.as_str()))
                .map(|users| users.len() as u32)
                .unwrap_or(0),
        })
        .collect()
}

/// From the start of the first demand slot to the end of the last one.
fn demand_span(ctx: &ScheduleContext<'_>) -> Option<Interval> {
    let mut cells = ctx
        .demand
        .iter()
        .filter_map(|slot| ctx.grid.slot_interval(slot.date, slot.slot_index));
    let first = cells.next()?;
    Some(cells.fold(first, |span, cell| Interval {
        start: span.start.min(cell.start),
        end: span.end.max(cell.end),
    }))
}

/// Understaffed slots; slots requiring nobody are always satisfied.
pub fn violations(ctx: &ScheduleContext<'_>, tally: &[SlotCoverage<'_>]) -> Vec<ViolationData> {
    tally
        .iter()
        .filter(|c| c.shortfall() > 0)
        .filter_map(|c| {
            let slot = ctx.grid.slot_interval(c.slot.date, c.slot.slot_index)?;
            Some(ViolationData::Coverage {
                date: c.slot.date,
                slot_index: c.slot.slot_index,
                slot_start: slot.start,
                activity: c.slot.activity.clone(),
                required_agents: c.slot.required_agents,
                scheduled_agents: c.scheduled_agents,
                shortfall: c.shortfall(),
            })
        })
        .collect()
}
