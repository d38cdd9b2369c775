use crate::engine::context::ScheduleContext;
use crate::engine::interval::LocalSegment;
use crate::engine::violation::{AvailabilityBreach, AvailabilityReason, ViolationData};
use crate::models::user::User;

/// Local sub-intervals of a shift that the user's work-hour rules do not allow.
pub fn breaches(user: &User, segments: &[LocalSegment]) -> Vec<AvailabilityBreach> {
    segments
        .iter()
        .filter_map(|seg| {
            let reason = if user.work_hours.is_empty() {
                AvailabilityReason::NoWorkHours
            } else {
                match user.rule_for(seg.day_of_week) {
                    None => AvailabilityReason::NoRuleForDay,
                    Some(rule) if !rule.is_working => AvailabilityReason::DayOff,
                    Some(rule) if rule.contains(seg.start_minute, seg.end_minute) => return None,
                    Some(rule) => AvailabilityReason::OutsideWorkingHours {
                        window_start_minute: rule.start_minute,
                        window_end_minute: rule.end_minute,
                    },
                }
            };
            Some(AvailabilityBreach {
                local_date: seg.date,
                day_of_week: seg.day_of_week,
                start_minute: seg.start_minute,
                end_minute: seg.end_minute,
                reason,
            })
        })
        .collect()
}

/// One violation per evaluated shift with at least one failing local day.
pub fn validate(ctx: &ScheduleContext<'_>) -> Vec<ViolationData> {
    ctx.evaluated_shifts()
        .filter_map(|entry| {
            let breaches = breaches(entry.user, &entry.segments);
            (!breaches.is_empty()).then(|| ViolationData::Availability {
                shift_id: entry.shift.id,
                user_id: entry.user.id,
                breaches,
            })
        })
        .collect()
}
