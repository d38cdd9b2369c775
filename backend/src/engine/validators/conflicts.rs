use crate::engine::context::ScheduleContext;
use crate::engine::interval::Interval;
use crate::engine::violation::ViolationData;

/// Whether `candidate` overlaps any of `existing` (half-open, touching is fine).
pub fn overlaps_any<'i>(candidate: &Interval, existing: impl IntoIterator<Item = &'i Interval>) -> bool {
    existing.into_iter().any(|other| candidate.overlaps(other))
}

/// One violation per overlapping pair of a user's shifts.
pub fn validate(ctx: &ScheduleContext<'_>) -> Vec<ViolationData> {
    let mut found = Vec::new();

    for user_id in ctx.by_user.keys() {
        let shifts: Vec<_> = ctx.user_shifts(*user_id).collect();
        for (i, first) in shifts.iter().enumerate() {
            // Sorted by start: once a later shift starts at or after `first`
            // ends, no further shift can overlap it.
            for second in shifts[i + 1..]
                .iter()
                .take_while(|s| s.interval.start < first.interval.end)
            {
                if !ctx.is_evaluated(first.shift.id) && !ctx.is_evaluated(second.shift.id) {
                    continue;
                }
                let overlap = first
                    .interval
                    .intersection(&second.interval)
                    .map(|iv| iv.duration_minutes())
                    .unwrap_or_default();
                found.push(ViolationData::Conflicts {
                    user_id: *user_id,
                    shift_ids: [first.shift.id, second.shift.id],
                    overlap_minutes: overlap,
                });
            }
        }
    }

    found
}
