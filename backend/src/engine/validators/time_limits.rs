use crate::engine::context::{Bucket, ScheduleContext};
use crate::engine::violation::{LimitPeriod, ViolationData};

fn over_limit(
    ctx: &ScheduleContext<'_>,
    bucket: &Bucket,
    limit_minutes: u32,
) -> Option<i64> {
    let touches_evaluated = bucket.shift_ids.iter().any(|id| ctx.is_evaluated(*id));
    let overage = bucket.minutes - i64::from(limit_minutes);
    (touches_evaluated && overage > 0).then_some(overage)
}

/// Daily limits per local date first, then weekly limits per ISO week.
pub fn validate(ctx: &ScheduleContext<'_>) -> Vec<ViolationData> {
    let mut found = Vec::new();

    for ((user_id, date), bucket) in &ctx.daily {
        let Some(user) = ctx.users.get(user_id) else {
            continue;
        };
        if let Some(overage) = over_limit(ctx, bucket, user.daily_max_minutes) {
            found.push(ViolationData::TimeLimits {
                user_id: *user_id,
                period: LimitPeriod::Daily { date: *date },
                scheduled_minutes: bucket.minutes,
                limit_minutes: user.daily_max_minutes,
                overage_minutes: overage,
                shift_ids: bucket.shift_ids.clone(),
            });
        }
    }

    for ((user_id, week), bucket) in &ctx.weekly {
        let Some(user) = ctx.users.get(user_id) else {
            continue;
        };
        if let Some(overage) = over_limit(ctx, bucket, user.weekly_max_minutes) {
            found.push(ViolationData::TimeLimits {
                user_id: *user_id,
                period: LimitPeriod::weekly(*week),
                scheduled_minutes: bucket.minutes,
                limit_minutes: user.weekly_max_minutes,
                overage_minutes: overage,
                shift_ids: bucket.shift_ids.clone(),
            });
        }
    }

    found
}
