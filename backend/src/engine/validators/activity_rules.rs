use time::Duration;

use crate::engine::context::ScheduleContext;
use crate::engine::violation::{ActivityRule, ViolationData};

/// Duration bounds per evaluated shift, then rest between stress shifts per user.
pub fn validate(ctx: &ScheduleContext<'_>) -> Vec<ViolationData> {
    let mut found = Vec::new();

    for entry in ctx.evaluated_shifts() {
        let duration = entry.interval.duration_minutes();
        let position = entry.position;
        let rule = if duration < i64::from(position.min_duration_minutes) {
            ActivityRule::TooShort {
                duration_minutes: duration,
                min_duration_minutes: position.min_duration_minutes,
            }
        } else if duration > i64::from(position.max_duration_minutes) {
            ActivityRule::TooLong {
                duration_minutes: duration,
                max_duration_minutes: position.max_duration_minutes,
            }
        } else {
            continue;
        };
        found.push(ViolationData::ActivityRules {
            shift_id: entry.shift.id,
            user_id: entry.user.id,
            position_id: position.id,
            rule,
        });
    }

    let cooldown_minutes = ctx.config.stress_cooldown_minutes;
    let cooldown = Duration::minutes(i64::from(cooldown_minutes));
    for user_id in ctx.by_user.keys() {
        let stress: Vec<_> = ctx
            .user_shifts(*user_id)
            .filter(|e| e.position.is_stress_position)
            .collect();

        for pair in stress.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if !ctx.is_evaluated(prev.shift.id) && !ctx.is_evaluated(next.shift.id) {
                continue;
            }
            // Overlapping stress shifts are reported as conflicts.
            let gap = next.interval.start - prev.interval.end;
            if gap.is_negative() || gap >= cooldown {
                continue;
            }
            found.push(ViolationData::ActivityRules {
                shift_id: next.shift.id,
                user_id: *user_id,
                position_id: next.position.id,
                rule: ActivityRule::InsufficientRest {
                    previous_shift_id: prev.shift.id,
                    gap_minutes: gap.whole_minutes(),
                    required_minutes: cooldown_minutes,
                },
            });
        }
    }

    found
}
