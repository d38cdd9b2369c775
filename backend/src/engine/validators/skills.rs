use crate::engine::context::ScheduleContext;
use crate::engine::violation::ViolationData;
use crate::models::{position::Position, user::User};

/// Required skills of `position` the user lacks, in sorted order.
pub fn missing_skills(user: &User, position: &Position) -> Vec<String> {
    position
        .required_skills
        .difference(&user.skills)
        .cloned()
        .collect()
}

pub fn validate(ctx: &ScheduleContext<'_>) -> Vec<ViolationData> {
    ctx.evaluated_shifts()
        .filter_map(|entry| {
            let missing = missing_skills(entry.user, entry.position);
            (!missing.is_empty()).then(|| ViolationData::Skills {
                shift_id: entry.shift.id,
                user_id: entry.user.id,
                position_id: entry.position.id,
                missing_skills: missing,
            })
        })
        .collect()
}
