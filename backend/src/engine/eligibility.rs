//! "Who could work position P during `[start, end)`?"
//!
//! A user qualifies exactly when a shift for that window would pass the
//! availability, skills and conflicts rules, so the same checks are reused.

use uuid::Uuid;

use super::context::{check_position, check_user};
use super::error::Result;
use super::interval::{local_segments, Interval};
use super::validators::{availability, conflicts, skills};
use crate::models::{position::Position, shift::Shift, user::User};

/// Eligible user ids in ascending order.
pub fn available_users(
    users: &[User],
    position: &Position,
    existing: &[Shift],
    window: Interval,
) -> Result<Vec<Uuid>> {
    check_position(position)?;

    let mut roster: Vec<&User> = users.iter().collect();
    roster.sort_by_key(|u| u.id);

    let mut eligible = Vec::new();
    for user in roster {
        let tz = match check_user(user) {
            Ok(tz) => tz,
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "skipping user with invalid settings");
                continue;
            }
        };
        let segments = local_segments(&window, tz)?;
        if !availability::breaches(user, &segments).is_empty() {
            continue;
        }
        if !skills::missing_skills(user, position).is_empty() {
            continue;
        }

        // Stored rows with an empty interval cannot overlap anything.
        let booked: Vec<Interval> = existing
            .iter()
            .filter(|s| s.user_id == user.id)
            .filter_map(|s| Interval::new(s.start_time, s.end_time).ok())
            .collect();
        if conflicts::overlaps_any(&window, &booked) {
            continue;
        }

        eligible.push(user.id);
    }

    Ok(eligible)
}
