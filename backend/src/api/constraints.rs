use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::WithRejection;
use time::{Duration, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;
use validator::Validate;

use crate::{
    engine::{self, EngineError, Snapshot, ValidationResult},
    error::{AppError, Result},
    models::{
        common::DateRange,
        shift::{AvailableUsersQuery, Shift, ValidateScheduleRequest, ValidateShiftRequest},
        user::AvailableUsersResponse,
    },
    AppState,
};

/// Runs a CPU-bound engine call off the async runtime.
async fn run_engine<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> engine::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("validation task failed: {e}")))?
        .map_err(AppError::from)
}

fn check_range(range: &DateRange, max_days: i64) -> Result<()> {
    if !range.is_valid() {
        return Err(EngineError::Input("start must be before end".into()).into());
    }
    if range.whole_days() > max_days {
        return Err(AppError::BadRequest(format!(
            "Date range must not exceed {max_days} days"
        )));
    }
    Ok(())
}

/// Whole ISO weeks around a shift, padded by two days on each side so the
/// user's local weeks are covered whatever their offset. Clamped to the
/// supported calendar.
fn surrounding_weeks(start: OffsetDateTime, end: OffsetDateTime) -> DateRange {
    let pad = Duration::days(2);
    let from = start
        .checked_sub(pad)
        .map(|t| t.date())
        .and_then(|d| {
            d.checked_sub(Duration::days(i64::from(d.weekday().number_days_from_monday())))
        })
        .map_or(PrimitiveDateTime::MIN.assume_utc(), |monday| {
            monday.with_time(Time::MIDNIGHT).assume_utc()
        });
    let to = end
        .checked_add(pad)
        .map(|t| t.date())
        .and_then(|d| {
            d.checked_add(Duration::days(7 - i64::from(d.weekday().number_days_from_monday())))
        })
        .map_or(PrimitiveDateTime::MAX.assume_utc(), |monday| {
            monday.with_time(Time::MIDNIGHT).assume_utc()
        });
    DateRange::new(from, to)
}

pub async fn validate_schedule(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<ValidateScheduleRequest>, AppError>,
) -> Result<Json<ValidationResult>> {
    req.validate()?;
    check_range(&req.date_range, state.max_range_days)?;

    let range = req.date_range;
    let (users, positions, demand) = futures::try_join!(
        state.store.get_users(),
        state.store.get_positions(),
        state.store.get_demand_slots(range),
    )?;

    let snapshot = Snapshot {
        users,
        positions,
        shifts: req.shifts,
        demand,
    };
    let engine = state.engine.clone();
    let result = run_engine(move || {
        engine.validate_schedule(&snapshot, range, OffsetDateTime::now_utc())
    })
    .await?;

    tracing::debug!(ok = result.ok, violations = result.violations.len(), "validate");
    Ok(Json(result))
}

pub async fn validate_shift(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<ValidateShiftRequest>, AppError>,
) -> Result<Json<ValidationResult>> {
    let draft = req.shift;
    if draft.user_id.is_some_and(|id| id != req.user_id) {
        return Err(AppError::BadRequest(
            "shift.userId does not match userId".into(),
        ));
    }
    if draft.position_id.is_some_and(|id| id != req.position_id) {
        return Err(AppError::BadRequest(
            "shift.positionId does not match positionId".into(),
        ));
    }
    check_range(
        &DateRange::new(draft.start_time, draft.end_time),
        state.max_range_days,
    )?;

    let candidate = Shift {
        id: draft.id.unwrap_or(Uuid::nil()),
        user_id: req.user_id,
        position_id: req.position_id,
        start_time: draft.start_time,
        end_time: draft.end_time,
    };
    let context = surrounding_weeks(candidate.start_time, candidate.end_time);
    let (users, positions, demand, shifts) = futures::try_join!(
        state.store.get_users(),
        state.store.get_positions(),
        state
            .store
            .get_demand_slots(DateRange::new(candidate.start_time, candidate.end_time)),
        state.store.get_shifts(context),
    )?;

    let snapshot = Snapshot {
        users,
        positions,
        shifts,
        demand,
    };
    let engine = state.engine.clone();
    let result = run_engine(move || {
        engine.validate_shift(&snapshot, &candidate, OffsetDateTime::now_utc())
    })
    .await?;

    Ok(Json(result))
}

pub async fn available_users(
    State(state): State<AppState>,
    WithRejection(Query(q), _): WithRejection<Query<AvailableUsersQuery>, AppError>,
) -> Result<Json<AvailableUsersResponse>> {
    let window = DateRange::new(q.start, q.end);
    check_range(&window, state.max_range_days)?;

    let (users, positions, shifts) = futures::try_join!(
        state.store.get_users(),
        state.store.get_positions(),
        state.store.get_shifts(window),
    )?;

    let snapshot = Snapshot::new(users, positions, shifts);
    let engine = state.engine.clone();
    let (ids, snapshot) = run_engine(move || {
        let ids = engine.available_users(&snapshot, q.position_id, q.start, q.end)?;
        Ok((ids, snapshot))
    })
    .await?;

    let by_id: HashMap<Uuid, _> = snapshot.users.iter().map(|u| (u.id, u)).collect();
    let available_users = ids
        .iter()
        .filter_map(|id| by_id.get(id).map(|u| u.summary()))
        .collect();

    Ok(Json(AvailableUsersResponse { available_users }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_surrounding_weeks_are_whole_padded_weeks() {
        // Wednesday shift: from the Monday before to the Monday after next.
        let weeks = surrounding_weeks(
            datetime!(2024-01-17 10:00 UTC),
            datetime!(2024-01-17 12:00 UTC),
        );
        assert_eq!(weeks.start, datetime!(2024-01-15 00:00 UTC));
        assert_eq!(weeks.end, datetime!(2024-01-22 00:00 UTC));

        // Monday shift pulls in the previous week.
        let weeks = surrounding_weeks(
            datetime!(2024-01-15 01:00 UTC),
            datetime!(2024-01-15 02:00 UTC),
        );
        assert_eq!(weeks.start, datetime!(2024-01-08 00:00 UTC));
        assert_eq!(weeks.end, datetime!(2024-01-22 00:00 UTC));
    }

    #[test]
    fn test_surrounding_weeks_clamp_to_calendar() {
        let weeks = surrounding_weeks(
            datetime!(9999-12-31 10:00 UTC),
            datetime!(9999-12-31 12:00 UTC),
        );
        assert_eq!(weeks.start, datetime!(9999-12-27 00:00 UTC));
        assert_eq!(weeks.end, PrimitiveDateTime::MAX.assume_utc());
        assert!(weeks.is_valid());

        let earliest = time::Date::MIN.with_hms(10, 0, 0).unwrap().assume_utc();
        let weeks = surrounding_weeks(earliest, earliest + Duration::hours(2));
        assert_eq!(weeks.start, PrimitiveDateTime::MIN.assume_utc());
    }
}
