//! Half-open interval math shared by the validators.
//!
//! All instants are UTC `time::OffsetDateTime`s. Conversion to a user's wall
//! clock goes through `chrono-tz`, and the results are handed back as `time`
//! values so the rest of the engine deals with a single time library.

use chrono::{Datelike, LocalResult, NaiveDate, Offset, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use time::{Date, Duration, Month, OffsetDateTime, Time};

use super::error::{EngineError, Result};
use crate::models::user::MINUTES_PER_DAY;

/// `[start, end)` with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Interval {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
}

impl Interval {
    pub fn new(start: OffsetDateTime, end: OffsetDateTime) -> Result<Self> {
        if start >= end {
            return Err(EngineError::Input(format!(
                "interval start {start} must be before end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Touching endpoints do not overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn intersection(&self, other: &Interval) -> Option<Interval> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(Interval { start, end })
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).whole_minutes()
    }
}

/// The part of an interval that falls on one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalSegment {
    pub date: Date,
    /// 0 = Sunday .. 6 = Saturday.
    pub day_of_week: u8,
    /// Wall-clock minute the segment starts at (rounded down).
    pub start_minute: u16,
    /// Wall-clock minute the segment ends at (rounded up); 1440 at midnight.
    pub end_minute: u16,
    /// Elapsed minutes, which differ from the wall-clock span across DST shifts.
    pub minutes: i64,
}

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| EngineError::Computation(format!("unknown timezone '{name}'")))
}

/// Splits `interval` at every local midnight of `tz`.
pub fn local_segments(interval: &Interval, tz: Tz) -> Result<Vec<LocalSegment>> {
    let mut segments = Vec::new();
    let mut cursor = interval.start;

    while cursor < interval.end {
        let local = to_chrono(cursor)?.with_timezone(&tz);
        let day = local.date_naive();
        // Past the last representable midnight the segment runs to the end.
        let midnight = day
            .succ_opt()
            .and_then(|next_day| start_of_local_day(tz, next_day));
        let seg_end = midnight.map_or(interval.end, |m| interval.end.min(m));

        let start_minute = minute_of_day(&local);
        let end_minute = if Some(seg_end) == midnight {
            MINUTES_PER_DAY
        } else {
            let local_end = to_chrono(seg_end)?.with_timezone(&tz);
            let mut minute = minute_of_day(&local_end);
            if local_end.second() > 0 || local_end.nanosecond() > 0 {
                minute += 1;
            }
            minute
        };
        let (start_minute, end_minute) = if end_minute < start_minute {
            repeated_hour(tz, cursor, seg_end, start_minute, end_minute)?
        } else {
            (start_minute, end_minute)
        };

        segments.push(LocalSegment {
            date: to_time_date(day)?,
            day_of_week: local.weekday().num_days_from_sunday() as u8,
            start_minute,
            end_minute,
            minutes: (seg_end - cursor).whole_minutes(),
        });

        cursor = seg_end;
    }

    Ok(segments)
}

fn minute_of_day<T: Timelike>(local: &T) -> u16 {
    (local.hour() * 60 + local.minute()) as u16
}

/// Wall-clock span of a segment whose local clock ends before it started,
/// which happens when it crosses a backward DST transition. Both passes over
/// the repeated hour lie inside the returned span.
fn repeated_hour(
    tz: Tz,
    start: OffsetDateTime,
    end: OffsetDateTime,
    start_minute: u16,
    end_minute: u16,
) -> Result<(u16, u16)> {
    let offset_at = |secs: i64| -> Result<i32> {
        let utc = chrono::DateTime::<Utc>::from_timestamp(secs, 0)
            .ok_or_else(|| EngineError::Computation(format!("timestamp {secs} out of range")))?;
        Ok(utc.with_timezone(&tz).offset().fix().local_minus_utc())
    };

    // First minute on the later offset.
    let (mut lo, mut hi) = (start.unix_timestamp(), end.unix_timestamp());
    let before = offset_at(lo)?;
    while hi - lo > 60 {
        let mid = lo + (hi - lo) / 2;
        if offset_at(mid)? == before {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    let after = offset_at(hi)?;
    let transition = to_chrono(from_unix(hi)?)?.with_timezone(&tz);

    let fold_start = minute_of_day(&transition);
    let fold_minutes = u16::try_from((before - after) / 60).unwrap_or(0);
    let fold_end = (fold_start + fold_minutes).min(MINUTES_PER_DAY);
    Ok((fold_start.min(start_minute), fold_end.max(end_minute)))
}

/// First instant of `date` in `tz`, or `None` when it cannot be represented.
/// Zones that skip midnight for DST start the day at the first wall-clock
/// hour that exists.
fn start_of_local_day(tz: Tz, date: NaiveDate) -> Option<OffsetDateTime> {
    (0..3).find_map(|hour| {
        let naive = date.and_hms_opt(hour, 0, 0)?;
        match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
                OffsetDateTime::from_unix_timestamp(dt.timestamp()).ok()
            }
            LocalResult::None => None,
        }
    })
}

fn to_chrono(ts: OffsetDateTime) -> Result<chrono::DateTime<Utc>> {
    chrono::DateTime::<Utc>::from_timestamp(ts.unix_timestamp(), ts.nanosecond())
        .ok_or_else(|| EngineError::Computation(format!("timestamp {ts} out of range")))
}

fn from_unix(secs: i64) -> Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(secs)
        .map_err(|e| EngineError::Computation(format!("timestamp {secs} out of range: {e}")))
}

fn to_time_date(day: NaiveDate) -> Result<Date> {
    let month = Month::try_from(day.month() as u8)
        .map_err(|e| EngineError::Computation(format!("invalid month in {day}: {e}")))?;
    Date::from_calendar_date(day.year(), month, day.day() as u8)
        .map_err(|e| EngineError::Computation(format!("invalid date {day}: {e}")))
}

/// ISO-8601 week (Monday start) a local date belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IsoWeek {
    pub year: i32,
    pub week: u8,
}

impl IsoWeek {
    pub fn of(date: Date) -> Self {
        let (year, week, _) = date.to_iso_week_date();
        Self { year, week }
    }
}

/// Fixed-width UTC slot grid that demand forecasts are expressed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotGrid {
    slot_minutes: u32,
}

impl SlotGrid {
    pub fn new(slot_minutes: u32) -> Result<Self> {
        if slot_minutes == 0 || u32::from(MINUTES_PER_DAY) % slot_minutes != 0 {
            return Err(EngineError::Computation(format!(
                "slot width {slot_minutes} must be a positive divisor of {MINUTES_PER_DAY}"
            )));
        }
        Ok(Self { slot_minutes })
    }

    pub fn slots_per_day(&self) -> u32 {
        u32::from(MINUTES_PER_DAY) / self.slot_minutes
    }

    /// `None` when the slot falls outside the supported calendar.
    pub fn slot_interval(&self, date: Date, slot_index: u32) -> Option<Interval> {
        let offset = Duration::minutes(i64::from(slot_index) * i64::from(self.slot_minutes));
        let start = date.with_time(Time::MIDNIGHT).assume_utc().checked_add(offset)?;
        let end = start.checked_add(Duration::minutes(i64::from(self.slot_minutes)))?;
        Some(Interval { start, end })
    }

    /// Every `(date, slot_index)` cell that `interval` covers fully or partially.
    pub fn slots_touched(&self, interval: &Interval) -> Vec<(Date, u32)> {
        let Some(utc_start) = interval.start.checked_to_offset(time::UtcOffset::UTC) else {
            return Vec::new();
        };
        let minute_of_day = u32::from(utc_start.hour()) * 60 + u32::from(utc_start.minute());
        let mut date = utc_start.date();
        let mut index = minute_of_day / self.slot_minutes;
        let mut cells = Vec::new();

        while let Some(slot) = self.slot_interval(date, index) {
            if slot.start >= interval.end {
                break;
            }
            cells.push((date, index));
            index += 1;
            if index == self.slots_per_day() {
                index = 0;
                match date.next_day() {
                    Some(next) => date = next,
                    None => break,
                }
            }
        }

        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn iv(start: OffsetDateTime, end: OffsetDateTime) -> Interval {
        Interval::new(start, end).unwrap()
    }

    #[test]
    fn test_touching_intervals_do_not_overlap() {
        let a = iv(datetime!(2024-01-15 09:00 UTC), datetime!(2024-01-15 10:00 UTC));
        let b = iv(datetime!(2024-01-15 10:00 UTC), datetime!(2024-01-15 11:00 UTC));
        assert!(!a.overlaps(&b));
        assert!(a.intersection(&b).is_none());
    }

    #[test]
    fn test_overlap_and_intersection() {
        let a = iv(datetime!(2024-01-15 09:00 UTC), datetime!(2024-01-15 11:00 UTC));
        let b = iv(datetime!(2024-01-15 10:00 UTC), datetime!(2024-01-15 12:00 UTC));
        assert!(a.overlaps(&b));
        assert_eq!(a.intersection(&b).unwrap().duration_minutes(), 60);
    }

    #[test]
    fn test_empty_interval_rejected() {
        let t = datetime!(2024-01-15 09:00 UTC);
        assert!(matches!(Interval::new(t, t), Err(EngineError::Input(_))));
    }

    #[test]
    fn test_segments_split_at_local_midnight() {
        // 22:00-02:00 UTC is 23:00-03:00 in Berlin (winter, UTC+1).
        let shift = iv(datetime!(2024-01-15 22:00 UTC), datetime!(2024-01-16 02:00 UTC));
        let tz = parse_timezone("Europe/Berlin").unwrap();
        let segs = local_segments(&shift, tz).unwrap();

        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].date, date!(2024-01-15));
        assert_eq!(segs[0].day_of_week, 1);
        assert_eq!((segs[0].start_minute, segs[0].end_minute), (23 * 60, 1440));
        assert_eq!(segs[0].minutes, 60);
        assert_eq!(segs[1].date, date!(2024-01-16));
        assert_eq!(segs[1].day_of_week, 2);
        assert_eq!((segs[1].start_minute, segs[1].end_minute), (0, 180));
        assert_eq!(segs[1].minutes, 180);
    }

    #[test]
    fn test_unknown_timezone_is_computation_error() {
        assert!(matches!(
            parse_timezone("Mars/Olympus"),
            Err(EngineError::Computation(_))
        ));
    }

    #[test]
    fn test_iso_week_is_monday_based() {
        // Sunday 2024-01-14 closes week 2; Monday 2024-01-15 opens week 3.
        assert_eq!(IsoWeek::of(date!(2024-01-14)), IsoWeek { year: 2024, week: 2 });
        assert_eq!(IsoWeek::of(date!(2024-01-15)), IsoWeek { year: 2024, week: 3 });
    }

    #[test]
    fn test_slots_touched_counts_partial_slots() {
        let grid = SlotGrid::new(30).unwrap();
        let shift = iv(datetime!(2024-01-15 09:10 UTC), datetime!(2024-01-15 10:00 UTC));
        assert_eq!(
            grid.slots_touched(&shift),
            vec![(date!(2024-01-15), 18), (date!(2024-01-15), 19)]
        );
    }

    #[test]
    fn test_slots_touched_wraps_to_next_day() {
        let grid = SlotGrid::new(60).unwrap();
        let shift = iv(datetime!(2024-01-15 23:00 UTC), datetime!(2024-01-16 01:30 UTC));
        assert_eq!(
            grid.slots_touched(&shift),
            vec![
                (date!(2024-01-15), 23),
                (date!(2024-01-16), 0),
                (date!(2024-01-16), 1)
            ]
        );
    }

    #[test]
    fn test_slot_width_must_divide_day() {
        assert!(SlotGrid::new(7).is_err());
        assert!(SlotGrid::new(0).is_err());
        assert_eq!(SlotGrid::new(15).unwrap().slots_per_day(), 96);
    }

    #[test]
    fn test_fall_back_segment_spans_repeated_hour() {
        // New York falls back at 06:00 UTC on 2024-11-03: 05:50 UTC is the
        // first 01:50 (EDT) and 06:10 UTC the second 01:10 (EST).
        let shift = iv(datetime!(2024-11-03 05:50 UTC), datetime!(2024-11-03 06:10 UTC));
        let tz = parse_timezone("America/New_York").unwrap();
        let segs = local_segments(&shift, tz).unwrap();

        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].date, date!(2024-11-03));
        assert_eq!(segs[0].day_of_week, 0);
        assert_eq!((segs[0].start_minute, segs[0].end_minute), (60, 120));
        assert_eq!(segs[0].minutes, 20);
    }

    #[test]
    fn test_fall_back_day_keeps_elapsed_minutes() {
        // The whole 25-hour local day.
        let shift = iv(datetime!(2024-11-03 04:00 UTC), datetime!(2024-11-04 05:00 UTC));
        let tz = parse_timezone("America/New_York").unwrap();
        let segs = local_segments(&shift, tz).unwrap();

        assert_eq!(segs.len(), 1);
        assert_eq!((segs[0].start_minute, segs[0].end_minute), (0, 1440));
        assert_eq!(segs[0].minutes, 25 * 60);
    }

    #[test]
    fn test_segments_at_end_of_calendar() {
        let shift = iv(datetime!(9999-12-31 22:00 UTC), datetime!(9999-12-31 23:59 UTC));
        let segs = local_segments(&shift, chrono_tz::UTC).unwrap();

        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].date, date!(9999-12-31));
        assert_eq!((segs[0].start_minute, segs[0].end_minute), (1320, 1439));
        assert_eq!(segs[0].minutes, 119);
    }

    #[test]
    fn test_last_slot_of_calendar_is_unrepresentable() {
        let grid = SlotGrid::new(30).unwrap();
        assert!(grid.slot_interval(date!(9999-12-31), 47).is_none());
        assert_eq!(
            grid.slot_interval(date!(9999-12-31), 46).map(|s| s.start),
            Some(datetime!(9999-12-31 23:00 UTC))
        );

        let shift = iv(datetime!(9999-12-31 22:30 UTC), datetime!(9999-12-31 23:59 UTC));
        assert_eq!(
            grid.slots_touched(&shift),
            vec![(date!(9999-12-31), 45), (date!(9999-12-31), 46)]
        );
    }
}
