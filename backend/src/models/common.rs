use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Half-open `[start, end)` window used to scope provider queries and validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end: OffsetDateTime,
}

impl DateRange {
    pub fn new(start: OffsetDateTime, end: OffsetDateTime) -> Self {
        Self { start, end }
    }

    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    pub fn whole_days(&self) -> i64 {
        (self.end - self.start).whole_days()
    }

    /// Whether `[start, end)` intersects this range (touching does not count).
    pub fn intersects(&self, start: OffsetDateTime, end: OffsetDateTime) -> bool {
        start < self.end && self.start < end
    }
}
