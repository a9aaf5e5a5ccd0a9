//! Moderation-day bucket arithmetic.
//!
//! A moderation day is a `[start, start + 86_400)` bucket anchored to a
//! configurable hour-of-day (UTC), not calendar midnight. Offset 0 is the
//! bucket containing `now` ("today"), offset 1 the one before ("yesterday").

use crate::constants::{SECONDS_PER_DAY, SECONDS_PER_HOUR};
use crate::types::TimeRange;

/// Anchor-hour day boundary.
///
/// # Examples
///
/// ```
/// use warden_core::day::DayBoundary;
///
/// let days = DayBoundary::new(4);
/// // 2021-01-02 10:00 UTC falls in the bucket starting 2021-01-02 04:00 UTC.
/// let now = 1_609_581_600;
/// assert_eq!(days.bucket_start(now), 1_609_560_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBoundary {
    anchor_hour: u32,
}

impl DayBoundary {
    /// Create a boundary anchored at `anchor_hour` (taken modulo 24).
    pub fn new(anchor_hour: u32) -> Self {
        Self { anchor_hour: anchor_hour % 24 }
    }

    pub fn anchor_hour(&self) -> u32 {
        self.anchor_hour
    }

    /// Start of the bucket containing `now`.
    pub fn bucket_start(&self, now: u64) -> u64 {
        let shift = self.anchor_hour as u64 * SECONDS_PER_HOUR;
        (now.saturating_sub(shift) / SECONDS_PER_DAY) * SECONDS_PER_DAY + shift
    }

    /// The bucket `offset` days before the one containing `now`.
    /// Offset 0 is today, 1 is yesterday.
    pub fn day_range(&self, now: u64, offset: u32) -> TimeRange {
        let start = self
            .bucket_start(now)
            .saturating_sub(offset as u64 * SECONDS_PER_DAY);
        TimeRange { start, end: start + SECONDS_PER_DAY }
    }

    /// Seconds from `now` until the next bucket boundary.
    pub fn until_next_boundary(&self, now: u64) -> u64 {
        self.bucket_start(now) + SECONDS_PER_DAY - now
    }
}
