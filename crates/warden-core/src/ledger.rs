//! The point ledger: day-bucketed aggregates over the append-only store.
//!
//! A thin layer binding a [`PointStore`] to [`DayBoundary`] arithmetic and a
//! clock. Appends are non-idempotent by design — duplicate legitimate events
//! are expected. Within an open bucket sums only grow; a closed bucket's
//! value is fixed.

use std::sync::Arc;

use crate::day::DayBoundary;
use crate::error::StoreError;
use crate::traits::PointStore;
use crate::types::{PointEvent, SubjectId};

/// Day offset for the bucket containing "now".
pub const TODAY: u32 = 0;

/// Day offset for the bucket before the one containing "now".
pub const YESTERDAY: u32 = 1;

/// Aggregating view over the point event store.
pub struct PointLedger {
    store: Arc<dyn PointStore>,
    days: DayBoundary,
    clock: Box<dyn Fn() -> u64 + Send + Sync>,
}

impl PointLedger {
    /// Create a ledger with the system clock.
    pub fn new(store: Arc<dyn PointStore>, days: DayBoundary) -> Self {
        Self {
            store,
            days,
            clock: Box::new(|| {
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs()
            }),
        }
    }

    /// Create a ledger with a custom clock for testing.
    pub fn with_clock(
        store: Arc<dyn PointStore>,
        days: DayBoundary,
        clock: impl Fn() -> u64 + Send + Sync + 'static,
    ) -> Self {
        Self { store, days, clock: Box::new(clock) }
    }

    /// Current time in Unix seconds, per the injected clock.
    pub fn now(&self) -> u64 {
        (self.clock)()
    }

    pub fn days(&self) -> DayBoundary {
        self.days
    }

    /// Append a point event stamped with the current time.
    pub async fn append(&self, subject: SubjectId, points: u32) -> Result<(), StoreError> {
        self.store
            .append_event(PointEvent { subject, timestamp: self.now(), points })
            .await
    }

    /// Sum of points in the moderation-day bucket `offset` days back.
    pub async fn sum_points(&self, subject: &SubjectId, offset: u32) -> Result<u64, StoreError> {
        let range = self.days.day_range(self.now(), offset);
        self.store.sum_points(subject, range).await
    }

    /// Number of compensating (zero-point) events in the bucket `offset`
    /// days back — one per consumed mute or demotion.
    pub async fn count_zero_points(
        &self,
        subject: &SubjectId,
        offset: u32,
    ) -> Result<u64, StoreError> {
        let range = self.days.day_range(self.now(), offset);
        self.store.count_events(subject, range, true).await
    }
}
