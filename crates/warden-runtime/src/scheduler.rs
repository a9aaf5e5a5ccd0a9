//! Daily rotation scheduling.
//!
//! Sleeps until the next moderation-day boundary, then rotates every
//! managed channel. Rotation runs independently of message handling and
//! never contends with streak locks; one channel's failure is logged and
//! the walk continues.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use warden_core::day::DayBoundary;
use warden_core::types::ChannelId;
use warden_lottery::RoleLottery;

/// Drives [`RoleLottery::rotate`] on the moderation-day schedule.
pub struct RotationScheduler {
    lottery: Arc<RoleLottery>,
    channels: Vec<ChannelId>,
    days: DayBoundary,
}

impl RotationScheduler {
    pub fn new(lottery: Arc<RoleLottery>, channels: Vec<ChannelId>, days: DayBoundary) -> Self {
        Self { lottery, channels, days }
    }

    /// Delay from `now` until the next day-boundary run.
    pub fn delay_until_next_run(&self, now: u64) -> Duration {
        Duration::from_secs(self.days.until_next_boundary(now))
    }

    /// Rotate every managed channel once. On-demand entry point; the timed
    /// loop calls this at each boundary.
    pub async fn rotate_all(&self) {
        for &channel in &self.channels {
            match self.lottery.rotate(channel).await {
                Ok(winner) => info!(%channel, %winner, "rotation complete"),
                Err(error) => warn!(%channel, %error, "rotation skipped"),
            }
        }
    }

    /// Run the daily loop forever.
    pub async fn run(&self) {
        loop {
            let now = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs();
            let delay = self.delay_until_next_run(now);
            info!(
                next_run = %format_timestamp(now + delay.as_secs()),
                channels = self.channels.len(),
                "rotation scheduled"
            );
            tokio::time::sleep(delay).await;
            self.rotate_all().await;
        }
    }
}

fn format_timestamp(ts: u64) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp(ts as i64, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}
