//! Engine configuration.
//!
//! Programmatic defaults; the embedding application overrides fields as
//! needed. The moderation-day anchor and the callout token set are the two
//! knobs that change engine semantics — everything else is plumbing.

use std::path::PathBuf;
use std::time::Duration;

use warden_core::constants::{DEFAULT_CALL_TIMEOUT_SECS, DEFAULT_DAY_ANCHOR_HOUR};
use warden_core::day::DayBoundary;
use warden_core::types::{ChannelId, UserId};

/// Configuration for a Warden engine instance.
#[derive(Debug, Clone)]
pub struct WardenConfig {
    /// Root directory for persistent ledger data.
    pub data_dir: PathBuf,
    /// Moderation-day anchor hour (UTC), 0–23.
    pub day_anchor_hour: u32,
    /// Trigger phrases recognized as callouts.
    pub callout_tokens: Vec<String>,
    /// Timeout applied to every gateway, store, and media call.
    pub call_timeout: Duration,
    /// Channels under management; the rotation scheduler walks this list.
    pub channels: Vec<ChannelId>,
    /// The engine's own gateway account, excluded from operator feedback.
    pub self_account: UserId,
    /// Log level filter string (e.g. "info", "warden_runtime=debug").
    pub log_level: String,
}

impl Default for WardenConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("warden");

        Self {
            data_dir,
            day_anchor_hour: DEFAULT_DAY_ANCHOR_HOUR,
            callout_tokens: Vec::new(),
            call_timeout: Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
            channels: Vec::new(),
            self_account: UserId(0),
            log_level: "info".to_string(),
        }
    }
}

impl WardenConfig {
    /// Path to the RocksDB ledger directory.
    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join("ledger")
    }

    /// The configured moderation-day boundary.
    pub fn day_boundary(&self) -> DayBoundary {
        DayBoundary::new(self.day_anchor_hour)
    }
}
