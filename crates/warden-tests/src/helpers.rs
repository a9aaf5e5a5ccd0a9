//! Shared fakes and builders for the end-to-end tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use warden_core::day::DayBoundary;
use warden_core::error::{GatewayError, MediaError, StoreError};
use warden_core::ledger::PointLedger;
use warden_core::traits::{
    ActivityProvider, ChatGateway, MediaFetcher, PointStore, RoleStore,
};
use warden_core::types::{
    ChannelId, MatchCounts, MemberInfo, Message, Segment, UserId,
};
use warden_penalty::PenaltyEngine;
use warden_runtime::{MemoryLedger, Moderator};
use warden_streak::StreakTracker;

/// A fixed mid-day instant: 2021-01-02 12:00 UTC.
pub const NOON: u64 = 1_609_588_800;

/// The default moderation-day boundary used across scenarios (04:00 UTC).
pub fn days() -> DayBoundary {
    DayBoundary::new(4)
}

/// Gateway fake recording every outbound effect.
#[derive(Default)]
pub struct RecordingGateway {
    pub members: Mutex<HashMap<ChannelId, Vec<MemberInfo>>>,
    pub sent: Mutex<Vec<(ChannelId, Vec<Segment>)>>,
    pub mutes: Mutex<Vec<(ChannelId, UserId, u64)>>,
    pub role_changes: Mutex<Vec<(ChannelId, UserId, bool)>>,
}

impl RecordingGateway {
    pub fn with_members(channel: ChannelId, users: &[u64]) -> Arc<Self> {
        let gateway = Self::default();
        gateway.members.lock().insert(
            channel,
            users
                .iter()
                .map(|id| MemberInfo { user: UserId(*id), is_bot: false })
                .collect(),
        );
        Arc::new(gateway)
    }
}

#[async_trait]
impl ChatGateway for RecordingGateway {
    async fn send(&self, channel: ChannelId, segments: &[Segment]) -> Result<(), GatewayError> {
        self.sent.lock().push((channel, segments.to_vec()));
        Ok(())
    }

    async fn mute(
        &self,
        channel: ChannelId,
        user: UserId,
        seconds: u64,
    ) -> Result<(), GatewayError> {
        self.mutes.lock().push((channel, user, seconds));
        Ok(())
    }

    async fn set_privileged_role(
        &self,
        channel: ChannelId,
        user: UserId,
        enabled: bool,
    ) -> Result<(), GatewayError> {
        self.role_changes.lock().push((channel, user, enabled));
        Ok(())
    }

    async fn list_members(&self, channel: ChannelId) -> Result<Vec<MemberInfo>, GatewayError> {
        Ok(self.members.lock().get(&channel).cloned().unwrap_or_default())
    }
}

/// Media fake serving a fixed byte payload per resource reference.
pub struct FixtureMedia {
    resources: HashMap<String, Vec<u8>>,
}

impl FixtureMedia {
    pub fn new(entries: &[(&str, &[u8])]) -> Arc<Self> {
        Arc::new(Self {
            resources: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_vec()))
                .collect(),
        })
    }

    pub fn empty() -> Arc<Self> {
        Self::new(&[])
    }
}

#[async_trait]
impl MediaFetcher for FixtureMedia {
    async fn fetch(&self, resource: &str) -> Result<bytes::Bytes, MediaError> {
        self.resources
            .get(resource)
            .map(|bytes| bytes::Bytes::copy_from_slice(bytes))
            .ok_or_else(|| MediaError::FetchFailed {
                resource: resource.to_string(),
                reason: "not in fixture".to_string(),
            })
    }
}

/// Activity fake with per-user primary-mode counts.
pub struct FixedActivity {
    counts: HashMap<UserId, MatchCounts>,
}

impl FixedActivity {
    pub fn new(primary: &[(u64, u64)]) -> Arc<Self> {
        Arc::new(Self {
            counts: primary
                .iter()
                .map(|(id, count)| {
                    (
                        UserId(*id),
                        MatchCounts { primary: *count, secondary: 0, tertiary: 0 },
                    )
                })
                .collect(),
        })
    }
}

#[async_trait]
impl ActivityProvider for FixedActivity {
    async fn match_counts(&self, user: UserId) -> Result<MatchCounts, StoreError> {
        Ok(self.counts.get(&user).copied().unwrap_or_default())
    }
}

/// A full moderator stack over in-memory stores, a fixed clock, and a
/// constant penalty roll.
pub struct Stack {
    pub gateway: Arc<RecordingGateway>,
    pub store: Arc<MemoryLedger>,
    pub ledger: Arc<PointLedger>,
    pub moderator: Moderator,
}

pub fn stack(roll: f64) -> Stack {
    stack_at(roll, NOON)
}

pub fn stack_at(roll: f64, now: u64) -> Stack {
    let gateway = Arc::new(RecordingGateway::default());
    let store = Arc::new(MemoryLedger::new());
    let ledger = Arc::new(PointLedger::with_clock(
        Arc::clone(&store) as Arc<dyn PointStore>,
        days(),
        move || now,
    ));
    let penalty = PenaltyEngine::with_roll_source(
        Arc::clone(&ledger),
        Arc::clone(&store) as Arc<dyn RoleStore>,
        Arc::clone(&gateway) as Arc<dyn ChatGateway>,
        UserId(0),
        move || roll,
    );
    let moderator = Moderator::from_parts(
        Arc::clone(&gateway) as Arc<dyn ChatGateway>,
        FixtureMedia::empty(),
        StreakTracker::new(["ban".to_string()]),
        penalty,
        Duration::from_secs(5),
    );
    Stack { gateway, store, ledger, moderator }
}

/// Single-text-segment message builder.
pub fn text(channel: ChannelId, author: u64, content: &str) -> Message {
    Message::text(channel, UserId(author), content)
}

/// Callout builder: recognized token plus one mention.
pub fn callout(channel: ChannelId, author: u64, target: u64) -> Message {
    Message {
        channel,
        author: UserId(author),
        segments: vec![
            Segment::Text("ban".into()),
            Segment::Mention(UserId(target)),
        ],
    }
}
