//! warden-sim — synthetic chat traffic through the Warden engine.
//!
//! Spins up the full moderation stack over in-memory stores and a logging
//! gateway, replays randomized channel chatter (with deliberate echo bursts
//! and the occasional callout), then runs one role rotation per channel and
//! prints a summary.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use clap::Parser;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use warden_core::day::DayBoundary;
use warden_core::error::{GatewayError, MediaError, StoreError};
use warden_core::ledger::PointLedger;
use warden_core::traits::{
    ActivityProvider, ChatGateway, MediaFetcher, PointStore, RoleStore,
};
use warden_core::types::{
    ChannelId, MatchCounts, MemberInfo, Message, Segment, UserId,
};
use warden_lottery::RoleLottery;
use warden_penalty::PenaltyEngine;
use warden_runtime::{MemoryLedger, Moderator};
use warden_streak::StreakTracker;

/// Warden simulation — synthetic channels, real engine.
#[derive(Parser, Debug)]
#[command(
    name = "warden-sim",
    version,
    about = "Drive the Warden moderation engine with synthetic chat traffic"
)]
struct Args {
    /// Number of simulated channels
    #[arg(long, default_value_t = 2)]
    channels: u64,

    /// Participants per channel
    #[arg(long, default_value_t = 6)]
    users: u64,

    /// Messages to replay
    #[arg(long, default_value_t = 200)]
    messages: u32,

    /// Rng seed for reproducible runs
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Moderation-day anchor hour (UTC)
    #[arg(long, default_value_t = 4)]
    anchor_hour: u32,

    /// Print every gateway effect as a JSON line
    #[arg(long)]
    json: bool,
}

/// Gateway that logs effects instead of delivering them.
struct SimGateway {
    users_per_channel: u64,
    json: bool,
    sends: Mutex<u64>,
    mutes: Mutex<Vec<(ChannelId, UserId, u64)>>,
    role_changes: Mutex<u64>,
}

impl SimGateway {
    fn new(users_per_channel: u64, json: bool) -> Self {
        Self {
            users_per_channel,
            json,
            sends: Mutex::new(0),
            mutes: Mutex::new(Vec::new()),
            role_changes: Mutex::new(0),
        }
    }

    fn emit(&self, effect: serde_json::Value) {
        if self.json {
            println!("{effect}");
        }
    }
}

#[async_trait]
impl ChatGateway for SimGateway {
    async fn send(&self, channel: ChannelId, segments: &[Segment]) -> Result<(), GatewayError> {
        *self.sends.lock() += 1;
        self.emit(serde_json::json!({
            "effect": "send",
            "channel": channel.0,
            "segments": segments.len(),
        }));
        Ok(())
    }

    async fn mute(
        &self,
        channel: ChannelId,
        user: UserId,
        seconds: u64,
    ) -> Result<(), GatewayError> {
        self.mutes.lock().push((channel, user, seconds));
        self.emit(serde_json::json!({
            "effect": "mute",
            "channel": channel.0,
            "user": user.0,
            "seconds": seconds,
        }));
        Ok(())
    }

    async fn set_privileged_role(
        &self,
        channel: ChannelId,
        user: UserId,
        enabled: bool,
    ) -> Result<(), GatewayError> {
        *self.role_changes.lock() += 1;
        self.emit(serde_json::json!({
            "effect": "role",
            "channel": channel.0,
            "user": user.0,
            "enabled": enabled,
        }));
        Ok(())
    }

    async fn list_members(&self, _: ChannelId) -> Result<Vec<MemberInfo>, GatewayError> {
        Ok((1..=self.users_per_channel)
            .map(|id| MemberInfo { user: UserId(id), is_bot: false })
            .collect())
    }
}

/// Media fetcher serving the resource reference's own bytes — good enough
/// for deterministic image fingerprints.
struct SimMedia;

#[async_trait]
impl MediaFetcher for SimMedia {
    async fn fetch(&self, resource: &str) -> Result<Bytes, MediaError> {
        Ok(Bytes::copy_from_slice(resource.as_bytes()))
    }
}

/// Activity derived from the user id, so weights differ but stay stable.
struct SimActivity;

#[async_trait]
impl ActivityProvider for SimActivity {
    async fn match_counts(&self, user: UserId) -> Result<MatchCounts, StoreError> {
        Ok(MatchCounts {
            primary: user.0 % 7,
            secondary: user.0 % 3,
            tertiary: user.0 % 11,
        })
    }
}

const PHRASES: &[&str] = &["lol", "gg", "nice one", "wp", "?", "no way"];
const CALLOUT_TOKEN: &str = "ban";

fn random_message(rng: &mut StdRng, args: &Args) -> Message {
    let channel = ChannelId(rng.gen_range(1..=args.channels));
    let author = UserId(rng.gen_range(1..=args.users));

    // Occasional callout or sticker; mostly plain phrases so echoes form.
    match rng.gen_range(0..20u32) {
        0 => Message {
            channel,
            author,
            segments: vec![
                Segment::Text(CALLOUT_TOKEN.into()),
                Segment::Mention(UserId(rng.gen_range(1..=args.users))),
            ],
        },
        1 => Message {
            channel,
            author,
            segments: vec![Segment::Sticker(rng.gen_range(1..=4))],
        },
        _ => Message::text(
            channel,
            author,
            PHRASES[rng.gen_range(0..PHRASES.len())],
        ),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);

    let gateway = Arc::new(SimGateway::new(args.users, args.json));
    let store = Arc::new(MemoryLedger::new());
    let days = DayBoundary::new(args.anchor_hour);
    let ledger = Arc::new(PointLedger::new(
        Arc::clone(&store) as Arc<dyn PointStore>,
        days,
    ));

    let mut penalty_rng = StdRng::seed_from_u64(args.seed.wrapping_add(1));
    let penalty = PenaltyEngine::with_roll_source(
        Arc::clone(&ledger),
        Arc::clone(&store) as Arc<dyn RoleStore>,
        Arc::clone(&gateway) as Arc<dyn ChatGateway>,
        UserId(0),
        move || penalty_rng.gen_range(0.0..1.0),
    );
    let moderator = Moderator::from_parts(
        Arc::clone(&gateway) as Arc<dyn ChatGateway>,
        Arc::new(SimMedia),
        StreakTracker::new([CALLOUT_TOKEN.to_string()]),
        penalty,
        Duration::from_secs(5),
    );

    info!(
        channels = args.channels,
        users = args.users,
        messages = args.messages,
        seed = args.seed,
        "replaying synthetic traffic"
    );
    for _ in 0..args.messages {
        let message = random_message(&mut rng, &args);
        moderator.process_message(&message).await;
    }

    let lottery = RoleLottery::with_rng(
        Arc::clone(&gateway) as Arc<dyn ChatGateway>,
        ledger,
        Arc::clone(&store) as Arc<dyn RoleStore>,
        Arc::new(SimActivity),
        StdRng::seed_from_u64(args.seed.wrapping_add(2)),
    );
    for channel in 1..=args.channels {
        if let Err(error) = lottery.rotate(ChannelId(channel)).await {
            info!(channel, %error, "rotation skipped");
        }
    }

    let scored: u64 = store
        .events()
        .iter()
        .filter(|e| !e.is_compensating())
        .map(|e| e.points as u64)
        .sum();
    info!(
        points_awarded = scored,
        events = store.events().len(),
        reposts = gateway.sends.lock().saturating_sub(args.channels), // rotations announce too
        mutes = gateway.mutes.lock().len(),
        role_changes = *gateway.role_changes.lock(),
        "simulation complete"
    );
    Ok(())
}
