//! Role rotation driven end to end: debt accrued through moderation feeds
//! the next day's lottery.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use warden_core::day::DayBoundary;
use warden_core::ledger::PointLedger;
use warden_core::traits::{ChatGateway, PointStore, RoleStore};
use warden_core::types::{ChannelId, RoleHolder, Segment, UserId};
use warden_lottery::RoleLottery;
use warden_runtime::MemoryLedger;
use warden_tests::helpers::{stack_at, text, FixedActivity, RecordingGateway, NOON};

const G: ChannelId = ChannelId(100);
const DAY: u64 = 86_400;

fn lottery_over(
    gateway: Arc<RecordingGateway>,
    store: Arc<MemoryLedger>,
    now: u64,
    primary: &[(u64, u64)],
    seed: u64,
) -> RoleLottery {
    let ledger = Arc::new(PointLedger::with_clock(
        store.clone() as Arc<dyn PointStore>,
        DayBoundary::new(4),
        move || now,
    ));
    RoleLottery::with_rng(
        gateway as Arc<dyn ChatGateway>,
        ledger,
        store as Arc<dyn RoleStore>,
        FixedActivity::new(primary),
        StdRng::seed_from_u64(seed),
    )
}

/// Yesterday's moderation debt shows up in today's announced weights.
#[tokio::test]
async fn accrued_debt_feeds_the_next_rotation() {
    // Day 1: user 2 racks up points through an echo streak.
    let s = stack_at(0.999, NOON);
    s.moderator.handle_message(&text(G, 1, "lol")).await.unwrap();
    s.moderator.handle_message(&text(G, 2, "lol")).await.unwrap();

    // Day 2: rotate with both users equally active.
    let gateway = RecordingGateway::with_members(G, &[1, 2]);
    let lottery = lottery_over(
        Arc::clone(&gateway),
        Arc::clone(&s.store),
        NOON + DAY,
        &[(1, 10), (2, 10)],
        7,
    );
    let winner = lottery.rotate(G).await.unwrap();
    assert!(winner == UserId(1) || winner == UserId(2));

    // The announcement carries both candidates' weights, and the indebted
    // user's figure is strictly larger.
    let sent = gateway.sent.lock();
    let Segment::Text(table) = &sent[0].1[1] else {
        panic!("announcement missing weight table");
    };
    let weight_of = |user: u64| -> f64 {
        let line = table
            .lines()
            .find(|line| line.trim_start().starts_with(&format!("{user}:")))
            .unwrap_or_else(|| panic!("no weight line for {user}"));
        line.split(':').nth(1).unwrap().trim().parse().unwrap()
    };
    assert!(weight_of(2) > weight_of(1));
}

/// Two consecutive rotations: the second excludes and revokes the first
/// winner while it is still alive.
#[tokio::test]
async fn consecutive_rotations_hand_the_role_over() {
    let store = Arc::new(MemoryLedger::new());
    let gateway = RecordingGateway::with_members(G, &[1, 2]);
    let lottery = lottery_over(
        Arc::clone(&gateway),
        Arc::clone(&store),
        NOON,
        &[(1, 10), (2, 10)],
        7,
    );

    let first = lottery.rotate(G).await.unwrap();
    let second = lottery.rotate(G).await.unwrap();
    assert_ne!(first, second, "alive holder must be excluded");

    assert_eq!(
        store.role_holder(G).await.unwrap(),
        Some(RoleHolder { user: second, alive: true })
    );
    assert_eq!(
        *gateway.role_changes.lock(),
        vec![(G, first, true), (G, first, false), (G, second, true)]
    );
}

/// A demotion mid-day puts the dead holder back into the evening draw.
#[tokio::test]
async fn demoted_holder_rejoins_the_pool() {
    let store = Arc::new(MemoryLedger::new());
    store
        .set_role_holder(G, RoleHolder { user: UserId(1), alive: false })
        .await
        .unwrap();

    let gateway = RecordingGateway::with_members(G, &[1]);
    let lottery = lottery_over(Arc::clone(&gateway), store, NOON, &[(1, 10)], 7);

    assert_eq!(lottery.rotate(G).await.unwrap(), UserId(1));
    // Granted without a revoke: the old holding was already dead.
    assert_eq!(*gateway.role_changes.lock(), vec![(G, UserId(1), true)]);
}
