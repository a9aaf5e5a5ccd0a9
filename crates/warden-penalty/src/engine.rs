//! The effectful penalty engine: ledger writes, roll draws, role
//! revocations, and the operator feedback loop.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use warden_core::constants::LIFT_FLAT_POINTS;
use warden_core::error::WardenError;
use warden_core::ledger::{PointLedger, TODAY};
use warden_core::traits::{ChatGateway, RoleStore};
use warden_core::types::{
    ChannelId, ModerationAction, OperatorAction, RoleHolder, SubjectId, UserId,
};

use crate::probability::evaluate;

/// Converts scored events into moderation outcomes.
///
/// The random source is injected as a closure so decisions replay
/// deterministically under test; production wiring draws from [`StdRng`].
pub struct PenaltyEngine {
    ledger: Arc<PointLedger>,
    roles: Arc<dyn RoleStore>,
    gateway: Arc<dyn ChatGateway>,
    roll: Mutex<Box<dyn FnMut() -> f64 + Send>>,
    /// The engine's own gateway account; its actions never feed back.
    self_account: UserId,
}

impl PenaltyEngine {
    /// Create an engine drawing rolls from an entropy-seeded [`StdRng`].
    pub fn new(
        ledger: Arc<PointLedger>,
        roles: Arc<dyn RoleStore>,
        gateway: Arc<dyn ChatGateway>,
        self_account: UserId,
    ) -> Self {
        let mut rng = StdRng::from_entropy();
        Self::with_roll_source(ledger, roles, gateway, self_account, move || {
            rng.gen_range(0.0..1.0)
        })
    }

    /// Create an engine with a custom roll source for testing.
    pub fn with_roll_source(
        ledger: Arc<PointLedger>,
        roles: Arc<dyn RoleStore>,
        gateway: Arc<dyn ChatGateway>,
        self_account: UserId,
        roll: impl FnMut() -> f64 + Send + 'static,
    ) -> Self {
        Self {
            ledger,
            roles,
            gateway,
            roll: Mutex::new(Box::new(roll)),
            self_account,
        }
    }

    /// Whether `user` currently holds the channel's privileged role and has
    /// not already been demoted.
    async fn is_privileged(&self, channel: ChannelId, user: UserId) -> Result<bool, WardenError> {
        Ok(matches!(
            self.roles.role_holder(channel).await?,
            Some(holder) if holder.alive && holder.user == user
        ))
    }

    /// Score one event and decide its outcome.
    ///
    /// Appends the event, compounds it with the subject's day total, draws
    /// the roll, and on a hit appends the compensating zero-point event
    /// (after the prior-mute count is read — the n-th mute of a day lasts
    /// n minutes). A demotion also revokes the role, exactly once.
    ///
    /// The returned [`ModerationAction::Mute`] is not executed here; the
    /// caller owns the gateway mute call.
    pub async fn decide(
        &self,
        channel: ChannelId,
        user: UserId,
        event_points: u32,
    ) -> Result<ModerationAction, WardenError> {
        let subject = SubjectId::new(channel, user);
        self.ledger.append(subject, event_points).await?;

        let total = self.ledger.sum_points(&subject, TODAY).await?;
        let privileged = self.is_privileged(channel, user).await?;
        let prior_mutes = self.ledger.count_zero_points(&subject, TODAY).await?;
        let roll = {
            let mut source = self.roll.lock();
            (*source)()
        };

        let action = evaluate(event_points, total, privileged, prior_mutes, roll);
        debug!(
            %subject,
            event_points,
            total,
            privileged,
            roll,
            ?action,
            "penalty decision"
        );

        if action != ModerationAction::None {
            // One consumed penalty for this moderation day.
            self.ledger.append(subject, 0).await?;
        }
        if action == ModerationAction::Demote {
            self.revoke(channel, user).await?;
        }
        Ok(action)
    }

    /// Review an externally observed human moderation action.
    ///
    /// The action's duration (or a flat 50 for a lift) is attributed as
    /// points to the issuing operator and runs through [`decide`](Self::decide).
    /// When the engine disagrees with a human mute, the original mute is
    /// lifted. Actions issued by the engine's own account are ignored.
    pub async fn review_operator_action(
        &self,
        action: OperatorAction,
    ) -> Result<ModerationAction, WardenError> {
        if action.operator == self.self_account {
            return Ok(ModerationAction::None);
        }

        let points = if action.is_lift() {
            LIFT_FLAT_POINTS
        } else {
            u32::try_from(action.duration_seconds).unwrap_or(u32::MAX)
        };

        let verdict = self.decide(action.channel, action.operator, points).await?;

        if verdict != ModerationAction::None && !action.is_lift() {
            info!(
                channel = %action.channel,
                operator = %action.operator,
                target = %action.target,
                "overriding human mute"
            );
            self.gateway.mute(action.channel, action.target, 0).await?;
        }
        Ok(verdict)
    }

    /// Revoke the privileged role exactly once: a holder already marked
    /// dead is left alone.
    async fn revoke(&self, channel: ChannelId, user: UserId) -> Result<(), WardenError> {
        match self.roles.role_holder(channel).await? {
            Some(holder) if holder.alive && holder.user == user => {
                self.gateway
                    .set_privileged_role(channel, user, false)
                    .await?;
                self.roles
                    .set_role_holder(channel, RoleHolder { user, alive: false })
                    .await?;
                info!(%channel, %user, "privileged role revoked");
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use warden_core::day::DayBoundary;
    use warden_core::error::{GatewayError, StoreError};
    use warden_core::traits::PointStore;
    use warden_core::types::{MemberInfo, PointEvent, Segment, TimeRange};

    const NOON: u64 = 1_609_588_800;
    const G: ChannelId = ChannelId(7);

    // ------------------------------------------------------------------
    // Mocks
    // ------------------------------------------------------------------

    #[derive(Default)]
    struct MemStore {
        events: Mutex<Vec<PointEvent>>,
    }

    #[async_trait]
    impl PointStore for MemStore {
        async fn append_event(&self, event: PointEvent) -> Result<(), StoreError> {
            self.events.lock().push(event);
            Ok(())
        }

        async fn sum_points(
            &self,
            subject: &SubjectId,
            range: TimeRange,
        ) -> Result<u64, StoreError> {
            Ok(self
                .events
                .lock()
                .iter()
                .filter(|e| e.subject == *subject && range.contains(e.timestamp))
                .map(|e| e.points as u64)
                .sum())
        }

        async fn count_events(
            &self,
            subject: &SubjectId,
            range: TimeRange,
            zero_only: bool,
        ) -> Result<u64, StoreError> {
            Ok(self
                .events
                .lock()
                .iter()
                .filter(|e| {
                    e.subject == *subject
                        && range.contains(e.timestamp)
                        && (!zero_only || e.is_compensating())
                })
                .count() as u64)
        }
    }

    #[derive(Default)]
    struct MemRoles {
        holders: Mutex<std::collections::HashMap<ChannelId, RoleHolder>>,
    }

    #[async_trait]
    impl RoleStore for MemRoles {
        async fn role_holder(&self, channel: ChannelId) -> Result<Option<RoleHolder>, StoreError> {
            Ok(self.holders.lock().get(&channel).copied())
        }

        async fn set_role_holder(
            &self,
            channel: ChannelId,
            holder: RoleHolder,
        ) -> Result<(), StoreError> {
            self.holders.lock().insert(channel, holder);
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemGateway {
        mutes: Mutex<Vec<(ChannelId, UserId, u64)>>,
        role_changes: Mutex<Vec<(ChannelId, UserId, bool)>>,
    }

    #[async_trait]
    impl ChatGateway for MemGateway {
        async fn send(&self, _: ChannelId, _: &[Segment]) -> Result<(), GatewayError> {
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

        async fn list_members(&self, _: ChannelId) -> Result<Vec<MemberInfo>, GatewayError> {
            Ok(vec![])
        }
    }

    struct Fixture {
        store: Arc<MemStore>,
        roles: Arc<MemRoles>,
        gateway: Arc<MemGateway>,
        engine: PenaltyEngine,
    }

    /// Engine over fixed clock and a constant roll.
    fn fixture(roll: f64) -> Fixture {
        let store = Arc::new(MemStore::default());
        let roles = Arc::new(MemRoles::default());
        let gateway = Arc::new(MemGateway::default());
        let ledger = Arc::new(PointLedger::with_clock(
            Arc::clone(&store) as Arc<dyn PointStore>,
            DayBoundary::new(4),
            move || NOON,
        ));
        let engine = PenaltyEngine::with_roll_source(
            ledger,
            Arc::clone(&roles) as Arc<dyn RoleStore>,
            Arc::clone(&gateway) as Arc<dyn ChatGateway>,
            UserId(0),
            move || roll,
        );
        Fixture { store, roles, gateway, engine }
    }

    #[tokio::test]
    async fn clean_roll_appends_event_only() {
        let f = fixture(0.999);
        let action = f.engine.decide(G, UserId(1), 3).await.unwrap();

        assert_eq!(action, ModerationAction::None);
        let events = f.store.events.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].points, 3);
    }

    #[tokio::test]
    async fn floor_roll_produces_one_minute_mute() {
        // p = max(0.02, tanh((9 − 50)/500)) = 0.02; a roll under the floor hits.
        let f = fixture(0.019);
        let action = f.engine.decide(G, UserId(1001), 3).await.unwrap();

        assert_eq!(action, ModerationAction::Mute { seconds: 60 });
        // Scored event plus compensating zero event.
        assert_eq!(f.store.events.lock().len(), 2);
        assert!(f.store.events.lock()[1].is_compensating());
    }

    #[tokio::test]
    async fn at_threshold_roll_misses() {
        let f = fixture(0.02);
        let action = f.engine.decide(G, UserId(1001), 3).await.unwrap();
        assert_eq!(action, ModerationAction::None);
        assert_eq!(f.store.events.lock().len(), 1);
    }

    #[tokio::test]
    async fn mute_durations_escalate_within_a_day() {
        let f = fixture(0.0);
        let user = UserId(5);

        for expected in [60, 120, 180] {
            let action = f.engine.decide(G, user, 100).await.unwrap();
            assert_eq!(action, ModerationAction::Mute { seconds: expected });
        }
    }

    #[tokio::test]
    async fn demotion_revokes_role_once() {
        let f = fixture(0.0);
        let holder = UserId(9);
        f.roles
            .set_role_holder(G, RoleHolder { user: holder, alive: true })
            .await
            .unwrap();

        let action = f.engine.decide(G, holder, 10_000).await.unwrap();
        assert_eq!(action, ModerationAction::Demote);
        assert_eq!(*f.gateway.role_changes.lock(), vec![(G, holder, false)]);
        assert_eq!(
            f.roles.role_holder(G).await.unwrap(),
            Some(RoleHolder { user: holder, alive: false })
        );

        // The dead holder is unprivileged now: the next hit is a mute, and
        // no second role change goes out.
        let action = f.engine.decide(G, holder, 10_000).await.unwrap();
        assert!(matches!(action, ModerationAction::Mute { .. }));
        assert_eq!(f.gateway.role_changes.lock().len(), 1);
    }

    #[tokio::test]
    async fn privileged_curve_shields_small_events() {
        // Same roll and points that mute an unprivileged subject leave the
        // alive holder untouched (privileged floor is 0).
        let f = fixture(0.019);
        let holder = UserId(9);
        f.roles
            .set_role_holder(G, RoleHolder { user: holder, alive: true })
            .await
            .unwrap();

        let action = f.engine.decide(G, holder, 3).await.unwrap();
        assert_eq!(action, ModerationAction::None);
    }

    #[tokio::test]
    async fn operator_lift_credits_flat_points() {
        // p = tanh((50·50 − 50)/500) ≈ 0.99989: a 0.9999 roll still misses.
        let f = fixture(0.9999);
        let action = OperatorAction {
            channel: G,
            target: UserId(2),
            operator: UserId(3),
            duration_seconds: 0,
        };

        let verdict = f.engine.review_operator_action(action).await.unwrap();
        assert_eq!(verdict, ModerationAction::None);

        let events = f.store.events.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].subject, SubjectId::new(G, UserId(3)));
        assert_eq!(events[0].points, LIFT_FLAT_POINTS);
    }

    #[tokio::test]
    async fn disagreeing_with_human_mute_lifts_it() {
        // duration 600s → 600 points on the operator; with roll 0 the
        // engine mutes the operator and reverses the original mute.
        let f = fixture(0.0);
        let action = OperatorAction {
            channel: G,
            target: UserId(2),
            operator: UserId(3),
            duration_seconds: 600,
        };

        let verdict = f.engine.review_operator_action(action).await.unwrap();
        assert_eq!(verdict, ModerationAction::Mute { seconds: 60 });
        assert_eq!(*f.gateway.mutes.lock(), vec![(G, UserId(2), 0)]);
    }

    #[tokio::test]
    async fn disagreeing_with_a_lift_does_not_remute() {
        let f = fixture(0.0);
        let action = OperatorAction {
            channel: G,
            target: UserId(2),
            operator: UserId(3),
            duration_seconds: 0,
        };

        let verdict = f.engine.review_operator_action(action).await.unwrap();
        assert!(matches!(verdict, ModerationAction::Mute { .. }));
        assert!(f.gateway.mutes.lock().is_empty());
    }

    #[tokio::test]
    async fn own_account_actions_are_ignored() {
        let f = fixture(0.0);
        let action = OperatorAction {
            channel: G,
            target: UserId(2),
            operator: UserId(0), // the engine's own account
            duration_seconds: 600,
        };

        let verdict = f.engine.review_operator_action(action).await.unwrap();
        assert_eq!(verdict, ModerationAction::None);
        assert!(f.store.events.lock().is_empty());
        assert!(f.gateway.mutes.lock().is_empty());
    }
}
