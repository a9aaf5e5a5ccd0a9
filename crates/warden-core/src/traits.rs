//! Trait interfaces for the Warden engine's external collaborators:
//! - [`ChatGateway`] — message send, mute, role changes, member list
//! - [`PointStore`] — durable append-only point events with range aggregates
//! - [`RoleStore`] — persisted privileged-role holder per channel
//! - [`MediaFetcher`] — image resource resolution for fingerprinting
//! - [`ActivityProvider`] — per-mode match counters for lottery weights
//!
//! All calls suspend at I/O; implementations are expected to honor caller
//! timeouts and surface failures as typed errors (never panic, never hang).

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{GatewayError, MediaError, StoreError};
use crate::types::{
    ChannelId, MatchCounts, MemberInfo, PointEvent, RoleHolder, Segment, SubjectId, TimeRange,
    UserId,
};

/// Outbound chat effects. Implemented by the surrounding application's
/// transport layer; Warden never sees the wire protocol.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Post segments to a channel.
    async fn send(&self, channel: ChannelId, segments: &[Segment]) -> Result<(), GatewayError>;

    /// Silence a member for `seconds`. Zero seconds lifts an active mute.
    async fn mute(
        &self,
        channel: ChannelId,
        user: UserId,
        seconds: u64,
    ) -> Result<(), GatewayError>;

    /// Grant or revoke the channel's privileged role.
    async fn set_privileged_role(
        &self,
        channel: ChannelId,
        user: UserId,
        enabled: bool,
    ) -> Result<(), GatewayError>;

    /// Current channel membership.
    async fn list_members(&self, channel: ChannelId) -> Result<Vec<MemberInfo>, GatewayError>;
}

/// Durable append-only event storage with bucket aggregates.
///
/// Append is non-idempotent by design: duplicate legitimate events are
/// expected and each one counts. Aggregates rely on the store's own
/// atomicity; exact linearizability is not required.
#[async_trait]
pub trait PointStore: Send + Sync {
    async fn append_event(&self, event: PointEvent) -> Result<(), StoreError>;

    /// Sum of points over `[range.start, range.end)`.
    async fn sum_points(&self, subject: &SubjectId, range: TimeRange) -> Result<u64, StoreError>;

    /// Number of events in the range; with `zero_only`, only compensating
    /// (zero-point) events are counted.
    async fn count_events(
        &self,
        subject: &SubjectId,
        range: TimeRange,
        zero_only: bool,
    ) -> Result<u64, StoreError>;
}

/// Persisted privileged-role state, shared between the lottery (grant) and
/// the penalty engine (revoke-on-demotion).
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn role_holder(&self, channel: ChannelId) -> Result<Option<RoleHolder>, StoreError>;

    async fn set_role_holder(
        &self,
        channel: ChannelId,
        holder: RoleHolder,
    ) -> Result<(), StoreError>;
}

/// Resolves an image resource reference to its raw bytes.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch(&self, resource: &str) -> Result<Bytes, MediaError>;
}

/// External per-mode match counters feeding the lottery activity score.
#[async_trait]
pub trait ActivityProvider: Send + Sync {
    async fn match_counts(&self, user: UserId) -> Result<MatchCounts, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    // ------------------------------------------------------------------
    // Mock: ChatGateway
    // ------------------------------------------------------------------

    #[derive(Default)]
    struct MockGateway {
        sent: Mutex<Vec<(ChannelId, Vec<Segment>)>>,
        mutes: Mutex<Vec<(ChannelId, UserId, u64)>>,
        members: Vec<MemberInfo>,
    }

    #[async_trait]
    impl ChatGateway for MockGateway {
        async fn send(
            &self,
            channel: ChannelId,
            segments: &[Segment],
        ) -> Result<(), GatewayError> {
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
            _channel: ChannelId,
            _user: UserId,
            _enabled: bool,
        ) -> Result<(), GatewayError> {
            Ok(())
        }

        async fn list_members(
            &self,
            _channel: ChannelId,
        ) -> Result<Vec<MemberInfo>, GatewayError> {
            Ok(self.members.clone())
        }
    }

    // ------------------------------------------------------------------
    // Mock: PointStore
    // ------------------------------------------------------------------

    #[derive(Default)]
    struct MockStore {
        events: Mutex<Vec<PointEvent>>,
    }

    #[async_trait]
    impl PointStore for MockStore {
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

    // ------------------------------------------------------------------
    // Object safety: verify each trait is dyn-compatible
    // ------------------------------------------------------------------

    fn _assert_gateway_object_safe(_: &dyn ChatGateway) {}
    fn _assert_point_store_object_safe(_: &dyn PointStore) {}
    fn _assert_role_store_object_safe(_: &dyn RoleStore) {}
    fn _assert_media_fetcher_object_safe(_: &dyn MediaFetcher) {}
    fn _assert_activity_provider_object_safe(_: &dyn ActivityProvider) {}

    // ------------------------------------------------------------------
    // Behavior through the trait objects
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn gateway_records_sends_and_mutes() {
        let gateway = MockGateway::default();
        let channel = ChannelId(10);

        gateway
            .send(channel, &[Segment::Text("hello".into())])
            .await
            .unwrap();
        gateway.mute(channel, UserId(4), 120).await.unwrap();

        assert_eq!(gateway.sent.lock().len(), 1);
        assert_eq!(gateway.mutes.lock()[0], (channel, UserId(4), 120));
    }

    #[tokio::test]
    async fn store_sum_respects_subject_and_range() {
        let store = MockStore::default();
        let a = SubjectId::new(ChannelId(1), UserId(1));
        let b = SubjectId::new(ChannelId(1), UserId(2));

        for (subject, ts, points) in [(a, 100, 3), (a, 150, 2), (a, 300, 9), (b, 120, 7)] {
            store
                .append_event(PointEvent { subject, timestamp: ts, points })
                .await
                .unwrap();
        }

        let range = TimeRange { start: 100, end: 200 };
        assert_eq!(store.sum_points(&a, range).await.unwrap(), 5);
        assert_eq!(store.sum_points(&b, range).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn store_zero_count_ignores_scored_events() {
        let store = MockStore::default();
        let subject = SubjectId::new(ChannelId(1), UserId(1));
        let range = TimeRange { start: 0, end: 1_000 };

        for points in [3, 0, 5, 0, 0] {
            store
                .append_event(PointEvent { subject, timestamp: 10, points })
                .await
                .unwrap();
        }

        assert_eq!(store.count_events(&subject, range, true).await.unwrap(), 3);
        assert_eq!(store.count_events(&subject, range, false).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn gateway_as_dyn() {
        let gateway = MockGateway::default();
        let dyn_gateway: &dyn ChatGateway = &gateway;
        assert!(dyn_gateway.list_members(ChannelId(1)).await.unwrap().is_empty());
    }
}
