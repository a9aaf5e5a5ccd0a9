//! The inbound moderation pipeline.
//!
//! One message flows fingerprint → streak transition → penalty decision →
//! gateway effects. Every external call runs under the configured timeout,
//! and any transient failure skips the moderation effect for that message —
//! fail-open, this is not an access-control boundary. A failure in one
//! channel never touches another channel's state.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use warden_core::constants::CONFIRMED_CALLOUT_MUTE_SECONDS;
use warden_core::error::{GatewayError, MediaError, StoreError, WardenError};
use warden_core::fingerprint::fingerprint_message;
use warden_core::ledger::PointLedger;
use warden_core::traits::{ChatGateway, MediaFetcher, PointStore, RoleStore};
use warden_core::types::{Message, ModerationAction, OperatorAction};
use warden_penalty::PenaltyEngine;
use warden_streak::StreakTracker;

use crate::config::WardenConfig;

/// Composes the streak tracker and penalty engine over the collaborator
/// seams.
pub struct Moderator {
    gateway: Arc<dyn ChatGateway>,
    media: Arc<dyn MediaFetcher>,
    streaks: StreakTracker,
    penalty: PenaltyEngine,
    call_timeout: Duration,
}

impl Moderator {
    /// Production wiring from configuration and stores.
    pub fn new(
        config: &WardenConfig,
        gateway: Arc<dyn ChatGateway>,
        media: Arc<dyn MediaFetcher>,
        points: Arc<dyn PointStore>,
        roles: Arc<dyn RoleStore>,
    ) -> Self {
        let ledger = Arc::new(PointLedger::new(points, config.day_boundary()));
        let penalty = PenaltyEngine::new(
            ledger,
            roles,
            Arc::clone(&gateway),
            config.self_account,
        );
        Self::from_parts(
            gateway,
            media,
            StreakTracker::new(config.callout_tokens.iter().cloned()),
            penalty,
            config.call_timeout,
        )
    }

    /// Assemble from pre-built parts. Lets tests inject a seeded penalty
    /// engine and a fixed clock.
    pub fn from_parts(
        gateway: Arc<dyn ChatGateway>,
        media: Arc<dyn MediaFetcher>,
        streaks: StreakTracker,
        penalty: PenaltyEngine,
        call_timeout: Duration,
    ) -> Self {
        Self { gateway, media, streaks, penalty, call_timeout }
    }

    /// Run one message through the pipeline, surfacing any failure.
    pub async fn handle_message(
        &self,
        message: &Message,
    ) -> Result<ModerationAction, WardenError> {
        let fingerprint = self
            .with_timeout(
                fingerprint_message(message, &*self.media),
                MediaError::Timeout(format!("message in channel {}", message.channel)).into(),
            )
            .await?;

        let outcome = self.streaks.observe(message, fingerprint);

        if let Some(echo) = &outcome.echo {
            self.with_timeout(
                self.gateway.send(message.channel, &echo.segments),
                GatewayError::Timeout.into(),
            )
            .await?;
        }
        if let Some(target) = outcome.confirmed_callout {
            self.with_timeout(
                self.gateway
                    .mute(message.channel, target, CONFIRMED_CALLOUT_MUTE_SECONDS),
                GatewayError::Timeout.into(),
            )
            .await?;
        }

        // Zero-point transitions never reach the decision engine: the
        // compensating zero event is reserved for consumed penalties.
        let points = outcome.total_points();
        if points == 0 {
            return Ok(ModerationAction::None);
        }

        let action = self
            .with_timeout(
                self.penalty.decide(message.channel, message.author, points),
                StoreError::Timeout.into(),
            )
            .await?;

        if let ModerationAction::Mute { seconds } = action {
            self.with_timeout(
                self.gateway.mute(message.channel, message.author, seconds),
                GatewayError::Timeout.into(),
            )
            .await?;
        }
        Ok(action)
    }

    /// Fail-open wrapper around [`handle_message`](Self::handle_message):
    /// failures are logged and the message goes unmoderated.
    pub async fn process_message(&self, message: &Message) -> ModerationAction {
        match self.handle_message(message).await {
            Ok(action) => action,
            Err(error) => {
                warn!(
                    channel = %message.channel,
                    author = %message.author,
                    %error,
                    "moderation skipped"
                );
                ModerationAction::None
            }
        }
    }

    /// Review one externally observed operator action and execute the
    /// resulting mute, if any.
    pub async fn handle_operator_action(
        &self,
        action: OperatorAction,
    ) -> Result<ModerationAction, WardenError> {
        let verdict = self
            .with_timeout(
                self.penalty.review_operator_action(action),
                StoreError::Timeout.into(),
            )
            .await?;

        if let ModerationAction::Mute { seconds } = verdict {
            self.with_timeout(
                self.gateway.mute(action.channel, action.operator, seconds),
                GatewayError::Timeout.into(),
            )
            .await?;
        }
        Ok(verdict)
    }

    /// Drain the gateway's operator-action stream until it closes.
    pub async fn run_operator_loop(&self, mut actions: mpsc::UnboundedReceiver<OperatorAction>) {
        while let Some(action) = actions.recv().await {
            debug!(
                channel = %action.channel,
                operator = %action.operator,
                "operator action observed"
            );
            if let Err(error) = self.handle_operator_action(action).await {
                warn!(channel = %action.channel, %error, "operator review skipped");
            }
        }
    }

    async fn with_timeout<T, E>(
        &self,
        call: impl Future<Output = Result<T, E>>,
        on_timeout: WardenError,
    ) -> Result<T, WardenError>
    where
        E: Into<WardenError>,
    {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => Err(on_timeout),
        }
    }
}
