//! The role rotation lottery: candidate gathering, the weighted draw, and
//! the grant/revoke/announce effect sequence.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use warden_core::error::{LotteryError, WardenError};
use warden_core::ledger::{PointLedger, YESTERDAY};
use warden_core::traits::{ActivityProvider, ChatGateway, RoleStore};
use warden_core::types::{ChannelId, RoleHolder, Segment, SubjectId, UserId};

use crate::weights::{activity_score, candidate_weight};

/// Weighted draw of one winner.
///
/// Returns `None` for an empty slate. A zero total weight falls back to a
/// uniform draw — the caller is expected to have logged the condition.
pub fn draw_weighted(weights: &[(UserId, f64)], rng: &mut impl Rng) -> Option<UserId> {
    if weights.is_empty() {
        return None;
    }
    let total: f64 = weights.iter().map(|(_, w)| w).sum();
    if total <= 0.0 {
        return Some(weights[rng.gen_range(0..weights.len())].0);
    }

    let mut target = rng.gen_range(0.0..total);
    for (user, weight) in weights {
        if target < *weight {
            return Some(*user);
        }
        target -= weight;
    }
    // Float summation slack lands on the last candidate.
    weights.last().map(|(user, _)| *user)
}

/// Rotates the privileged role via a debt-weighted lottery.
pub struct RoleLottery {
    gateway: Arc<dyn ChatGateway>,
    ledger: Arc<PointLedger>,
    roles: Arc<dyn RoleStore>,
    activity: Arc<dyn ActivityProvider>,
    rng: Mutex<StdRng>,
}

impl RoleLottery {
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        ledger: Arc<PointLedger>,
        roles: Arc<dyn RoleStore>,
        activity: Arc<dyn ActivityProvider>,
    ) -> Self {
        Self::with_rng(gateway, ledger, roles, activity, StdRng::from_entropy())
    }

    /// Create a lottery with a seeded rng for testing.
    pub fn with_rng(
        gateway: Arc<dyn ChatGateway>,
        ledger: Arc<PointLedger>,
        roles: Arc<dyn RoleStore>,
        activity: Arc<dyn ActivityProvider>,
        rng: StdRng,
    ) -> Self {
        Self { gateway, ledger, roles, activity, rng: Mutex::new(rng) }
    }

    /// Run one rotation for a channel.
    ///
    /// Revokes the previous alive holder, grants the role to the drawn
    /// winner, persists the new holder, and announces the computed weights.
    /// An empty candidate slate is a typed no-op signal.
    pub async fn rotate(&self, channel: ChannelId) -> Result<UserId, WardenError> {
        let members = self.gateway.list_members(channel).await?;
        let previous = self.roles.role_holder(channel).await?;

        let candidates: Vec<UserId> = members
            .iter()
            .filter(|m| !m.is_bot)
            .map(|m| m.user)
            .filter(|user| !matches!(previous, Some(h) if h.alive && h.user == *user))
            .collect();
        if candidates.is_empty() {
            return Err(LotteryError::NoCandidates.into());
        }

        let mut weights = Vec::with_capacity(candidates.len());
        for user in candidates {
            let subject = SubjectId::new(channel, user);
            let debt = self.ledger.sum_points(&subject, YESTERDAY).await?;
            let penalties = self.ledger.count_zero_points(&subject, YESTERDAY).await?;
            let counts = self.activity.match_counts(user).await?;
            weights.push((user, candidate_weight(debt, penalties, activity_score(counts))));
        }

        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        if total <= 0.0 {
            warn!(
                %channel,
                error = %LotteryError::ZeroTotalWeight(weights.len()),
                "uniform fallback draw"
            );
        }
        let winner = draw_weighted(&weights, &mut *self.rng.lock())
            .expect("candidate slate checked non-empty");

        if let Some(holder) = previous {
            if holder.alive {
                self.gateway
                    .set_privileged_role(channel, holder.user, false)
                    .await?;
            }
        }
        self.gateway
            .set_privileged_role(channel, winner, true)
            .await?;
        self.roles
            .set_role_holder(channel, RoleHolder { user: winner, alive: true })
            .await?;
        self.gateway
            .send(channel, &announcement(winner, &weights))
            .await?;

        info!(%channel, %winner, "privileged role rotated");
        Ok(winner)
    }
}

/// The rotation announcement: winner mention plus the weight table.
fn announcement(winner: UserId, weights: &[(UserId, f64)]) -> Vec<Segment> {
    let mut table = String::from(" holds the privileged role today.\nweights:");
    for (user, weight) in weights {
        table.push_str(&format!("\n  {user}: {weight:.2}"));
    }
    vec![Segment::Mention(winner), Segment::Text(table)]
}
