//! The streak tracker: owned per-channel windows plus callout recognition.
//!
//! Channels are independent; each window transition runs under that
//! channel's map entry lock with no I/O inside, so channels never serialize
//! on each other and the lock is released on every exit path.

use std::collections::HashSet;

use dashmap::DashMap;
use tracing::debug;

use warden_core::constants::{
    CALLOUT_PENALTY, ECHO_TRIGGER_LEN, SELF_REPEAT_PENALTY, STREAK_POINT_CAP,
};
use warden_core::types::{ChannelId, Fingerprint, Message, UserId};

use crate::window::{StreakWindow, Transition};

/// What one observed message earned and triggered. Pure data — the caller
/// executes the effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreakOutcome {
    /// Points from the window transition: `min(3, len - 1)` on a match,
    /// the flat self-repeat penalty, 0 on a restart.
    pub streak_points: u32,
    /// Flat callout penalty when the message itself is a callout.
    pub callout_points: u32,
    /// The message to repost verbatim when the streak reached the echo
    /// trigger length on this transition.
    pub echo: Option<Message>,
    /// The called-out user to mute: set only when the echo fired and the
    /// streak was seeded by a callout (community-confirmed consensus).
    pub confirmed_callout: Option<UserId>,
}

impl StreakOutcome {
    /// Total points to award the message author for this transition.
    pub fn total_points(&self) -> u32 {
        self.streak_points + self.callout_points
    }
}

/// Per-channel duplicate/echo detection over owned windows.
pub struct StreakTracker {
    windows: DashMap<ChannelId, StreakWindow>,
    /// Normalized trigger phrases recognized as callouts.
    callout_tokens: HashSet<String>,
}

impl StreakTracker {
    pub fn new(callout_tokens: impl IntoIterator<Item = String>) -> Self {
        Self {
            windows: DashMap::new(),
            callout_tokens: callout_tokens
                .into_iter()
                .map(|token| normalize(&token))
                .collect(),
        }
    }

    /// The callout target of a message: its normalized plain text must be a
    /// recognized token and it must mention exactly one user.
    pub fn callout_target(&self, message: &Message) -> Option<UserId> {
        if self.callout_tokens.is_empty() {
            return None;
        }
        let text = normalize(&message.plain_text());
        if !self.callout_tokens.contains(&text) {
            return None;
        }
        match message.mentions().as_slice() {
            [target] => Some(*target),
            _ => None,
        }
    }

    /// Run one message through its channel's window.
    pub fn observe(&self, message: &Message, fingerprint: Fingerprint) -> StreakOutcome {
        let callout = self.callout_target(message);
        let mut window = self.windows.entry(message.channel).or_default();
        let transition = window.apply(message.author, message.clone(), fingerprint, callout);

        let (streak_points, echo_fired) = match transition {
            Transition::SelfRepeat => (SELF_REPEAT_PENALTY, false),
            Transition::Restarted => (0, false),
            Transition::Extended { len } => {
                let points = ((len - 1) as u32).min(STREAK_POINT_CAP);
                (points, len == ECHO_TRIGGER_LEN)
            }
        };

        let confirmed_callout = if echo_fired { window.seed_callout() } else { None };
        drop(window);

        if echo_fired {
            debug!(
                channel = %message.channel,
                fingerprint = %fingerprint,
                "streak reached echo length"
            );
        }

        StreakOutcome {
            streak_points,
            callout_points: if callout.is_some() { CALLOUT_PENALTY } else { 0 },
            echo: echo_fired.then(|| message.clone()),
            confirmed_callout,
        }
    }

    /// Current window length for a channel. Zero when untracked.
    pub fn window_len(&self, channel: ChannelId) -> usize {
        self.windows.get(&channel).map_or(0, |w| w.len())
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
