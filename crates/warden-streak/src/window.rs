//! The per-channel streak window state machine.
//!
//! Invariant: the window holds at most one entry, or every entry shares one
//! fingerprint. Only [`StreakWindow::apply`] mutates the window.

use warden_core::types::{Fingerprint, Message, UserId};

/// One tracked message inside a streak window.
#[derive(Debug, Clone)]
pub struct WindowEntry {
    pub author: UserId,
    pub message: Message,
    pub fingerprint: Fingerprint,
}

/// Result of applying one message to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The author already sat in the window with this fingerprint; the
    /// window is unchanged.
    SelfRepeat,
    /// The message matched the active fingerprint and joined the streak.
    Extended { len: usize },
    /// The message broke the streak (or opened a fresh window) and is now
    /// the sole entry.
    Restarted,
}

/// A channel's run of consecutive same-fingerprint messages.
#[derive(Debug, Clone, Default)]
pub struct StreakWindow {
    entries: Vec<WindowEntry>,
    /// Callout target of the message that seeded the current streak, if the
    /// seed was a recognized callout.
    seed_callout: Option<UserId>,
}

impl StreakWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The fingerprint shared by every entry, if any entry exists.
    pub fn fingerprint(&self) -> Option<Fingerprint> {
        self.entries.first().map(|e| e.fingerprint)
    }

    pub fn contains_author(&self, author: UserId) -> bool {
        self.entries.iter().any(|e| e.author == author)
    }

    /// Callout target of the streak's seed message, if any.
    pub fn seed_callout(&self) -> Option<UserId> {
        self.seed_callout
    }

    /// Apply one message to the window.
    ///
    /// `callout` is the message's own callout target (if it is one); it is
    /// recorded as the streak seed only when this message restarts the
    /// window.
    pub fn apply(
        &mut self,
        author: UserId,
        message: Message,
        fingerprint: Fingerprint,
        callout: Option<UserId>,
    ) -> Transition {
        let active = self.fingerprint();

        // Self-repeat guard: an author cannot manufacture an echo alone.
        if active == Some(fingerprint) && self.contains_author(author) {
            return Transition::SelfRepeat;
        }

        let entry = WindowEntry { author, message, fingerprint };

        if active == Some(fingerprint) {
            self.entries.push(entry);
            Transition::Extended { len: self.entries.len() }
        } else {
            // Streak broken (or first message ever): fresh start.
            self.entries.clear();
            self.entries.push(entry);
            self.seed_callout = callout;
            Transition::Restarted
        }
    }

    /// Invariant check: length ≤ 1 or a single shared fingerprint.
    pub fn is_coherent(&self) -> bool {
        match self.entries.first() {
            None => true,
            Some(first) => self.entries.iter().all(|e| e.fingerprint == first.fingerprint),
        }
    }
}
