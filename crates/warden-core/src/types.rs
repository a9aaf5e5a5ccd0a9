//! Core data types: messages, fingerprints, point events, role state.
//!
//! All timestamps are Unix seconds (u64). Point values are dimensionless
//! infraction units (u32 per event, u64 aggregates).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SubjectError;

/// A group channel identifier, assigned by the chat platform.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
    bincode::Encode, bincode::Decode,
)]
pub struct ChannelId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A chat participant identifier, assigned by the chat platform.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
    bincode::Encode, bincode::Decode,
)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ledger accounting key: one subject per (channel, user) pair.
///
/// The wire form is `"{channel}_{user}"` and round-trips through
/// [`FromStr`]/[`Display`].
///
/// # Examples
///
/// ```
/// use warden_core::types::{ChannelId, SubjectId, UserId};
///
/// let subject = SubjectId::new(ChannelId(77), UserId(1001));
/// assert_eq!(subject.to_string(), "77_1001");
/// assert_eq!("77_1001".parse::<SubjectId>().unwrap(), subject);
/// ```
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
    bincode::Encode, bincode::Decode,
)]
pub struct SubjectId {
    pub channel: ChannelId,
    pub user: UserId,
}

impl SubjectId {
    pub fn new(channel: ChannelId, user: UserId) -> Self {
        Self { channel, user }
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.channel, self.user)
    }
}

impl FromStr for SubjectId {
    type Err = SubjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (channel, user) = s
            .split_once('_')
            .ok_or_else(|| SubjectError::Malformed(s.to_string()))?;
        let channel = channel
            .parse::<u64>()
            .map_err(|_| SubjectError::Malformed(s.to_string()))?;
        let user = user
            .parse::<u64>()
            .map_err(|_| SubjectError::Malformed(s.to_string()))?;
        Ok(Self::new(ChannelId(channel), UserId(user)))
    }
}

/// One ordered piece of a chat message.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    /// Plain text content.
    Text(String),
    /// An @-mention of another participant.
    Mention(UserId),
    /// A platform sticker, identified by its catalogue id.
    Sticker(u64),
    /// An image, identified by an opaque resource reference the media
    /// fetcher can resolve to bytes.
    Image(String),
}

/// An inbound chat message: author, channel, and ordered segments.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub channel: ChannelId,
    pub author: UserId,
    pub segments: Vec<Segment>,
}

impl Message {
    /// Convenience constructor for a single-text-segment message.
    pub fn text(channel: ChannelId, author: UserId, text: impl Into<String>) -> Self {
        Self {
            channel,
            author,
            segments: vec![Segment::Text(text.into())],
        }
    }

    /// Concatenated content of all text segments, in order.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            if let Segment::Text(text) = segment {
                out.push_str(text);
            }
        }
        out
    }

    /// All mentioned users, in segment order.
    pub fn mentions(&self) -> Vec<UserId> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Mention(user) => Some(*user),
                _ => None,
            })
            .collect()
    }
}

/// A 32-byte content digest. Two messages with identical ordered segments
/// (including byte-identical image content) always share a fingerprint.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    /// The zero fingerprint. Only meaningful as a test placeholder.
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl From<[u8; 32]> for Fingerprint {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// An immutable, append-only ledger entry. Never mutated or deleted;
/// duplicate legitimate events are expected and counted individually.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct PointEvent {
    pub subject: SubjectId,
    /// Unix seconds at append time.
    pub timestamp: u64,
    pub points: u32,
}

impl PointEvent {
    /// Zero-point events mark a consumed penalty (one mute or demotion)
    /// within the moderation day.
    pub fn is_compensating(&self) -> bool {
        self.points == 0
    }
}

/// Persisted privileged-role state for a channel.
///
/// `alive` flips to false when the penalty engine revokes the role, which
/// guards an already-demoted holder from a second demotion.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct RoleHolder {
    pub user: UserId,
    pub alive: bool,
}

/// A channel member as reported by the gateway.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemberInfo {
    pub user: UserId,
    pub is_bot: bool,
}

/// Per-mode match counters from the external stat tracker, used as the
/// activity input to lottery weights.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchCounts {
    pub primary: u64,
    pub secondary: u64,
    pub tertiary: u64,
}

/// Outcome of a penalty decision.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModerationAction {
    /// The draw came up clean; nothing to execute.
    None,
    /// Silence the subject for this many seconds.
    Mute { seconds: u64 },
    /// Strip the subject's privileged role.
    Demote,
}

/// An externally observed human moderation action from the gateway's event
/// stream. `duration_seconds == 0` means the action lifted a mute.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperatorAction {
    pub channel: ChannelId,
    pub target: UserId,
    pub operator: UserId,
    pub duration_seconds: u64,
}

impl OperatorAction {
    pub fn is_lift(&self) -> bool {
        self.duration_seconds == 0
    }
}

/// A half-open `[start, end)` range of Unix seconds.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeRange {
    pub start: u64,
    pub end: u64,
}

impl TimeRange {
    pub fn contains(&self, timestamp: u64) -> bool {
        timestamp >= self.start && timestamp < self.end
    }
}
