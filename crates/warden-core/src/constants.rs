//! Engine constants. Points are dimensionless infraction units.

/// Flat penalty for an author resubmitting their own fingerprint while it is
/// still the active streak.
pub const SELF_REPEAT_PENALTY: u32 = 5;

/// Flat penalty awarded to the author of a recognized callout message.
pub const CALLOUT_PENALTY: u32 = 5;

/// Per-message streak points are capped here regardless of streak length.
pub const STREAK_POINT_CAP: u32 = 3;

/// Window length at which the echo repost fires. Fires exactly on the
/// transition to this length, never again for the same streak.
pub const ECHO_TRIGGER_LEN: usize = 3;

/// Points attributed to an operator for lifting a mute (an unmute carries no
/// duration of its own).
pub const LIFT_FLAT_POINTS: u32 = 50;

/// Mute applied to a called-out user once the community confirms the callout
/// by echoing it.
pub const CONFIRMED_CALLOUT_MUTE_SECONDS: u64 = 60;

/// Mute durations escalate in steps of one minute per prior mute within the
/// same moderation day.
pub const MUTE_STEP_SECONDS: u64 = 60;

/// Probability floor for unprivileged subjects. Every scored event carries at
/// least this mute chance.
pub const UNPRIVILEGED_PROBABILITY_FLOOR: f64 = 0.02;

pub const SECONDS_PER_HOUR: u64 = 3_600;
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Default moderation-day anchor: 04:00 UTC, so an evening of chat is never
/// split across two accounting buckets.
///
/// # Examples
///
/// ```
/// use warden_core::constants::DEFAULT_DAY_ANCHOR_HOUR;
/// assert!(DEFAULT_DAY_ANCHOR_HOUR < 24);
/// ```
pub const DEFAULT_DAY_ANCHOR_HOUR: u32 = 4;

/// Default timeout applied to every gateway, store, and media call.
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 10;
