//! # warden-streak — Per-channel duplicate and echo detection.
//!
//! A streak is a run of consecutive messages sharing one content
//! fingerprint. The window state machine enforces:
//! - an author cannot grow a streak by repeating themselves (flat penalty
//!   instead),
//! - a mismatched fingerprint restarts the window at the new message,
//! - the echo repost fires exactly when a streak reaches three entries.
//!
//! Windows live in memory only; a restart loses in-flight streaks by
//! intent. The tracker performs no I/O — callers execute the returned
//! [`StreakOutcome`](tracker::StreakOutcome).

pub mod tracker;
pub mod window;

pub use tracker::{StreakOutcome, StreakTracker};
pub use window::{StreakWindow, Transition};
