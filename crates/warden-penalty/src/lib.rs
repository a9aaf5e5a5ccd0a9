//! # warden-penalty — Probabilistic mute/demotion decisions.
//!
//! The decision is split in two, so tests stay deterministic:
//! - [`probability`] and [`probability::evaluate`] are pure — the random
//!   roll is a parameter,
//! - [`engine::PenaltyEngine`] draws the roll, writes the ledger, and
//!   executes role revocations.
//!
//! Escalation is multiplicative by intent: the newest event's weight
//! compounds with the subject's running day total.

pub mod engine;
pub mod probability;

pub use engine::PenaltyEngine;
pub use probability::{evaluate, mute_probability};
