//! # warden-lottery — Debt-weighted privileged-role rotation.
//!
//! Candidates are weighted by yesterday's infraction debt damped by prior
//! penalties, scaled by a log of external activity. The draw itself is pure
//! over an injected rng; [`lottery::RoleLottery`] performs the gateway and
//! store effects around it.

pub mod lottery;
pub mod weights;

pub use lottery::{draw_weighted, RoleLottery};
pub use weights::{activity_score, candidate_weight};
