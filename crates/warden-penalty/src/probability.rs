//! Penalty probability curves and the pure decision function.
//!
//! Unprivileged subjects ride `max(0.02, tanh((points − 50) / 500))`: every
//! scored event carries at least a 2% chance, saturating towards 1 as points
//! accumulate. Privileged subjects get a 100× softer curve with no floor —
//! `max(0, tanh((points / 100 − 50) / 500))` — so a role holder only decays
//! under sustained infractions.

use warden_core::constants::{MUTE_STEP_SECONDS, UNPRIVILEGED_PROBABILITY_FLOOR};
use warden_core::types::ModerationAction;

/// Curve midpoint: points at which the raw tanh crosses zero.
const CURVE_MIDPOINT: f64 = 50.0;

/// Curve slope divisor: larger values flatten the ramp.
const CURVE_SLOPE: f64 = 500.0;

/// Point-scale divisor applied to privileged subjects before the curve.
const PRIVILEGED_POINT_SCALE: f64 = 100.0;

/// Mute/demotion probability for a given effective point mass.
///
/// Monotonically non-decreasing in `points`, floored at 0.02 for
/// unprivileged subjects and at 0 for privileged ones.
///
/// # Examples
///
/// ```
/// use warden_penalty::mute_probability;
///
/// // Below the midpoint the floor applies.
/// assert_eq!(mute_probability(0.0, false), 0.02);
/// assert_eq!(mute_probability(0.0, true), 0.0);
/// // tanh(1) at 550 effective points.
/// assert!((mute_probability(550.0, false) - 0.761594).abs() < 1e-6);
/// ```
pub fn mute_probability(points: f64, privileged: bool) -> f64 {
    if privileged {
        ((points / PRIVILEGED_POINT_SCALE - CURVE_MIDPOINT) / CURVE_SLOPE)
            .tanh()
            .max(0.0)
    } else {
        ((points - CURVE_MIDPOINT) / CURVE_SLOPE)
            .tanh()
            .max(UNPRIVILEGED_PROBABILITY_FLOOR)
    }
}

/// Pure penalty decision for one scored event.
///
/// `roll` is the uniform draw in `[0, 1)`; the caller owns the random
/// source. The effective point mass is `event_points × day_total` — the
/// multiplicative escalation is intentional. The n-th mute within one
/// moderation day lasts n minutes, so `prior_mutes_today` feeds straight
/// into the duration.
pub fn evaluate(
    event_points: u32,
    day_total: u64,
    privileged: bool,
    prior_mutes_today: u64,
    roll: f64,
) -> ModerationAction {
    let effective = event_points as f64 * day_total as f64;
    let p = mute_probability(effective, privileged);

    if roll >= p {
        return ModerationAction::None;
    }
    if privileged {
        ModerationAction::Demote
    } else {
        ModerationAction::Mute {
            seconds: (prior_mutes_today + 1) * MUTE_STEP_SECONDS,
        }
    }
}
