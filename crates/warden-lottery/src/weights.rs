//! Pure lottery weight computation.
//!
//! `weight = (debt / (penalties + 1) + 1) × ln(1 + activity)` — yesterday's
//! point debt raises a candidate's odds, consumed penalties dampen it, and
//! the log keeps heavy grinders from dominating outright. A candidate with
//! zero activity weighs nothing.

use warden_core::types::MatchCounts;

/// Secondary-mode matches count at this fraction of a primary match.
const SECONDARY_MODE_FACTOR: f64 = 0.6;

/// Tertiary-mode matches count at this fraction of a primary match.
const TERTIARY_MODE_FACTOR: f64 = 0.3;

/// Blended activity from the three per-mode match counters.
pub fn activity_score(counts: MatchCounts) -> f64 {
    counts.primary as f64
        + SECONDARY_MODE_FACTOR * counts.secondary as f64
        + TERTIARY_MODE_FACTOR * counts.tertiary as f64
}

/// Lottery weight for one candidate.
///
/// `points_yesterday` and `zero_events_yesterday` come from the closed
/// moderation-day bucket; the `+ 1` in the divisor guards the zero case.
pub fn candidate_weight(points_yesterday: u64, zero_events_yesterday: u64, activity: f64) -> f64 {
    (points_yesterday as f64 / (zero_events_yesterday as f64 + 1.0) + 1.0) * (1.0 + activity).ln()
}
