//! Home/draw/away distribution.
//!
//! Model:
//!   - `strength = attack*0.4 + defense*0.3 + form*0.3`, home side scaled by
//!     the home-advantage multiplier;
//!   - strength shares biased by the head-to-head home win rate (±10 points);
//!   - every raw component clamped to 5..=95 so no outcome is certain or
//!     impossible, then normalized to integers summing to exactly 100.

use super::types::{HeadToHeadRecord, TeamProfile, WinnerProbability};

const ATTACK_WEIGHT: f64 = 0.4;
const DEFENSE_WEIGHT: f64 = 0.3;
const FORM_WEIGHT: f64 = 0.3;

/// Maximum shift (in percentage points) a perfect head-to-head record applies.
const H2H_WEIGHT: f64 = 10.0;

const RAW_MIN: f64 = 5.0;
const RAW_MAX: f64 = 95.0;

/// Weighted strength of one side before any home advantage.
pub fn team_strength(profile: &TeamProfile) -> f64 {
    profile.attack * ATTACK_WEIGHT + profile.defense * DEFENSE_WEIGHT + profile.form * FORM_WEIGHT
}

/// Returns `(home_strength, away_strength)`.
pub fn strengths(home: &TeamProfile, away: &TeamProfile, home_advantage: f64) -> (f64, f64) {
    (team_strength(home) * home_advantage, team_strength(away))
}

/// Share of past meetings won by the home side. Zero meetings -> 0.0.
pub fn h2h_factor(h2h: &HeadToHeadRecord) -> f64 {
    h2h.home_wins as f64 / h2h.total_matches.max(1) as f64
}

/// Clamped raw `(home, draw, away)` before normalization.
pub fn raw_distribution(home_strength: f64, away_strength: f64, h2h_factor: f64) -> (f64, f64, f64) {
    let total = home_strength + away_strength;
    let (home_share, away_share) = if total > 0.0 {
        (home_strength / total * 100.0, away_strength / total * 100.0)
    } else {
        (50.0, 50.0)
    };

    let home = (home_share + h2h_factor * H2H_WEIGHT).clamp(RAW_MIN, RAW_MAX);
    let away = (away_share - h2h_factor * H2H_WEIGHT).clamp(RAW_MIN, RAW_MAX);
    let draw = (100.0 - home - away).clamp(RAW_MIN, RAW_MAX);
    (home, draw, away)
}

/// Scale to 100, round each component, then hand the rounding residual to
/// the largest component (ties: home, draw, away) so the sum is exactly 100.
pub fn normalize(home: f64, draw: f64, away: f64) -> WinnerProbability {
    let sum = home + draw + away;
    let scale = 100.0 / sum;
    let scaled = [home * scale, draw * scale, away * scale];

    let mut rounded = scaled.map(|v| v.round() as i32);
    let residual = 100 - rounded.iter().sum::<i32>();

    let mut largest = 0;
    for (i, v) in scaled.iter().enumerate() {
        if *v > scaled[largest] {
            largest = i;
        }
    }
    rounded[largest] += residual;

    let [home, draw, away] = rounded.map(|v| v.clamp(0, 100) as u8);
    WinnerProbability { home, draw, away }
}

/// Steps 1-3 end to end.
pub fn winner_probability(
    home: &TeamProfile,
    away: &TeamProfile,
    h2h: &HeadToHeadRecord,
    home_advantage: f64,
) -> WinnerProbability {
    let (home_strength, away_strength) = strengths(home, away, home_advantage);
    let (h, d, a) = raw_distribution(home_strength, away_strength, h2h_factor(h2h));
    normalize(h, d, a)
}
