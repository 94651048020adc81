//! Derived per-match metrics: both-teams-to-score, late goal, expected goals.

use super::types::{ExpectedGoals, TeamProfile};

const BTTS_SCALE: f64 = 50.0;
const BTTS_MIN: f64 = 10.0;
const BTTS_MAX: f64 = 95.0;

const LATE_GOAL_SCALE: f64 = 3.0;
const LATE_GOAL_MIN: f64 = 5.0;
const LATE_GOAL_MAX: f64 = 80.0;

/// Goals per unit of attack index. Home is higher than away.
const HOME_XG_ATTACK: f64 = 2.5;
const AWAY_XG_ATTACK: f64 = 2.0;
const XG_DEFENSE: f64 = 0.5;

/// Round to one decimal place, half away from zero.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Both-teams-to-score percent, 10..=95.
pub fn btts_probability(home: &TeamProfile, away: &TeamProfile) -> u8 {
    let home_scores = home.attack / 100.0 * (100.0 - away.defense) / 100.0;
    let away_scores = away.attack / 100.0 * (100.0 - home.defense) / 100.0;
    let raw = (home_scores + away_scores) * BTTS_SCALE;
    raw.clamp(BTTS_MIN, BTTS_MAX).round() as u8
}

/// Late-goal percent, 5..=80, from both sides' historical late goals.
pub fn late_goal_probability(home: &TeamProfile, away: &TeamProfile) -> u8 {
    let raw = (home.late_goals_scored as f64 / 10.0 + away.late_goals_scored as f64 / 10.0)
        * LATE_GOAL_SCALE;
    raw.clamp(LATE_GOAL_MIN, LATE_GOAL_MAX).round() as u8
}

pub fn expected_goals(home: &TeamProfile, away: &TeamProfile) -> ExpectedGoals {
    let home_xg = round1(home.attack / 100.0 * HOME_XG_ATTACK + away.defense / 100.0 * XG_DEFENSE);
    let away_xg = round1(away.attack / 100.0 * AWAY_XG_ATTACK + home.defense / 100.0 * XG_DEFENSE);
    ExpectedGoals {
        home: home_xg,
        away: away_xg,
        total: round1(home_xg + away_xg),
    }
}
