//! Derive model inputs from raw season statistics and past meetings.
//!
//! Indices are scaled so that three goals per game maps to the top of the
//! 0-100 range. Form uses league points over the most recent five results.

use crate::engine::{HeadToHeadRecord, TeamProfile};

const GOALS_PER_GAME_CEILING: f64 = 3.0;
const FORM_WINDOW: usize = 5;
const NEUTRAL_INDEX: f64 = 50.0;

/// Minute buckets that count as the final phase of a match.
pub const LATE_BUCKETS: [&str; 2] = ["76-90", "91-105"];

/// Provider-agnostic season summary for one team.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonStats {
    pub played: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub form: String,
    pub late_goals_for: u32,
}

/// One previous meeting between two teams. Goals are `None` until played.
#[derive(Debug, Clone, PartialEq)]
pub struct PastMeeting {
    pub home_id: u64,
    pub away_id: u64,
    pub home_goals: Option<u32>,
    pub away_goals: Option<u32>,
}

pub fn attack_index(goals_for: u32, played: u32) -> f64 {
    if played == 0 {
        return NEUTRAL_INDEX;
    }
    let per_game = goals_for as f64 / played as f64;
    (per_game / GOALS_PER_GAME_CEILING * 100.0).clamp(0.0, 100.0)
}

pub fn defense_index(goals_against: u32, played: u32) -> f64 {
    if played == 0 {
        return NEUTRAL_INDEX;
    }
    let per_game = goals_against as f64 / played as f64;
    (100.0 - per_game / GOALS_PER_GAME_CEILING * 100.0).clamp(0.0, 100.0)
}

/// Points share over the last five W/D/L letters; other characters are ignored.
pub fn form_index(form: &str) -> f64 {
    let results: Vec<u32> = form
        .chars()
        .filter_map(|c| match c.to_ascii_uppercase() {
            'W' => Some(3),
            'D' => Some(1),
            'L' => Some(0),
            _ => None,
        })
        .collect();
    let recent = &results[results.len().saturating_sub(FORM_WINDOW)..];
    if recent.is_empty() {
        return NEUTRAL_INDEX;
    }
    let points: u32 = recent.iter().sum();
    points as f64 / (3 * recent.len()) as f64 * 100.0
}

pub fn profile_from_season(stats: &SeasonStats) -> TeamProfile {
    TeamProfile {
        attack: attack_index(stats.goals_for, stats.played),
        defense: defense_index(stats.goals_against, stats.played),
        form: form_index(&stats.form),
        goals_scored: stats.goals_for,
        goals_conceded: stats.goals_against,
        late_goals_scored: stats.late_goals_for,
    }
}

/// Build the record from `home_id`'s point of view, whatever the venue of
/// each past meeting. Unplayed meetings and other pairings are skipped.
pub fn h2h_from_meetings(home_id: u64, away_id: u64, meetings: &[PastMeeting]) -> HeadToHeadRecord {
    let mut record = HeadToHeadRecord::default();
    for m in meetings {
        let same_pair = (m.home_id == home_id && m.away_id == away_id)
            || (m.home_id == away_id && m.away_id == home_id);
        if !same_pair {
            continue;
        }
        let (Some(hg), Some(ag)) = (m.home_goals, m.away_goals) else {
            continue;
        };

        record.total_matches += 1;
        let (ours, theirs) = if m.home_id == home_id { (hg, ag) } else { (ag, hg) };
        if ours > theirs {
            record.home_wins += 1;
        } else if ours < theirs {
            record.away_wins += 1;
        } else {
            record.draws += 1;
        }
    }
    record
}
