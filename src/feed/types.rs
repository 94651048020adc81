use crate::engine::{HeadToHeadRecord, TeamProfile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized internal types used by the scheduler (provider-agnostic).

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    pub id: u64,
    pub league_id: u32,
    pub league: String,
    pub home_team: String,
    pub home_id: u64,
    pub away_team: String,
    pub away_id: u64,
    pub kickoff: DateTime<Utc>,
}

impl Fixture {
    pub fn matchup(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }
}

/// Model inputs for one fixture. Any part may be missing when the
/// statistics collaborator could not supply it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureStats {
    pub home: Option<TeamProfile>,
    pub away: Option<TeamProfile>,
    pub h2h: Option<HeadToHeadRecord>,
}

impl FixtureStats {
    pub fn is_complete(&self) -> bool {
        self.home.is_some() && self.away.is_some() && self.h2h.is_some()
    }

    /// Names of the missing parts, for logging and provenance.
    pub fn missing_parts(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.home.is_none() { missing.push("home profile"); }
        if self.away.is_none() { missing.push("away profile"); }
        if self.h2h.is_none() { missing.push("head-to-head"); }
        missing
    }
}

/// API usage quota info extracted from response headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiQuota {
    pub requests_remaining: u64,
    pub requests_limit: u64,
}

// ── API-Football v3 Deserialization ──────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub errors: serde_json::Value,
    pub response: T,
}

impl<T> ApiEnvelope<T> {
    /// API-Football reports errors as `[]` or `{}` when there are none.
    pub fn error_message(&self) -> Option<String> {
        match &self.errors {
            serde_json::Value::Array(a) if !a.is_empty() => Some(self.errors.to_string()),
            serde_json::Value::Object(o) if !o.is_empty() => Some(self.errors.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiFixtureItem {
    pub fixture: ApiFixture,
    pub league: ApiLeague,
    pub teams: ApiTeams,
    #[serde(default)]
    pub goals: ApiGoals,
}

#[derive(Debug, Deserialize)]
pub struct ApiFixture {
    pub id: u64,
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiLeague {
    pub id: u32,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiTeams {
    pub home: ApiTeam,
    pub away: ApiTeam,
}

#[derive(Debug, Deserialize)]
pub struct ApiTeam {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiGoals {
    pub home: Option<u32>,
    pub away: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ApiTeamStatistics {
    #[serde(default)]
    pub form: Option<String>,
    pub fixtures: ApiStatFixtures,
    pub goals: ApiStatGoals,
}

#[derive(Debug, Deserialize)]
pub struct ApiStatFixtures {
    pub played: ApiSplit,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiSplit {
    #[serde(default)]
    pub total: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ApiStatGoals {
    #[serde(rename = "for")]
    pub scored: ApiGoalBreakdown,
    pub against: ApiGoalBreakdown,
}

#[derive(Debug, Deserialize)]
pub struct ApiGoalBreakdown {
    pub total: ApiSplit,
    #[serde(default)]
    pub minute: std::collections::HashMap<String, ApiSplit>,
}
