use serde::{Deserialize, Serialize};
use std::fmt;

/// Statistical profile of one side, supplied fresh for every evaluation.
///
/// `attack`, `defense` and `form` are indices in `0..=100`. Goal counts are
/// historical totals; `late_goals_scored` counts goals scored in the final
/// phase of matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamProfile {
    pub attack: f64,
    pub defense: f64,
    pub form: f64,
    pub goals_scored: u32,
    pub goals_conceded: u32,
    pub late_goals_scored: u32,
}

/// Historical results between the two sides, from the home side's view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadToHeadRecord {
    pub total_matches: u32,
    pub home_wins: u32,
    pub away_wins: u32,
    pub draws: u32,
}

/// Home/draw/away percentages. Always sums to exactly 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerProbability {
    pub home: u8,
    pub draw: u8,
    pub away: u8,
}

impl WinnerProbability {
    pub fn total(&self) -> u32 {
        self.home as u32 + self.draw as u32 + self.away as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpectedGoals {
    pub home: f64,
    pub away: f64,
    pub total: f64,
}

/// Markets that can be surfaced as strong picks. Serialized as [`Market::name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum Market {
    HomeWin,
    AwayWin,
    Draw,
    BttsYes,
    BttsNo,
    Over35Goals,
    Over25Goals,
    Under25Goals,
}

impl Market {
    pub const ALL: [Market; 8] = [
        Market::HomeWin,
        Market::AwayWin,
        Market::Draw,
        Market::BttsYes,
        Market::BttsNo,
        Market::Over35Goals,
        Market::Over25Goals,
        Market::Under25Goals,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Market::HomeWin => "Home Win",
            Market::AwayWin => "Away Win",
            Market::Draw => "Draw",
            Market::BttsYes => "BTTS Yes",
            Market::BttsNo => "BTTS No",
            Market::Over35Goals => "Over 3.5 Goals",
            Market::Over25Goals => "Over 2.5 Goals",
            Market::Under25Goals => "Under 2.5 Goals",
        }
    }
}

impl From<Market> for &'static str {
    fn from(market: Market) -> Self {
        market.name()
    }
}

impl TryFrom<String> for Market {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Market::ALL
            .into_iter()
            .find(|m| m.name() == name)
            .ok_or_else(|| format!("unknown market: {}", name))
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrongMarket {
    pub market_name: Market,
    pub probability: u8,
}

/// Output of one model evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPrediction {
    pub winner_probability: WinnerProbability,
    pub btts_probability: u8,
    pub late_goal_probability: u8,
    pub expected_goals: ExpectedGoals,
    pub strong_markets: Vec<StrongMarket>,
}

impl MatchPrediction {
    /// Prediction returned when the inputs for a fixture are incomplete.
    ///
    /// Indistinguishable from a computed result on its own; callers attach
    /// provenance if they need to tell the two apart.
    pub fn fallback() -> Self {
        Self {
            winner_probability: WinnerProbability {
                home: 33,
                draw: 34,
                away: 33,
            },
            btts_probability: 50,
            late_goal_probability: 30,
            expected_goals: ExpectedGoals {
                home: 1.2,
                away: 1.1,
                total: 2.3,
            },
            strong_markets: Vec::new(),
        }
    }
}
