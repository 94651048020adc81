pub mod markets;
pub mod metrics;
pub mod outcome;
pub mod scoring;
pub mod types;

pub use scoring::{ScoringError, ScoringModel};
pub use types::{
    ExpectedGoals, HeadToHeadRecord, Market, MatchPrediction, StrongMarket, TeamProfile,
    WinnerProbability,
};
