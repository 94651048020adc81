use super::types::{HeadToHeadRecord, MatchPrediction, TeamProfile};
use super::{markets, metrics, outcome};
use crate::config::ModelConfig;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    #[error("invalid input: {field} = {value} {reason}")]
    InvalidInput {
        field: String,
        value: f64,
        reason: String,
    },

    #[error("invalid model config: {0}")]
    InvalidConfig(String),
}

/// Stateless match-outcome model. Safe to share across threads and call
/// concurrently; evaluation touches nothing but its arguments.
#[derive(Debug, Clone, Default)]
pub struct ScoringModel {
    config: ModelConfig,
}

impl ScoringModel {
    pub fn new(config: ModelConfig) -> Result<Self, ScoringError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Score one fixture from validated inputs.
    pub fn evaluate(
        &self,
        home: &TeamProfile,
        away: &TeamProfile,
        h2h: &HeadToHeadRecord,
    ) -> Result<MatchPrediction, ScoringError> {
        validate_profile("home", home)?;
        validate_profile("away", away)?;
        validate_h2h(h2h)?;

        let winner_probability =
            outcome::winner_probability(home, away, h2h, self.config.home_advantage);
        let btts_probability = metrics::btts_probability(home, away);
        let late_goal_probability = metrics::late_goal_probability(home, away);
        let expected_goals = metrics::expected_goals(home, away);
        let strong_markets = markets::strong_markets(
            &winner_probability,
            btts_probability,
            &expected_goals,
            self.config.strong_threshold,
        );

        Ok(MatchPrediction {
            winner_probability,
            btts_probability,
            late_goal_probability,
            expected_goals,
            strong_markets,
        })
    }

    /// Like [`evaluate`](Self::evaluate), but any missing input yields
    /// [`MatchPrediction::fallback`] instead of an error. Present inputs
    /// are still validated.
    pub fn evaluate_partial(
        &self,
        home: Option<&TeamProfile>,
        away: Option<&TeamProfile>,
        h2h: Option<&HeadToHeadRecord>,
    ) -> Result<MatchPrediction, ScoringError> {
        match (home, away, h2h) {
            (Some(home), Some(away), Some(h2h)) => self.evaluate(home, away, h2h),
            _ => {
                if let Some(home) = home {
                    validate_profile("home", home)?;
                }
                if let Some(away) = away {
                    validate_profile("away", away)?;
                }
                if let Some(h2h) = h2h {
                    validate_h2h(h2h)?;
                }
                Ok(MatchPrediction::fallback())
            }
        }
    }
}

fn check_index(side: &str, name: &str, value: f64) -> Result<(), ScoringError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(ScoringError::InvalidInput {
            field: format!("{side}.{name}"),
            value,
            reason: "must be within 0..=100".to_string(),
        });
    }
    Ok(())
}

/// Reject a profile whose indices fall outside `0..=100`.
pub fn validate_profile(side: &str, profile: &TeamProfile) -> Result<(), ScoringError> {
    check_index(side, "attack", profile.attack)?;
    check_index(side, "defense", profile.defense)?;
    check_index(side, "form", profile.form)?;
    Ok(())
}

/// Reject a record whose outcomes outnumber its matches.
pub fn validate_h2h(h2h: &HeadToHeadRecord) -> Result<(), ScoringError> {
    let decided = h2h.home_wins as u64 + h2h.away_wins as u64 + h2h.draws as u64;
    if decided > h2h.total_matches as u64 {
        return Err(ScoringError::InvalidInput {
            field: "h2h".to_string(),
            value: decided as f64,
            reason: format!(
                "(wins and draws) exceed total matches ({})",
                h2h.total_matches
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::Market;

    fn profile(attack: f64, defense: f64, form: f64) -> TeamProfile {
        TeamProfile {
            attack,
            defense,
            form,
            goals_scored: 30,
            goals_conceded: 25,
            late_goals_scored: 8,
        }
    }

    #[test]
    fn test_evaluate_full_prediction() {
        let model = ScoringModel::default();
        let h2h = HeadToHeadRecord {
            total_matches: 10,
            home_wins: 7,
            away_wins: 1,
            draws: 2,
        };
        let p = model
            .evaluate(&profile(80.0, 70.0, 75.0), &profile(40.0, 30.0, 35.0), &h2h)
            .unwrap();
        assert_eq!(p.winner_probability.home, 75);
        assert_eq!(p.winner_probability.total(), 100);
        // (0.8 * 0.7 + 0.4 * 0.3) * 50 = 34
        assert_eq!(p.btts_probability, 34);
        // (0.8 + 0.8) * 3 = 4.8 -> floor of 5
        assert_eq!(p.late_goal_probability, 5);
        assert!(p.strong_markets.iter().all(|m| m.market_name != Market::HomeWin));
    }

    #[test]
    fn test_rejects_out_of_range_index() {
        let model = ScoringModel::default();
        let err = model
            .evaluate(&profile(101.0, 50.0, 50.0), &profile(50.0, 50.0, 50.0), &HeadToHeadRecord::default())
            .unwrap_err();
        assert!(matches!(err, ScoringError::InvalidInput { ref field, value, .. } if field == "home.attack" && value == 101.0));
        assert_eq!(err.to_string(), "invalid input: home.attack = 101 must be within 0..=100");

        let err = model
            .evaluate(&profile(50.0, 50.0, 50.0), &profile(50.0, f64::NAN, 50.0), &HeadToHeadRecord::default())
            .unwrap_err();
        assert!(matches!(err, ScoringError::InvalidInput { ref field, .. } if field == "away.defense"));
    }

    #[test]
    fn test_rejects_inconsistent_h2h() {
        let h2h = HeadToHeadRecord {
            total_matches: 3,
            home_wins: 2,
            away_wins: 1,
            draws: 1,
        };
        let err = validate_h2h(&h2h).unwrap_err();
        assert!(matches!(err, ScoringError::InvalidInput { value, .. } if value == 4.0));
        assert!(err.to_string().contains("exceed total matches"));
    }

    #[test]
    fn test_partial_missing_input_returns_fallback() {
        let model = ScoringModel::default();
        let home = profile(60.0, 60.0, 60.0);
        let p = model.evaluate_partial(Some(&home), None, Some(&HeadToHeadRecord::default())).unwrap();
        assert_eq!(p, MatchPrediction::fallback());
        let p = model.evaluate_partial(None, None, None).unwrap();
        assert_eq!(p, MatchPrediction::fallback());
    }

    #[test]
    fn test_partial_still_validates_present_inputs() {
        let model = ScoringModel::default();
        let bad = profile(50.0, -1.0, 50.0);
        let good = profile(50.0, 50.0, 50.0);
        let res = model.evaluate_partial(Some(&bad), Some(&good), Some(&HeadToHeadRecord::default()));
        assert!(res.is_err());
        let res = model.evaluate_partial(Some(&good), Some(&bad), None);
        assert!(res.is_err());
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let config = ModelConfig {
            home_advantage: 0.0,
            ..ModelConfig::default()
        };
        assert!(matches!(ScoringModel::new(config), Err(ScoringError::InvalidConfig(_))));
    }
}
