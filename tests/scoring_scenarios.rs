//! End-to-end checks of the scoring model against its published guarantees.

use fixture_forecast::config::ModelConfig;
use fixture_forecast::engine::metrics::round1;
use fixture_forecast::engine::{
    HeadToHeadRecord, Market, MatchPrediction, ScoringModel, TeamProfile,
};

fn profile(attack: f64, defense: f64, form: f64) -> TeamProfile {
    TeamProfile {
        attack,
        defense,
        form,
        goals_scored: 30,
        goals_conceded: 30,
        late_goals_scored: 6,
    }
}

fn rule_index(market: Market) -> usize {
    match market {
        Market::HomeWin => 0,
        Market::AwayWin => 1,
        Market::Draw => 2,
        Market::BttsYes | Market::BttsNo => 3,
        Market::Over35Goals | Market::Over25Goals | Market::Under25Goals => 4,
    }
}

fn assert_invariants(p: &MatchPrediction) {
    assert_eq!(p.winner_probability.total(), 100, "{:?}", p.winner_probability);
    assert!((10..=95).contains(&p.btts_probability), "btts {}", p.btts_probability);
    assert!((5..=80).contains(&p.late_goal_probability), "late {}", p.late_goal_probability);
    assert!(p.expected_goals.home >= 0.0 && p.expected_goals.away >= 0.0);
    assert_eq!(
        p.expected_goals.total,
        round1(p.expected_goals.home + p.expected_goals.away)
    );

    let indices: Vec<usize> = p.strong_markets.iter().map(|m| rule_index(m.market_name)).collect();
    assert!(
        indices.windows(2).all(|w| w[0] < w[1]),
        "markets out of order or duplicated: {:?}",
        p.strong_markets
    );
}

#[test]
fn test_invariants_hold_across_input_grid() {
    let model = ScoringModel::default();
    let levels = [0.0, 25.0, 50.0, 75.0, 100.0];
    let records = [
        HeadToHeadRecord::default(),
        HeadToHeadRecord { total_matches: 10, home_wins: 10, away_wins: 0, draws: 0 },
        HeadToHeadRecord { total_matches: 6, home_wins: 1, away_wins: 4, draws: 1 },
    ];

    for &ha in &levels {
        for &hd in &levels {
            for &hf in &levels {
                for &aa in &levels {
                    for &ad in &levels {
                        for &af in &levels {
                            let home = profile(ha, hd, hf);
                            let away = profile(aa, ad, af);
                            for h2h in &records {
                                let p = model.evaluate(&home, &away, h2h).unwrap();
                                assert_invariants(&p);
                            }
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn test_late_goal_bounds_across_counts() {
    let model = ScoringModel::default();
    for home_late in [0, 1, 5, 13, 40, 300] {
        for away_late in [0, 2, 9, 77, 1000] {
            let mut home = profile(60.0, 60.0, 60.0);
            let mut away = profile(55.0, 45.0, 50.0);
            home.late_goals_scored = home_late;
            away.late_goals_scored = away_late;
            let p = model.evaluate(&home, &away, &HeadToHeadRecord::default()).unwrap();
            assert_invariants(&p);
        }
    }
}

#[test]
fn test_evaluation_is_deterministic() {
    let model = ScoringModel::default();
    let home = profile(67.3, 58.1, 71.9);
    let away = profile(49.5, 62.2, 40.0);
    let h2h = HeadToHeadRecord { total_matches: 7, home_wins: 3, away_wins: 2, draws: 2 };

    let first = model.evaluate(&home, &away, &h2h).unwrap();
    let second = model.evaluate(&home, &away, &h2h).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_concurrent_evaluation_matches_sequential() {
    let model = std::sync::Arc::new(ScoringModel::default());
    let expected = model
        .evaluate(&profile(80.0, 70.0, 75.0), &profile(40.0, 30.0, 35.0), &HeadToHeadRecord::default())
        .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let model = model.clone();
            std::thread::spawn(move || {
                model
                    .evaluate(&profile(80.0, 70.0, 75.0), &profile(40.0, 30.0, 35.0), &HeadToHeadRecord::default())
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_scenario_dominant_home_side() {
    let model = ScoringModel::default();
    let h2h = HeadToHeadRecord { total_matches: 10, home_wins: 7, away_wins: 1, draws: 2 };
    let p = model
        .evaluate(&profile(80.0, 70.0, 75.0), &profile(40.0, 30.0, 35.0), &h2h)
        .unwrap();

    assert!(p.winner_probability.home >= 60, "got {:?}", p.winner_probability);
    let has_home_win = p.strong_markets.iter().any(|m| m.market_name == Market::HomeWin);
    assert_eq!(has_home_win, p.winner_probability.home >= 85);
}

#[test]
fn test_scenario_identical_sides() {
    let side = profile(55.0, 55.0, 55.0);
    let h2h = HeadToHeadRecord::default();

    // Without home advantage the only asymmetry left is the rounding tie-break.
    let neutral = ScoringModel::new(ModelConfig { home_advantage: 1.0, ..ModelConfig::default() }).unwrap();
    let p = neutral.evaluate(&side, &side, &h2h).unwrap();
    assert!(p.winner_probability.home.abs_diff(p.winner_probability.away) <= 2, "{:?}", p.winner_probability);

    // With the default multiplier the home side is favoured, by the constant alone.
    let p = ScoringModel::default().evaluate(&side, &side, &h2h).unwrap();
    assert!(p.winner_probability.home > p.winner_probability.away);
    assert_eq!(p.winner_probability.total(), 100);
}

#[test]
fn test_scenario_btts_literal_arithmetic() {
    let model = ScoringModel::default();
    let home = profile(100.0, 100.0, 50.0);
    for away_attack in [0.0, 50.0, 100.0] {
        let away = profile(away_attack, 0.0, 50.0);
        let p = model.evaluate(&home, &away, &HeadToHeadRecord::default()).unwrap();
        // (1.0 * 1.0 + away_attack/100 * 0.0) * 50 = 50
        assert_eq!(p.btts_probability, 50);
    }

    // (0.6 * 0.5 + 0.4 * 0.2) * 50 = 19
    let p = model
        .evaluate(&profile(60.0, 80.0, 50.0), &profile(40.0, 50.0, 50.0), &HeadToHeadRecord::default())
        .unwrap();
    assert_eq!(p.btts_probability, 19);
}

#[test]
fn test_scenario_missing_head_to_head_gives_default() {
    let model = ScoringModel::default();
    let home = profile(90.0, 90.0, 90.0);
    let away = profile(10.0, 10.0, 10.0);
    let p = model.evaluate_partial(Some(&home), Some(&away), None).unwrap();

    assert_eq!(p, MatchPrediction::fallback());
    assert_eq!(
        (p.winner_probability.home, p.winner_probability.draw, p.winner_probability.away),
        (33, 34, 33)
    );
    assert_eq!(p.btts_probability, 50);
    assert_eq!(p.late_goal_probability, 30);
    assert_eq!(
        (p.expected_goals.home, p.expected_goals.away, p.expected_goals.total),
        (1.2, 1.1, 2.3)
    );
    assert!(p.strong_markets.is_empty());
}

#[test]
fn test_scenario_high_scoring_goals_ladder() {
    let model = ScoringModel::default();
    // home xG = 2.5 + 0.5 = 3.0, away xG = round1(1.0 + 0.25) = 1.3
    let p = model
        .evaluate(&profile(100.0, 50.0, 50.0), &profile(50.0, 100.0, 50.0), &HeadToHeadRecord::default())
        .unwrap();
    assert!(p.expected_goals.total >= 3.5, "xg {:?}", p.expected_goals);

    let ladder: Vec<_> = p
        .strong_markets
        .iter()
        .filter(|m| rule_index(m.market_name) == 4)
        .collect();
    assert_eq!(ladder.len(), 1);
    assert_eq!(ladder[0].market_name, Market::Over35Goals);
    assert_eq!(ladder[0].probability, 85);
}

#[test]
fn test_low_scoring_match_flags_under() {
    let model = ScoringModel::default();
    // Both sides around 0.3 xG.
    let p = model
        .evaluate(&profile(10.0, 10.0, 50.0), &profile(10.0, 10.0, 50.0), &HeadToHeadRecord::default())
        .unwrap();
    assert!(p.expected_goals.total <= 1.5);
    assert!(p
        .strong_markets
        .iter()
        .any(|m| m.market_name == Market::Under25Goals && m.probability == 85));
}

#[test]
fn test_invalid_input_is_rejected_not_clamped() {
    let model = ScoringModel::default();
    let h2h = HeadToHeadRecord { total_matches: 2, home_wins: 2, away_wins: 1, draws: 0 };
    assert!(model.evaluate(&profile(50.0, 50.0, 50.0), &profile(50.0, 50.0, 50.0), &h2h).is_err());
    assert!(model
        .evaluate(&profile(50.0, 50.0, 120.0), &profile(50.0, 50.0, 50.0), &HeadToHeadRecord::default())
        .is_err());
}
