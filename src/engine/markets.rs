use super::types::{ExpectedGoals, Market, StrongMarket, WinnerProbability};

/// Default high-confidence cutoff for surfacing a market.
pub const DEFAULT_STRONG_THRESHOLD: u8 = 85;

const OVER_35_LINE: f64 = 3.5;
const OVER_25_LINE: f64 = 2.5;
const UNDER_25_LINE: f64 = 1.5;

/// Fixed confidence reported for the goals-total ladder.
const OVER_35_CONFIDENCE: u8 = 85;
const OVER_25_CONFIDENCE: u8 = 75;
const UNDER_25_CONFIDENCE: u8 = 85;

/// Classify strong markets.
///
/// Rules run in a fixed order and the output keeps that order: home win,
/// away win, draw, BTTS yes/no, then at most one goals-ladder entry.
pub fn strong_markets(
    winner: &WinnerProbability,
    btts_probability: u8,
    expected_goals: &ExpectedGoals,
    threshold: u8,
) -> Vec<StrongMarket> {
    let mut out = Vec::new();
    let mut push = |market_name: Market, probability: u8| out.push(StrongMarket { market_name, probability });

    if winner.home >= threshold {
        push(Market::HomeWin, winner.home);
    }
    if winner.away >= threshold {
        push(Market::AwayWin, winner.away);
    }
    if winner.draw >= threshold {
        push(Market::Draw, winner.draw);
    }

    if btts_probability >= threshold {
        push(Market::BttsYes, btts_probability);
    } else if btts_probability <= 100u8.saturating_sub(threshold) {
        push(Market::BttsNo, 100 - btts_probability);
    }

    if let Some((market, confidence)) = goals_ladder(expected_goals.total) {
        push(market, confidence);
    }

    out
}

/// First matching rung of the goals-total ladder, if any.
pub fn goals_ladder(total_xg: f64) -> Option<(Market, u8)> {
    if total_xg >= OVER_35_LINE {
        Some((Market::Over35Goals, OVER_35_CONFIDENCE))
    } else if total_xg >= OVER_25_LINE {
        Some((Market::Over25Goals, OVER_25_CONFIDENCE))
    } else if total_xg <= UNDER_25_LINE {
        Some((Market::Under25Goals, UNDER_25_CONFIDENCE))
    } else {
        None
    }
}
