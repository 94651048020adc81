use crate::engine::{MatchPrediction, ScoringError, ScoringModel};
use crate::feed::types::{Fixture, FixtureStats};
use crate::feed::FixtureFeed;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// How a stored prediction was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Provenance {
    /// Model evaluated on complete statistics.
    Computed,
    /// Statistics were incomplete; the prediction is the model's default.
    Fallback { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRecord {
    pub fixture: Fixture,
    pub prediction: MatchPrediction,
    pub provenance: Provenance,
    pub computed_at: DateTime<Utc>,
}

/// Result of scoring one fixture.
#[derive(Debug, Clone)]
pub enum FixtureOutcome {
    Scored(PredictionRecord),
    Rejected { fixture_id: u64, error: ScoringError },
}

/// Summary of one scheduling tick.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub records: Vec<PredictionRecord>,
    pub computed: usize,
    pub fallback: usize,
    pub rejected: usize,
}

impl CycleReport {
    fn push(&mut self, outcome: FixtureOutcome) {
        match outcome {
            FixtureOutcome::Scored(record) => {
                match record.provenance {
                    Provenance::Computed => self.computed += 1,
                    Provenance::Fallback { .. } => self.fallback += 1,
                }
                self.records.push(record);
            }
            FixtureOutcome::Rejected { .. } => self.rejected += 1,
        }
    }
}

/// Record the default prediction for a fixture that could not be scored.
pub fn fallback_record(fixture: Fixture, reason: String) -> PredictionRecord {
    tracing::warn!(fixture_id = fixture.id, matchup = %fixture.matchup(), %reason, "using fallback prediction");
    PredictionRecord {
        fixture,
        prediction: MatchPrediction::fallback(),
        provenance: Provenance::Fallback { reason },
        computed_at: Utc::now(),
    }
}

/// Score one fixture. Missing statistics give the fallback prediction;
/// out-of-range statistics reject the fixture.
pub fn score_fixture(model: &ScoringModel, fixture: Fixture, stats: &FixtureStats) -> FixtureOutcome {
    let provenance = if stats.is_complete() {
        Provenance::Computed
    } else {
        let reason = format!("missing {}", stats.missing_parts().join(", "));
        tracing::warn!(fixture_id = fixture.id, matchup = %fixture.matchup(), %reason, "using fallback prediction");
        Provenance::Fallback { reason }
    };

    match model.evaluate_partial(stats.home.as_ref(), stats.away.as_ref(), stats.h2h.as_ref()) {
        Ok(prediction) => FixtureOutcome::Scored(PredictionRecord {
            fixture,
            prediction,
            provenance,
            computed_at: Utc::now(),
        }),
        Err(error) => {
            tracing::warn!(fixture_id = fixture.id, matchup = %fixture.matchup(), "rejecting fixture: {}", error);
            FixtureOutcome::Rejected {
                fixture_id: fixture.id,
                error,
            }
        }
    }
}

/// Fetch the day's fixtures, then fetch stats and score each one.
///
/// Only the fixture list fetch can fail the cycle; a stats failure for one
/// fixture degrades that fixture to the fallback prediction, with the fetch
/// error as its reason.
pub async fn run_cycle(
    feed: &mut dyn FixtureFeed,
    model: &ScoringModel,
    date: NaiveDate,
    max_fixtures: usize,
) -> Result<CycleReport> {
    let mut fixtures = feed
        .fetch_fixtures(date)
        .await
        .with_context(|| format!("failed to fetch fixtures for {}", date))?;

    if fixtures.len() > max_fixtures {
        tracing::info!(available = fixtures.len(), max_fixtures, "truncating fixture list");
        fixtures.sort_by_key(|f| (f.kickoff, f.id));
        fixtures.truncate(max_fixtures);
    }

    let mut report = CycleReport::default();
    for fixture in fixtures {
        let outcome = match feed.fetch_stats(&fixture).await {
            Ok(stats) => score_fixture(model, fixture, &stats),
            Err(e) => FixtureOutcome::Scored(fallback_record(fixture, format!("stats fetch failed: {:#}", e))),
        };
        report.push(outcome);
    }

    tracing::info!(
        %date,
        computed = report.computed,
        fallback = report.fallback,
        rejected = report.rejected,
        "prediction cycle complete"
    );
    Ok(report)
}
