//! Offline stand-in for a real statistics provider.
//!
//! Generates fixtures from a fixed club list and random, in-range team
//! statistics. Seeded runs are fully reproducible.

use super::types::{ApiQuota, Fixture, FixtureStats};
use super::FixtureFeed;
use crate::config::SimulationConfig;
use crate::engine::{HeadToHeadRecord, TeamProfile};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const SIM_LEAGUE_ID: u32 = 0;
const SIM_LEAGUE: &str = "Simulated League";
const FIRST_KICKOFF_HOUR: u32 = 12;

const CLUBS: [&str; 20] = [
    "Arsenal", "Aston Villa", "Bournemouth", "Brentford", "Brighton",
    "Burnley", "Chelsea", "Crystal Palace", "Everton", "Fulham",
    "Leeds", "Liverpool", "Manchester City", "Manchester United", "Newcastle",
    "Nottingham Forest", "Sunderland", "Tottenham", "West Ham", "Wolves",
];

pub struct SimulatedFeed {
    rng: StdRng,
    fixtures_per_day: usize,
    next_fixture_id: u64,
}

impl SimulatedFeed {
    pub fn new(config: &SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            fixtures_per_day: config.fixtures_per_day.min(CLUBS.len() / 2),
            next_fixture_id: 1,
        }
    }

    fn random_profile(&mut self) -> TeamProfile {
        let goals_scored = self.rng.gen_range(10..=80);
        TeamProfile {
            attack: self.rng.gen_range(20.0..=95.0),
            defense: self.rng.gen_range(20.0..=95.0),
            form: self.rng.gen_range(0.0..=100.0),
            goals_scored,
            goals_conceded: self.rng.gen_range(10..=80),
            late_goals_scored: self.rng.gen_range(0..=goals_scored / 3),
        }
    }

    fn random_h2h(&mut self) -> HeadToHeadRecord {
        let total_matches = self.rng.gen_range(0..=12);
        let home_wins = self.rng.gen_range(0..=total_matches);
        let away_wins = self.rng.gen_range(0..=total_matches - home_wins);
        HeadToHeadRecord {
            total_matches,
            home_wins,
            away_wins,
            draws: total_matches - home_wins - away_wins,
        }
    }
}

#[async_trait]
impl FixtureFeed for SimulatedFeed {
    async fn fetch_fixtures(&mut self, date: NaiveDate) -> Result<Vec<Fixture>> {
        let mut clubs: Vec<(u64, &str)> = CLUBS
            .iter()
            .enumerate()
            .map(|(i, name)| (i as u64 + 1, *name))
            .collect();
        clubs.shuffle(&mut self.rng);

        let mut fixtures = Vec::with_capacity(self.fixtures_per_day);
        for (slot, pair) in clubs.chunks(2).take(self.fixtures_per_day).enumerate() {
            let [(home_id, home), (away_id, away)] = [pair[0], pair[1]];
            let hour = (FIRST_KICKOFF_HOUR + slot as u32 * 2).min(23);
            let kickoff = date
                .and_hms_opt(hour, 0, 0)
                .map(|naive| Utc.from_utc_datetime(&naive))
                .ok_or_else(|| anyhow::anyhow!("invalid kickoff hour {}", hour))?;

            fixtures.push(Fixture {
                id: self.next_fixture_id,
                league_id: SIM_LEAGUE_ID,
                league: SIM_LEAGUE.to_string(),
                home_team: home.to_string(),
                home_id,
                away_team: away.to_string(),
                away_id,
                kickoff,
            });
            self.next_fixture_id += 1;
        }
        Ok(fixtures)
    }

    async fn fetch_stats(&mut self, _fixture: &Fixture) -> Result<FixtureStats> {
        Ok(FixtureStats {
            home: Some(self.random_profile()),
            away: Some(self.random_profile()),
            h2h: Some(self.random_h2h()),
        })
    }

    fn last_quota(&self) -> Option<ApiQuota> {
        None
    }
}
