pub mod api_football;
pub mod simulated;
pub mod stats;
pub mod types;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use types::{ApiQuota, Fixture, FixtureStats};

/// Source of fixtures and the statistics the scoring model consumes.
#[async_trait]
pub trait FixtureFeed: Send + Sync {
    async fn fetch_fixtures(&mut self, date: NaiveDate) -> Result<Vec<Fixture>>;
    async fn fetch_stats(&mut self, fixture: &Fixture) -> Result<FixtureStats>;
    fn last_quota(&self) -> Option<ApiQuota>;
}
