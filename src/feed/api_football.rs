use super::stats::{self, PastMeeting, SeasonStats, LATE_BUCKETS};
use super::types::*;
use super::FixtureFeed;
use crate::config::FeedConfig;
use crate::engine::{HeadToHeadRecord, TeamProfile};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use std::time::Duration;

const API_KEY_HEADER: &str = "x-apisports-key";

/// API-Football v3 client (fixtures, team statistics, head-to-head).
pub struct ApiFootball {
    client: Client,
    api_key: String,
    base_url: String,
    leagues: Vec<u32>,
    season: u16,
    h2h_last: u32,
    last_quota: Option<ApiQuota>,
}

fn parse_quota_header(headers: &reqwest::header::HeaderMap, name: &str) -> u64 {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(0)
}

fn unwrap_envelope<T>(envelope: ApiEnvelope<T>) -> Result<T> {
    if let Some(msg) = envelope.error_message() {
        anyhow::bail!("api-football returned errors: {}", msg);
    }
    Ok(envelope.response)
}

/// Parse a `/fixtures` response. Items with an unparseable kickoff are skipped.
pub fn parse_fixtures(json: &str) -> Result<Vec<Fixture>> {
    let envelope: ApiEnvelope<Vec<ApiFixtureItem>> =
        serde_json::from_str(json).context("failed to parse fixtures response")?;
    let items = unwrap_envelope(envelope)?;

    let mut fixtures = Vec::with_capacity(items.len());
    for item in items {
        let Ok(kickoff) = DateTime::parse_from_rfc3339(&item.fixture.date) else {
            tracing::warn!(fixture_id = item.fixture.id, date = %item.fixture.date, "skipping fixture: bad kickoff time");
            continue;
        };
        fixtures.push(Fixture {
            id: item.fixture.id,
            league_id: item.league.id,
            league: item.league.name,
            home_team: item.teams.home.name,
            home_id: item.teams.home.id,
            away_team: item.teams.away.name,
            away_id: item.teams.away.id,
            kickoff: kickoff.with_timezone(&Utc),
        });
    }
    Ok(fixtures)
}

/// Parse a `/teams/statistics` response into a season summary.
pub fn parse_team_statistics(json: &str) -> Result<SeasonStats> {
    let envelope: ApiEnvelope<ApiTeamStatistics> =
        serde_json::from_str(json).context("failed to parse team statistics response")?;
    let stats = unwrap_envelope(envelope)?;

    let late_goals_for: u32 = LATE_BUCKETS
        .iter()
        .filter_map(|bucket| stats.goals.scored.minute.get(*bucket))
        .filter_map(|split| split.total)
        .sum();

    Ok(SeasonStats {
        played: stats.fixtures.played.total.unwrap_or(0),
        goals_for: stats.goals.scored.total.total.unwrap_or(0),
        goals_against: stats.goals.against.total.total.unwrap_or(0),
        form: stats.form.unwrap_or_default(),
        late_goals_for,
    })
}

/// Parse a `/fixtures/headtohead` response into past meetings.
pub fn parse_head_to_head(json: &str) -> Result<Vec<PastMeeting>> {
    let envelope: ApiEnvelope<Vec<ApiFixtureItem>> =
        serde_json::from_str(json).context("failed to parse head-to-head response")?;
    let items = unwrap_envelope(envelope)?;
    Ok(items
        .into_iter()
        .map(|item| PastMeeting {
            home_id: item.teams.home.id,
            away_id: item.teams.away.id,
            home_goals: item.goals.home,
            away_goals: item.goals.away,
        })
        .collect())
}

impl ApiFootball {
    pub fn new(api_key: String, config: &FeedConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(concat!("fixture-forecast/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build api-football HTTP client")?;
        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            leagues: config.leagues.clone(),
            season: config.season,
            h2h_last: config.h2h_last,
            last_quota: None,
        })
    }

    /// GET `path` with `query`, record quota headers, return the body text.
    async fn get(&mut self, path: &str, query: &[(&str, String)]) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(query)
            .send()
            .await
            .with_context(|| format!("api-football request failed: {}", path))?;

        let remaining = parse_quota_header(resp.headers(), "x-ratelimit-requests-remaining");
        let limit = parse_quota_header(resp.headers(), "x-ratelimit-requests-limit");
        if limit > 0 {
            self.last_quota = Some(ApiQuota {
                requests_remaining: remaining,
                requests_limit: limit,
            });
        }

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("api-football {} ({}): {}", path, status, body);
        }
        resp.text()
            .await
            .with_context(|| format!("failed to read api-football response body: {}", path))
    }

    async fn team_profile(&mut self, league_id: u32, team_id: u64) -> Result<TeamProfile> {
        let body = self
            .get(
                "/teams/statistics",
                &[
                    ("league", league_id.to_string()),
                    ("season", self.season.to_string()),
                    ("team", team_id.to_string()),
                ],
            )
            .await?;
        let season = parse_team_statistics(&body)?;
        Ok(stats::profile_from_season(&season))
    }

    async fn head_to_head(&mut self, home_id: u64, away_id: u64) -> Result<HeadToHeadRecord> {
        let body = self
            .get(
                "/fixtures/headtohead",
                &[
                    ("h2h", format!("{}-{}", home_id, away_id)),
                    ("last", self.h2h_last.to_string()),
                ],
            )
            .await?;
        let meetings = parse_head_to_head(&body)?;
        Ok(stats::h2h_from_meetings(home_id, away_id, &meetings))
    }
}

#[async_trait]
impl FixtureFeed for ApiFootball {
    async fn fetch_fixtures(&mut self, date: NaiveDate) -> Result<Vec<Fixture>> {
        let mut fixtures = Vec::new();
        let mut last_err = None;
        let leagues = self.leagues.clone();

        for league in &leagues {
            let query = [
                ("date", date.format("%Y-%m-%d").to_string()),
                ("league", league.to_string()),
                ("season", self.season.to_string()),
            ];
            match self.get("/fixtures", &query).await.and_then(|body| parse_fixtures(&body)) {
                Ok(mut found) => {
                    tracing::debug!(league, count = found.len(), "fetched fixtures");
                    fixtures.append(&mut found);
                }
                Err(e) => {
                    tracing::warn!(league, "fixture fetch failed: {:#}", e);
                    last_err = Some(e);
                }
            }
        }

        match last_err {
            Some(e) if fixtures.is_empty() => {
                Err(e.context("every league fixture request failed"))
            }
            _ => Ok(fixtures),
        }
    }

    async fn fetch_stats(&mut self, fixture: &Fixture) -> Result<FixtureStats> {
        let home = self
            .team_profile(fixture.league_id, fixture.home_id)
            .await
            .map_err(|e| tracing::warn!(fixture_id = fixture.id, team = %fixture.home_team, "home stats unavailable: {:#}", e))
            .ok();
        let away = self
            .team_profile(fixture.league_id, fixture.away_id)
            .await
            .map_err(|e| tracing::warn!(fixture_id = fixture.id, team = %fixture.away_team, "away stats unavailable: {:#}", e))
            .ok();
        let h2h = self
            .head_to_head(fixture.home_id, fixture.away_id)
            .await
            .map_err(|e| tracing::warn!(fixture_id = fixture.id, "head-to-head unavailable: {:#}", e))
            .ok();

        Ok(FixtureStats { home, away, h2h })
    }

    fn last_quota(&self) -> Option<ApiQuota> {
        self.last_quota.clone()
    }
}
