use crate::engine::markets::DEFAULT_STRONG_THRESHOLD;
use crate::engine::ScoringError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const ENV_FILE: &str = ".env";
const API_KEY_VAR: &str = "API_FOOTBALL_KEY";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    pub feed: FeedConfig,
    pub simulation: Option<SimulationConfig>,
    pub scheduler: SchedulerConfig,
    pub stream: StreamConfig,
    pub store: StoreConfig,
}

/// Tunables of the scoring model.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ModelConfig {
    /// Multiplier applied to the home side's strength.
    #[serde(default = "default_home_advantage")]
    pub home_advantage: f64,
    /// Percent at or above which a market is reported as strong.
    #[serde(default = "default_strong_threshold")]
    pub strong_threshold: u8,
}

fn default_home_advantage() -> f64 { 1.2 }
fn default_strong_threshold() -> u8 { DEFAULT_STRONG_THRESHOLD }

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            home_advantage: default_home_advantage(),
            strong_threshold: default_strong_threshold(),
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> Result<(), ScoringError> {
        if !self.home_advantage.is_finite() || self.home_advantage <= 0.0 {
            return Err(ScoringError::InvalidConfig(format!(
                "home_advantage must be a positive number, got {}",
                self.home_advantage
            )));
        }
        if self.strong_threshold > 100 {
            return Err(ScoringError::InvalidConfig(format!(
                "strong_threshold must be at most 100, got {}",
                self.strong_threshold
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum FeedProvider {
    ApiFootball,
    Simulated,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    pub provider: FeedProvider,
    pub base_url: String,
    #[serde(default)]
    pub leagues: Vec<u32>,
    pub season: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_h2h_last")]
    pub h2h_last: u32,
}

fn default_request_timeout() -> u64 { 10_000 }
fn default_h2h_last() -> u32 { 10 }

#[derive(Debug, Deserialize, Clone)]
pub struct SimulationConfig {
    pub seed: Option<u64>,
    #[serde(default = "default_fixtures_per_day")]
    pub fixtures_per_day: usize,
}

fn default_fixtures_per_day() -> usize { 8 }

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            fixtures_per_day: default_fixtures_per_day(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SchedulerConfig {
    pub poll_interval_s: u64,
    pub max_fixtures_per_tick: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StreamConfig {
    pub bind_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .with_context(|| "Failed to parse config TOML")?;
        config.model.validate()?;
        if config.scheduler.poll_interval_s == 0 {
            anyhow::bail!("scheduler.poll_interval_s must be > 0");
        }
        Ok(config)
    }

    /// Load .env file into process environment. Real env vars take precedence.
    pub fn load_env_file() {
        let path = Path::new(ENV_FILE);
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return,
        };
        for (key, value) in parse_env_lines(&content) {
            if std::env::var(key).is_err() {
                std::env::set_var(key, value);
            }
        }
    }

    /// API-Football key from the environment (or .env).
    pub fn api_football_key() -> Result<String> {
        match std::env::var(API_KEY_VAR) {
            Ok(key) if !key.trim().is_empty() => Ok(sanitize_key(&key)),
            _ => anyhow::bail!("{} is not set", API_KEY_VAR),
        }
    }
}

/// `KEY=VALUE` pairs from .env content, skipping blanks and comments.
fn parse_env_lines(content: &str) -> Vec<(&str, &str)> {
    // Strip BOM if present (common on Windows-created files)
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    content
        .lines()
        .map(|line| line.trim().trim_matches('\r'))
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim().trim_matches('"').trim_matches('\'')))
        .collect()
}

/// Strip carriage returns, BOM, and other invisible chars from a key value.
fn sanitize_key(raw: &str) -> String {
    raw.replace(['\r', '\u{feff}', '\u{200b}'], "")
        .trim()
        .to_string()
}
