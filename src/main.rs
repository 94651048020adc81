use anyhow::Result;
use chrono::Utc;
use fixture_forecast::config::{Config, FeedProvider};
use fixture_forecast::engine::ScoringModel;
use fixture_forecast::feed::api_football::ApiFootball;
use fixture_forecast::feed::simulated::SimulatedFeed;
use fixture_forecast::feed::FixtureFeed;
use fixture_forecast::pipeline::{CycleReport, Provenance};
use fixture_forecast::scheduler::Scheduler;
use fixture_forecast::store::PredictionStore;
use fixture_forecast::stream::{self, PredictionHub};
use std::path::Path;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

/// Pick the fixture source: simulated on request or when no API key is set.
fn build_feed(config: &Config, force_simulated: bool) -> Result<Box<dyn FixtureFeed>> {
    let sim_config = config.simulation.clone().unwrap_or_default();
    if force_simulated || config.feed.provider == FeedProvider::Simulated {
        return Ok(Box::new(SimulatedFeed::new(&sim_config)));
    }
    match Config::api_football_key() {
        Ok(key) => Ok(Box::new(ApiFootball::new(key, &config.feed)?)),
        Err(e) => {
            println!("  {:#} -- falling back to simulated statistics", e);
            tracing::warn!("{:#}; using simulated feed", e);
            Ok(Box::new(SimulatedFeed::new(&sim_config)))
        }
    }
}

fn print_report(report: &CycleReport) {
    println!();
    println!(
        "  {:<40} {:>4} {:>4} {:>4}  {:>5} {:>5}  {:>4}  Strong markets",
        "Fixture", "H", "D", "A", "BTTS", "Late", "xG"
    );
    for record in &report.records {
        let p = &record.prediction;
        let markets: Vec<String> = p
            .strong_markets
            .iter()
            .map(|m| format!("{} ({}%)", m.market_name, m.probability))
            .collect();
        let marker = match record.provenance {
            Provenance::Computed => "",
            Provenance::Fallback { .. } => " *",
        };
        println!(
            "  {:<40} {:>4} {:>4} {:>4}  {:>5} {:>5}  {:>4.1}  {}{}",
            record.fixture.matchup(),
            p.winner_probability.home,
            p.winner_probability.draw,
            p.winner_probability.away,
            p.btts_probability,
            p.late_goal_probability,
            p.expected_goals.total,
            markets.join(", "),
            marker,
        );
    }
    println!();
    println!(
        "  computed: {}  fallback (*): {}  rejected: {}",
        report.computed, report.fallback, report.rejected
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let log_file = std::fs::File::create("fixture-forecast.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fixture_forecast=info")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .init();

    let force_simulated = std::env::args().any(|arg| arg == "--simulate");
    let once = std::env::args().any(|arg| arg == "--once");

    let config = Config::load(Path::new("config.toml"))?;

    // Load saved keys from .env (real env vars take precedence)
    Config::load_env_file();

    println!();
    println!("  Fixture Forecast v{}", env!("CARGO_PKG_VERSION"));
    println!("  =======================");
    println!();

    let model = ScoringModel::new(config.model.clone())?;
    let feed = build_feed(&config, force_simulated)?;
    let store = PredictionStore::open(&config.store.path)?;
    let hub = PredictionHub::new(store.snapshot().clone());
    let mut scheduler = Scheduler::new(feed, model, store, hub.clone(), config.scheduler.clone());

    if once {
        let report = scheduler.run_once(Utc::now().date_naive()).await?;
        print_report(&report);
        return Ok(());
    }

    let bind_addr = config.stream.bind_addr.clone();
    let stream_hub = hub.clone();
    tokio::spawn(async move {
        if let Err(e) = stream::serve(&bind_addr, stream_hub).await {
            tracing::error!("prediction stream stopped: {:#}", e);
        }
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler_task = tokio::spawn(scheduler.run(shutdown_rx));

    println!(
        "  Scoring every {}s, streaming on ws://{} (Ctrl-C to stop)",
        config.scheduler.poll_interval_s, config.stream.bind_addr
    );

    tokio::signal::ctrl_c().await?;
    let _ = shutdown_tx.send(true);
    scheduler_task.await?;

    tracing::debug!("shutting down");
    Ok(())
}
