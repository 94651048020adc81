use crate::config::SchedulerConfig;
use crate::engine::ScoringModel;
use crate::feed::FixtureFeed;
use crate::pipeline::{self, CycleReport};
use crate::store::PredictionStore;
use crate::stream::{PredictionHub, PredictionSnapshot};
use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use std::time::Duration;
use tokio::sync::watch;

/// Drives periodic recomputation: fetch -> score -> persist -> publish.
pub struct Scheduler {
    feed: Box<dyn FixtureFeed>,
    model: ScoringModel,
    store: PredictionStore,
    hub: PredictionHub,
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(
        feed: Box<dyn FixtureFeed>,
        model: ScoringModel,
        store: PredictionStore,
        hub: PredictionHub,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            feed,
            model,
            store,
            hub,
            config,
        }
    }

    /// One cycle for `date`. On a fixture-list failure the previous
    /// snapshot is left in place and the error is returned.
    ///
    /// Subscribers always receive a scored cycle; a store write failure is
    /// returned only after publishing.
    pub async fn run_once(&mut self, date: NaiveDate) -> Result<CycleReport> {
        let report = pipeline::run_cycle(
            self.feed.as_mut(),
            &self.model,
            date,
            self.config.max_fixtures_per_tick,
        )
        .await?;

        let snapshot = PredictionSnapshot::new(report.records.clone());
        self.hub.publish(snapshot.clone());
        let saved = self.store.save(snapshot);

        if let Some(quota) = self.feed.last_quota() {
            tracing::info!(
                remaining = quota.requests_remaining,
                limit = quota.requests_limit,
                "provider quota"
            );
        }

        saved.context("predictions published but not saved")?;
        Ok(report)
    }

    /// Tick until `shutdown` flips to true. Missed ticks are skipped, and a
    /// failed cycle never stops the loop.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.config.poll_interval_s));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let today = Utc::now().date_naive();
                    if let Err(e) = self.run_once(today).await {
                        tracing::error!("prediction cycle failed: {:#}", e);
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("scheduler stopping");
                        break;
                    }
                }
            }
        }
    }
}
