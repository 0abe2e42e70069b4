//! Background task that ticks the dashboard on a fixed interval
//!
//! Requests tick the dashboard too; the sweeper keeps scheduled updates
//! running while nobody has the page open.

use anyhow::Result;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::dashboard::SharedDashboard;

pub struct SweeperService {
    dashboard: SharedDashboard,
    period: Duration,
}

impl SweeperService {
    pub fn new(dashboard: SharedDashboard, period: Duration) -> Self {
        Self { dashboard, period }
    }

    /// Run forever. Returns an error only if the period is zero.
    pub async fn start(self) -> Result<()> {
        if self.period.is_zero() {
            anyhow::bail!("sweep interval must be greater than zero");
        }
        info!("Starting update sweeper (every {:?})", self.period);

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            trace!("Sweeper tick");
            self.sweep().await;
        }
    }

    /// One pass over the due updates
    pub async fn sweep(&self) {
        let report = self.dashboard.lock().await.tick().await;
        for failure in &report.failures {
            warn!(
                "Scheduled {} update '{}' failed: {}",
                failure.domain, failure.name, failure.error
            );
        }
        if !report.failures.is_empty() {
            debug!("Sweep finished with {} failed updates", report.failures.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dashboard::{CreateUpdate, Dashboard};
    use crate::errors::SourceResult;
    use crate::sources::{CovidArea, CovidDataset, CovidSource, NewsSource, RawArticle};
    use crate::utils::ManualClock;
    use async_trait::async_trait;
    use chrono::{Local, TimeZone};
    use std::sync::Arc;

    struct EmptyCovid;

    #[async_trait]
    impl CovidSource for EmptyCovid {
        async fn fetch(&self, _area: &CovidArea) -> SourceResult<CovidDataset> {
            CovidDataset::parse_csv("areaName")
        }
    }

    struct EmptyNews;

    #[async_trait]
    impl NewsSource for EmptyNews {
        async fn top_headlines(&self) -> SourceResult<Vec<RawArticle>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_sweep_runs_due_updates() {
        let clock = Arc::new(ManualClock::new(
            Local.with_ymd_and_hms(2021, 12, 1, 8, 0, 0).unwrap(),
        ));
        let mut dashboard = Dashboard::new(
            &Config::default(),
            Arc::new(EmptyCovid),
            Arc::new(EmptyNews),
            clock.clone(),
        );
        dashboard.create_update(&CreateUpdate {
            time: "08:00".to_string(),
            name: "now".to_string(),
            covid: true,
            news: false,
            repeats: false,
        });
        let shared = dashboard.into_shared();

        SweeperService::new(shared.clone(), Duration::from_secs(1))
            .sweep()
            .await;
        assert!(shared.lock().await.covid_updates().registry().is_empty());
    }

    #[tokio::test]
    async fn test_zero_period_is_rejected() {
        let clock = Arc::new(ManualClock::new(Local::now()));
        let shared = Dashboard::new(
            &Config::default(),
            Arc::new(EmptyCovid),
            Arc::new(EmptyNews),
            clock,
        )
        .into_shared();
        assert!(SweeperService::new(shared, Duration::ZERO).start().await.is_err());
    }
}
