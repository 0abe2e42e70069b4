//! Dashboard state: update controllers, covid data and the news feed
//!
//! Every request and every background sweep goes through [`Dashboard::handle_event`]
//! and [`Dashboard::tick`] while holding the shared lock, so callers never see a
//! half applied change.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::job_scheduling::{
    build_display_list, DisplayUpdate, Domain, UpdateController, UpdateFailure,
};
use crate::services::{Article, CovidData, NewsFeed};
use crate::sources::{CovidSource, CovidSummary, NewsSource};
use crate::utils::time::parse_update_time;
use crate::utils::Clock;

pub type SharedDashboard = Arc<Mutex<Dashboard>>;

/// Query parameters understood by the dashboard pages
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DashboardEvent {
    /// Update time, "HH:MM"
    #[serde(rename = "update")]
    pub update_time: Option<String>,
    /// Update name
    #[serde(rename = "two")]
    pub name: Option<String>,
    #[serde(rename = "covid-data")]
    pub covid_data: Option<String>,
    pub news: Option<String>,
    pub repeat: Option<String>,
    /// Name of the update to remove
    pub update_item: Option<String>,
    /// Title of the article to block
    pub notif: Option<String>,
}

/// A request to create an update in one or both domains
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUpdate {
    pub time: String,
    pub name: String,
    pub covid: bool,
    pub news: bool,
    pub repeats: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created { covid: bool, news: bool },
    DuplicateName,
    NoDataSelected,
    InvalidTime,
    MissingName,
}

/// The action taken for an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    None,
    Create(CreateOutcome),
    Remove { name: String, removed: bool },
    Block { title: String, removed: usize },
}

/// Failures from the due updates run by one tick
#[derive(Debug, Default)]
pub struct TickReport {
    pub failures: Vec<UpdateFailure>,
}

impl TickReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn has_credential_failure(&self) -> bool {
        self.failures
            .iter()
            .any(|failure| failure.error.is_credential_failure())
    }
}

/// Everything the page and the JSON view render
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub title: String,
    pub favicon: String,
    pub location: String,
    pub nation_location: String,
    pub local_seven_day_cases: i64,
    pub national_seven_day_cases: i64,
    pub hospital_cases: i64,
    pub total_deaths: i64,
    pub news_articles: Vec<Article>,
    pub news_error: Option<String>,
    pub updates: Vec<DisplayUpdate>,
}

pub struct Dashboard {
    title: String,
    favicon: String,
    clock: Arc<dyn Clock>,
    covid_updates: UpdateController,
    news_updates: UpdateController,
    covid: CovidData,
    news: NewsFeed,
    updates: Vec<DisplayUpdate>,
}

/// Checkbox style parameters count as set when present and non-empty
fn is_set(param: &Option<String>) -> bool {
    param.as_deref().is_some_and(|value| !value.is_empty())
}

impl DashboardEvent {
    /// The create request carried by this event, if any
    pub fn create_request(&self) -> Option<CreateUpdate> {
        let time = self.update_time.as_deref().filter(|t| !t.is_empty())?;
        Some(CreateUpdate {
            time: time.to_string(),
            name: self.name.clone().unwrap_or_default(),
            covid: is_set(&self.covid_data),
            news: is_set(&self.news),
            repeats: is_set(&self.repeat),
        })
    }
}

impl Dashboard {
    pub fn new(
        config: &Config,
        covid_source: Arc<dyn CovidSource>,
        news_source: Arc<dyn NewsSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            title: config.dashboard.title.clone(),
            favicon: config.dashboard.favicon.clone(),
            clock,
            covid_updates: UpdateController::new(Domain::Covid, config.covid.update_interval()),
            news_updates: UpdateController::new(Domain::News, config.news.update_interval()),
            covid: CovidData::new(covid_source, &config.covid.local, &config.covid.nation),
            news: NewsFeed::new(news_source, &config.news.search_terms),
            updates: Vec::new(),
        }
    }

    pub fn into_shared(self) -> SharedDashboard {
        Arc::new(Mutex::new(self))
    }

    /// Fetch covid data and news once, outside of any schedule.
    ///
    /// Failures are logged and returned in the report; existing data is kept.
    pub async fn initial_refresh(&mut self) -> TickReport {
        let mut report = TickReport::default();
        if let Err(error) = self.covid.refresh().await {
            report.failures.push(UpdateFailure {
                domain: Domain::Covid,
                name: "startup".to_string(),
                error,
            });
        }
        if let Err(error) = self.news.refresh().await {
            report.failures.push(UpdateFailure {
                domain: Domain::News,
                name: "startup".to_string(),
                error,
            });
        }
        report
    }

    /// Create a job under `request.name` in every requested domain.
    pub fn create_update(&mut self, request: &CreateUpdate) -> CreateOutcome {
        let name = request.name.trim();
        if name.is_empty() {
            warn!("Update name missing, request ignored.");
            return CreateOutcome::MissingName;
        }
        if self.covid_updates.contains(name) || self.news_updates.contains(name) {
            warn!("Update name already exists.");
            return CreateOutcome::DuplicateName;
        }
        if !request.covid && !request.news {
            warn!("Empty update created, request ignored.");
            return CreateOutcome::NoDataSelected;
        }
        if let Err(e) = parse_update_time(&request.time) {
            warn!("Update '{}' not created: {}", name, e);
            return CreateOutcome::InvalidTime;
        }

        let now = self.clock.now();
        if request.covid {
            self.covid_updates
                .create_update(&request.time, name, request.repeats, now);
        }
        if request.news {
            self.news_updates
                .create_update(&request.time, name, request.repeats, now);
        }
        CreateOutcome::Created {
            covid: request.covid,
            news: request.news,
        }
    }

    /// Cancel `name` in both domains. Returns whether anything was removed.
    pub fn remove_update(&mut self, name: &str) -> bool {
        let covid = self.covid_updates.cancel(name);
        let news = self.news_updates.cancel(name);
        if !covid && !news {
            debug!("No update named '{}' to remove", name);
        }
        covid || news
    }

    pub fn block_article(&mut self, title: &str) -> usize {
        self.news.block(title)
    }

    /// Apply at most one event: create, then remove, then block.
    pub fn handle_event(&mut self, event: &DashboardEvent) -> EventOutcome {
        if let Some(request) = event.create_request() {
            return EventOutcome::Create(self.create_update(&request));
        }
        if let Some(name) = event.update_item.as_deref().filter(|n| !n.is_empty()) {
            let removed = self.remove_update(name);
            return EventOutcome::Remove {
                name: name.to_string(),
                removed,
            };
        }
        if let Some(title) = event.notif.as_deref().filter(|t| !t.is_empty()) {
            let removed = self.block_article(title);
            return EventOutcome::Block {
                title: title.to_string(),
                removed,
            };
        }
        EventOutcome::None
    }

    /// Run the due covid updates, then the due news updates, then rebuild
    /// the display list.
    pub async fn tick(&mut self) -> TickReport {
        let now = self.clock.now();
        let mut failures = self.covid_updates.run_pending(&mut self.covid, now).await;
        failures.extend(self.news_updates.run_pending(&mut self.news, now).await);

        for failure in &failures {
            if failure.error.is_credential_failure() {
                warn!(
                    "{} update '{}' could not authenticate: {}",
                    failure.domain, failure.name, failure.error
                );
            }
        }

        self.refresh_display_list();
        TickReport { failures }
    }

    pub fn refresh_display_list(&mut self) {
        let updates = build_display_list(self.covid_updates.registry(), self.news_updates.registry());
        self.updates = updates;
    }

    pub fn view(&self) -> DashboardView {
        let local: CovidSummary = self.covid.local_summary();
        let national: CovidSummary = self.covid.national_summary();

        DashboardView {
            title: self.title.clone(),
            favicon: self.favicon.clone(),
            location: self.covid.local_area().name.clone(),
            nation_location: self.covid.nation_area().name.clone(),
            local_seven_day_cases: local.seven_day_cases,
            national_seven_day_cases: national.seven_day_cases,
            hospital_cases: national.hospital_cases,
            total_deaths: national.total_deaths,
            news_articles: self.news.store().display_articles(),
            news_error: self.news.last_error().map(str::to_string),
            updates: self.updates.clone(),
        }
    }

    pub fn updates(&self) -> &[DisplayUpdate] {
        &self.updates
    }

    pub fn covid_updates(&self) -> &UpdateController {
        &self.covid_updates
    }

    pub fn news_updates(&self) -> &UpdateController {
        &self.news_updates
    }

    pub fn news(&self) -> &NewsFeed {
        &self.news
    }
}

/// Handle one request: apply its event, tick, and return the view.
pub async fn process_request(dashboard: &SharedDashboard, event: &DashboardEvent) -> DashboardView {
    let mut dashboard = dashboard.lock().await;
    let outcome = dashboard.handle_event(event);
    if outcome != EventOutcome::None {
        info!("Dashboard event handled: {:?}", outcome);
    }
    let report = dashboard.tick().await;
    for failure in &report.failures {
        warn!(
            "Scheduled {} update '{}' failed: {}",
            failure.domain, failure.name, failure.error
        );
    }
    dashboard.view()
}
