//! Latest covid datasets for the configured local area and nation

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

use crate::errors::{SourceError, SourceResult};
use crate::job_scheduling::UpdateAction;
use crate::sources::{CovidArea, CovidDataset, CovidSource, CovidSummary};

pub struct CovidData {
    source: Arc<dyn CovidSource>,
    local_area: CovidArea,
    nation_area: CovidArea,
    local: Option<CovidDataset>,
    national: Option<CovidDataset>,
}

impl CovidData {
    pub fn new(
        source: Arc<dyn CovidSource>,
        local_area: impl Into<String>,
        nation_area: impl Into<String>,
    ) -> Self {
        Self {
            source,
            local_area: CovidArea::local(local_area),
            nation_area: CovidArea::nation(nation_area),
            local: None,
            national: None,
        }
    }

    /// Fetch both areas. A failed area keeps its previous dataset; the first
    /// failure is returned after both have been tried.
    pub async fn refresh(&mut self) -> SourceResult<()> {
        let mut first_error: Option<SourceError> = None;

        match self.source.fetch(&self.local_area).await {
            Ok(dataset) => self.local = Some(dataset),
            Err(e) => {
                error!("COVID data for {} not updated: {}", self.local_area.name, e);
                first_error = Some(e);
            }
        }

        match self.source.fetch(&self.nation_area).await {
            Ok(dataset) => self.national = Some(dataset),
            Err(e) => {
                error!("COVID data for {} not updated: {}", self.nation_area.name, e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                info!("COVID data updated.");
                Ok(())
            }
        }
    }

    pub fn local_area(&self) -> &CovidArea {
        &self.local_area
    }

    pub fn nation_area(&self) -> &CovidArea {
        &self.nation_area
    }

    pub fn local_dataset(&self) -> Option<&CovidDataset> {
        self.local.as_ref()
    }

    pub fn national_dataset(&self) -> Option<&CovidDataset> {
        self.national.as_ref()
    }

    /// Zeroes until the first successful fetch
    pub fn local_summary(&self) -> CovidSummary {
        self.local.as_ref().map(CovidDataset::summarize).unwrap_or_default()
    }

    pub fn national_summary(&self) -> CovidSummary {
        self.national.as_ref().map(CovidDataset::summarize).unwrap_or_default()
    }
}

#[async_trait]
impl UpdateAction for CovidData {
    async fn run(&mut self) -> SourceResult<()> {
        self.refresh().await
    }
}
