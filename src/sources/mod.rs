//! External data providers
//!
//! The dashboard only talks to these traits, so tests and alternative
//! providers can stand in for the real HTTP clients.

use async_trait::async_trait;

use crate::errors::SourceResult;

pub mod covid;
pub mod news;

pub use covid::{AreaType, CovidArea, CovidDataset, CovidSummary, UkCovidClient};
pub use news::{NewsApiClient, RawArticle};

/// Supplies covid case, hospital and death figures for an area
#[async_trait]
pub trait CovidSource: Send + Sync {
    async fn fetch(&self, area: &CovidArea) -> SourceResult<CovidDataset>;
}

/// Supplies current top headlines
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Fails with `SourceError::MissingCredential` or
    /// `SourceError::Unauthorized` when the provider key is unusable
    async fn top_headlines(&self) -> SourceResult<Vec<RawArticle>>;
}
