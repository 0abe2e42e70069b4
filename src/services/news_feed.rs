//! Fetches, filters and stores relevant headlines

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

use super::content_store::{relevant_headlines, ContentStore};
use crate::errors::SourceResult;
use crate::job_scheduling::UpdateAction;
use crate::sources::NewsSource;

pub struct NewsFeed {
    source: Arc<dyn NewsSource>,
    search_terms: String,
    store: ContentStore,
    last_error: Option<String>,
}

impl NewsFeed {
    pub fn new(source: Arc<dyn NewsSource>, search_terms: impl Into<String>) -> Self {
        Self {
            source,
            search_terms: search_terms.into(),
            store: ContentStore::new(),
            last_error: None,
        }
    }

    /// Fetch headlines and add the relevant, unseen, unblocked ones.
    ///
    /// On failure the stored articles are left untouched and the error is
    /// returned to the caller.
    pub async fn refresh(&mut self) -> SourceResult<()> {
        let headlines = match self.source.top_headlines().await {
            Ok(headlines) => headlines,
            Err(e) => {
                if e.is_credential_failure() {
                    error!("News refresh aborted, credential problem: {}", e);
                } else {
                    error!("News refresh failed: {}", e);
                }
                self.last_error = Some(e.to_string());
                return Err(e);
            }
        };

        let relevant = relevant_headlines(&headlines, &self.search_terms);
        let added = self.store.ingest(&relevant);
        self.last_error = None;
        info!("News articles updated ({} new).", added);
        Ok(())
    }

    pub fn block(&mut self, title: &str) -> usize {
        self.store.block(title)
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// Error from the most recent refresh, cleared by a successful one
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[async_trait]
impl UpdateAction for NewsFeed {
    async fn run(&mut self) -> SourceResult<()> {
        self.refresh().await
    }
}
