//! newsapi.org top headlines client

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{error, info};

use super::NewsSource;
use crate::errors::{SourceError, SourceResult};

pub const NEWS_API_URL: &str = "https://newsapi.org/v2/top-headlines";

/// Key value shipped in example configs, treated as unset
pub const PLACEHOLDER_API_KEY: &str = "[API_KEY_HERE]";

const SERVICE_NAME: &str = "newsapi.org";

/// An article as returned by the provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawArticle {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
}

impl RawArticle {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            url: url.into(),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
struct HeadlinesResponse {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

/// Client for the newsapi.org top headlines endpoint
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    country_code: String,
}

impl NewsApiClient {
    pub fn new(
        client: reqwest::Client,
        api_key: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Self {
        Self::with_base_url(client, NEWS_API_URL, api_key, country_code)
    }

    pub fn with_base_url(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            country_code: country_code.into(),
        }
    }

    /// Whether a usable key has been configured
    pub fn has_credential(&self) -> bool {
        let key = self.api_key.trim();
        !key.is_empty() && key != PLACEHOLDER_API_KEY
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    async fn top_headlines(&self) -> SourceResult<Vec<RawArticle>> {
        if !self.has_credential() {
            error!("The news API key has not been set in the config file");
            return Err(SourceError::missing_credential(
                SERVICE_NAME,
                "the news API key has not been set in the config file",
            ));
        }

        info!("Requesting recent top headlines...");
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("country", self.country_code.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            let message = response.text().await.unwrap_or_default();
            error!("The news API rejected the configured key");
            return Err(SourceError::unauthorized(SERVICE_NAME, message));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let headlines: HeadlinesResponse = serde_json::from_str(&body)
            .map_err(|e| SourceError::parse_error("news headlines", e.to_string()))?;
        Ok(headlines.articles)
    }
}
