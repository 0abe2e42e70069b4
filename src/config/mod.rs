use anyhow::Result;
use chrono::Duration;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

pub mod defaults;

use defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub web: WebConfig,
    pub dashboard: DashboardConfig,
    pub covid: CovidConfig,
    pub news: NewsConfig,
    /// Fields whose configured value had the wrong type and was replaced
    #[serde(skip)]
    pub warnings: Vec<ConfigWarning>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub title: String,
    pub favicon: String,
    /// Background sweep period; 0 leaves sweeping to page requests only
    pub sweep_interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CovidConfig {
    /// Lower-tier local authority name
    pub local: String,
    pub nation: String,
    pub update_interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    pub api_key: String,
    pub country_code: String,
    pub update_interval_seconds: u64,
    /// Space separated terms matched against headline titles
    pub search_terms: String,
}

/// Seconds as a `Duration`, or `None` above [`MAX_INTERVAL_SECONDS`]
pub fn interval_duration(seconds: u64) -> Option<Duration> {
    if seconds > MAX_INTERVAL_SECONDS {
        return None;
    }
    i64::try_from(seconds).ok().and_then(Duration::try_seconds)
}

fn interval_or_default(seconds: u64, default: u64) -> Duration {
    interval_duration(seconds)
        .or_else(|| interval_duration(default))
        .unwrap_or_else(Duration::zero)
}

impl CovidConfig {
    /// Repeat interval for covid updates
    pub fn update_interval(&self) -> Duration {
        interval_or_default(
            self.update_interval_seconds,
            DEFAULT_COVID_UPDATE_INTERVAL_SECONDS,
        )
    }
}

impl NewsConfig {
    /// Repeat interval for news updates
    pub fn update_interval(&self) -> Duration {
        interval_or_default(
            self.update_interval_seconds,
            DEFAULT_NEWS_UPDATE_INTERVAL_SECONDS,
        )
    }
}

/// A configured value that was rejected and replaced with its default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub field: String,
    pub found: String,
    pub expected: &'static str,
    pub replaced_with: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web: WebConfig {
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_PORT,
            },
            dashboard: DashboardConfig {
                title: DEFAULT_DASHBOARD_TITLE.to_string(),
                favicon: DEFAULT_DASHBOARD_FAVICON.to_string(),
                sweep_interval_seconds: DEFAULT_SWEEP_INTERVAL_SECONDS,
            },
            covid: CovidConfig {
                local: DEFAULT_COVID_LOCAL.to_string(),
                nation: DEFAULT_COVID_NATION.to_string(),
                update_interval_seconds: DEFAULT_COVID_UPDATE_INTERVAL_SECONDS,
            },
            news: NewsConfig {
                api_key: DEFAULT_NEWS_API_KEY.to_string(),
                country_code: DEFAULT_NEWS_COUNTRY_CODE.to_string(),
                update_interval_seconds: DEFAULT_NEWS_UPDATE_INTERVAL_SECONDS,
                search_terms: DEFAULT_NEWS_SEARCH_TERMS.to_string(),
            },
            warnings: Vec::new(),
        }
    }
}

impl Config {
    /// Load the config file, writing the defaults out if it does not exist
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if Path::new(config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            Self::from_toml_str(&contents)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            Ok(default_config)
        }
    }

    /// Parse a TOML document, validating each field independently.
    ///
    /// Syntax errors are returned. A field with the wrong type falls back to
    /// its documented default and is recorded in [`Config::warnings`].
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let table: toml::Table = contents.parse()?;
        let mut reader = FieldReader {
            table: &table,
            warnings: Vec::new(),
        };

        let web = WebConfig {
            host: reader.field("web", "host", "string", DEFAULT_HOST.to_string()),
            port: reader.field("web", "port", "port number", DEFAULT_PORT),
        };
        let dashboard = DashboardConfig {
            title: reader.field(
                "dashboard",
                "title",
                "string",
                DEFAULT_DASHBOARD_TITLE.to_string(),
            ),
            favicon: reader.field(
                "dashboard",
                "favicon",
                "string",
                DEFAULT_DASHBOARD_FAVICON.to_string(),
            ),
            sweep_interval_seconds: reader.interval(
                "dashboard",
                "sweep_interval_seconds",
                DEFAULT_SWEEP_INTERVAL_SECONDS,
            ),
        };
        let covid = CovidConfig {
            local: reader.field("covid", "local", "string", DEFAULT_COVID_LOCAL.to_string()),
            nation: reader.field("covid", "nation", "string", DEFAULT_COVID_NATION.to_string()),
            update_interval_seconds: reader.interval(
                "covid",
                "update_interval_seconds",
                DEFAULT_COVID_UPDATE_INTERVAL_SECONDS,
            ),
        };
        let news = NewsConfig {
            api_key: reader.field("news", "api_key", "string", DEFAULT_NEWS_API_KEY.to_string()),
            country_code: reader.field(
                "news",
                "country_code",
                "string",
                DEFAULT_NEWS_COUNTRY_CODE.to_string(),
            ),
            update_interval_seconds: reader.interval(
                "news",
                "update_interval_seconds",
                DEFAULT_NEWS_UPDATE_INTERVAL_SECONDS,
            ),
            search_terms: reader.field(
                "news",
                "search_terms",
                "string",
                DEFAULT_NEWS_SEARCH_TERMS.to_string(),
            ),
        };

        Ok(Self {
            web,
            dashboard,
            covid,
            news,
            warnings: reader.warnings,
        })
    }
}

const INTERVAL_EXPECTED: &str = "non-negative integer of at most 315360000 seconds";

struct FieldReader<'a> {
    table: &'a toml::Table,
    warnings: Vec<ConfigWarning>,
}

impl FieldReader<'_> {
    fn field<T>(&mut self, section: &str, key: &str, expected: &'static str, default: T) -> T
    where
        T: DeserializeOwned + std::fmt::Debug,
    {
        let field = format!("{section}.{key}");
        let value = self
            .table
            .get(section)
            .and_then(toml::Value::as_table)
            .and_then(|section| section.get(key));

        let Some(value) = value else {
            debug!("Config field '{}' not set, using default {:?}", field, default);
            return default;
        };

        match T::deserialize(value.clone()) {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(
                    "Config field '{}' invalid type. {} should be: {}",
                    field,
                    value.type_str(),
                    expected
                );
                warn!("Invalid config value '{}' replaced with '{:?}'", value, default);
                self.warnings.push(ConfigWarning {
                    field,
                    found: value.to_string(),
                    expected,
                    replaced_with: format!("{default:?}"),
                });
                default
            }
        }
    }

    /// An interval in seconds, bounded by [`MAX_INTERVAL_SECONDS`]
    fn interval(&mut self, section: &str, key: &str, default: u64) -> u64 {
        let seconds = self.field(section, key, INTERVAL_EXPECTED, default);
        if interval_duration(seconds).is_some() {
            return seconds;
        }

        let field = format!("{section}.{key}");
        warn!(
            "Config field '{}' out of range. {} should be: {}",
            field, seconds, INTERVAL_EXPECTED
        );
        warn!("Invalid config value '{}' replaced with '{}'", seconds, default);
        self.warnings.push(ConfigWarning {
            field,
            found: seconds.to_string(),
            expected: INTERVAL_EXPECTED,
            replaced_with: default.to_string(),
        });
        default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_is_read() {
        let config = Config::from_toml_str(
            r#"
            [web]
            host = "127.0.0.1"
            port = 9000

            [dashboard]
            title = "Local Dashboard"
            favicon = "favicon.png"
            sweep_interval_seconds = 5

            [covid]
            local = "Leeds"
            nation = "Scotland"
            update_interval_seconds = 3600

            [news]
            api_key = "abc123"
            country_code = "us"
            update_interval_seconds = 600
            search_terms = "vaccine"
            "#,
        )
        .unwrap();

        assert_eq!(config.web.port, 9000);
        assert_eq!(config.dashboard.title, "Local Dashboard");
        assert_eq!(config.covid.local, "Leeds");
        assert_eq!(config.covid.update_interval_seconds, 3600);
        assert_eq!(config.news.api_key, "abc123");
        assert_eq!(config.news.search_terms, "vaccine");
        assert!(config.warnings.is_empty());
    }

    #[test]
    fn test_wrong_types_fall_back_to_defaults() {
        let config = Config::from_toml_str(
            r#"
            [covid]
            local = 42
            update_interval_seconds = "daily"

            [news]
            update_interval_seconds = -5
            "#,
        )
        .unwrap();

        assert_eq!(config.covid.local, DEFAULT_COVID_LOCAL);
        assert_eq!(
            config.covid.update_interval_seconds,
            DEFAULT_COVID_UPDATE_INTERVAL_SECONDS
        );
        assert_eq!(
            config.news.update_interval_seconds,
            DEFAULT_NEWS_UPDATE_INTERVAL_SECONDS
        );

        let fields: Vec<&str> = config.warnings.iter().map(|w| w.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "covid.local",
                "covid.update_interval_seconds",
                "news.update_interval_seconds"
            ]
        );
        assert_eq!(config.warnings[0].found, "42");
    }

    #[test]
    fn test_out_of_range_interval_falls_back_to_default() {
        let config = Config::from_toml_str(
            "[covid]\nupdate_interval_seconds = 10000000000000000\n\n[news]\nupdate_interval_seconds = 600",
        )
        .unwrap();

        assert_eq!(
            config.covid.update_interval_seconds,
            DEFAULT_COVID_UPDATE_INTERVAL_SECONDS
        );
        assert_eq!(config.news.update_interval_seconds, 600);
        assert_eq!(config.warnings.len(), 1);
        assert_eq!(config.warnings[0].field, "covid.update_interval_seconds");
        assert_eq!(config.warnings[0].found, "10000000000000000");
        assert_eq!(config.covid.update_interval(), Duration::days(1));
    }

    #[test]
    fn test_interval_bounds() {
        assert_eq!(
            interval_duration(MAX_INTERVAL_SECONDS),
            Some(Duration::seconds(315_360_000))
        );
        assert_eq!(interval_duration(MAX_INTERVAL_SECONDS + 1), None);
        assert_eq!(interval_duration(u64::MAX), None);
        assert_eq!(interval_duration(0), Some(Duration::zero()));

        let mut config = Config::default();
        config.news.update_interval_seconds = u64::MAX;
        assert_eq!(config.news.update_interval(), Duration::days(1));
    }

    #[test]
    fn test_missing_fields_use_defaults_without_warnings() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.web.port, DEFAULT_PORT);
        assert_eq!(config.news.country_code, DEFAULT_NEWS_COUNTRY_CODE);
        assert!(config.warnings.is_empty());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Config::from_toml_str("[web\nport = ").is_err());
    }

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path = path.to_str().unwrap();

        let config = Config::load_from_file(path).unwrap();
        assert_eq!(config.dashboard.title, DEFAULT_DASHBOARD_TITLE);

        let reloaded = Config::load_from_file(path).unwrap();
        assert_eq!(reloaded.covid.nation, DEFAULT_COVID_NATION);
        assert!(reloaded.warnings.is_empty());
    }
}
