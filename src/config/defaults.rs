/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Web server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

// Dashboard defaults
pub const DEFAULT_DASHBOARD_TITLE: &str = "COVID-19 Dashboard";
pub const DEFAULT_DASHBOARD_FAVICON: &str = "https://i.ibb.co/7nYCWzN/Favicon.png";
pub const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 1;

// Covid data defaults
pub const DEFAULT_COVID_LOCAL: &str = "Exeter";
pub const DEFAULT_COVID_NATION: &str = "England";
pub const DEFAULT_COVID_UPDATE_INTERVAL_SECONDS: u64 = 86400;

// News defaults
pub const DEFAULT_NEWS_API_KEY: &str = "";
pub const DEFAULT_NEWS_COUNTRY_CODE: &str = "gb";
pub const DEFAULT_NEWS_UPDATE_INTERVAL_SECONDS: u64 = 86400;
pub const DEFAULT_NEWS_SEARCH_TERMS: &str = "Covid COVID-19 coronavirus";

// Longest accepted interval: ten 365-day years
pub const MAX_INTERVAL_SECONDS: u64 = 315_360_000;
