use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use covid_dashboard::{
    config::Config,
    dashboard::Dashboard,
    sources::{NewsApiClient, UkCovidClient},
    sweeper::SweeperService,
    utils::SystemClock,
    web::WebServer,
};

#[derive(Parser)]
#[command(name = "covid-dashboard")]
#[command(version)]
#[command(about = "A COVID-19 dashboard with scheduled data and news updates")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = if cli.log_level == "trace" {
        format!("covid_dashboard={},tower_http=trace", cli.log_level)
    } else {
        format!("covid_dashboard={}", cli.log_level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting COVID Dashboard v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);
    if !config.warnings.is_empty() {
        warn!(
            "{} configuration values were replaced by defaults",
            config.warnings.len()
        );
    }

    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }

    let http = reqwest::Client::builder()
        .user_agent(concat!("covid-dashboard/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .build()?;
    let covid_source = Arc::new(UkCovidClient::new(http.clone()));
    let news_source = Arc::new(NewsApiClient::new(
        http,
        config.news.api_key.clone(),
        config.news.country_code.clone(),
    ));

    let mut dashboard = Dashboard::new(&config, covid_source, news_source, Arc::new(SystemClock));
    let report = dashboard.initial_refresh().await;
    for failure in &report.failures {
        error!("Initial {} refresh failed: {}", failure.domain, failure.error);
    }
    dashboard.refresh_display_list();
    let dashboard = dashboard.into_shared();

    let sweep_seconds = config.dashboard.sweep_interval_seconds;
    if sweep_seconds > 0 {
        let sweeper = SweeperService::new(dashboard.clone(), Duration::from_secs(sweep_seconds));
        tokio::spawn(async move {
            if let Err(e) = sweeper.start().await {
                error!("Update sweeper failed: {}", e);
            }
        });
    } else {
        info!("Background sweeping disabled, updates run on page requests only");
    }

    let web_server = WebServer::new(&config, dashboard)?;
    info!(
        "Starting web server on {}:{}",
        web_server.host(),
        web_server.port()
    );
    web_server.serve().await?;

    Ok(())
}
