//! Web layer module
//!
//! HTTP interface for the dashboard. Handlers are thin: each one applies the
//! request's event to the shared dashboard, ticks it and renders the view.

use anyhow::Result;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{config::Config, dashboard::SharedDashboard};

pub mod handlers;
pub mod responses;

pub use responses::ApiResponse;

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(config: &Config, dashboard: SharedDashboard) -> Result<Self> {
        let app = create_router(AppState { dashboard });
        let addr: SocketAddr = format!("{}:{}", config.web.host, config.web.port).parse()?;
        Ok(Self { app, addr })
    }

    /// Start the web server
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(listener, self.app).await?;
        Ok(())
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

/// Create the router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::api::health_check))
        .nest("/api/v1", api_v1_routes())
        .route("/", get(handlers::index::index))
        .route("/index", get(handlers::index::index))
        // Middleware (applied in reverse order)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_v1_routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(handlers::api::dashboard))
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub dashboard: SharedDashboard,
}
