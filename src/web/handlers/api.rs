//! JSON endpoints

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::dashboard::{process_request, DashboardEvent};
use crate::web::{responses::ok, AppState};

/// Same event handling as the page, answered as JSON
pub async fn dashboard(
    State(state): State<AppState>,
    Query(event): Query<DashboardEvent>,
) -> Response {
    let view = process_request(&state.dashboard, &event).await;
    ok(view)
}

pub async fn health_check() -> impl IntoResponse {
    ok(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
