//! Dashboard page

use askama::Template;
use axum::{
    extract::{Query, State},
    response::Html,
};

use crate::dashboard::{process_request, DashboardEvent, DashboardView};
use crate::errors::AppResult;
use crate::web::AppState;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: DashboardView,
}

/// Handle the page's event parameters, run due updates and render the page
pub async fn index(
    State(state): State<AppState>,
    Query(event): Query<DashboardEvent>,
) -> AppResult<Html<String>> {
    let view = process_request(&state.dashboard, &event).await;
    let page = IndexTemplate { view }.render()?;
    Ok(Html(page))
}
