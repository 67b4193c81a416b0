use std::sync::Arc;

use axum::{extract::State, response::Html};
use log::warn;

use crate::{templates::home_page, AppState};

/// Handler for the route index page (GET /)
pub async fn index_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    // the page is still useful without the dataset horizon
    let last_date = match state.climate_db.latest_date().await {
        Ok(date) => Some(date),
        Err(e) => {
            warn!("index page rendered without last date: {}", e);
            None
        }
    };
    Html(home_page(&state.remote_url, last_date).into_string())
}
