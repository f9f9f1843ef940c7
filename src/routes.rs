use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    response::Html,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{AppState, error::AppResult, sites::Site, templates};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/scrape/{site}", post(scrape))
        .route("/theaters/{theater_id}", get(theater))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

pub async fn index(State(state): State<Arc<AppState>>) -> AppResult<Html<String>> {
    let theaters = state.store.list_theaters().await?;
    Ok(Html(templates::index_page(&theaters, &Site::ALL)))
}

pub async fn scrape(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> AppResult<Html<String>> {
    let site = Site::from_slug(&slug).ok_or_else(|| anyhow::anyhow!("unknown site: {slug}"))?;
    let summary = state.pipeline.run(site, &state.http, state.config.scrape_delay_ms).await?;
    Ok(Html(templates::summary_page(&summary)))
}

pub async fn theater(
    State(state): State<Arc<AppState>>,
    Path(theater_id): Path<String>,
) -> AppResult<Html<String>> {
    let showings = state.store.list_showings(&theater_id).await?;
    Ok(Html(templates::theater_page(&theater_id, &showings, &state.config.tmdb_poster_size)))
}
