use crate::aggregator::FixtureAggregator;
use crate::cache::{cache_key, ResultCache};
use crate::models::{DateWindow, GamesResponse, MatchRecord};
use crate::utils::rankings::{top_by_over25, top_by_value, TOP_OVER25_COUNT, TOP_VALUE_COUNT};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Everything the handlers share, built once at startup
pub struct AppState {
    pub cache: ResultCache,
    pub aggregator: FixtureAggregator,
    pub lookahead_days: i64,
}

pub type SharedState = Arc<AppState>;

#[derive(Debug, Deserialize)]
pub struct GamesQuery {
    pub date: Option<String>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/games", get(games))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Parse the `date` query value. Blank counts as absent.
pub fn parse_query_date(raw: Option<&str>) -> Result<Option<NaiveDate>, String> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD", s)),
    }
}

/// Full list plus the two rankings
pub fn games_response(records: &[MatchRecord]) -> GamesResponse {
    GamesResponse {
        response: records.to_vec(),
        top_value: top_by_value(records, TOP_VALUE_COUNT),
        top_over25: top_by_over25(records, TOP_OVER25_COUNT),
        error: None,
    }
}

async fn games(State(state): State<SharedState>, Query(query): Query<GamesQuery>) -> Response {
    let date = match parse_query_date(query.date.as_deref()) {
        Ok(date) => date,
        Err(message) => {
            warn!("Rejected /api/games request: {}", message);
            return (
                StatusCode::BAD_REQUEST,
                Json(GamesResponse::empty_with_error(message)),
            )
                .into_response();
        }
    };

    let window = DateWindow::for_query(date, Utc::now().date_naive(), state.lookahead_days);
    let key = cache_key(date);

    let aggregator = &state.aggregator;
    let window = &window;
    let entry = state
        .cache
        .get_or_compute(&key, move || aggregator.aggregate(window))
        .await;

    info!("Serving {} fixtures for {}", entry.fixtures.len(), key);
    Json(games_response(&entry.fixtures)).into_response()
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
