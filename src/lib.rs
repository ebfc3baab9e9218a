pub mod aggregator;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod resolver;
pub mod routes;
pub mod scrapers;
pub mod utils;

pub use api::*;
pub use models::*;
pub use scrapers::*;
pub use utils::*;

use aggregator::FixtureAggregator;
use anyhow::Result;
use cache::ResultCache;
use chrono::{NaiveDate, Utc};
use config::AppConfig;
use routes::{AppState, SharedState};
use std::sync::Arc;

/// Build the shared web state: one cache and one aggregator per process
pub fn build_state(config: &AppConfig) -> Result<SharedState> {
    Ok(Arc::new(AppState {
        cache: ResultCache::new(config.cache_ttl),
        aggregator: FixtureAggregator::from_config(config)?,
        lookahead_days: config.lookahead_days,
    }))
}

/// Run one uncached aggregation for a date, or for the lookahead window
/// starting today when no date is given
pub async fn fetch_match_records(
    config: &AppConfig,
    date: Option<NaiveDate>,
) -> Result<Vec<MatchRecord>> {
    let aggregator = FixtureAggregator::from_config(config)?;
    let window = DateWindow::for_query(date, Utc::now().date_naive(), config.lookahead_days);
    Ok(aggregator.aggregate(&window).await)
}
