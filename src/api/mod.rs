pub mod football_data;
pub mod odds_api;
pub mod xg_api;

use crate::error::ProviderError;
use crate::models::{DateWindow, Fixture, League, MatchOdds};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

const USER_AGENT: &str = "xg-value-tool/1.0";

/// Source of scheduled fixtures for a league
#[async_trait]
pub trait FixtureProvider: Send + Sync {
    async fn fetch_fixtures(
        &self,
        league: &League,
        window: &DateWindow,
    ) -> Result<Vec<Fixture>, ProviderError>;
}

/// Source of bookmaker odds for a league
#[async_trait]
pub trait OddsProvider: Send + Sync {
    async fn fetch_odds(&self, league: &League) -> Result<Vec<MatchOdds>, ProviderError>;
}

/// HTTP client shared by every upstream. The timeout applies per request.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}
