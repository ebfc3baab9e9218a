use crate::api::football_data::FootballDataClient;
use crate::api::odds_api::{find_quote, OddsApiClient};
use crate::api::{http_client, FixtureProvider, OddsProvider};
use crate::config::AppConfig;
use crate::error::ProviderError;
use crate::models::{DateWindow, Fixture, League, MatchOdds, MatchRecord, OddsQuote};
use crate::resolver::{ResolvedXg, XgResolver};
use crate::utils::outcome_model::compute_outcome_probabilities;
use crate::utils::rankings::sort_by_kickoff;
use crate::utils::trend::{classify_trend, TrendThresholds};
use crate::utils::value::score_value;
use anyhow::Result;
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Assemble the served record from a fixture and its derived numbers
pub fn build_record(
    fixture: &Fixture,
    resolved: ResolvedXg,
    quote: Option<OddsQuote>,
    thresholds: &TrendThresholds,
) -> MatchRecord {
    let prob = compute_outcome_probabilities(resolved.xg);
    let value = score_value(&prob, quote.as_ref());
    let trend = classify_trend(&prob, &value, thresholds);

    MatchRecord {
        id: fixture.id,
        date: fixture.kickoff,
        league: fixture.league.clone(),
        home: fixture.home_team.clone(),
        away: fixture.away_team.clone(),
        home_logo: fixture.home_crest.clone(),
        away_logo: fixture.away_crest.clone(),
        home_xg: resolved.xg.home,
        away_xg: resolved.xg.away,
        total_xg: resolved.xg.total(),
        xg_source: resolved.source,
        prob,
        value,
        has_odds: value.has_odds,
        odds: quote,
        btts: prob.btts,
        trend,
    }
}

/// Fans out across leagues and fixtures and enriches every fixture.
///
/// Every league and fixture is polled concurrently; the shared limiter
/// bounds how many upstream calls are actually in flight. A failing league
/// contributes nothing and never fails the aggregate.
pub struct FixtureAggregator {
    leagues: Vec<League>,
    fixtures: Arc<dyn FixtureProvider>,
    odds: Option<Arc<dyn OddsProvider>>,
    resolver: XgResolver,
    trend: TrendThresholds,
    limiter: Arc<Semaphore>,
    request_timeout: Duration,
}

impl FixtureAggregator {
    pub fn new(
        leagues: Vec<League>,
        fixtures: Arc<dyn FixtureProvider>,
        odds: Option<Arc<dyn OddsProvider>>,
        resolver: XgResolver,
        limiter: Arc<Semaphore>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            leagues,
            fixtures,
            odds,
            resolver,
            trend: TrendThresholds::default(),
            limiter,
            request_timeout,
        }
    }

    pub fn with_trend_thresholds(mut self, trend: TrendThresholds) -> Self {
        self.trend = trend;
        self
    }

    /// Wire up the real upstream clients from configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = http_client(config.request_timeout)?;
        let limiter = Arc::new(Semaphore::new(config.max_concurrency.max(1)));

        let fixtures = Arc::new(FootballDataClient::new(
            config.football_data_api_key.clone(),
            config.football_data_base_url.clone(),
            client.clone(),
        ));

        let odds: Option<Arc<dyn OddsProvider>> = match config.odds_api_key.clone() {
            Some(key) => Some(Arc::new(OddsApiClient::new(
                key,
                config.odds_api_base_url.clone(),
                client.clone(),
            ))),
            None => {
                info!("ODDS_API_KEY not set, value falls back to probability signals");
                None
            }
        };

        let resolver = XgResolver::from_config(config, client, limiter.clone());

        Ok(Self::new(
            config.leagues.clone(),
            fixtures,
            odds,
            resolver,
            limiter,
            config.request_timeout,
        )
        .with_trend_thresholds(config.trend))
    }

    pub fn leagues(&self) -> &[League] {
        &self.leagues
    }

    /// Enriched records for every configured league, earliest kickoff first
    pub async fn aggregate(&self, window: &DateWindow) -> Vec<MatchRecord> {
        info!(
            "Aggregating {} leagues for {} to {}",
            self.leagues.len(),
            window.from,
            window.to
        );

        let per_league = join_all(
            self.leagues
                .iter()
                .map(|league| self.aggregate_league(league, window)),
        )
        .await;

        let mut records: Vec<MatchRecord> = per_league.into_iter().flatten().collect();
        sort_by_kickoff(&mut records);

        info!("Aggregated {} fixtures", records.len());
        records
    }

    async fn aggregate_league(&self, league: &League, window: &DateWindow) -> Vec<MatchRecord> {
        let fixtures = match self
            .bounded(self.fixtures.fetch_fixtures(league, window))
            .await
        {
            Ok(fixtures) => fixtures,
            Err(e) => {
                warn!("Skipping {}: fixtures unavailable: {}", league.name, e);
                return Vec::new();
            }
        };

        if fixtures.is_empty() {
            debug!("No fixtures for {}", league.name);
            return Vec::new();
        }

        let odds = self.league_odds(league).await;
        debug!(
            "{}: {} fixtures, {} priced events",
            league.name,
            fixtures.len(),
            odds.len()
        );

        join_all(fixtures.iter().map(|fixture| self.enrich(fixture, &odds))).await
    }

    async fn league_odds(&self, league: &League) -> Vec<MatchOdds> {
        let Some(provider) = self.odds.as_ref() else {
            return Vec::new();
        };
        match self.bounded(provider.fetch_odds(league)).await {
            Ok(odds) => odds,
            Err(e) => {
                warn!("Odds unavailable for {}: {}", league.name, e);
                Vec::new()
            }
        }
    }

    async fn enrich(&self, fixture: &Fixture, odds: &[MatchOdds]) -> MatchRecord {
        let resolved = self.resolver.resolve(fixture).await;
        let quote = find_quote(fixture, odds);
        build_record(fixture, resolved, quote, &self.trend)
    }

    /// Run one upstream call under the shared limiter and the request timeout
    async fn bounded<T, F>(&self, call: F) -> Result<T, ProviderError>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|_| ProviderError::Unreachable("request limiter closed".to_string()))?;

        tokio::time::timeout(self.request_timeout, call)
            .await
            .map_err(|_| {
                ProviderError::Unreachable(format!("timed out after {:?}", self.request_timeout))
            })?
    }
}
