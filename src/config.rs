use crate::models::League;
use crate::utils::trend::TrendThresholds;
use anyhow::{anyhow, Context, Result};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_FOOTBALL_DATA_URL: &str = "https://api.football-data.org/v4";
pub const DEFAULT_UNDERSTAT_URL: &str = "https://understat.com";
pub const DEFAULT_ODDS_API_URL: &str = "https://api.the-odds-api.com/v4";

/// Leagues pulled when `LEAGUES` is not set
pub fn default_leagues() -> Vec<League> {
    vec![
        League::new("Premier League", 2021, Some("soccer_epl")),
        League::new("Bundesliga", 2002, Some("soccer_germany_bundesliga")),
        League::new("La Liga", 2014, Some("soccer_spain_la_liga")),
        League::new("Serie A", 2019, Some("soccer_italy_serie_a")),
        League::new("Ligue 1", 2015, Some("soccer_france_ligue_one")),
    ]
}

/// Everything read from the environment at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub football_data_api_key: Option<String>,
    pub football_data_base_url: String,
    pub xg_api_url: Option<String>,
    pub xg_api_key: Option<String>,
    pub understat_base_url: String,
    pub odds_api_key: Option<String>,
    pub odds_api_base_url: String,
    pub cache_ttl: Duration,
    pub request_timeout: Duration,
    pub max_concurrency: usize,
    pub lookahead_days: i64,
    pub trend: TrendThresholds,
    pub leagues: Vec<League>,
    pub host: String,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            football_data_api_key: None,
            football_data_base_url: DEFAULT_FOOTBALL_DATA_URL.to_string(),
            xg_api_url: None,
            xg_api_key: None,
            understat_base_url: DEFAULT_UNDERSTAT_URL.to_string(),
            odds_api_key: None,
            odds_api_base_url: DEFAULT_ODDS_API_URL.to_string(),
            cache_ttl: Duration::from_secs(15 * 60),
            request_timeout: Duration::from_secs(10),
            max_concurrency: 6,
            lookahead_days: 7,
            trend: TrendThresholds::default(),
            leagues: default_leagues(),
            host: "127.0.0.1".to_string(),
            port: 10000,
        }
    }
}

impl AppConfig {
    /// Load `.env` and read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let leagues = match var("LEAGUES") {
            Some(list) => parse_leagues(&list).context("Invalid LEAGUES")?,
            None => defaults.leagues,
        };

        let max_concurrency: usize =
            parse_var(&var, "MAX_CONCURRENCY")?.unwrap_or(defaults.max_concurrency);
        if max_concurrency == 0 {
            return Err(anyhow!("MAX_CONCURRENCY must be at least 1"));
        }

        let request_timeout = parse_var(&var, "REQUEST_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);
        if request_timeout.is_zero() {
            return Err(anyhow!("REQUEST_TIMEOUT_SECS must be at least 1"));
        }

        Ok(Self {
            football_data_api_key: var("FOOTBALL_DATA_API_KEY"),
            football_data_base_url: var("FOOTBALL_DATA_BASE_URL")
                .unwrap_or(defaults.football_data_base_url),
            xg_api_url: var("XG_API_URL"),
            xg_api_key: var("XG_API_KEY"),
            understat_base_url: var("UNDERSTAT_BASE_URL").unwrap_or(defaults.understat_base_url),
            odds_api_key: var("ODDS_API_KEY"),
            odds_api_base_url: var("ODDS_API_BASE_URL").unwrap_or(defaults.odds_api_base_url),
            cache_ttl: parse_var(&var, "CACHE_TTL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
            request_timeout,
            max_concurrency,
            lookahead_days: parse_var(&var, "LOOKAHEAD_DAYS")?.unwrap_or(defaults.lookahead_days),
            trend: TrendThresholds {
                value: parse_var(&var, "TREND_VALUE_THRESHOLD")?.unwrap_or(defaults.trend.value),
                draw_margin: parse_var(&var, "TREND_DRAW_MARGIN")?
                    .unwrap_or(defaults.trend.draw_margin),
            },
            leagues,
            host: var("HOST").unwrap_or(defaults.host),
            port: parse_var(&var, "PORT")?.unwrap_or(defaults.port),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T, F>(var: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow!("{} has invalid value {:?}: {}", key, raw, e)),
        None => Ok(None),
    }
}

/// Parse `Name=competitionId[:oddsSportKey]` entries separated by commas
pub fn parse_leagues(list: &str) -> Result<Vec<League>> {
    let mut leagues = Vec::new();
    for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (name, rest) = entry
            .split_once('=')
            .ok_or_else(|| anyhow!("league entry {:?} is missing '='", entry))?;
        let (id, sport_key) = match rest.split_once(':') {
            Some((id, key)) => (id, Some(key.trim())),
            None => (rest, None),
        };
        let competition_id = id
            .trim()
            .parse::<u32>()
            .with_context(|| format!("bad competition id in {:?}", entry))?;
        leagues.push(League::new(
            name.trim(),
            competition_id,
            sport_key.filter(|k| !k.is_empty()),
        ));
    }
    if leagues.is_empty() {
        return Err(anyhow!("no leagues configured"));
    }
    Ok(leagues)
}
