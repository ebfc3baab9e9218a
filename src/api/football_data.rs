use crate::api::FixtureProvider;
use crate::error::{check_status, ProviderError};
use crate::models::{DateWindow, Fixture, League};
use crate::utils::teams::flag_logo;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Keys that different fixture payloads nest their match list under,
/// tried in order before falling back to a bare top-level array
const FIXTURE_ARRAY_KEYS: &[&str] = &["matches", "response", "data", "fixtures"];

/// A single match in a football-data.org style payload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiMatch {
    id: u64,
    utc_date: DateTime<Utc>,
    #[serde(default)]
    home_team: ApiTeam,
    #[serde(default)]
    away_team: ApiTeam,
}

#[derive(Debug, Default, Deserialize)]
struct ApiTeam {
    name: Option<String>,
    crest: Option<String>,
}

impl ApiTeam {
    fn name_or(&self, fallback: &str) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }

    fn crest_for(&self, name: &str) -> String {
        self.crest
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| flag_logo(name))
    }
}

/// Parse a fixtures payload into `Fixture`s for `league`.
///
/// Elements that do not look like a match are skipped; a payload with no
/// recognizable match list, or where no element parses, is malformed.
pub fn parse_fixtures_payload(league: &League, body: &str) -> Result<Vec<Fixture>, ProviderError> {
    let root: Value = serde_json::from_str(body)?;

    let items = FIXTURE_ARRAY_KEYS
        .iter()
        .find_map(|key| root.get(*key).and_then(Value::as_array))
        .or_else(|| root.as_array())
        .ok_or_else(|| ProviderError::MalformedPayload("no fixtures array in payload".to_string()))?;

    let mut fixtures = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<ApiMatch>(item.clone()) {
            Ok(m) => {
                let home_team = m.home_team.name_or("Home");
                let away_team = m.away_team.name_or("Away");
                fixtures.push(Fixture {
                    id: m.id,
                    kickoff: m.utc_date,
                    league: league.name.clone(),
                    home_crest: m.home_team.crest_for(&home_team),
                    away_crest: m.away_team.crest_for(&away_team),
                    home_team,
                    away_team,
                });
            }
            Err(e) => debug!("Skipping unrecognized fixture in {}: {}", league.name, e),
        }
    }

    if fixtures.is_empty() && !items.is_empty() {
        return Err(ProviderError::MalformedPayload(format!(
            "none of {} fixtures for {} could be parsed",
            items.len(),
            league.name
        )));
    }

    Ok(fixtures)
}

pub struct FootballDataClient {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl FootballDataClient {
    pub fn new(api_key: Option<String>, base_url: String, client: reqwest::Client) -> Self {
        if api_key.is_none() {
            warn!("FOOTBALL_DATA_API_KEY not set, no fixtures will be fetched");
        }
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Fetch scheduled fixtures of a competition within the date window
    pub async fn fetch_league_fixtures(
        &self,
        league: &League,
        window: &DateWindow,
    ) -> Result<Vec<Fixture>, ProviderError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(Vec::new());
        };

        let url = format!(
            "{}/competitions/{}/matches",
            self.base_url, league.competition_id
        );
        let date_from = window.from.format("%Y-%m-%d").to_string();
        let date_to = window.to.format("%Y-%m-%d").to_string();

        let response = self
            .client
            .get(&url)
            .header("X-Auth-Token", api_key)
            .query(&[
                ("status", "SCHEDULED"),
                ("dateFrom", date_from.as_str()),
                ("dateTo", date_to.as_str()),
            ])
            .send()
            .await?;

        let body = check_status(response)?.text().await?;
        let fixtures = parse_fixtures_payload(league, &body)?;

        Ok(fixtures
            .into_iter()
            .filter(|f| window.contains(&f.kickoff))
            .collect())
    }
}

#[async_trait]
impl FixtureProvider for FootballDataClient {
    async fn fetch_fixtures(
        &self,
        league: &League,
        window: &DateWindow,
    ) -> Result<Vec<Fixture>, ProviderError> {
        self.fetch_league_fixtures(league, window).await
    }
}
