use crate::error::{check_status, ProviderError};
use crate::models::{ExpectedGoals, Fixture, XgProvenance};
use crate::resolver::XgSource;
use async_trait::async_trait;
use serde::Deserialize;

/// Response body of the external xG provider
#[derive(Debug, Deserialize)]
struct XgApiResponse {
    #[serde(rename = "homeXG")]
    home_xg: f64,
    #[serde(rename = "awayXG")]
    away_xg: f64,
}

/// Parse a provider response, rejecting values that are not usable rates
pub fn parse_xg_response(body: &str) -> Result<ExpectedGoals, ProviderError> {
    let parsed: XgApiResponse = serde_json::from_str(body)?;
    ExpectedGoals::new(parsed.home_xg, parsed.away_xg).ok_or_else(|| {
        ProviderError::MalformedPayload(format!(
            "xG values must be positive, got {} / {}",
            parsed.home_xg, parsed.away_xg
        ))
    })
}

/// Client for a structured xG provider queried by team names and date
pub struct XgApiClient {
    url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl XgApiClient {
    pub fn new(url: String, api_key: Option<String>, client: reqwest::Client) -> Self {
        Self {
            url,
            api_key,
            client,
        }
    }

    pub async fn fetch_xg(
        &self,
        home: &str,
        away: &str,
        date: &str,
    ) -> Result<ExpectedGoals, ProviderError> {
        let mut request = self
            .client
            .get(&self.url)
            .query(&[("home", home), ("away", away), ("date", date)]);
        if let Some(key) = self.api_key.as_deref() {
            request = request.bearer_auth(key);
        }

        let response = check_status(request.send().await?)?;
        let body = response.text().await?;
        parse_xg_response(&body)
    }
}

#[async_trait]
impl XgSource for XgApiClient {
    fn provenance(&self) -> XgProvenance {
        XgProvenance::Primary
    }

    async fn lookup(&self, fixture: &Fixture) -> Result<ExpectedGoals, ProviderError> {
        self.fetch_xg(&fixture.home_team, &fixture.away_team, &fixture.match_date())
            .await
    }
}
