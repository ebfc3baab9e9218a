use crate::api::OddsProvider;
use crate::error::{check_status, ProviderError};
use crate::models::{Fixture, League, MatchOdds, OddsQuote};
use crate::utils::outcome_model::GOAL_LINE;
use crate::utils::teams::team_names_match;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

/// Response from The Odds API for a single event
#[derive(Debug, Deserialize)]
struct OddsApiGame {
    commence_time: DateTime<Utc>,
    home_team: String,
    away_team: String,
    #[serde(default)]
    bookmakers: Vec<OddsApiBookmaker>,
}

/// Bookmaker data from The Odds API
#[derive(Debug, Deserialize)]
struct OddsApiBookmaker {
    #[serde(default)]
    markets: Vec<OddsApiMarket>,
}

/// Market data (h2h or totals)
#[derive(Debug, Deserialize)]
struct OddsApiMarket {
    key: String,
    outcomes: Vec<OddsApiOutcome>,
}

#[derive(Debug, Deserialize)]
struct OddsApiOutcome {
    name: String,
    price: f64,
    point: Option<f64>,
}

/// Running best price per market while walking bookmakers
#[derive(Debug, Default)]
struct BestPrices {
    home: Option<f64>,
    draw: Option<f64>,
    away: Option<f64>,
    over25: Option<f64>,
    under25: Option<f64>,
}

fn keep_best(slot: &mut Option<f64>, price: f64) {
    // Decimal odds below 1.0 are not a real price
    if price >= 1.0 && slot.map_or(true, |best| price > best) {
        *slot = Some(price);
    }
}

impl BestPrices {
    fn into_quote(self) -> Option<OddsQuote> {
        Some(OddsQuote {
            home: self.home?,
            draw: self.draw?,
            away: self.away?,
            over25: self.over25?,
            under25: self.under25?,
        })
    }
}

fn best_quote(game: &OddsApiGame) -> Option<OddsQuote> {
    let mut best = BestPrices::default();

    for bookmaker in &game.bookmakers {
        for market in &bookmaker.markets {
            match market.key.as_str() {
                "h2h" => {
                    for outcome in &market.outcomes {
                        if outcome.name == game.home_team {
                            keep_best(&mut best.home, outcome.price);
                        } else if outcome.name == game.away_team {
                            keep_best(&mut best.away, outcome.price);
                        } else if outcome.name.eq_ignore_ascii_case("draw") {
                            keep_best(&mut best.draw, outcome.price);
                        }
                    }
                }
                "totals" => {
                    for outcome in &market.outcomes {
                        if outcome.point != Some(GOAL_LINE) {
                            continue;
                        }
                        if outcome.name.eq_ignore_ascii_case("over") {
                            keep_best(&mut best.over25, outcome.price);
                        } else if outcome.name.eq_ignore_ascii_case("under") {
                            keep_best(&mut best.under25, outcome.price);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    best.into_quote()
}

/// Parse an odds payload into one quote per event.
/// Events missing any of the five markets are dropped.
pub fn parse_odds_payload(body: &str) -> Result<Vec<MatchOdds>, ProviderError> {
    let games: Vec<OddsApiGame> = serde_json::from_str(body)?;

    Ok(games
        .iter()
        .filter_map(|game| {
            let quote = best_quote(game);
            if quote.is_none() {
                debug!(
                    "Incomplete odds for {} vs {}, skipping",
                    game.home_team, game.away_team
                );
            }
            Some(MatchOdds {
                home_team: game.home_team.clone(),
                away_team: game.away_team.clone(),
                commence_time: game.commence_time,
                quote: quote?,
            })
        })
        .collect())
}

/// Find the quote for a fixture by team names and kickoff date
pub fn find_quote(fixture: &Fixture, odds: &[MatchOdds]) -> Option<OddsQuote> {
    odds.iter()
        .find(|o| {
            o.commence_time.date_naive() == fixture.kickoff.date_naive()
                && team_names_match(&o.home_team, &fixture.home_team)
                && team_names_match(&o.away_team, &fixture.away_team)
        })
        .map(|o| o.quote)
}

pub struct OddsApiClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OddsApiClient {
    pub fn new(api_key: String, base_url: String, client: reqwest::Client) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Fetch decimal 1X2 and totals odds for a league's upcoming events
    pub async fn fetch_league_odds(&self, league: &League) -> Result<Vec<MatchOdds>, ProviderError> {
        let Some(sport_key) = league.odds_sport_key.as_deref() else {
            return Ok(Vec::new());
        };
        let url = format!("{}/sports/{}/odds", self.base_url, sport_key);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("regions", "eu,uk"),
                ("markets", "h2h,totals"),
                ("oddsFormat", "decimal"),
            ])
            .send()
            .await?;

        let response = check_status(response)?;
        if let Some(remaining) = response.headers().get("x-requests-remaining") {
            debug!("Odds API requests remaining: {:?}", remaining);
        }

        let body = response.text().await?;
        parse_odds_payload(&body)
    }
}

#[async_trait]
impl OddsProvider for OddsApiClient {
    async fn fetch_odds(&self, league: &League) -> Result<Vec<MatchOdds>, ProviderError> {
        self.fetch_league_odds(league).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const PAYLOAD: &str = r#"[
        {
            "id": "e1",
            "sport_key": "soccer_epl",
            "commence_time": "2025-03-08T15:00:00Z",
            "home_team": "Arsenal",
            "away_team": "Chelsea",
            "bookmakers": [
                {
                    "key": "pinnacle",
                    "title": "Pinnacle",
                    "markets": [
                        {"key": "h2h", "outcomes": [
                            {"name": "Arsenal", "price": 1.95},
                            {"name": "Chelsea", "price": 4.1},
                            {"name": "Draw", "price": 3.6}
                        ]},
                        {"key": "totals", "outcomes": [
                            {"name": "Over", "price": 1.85, "point": 2.5},
                            {"name": "Under", "price": 2.0, "point": 2.5},
                            {"name": "Over", "price": 2.9, "point": 3.5}
                        ]}
                    ]
                },
                {
                    "key": "bet365",
                    "title": "Bet365",
                    "markets": [
                        {"key": "h2h", "outcomes": [
                            {"name": "Arsenal", "price": 2.05},
                            {"name": "Chelsea", "price": 3.9},
                            {"name": "Draw", "price": 3.5}
                        ]}
                    ]
                }
            ]
        },
        {
            "id": "e2",
            "commence_time": "2025-03-08T17:30:00Z",
            "home_team": "Everton",
            "away_team": "Fulham",
            "bookmakers": [
                {"key": "x", "markets": [{"key": "h2h", "outcomes": [
                    {"name": "Everton", "price": 2.5},
                    {"name": "Fulham", "price": 2.9},
                    {"name": "Draw", "price": 3.2}
                ]}]}
            ]
        }
    ]"#;

    fn fixture(home: &str, away: &str) -> Fixture {
        Fixture {
            id: 1,
            kickoff: Utc.with_ymd_and_hms(2025, 3, 8, 15, 0, 0).unwrap(),
            league: "Premier League".to_string(),
            home_team: home.to_string(),
            away_team: away.to_string(),
            home_crest: String::new(),
            away_crest: String::new(),
        }
    }

    #[test]
    fn test_parse_takes_best_price_per_market() {
        let odds = parse_odds_payload(PAYLOAD).unwrap();
        // Everton vs Fulham has no totals market
        assert_eq!(odds.len(), 1);
        let quote = odds[0].quote;
        assert_eq!(quote.home, 2.05);
        assert_eq!(quote.draw, 3.6);
        assert_eq!(quote.away, 4.1);
        assert_eq!(quote.over25, 1.85);
        assert_eq!(quote.under25, 2.0);
    }

    #[test]
    fn test_find_quote_matches_loose_names() {
        let odds = parse_odds_payload(PAYLOAD).unwrap();
        assert!(find_quote(&fixture("Arsenal FC", "Chelsea FC"), &odds).is_some());
        assert!(find_quote(&fixture("Chelsea FC", "Arsenal FC"), &odds).is_none());
    }

    #[test]
    fn test_malformed_odds_payload() {
        assert!(matches!(
            parse_odds_payload(r#"{"message": "Unauthorized"}"#),
            Err(ProviderError::MalformedPayload(_))
        ));
    }

    #[tokio::test]
    async fn test_league_without_sport_key_has_no_odds() {
        let client = OddsApiClient::new(
            "key".to_string(),
            "http://127.0.0.1:9".to_string(),
            reqwest::Client::new(),
        );
        let league = League::new("Eredivisie", 2003, None);
        assert!(client.fetch_odds(&league).await.unwrap().is_empty());
    }
}
