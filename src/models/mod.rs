use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A competition we pull fixtures for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    pub name: String,
    /// Competition id on the fixtures provider (football-data.org)
    pub competition_id: u32,
    /// Sport key on the odds provider, if the league is covered there
    pub odds_sport_key: Option<String>,
}

impl League {
    pub fn new(name: &str, competition_id: u32, odds_sport_key: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            competition_id,
            odds_sport_key: odds_sport_key.map(str::to_string),
        }
    }
}

/// Inclusive range of kickoff dates (UTC) to aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    pub fn single(date: NaiveDate) -> Self {
        Self {
            from: date,
            to: date,
        }
    }

    /// `from` plus the following `days` days
    pub fn starting(from: NaiveDate, days: i64) -> Self {
        Self {
            from,
            to: from + chrono::Duration::days(days.max(0)),
        }
    }

    /// Window for a query: the requested day, or `today` plus `lookahead_days`
    pub fn for_query(date: Option<NaiveDate>, today: NaiveDate, lookahead_days: i64) -> Self {
        match date {
            Some(day) => Self::single(day),
            None => Self::starting(today, lookahead_days),
        }
    }

    pub fn contains(&self, kickoff: &DateTime<Utc>) -> bool {
        let date = kickoff.date_naive();
        date >= self.from && date <= self.to
    }
}

/// A scheduled match as reported by the fixtures provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: u64,
    pub kickoff: DateTime<Utc>,
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    pub home_crest: String,
    pub away_crest: String,
}

impl Fixture {
    /// Kickoff date as `YYYY-MM-DD`, used for xG lookups
    pub fn match_date(&self) -> String {
        self.kickoff.format("%Y-%m-%d").to_string()
    }
}

/// Expected goals per side, both strictly positive and finite
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpectedGoals {
    pub home: f64,
    pub away: f64,
}

impl ExpectedGoals {
    /// Returns `None` unless both values are usable Poisson rates
    pub fn new(home: f64, away: f64) -> Option<Self> {
        let valid = |x: f64| x.is_finite() && x > 0.0;
        if valid(home) && valid(away) {
            Some(Self { home, away })
        } else {
            None
        }
    }

    pub fn total(&self) -> f64 {
        self.home + self.away
    }
}

/// Which step of the xG chain produced the numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XgProvenance {
    Primary,
    Secondary,
    Synthetic,
}

impl XgProvenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            XgProvenance::Primary => "primary",
            XgProvenance::Secondary => "secondary",
            XgProvenance::Synthetic => "synthetic",
        }
    }
}

/// Model probabilities derived from a pair of xG values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeProbabilities {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
    pub over25: f64,
    pub under25: f64,
    /// Reported at the top level of a match record, not inside `prob`
    #[serde(skip)]
    pub btts: f64,
}

/// Best available decimal odds for the five markets we price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OddsQuote {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
    pub over25: f64,
    pub under25: f64,
}

/// Bookmaker prices for one event, as listed by the odds provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOdds {
    pub home_team: String,
    pub away_team: String,
    pub commence_time: DateTime<Utc>,
    pub quote: OddsQuote,
}

/// Per-market value.
///
/// With odds this is `prob * odds - 1`. Without odds it is the bare
/// probability and only usable for ranking; `has_odds` tells the two apart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueScore {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
    pub over25: f64,
    pub under25: f64,
    #[serde(skip)]
    pub has_odds: bool,
}

impl ValueScore {
    /// Highest value among the 1X2 markets
    pub fn best_1x2(&self) -> f64 {
        self.home.max(self.draw).max(self.away)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Home,
    Away,
    Draw,
    Neutral,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Home => "home",
            Trend::Away => "away",
            Trend::Draw => "draw",
            Trend::Neutral => "neutral",
        }
    }
}

/// A fixture with everything derived from it, as served by `/api/games`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: u64,
    pub date: DateTime<Utc>,
    pub league: String,
    pub home: String,
    pub away: String,
    #[serde(rename = "homeLogo")]
    pub home_logo: String,
    #[serde(rename = "awayLogo")]
    pub away_logo: String,
    #[serde(rename = "homeXG")]
    pub home_xg: f64,
    #[serde(rename = "awayXG")]
    pub away_xg: f64,
    #[serde(rename = "totalXG")]
    pub total_xg: f64,
    #[serde(rename = "xgSource")]
    pub xg_source: XgProvenance,
    pub prob: OutcomeProbabilities,
    pub value: ValueScore,
    #[serde(rename = "hasOdds")]
    pub has_odds: bool,
    pub odds: Option<OddsQuote>,
    pub btts: f64,
    pub trend: Trend,
}

impl MatchRecord {
    /// Format the record as a readable line
    pub fn format(&self) -> String {
        let value_label = if self.has_odds { "EV" } else { "Signal" };
        format!(
            "{} | {} vs {} | {} | xG {:.2}-{:.2} ({}) | 1X2 {:.1}%/{:.1}%/{:.1}% | O2.5 {:.1}% | BTTS {:.1}% | {} {:+.3} | {}",
            self.date.format("%Y-%m-%d %H:%M"),
            self.home,
            self.away,
            self.league,
            self.home_xg,
            self.away_xg,
            self.xg_source.as_str(),
            self.prob.home * 100.0,
            self.prob.draw * 100.0,
            self.prob.away * 100.0,
            self.prob.over25 * 100.0,
            self.btts * 100.0,
            value_label,
            self.value.best_1x2(),
            self.trend.as_str()
        )
    }
}

/// Body of `GET /api/games`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamesResponse {
    pub response: Vec<MatchRecord>,
    #[serde(rename = "top7Value")]
    pub top_value: Vec<MatchRecord>,
    #[serde(rename = "top5Over25")]
    pub top_over25: Vec<MatchRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GamesResponse {
    pub fn empty_with_error(message: String) -> Self {
        Self {
            response: Vec::new(),
            top_value: Vec::new(),
            top_over25: Vec::new(),
            error: Some(message),
        }
    }
}
