use crate::error::{check_status, ProviderError};
use crate::models::{ExpectedGoals, Fixture, XgProvenance};
use crate::resolver::XgSource;
use crate::utils::teams::{slugify, team_names_match};
use async_trait::async_trait;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

/// Script variables that hold the team's match list on a team page
const EMBEDDED_VARS: &[&str] = &["matchesData", "datesData"];

/// One historical match as found in the embedded blob
#[derive(Debug, Clone, PartialEq)]
pub struct UnderstatMatch {
    pub home_title: Option<String>,
    pub away_title: Option<String>,
    pub home_xg: Option<f64>,
    pub away_xg: Option<f64>,
    /// Raw date or datetime text, `YYYY-MM-DD...`
    pub date: Option<String>,
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_text(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

impl UnderstatMatch {
    /// Read one entry, accepting the property-name variants seen in the wild
    fn from_value(obj: &Value) -> Self {
        let title = |side: &str, flat: &[&str]| {
            obj.get(side)
                .and_then(|s| s.get("title"))
                .and_then(as_text)
                .or_else(|| flat.iter().find_map(|k| obj.get(*k).and_then(as_text)))
        };
        let xg = |side: &str, flat: &[&str]| {
            obj.get("xG")
                .and_then(|x| x.get(side))
                .and_then(as_f64)
                .or_else(|| flat.iter().find_map(|k| obj.get(*k).and_then(as_f64)))
        };

        Self {
            home_title: title("h", &["h_team", "home", "home_title"]),
            away_title: title("a", &["a_team", "away", "away_title"]),
            home_xg: xg("h", &["h_xG", "hxG", "h_xg", "home_xg"]),
            away_xg: xg("a", &["a_xG", "axG", "a_xg", "away_xg"]),
            date: ["datetime", "date", "formatted_date"]
                .iter()
                .find_map(|k| obj.get(*k).and_then(as_text)),
        }
    }
}

/// Find `<var> = JSON.parse('<literal>')` in a script and return the raw,
/// still-escaped literal
fn extract_literal<'a>(script: &'a str, var: &str) -> Option<&'a str> {
    let mut offset = 0;
    while let Some(pos) = script[offset..].find(var) {
        offset += pos + var.len();
        let rest = script[offset..].trim_start();
        let Some(rest) = rest.strip_prefix('=') else {
            continue;
        };
        let Some(rest) = rest.trim_start().strip_prefix("JSON.parse(") else {
            continue;
        };
        let rest = rest.trim_start();
        let quote = match rest.chars().next() {
            Some(q @ ('\'' | '"')) => q,
            _ => continue,
        };

        let body = &rest[1..];
        let mut escaped = false;
        for (i, c) in body.char_indices() {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                return Some(&body[..i]);
            }
        }
        // Unterminated literal
        return None;
    }
    None
}

fn take_hex(chars: &mut std::str::Chars<'_>, len: usize) -> Result<u32, ProviderError> {
    let hex: String = chars.by_ref().take(len).collect();
    if hex.len() != len {
        return Err(ProviderError::ScrapeStructureNotFound(
            "truncated escape sequence".to_string(),
        ));
    }
    u32::from_str_radix(&hex, 16).map_err(|_| {
        ProviderError::ScrapeStructureNotFound(format!("bad hex escape {:?}", hex))
    })
}

/// Decode the body of a JavaScript string literal
pub fn decode_js_string(raw: &str) -> Result<String, ProviderError> {
    let invalid = |what: &str| ProviderError::ScrapeStructureNotFound(what.to_string());
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escape = chars.next().ok_or_else(|| invalid("dangling backslash"))?;
        match escape {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            // Line continuation
            '\n' => {}
            'x' => {
                let code = take_hex(&mut chars, 2)?;
                out.push(char::from_u32(code).ok_or_else(|| invalid("bad \\x escape"))?);
            }
            'u' => {
                let code = take_hex(&mut chars, 4)?;
                let ch = if (0xD800..0xDC00).contains(&code) {
                    // High surrogate, the low half follows as another \u escape
                    if chars.next() != Some('\\') || chars.next() != Some('u') {
                        return Err(invalid("unpaired surrogate"));
                    }
                    let low = take_hex(&mut chars, 4)?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err(invalid("unpaired surrogate"));
                    }
                    char::from_u32(0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00))
                } else {
                    char::from_u32(code)
                };
                out.push(ch.ok_or_else(|| invalid("bad \\u escape"))?);
            }
            other => out.push(other),
        }
    }

    Ok(out)
}

/// Pull the embedded match list out of a team page.
///
/// Fails with `ScrapeStructureNotFound` when no script carries the blob or
/// it does not decode to a JSON array.
pub fn parse_embedded_matches(html: &str) -> Result<Vec<UnderstatMatch>, ProviderError> {
    let document = Html::parse_document(html);
    let script_selector = Selector::parse("script").map_err(|e| {
        ProviderError::ScrapeStructureNotFound(format!("invalid script selector: {:?}", e))
    })?;

    let literal = document
        .select(&script_selector)
        .map(|script| script.text().collect::<String>())
        .find_map(|text| {
            EMBEDDED_VARS
                .iter()
                .find_map(|var| extract_literal(&text, var).map(str::to_string))
        })
        .ok_or_else(|| {
            ProviderError::ScrapeStructureNotFound("no embedded match data on page".to_string())
        })?;

    let json = decode_js_string(&literal)?;
    let parsed: Value = serde_json::from_str(&json).map_err(|e| {
        ProviderError::ScrapeStructureNotFound(format!("embedded match data is not JSON: {}", e))
    })?;
    let entries = parsed.as_array().ok_or_else(|| {
        ProviderError::ScrapeStructureNotFound("embedded match data is not a list".to_string())
    })?;

    Ok(entries.iter().map(UnderstatMatch::from_value).collect())
}

/// Find the fixture among a team's matches and return its xG.
///
/// Both team titles must match loosely and, when the entry is dated, the
/// date must agree with `date` (`YYYY-MM-DD`).
pub fn find_match_xg(
    matches: &[UnderstatMatch],
    home: &str,
    away: &str,
    date: &str,
) -> Result<ExpectedGoals, ProviderError> {
    matches
        .iter()
        .filter(|m| m.date.as_deref().map_or(true, |d| d.starts_with(date)))
        .filter(|m| {
            m.home_title
                .as_deref()
                .is_some_and(|t| team_names_match(t, home))
                && m.away_title
                    .as_deref()
                    .is_some_and(|t| team_names_match(t, away))
        })
        .find_map(|m| ExpectedGoals::new(m.home_xg?, m.away_xg?))
        .ok_or_else(|| ProviderError::NoMatchFound(format!("{} vs {} on {}", home, away, date)))
}

pub struct UnderstatScraper {
    base_url: String,
    client: reqwest::Client,
}

impl UnderstatScraper {
    pub fn new(base_url: String, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Fetch a team page and parse its embedded match list
    pub async fn fetch_team_matches(&self, team: &str) -> Result<Vec<UnderstatMatch>, ProviderError> {
        let slug = slugify(team);
        if slug.is_empty() {
            return Err(ProviderError::NoMatchFound(format!(
                "no page slug for team {:?}",
                team
            )));
        }
        let url = format!("{}/team/{}", self.base_url, slug);

        let response = check_status(self.client.get(&url).send().await?)?;
        let html = response.text().await?;

        parse_embedded_matches(&html)
    }
}

#[async_trait]
impl XgSource for UnderstatScraper {
    fn provenance(&self) -> XgProvenance {
        XgProvenance::Secondary
    }

    /// Home team's page first, then the away team's
    async fn lookup(&self, fixture: &Fixture) -> Result<ExpectedGoals, ProviderError> {
        let date = fixture.match_date();
        let mut last_error = None;

        for team in [&fixture.home_team, &fixture.away_team] {
            let found = match self.fetch_team_matches(team).await {
                Ok(matches) => {
                    find_match_xg(&matches, &fixture.home_team, &fixture.away_team, &date)
                }
                Err(e) => Err(e),
            };
            match found {
                Ok(xg) => return Ok(xg),
                Err(e) => {
                    debug!("Understat page for {} gave no xG: {}", team, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ProviderError::NoMatchFound(format!(
                "{} vs {}",
                fixture.home_team, fixture.away_team
            ))
        }))
    }
}
