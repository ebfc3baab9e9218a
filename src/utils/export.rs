use crate::models::MatchRecord;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;

/// One flat CSV row per match record
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    kickoff: String,
    league: &'a str,
    home: &'a str,
    away: &'a str,
    home_xg: f64,
    away_xg: f64,
    xg_source: &'static str,
    prob_home: f64,
    prob_draw: f64,
    prob_away: f64,
    prob_over25: f64,
    prob_under25: f64,
    btts: f64,
    has_odds: bool,
    value_home: f64,
    value_draw: f64,
    value_away: f64,
    value_over25: f64,
    value_under25: f64,
    trend: &'static str,
}

impl<'a> From<&'a MatchRecord> for CsvRow<'a> {
    fn from(r: &'a MatchRecord) -> Self {
        Self {
            kickoff: r.date.to_rfc3339(),
            league: &r.league,
            home: &r.home,
            away: &r.away,
            home_xg: r.home_xg,
            away_xg: r.away_xg,
            xg_source: r.xg_source.as_str(),
            prob_home: r.prob.home,
            prob_draw: r.prob.draw,
            prob_away: r.prob.away,
            prob_over25: r.prob.over25,
            prob_under25: r.prob.under25,
            btts: r.btts,
            has_odds: r.has_odds,
            value_home: r.value.home,
            value_draw: r.value.draw,
            value_away: r.value.away,
            value_over25: r.value.over25,
            value_under25: r.value.under25,
            trend: r.trend.as_str(),
        }
    }
}

/// Write match records as CSV to any writer
pub fn write_records_csv<W: Write>(records: &[MatchRecord], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer
            .serialize(CsvRow::from(record))
            .context("Failed to write CSV row")?;
    }
    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// Save match records to a CSV file
pub fn save_records_to_csv(records: &[MatchRecord], filename: &str) -> Result<()> {
    let file = std::fs::File::create(filename).context("Failed to create CSV file")?;
    write_records_csv(records, file)
}

/// Save match records to a pretty-printed JSON file
pub fn save_records_to_json(records: &[MatchRecord], filename: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(records).context("Failed to serialize records")?;
    std::fs::write(filename, json).context("Failed to write JSON file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OutcomeProbabilities, Trend, ValueScore, XgProvenance};
    use chrono::{TimeZone, Utc};

    fn sample_record() -> MatchRecord {
        MatchRecord {
            id: 42,
            date: Utc.with_ymd_and_hms(2025, 4, 12, 14, 0, 0).unwrap(),
            league: "Serie A".to_string(),
            home: "Napoli".to_string(),
            away: "Roma".to_string(),
            home_logo: String::new(),
            away_logo: String::new(),
            home_xg: 1.6,
            away_xg: 1.0,
            total_xg: 2.6,
            xg_source: XgProvenance::Secondary,
            prob: OutcomeProbabilities {
                home: 0.5,
                draw: 0.27,
                away: 0.23,
                over25: 0.48,
                under25: 0.52,
                btts: 0.5,
            },
            value: ValueScore {
                home: 0.5,
                draw: 0.27,
                away: 0.23,
                over25: 0.48,
                under25: 0.52,
                has_odds: false,
            },
            has_odds: false,
            odds: None,
            btts: 0.5,
            trend: Trend::Neutral,
        }
    }

    #[test]
    fn test_write_records_csv() {
        let mut out = Vec::new();
        write_records_csv(&[sample_record()], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("kickoff,league,home,away"));
        let row = lines.next().unwrap();
        assert!(row.contains("Napoli,Roma"));
        assert!(row.contains("secondary"));
        assert!(row.ends_with("neutral"));
    }
}
