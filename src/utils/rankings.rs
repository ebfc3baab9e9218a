use crate::models::MatchRecord;
use std::cmp::Ordering;

/// Size of the best-value list in the API response
pub const TOP_VALUE_COUNT: usize = 7;

/// Size of the over 2.5 list in the API response
pub const TOP_OVER25_COUNT: usize = 5;

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Top N records by their best single 1X2 value.
///
/// Priced records come first, ordered by EV. Records without odds only
/// carry a probability signal, so they rank after every priced record.
pub fn top_by_value(records: &[MatchRecord], top_n: usize) -> Vec<MatchRecord> {
    let mut ranked = records.to_vec();
    ranked.sort_by(|a, b| {
        b.has_odds
            .cmp(&a.has_odds)
            .then_with(|| descending(a.value.best_1x2(), b.value.best_1x2()))
    });
    ranked.truncate(top_n);
    ranked
}

/// Top N records by model probability of over 2.5 goals
pub fn top_by_over25(records: &[MatchRecord], top_n: usize) -> Vec<MatchRecord> {
    let mut ranked = records.to_vec();
    ranked.sort_by(|a, b| descending(a.prob.over25, b.prob.over25));
    ranked.truncate(top_n);
    ranked
}

/// Order records by kickoff, earliest first. Ties break on id so the
/// output does not depend on upstream arrival order.
pub fn sort_by_kickoff(records: &mut [MatchRecord]) {
    records.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OutcomeProbabilities, Trend, ValueScore, XgProvenance};
    use chrono::{TimeZone, Utc};

    fn record(id: u64, hour: u32, best_value: f64, over25: f64) -> MatchRecord {
        MatchRecord {
            id,
            date: Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap(),
            league: "Premier League".to_string(),
            home: format!("Home {}", id),
            away: format!("Away {}", id),
            home_logo: String::new(),
            away_logo: String::new(),
            home_xg: 1.4,
            away_xg: 1.1,
            total_xg: 2.5,
            xg_source: XgProvenance::Synthetic,
            prob: OutcomeProbabilities {
                home: 0.45,
                draw: 0.27,
                away: 0.28,
                over25,
                under25: 1.0 - over25,
                btts: 0.5,
            },
            value: ValueScore {
                home: best_value,
                draw: -0.2,
                away: -0.3,
                over25: 0.0,
                under25: 0.0,
                has_odds: true,
            },
            has_odds: true,
            odds: None,
            btts: 0.5,
            trend: Trend::Neutral,
        }
    }

    #[test]
    fn test_top_by_value() {
        let records: Vec<_> = (0..10)
            .map(|i| record(i, 12, i as f64 / 100.0, 0.5))
            .collect();
        let top = top_by_value(&records, TOP_VALUE_COUNT);
        assert_eq!(top.len(), 7);
        assert_eq!(top[0].id, 9);
        assert_eq!(top[6].id, 3);
    }

    #[test]
    fn test_priced_records_rank_before_probability_signals() {
        let mut unpriced = record(2, 12, 0.346, 0.5);
        unpriced.has_odds = false;
        unpriced.value.has_odds = false;
        let mut weak_unpriced = record(4, 12, 0.21, 0.5);
        weak_unpriced.has_odds = false;
        weak_unpriced.value.has_odds = false;

        let records = vec![
            unpriced,
            record(1, 12, 0.288, 0.5),
            weak_unpriced,
            record(3, 12, -0.05, 0.5),
        ];
        let ids: Vec<u64> = top_by_value(&records, TOP_VALUE_COUNT)
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![1, 3, 2, 4]);
    }

    #[test]
    fn test_top_by_over25() {
        let records = vec![
            record(1, 12, 0.0, 0.40),
            record(2, 12, 0.0, 0.70),
            record(3, 12, 0.0, 0.55),
        ];
        let top = top_by_over25(&records, TOP_OVER25_COUNT);
        let ids: Vec<u64> = top.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_sort_by_kickoff() {
        let mut records = vec![
            record(3, 20, 0.0, 0.5),
            record(1, 14, 0.0, 0.5),
            record(2, 14, 0.0, 0.5),
        ];
        sort_by_kickoff(&mut records);
        let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
