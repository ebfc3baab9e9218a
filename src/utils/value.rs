use crate::models::{OddsQuote, OutcomeProbabilities, ValueScore};

/// Expected value of a unit stake at decimal odds.
/// Positive means the price beats the model probability.
pub fn calculate_expected_value(model_prob: f64, decimal_odds: f64) -> f64 {
    model_prob * decimal_odds - 1.0
}

/// Implied probability of a decimal price, ignoring bookmaker margin
pub fn decimal_odds_to_probability(decimal_odds: f64) -> f64 {
    1.0 / decimal_odds
}

/// Score every market against the quote.
///
/// Without a quote the probabilities themselves are returned with
/// `has_odds = false`; those numbers rank fixtures but are not money.
pub fn score_value(prob: &OutcomeProbabilities, odds: Option<&OddsQuote>) -> ValueScore {
    match odds {
        Some(odds) => ValueScore {
            home: calculate_expected_value(prob.home, odds.home),
            draw: calculate_expected_value(prob.draw, odds.draw),
            away: calculate_expected_value(prob.away, odds.away),
            over25: calculate_expected_value(prob.over25, odds.over25),
            under25: calculate_expected_value(prob.under25, odds.under25),
            has_odds: true,
        },
        None => ValueScore {
            home: prob.home,
            draw: prob.draw,
            away: prob.away,
            over25: prob.over25,
            under25: prob.under25,
            has_odds: false,
        },
    }
}
