use crate::models::{OutcomeProbabilities, Trend, ValueScore};

/// Policy thresholds for the trend label
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendThresholds {
    /// Minimum 1X2 value before a side is called
    pub value: f64,
    /// Maximum home/away probability gap for a draw lean
    pub draw_margin: f64,
}

impl Default for TrendThresholds {
    fn default() -> Self {
        Self {
            value: 0.12,
            draw_margin: 0.08,
        }
    }
}

/// Label a fixture home / away / draw / neutral.
///
/// Rules are checked in order:
/// 1. with bookmaker odds, the best 1X2 value clears `value` and its
///    market is the strict favourite, so that side is labelled. Without
///    odds the value is a bare probability and this rule never fires.
/// 2. home and away are within `draw_margin` and the draw is at least as
///    likely as either, so it is a draw lean
/// 3. otherwise neutral
pub fn classify_trend(
    prob: &OutcomeProbabilities,
    value: &ValueScore,
    thresholds: &TrendThresholds,
) -> Trend {
    let markets = [
        (Trend::Home, value.home, prob.home),
        (Trend::Draw, value.draw, prob.draw),
        (Trend::Away, value.away, prob.away),
    ];

    // First maximum wins ties, matching home > draw > away order
    let (side, best_value, side_prob) = markets
        .iter()
        .copied()
        .fold(markets[0], |best, m| if m.1 > best.1 { m } else { best });

    if value.has_odds && best_value > thresholds.value {
        let strictly_favoured = markets
            .iter()
            .filter(|m| m.0 != side)
            .all(|m| side_prob > m.2);
        if strictly_favoured && side != Trend::Draw {
            return side;
        }
    }

    if (prob.home - prob.away).abs() < thresholds.draw_margin
        && prob.draw >= prob.home.max(prob.away)
    {
        return Trend::Draw;
    }

    Trend::Neutral
}
