use crate::models::{ExpectedGoals, OutcomeProbabilities};

/// Highest goal count per side included in the score grid.
/// The mass beyond it is negligible for realistic xG.
pub const MAX_GOALS: usize = 7;

/// Total-goals line for the over/under market
pub const GOAL_LINE: f64 = 2.5;

/// Poisson probability mass for 0..=max_k goals at rate `lambda`
pub fn poisson_pmf(lambda: f64, max_k: usize) -> Vec<f64> {
    let mut pmf = Vec::with_capacity(max_k + 1);
    let mut p = (-lambda).exp();
    pmf.push(p);
    for k in 1..=max_k {
        p *= lambda / k as f64;
        pmf.push(p);
    }
    pmf
}

/// Derive 1X2, over/under 2.5 and BTTS probabilities from expected goals.
///
/// Goals per side are independent Poisson variables. The 1X2 buckets are
/// renormalised over the truncated grid so they sum to exactly one.
pub fn compute_outcome_probabilities(xg: ExpectedGoals) -> OutcomeProbabilities {
    let pmf_home = poisson_pmf(xg.home, MAX_GOALS);
    let pmf_away = poisson_pmf(xg.away, MAX_GOALS);

    let mut home = 0.0;
    let mut draw = 0.0;
    let mut away = 0.0;
    let mut under = 0.0;

    for (i, ph) in pmf_home.iter().enumerate() {
        for (j, pa) in pmf_away.iter().enumerate() {
            let p = ph * pa;
            if i > j {
                home += p;
            } else if i == j {
                draw += p;
            } else {
                away += p;
            }
            if ((i + j) as f64) < GOAL_LINE {
                under += p;
            }
        }
    }

    let total = home + draw + away;

    // Independence approximation: P(home scores) * P(away scores)
    let btts = (1.0 - pmf_home[0]) * (1.0 - pmf_away[0]);

    OutcomeProbabilities {
        home: home / total,
        draw: draw / total,
        away: away / total,
        over25: 1.0 - under,
        under25: under,
        btts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probs(home: f64, away: f64) -> OutcomeProbabilities {
        compute_outcome_probabilities(ExpectedGoals::new(home, away).unwrap())
    }

    #[test]
    fn test_poisson_pmf() {
        let pmf = poisson_pmf(1.5, 3);
        assert_eq!(pmf.len(), 4);
        assert!((pmf[0] - (-1.5f64).exp()).abs() < 1e-12);
        assert!((pmf[2] - 1.5f64.powi(2) * (-1.5f64).exp() / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        for &(h, a) in &[(0.1, 0.1), (0.8, 0.6), (1.8, 1.1), (2.4, 2.2), (3.5, 0.4)] {
            let p = probs(h, a);
            assert!((p.home + p.draw + p.away - 1.0).abs() < 1e-6);
            assert!((p.over25 + p.under25 - 1.0).abs() < 1e-6);
            assert!((0.0..=1.0).contains(&p.btts));
        }
    }

    #[test]
    fn test_home_probability_increases_with_home_xg() {
        let mut last = probs(0.5, 1.2);
        for step in 1..20 {
            let next = probs(0.5 + step as f64 * 0.1, 1.2);
            assert!(next.home > last.home);
            assert!(next.over25 >= last.over25);
            last = next;
        }
    }

    #[test]
    fn test_typical_match() {
        let p = probs(1.8, 1.1);
        println!("{:?}", p);
        assert!(p.home >= 0.50 && p.home <= 0.62);
        assert!(p.draw >= 0.20 && p.draw <= 0.28);
        assert!(p.away >= 0.15 && p.away <= 0.25);
        assert!(p.over25 > 0.55);
    }

    #[test]
    fn test_equal_teams_are_symmetric() {
        let p = probs(1.3, 1.3);
        assert!((p.home - p.away).abs() < 1e-12);
    }

    #[test]
    fn test_btts_matches_independent_scoring() {
        let p = probs(1.0, 2.0);
        let expected = (1.0 - (-1.0f64).exp()) * (1.0 - (-2.0f64).exp());
        assert!((p.btts - expected).abs() < 1e-12);
    }
}
