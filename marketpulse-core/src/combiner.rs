//! Signal combiner (C3): converts many `IndicatorResult`s into one directional
//! decision (§4.3). The heart of the system.

use std::collections::HashMap;

use crate::domain::{Action, Category, CategoryScore, Direction, IndicatorResult, MarketRegime, Regime};
use crate::registry::Registry;
use crate::rules::power;

/// Minimum usable indicators a category needs before its score counts at full
/// weight (§4.3 "Failure semantics").
const MIN_CATEGORY_CONTRIBUTORS: usize = 2;
/// Default number of top contributors surfaced in `reasoning`.
const DEFAULT_REASONING_TOP_N: usize = 5;

const BASELINE_WEIGHTS: [(Category, f64); 6] = [
    (Category::Trend, 0.28),
    (Category::Momentum, 0.25),
    (Category::Volume, 0.15),
    (Category::Volatility, 0.10),
    (Category::SupportResistance, 0.15),
    (Category::Patterns, 0.07),
];

fn regime_multiplier(regime: Regime, category: Category) -> f64 {
    let row: [f64; 6] = match regime {
        Regime::StrongTrending => [1.25, 1.12, 1.20, 0.60, 0.67, 0.85],
        Regime::WeakTrending => [1.10, 1.05, 1.00, 1.00, 1.10, 1.00],
        Regime::Ranging => [0.71, 1.12, 0.67, 1.50, 1.67, 1.14],
        Regime::Unknown => [1.00; 6],
    };
    let idx = BASELINE_WEIGHTS.iter().position(|(c, _)| *c == category).unwrap();
    row[idx]
}

/// Dynamic per-category weights for `regime`, renormalized to sum to 1.0.
pub fn dynamic_weights(regime: Regime) -> HashMap<Category, f64> {
    let adjusted: Vec<(Category, f64)> = BASELINE_WEIGHTS
        .iter()
        .map(|(c, base)| (*c, base * regime_multiplier(regime, *c)))
        .collect();
    let total: f64 = adjusted.iter().map(|(_, w)| w).sum();
    adjusted.into_iter().map(|(c, w)| (c, w / total)).collect()
}

struct CategoryAggregate {
    weighted_score: f64,
    average_power: f64,
    agreement_ratio: f64,
    contributor_count: usize,
    shortfall: bool,
}

fn aggregate_category(results: &[&IndicatorResult], registry: &Registry) -> CategoryAggregate {
    let usable: Vec<&&IndicatorResult> = results.iter().filter(|r| r.is_usable()).collect();
    let shortfall = usable.len() < MIN_CATEGORY_CONTRIBUTORS;

    if usable.is_empty() || shortfall {
        return CategoryAggregate {
            weighted_score: 0.0,
            average_power: 0.5,
            agreement_ratio: 0.0,
            contributor_count: usable.len(),
            shortfall,
        };
    }

    let weights: Vec<f64> = usable
        .iter()
        .map(|r| registry.lookup_importance(&r.name) * power(r.confidence, r.strength, r.score.abs()))
        .collect();
    let weight_sum: f64 = weights.iter().sum();
    let weighted_score = if weight_sum > 0.0 {
        usable.iter().zip(weights.iter()).map(|(r, w)| r.score * w).sum::<f64>() / weight_sum
    } else {
        0.0
    };
    let average_power = weights.iter().zip(usable.iter()).map(|(w, r)| w / registry.lookup_importance(&r.name)).sum::<f64>() / usable.len() as f64;

    let buy = usable.iter().filter(|r| r.direction == Direction::Buy).count();
    let sell = usable.iter().filter(|r| r.direction == Direction::Sell).count();
    let neutral = usable.iter().filter(|r| r.direction == Direction::Neutral).count();
    let agreement_ratio = buy.max(sell) as f64 / (buy + sell + neutral) as f64 + 1e-9;

    CategoryAggregate {
        weighted_score,
        average_power: average_power.clamp(0.5, 1.0),
        agreement_ratio: agreement_ratio.min(1.0),
        contributor_count: usable.len(),
        shortfall,
    }
}

fn regime_alignment(total_score: f64, regime: &MarketRegime) -> f64 {
    match regime.regime {
        Regime::StrongTrending => {
            if total_score.abs() >= 30.0 {
                1.0
            } else {
                0.5
            }
        }
        Regime::Ranging => 0.0,
        Regime::WeakTrending => {
            let adx_frac = ((regime.adx - 20.0) / 10.0).clamp(0.0, 1.0);
            let chop_frac = ((61.8 - regime.choppiness_index) / 11.8).clamp(0.0, 1.0);
            ((adx_frac + chop_frac) / 2.0).clamp(0.0, 1.0)
        }
        Regime::Unknown => 0.0,
    }
}

/// Output of the combiner: everything a `Signal` needs except the price levels.
pub struct CombinerOutput {
    pub action: Action,
    pub total_score: f64,
    pub confidence: f64,
    pub category_scores: Vec<CategoryScore>,
    pub dynamic_weights: HashMap<Category, f64>,
    pub reasoning: Vec<String>,
    pub alerts: Vec<String>,
}

/// Run C3 over every indicator result already produced by the registry (C1)
/// and the regime classification (C2).
pub fn combine(results: &[IndicatorResult], regime: &MarketRegime, registry: &Registry) -> CombinerOutput {
    let weights = dynamic_weights(regime.regime);
    let mut category_scores = Vec::with_capacity(crate::domain::Category::BASELINE.len());
    let mut alerts = Vec::new();
    let mut total_score = 0.0;
    let mut agreement_sum = 0.0;
    let mut power_sum = 0.0;

    for category in crate::domain::Category::BASELINE {
        let in_category: Vec<&IndicatorResult> = results.iter().filter(|r| r.category.baseline() == category).collect();
        let agg = aggregate_category(&in_category, registry);
        if agg.shortfall {
            alerts.push(format!(
                "{category:?}: only {} of {} minimum contributors available",
                agg.contributor_count, MIN_CATEGORY_CONTRIBUTORS
            ));
        }
        let w = weights.get(&category).copied().unwrap_or(0.0);
        total_score += w * agg.weighted_score;
        agreement_sum += agg.agreement_ratio;
        power_sum += agg.average_power;

        category_scores.push(CategoryScore {
            category,
            weighted_score: agg.weighted_score,
            average_power: agg.average_power,
            contributor_count: agg.contributor_count,
            agreement_ratio: agg.agreement_ratio,
        });
    }

    let categories_n = crate::domain::Category::BASELINE.len() as f64;
    let all_short = category_scores.iter().all(|c| c.contributor_count < MIN_CATEGORY_CONTRIBUTORS);

    if all_short {
        return CombinerOutput {
            action: Action::Hold,
            total_score: 0.0,
            confidence: 0.0,
            category_scores,
            dynamic_weights: weights,
            reasoning: vec!["no category had enough usable indicators".to_string()],
            alerts,
        };
    }

    total_score = total_score.clamp(-100.0, 100.0);
    let base = total_score.abs().min(100.0);
    let agreement = 20.0 * (agreement_sum / categories_n);
    let regime_fit = 10.0 * regime_alignment(total_score, regime);
    let mean_power = (power_sum / categories_n).clamp(0.5, 1.0);
    let power_scale = 0.8 + (1.2 - 0.8) * ((mean_power - 0.5) / 0.5);
    let confidence = ((base + agreement + regime_fit) * power_scale).clamp(0.0, 100.0);

    let action = Action::from_total_score(total_score);

    if regime.regime == Regime::Ranging && matches!(action, Action::StrongBuy | Action::StrongSell) {
        alerts.push("STRONG action emitted while regime is RANGING".to_string());
    }
    if regime.volatility == crate::domain::Volatility::VeryHigh {
        alerts.push("volatility is VERY_HIGH".to_string());
    }

    let mut contributors: Vec<(&IndicatorResult, f64)> = results
        .iter()
        .filter(|r| r.is_usable())
        .filter(|r| r.direction.matches_action(action))
        .map(|r| {
            let w = registry.lookup_importance(&r.name) * power(r.confidence, r.strength, r.score.abs());
            (r, r.score * w)
        })
        .collect();
    contributors.sort_by(|a, b| b.1.abs().partial_cmp(&a.1.abs()).unwrap());
    let reasoning = contributors
        .into_iter()
        .take(DEFAULT_REASONING_TOP_N)
        .map(|(r, weighted)| format!("{}: score {:+.0}, contribution {:+.1}", r.name, r.score, weighted))
        .collect();

    CombinerOutput {
        action,
        total_score,
        confidence,
        category_scores,
        dynamic_weights: weights,
        reasoning,
        alerts,
    }
}

impl Direction {
    fn matches_action(&self, action: Action) -> bool {
        match action {
            Action::Buy | Action::StrongBuy => *self == Direction::Buy,
            Action::Sell | Action::StrongSell => *self == Direction::Sell,
            Action::Hold => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MarketRegime, Volatility};

    fn regime(r: Regime) -> MarketRegime {
        MarketRegime {
            regime: r,
            volatility: Volatility::Normal,
            adx: 25.0,
            choppiness_index: 45.0,
            confidence: 70.0,
            interpretation: "test".into(),
        }
    }

    #[test]
    fn dynamic_weights_sum_to_one() {
        for r in [Regime::StrongTrending, Regime::WeakTrending, Regime::Ranging, Regime::Unknown] {
            let w = dynamic_weights(r);
            let sum: f64 = w.values().sum();
            assert!((sum - 1.0).abs() < 1e-9, "regime {r:?} weights sum to {sum}");
        }
    }

    #[test]
    fn all_categories_short_yields_hold_zero_confidence() {
        let registry = Registry::with_defaults();
        let output = combine(&[], &regime(Regime::Ranging), &registry);
        assert_eq!(output.action, Action::Hold);
        assert_eq!(output.confidence, 0.0);
    }
}
