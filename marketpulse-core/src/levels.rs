//! Levels calculator (C4): entry/stop/target levels from the current price,
//! action, and ATR (§4.4).

use crate::domain::{Action, Levels};

#[derive(Debug, Clone, Copy)]
pub struct LevelsConfig {
    pub stop_multiplier: f64,
    pub min_stop_percent: f64,
    /// Fallback absolute distance used only when both the ATR-based and
    /// percent-of-price stop distances degenerate to zero.
    pub fallback_distance: f64,
}

impl Default for LevelsConfig {
    fn default() -> Self {
        Self {
            stop_multiplier: 1.5,
            min_stop_percent: 0.005,
            fallback_distance: 1.0,
        }
    }
}

/// Compute trade levels. Returns the levels plus a possibly-downgraded action:
/// a degenerate stop distance (ATR and price both non-positive) downgrades
/// BUY/SELL to HOLD per §4.4.
pub fn compute_levels(current_price: f64, action: Action, atr: f64, config: &LevelsConfig) -> (Levels, Action, Option<String>) {
    let entry = current_price;
    let atr_distance = config.stop_multiplier * atr.max(0.0);
    let pct_distance = config.min_stop_percent * current_price.max(0.0);
    let mut stop_distance = atr_distance.max(pct_distance);
    let mut downgrade_alert = None;
    let mut effective_action = action;

    if stop_distance <= 0.0 {
        if current_price <= 0.0 {
            effective_action = Action::Hold;
            downgrade_alert = Some("degenerate stop distance (non-positive price and ATR); downgraded to HOLD".to_string());
            stop_distance = config.fallback_distance;
        } else {
            stop_distance = config.fallback_distance;
        }
    }

    let (stop_loss, target1, target2, target3) = match effective_action {
        Action::Buy | Action::StrongBuy => (
            entry - stop_distance,
            entry + stop_distance,
            entry + 2.0 * stop_distance,
            entry + 3.0 * stop_distance,
        ),
        Action::Sell | Action::StrongSell => (
            entry + stop_distance,
            entry - stop_distance,
            entry - 2.0 * stop_distance,
            entry - 3.0 * stop_distance,
        ),
        Action::Hold => (
            entry - stop_distance,
            entry + stop_distance,
            entry + 2.0 * stop_distance,
            entry + 3.0 * stop_distance,
        ),
    };

    let risk = (entry - stop_loss).abs();
    let reward = (target1 - entry).abs();
    let risk_reward_ratio = if risk > 0.0 { reward / risk } else { 1.0 };

    let levels = Levels {
        entry,
        stop_loss,
        target1,
        target2,
        target3,
        risk_reward_ratio,
    };

    (levels, effective_action, downgrade_alert)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buy_levels_are_monotone_increasing() {
        let (levels, action, alert) = compute_levels(100.0, Action::Buy, 2.0, &LevelsConfig::default());
        assert_eq!(action, Action::Buy);
        assert!(alert.is_none());
        assert!(levels.stop_loss < levels.entry);
        assert!(levels.entry < levels.target1);
        assert!(levels.target1 < levels.target2);
        assert!(levels.target2 < levels.target3);
        assert!(levels.risk_reward_ratio >= 1.0);
    }

    #[test]
    fn sell_levels_are_monotone_decreasing() {
        let (levels, _, _) = compute_levels(100.0, Action::Sell, 2.0, &LevelsConfig::default());
        assert!(levels.stop_loss > levels.entry);
        assert!(levels.entry > levels.target1);
        assert!(levels.target1 > levels.target2);
        assert!(levels.target2 > levels.target3);
    }

    #[test]
    fn degenerate_price_downgrades_to_hold() {
        let (_, action, alert) = compute_levels(0.0, Action::Buy, 0.0, &LevelsConfig::default());
        assert_eq!(action, Action::Hold);
        assert!(alert.is_some());
    }

    #[test]
    fn risk_reward_ratio_at_least_one_for_buy_and_sell() {
        for action in [Action::Buy, Action::StrongBuy, Action::Sell, Action::StrongSell] {
            let (levels, _, _) = compute_levels(250.0, action, 3.5, &LevelsConfig::default());
            assert!(levels.risk_reward_ratio >= 1.0);
        }
    }
}
