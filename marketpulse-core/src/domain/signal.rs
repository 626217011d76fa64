//! Signal — the directional decision with entry/risk levels and a lifecycle (§3).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Category, MarketRegime, SignalId, Strength, Timeframe};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl Action {
    pub fn is_buy_family(&self) -> bool {
        matches!(self, Action::Buy | Action::StrongBuy)
    }

    pub fn is_sell_family(&self) -> bool {
        matches!(self, Action::Sell | Action::StrongSell)
    }

    pub fn direction_sign(&self) -> f64 {
        if self.is_buy_family() {
            1.0
        } else if self.is_sell_family() {
            -1.0
        } else {
            0.0
        }
    }

    /// Action mapping from total score (§4.3).
    pub fn from_total_score(total_score: f64) -> Self {
        if total_score >= 70.0 {
            Action::StrongBuy
        } else if total_score >= 30.0 {
            Action::Buy
        } else if total_score > -30.0 {
            Action::Hold
        } else if total_score > -70.0 {
            Action::Sell
        } else {
            Action::StrongSell
        }
    }
}

/// Entry/stop/target levels (§4.4).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Levels {
    pub entry: f64,
    pub stop_loss: f64,
    pub target1: f64,
    pub target2: f64,
    pub target3: f64,
    pub risk_reward_ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: Category,
    /// In [-100, 100].
    pub weighted_score: f64,
    /// In [0.5, 1.0].
    pub average_power: f64,
    pub contributor_count: usize,
    /// In [0, 1].
    pub agreement_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalStatus {
    Active,
    HitTarget,
    HitSl,
    ClosedProfit,
    ClosedLoss,
    Expired,
}

impl SignalStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SignalStatus::Active)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetHit {
    Target1,
    Target2,
    Target3,
    StopLoss,
    MarketClose,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Performance {
    pub outcome: Outcome,
    pub exit_price: Option<f64>,
    pub exit_time: Option<DateTime<Utc>>,
    pub target_hit: TargetHit,
    pub profit_loss: Option<f64>,
    pub profit_loss_percent: Option<f64>,
    pub remarks: Option<String>,
}

impl Performance {
    pub fn pending() -> Self {
        Self {
            outcome: Outcome::Pending,
            exit_price: None,
            exit_time: None,
            target_hit: TargetHit::None,
            profit_loss: None,
            profit_loss_percent: None,
            remarks: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub id: SignalId,
    pub symbol: String,
    pub timeframe: Timeframe,
    pub timestamp: DateTime<Utc>,
    pub current_price: f64,
    pub action: Action,
    /// In [0, 100].
    pub confidence: f64,
    pub strength: Strength,
    pub levels: Levels,
    pub category_scores: Vec<CategoryScore>,
    /// In [-100, 100].
    pub total_score: f64,
    /// Same as `confidence`, kept as a distinct field per §3 (the normalized-to-[0,100]
    /// view of `total_score`, as opposed to the raw signed `total_score`).
    pub normalized_score: f64,
    pub market_regime: MarketRegime,
    pub dynamic_weights: HashMap<String, f64>,
    pub reasoning: Vec<String>,
    pub alerts: Vec<String>,
    pub status: SignalStatus,
    pub performance: Option<Performance>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Signal {
    /// Sum of `dynamic_weights`, which must equal 1.0 within tolerance (§3 invariant).
    pub fn dynamic_weights_sum(&self) -> f64 {
        self.dynamic_weights.values().sum()
    }

    /// §8 invariant: for BUY family, stopLoss < entry < target1 < target2 < target3;
    /// for SELL family, inverted; HOLD carries no ordering requirement.
    pub fn levels_are_monotone(&self) -> bool {
        let l = &self.levels;
        match self.action {
            Action::Buy | Action::StrongBuy => {
                l.stop_loss < l.entry
                    && l.entry < l.target1
                    && l.target1 < l.target2
                    && l.target2 < l.target3
            }
            Action::Sell | Action::StrongSell => {
                l.stop_loss > l.entry
                    && l.entry > l.target1
                    && l.target1 > l.target2
                    && l.target2 > l.target3
            }
            Action::Hold => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_mapping_boundaries() {
        assert_eq!(Action::from_total_score(70.0), Action::StrongBuy);
        assert_eq!(Action::from_total_score(69.9), Action::Buy);
        assert_eq!(Action::from_total_score(30.0), Action::Buy);
        assert_eq!(Action::from_total_score(29.9), Action::Hold);
        assert_eq!(Action::from_total_score(-29.9), Action::Hold);
        assert_eq!(Action::from_total_score(-30.0), Action::Sell);
        assert_eq!(Action::from_total_score(-69.9), Action::Sell);
        assert_eq!(Action::from_total_score(-70.0), Action::StrongSell);
    }

    #[test]
    fn direction_sign_matches_family() {
        assert_eq!(Action::Buy.direction_sign(), 1.0);
        assert_eq!(Action::StrongSell.direction_sign(), -1.0);
        assert_eq!(Action::Hold.direction_sign(), 0.0);
    }

    #[test]
    fn status_terminal_classification() {
        assert!(!SignalStatus::Active.is_terminal());
        assert!(SignalStatus::HitTarget.is_terminal());
        assert!(SignalStatus::Expired.is_terminal());
    }
}
