//! Indicator category — the axis the combiner aggregates and reweights over.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Trend,
    Momentum,
    Volume,
    Volatility,
    SupportResistance,
    Patterns,
    Options,
    Composite,
}

impl Category {
    /// The six baseline categories the weight table is defined over.
    /// `Options` and `Composite` fold into the nearest baseline category
    /// unless a caller extends the weight table explicitly.
    pub const BASELINE: [Category; 6] = [
        Category::Trend,
        Category::Momentum,
        Category::Volume,
        Category::Volatility,
        Category::SupportResistance,
        Category::Patterns,
    ];

    /// Baseline category this category's score folds into for weighting purposes.
    pub fn baseline(&self) -> Category {
        match self {
            Category::Options => Category::Momentum,
            Category::Composite => Category::Trend,
            other => *other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_folds_into_momentum() {
        assert_eq!(Category::Options.baseline(), Category::Momentum);
    }

    #[test]
    fn composite_folds_into_trend() {
        assert_eq!(Category::Composite.baseline(), Category::Trend);
    }

    #[test]
    fn baseline_categories_are_self_mapped() {
        for c in Category::BASELINE {
            assert_eq!(c.baseline(), c);
        }
    }
}
