pub mod evaluator;
pub mod resolver;
pub mod sweep;
pub mod whatif;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::inputs::GlobalParameters;

// The only error kind the engine raises. Non-retryable; surfaced to the
// caller for correction.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

// Callers must guard `rate > 0`.
pub fn margin_at(rate: f64, cost: f64) -> f64 {
    (rate - cost) / rate * 100.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Target {
    pub hourly_cost: f64,
    pub target_rate_before_discount: f64,
    pub target_rate_after_discount: f64,
    pub target_margin_pct: f64,
    pub min_margin_pct: f64,
    pub discount_pct: f64,
    pub forced_vacation_days: f64,
    pub globals: GlobalParameters,
    // whether the after-discount rate still meets min_margin_pct
    pub is_within_objective: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Proposal {
    pub rate: f64,
    pub margin_pct: f64,
    pub margin_per_hour: f64,
    // signed percentage points, not a ratio
    pub diff_vs_target: f64,
    pub discount_delta_pct: f64,
    pub premium_vs_target_per_hour: f64,
    pub status: RateStatus,
}

pub const EXCELLENT_HEADROOM_PCT: f64 = 5.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RateStatus {
    Excellent,
    Compliant,
    BelowObjective,
}

impl RateStatus {
    // band boundaries are inclusive on the lower bound
    pub fn classify(diff_vs_target: f64) -> Self {
        if diff_vs_target >= EXCELLENT_HEADROOM_PCT {
            Self::Excellent
        } else if diff_vs_target >= 0.0 {
            Self::Compliant
        } else {
            Self::BelowObjective
        }
    }
}

impl Display for RateStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Excellent => "excellent",
            Self::Compliant => "compliant",
            Self::BelowObjective => "below objective",
        };
        write!(f, "{label}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_bands_are_inclusive_on_lower_bound() {
        assert_eq!(RateStatus::classify(5.0), RateStatus::Excellent);
        assert_eq!(RateStatus::classify(4.999), RateStatus::Compliant);
        assert_eq!(RateStatus::classify(0.0), RateStatus::Compliant);
        assert_eq!(RateStatus::classify(-0.001), RateStatus::BelowObjective);
    }

    #[test]
    fn margin_formula_matches_definition() {
        assert!((margin_at(110.0, 82.5) - 25.0).abs() < 1e-9);
        assert_eq!(margin_at(100.0, 100.0), 0.0);
    }
}
