//! Failure-probability scoring.
//!
//! The pipeline only depends on the [`RiskScorer`] trait; the shipped
//! implementation is the additive heuristic below. A trained model can be
//! dropped in behind the same trait without touching the orchestrator.

use serde::{Deserialize, Serialize};

use super::features::FailureFeatures;
use crate::config::defaults;

/// Maps engineered features to a failure probability in [0, 1].
pub trait RiskScorer: Send + Sync {
    /// Scorer name for logs (e.g. "heuristic")
    fn name(&self) -> &str;

    /// Failure probability. Implementations must return a finite value in [0, 1].
    fn failure_probability(&self, features: &FailureFeatures) -> f64;
}

/// Per-factor contributions of the heuristic, each non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskBreakdown {
    pub base: f64,
    pub age: f64,
    pub maintenance: f64,
    pub health: f64,
    pub temperature: f64,
    pub vibration: f64,
}

impl RiskBreakdown {
    /// Uncapped sum of all factors.
    pub fn total(&self) -> f64 {
        self.base + self.age + self.maintenance + self.health + self.temperature + self.vibration
    }
}

/// Additive heuristic: base risk plus age, maintenance, health, temperature
/// and vibration terms, capped.
///
/// ```text
/// base        0.10
/// age         min(0.40, age_years * 0.03)
/// maintenance min(0.30, days_since_maintenance * 0.001)
/// health      max(0, (100 - health_score) * 0.005)
/// temperature 20 * max(0, temp_trend)  + 0.01 * max(0, max_temp - 85)
/// vibration   50 * max(0, vib_trend)   + 0.2  * max(0, max_vib - 1.0)
/// ```
#[derive(Debug, Clone)]
pub struct HeuristicRiskScorer {
    cap: f64,
}

impl HeuristicRiskScorer {
    pub const BASE: f64 = 0.10;
    pub const TEMPERATURE_LIMIT: f64 = 85.0;
    pub const VIBRATION_LIMIT: f64 = 1.0;

    pub fn new(cap: f64) -> Self {
        Self { cap: cap.clamp(0.0, 1.0) }
    }

    /// Individual factor contributions before the cap.
    ///
    /// `f64::max`/`f64::min` discard NaN operands, so a NaN feature
    /// contributes nothing instead of poisoning the sum.
    pub fn breakdown(&self, f: &FailureFeatures) -> RiskBreakdown {
        let positive = |x: f64| x.max(0.0);

        RiskBreakdown {
            base: Self::BASE,
            age: (f64::from(f.machine_age.max(0)) * 0.03).min(0.40).max(0.0),
            maintenance: (f.days_since_maintenance.max(0) as f64 * 0.001).min(0.30).max(0.0),
            health: positive((100.0 - f.health_score) * 0.005),
            temperature: positive(f.temperature_trend) * 20.0
                + positive(f.max_temperature - Self::TEMPERATURE_LIMIT) * 0.01,
            vibration: positive(f.vibration_trend) * 50.0
                + positive(f.max_vibration - Self::VIBRATION_LIMIT) * 0.2,
        }
    }
}

impl Default for HeuristicRiskScorer {
    fn default() -> Self {
        Self::new(defaults::PROBABILITY_CAP)
    }
}

impl RiskScorer for HeuristicRiskScorer {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn failure_probability(&self, features: &FailureFeatures) -> f64 {
        let total = self.breakdown(features).total();
        if total.is_finite() {
            total.clamp(0.0, self.cap)
        } else {
            self.cap
        }
    }
}
