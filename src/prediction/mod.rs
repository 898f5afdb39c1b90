//! Failure Predictor
//!
//! Turns a machine's recent readings and its equipment record into a
//! failure probability, a days-to-failure horizon, a downtime/cost impact
//! and a confidence value.
//!
//! ## Stages
//!
//! 1. **features** - rolling-window trends, maxima and spreads, machine age,
//!    days since maintenance
//! 2. **risk** - `RiskScorer` trait and the additive heuristic scorer
//! 3. **horizon** - probability bucket → uniformly sampled days-to-failure
//! 4. **impact** - machine-type base downtime/cost scaled by age and severity
//! 5. **confidence** - data volume and signal consistency

pub mod confidence;
pub mod features;
pub mod horizon;
pub mod impact;
pub mod predictor;
pub mod risk;

pub use confidence::prediction_confidence;
pub use features::FailureFeatures;
pub use horizon::{days_range, sample_days_to_failure};
pub use impact::{estimate_impact, ImpactEstimate};
pub use predictor::{index_equipment, machine_rng, FailurePredictor};
pub use risk::{HeuristicRiskScorer, RiskBreakdown, RiskScorer};
