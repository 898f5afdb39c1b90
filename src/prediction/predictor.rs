//! Per-machine failure prediction.

use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use super::confidence::prediction_confidence;
use super::features::FailureFeatures;
use super::horizon::sample_days_to_failure;
use super::impact::estimate_impact;
use super::risk::{HeuristicRiskScorer, RiskScorer};
use crate::config::PredictionConfig;
use crate::statistics::{group_by_machine, round_to};
use crate::types::{EquipmentRecord, PredictionRecord, SensorReading};

/// Random source for one machine's horizon draw.
///
/// With a seed, machine `index` (its position in the sorted machine list)
/// gets `seed + index`, so results do not depend on thread scheduling.
/// Without one, every machine draws from OS entropy.
pub fn machine_rng(seed: Option<u64>, index: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
        None => StdRng::from_entropy(),
    }
}

/// Index equipment records by machine id. The first record wins on duplicates.
pub fn index_equipment(equipment: &[EquipmentRecord]) -> HashMap<&str, &EquipmentRecord> {
    let mut index = HashMap::with_capacity(equipment.len());
    for record in equipment {
        index.entry(record.machine_id.as_str()).or_insert(record);
    }
    index
}

/// Feature engineering, risk scoring, horizon and impact for each machine.
pub struct FailurePredictor {
    config: PredictionConfig,
    scorer: Box<dyn RiskScorer>,
}

impl FailurePredictor {
    /// Predictor using the heuristic scorer capped at `config.probability_cap`.
    pub fn new(config: PredictionConfig) -> Self {
        let scorer = Box::new(HeuristicRiskScorer::new(config.probability_cap));
        Self { config, scorer }
    }

    /// Predictor with a custom risk model.
    ///
    /// The result is still clamped to `[0, probability_cap]`.
    pub fn with_scorer(config: PredictionConfig, scorer: Box<dyn RiskScorer>) -> Self {
        Self { config, scorer }
    }

    pub fn scorer_name(&self) -> &str {
        self.scorer.name()
    }

    /// Predict every machine that has an equipment record and enough readings.
    ///
    /// Machines are processed in parallel, each with its own [`machine_rng`].
    pub fn predict(
        &self,
        readings: &[SensorReading],
        equipment: &[EquipmentRecord],
        as_of: NaiveDateTime,
    ) -> BTreeMap<String, PredictionRecord> {
        let index = index_equipment(equipment);
        let groups: Vec<(usize, (&str, Vec<&SensorReading>))> =
            group_by_machine(readings).into_iter().enumerate().collect();

        groups
            .into_par_iter()
            .filter_map(|(i, (id, series))| {
                let mut rng = machine_rng(self.config.seed, i);
                self.predict_machine(id, &series, index.get(id).copied(), as_of, &mut rng)
                    .map(|record| (id.to_string(), record))
            })
            .collect()
    }

    /// Predict one machine from its chronologically sorted readings.
    ///
    /// Returns `None` when the equipment record is missing or there are fewer
    /// than `min_readings` readings.
    pub fn predict_machine<R: Rng + ?Sized>(
        &self,
        machine_id: &str,
        series: &[&SensorReading],
        equipment: Option<&EquipmentRecord>,
        as_of: NaiveDateTime,
        rng: &mut R,
    ) -> Option<PredictionRecord> {
        let Some(equipment) = equipment else {
            debug!(machine_id = %machine_id, "Skipping prediction: no equipment record");
            return None;
        };
        if series.len() < self.config.min_readings {
            debug!(
                machine_id = %machine_id,
                readings = series.len(),
                required = self.config.min_readings,
                "Skipping prediction: insufficient readings"
            );
            return None;
        }

        let features = FailureFeatures::extract(series, equipment, as_of, &self.config);
        let probability = self
            .scorer
            .failure_probability(&features)
            .clamp(0.0, self.config.probability_cap);

        let days_to_failure = sample_days_to_failure(probability, rng);
        let impact = estimate_impact(&equipment.machine_type, features.machine_age, probability);
        let confidence =
            prediction_confidence(series.len(), features.temperature_std, features.vibration_std);

        debug!(
            machine_id = %machine_id,
            scorer = self.scorer.name(),
            probability,
            days_to_failure,
            confidence,
            "Failure prediction"
        );

        Some(PredictionRecord {
            failure_probability: round_to(probability, 3),
            days_to_failure,
            estimated_downtime_hours: round_to(impact.downtime_hours, 1),
            estimated_cost: impact.cost.max(0.0) as u64,
            confidence: round_to(confidence, 3),
            prediction_timestamp: as_of,
        })
    }
}

impl Default for FailurePredictor {
    fn default() -> Self {
        Self::new(PredictionConfig::default())
    }
}

impl std::fmt::Debug for FailurePredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailurePredictor")
            .field("config", &self.config)
            .field("scorer", &self.scorer.name())
            .finish()
    }
}
