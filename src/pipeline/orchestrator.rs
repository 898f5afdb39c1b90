//! Runs the four analytics stages over a full sensor + equipment snapshot.

use chrono::NaiveDateTime;
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::{debug, info};

use super::PipelineError;
use crate::anomaly::AnomalyDetector;
use crate::config::PipelineConfig;
use crate::prediction::{FailurePredictor, RiskScorer};
use crate::recommendation::RecommendationEngine;
use crate::statistics::StatisticsAggregator;
use crate::types::{EquipmentRecord, ProcessedData, SensorReading};

/// Sequences statistics → anomalies → predictions → recommendations.
///
/// Holds configuration only; no state survives between runs.
#[derive(Debug)]
pub struct MaintenancePipeline {
    statistics: StatisticsAggregator,
    detector: AnomalyDetector,
    predictor: FailurePredictor,
    recommender: RecommendationEngine,
}

impl MaintenancePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            statistics: StatisticsAggregator::new(&config.statistics),
            detector: AnomalyDetector::new(config.anomaly),
            predictor: FailurePredictor::new(config.prediction),
            recommender: RecommendationEngine,
        }
    }

    /// Pipeline whose failure predictor uses a custom risk model.
    pub fn with_scorer(config: PipelineConfig, scorer: Box<dyn RiskScorer>) -> Self {
        Self {
            predictor: FailurePredictor::with_scorer(config.prediction.clone(), scorer),
            ..Self::new(config)
        }
    }

    /// Run every stage and assemble the result.
    ///
    /// `as_of` is the reference time for machine age, days since maintenance
    /// and the prediction timestamp.
    ///
    /// # Errors
    ///
    /// An empty reading set. Per-machine data gaps are not errors; those
    /// machines are simply absent from the affected maps. An empty equipment
    /// table only leaves predictions and recommendations empty.
    pub fn run(
        &self,
        readings: &[SensorReading],
        equipment: &[EquipmentRecord],
        as_of: NaiveDateTime,
    ) -> Result<ProcessedData, PipelineError> {
        if readings.is_empty() {
            return Err(PipelineError::EmptySensorData);
        }

        let started = Instant::now();
        log_coverage_gaps(readings, equipment);

        // STAGE 1
        let statistics = self.statistics.aggregate(readings);

        // STAGE 2
        let anomalies = self.detector.detect(readings);

        // STAGE 3
        let predictions = self.predictor.predict(readings, equipment, as_of);

        // STAGE 4
        let recommendations = self.recommender.recommend_all(&predictions);

        info!(
            readings = readings.len(),
            equipment = equipment.len(),
            statistics = statistics.len(),
            anomalies = anomalies.len(),
            predictions = predictions.len(),
            scorer = self.predictor.scorer_name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Pipeline run complete"
        );

        Ok(ProcessedData {
            sensor_data: readings.to_vec(),
            equipment_data: equipment.to_vec(),
            statistics,
            anomalies,
            predictions,
            recommendations,
        })
    }
}

impl Default for MaintenancePipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

/// Debug-log machines that appear on only one side of the input contract.
fn log_coverage_gaps(readings: &[SensorReading], equipment: &[EquipmentRecord]) {
    let sensed: BTreeSet<&str> = readings.iter().map(|r| r.machine_id.as_str()).collect();
    let registered: BTreeSet<&str> = equipment.iter().map(|e| e.machine_id.as_str()).collect();

    for id in sensed.difference(&registered) {
        debug!(machine_id = %id, "Readings without equipment record; no prediction");
    }
    for id in registered.difference(&sensed) {
        debug!(machine_id = %id, "Equipment record without readings; no statistics");
    }
}
