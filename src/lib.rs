//! Smart Maintain: Predictive Maintenance Analytics
//!
//! Turns raw IoT sensor time series and an equipment table into per-machine
//! statistics, anomaly flags, failure predictions and maintenance
//! recommendations.
//!
//! ## Architecture
//!
//! - **Statistics Aggregator**: rolling-window channel summaries
//! - **Anomaly Detector**: per-machine isolation forest with z-score attribution
//! - **Failure Predictor**: heuristic `RiskScorer`, horizon sampling, impact, confidence
//! - **Recommendation Engine**: urgency tiers and maintenance actions
//! - **Pipeline Orchestrator**: runs the stages and assembles `ProcessedData`

pub mod config;
pub mod types;
pub mod statistics;
pub mod anomaly;
pub mod prediction;
pub mod recommendation;
pub mod pipeline;
pub mod alerts;
pub mod ingest;

// Re-export configuration
pub use config::{ConfigError, PipelineConfig};

// Re-export commonly used types
pub use types::{
    AnomalyEvent, AnomalyRecord, ChannelStats, EquipmentRecord, HealthStatus, HealthThresholds,
    MachineStatistics, PredictionRecord, ProcessedData, RecommendationRecord, SensorChannel,
    SensorReading, Urgency,
};

// Re-export stage components
pub use anomaly::{AnomalyDetector, IsolationForest};
pub use prediction::{FailurePredictor, HeuristicRiskScorer, RiskScorer};
pub use recommendation::RecommendationEngine;
pub use statistics::StatisticsAggregator;

// Re-export orchestration
pub use pipeline::{FleetState, MaintenancePipeline, PipelineError};

// Re-export reporting views
pub use alerts::{AlertUrgency, FleetSummary, MaintenanceAlert, MaintenanceBoard};

// Re-export ingest
pub use ingest::{load_equipment, load_sensor_readings, IngestError};
