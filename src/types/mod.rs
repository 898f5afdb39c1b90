//! Shared data structures for the predictive maintenance pipeline
//!
//! This module defines the input contract and the derived records:
//! - Input: SensorReading (IoT time series), EquipmentRecord (equipment table)
//! - Stage 1: MachineStatistics (rolling-window channel summaries)
//! - Stage 2: AnomalyRecord (outlier model labels + sensor attribution)
//! - Stage 3: PredictionRecord (failure risk, horizon, impact)
//! - Stage 4: RecommendationRecord (urgency tier + actions)
//! - Output: ProcessedData (the assembled result consumed by reporting)

mod sensor;
mod equipment;
mod analytics;

pub use sensor::*;
pub use equipment::*;
pub use analytics::*;
