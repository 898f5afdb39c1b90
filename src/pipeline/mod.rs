//! Pipeline Orchestrator
//!
//! ## Stage Order
//!
//! ```text
//! STAGE 1: Statistics Aggregator  (last 24 readings per machine)
//! STAGE 2: Anomaly Detector       (isolation forest per machine, >= 10 readings)
//! STAGE 3: Failure Predictor      (heuristic risk, horizon, impact, confidence)
//! STAGE 4: Recommendation Engine  (urgency tier, message, actions)
//! ```
//!
//! Every stage is a pure function of the sensor readings and the equipment
//! table. The orchestrator re-runs all four stages on every refresh and hands
//! back a fresh `ProcessedData` owned by the caller. Long-lived session data
//! (readings, equipment) lives in an explicit `FleetState`.

mod error;
mod orchestrator;
mod state;

pub use error::PipelineError;
pub use orchestrator::MaintenancePipeline;
pub use state::{FleetState, RefreshReport};
