//! System-wide default constants.
//!
//! Every tunable in `PipelineConfig` defaults to one of these values.
//! Grouped by pipeline stage for easy discovery.

// ============================================================================
// Statistics Aggregator
// ============================================================================

/// Number of most recent readings summarised per machine.
pub const STATISTICS_WINDOW: usize = 24;

// ============================================================================
// Anomaly Detector
// ============================================================================

/// Machines with fewer readings are skipped by the outlier model.
pub const ANOMALY_MIN_READINGS: usize = 10;

/// Number of isolation trees per fit.
pub const ANOMALY_N_ESTIMATORS: usize = 100;

/// Expected fraction of outliers in a machine's history.
pub const ANOMALY_CONTAMINATION: f64 = 0.05;

/// Sub-sample size per isolation tree (capped at the machine's reading count).
pub const ANOMALY_MAX_SAMPLES: usize = 256;

/// Seed for the outlier model. Each machine's fit starts from this seed.
pub const ANOMALY_SEED: u64 = 42;

/// |z| above which a channel is blamed for an anomaly.
pub const ANOMALY_Z_THRESHOLD: f64 = 2.0;

/// Number of most recent anomalies reported per machine.
pub const ANOMALY_MAX_RECENT: usize = 5;

// ============================================================================
// Failure Predictor
// ============================================================================

/// Machines with fewer readings get no prediction.
pub const PREDICTION_MIN_READINGS: usize = 10;

/// Number of most recent readings used for feature engineering.
pub const PREDICTION_WINDOW: usize = 48;

/// Minimum points for a trend slope; shorter windows report a flat trend.
pub const TREND_MIN_POINTS: usize = 6;

/// Days since maintenance assumed when `last_maintenance` does not parse.
pub const DEFAULT_DAYS_SINCE_MAINTENANCE: i64 = 365;

/// Upper bound on the heuristic failure probability.
pub const PROBABILITY_CAP: f64 = 0.95;

// ============================================================================
// Health Classification
// ============================================================================

/// Health scores below this are Critical.
pub const HEALTH_CRITICAL_BELOW: f64 = 70.0;

/// Health scores below this (and not Critical) are Warning.
pub const HEALTH_WARNING_BELOW: f64 = 85.0;

// ============================================================================
// Equipment Refresh
// ============================================================================

/// Chance per machine per refresh that its health score decays.
pub const DECAY_PROBABILITY: f64 = 0.3;

/// Smallest health decay applied in one refresh.
pub const DECAY_MIN: f64 = 0.1;

/// Largest health decay applied in one refresh.
pub const DECAY_MAX: f64 = 1.0;

/// Range of days removed from `maintenance_due_days` for critical machines.
pub const DUE_DAYS_STEP_MIN: u32 = 1;
pub const DUE_DAYS_STEP_MAX: u32 = 3;

// ============================================================================
// Config discovery
// ============================================================================

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SMART_MAINTAIN_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "maintenance.toml";
