//! Pipeline Configuration - every analytics constant as an operator-tunable TOML value
//!
//! Each struct implements `Default` with the documented constants from
//! `defaults.rs`, so a missing or partial config file changes nothing.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults;
use crate::types::HealthThresholds;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {}", .0.display(), .1)]
    Io(PathBuf, std::io::Error),

    #[error("Config parse error ({}): {}", .0.display(), .1)]
    Parse(PathBuf, toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for the analytics pipeline.
///
/// Load with `PipelineConfig::load()` which searches:
/// 1. `$SMART_MAINTAIN_CONFIG`
/// 2. `./maintenance.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub statistics: StatisticsConfig,

    #[serde(default)]
    pub anomaly: AnomalyConfig,

    #[serde(default)]
    pub prediction: PredictionConfig,

    /// Health score cutoffs for Healthy / Warning / Critical
    #[serde(default)]
    pub health: HealthThresholds,

    #[serde(default)]
    pub refresh: RefreshConfig,
}

impl PipelineConfig {
    /// Load configuration using the standard search order, falling back to
    /// defaults on any failure.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded pipeline config from {}", defaults::CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", defaults::CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", defaults::CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(defaults::LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded pipeline config from ./{}", defaults::LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", defaults::LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No {} found, using built-in defaults", defaults::LOCAL_CONFIG_FILE);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        // Typos are warnings only; serde still fills the defaults
        for w in super::validation::validate_unknown_keys(&contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values that would make the pipeline meaningless or divide by zero.
    ///
    /// Suspicious-but-possible values are logged as warnings and accepted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (errors, warnings) = super::validation::validate_ranges(self);
        for w in &warnings {
            warn!("{}", w);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Statistics
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsConfig {
    /// Most recent readings summarised per machine
    #[serde(default = "default_statistics_window")]
    pub window: usize,
}

fn default_statistics_window() -> usize { defaults::STATISTICS_WINDOW }

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self { window: default_statistics_window() }
    }
}

// ============================================================================
// Anomaly Detection
// ============================================================================

/// Isolation forest and attribution tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyConfig {
    #[serde(default = "default_anomaly_min_readings")]
    pub min_readings: usize,

    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,

    /// Expected outlier fraction, in (0, 0.5]
    #[serde(default = "default_contamination")]
    pub contamination: f64,

    /// Sub-sample drawn for each tree
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,

    /// Seed for every per-machine fit
    #[serde(default = "default_anomaly_seed")]
    pub seed: u64,

    /// |z| above which a channel is marked unusual
    #[serde(default = "default_z_threshold")]
    pub z_threshold: f64,

    #[serde(default = "default_max_recent")]
    pub max_recent: usize,
}

fn default_anomaly_min_readings() -> usize { defaults::ANOMALY_MIN_READINGS }
fn default_n_estimators() -> usize { defaults::ANOMALY_N_ESTIMATORS }
fn default_contamination() -> f64 { defaults::ANOMALY_CONTAMINATION }
fn default_max_samples() -> usize { defaults::ANOMALY_MAX_SAMPLES }
fn default_anomaly_seed() -> u64 { defaults::ANOMALY_SEED }
fn default_z_threshold() -> f64 { defaults::ANOMALY_Z_THRESHOLD }
fn default_max_recent() -> usize { defaults::ANOMALY_MAX_RECENT }

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            min_readings: default_anomaly_min_readings(),
            n_estimators: default_n_estimators(),
            contamination: default_contamination(),
            max_samples: default_max_samples(),
            seed: default_anomaly_seed(),
            z_threshold: default_z_threshold(),
            max_recent: default_max_recent(),
        }
    }
}

// ============================================================================
// Failure Prediction
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionConfig {
    #[serde(default = "default_prediction_min_readings")]
    pub min_readings: usize,

    /// Most recent readings used for feature engineering
    #[serde(default = "default_prediction_window")]
    pub window: usize,

    /// Fewer points than this give a zero trend
    #[serde(default = "default_trend_min_points")]
    pub trend_min_points: usize,

    /// Used when `last_maintenance` cannot be parsed
    #[serde(default = "default_days_since_maintenance")]
    pub default_days_since_maintenance: i64,

    #[serde(default = "default_probability_cap")]
    pub probability_cap: f64,

    /// Seed for days-to-failure sampling. `None` draws from OS entropy, so
    /// identical inputs give different horizons across runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_prediction_min_readings() -> usize { defaults::PREDICTION_MIN_READINGS }
fn default_prediction_window() -> usize { defaults::PREDICTION_WINDOW }
fn default_trend_min_points() -> usize { defaults::TREND_MIN_POINTS }
fn default_days_since_maintenance() -> i64 { defaults::DEFAULT_DAYS_SINCE_MAINTENANCE }
fn default_probability_cap() -> f64 { defaults::PROBABILITY_CAP }

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            min_readings: default_prediction_min_readings(),
            window: default_prediction_window(),
            trend_min_points: default_trend_min_points(),
            default_days_since_maintenance: default_days_since_maintenance(),
            probability_cap: default_probability_cap(),
            seed: None,
        }
    }
}

// ============================================================================
// Equipment Refresh
// ============================================================================

/// Health decay applied to the equipment table on each refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_decay_probability")]
    pub decay_probability: f64,

    #[serde(default = "default_decay_min")]
    pub decay_min: f64,

    #[serde(default = "default_decay_max")]
    pub decay_max: f64,

    #[serde(default = "default_due_days_step_min")]
    pub due_days_step_min: u32,

    #[serde(default = "default_due_days_step_max")]
    pub due_days_step_max: u32,
}

fn default_decay_probability() -> f64 { defaults::DECAY_PROBABILITY }
fn default_decay_min() -> f64 { defaults::DECAY_MIN }
fn default_decay_max() -> f64 { defaults::DECAY_MAX }
fn default_due_days_step_min() -> u32 { defaults::DUE_DAYS_STEP_MIN }
fn default_due_days_step_max() -> u32 { defaults::DUE_DAYS_STEP_MAX }

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            decay_probability: default_decay_probability(),
            decay_min: default_decay_min(),
            decay_max: default_decay_max(),
            due_days_step_min: default_due_days_step_min(),
            due_days_step_max: default_due_days_step_max(),
        }
    }
}
