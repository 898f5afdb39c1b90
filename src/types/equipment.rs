//! Equipment table records and health status classification

use serde::{Deserialize, Serialize};

use crate::config::defaults;

/// Static and slowly-changing metadata for one machine.
///
/// One record per `machine_id`. `health_score`, `status` and
/// `maintenance_due_days` are mutated on refresh (see `FleetState::refresh`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRecord {
    pub machine_id: String,
    pub machine_type: String,
    pub manufacturer: String,
    pub installation_year: i32,
    /// 0-100, lower is worse
    pub health_score: f64,
    pub status: HealthStatus,
    pub maintenance_due_days: u32,
    pub location: String,
    /// Raw `YYYY-MM-DD` string. Kept unparsed so a malformed value degrades
    /// to a default in the predictor instead of rejecting the whole record.
    pub last_maintenance: String,
}

impl EquipmentRecord {
    /// Recompute `status` from the current `health_score`.
    pub fn reclassify(&mut self, thresholds: &HealthThresholds) {
        self.status = HealthStatus::from_score(self.health_score, thresholds);
    }
}

/// Equipment condition derived from the health score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl HealthStatus {
    /// Classify a health score.
    ///
    /// `< critical_below` is Critical, `< warning_below` is Warning,
    /// everything else is Healthy.
    pub fn from_score(score: f64, thresholds: &HealthThresholds) -> Self {
        if score < thresholds.critical_below {
            HealthStatus::Critical
        } else if score < thresholds.warning_below {
            HealthStatus::Warning
        } else {
            HealthStatus::Healthy
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "Healthy"),
            HealthStatus::Warning => write!(f, "Warning"),
            HealthStatus::Critical => write!(f, "Critical"),
        }
    }
}

impl std::str::FromStr for HealthStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "healthy" => Ok(HealthStatus::Healthy),
            "warning" => Ok(HealthStatus::Warning),
            "critical" => Ok(HealthStatus::Critical),
            other => Err(format!("unknown health status '{other}'")),
        }
    }
}

/// Health score cutoffs for status classification.
///
/// 70/85 is the canonical pair and is used by ingest, refresh and reporting
/// alike. Some upstream tools classify with 60/80; those labels are not
/// reproduced here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthThresholds {
    /// Scores below this are Critical
    #[serde(default = "default_critical_below")]
    pub critical_below: f64,
    /// Scores below this (and not Critical) are Warning
    #[serde(default = "default_warning_below")]
    pub warning_below: f64,
}

fn default_critical_below() -> f64 { defaults::HEALTH_CRITICAL_BELOW }
fn default_warning_below() -> f64 { defaults::HEALTH_WARNING_BELOW }

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            critical_below: default_critical_below(),
            warning_below: default_warning_below(),
        }
    }
}
