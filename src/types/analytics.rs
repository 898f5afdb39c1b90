//! Derived analytics records and the assembled pipeline output
//!
//! All of these are rebuilt from scratch on every pipeline run. They carry no
//! identity beyond the `machine_id` key they are stored under.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ChannelValues, EquipmentRecord, SensorChannel, SensorReading};

// ============================================================================
// Stage 1: Statistics
// ============================================================================

/// Summary of one channel over the recent window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelStats {
    /// Most recent value
    pub current: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation (n-1); 0 with fewer than two readings
    pub std: f64,
}

/// Per-channel summaries for one machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MachineStatistics {
    pub temperature: ChannelStats,
    pub pressure: ChannelStats,
    pub vibration: ChannelStats,
    pub power: ChannelStats,
}

impl MachineStatistics {
    pub fn channel(&self, channel: SensorChannel) -> &ChannelStats {
        match channel {
            SensorChannel::Temperature => &self.temperature,
            SensorChannel::Pressure => &self.pressure,
            SensorChannel::Vibration => &self.vibration,
            SensorChannel::Power => &self.power,
        }
    }

    pub fn channel_mut(&mut self, channel: SensorChannel) -> &mut ChannelStats {
        match channel {
            SensorChannel::Temperature => &mut self.temperature,
            SensorChannel::Pressure => &mut self.pressure,
            SensorChannel::Vibration => &mut self.vibration,
            SensorChannel::Power => &mut self.power,
        }
    }
}

// ============================================================================
// Stage 2: Anomalies
// ============================================================================

/// One reading labelled as an outlier, with the channels that explain it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyEvent {
    pub timestamp: NaiveDateTime,
    /// Channels with |z| above the attribution threshold; never empty
    pub unusual_sensors: Vec<SensorChannel>,
    pub sensor_values: ChannelValues,
    /// Absolute z-scores against the machine's own history
    pub z_scores: ChannelValues,
}

/// Outlier model results for one machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    /// Most recent first, at most `anomaly.max_recent` entries
    pub recent_anomalies: Vec<AnomalyEvent>,
    pub anomaly_count: usize,
    /// 0-100
    pub anomaly_percentage: f64,
    pub has_recent_anomaly: bool,
}

// ============================================================================
// Stage 3: Predictions
// ============================================================================

/// Failure risk estimate for one machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// 0-1, capped at the configured probability cap
    pub failure_probability: f64,
    pub days_to_failure: u32,
    pub estimated_downtime_hours: f64,
    pub estimated_cost: u64,
    /// 0.5-0.95
    pub confidence: f64,
    pub prediction_timestamp: NaiveDateTime,
}

// ============================================================================
// Stage 4: Recommendations
// ============================================================================

/// Maintenance priority tier.
///
/// Variants are declared in increasing severity so the derived ordering can
/// be used to compare tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Urgency {
    Normal,
    Planned,
    Soon,
    Immediate,
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Urgency::Normal => write!(f, "Normal"),
            Urgency::Planned => write!(f, "Planned"),
            Urgency::Soon => write!(f, "Soon"),
            Urgency::Immediate => write!(f, "Immediate"),
        }
    }
}

/// Suggested maintenance response for one machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub urgency: Urgency,
    pub message: String,
    pub actions: Vec<String>,
    /// Hours, copied from the prediction
    pub estimated_downtime: f64,
    pub estimated_cost: u64,
}

// ============================================================================
// Assembled output
// ============================================================================

/// Everything one pipeline run produces.
///
/// Sub-maps are keyed by `machine_id` and coverage differs between them: a
/// machine can have statistics but no anomalies (too few readings) or no
/// prediction (missing equipment record). Consumers look keys up and treat a
/// miss as "insufficient data".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessedData {
    pub sensor_data: Vec<SensorReading>,
    pub equipment_data: Vec<EquipmentRecord>,
    pub statistics: BTreeMap<String, MachineStatistics>,
    pub anomalies: BTreeMap<String, AnomalyRecord>,
    pub predictions: BTreeMap<String, PredictionRecord>,
    pub recommendations: BTreeMap<String, RecommendationRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urgency_ordering_is_severity() {
        assert!(Urgency::Normal < Urgency::Planned);
        assert!(Urgency::Planned < Urgency::Soon);
        assert!(Urgency::Soon < Urgency::Immediate);
    }

    #[test]
    fn test_statistics_channel_accessors() {
        let mut stats = MachineStatistics::default();
        stats.channel_mut(SensorChannel::Vibration).max = 1.5;
        assert!((stats.vibration.max - 1.5).abs() < f64::EPSILON);
        assert!((stats.channel(SensorChannel::Vibration).max - 1.5).abs() < f64::EPSILON);
    }
}
