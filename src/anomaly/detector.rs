//! Per-machine anomaly detection and sensor attribution.

use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

use super::isolation_forest::IsolationForest;
use super::scaler::{FeatureVector, StandardScaler, NUM_FEATURES};
use crate::config::AnomalyConfig;
use crate::statistics::{group_by_machine, mean, round_to, sample_std};
use crate::types::{AnomalyEvent, AnomalyRecord, ChannelValues, SensorChannel, SensorReading};

/// Fits one isolation forest per machine on every call.
///
/// Stateless between calls: the model is rebuilt from the machine's own
/// history each time, seeded from `AnomalyConfig::seed`.
#[derive(Debug, Clone, Default)]
pub struct AnomalyDetector {
    config: AnomalyConfig,
}

impl AnomalyDetector {
    pub fn new(config: AnomalyConfig) -> Self {
        Self { config }
    }

    /// Detect anomalies for every machine in `readings`.
    ///
    /// Machines below `min_readings` are left out of the map.
    pub fn detect(&self, readings: &[SensorReading]) -> BTreeMap<String, AnomalyRecord> {
        group_by_machine(readings)
            .par_iter()
            .filter_map(|(id, series)| {
                self.detect_machine(id, series).map(|record| ((*id).to_string(), record))
            })
            .collect()
    }

    /// Detect anomalies in one machine's chronologically sorted readings.
    pub fn detect_machine(&self, machine_id: &str, series: &[&SensorReading]) -> Option<AnomalyRecord> {
        if series.len() < self.config.min_readings {
            debug!(
                machine_id = %machine_id,
                readings = series.len(),
                required = self.config.min_readings,
                "Skipping anomaly detection: insufficient readings"
            );
            return None;
        }

        let features: Vec<FeatureVector> = series.iter().map(|r| r.features()).collect();
        let scaled = StandardScaler::fit_transform(&features);
        let labels = IsolationForest::fit_predict(&scaled, &self.config);

        let anomaly_count = labels.iter().filter(|&&is_anomaly| is_anomaly).count();
        let baseline = ChannelBaseline::from_features(&features);

        // Series is ascending, so walking backwards yields most recent first
        let recent_anomalies: Vec<AnomalyEvent> = labels
            .iter()
            .enumerate()
            .rev()
            .filter(|&(_, &is_anomaly)| is_anomaly)
            .take(self.config.max_recent)
            .map(|(i, _)| baseline.describe(series[i], self.config.z_threshold))
            .collect();

        let anomaly_percentage = round_to(anomaly_count as f64 / series.len() as f64 * 100.0, 2);

        debug!(
            machine_id = %machine_id,
            readings = series.len(),
            anomaly_count,
            anomaly_percentage,
            "Anomaly detection complete"
        );

        Some(AnomalyRecord {
            has_recent_anomaly: !recent_anomalies.is_empty(),
            recent_anomalies,
            anomaly_count,
            anomaly_percentage,
        })
    }
}

/// Per-channel mean and sample std over a machine's full history.
struct ChannelBaseline {
    mean: FeatureVector,
    std: FeatureVector,
}

impl ChannelBaseline {
    fn from_features(features: &[FeatureVector]) -> Self {
        let mut mean_v = [0.0; NUM_FEATURES];
        let mut std_v = [0.0; NUM_FEATURES];
        for i in 0..NUM_FEATURES {
            let column: Vec<f64> = features.iter().map(|row| row[i]).collect();
            mean_v[i] = mean(&column);
            std_v[i] = sample_std(&column);
        }
        Self { mean: mean_v, std: std_v }
    }

    /// Absolute z-score per channel; 0 for a constant channel.
    fn z_scores(&self, x: &FeatureVector) -> FeatureVector {
        let mut z = [0.0; NUM_FEATURES];
        for i in 0..NUM_FEATURES {
            if self.std[i] > 0.0 {
                z[i] = ((x[i] - self.mean[i]) / self.std[i]).abs();
            }
        }
        z
    }

    /// Build the event for one anomalous reading.
    ///
    /// Channels with |z| > `threshold` are blamed. If none qualify, the single
    /// channel with the largest |z| is blamed instead (first one on ties), so
    /// every event names at least one sensor.
    fn describe(&self, reading: &SensorReading, threshold: f64) -> AnomalyEvent {
        let z = self.z_scores(&reading.features());

        let mut unusual_sensors: Vec<SensorChannel> = SensorChannel::ALL
            .into_iter()
            .filter(|c| z[c.index()] > threshold)
            .collect();

        if unusual_sensors.is_empty() {
            let strongest = SensorChannel::ALL
                .into_iter()
                .fold(SensorChannel::Temperature, |best, c| {
                    if z[c.index()] > z[best.index()] { c } else { best }
                });
            unusual_sensors.push(strongest);
        }

        AnomalyEvent {
            timestamp: reading.timestamp,
            unusual_sensors,
            sensor_values: ChannelValues::from(reading),
            z_scores: ChannelValues::from_array(z),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn base_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    /// Gently oscillating readings with a large vibration spike at `spike_at`.
    fn series_with_spike(machine: &str, n: usize, spike_at: Option<usize>) -> Vec<SensorReading> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                let mut vibration = 0.5 + (t * 0.9).sin() * 0.02;
                if Some(i) == spike_at {
                    vibration = 3.5;
                }
                SensorReading {
                    timestamp: base_time() + Duration::minutes(15 * i as i64),
                    machine_id: machine.to_string(),
                    temperature: 65.0 + (t * 0.5).sin(),
                    pressure: 100.0 + (t * 0.3).cos() * 2.0,
                    vibration,
                    power: 320.0 + (t * 0.7).sin() * 5.0,
                    maintenance_performed: 0,
                }
            })
            .collect()
    }

    #[test]
    fn test_nine_readings_excluded_ten_included() {
        let detector = AnomalyDetector::default();
        let nine = series_with_spike("M-9", 9, None);
        let ten = series_with_spike("M-10", 10, None);
        let mut all = nine;
        all.extend(ten);

        let result = detector.detect(&all);
        assert!(!result.contains_key("M-9"));
        assert!(result.contains_key("M-10"));
    }

    #[test]
    fn test_spike_is_flagged_and_attributed_to_vibration() {
        let readings = series_with_spike("M-1", 120, Some(115));
        let result = AnomalyDetector::default().detect(&readings);
        let record = &result["M-1"];

        // Only four readings follow the spike, so it must be among the five most recent
        let spike_ts = readings[115].timestamp;
        let event = record
            .recent_anomalies
            .iter()
            .find(|e| e.timestamp == spike_ts)
            .expect("spike should be among recent anomalies");
        assert!(event.unusual_sensors.contains(&SensorChannel::Vibration));
        assert!(event.z_scores.vibration > 2.0);
    }

    #[test]
    fn test_record_invariants() {
        let readings = series_with_spike("M-1", 200, Some(50));
        let record = AnomalyDetector::default().detect(&readings).remove("M-1").unwrap();

        assert!(record.anomaly_count <= 200);
        assert!((0.0..=100.0).contains(&record.anomaly_percentage));
        assert!(record.recent_anomalies.len() <= 5);
        assert_eq!(record.has_recent_anomaly, !record.recent_anomalies.is_empty());
        for pair in record.recent_anomalies.windows(2) {
            assert!(pair[0].timestamp >= pair[1].timestamp, "most recent first");
        }
        for event in &record.recent_anomalies {
            assert!(!event.unusual_sensors.is_empty());
        }
    }

    #[test]
    fn test_fallback_attribution_picks_largest_z() {
        let features: Vec<FeatureVector> = (0..20)
            .map(|i| [i as f64, 10.0, (i % 3) as f64, 5.0])
            .collect();
        let baseline = ChannelBaseline::from_features(&features);
        let reading = SensorReading {
            timestamp: base_time(),
            machine_id: "M-1".to_string(),
            temperature: 12.0,
            pressure: 10.0,
            vibration: 1.0,
            power: 5.0,
            maintenance_performed: 0,
        };
        // No channel exceeds a very high threshold, so the strongest one is used
        let event = baseline.describe(&reading, 100.0);
        assert_eq!(event.unusual_sensors, vec![SensorChannel::Temperature]);
        // Constant channels report z = 0
        assert_eq!(event.z_scores.pressure, 0.0);
        assert_eq!(event.z_scores.power, 0.0);
    }

    #[test]
    fn test_detection_is_repeatable_with_fixed_seed() {
        let readings = series_with_spike("M-1", 80, Some(40));
        let detector = AnomalyDetector::default();
        assert_eq!(detector.detect(&readings), detector.detect(&readings));
    }
}
