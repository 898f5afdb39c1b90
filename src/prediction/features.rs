//! Feature engineering for the failure predictor.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PredictionConfig;
use crate::statistics::{linear_slope, mean, sample_std, tail};
use crate::types::{EquipmentRecord, SensorChannel, SensorReading};

/// Date format of `EquipmentRecord::last_maintenance`.
pub const MAINTENANCE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Engineered features for one machine at one reference time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FailureFeatures {
    /// Whole years in service, never negative
    pub machine_age: i32,
    pub installation_year: i32,
    /// Never negative; the configured default when the date is unparsable
    pub days_since_maintenance: i64,
    pub health_score: f64,

    pub avg_temperature: f64,
    pub max_temperature: f64,
    pub temperature_std: f64,
    /// °C per reading
    pub temperature_trend: f64,

    pub avg_vibration: f64,
    pub max_vibration: f64,
    pub vibration_std: f64,
    /// mm/s per reading
    pub vibration_trend: f64,

    pub avg_pressure: f64,
    pub pressure_std: f64,
    pub avg_power: f64,
    pub power_std: f64,
}

impl FailureFeatures {
    /// Build features from a machine's chronologically sorted readings.
    ///
    /// Only the last `config.window` readings are used. Trends are 0 when the
    /// window holds fewer than `config.trend_min_points` readings.
    pub fn extract(
        series: &[&SensorReading],
        equipment: &EquipmentRecord,
        as_of: NaiveDateTime,
        config: &PredictionConfig,
    ) -> Self {
        let recent = tail(series, config.window);
        let column = |channel: SensorChannel| -> Vec<f64> {
            recent.iter().map(|r| r.channel(channel)).collect()
        };
        let temperature = column(SensorChannel::Temperature);
        let vibration = column(SensorChannel::Vibration);
        let pressure = column(SensorChannel::Pressure);
        let power = column(SensorChannel::Power);

        let trend = |values: &[f64]| {
            if values.len() >= config.trend_min_points {
                linear_slope(values)
            } else {
                0.0
            }
        };

        Self {
            machine_age: machine_age(equipment.installation_year, as_of.date()),
            installation_year: equipment.installation_year,
            days_since_maintenance: days_since_maintenance(
                &equipment.last_maintenance,
                as_of.date(),
                config.default_days_since_maintenance,
            ),
            health_score: equipment.health_score,

            avg_temperature: mean(&temperature),
            max_temperature: max_of(&temperature),
            temperature_std: sample_std(&temperature),
            temperature_trend: trend(&temperature),

            avg_vibration: mean(&vibration),
            max_vibration: max_of(&vibration),
            vibration_std: sample_std(&vibration),
            vibration_trend: trend(&vibration),

            avg_pressure: mean(&pressure),
            pressure_std: sample_std(&pressure),
            avg_power: mean(&power),
            power_std: sample_std(&power),
        }
    }
}

/// Years between installation and `as_of`, clamped at 0.
pub fn machine_age(installation_year: i32, as_of: NaiveDate) -> i32 {
    (as_of.year() - installation_year).max(0)
}

/// Days between `last_maintenance` and `as_of`, clamped at 0.
///
/// An unparsable date yields `default_days` (soft error, logged at debug).
pub fn days_since_maintenance(last_maintenance: &str, as_of: NaiveDate, default_days: i64) -> i64 {
    match NaiveDate::parse_from_str(last_maintenance.trim(), MAINTENANCE_DATE_FORMAT) {
        Ok(date) => (as_of - date).num_days().max(0),
        Err(e) => {
            debug!(
                last_maintenance = %last_maintenance,
                error = %e,
                default_days,
                "Unparsable maintenance date, using default"
            );
            default_days.max(0)
        }
    }
}

fn max_of(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}
