//! Loosely typed rows shared by the CSV and JSON readers.
//!
//! Every field is optional and may arrive as a number or a string; the
//! conversion to the strict record types happens in one place.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::warn;

use super::RowError;
use crate::types::{EquipmentRecord, HealthStatus, HealthThresholds, SensorReading};

/// A cell value: JSON numbers stay numbers, CSV cells are always text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Field {
    Number(f64),
    Text(String),
}

/// Build a raw row from named cells.
pub(crate) trait FromColumns: Sized {
    fn from_columns(cell: impl Fn(&str) -> Option<Field>) -> Self;
}

fn text(field: Option<Field>) -> Option<String> {
    match field? {
        Field::Number(n) => Some(n.to_string()),
        Field::Text(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
    }
}

fn required_text(field: Option<Field>, name: &'static str) -> Result<String, RowError> {
    text(field).ok_or(RowError::Missing(name))
}

fn number(field: Option<Field>, name: &'static str) -> Result<f64, RowError> {
    let value = match field.ok_or(RowError::Missing(name))? {
        Field::Number(n) => n,
        Field::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Err(RowError::Missing(name));
            }
            s.parse::<f64>().map_err(|_| RowError::Number(name, s.to_string()))?
        }
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RowError::Number(name, value.to_string()))
    }
}

/// A whole number within `[min, max]`.
fn integer(field: Option<Field>, name: &'static str, min: f64, max: f64) -> Result<f64, RowError> {
    let value = number(field, name)?;
    if value.fract() == 0.0 && (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(RowError::Number(name, value.to_string()))
    }
}

/// Parse the timestamp forms seen in sensor exports.
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` (both with optional
/// fractional seconds), RFC 3339 with an offset (converted to UTC) and a bare
/// `YYYY-MM-DD` (midnight).
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim().trim_matches('"');
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.naive_utc());
    }

    for fmt in &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

// ============================================================================
// Sensor Readings
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSensorReading {
    pub timestamp: Option<Field>,
    pub machine_id: Option<Field>,
    pub temperature: Option<Field>,
    pub pressure: Option<Field>,
    pub vibration: Option<Field>,
    pub power: Option<Field>,
    pub maintenance_performed: Option<Field>,
}

impl FromColumns for RawSensorReading {
    fn from_columns(cell: impl Fn(&str) -> Option<Field>) -> Self {
        Self {
            timestamp: cell("timestamp"),
            machine_id: cell("machine_id"),
            temperature: cell("temperature"),
            pressure: cell("pressure"),
            vibration: cell("vibration"),
            power: cell("power"),
            maintenance_performed: cell("maintenance_performed"),
        }
    }
}

impl RawSensorReading {
    pub fn into_reading(self) -> Result<SensorReading, RowError> {
        let raw_ts = required_text(self.timestamp, "timestamp")?;
        let timestamp = parse_timestamp(&raw_ts).ok_or(RowError::Timestamp(raw_ts))?;

        // Any non-zero flag counts as a maintenance event
        let maintenance_performed = match self.maintenance_performed {
            None => 0,
            Some(field) => match number(Some(field), "maintenance_performed") {
                Ok(v) => u8::from(v != 0.0),
                Err(RowError::Missing(_)) => 0,
                Err(e) => return Err(e),
            },
        };

        Ok(SensorReading {
            timestamp,
            machine_id: required_text(self.machine_id, "machine_id")?,
            temperature: number(self.temperature, "temperature")?,
            pressure: number(self.pressure, "pressure")?,
            vibration: number(self.vibration, "vibration")?,
            power: number(self.power, "power")?,
            maintenance_performed,
        })
    }
}

// ============================================================================
// Equipment Records
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawEquipmentRecord {
    pub machine_id: Option<Field>,
    pub machine_type: Option<Field>,
    pub manufacturer: Option<Field>,
    pub installation_year: Option<Field>,
    pub health_score: Option<Field>,
    pub status: Option<Field>,
    pub maintenance_due_days: Option<Field>,
    pub location: Option<Field>,
    pub last_maintenance: Option<Field>,
}

impl FromColumns for RawEquipmentRecord {
    fn from_columns(cell: impl Fn(&str) -> Option<Field>) -> Self {
        Self {
            machine_id: cell("machine_id"),
            machine_type: cell("machine_type"),
            manufacturer: cell("manufacturer"),
            installation_year: cell("installation_year"),
            health_score: cell("health_score"),
            status: cell("status"),
            maintenance_due_days: cell("maintenance_due_days"),
            location: cell("location"),
            last_maintenance: cell("last_maintenance"),
        }
    }
}

impl RawEquipmentRecord {
    /// Convert to a record.
    ///
    /// `status` is always derived from `health_score` with `thresholds`. A
    /// supplied status that disagrees is logged and replaced.
    pub fn into_record(self, thresholds: &HealthThresholds) -> Result<EquipmentRecord, RowError> {
        let machine_id = required_text(self.machine_id, "machine_id")?;
        let health_score = number(self.health_score, "health_score")?;
        let status = HealthStatus::from_score(health_score, thresholds);
        if let Some(given) = text(self.status) {
            if given.parse::<HealthStatus>().ok() != Some(status) {
                warn!(
                    machine_id = %machine_id,
                    health_score,
                    given = %given,
                    derived = %status,
                    "Supplied status disagrees with health score; using derived status"
                );
            }
        }
        let maintenance_due_days = match self.maintenance_due_days {
            None => 0,
            Some(field) => integer(Some(field), "maintenance_due_days", 0.0, f64::from(u32::MAX))? as u32,
        };

        Ok(EquipmentRecord {
            machine_id,
            machine_type: required_text(self.machine_type, "machine_type")?,
            manufacturer: text(self.manufacturer).unwrap_or_default(),
            installation_year: integer(self.installation_year, "installation_year", 1900.0, 2200.0)? as i32,
            health_score,
            status,
            maintenance_due_days,
            location: text(self.location).unwrap_or_default(),
            last_maintenance: text(self.last_maintenance).unwrap_or_default(),
        })
    }
}
