//! Input loading for sensor readings and the equipment table.
//!
//! Both inputs may be CSV (header row, columns matched by name in any order)
//! or a JSON array of objects. The format is chosen from the file extension:
//! `.json` is JSON, anything else is CSV.
//!
//! Malformed rows are skipped with a warning; a file that yields no usable
//! row at all is an error.

mod csv;
mod json;
mod raw;

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::types::{EquipmentRecord, HealthThresholds, SensorReading};

pub use raw::{parse_timestamp, Field, RawEquipmentRecord, RawSensorReading};

/// Columns a sensor CSV must provide.
pub const SENSOR_COLUMNS: &[&str] = &[
    "timestamp",
    "machine_id",
    "temperature",
    "pressure",
    "vibration",
    "power",
];

/// Columns an equipment CSV must provide.
pub const EQUIPMENT_COLUMNS: &[&str] = &[
    "machine_id",
    "machine_type",
    "installation_year",
    "health_score",
];

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read {}: {}", .0.display(), .1)]
    Io(PathBuf, std::io::Error),

    #[error("Empty file: {}", .0.display())]
    EmptyFile(PathBuf),

    #[error("{} is missing required columns: {}", .0.display(), .1.join(", "))]
    MissingColumns(PathBuf, Vec<String>),

    #[error("Invalid JSON in {}: {}", .0.display(), .1)]
    Json(PathBuf, serde_json::Error),

    #[error("No valid rows in {} ({} malformed)", .path.display(), .errors)]
    NoValidRows { path: PathBuf, errors: usize },
}

/// Row-level parse failure. Logged and counted, never returned to callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("missing value for '{0}'")]
    Missing(&'static str),

    #[error("invalid number for '{0}': '{1}'")]
    Number(&'static str, String),

    #[error("cannot parse timestamp: '{0}'")]
    Timestamp(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Csv,
    Json,
}

impl Format {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

fn read(path: &Path) -> Result<String, IngestError> {
    std::fs::read_to_string(path).map_err(|e| IngestError::Io(path.to_path_buf(), e))
}

/// Load sensor readings from a CSV or JSON file.
pub fn load_sensor_readings(path: impl AsRef<Path>) -> Result<Vec<SensorReading>, IngestError> {
    let path = path.as_ref();
    let contents = read(path)?;
    let raw = match Format::of(path) {
        Format::Csv => csv::parse_rows::<RawSensorReading>(path, &contents, SENSOR_COLUMNS)?,
        Format::Json => json::parse_rows::<RawSensorReading>(path, &contents)?,
    };
    let readings = collect_valid(path, raw, RawSensorReading::into_reading)?;
    info!(file = %path.display(), readings = readings.len(), "Sensor readings loaded");
    Ok(readings)
}

/// Load the equipment table from a CSV or JSON file.
///
/// A missing or unrecognised `status` is derived from `health_score` with
/// `thresholds`.
pub fn load_equipment(
    path: impl AsRef<Path>,
    thresholds: &HealthThresholds,
) -> Result<Vec<EquipmentRecord>, IngestError> {
    let path = path.as_ref();
    let contents = read(path)?;
    let raw = match Format::of(path) {
        Format::Csv => csv::parse_rows::<RawEquipmentRecord>(path, &contents, EQUIPMENT_COLUMNS)?,
        Format::Json => json::parse_rows::<RawEquipmentRecord>(path, &contents)?,
    };
    let records = collect_valid(path, raw, |r| r.into_record(thresholds))?;
    info!(file = %path.display(), machines = records.len(), "Equipment table loaded");
    Ok(records)
}

/// Convert raw rows, warning about the first few failures.
fn collect_valid<R, T>(
    path: &Path,
    rows: Vec<(usize, R)>,
    convert: impl Fn(R) -> Result<T, RowError>,
) -> Result<Vec<T>, IngestError> {
    let mut records = Vec::with_capacity(rows.len());
    let mut errors = 0usize;
    for (line, row) in rows {
        match convert(row) {
            Ok(record) => records.push(record),
            Err(e) => {
                if errors < 10 {
                    warn!(file = %path.display(), line, error = %e, "Skipping malformed row");
                }
                errors += 1;
            }
        }
    }
    if records.is_empty() {
        return Err(IngestError::NoValidRows {
            path: path.to_path_buf(),
            errors,
        });
    }
    if errors > 0 {
        warn!(file = %path.display(), skipped = errors, kept = records.len(), "Malformed rows skipped");
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HealthStatus;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_sensor_csv_any_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "sensors.csv",
            "machine_id,power,timestamp,temperature,vibration,pressure,maintenance_performed\n\
             CNC-01,320.5,2024-06-01 08:00:00,65.2,0.41,101.3,0\n\
             CNC-01,321.0,2024-06-01T08:05:00,65.9,0.43,101.1,1\n\
             \n\
             CNC-02,300.0,2024-06-01T08:00:00Z,70.0,0.50,99.0,0\n",
        );
        let readings = load_sensor_readings(&path).unwrap();
        assert_eq!(readings.len(), 3);
        assert_eq!(readings[0].machine_id, "CNC-01");
        assert!((readings[0].power - 320.5).abs() < 1e-9);
        assert_eq!(readings[1].maintenance_performed, 1);
        assert_eq!(readings[2].timestamp.to_string(), "2024-06-01 08:00:00");
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "sensors.csv",
            "timestamp,machine_id,temperature,pressure,vibration,power\n\
             2024-06-01 08:00:00,M-1,65,100,0.4,300\n\
             yesterday,M-1,65,100,0.4,300\n\
             2024-06-01 08:10:00,M-1,hot,100,0.4,300\n",
        );
        assert_eq!(load_sensor_readings(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "sensors.csv", "timestamp,machine_id,temperature\n");
        match load_sensor_readings(&path) {
            Err(IngestError::MissingColumns(_, missing)) => {
                assert_eq!(missing, vec!["pressure", "vibration", "power"]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_no_valid_rows_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "sensors.csv",
            "timestamp,machine_id,temperature,pressure,vibration,power\nbad,M-1,1,2,3,4\n",
        );
        assert!(matches!(
            load_sensor_readings(&path),
            Err(IngestError::NoValidRows { errors: 1, .. })
        ));
    }

    #[test]
    fn test_equipment_json_status_follows_health_score() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "equipment.json",
            r#"[
                {"machine_id": "A", "machine_type": "CNC Mill", "manufacturer": "Haas",
                 "installation_year": 2018, "health_score": 64.5, "maintenance_due_days": 3,
                 "location": "Plant A", "last_maintenance": "2024-01-15"},
                {"machine_id": "B", "machine_type": "Robotic Arm", "installation_year": 2021,
                 "health_score": 91.0, "status": "warning"}
            ]"#,
        );
        let records = load_equipment(&path, &HealthThresholds::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].status, HealthStatus::Critical);
        // A contradicting explicit status is replaced by the derived one
        assert_eq!(records[1].status, HealthStatus::Healthy);
        assert_eq!(records[1].last_maintenance, "");
        assert_eq!(records[1].maintenance_due_days, 0);
    }

    #[test]
    fn test_equipment_csv_with_quoted_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "equipment.csv",
            "machine_id,machine_type,manufacturer,installation_year,health_score,status,maintenance_due_days,location,last_maintenance\n\
             PK-1,Packaging Unit,\"Bosch, GmbH\",2016,77.0,Warning,12,\"Hall 3, Bay 2\",2024-02-02\n",
        );
        let records = load_equipment(&path, &HealthThresholds::default()).unwrap();
        assert_eq!(records[0].manufacturer, "Bosch, GmbH");
        assert_eq!(records[0].location, "Hall 3, Bay 2");
        assert_eq!(records[0].maintenance_due_days, 12);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "sensors.json", "{ not json");
        assert!(matches!(load_sensor_readings(&path), Err(IngestError::Json(..))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            load_sensor_readings("/definitely/not/here.csv"),
            Err(IngestError::Io(..))
        ));
    }
}
