//! Pipeline Regression Tests
//!
//! Runs the full orchestrator over small synthetic fleets and asserts on the
//! end-to-end contract: coverage rules, probability bounds, urgency mapping,
//! seeded determinism and the maintenance board built on top.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::SeedableRng;
use smart_maintain::alerts::{AlertUrgency, FleetSummary, MaintenanceBoard};
use smart_maintain::config::PipelineConfig;
use smart_maintain::ingest::{load_equipment, load_sensor_readings};
use smart_maintain::{
    EquipmentRecord, FleetState, HealthStatus, HealthThresholds, MaintenancePipeline,
    PipelineError, SensorReading, Urgency,
};
use std::io::Write;

fn as_of() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 15)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn equipment(id: &str, health: f64, installed: i32, last_maintenance: &str) -> EquipmentRecord {
    EquipmentRecord {
        machine_id: id.to_string(),
        machine_type: "Injection Molder".to_string(),
        manufacturer: "Engel".to_string(),
        installation_year: installed,
        health_score: health,
        status: HealthStatus::from_score(health, &HealthThresholds::default()),
        maintenance_due_days: 21,
        location: "Plant C".to_string(),
        last_maintenance: last_maintenance.to_string(),
    }
}

/// `n` readings ending at `as_of`, 10 minutes apart.
fn readings(id: &str, n: usize, temperature: impl Fn(usize) -> f64, vibration: impl Fn(usize) -> f64) -> Vec<SensorReading> {
    (0..n)
        .map(|i| SensorReading {
            timestamp: as_of() - Duration::minutes(10 * (n - i) as i64),
            machine_id: id.to_string(),
            temperature: temperature(i),
            pressure: 100.0,
            vibration: vibration(i),
            power: 350.0,
            maintenance_performed: 0,
        })
        .collect()
}

fn seeded_pipeline(seed: u64) -> MaintenancePipeline {
    let mut config = PipelineConfig::default();
    config.prediction.seed = Some(seed);
    MaintenancePipeline::new(config)
}

/// Mixed fleet with a noisy history so the outlier model has something to do.
fn mixed_fleet() -> (Vec<SensorReading>, Vec<EquipmentRecord>) {
    let mut all = Vec::new();
    for (k, id) in ["CNC-01", "IM-02", "PK-03", "RA-04"].iter().enumerate() {
        let phase = k as f64;
        all.extend(readings(
            id,
            150,
            |i| 65.0 + ((i as f64) * 0.3 + phase).sin() * 3.0 + if i == 140 { 25.0 } else { 0.0 },
            |i| 0.4 + ((i as f64) * 0.7 + phase).cos() * 0.05,
        ));
    }
    let fleet = vec![
        equipment("CNC-01", 92.0, 2022, "2024-05-20"),
        equipment("IM-02", 78.0, 2017, "2023-11-02"),
        equipment("PK-03", 61.0, 2012, "bad date"),
        equipment("RA-04", 88.0, 2020, "2024-06-10"),
    ];
    (all, fleet)
}

// ============================================================================
// End-to-End Scenarios
// ============================================================================

#[test]
fn healthy_new_machine_stays_near_base_and_normal() {
    let data = readings("NEW", 60, |_| 65.0, |_| 0.3);
    let fleet = vec![equipment("NEW", 95.0, 2024, "2024-06-14")];

    let result = seeded_pipeline(1).run(&data, &fleet, as_of()).unwrap();
    let prediction = &result.predictions["NEW"];

    // 0.10 base + 0.001 maintenance + 0.025 health
    assert!((prediction.failure_probability - 0.126).abs() < 1e-9);
    assert_eq!(result.recommendations["NEW"].urgency, Urgency::Normal);
    assert!((90..=180).contains(&prediction.days_to_failure));
    // Constant signals: maximal consistency
    assert!((prediction.confidence - 0.95).abs() < 1e-9);
}

#[test]
fn worn_hot_machine_hits_cap_and_is_immediate() {
    let data = readings("OLD", 60, |i| if i == 30 { 95.0 } else { 72.0 }, |_| 0.3);
    let fleet = vec![equipment("OLD", 50.0, 2014, "2023-05-12")];

    let result = seeded_pipeline(1).run(&data, &fleet, as_of()).unwrap();
    let prediction = &result.predictions["OLD"];
    assert!((prediction.failure_probability - 0.95).abs() < 1e-9);
    assert!(prediction.days_to_failure <= 7);

    let recommendation = &result.recommendations["OLD"];
    assert_eq!(recommendation.urgency, Urgency::Immediate);
    assert_eq!(recommendation.actions[0], "Replace bearings");
    assert!((recommendation.estimated_downtime - prediction.estimated_downtime_hours).abs() < 1e-12);
}

#[test]
fn rising_temperature_beats_flat_temperature() {
    let mut data = readings("RISE", 50, |i| 60.0 + 30.0 * i as f64 / 49.0, |_| 0.3);
    data.extend(readings("FLAT", 50, |_| 60.0, |_| 0.3));
    let fleet = vec![
        equipment("RISE", 90.0, 2021, "2024-05-01"),
        equipment("FLAT", 90.0, 2021, "2024-05-01"),
    ];

    let result = seeded_pipeline(5).run(&data, &fleet, as_of()).unwrap();
    assert!(
        result.predictions["RISE"].failure_probability > result.predictions["FLAT"].failure_probability
    );
}

#[test]
fn nine_readings_excluded_ten_included_everywhere() {
    let mut data = readings("NINE", 9, |_| 65.0, |_| 0.3);
    data.extend(readings("TEN", 10, |_| 65.0, |_| 0.3));
    let fleet = vec![
        equipment("NINE", 90.0, 2020, "2024-06-01"),
        equipment("TEN", 90.0, 2020, "2024-06-01"),
    ];

    let result = seeded_pipeline(2).run(&data, &fleet, as_of()).unwrap();
    // Statistics has no minimum
    assert!(result.statistics.contains_key("NINE"));
    assert!(!result.anomalies.contains_key("NINE"));
    assert!(!result.predictions.contains_key("NINE"));
    assert!(!result.recommendations.contains_key("NINE"));
    assert!(result.anomalies.contains_key("TEN"));
    assert!(result.predictions.contains_key("TEN"));
}

// ============================================================================
// Contract Properties
// ============================================================================

#[test]
fn fleet_outputs_respect_bounds() {
    let (data, fleet) = mixed_fleet();
    let result = seeded_pipeline(42).run(&data, &fleet, as_of()).unwrap();

    assert_eq!(result.predictions.len(), 4);
    for (id, anomaly) in &result.anomalies {
        let total = data.iter().filter(|r| &r.machine_id == id).count();
        assert!(anomaly.anomaly_count <= total);
        assert!((0.0..=100.0).contains(&anomaly.anomaly_percentage));
        assert!(anomaly.recent_anomalies.len() <= 5);
    }
    for prediction in result.predictions.values() {
        assert!((0.0..=0.95).contains(&prediction.failure_probability));
        assert!((0.5..=0.95).contains(&prediction.confidence));
        assert_eq!(prediction.prediction_timestamp, as_of());
    }
    // Unparsable maintenance date falls back instead of dropping the machine
    assert!(result.predictions.contains_key("PK-03"));
}

#[test]
fn seeded_runs_are_identical() {
    let (data, fleet) = mixed_fleet();
    let a = seeded_pipeline(42).run(&data, &fleet, as_of()).unwrap();
    let b = seeded_pipeline(42).run(&data, &fleet, as_of()).unwrap();
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn empty_readings_are_an_error_not_an_empty_result() {
    let pipeline = MaintenancePipeline::default();
    let (_, fleet) = mixed_fleet();
    assert_eq!(
        pipeline.run(&[], &fleet, as_of()).unwrap_err(),
        PipelineError::EmptySensorData
    );
}

#[test]
fn missing_equipment_table_keeps_sensor_stages() {
    let (data, _) = mixed_fleet();
    let result = seeded_pipeline(42).run(&data, &[], as_of()).unwrap();

    assert_eq!(result.statistics.len(), 4);
    assert_eq!(result.anomalies.len(), 4);
    assert!(result.predictions.is_empty());
    assert!(result.recommendations.is_empty());

    let board = MaintenanceBoard::build(&result, as_of().date());
    assert!(board.alerts.is_empty());
    assert_eq!(FleetSummary::build(&result).total_readings, 600);
}

#[test]
fn supplied_status_labels_do_not_override_health_score() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("equipment.json");
    std::fs::write(
        &path,
        r#"[
            {"machine_id": "A", "machine_type": "CNC Mill", "installation_year": 2019,
             "health_score": 65.0, "status": "Warning"},
            {"machine_id": "B", "machine_type": "CNC Mill", "installation_year": 2019,
             "health_score": 95.0, "status": "Critical"}
        ]"#,
    )
    .unwrap();

    let fleet = load_equipment(&path, &HealthThresholds::default()).unwrap();
    let mut data = readings("A", 20, |_| 65.0, |_| 0.3);
    data.extend(readings("B", 20, |_| 65.0, |_| 0.3));
    let summary = FleetSummary::build(&seeded_pipeline(1).run(&data, &fleet, as_of()).unwrap());

    assert_eq!(summary.healthy, 1);
    assert_eq!(summary.warning, 0);
    assert_eq!(summary.critical, 1);
}

// ============================================================================
// Session State and Reporting
// ============================================================================

#[test]
fn refresh_then_process_feeds_the_board() {
    let (data, mut fleet) = mixed_fleet();
    // Registered but never reported a reading
    fleet.push(equipment("SPARE-05", 99.0, 2023, "2024-06-01"));

    let config = PipelineConfig::default();
    let mut state = FleetState::new(data, fleet);
    let mut rng = StdRng::seed_from_u64(17);
    let extra = readings("CNC-01", 5, |_| 66.0, |_| 0.41)
        .into_iter()
        .map(|mut r| {
            r.timestamp += Duration::hours(1);
            r
        })
        .collect();
    let report = state.refresh(extra, as_of(), &mut rng, &config.refresh, &config.health);
    assert_eq!(report.readings_added, 5);

    let processed = state.process(&seeded_pipeline(42), as_of()).unwrap();
    let board = MaintenanceBoard::build(&processed, as_of().date());

    assert_eq!(board.alerts.len(), 5);
    let last = board.alerts.last().unwrap();
    assert_eq!(last.machine_id, "SPARE-05");
    assert_eq!(last.urgency, AlertUrgency::Unknown);
    for pair in board.alerts.windows(2) {
        assert!(pair[0].urgency <= pair[1].urgency);
    }

    let summary = FleetSummary::build(&processed);
    assert_eq!(summary.total_machines, 5);
    assert_eq!(summary.total_readings, 605);
    assert_eq!(summary.predicted_machines, 4);
}

#[test]
fn csv_files_run_end_to_end() {
    let dir = tempfile::tempdir().unwrap();

    let sensors_path = dir.path().join("sensors.csv");
    let mut sensors = std::fs::File::create(&sensors_path).unwrap();
    writeln!(sensors, "timestamp,machine_id,temperature,pressure,vibration,power,maintenance_performed").unwrap();
    for r in readings("CNC-01", 30, |i| 64.0 + (i % 4) as f64, |i| 0.35 + (i % 3) as f64 * 0.01) {
        writeln!(
            sensors,
            "{},{},{},{},{},{},{}",
            r.timestamp.format("%Y-%m-%d %H:%M:%S"),
            r.machine_id,
            r.temperature,
            r.pressure,
            r.vibration,
            r.power,
            r.maintenance_performed
        )
        .unwrap();
    }
    drop(sensors);

    let equipment_path = dir.path().join("equipment.csv");
    std::fs::write(
        &equipment_path,
        "machine_id,machine_type,manufacturer,installation_year,health_score,maintenance_due_days,location,last_maintenance\n\
         CNC-01,CNC Mill,Haas,2019,83.5,10,Plant A,2024-04-20\n",
    )
    .unwrap();

    let data = load_sensor_readings(&sensors_path).unwrap();
    let fleet = load_equipment(&equipment_path, &HealthThresholds::default()).unwrap();
    assert_eq!(fleet[0].status, HealthStatus::Warning);

    let result = seeded_pipeline(3).run(&data, &fleet, as_of()).unwrap();
    assert_eq!(result.statistics["CNC-01"].temperature.max, 67.0);
    assert!(result.predictions.contains_key("CNC-01"));
    assert!(result.anomalies.contains_key("CNC-01"));
}
