//! Fleet session state.
//!
//! The readings and equipment table that persist between refreshes. The
//! pipeline never touches this directly: the caller refreshes the state,
//! then hands a snapshot to `MaintenancePipeline::run`.

use chrono::NaiveDateTime;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{MaintenancePipeline, PipelineError};
use crate::config::RefreshConfig;
use crate::statistics::round_to;
use crate::types::{EquipmentRecord, HealthThresholds, ProcessedData, SensorReading};

/// Long-lived fleet data owned by the caller's session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FleetState {
    /// Append-only reading history
    pub sensor_data: Vec<SensorReading>,

    /// One record per machine, mutated on refresh
    pub equipment: Vec<EquipmentRecord>,

    /// Reference time of the latest refresh
    pub last_update: Option<NaiveDateTime>,

    /// Refreshes applied so far
    pub refresh_count: u64,
}

/// What one refresh changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefreshReport {
    pub readings_added: usize,
    /// Machines whose health score decayed
    pub decayed: Vec<String>,
    /// Machines whose status changed as a result
    pub status_changes: Vec<String>,
}

impl FleetState {
    pub fn new(sensor_data: Vec<SensorReading>, equipment: Vec<EquipmentRecord>) -> Self {
        Self {
            sensor_data,
            equipment,
            last_update: None,
            refresh_count: 0,
        }
    }

    /// Append new readings and apply one round of simulated health decay.
    ///
    /// Each machine decays with probability `decay_probability` by
    /// U(`decay_min`, `decay_max`), floored at 0 and rounded to 0.1. Its
    /// status is recomputed from the new score, and a score below the
    /// critical cutoff also pulls `maintenance_due_days` forward by
    /// U{`due_days_step_min`..=`due_days_step_max`} (floor 0).
    pub fn refresh<R: Rng + ?Sized>(
        &mut self,
        new_readings: Vec<SensorReading>,
        as_of: NaiveDateTime,
        rng: &mut R,
        config: &RefreshConfig,
        thresholds: &HealthThresholds,
    ) -> RefreshReport {
        let mut report = RefreshReport {
            readings_added: new_readings.len(),
            ..RefreshReport::default()
        };
        self.sensor_data.extend(new_readings);

        let decay_probability = finite_or_zero(config.decay_probability).clamp(0.0, 1.0);
        let decay_min = finite_or_zero(config.decay_min).max(0.0);
        let decay_max = finite_or_zero(config.decay_max);
        for record in &mut self.equipment {
            if !rng.gen_bool(decay_probability) {
                continue;
            }

            let decrease = if decay_max > decay_min {
                rng.gen_range(decay_min..=decay_max)
            } else {
                decay_min
            };
            let previous = record.status;
            record.health_score = round_to((record.health_score - decrease).max(0.0), 1);
            record.reclassify(thresholds);

            if record.health_score < thresholds.critical_below {
                let max_step = config.due_days_step_max.max(config.due_days_step_min);
                let step = rng.gen_range(config.due_days_step_min..=max_step);
                record.maintenance_due_days = record.maintenance_due_days.saturating_sub(step);
            }

            debug!(
                machine_id = %record.machine_id,
                health_score = record.health_score,
                status = %record.status,
                due_days = record.maintenance_due_days,
                "Health decayed"
            );
            if record.status != previous {
                report.status_changes.push(record.machine_id.clone());
            }
            report.decayed.push(record.machine_id.clone());
        }

        self.last_update = Some(as_of);
        self.refresh_count += 1;

        info!(
            refresh = self.refresh_count,
            readings_added = report.readings_added,
            total_readings = self.sensor_data.len(),
            decayed = report.decayed.len(),
            status_changes = report.status_changes.len(),
            "Fleet state refreshed"
        );
        report
    }

    /// Run the pipeline over the current snapshot.
    pub fn process(
        &self,
        pipeline: &MaintenancePipeline,
        as_of: NaiveDateTime,
    ) -> Result<ProcessedData, PipelineError> {
        pipeline.run(&self.sensor_data, &self.equipment, as_of)
    }
}

/// Config built in code skips file validation; NaN or infinite values must
/// not reach `gen_bool`/`gen_range`, which panic on them.
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
