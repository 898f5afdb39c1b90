//! Maintenance board and fleet summary.
//!
//! Read-only views over a `ProcessedData`. Every equipment record gets a row,
//! including machines the pipeline could not predict (shown as `Unknown`).

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{HealthStatus, ProcessedData, Urgency};

/// Message for machines without a prediction.
pub const INSUFFICIENT_DATA_MESSAGE: &str = "Insufficient data for recommendation";

/// Urgency as shown on the board, with a slot for unpredicted machines.
///
/// Variants are declared in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlertUrgency {
    Immediate,
    Soon,
    Planned,
    Normal,
    Unknown,
}

impl From<Urgency> for AlertUrgency {
    fn from(urgency: Urgency) -> Self {
        match urgency {
            Urgency::Immediate => Self::Immediate,
            Urgency::Soon => Self::Soon,
            Urgency::Planned => Self::Planned,
            Urgency::Normal => Self::Normal,
        }
    }
}

impl std::fmt::Display for AlertUrgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Immediate => "Immediate",
            Self::Soon => "Soon",
            Self::Planned => "Planned",
            Self::Normal => "Normal",
            Self::Unknown => "Unknown",
        };
        write!(f, "{s}")
    }
}

/// One machine row on the maintenance board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceAlert {
    pub machine_id: String,
    pub machine_type: String,
    pub location: String,
    pub health_score: f64,
    pub status: HealthStatus,
    pub maintenance_due_days: u32,
    pub last_maintenance: String,
    pub urgency: AlertUrgency,
    pub message: String,
    pub failure_probability: Option<f64>,
    pub days_to_failure: Option<u32>,
    /// Reference date + days to failure
    pub scheduled_date: Option<NaiveDate>,
    pub actions: Vec<String>,
    pub estimated_downtime: Option<f64>,
    pub estimated_cost: Option<u64>,
}

/// All machines, most urgent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceBoard {
    pub alerts: Vec<MaintenanceAlert>,
    pub counts: BTreeMap<AlertUrgency, usize>,
}

impl MaintenanceBoard {
    /// Build the board. `today` anchors `scheduled_date`.
    ///
    /// Rows are ordered Immediate → Soon → Planned → Normal → Unknown, then by
    /// machine id.
    pub fn build(data: &ProcessedData, today: NaiveDate) -> Self {
        let mut alerts: Vec<MaintenanceAlert> = data
            .equipment_data
            .iter()
            .map(|machine| {
                let id = machine.machine_id.as_str();
                let prediction = data.predictions.get(id);
                let recommendation = data.recommendations.get(id);

                let mut alert = MaintenanceAlert {
                    machine_id: machine.machine_id.clone(),
                    machine_type: machine.machine_type.clone(),
                    location: machine.location.clone(),
                    health_score: machine.health_score,
                    status: machine.status,
                    maintenance_due_days: machine.maintenance_due_days,
                    last_maintenance: machine.last_maintenance.clone(),
                    urgency: AlertUrgency::Unknown,
                    message: INSUFFICIENT_DATA_MESSAGE.to_string(),
                    failure_probability: None,
                    days_to_failure: None,
                    scheduled_date: None,
                    actions: Vec::new(),
                    estimated_downtime: None,
                    estimated_cost: None,
                };

                if let (Some(p), Some(r)) = (prediction, recommendation) {
                    alert.urgency = r.urgency.into();
                    alert.message = r.message.clone();
                    alert.failure_probability = Some(p.failure_probability);
                    alert.days_to_failure = Some(p.days_to_failure);
                    alert.scheduled_date = today.checked_add_signed(Duration::days(i64::from(p.days_to_failure)));
                    alert.actions = r.actions.clone();
                    alert.estimated_downtime = Some(r.estimated_downtime);
                    alert.estimated_cost = Some(r.estimated_cost);
                }
                alert
            })
            .collect();

        alerts.sort_by(|a, b| a.urgency.cmp(&b.urgency).then_with(|| a.machine_id.cmp(&b.machine_id)));

        let mut counts = BTreeMap::new();
        for alert in &alerts {
            *counts.entry(alert.urgency).or_insert(0) += 1;
        }

        Self { alerts, counts }
    }

    pub fn count(&self, urgency: AlertUrgency) -> usize {
        self.counts.get(&urgency).copied().unwrap_or(0)
    }

    /// Rows that need action (Immediate or Soon).
    pub fn actionable(&self) -> impl Iterator<Item = &MaintenanceAlert> {
        self.alerts
            .iter()
            .filter(|a| matches!(a.urgency, AlertUrgency::Immediate | AlertUrgency::Soon))
    }
}

/// Fleet-level headline numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetSummary {
    pub total_machines: usize,
    pub healthy: usize,
    pub warning: usize,
    pub critical: usize,
    /// 0 for an empty fleet
    pub average_health_score: f64,
    pub machines_with_recent_anomalies: usize,
    pub total_readings: usize,
    pub predicted_machines: usize,
}

impl FleetSummary {
    pub fn build(data: &ProcessedData) -> Self {
        let equipment = &data.equipment_data;
        let count_status = |status: HealthStatus| equipment.iter().filter(|e| e.status == status).count();

        let average_health_score = if equipment.is_empty() {
            0.0
        } else {
            equipment.iter().map(|e| e.health_score).sum::<f64>() / equipment.len() as f64
        };

        Self {
            total_machines: equipment.len(),
            healthy: count_status(HealthStatus::Healthy),
            warning: count_status(HealthStatus::Warning),
            critical: count_status(HealthStatus::Critical),
            average_health_score,
            machines_with_recent_anomalies: data
                .anomalies
                .values()
                .filter(|a| a.has_recent_anomaly)
                .count(),
            total_readings: data.sensor_data.len(),
            predicted_machines: data.predictions.len(),
        }
    }
}
