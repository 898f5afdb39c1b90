//! Recommendation Engine
//!
//! Maps a failure prediction to an urgency tier, an operator message and an
//! ordered list of maintenance actions. Pure and deterministic.

use std::collections::BTreeMap;

use crate::types::{PredictionRecord, RecommendationRecord, Urgency};

/// Probability strictly above which each tier starts.
pub const IMMEDIATE_ABOVE: f64 = 0.7;
pub const SOON_ABOVE: f64 = 0.4;
pub const PLANNED_ABOVE: f64 = 0.2;

/// Urgency tier for a failure probability. Non-decreasing in `probability`.
pub fn urgency_for(probability: f64) -> Urgency {
    if probability > IMMEDIATE_ABOVE {
        Urgency::Immediate
    } else if probability > SOON_ABOVE {
        Urgency::Soon
    } else if probability > PLANNED_ABOVE {
        Urgency::Planned
    } else {
        Urgency::Normal
    }
}

/// Suggested actions for a tier, in execution order.
pub fn actions_for(urgency: Urgency) -> &'static [&'static str] {
    match urgency {
        Urgency::Immediate => &[
            "Replace bearings",
            "Check lubrication",
            "Verify alignment",
            "Inspect electrical connections",
        ],
        Urgency::Soon => &[
            "Inspect for unusual wear",
            "Check lubrication",
            "Monitor vibration levels",
        ],
        Urgency::Planned => &["Routine inspection", "Check sensor calibration"],
        Urgency::Normal => &["Continue regular monitoring"],
    }
}

fn message_for(urgency: Urgency, machine_id: &str, days_to_failure: u32) -> String {
    match urgency {
        Urgency::Immediate => format!(
            "Schedule immediate maintenance for {machine_id}. High risk of failure within {days_to_failure} days."
        ),
        Urgency::Soon => format!(
            "Plan maintenance for {machine_id} within {} days.",
            days_to_failure.saturating_sub(7).max(1)
        ),
        Urgency::Planned => format!("Include {machine_id} in next planned maintenance cycle."),
        Urgency::Normal => format!("No immediate action required for {machine_id}."),
    }
}

/// Stateless recommendation mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationEngine;

impl RecommendationEngine {
    /// Recommendation for one machine's prediction.
    pub fn recommend(&self, machine_id: &str, prediction: &PredictionRecord) -> RecommendationRecord {
        let urgency = urgency_for(prediction.failure_probability);
        RecommendationRecord {
            urgency,
            message: message_for(urgency, machine_id, prediction.days_to_failure),
            actions: actions_for(urgency).iter().map(|a| (*a).to_string()).collect(),
            estimated_downtime: prediction.estimated_downtime_hours,
            estimated_cost: prediction.estimated_cost,
        }
    }

    /// One recommendation per prediction, keyed identically.
    pub fn recommend_all(
        &self,
        predictions: &BTreeMap<String, PredictionRecord>,
    ) -> BTreeMap<String, RecommendationRecord> {
        predictions
            .iter()
            .map(|(id, prediction)| (id.clone(), self.recommend(id, prediction)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn prediction(probability: f64, days: u32) -> PredictionRecord {
        PredictionRecord {
            failure_probability: probability,
            days_to_failure: days,
            estimated_downtime_hours: 30.5,
            estimated_cost: 7200,
            confidence: 0.8,
            prediction_timestamp: NaiveDate::from_ymd_opt(2024, 6, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_tier_boundaries_are_exclusive() {
        assert_eq!(urgency_for(0.2), Urgency::Normal);
        assert_eq!(urgency_for(0.201), Urgency::Planned);
        assert_eq!(urgency_for(0.4), Urgency::Planned);
        assert_eq!(urgency_for(0.401), Urgency::Soon);
        assert_eq!(urgency_for(0.7), Urgency::Soon);
        assert_eq!(urgency_for(0.701), Urgency::Immediate);
    }

    #[test]
    fn test_urgency_is_monotonic() {
        let mut previous = Urgency::Normal;
        for i in 0..=1000 {
            let urgency = urgency_for(f64::from(i) / 1000.0);
            assert!(urgency >= previous, "urgency dropped at p = {}", f64::from(i) / 1000.0);
            previous = urgency;
        }
    }

    #[test]
    fn test_messages_and_actions() {
        let engine = RecommendationEngine;

        let r = engine.recommend("CNC-01", &prediction(0.9, 3));
        assert_eq!(r.urgency, Urgency::Immediate);
        assert_eq!(
            r.message,
            "Schedule immediate maintenance for CNC-01. High risk of failure within 3 days."
        );
        assert_eq!(r.actions.len(), 4);

        let r = engine.recommend("CNC-01", &prediction(0.5, 20));
        assert_eq!(r.message, "Plan maintenance for CNC-01 within 13 days.");
        assert_eq!(r.actions.last().map(String::as_str), Some("Monitor vibration levels"));

        let r = engine.recommend("CNC-01", &prediction(0.1, 120));
        assert_eq!(r.urgency, Urgency::Normal);
        assert_eq!(r.actions, vec!["Continue regular monitoring".to_string()]);
        assert_eq!(r.estimated_cost, 7200);
        assert!((r.estimated_downtime - 30.5).abs() < 1e-12);
    }

    #[test]
    fn test_soon_message_never_below_one_day() {
        let r = RecommendationEngine.recommend("X", &prediction(0.5, 5));
        assert_eq!(r.message, "Plan maintenance for X within 1 days.");
    }

    #[test]
    fn test_recommend_all_keeps_keys() {
        let mut predictions = BTreeMap::new();
        predictions.insert("A".to_string(), prediction(0.3, 60));
        predictions.insert("B".to_string(), prediction(0.75, 2));
        let recs = RecommendationEngine.recommend_all(&predictions);
        assert_eq!(recs.keys().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(recs["A"].urgency, Urgency::Planned);
        assert_eq!(recs["B"].urgency, Urgency::Immediate);
    }
}
