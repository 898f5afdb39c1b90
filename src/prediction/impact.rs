//! Downtime and repair-cost estimate for a predicted failure.

use serde::{Deserialize, Serialize};

/// Base downtime (hours) and repair cost (USD) for one machine type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactBase {
    pub downtime_hours: f64,
    pub cost: f64,
}

const fn base(downtime_hours: f64, cost: f64) -> ImpactBase {
    ImpactBase { downtime_hours, cost }
}

/// Fallback for machine types not in the table.
pub const DEFAULT_IMPACT: ImpactBase = base(24.0, 6000.0);

const IMPACT_TABLE: &[(&str, ImpactBase)] = &[
    ("CNC Mill", base(24.0, 5000.0)),
    ("Injection Molder", base(36.0, 8000.0)),
    ("Robotic Arm", base(16.0, 4000.0)),
    ("Assembly Line", base(48.0, 12000.0)),
    ("Packaging Unit", base(12.0, 3000.0)),
];

/// Look up the base impact by exact machine type name.
pub fn base_impact(machine_type: &str) -> ImpactBase {
    IMPACT_TABLE
        .iter()
        .find(|(name, _)| *name == machine_type)
        .map_or(DEFAULT_IMPACT, |(_, impact)| *impact)
}

/// Scaled impact estimate, unrounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactEstimate {
    pub downtime_hours: f64,
    pub cost: f64,
}

/// Scale the base impact by machine age and failure severity.
///
/// Machines older than three years take 10% longer per extra year; a higher
/// failure probability means a more severe failure (`1 + p`).
pub fn estimate_impact(machine_type: &str, machine_age: i32, failure_probability: f64) -> ImpactEstimate {
    let ImpactBase { downtime_hours, cost } = base_impact(machine_type);
    let age_factor = 1.0 + f64::from((machine_age - 3).max(0)) * 0.1;
    let severity_factor = 1.0 + failure_probability.clamp(0.0, 1.0);
    let factor = age_factor * severity_factor;

    ImpactEstimate {
        downtime_hours: downtime_hours * factor,
        cost: cost * factor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_and_unknown_types() {
        assert_eq!(base_impact("Assembly Line"), base(48.0, 12000.0));
        assert_eq!(base_impact("Laser Cutter"), DEFAULT_IMPACT);
        // Lookup is exact
        assert_eq!(base_impact("cnc mill"), DEFAULT_IMPACT);
    }

    #[test]
    fn test_young_machine_only_severity_scales() {
        let e = estimate_impact("Robotic Arm", 2, 0.5);
        assert!((e.downtime_hours - 24.0).abs() < 1e-9);
        assert!((e.cost - 6000.0).abs() < 1e-9);
    }

    #[test]
    fn test_age_factor_above_three_years() {
        // age 8: 1 + 5 * 0.1 = 1.5; p = 0: severity 1
        let e = estimate_impact("CNC Mill", 8, 0.0);
        assert!((e.downtime_hours - 36.0).abs() < 1e-9);
        assert!((e.cost - 7500.0).abs() < 1e-9);
    }
}
