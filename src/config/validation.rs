//! Config validation: unknown-key detection with Levenshtein suggestions
//! and range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for PipelineConfig.
///
/// Maintained by hand to match the struct hierarchy in pipeline_config.rs.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [statistics]
        "statistics",
        "statistics.window",
        // [anomaly]
        "anomaly",
        "anomaly.min_readings",
        "anomaly.n_estimators",
        "anomaly.contamination",
        "anomaly.max_samples",
        "anomaly.seed",
        "anomaly.z_threshold",
        "anomaly.max_recent",
        // [prediction]
        "prediction",
        "prediction.min_readings",
        "prediction.window",
        "prediction.trend_min_points",
        "prediction.default_days_since_maintenance",
        "prediction.probability_cap",
        "prediction.seed",
        // [health]
        "health",
        "health.critical_below",
        "health.warning_below",
        // [refresh]
        "refresh",
        "refresh.decay_probability",
        "refresh.decay_min",
        "refresh.decay_max",
        "refresh.due_days_step_min",
        "refresh.due_days_step_max",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (k, levenshtein(unknown, k)))
        .filter(|&(_, dist)| dist <= 3)
        // Tie-break on the key itself so the suggestion is stable across HashSet orderings
        .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// Never fails: parse errors are reported later by serde.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Range Validation
// ============================================================================

/// Validate value ranges on a parsed PipelineConfig.
///
/// Returns (errors, warnings). Errors are values that make the pipeline
/// meaningless and must prevent startup; warnings are unusual but usable.
pub fn validate_ranges(config: &super::PipelineConfig) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if config.statistics.window == 0 {
        errors.push("statistics.window must be > 0".to_string());
    }

    let a = &config.anomaly;
    if !(a.contamination > 0.0 && a.contamination <= 0.5) {
        errors.push(format!(
            "anomaly.contamination = {:.3} must be in (0, 0.5]",
            a.contamination
        ));
    }
    if a.n_estimators == 0 {
        errors.push("anomaly.n_estimators must be > 0".to_string());
    }
    if a.max_samples < 2 {
        errors.push(format!("anomaly.max_samples = {} must be >= 2", a.max_samples));
    }
    // Standardization needs at least two points per channel
    if a.min_readings < 2 {
        errors.push(format!("anomaly.min_readings = {} must be >= 2", a.min_readings));
    }
    if a.z_threshold <= 0.0 {
        errors.push(format!("anomaly.z_threshold = {:.2} must be > 0", a.z_threshold));
    } else if !(1.0..=5.0).contains(&a.z_threshold) {
        warnings.push(ValidationWarning {
            field: "anomaly.z_threshold".to_string(),
            message: format!(
                "anomaly.z_threshold = {:.2} is outside the typical range (1-5)",
                a.z_threshold
            ),
            suggestion: None,
        });
    }
    if a.n_estimators > 1000 {
        warnings.push(ValidationWarning {
            field: "anomaly.n_estimators".to_string(),
            message: format!(
                "anomaly.n_estimators = {} will make every refresh slow",
                a.n_estimators
            ),
            suggestion: None,
        });
    }

    let p = &config.prediction;
    if p.min_readings < 2 {
        errors.push(format!("prediction.min_readings = {} must be >= 2", p.min_readings));
    }
    if p.window == 0 {
        errors.push("prediction.window must be > 0".to_string());
    }
    if p.trend_min_points < 2 {
        errors.push(format!(
            "prediction.trend_min_points = {} must be >= 2 (a slope needs two points)",
            p.trend_min_points
        ));
    }
    if !(p.probability_cap > 0.0 && p.probability_cap <= 1.0) {
        errors.push(format!(
            "prediction.probability_cap = {:.3} must be in (0, 1]",
            p.probability_cap
        ));
    }
    if p.default_days_since_maintenance < 0 {
        errors.push(format!(
            "prediction.default_days_since_maintenance = {} cannot be negative",
            p.default_days_since_maintenance
        ));
    }

    let h = &config.health;
    if h.critical_below >= h.warning_below {
        errors.push(format!(
            "health.critical_below ({:.1}) must be less than health.warning_below ({:.1})",
            h.critical_below, h.warning_below
        ));
    }
    if h.warning_below > 100.0 || h.critical_below < 0.0 {
        warnings.push(ValidationWarning {
            field: "health".to_string(),
            message: format!(
                "health thresholds {:.1}/{:.1} fall outside the 0-100 score range",
                h.critical_below, h.warning_below
            ),
            suggestion: None,
        });
    }

    let r = &config.refresh;
    if !(0.0..=1.0).contains(&r.decay_probability) {
        errors.push(format!(
            "refresh.decay_probability = {:.3} must be in [0, 1]",
            r.decay_probability
        ));
    }
    if r.decay_min < 0.0 || r.decay_min > r.decay_max {
        errors.push(format!(
            "refresh.decay_min ({:.2}) must be >= 0 and <= refresh.decay_max ({:.2})",
            r.decay_min, r.decay_max
        ));
    }
    if r.due_days_step_min > r.due_days_step_max {
        errors.push(format!(
            "refresh.due_days_step_min ({}) must be <= refresh.due_days_step_max ({})",
            r.due_days_step_min, r.due_days_step_max
        ));
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================
