//! Prediction confidence from data volume and signal consistency.

/// Lower and upper confidence bounds.
pub const MIN_CONFIDENCE: f64 = 0.5;
pub const MAX_CONFIDENCE: f64 = 0.95;

/// `0.5 + min(0.5, n/1000) + 0.3 (1 - min(1, temp_std/10)) + 0.2 (1 - min(1, vib_std/0.5))`,
/// clamped to [0.5, 0.95].
///
/// A non-finite or negative std is treated as maximal variance, so the result
/// is always finite.
pub fn prediction_confidence(n_readings: usize, temperature_std: f64, vibration_std: f64) -> f64 {
    let data_factor = (n_readings as f64 / 1000.0).min(0.5);
    let consistency = 0.3 * (1.0 - normalized_spread(temperature_std, 10.0))
        + 0.2 * (1.0 - normalized_spread(vibration_std, 0.5));

    (MIN_CONFIDENCE + data_factor + consistency).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}

/// `std / scale` in [0, 1]; 1 for unusable input.
fn normalized_spread(std: f64, scale: f64) -> f64 {
    if std.is_finite() && std >= 0.0 {
        (std / scale).min(1.0)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_variance_is_capped() {
        assert!((prediction_confidence(10, 0.0, 0.0) - 0.95).abs() < 1e-12);
    }

    #[test]
    fn test_noisy_sparse_data_hits_floor() {
        assert!((prediction_confidence(10, 50.0, 5.0) - 0.51).abs() < 1e-12);
        assert!((prediction_confidence(0, 50.0, 5.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_std_is_guarded() {
        for std in [f64::NAN, f64::INFINITY, -1.0] {
            let c = prediction_confidence(100, std, std);
            assert!(c.is_finite());
            assert!((MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&c));
        }
    }

    #[test]
    fn test_more_data_raises_confidence() {
        assert!(prediction_confidence(400, 6.0, 0.4) > prediction_confidence(20, 6.0, 0.4));
    }
}
