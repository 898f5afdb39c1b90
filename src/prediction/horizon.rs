//! Days-to-failure estimate from a failure probability.
//!
//! The probability picks a bucket and the horizon is drawn uniformly inside
//! it. The random source is injected so a seeded run is reproducible.

use rand::Rng;
use std::ops::RangeInclusive;

/// Lower probability bound (inclusive) → days range, most severe first.
const BUCKETS: [(f64, RangeInclusive<u32>); 5] = [
    (0.8, 0..=7),
    (0.6, 7..=14),
    (0.4, 14..=30),
    (0.2, 30..=90),
    (f64::NEG_INFINITY, 90..=180),
];

/// Days range for a probability.
///
/// | probability | days |
/// |---|---|
/// | < 0.2 | 90–180 |
/// | 0.2–0.4 | 30–90 |
/// | 0.4–0.6 | 14–30 |
/// | 0.6–0.8 | 7–14 |
/// | ≥ 0.8 | 0–7 |
///
/// A NaN probability falls through to the lowest-risk bucket.
pub fn days_range(probability: f64) -> RangeInclusive<u32> {
    BUCKETS
        .iter()
        .find(|(lower, _)| probability >= *lower)
        .map_or(90..=180, |(_, days)| days.clone())
}

/// Draw a days-to-failure value uniformly from the probability's bucket.
pub fn sample_days_to_failure<R: Rng + ?Sized>(probability: f64, rng: &mut R) -> u32 {
    rng.gen_range(days_range(probability))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(days_range(0.0), 90..=180);
        assert_eq!(days_range(0.19), 90..=180);
        assert_eq!(days_range(0.2), 30..=90);
        assert_eq!(days_range(0.4), 14..=30);
        assert_eq!(days_range(0.6), 7..=14);
        assert_eq!(days_range(0.8), 0..=7);
        assert_eq!(days_range(0.95), 0..=7);
        assert_eq!(days_range(f64::NAN), 90..=180);
    }

    #[test]
    fn test_samples_stay_in_bucket() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            assert!((90..=180).contains(&sample_days_to_failure(0.19, &mut rng)));
            assert!((0..=7).contains(&sample_days_to_failure(0.8, &mut rng)));
        }
    }

    #[test]
    fn test_seeded_draws_repeat() {
        let draw = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..10).map(|_| sample_days_to_failure(0.5, &mut rng)).collect::<Vec<_>>()
        };
        assert_eq!(draw(11), draw(11));
    }
}
