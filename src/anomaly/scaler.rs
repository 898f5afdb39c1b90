//! Batch feature standardization.
//!
//! Each sensor channel is scaled independently to zero mean and unit
//! variance over one machine's own history, so machines with different
//! baselines never contaminate each other's scale.

use crate::statistics::{mean, population_std};
use crate::types::SensorChannel;

/// Number of model input features (one per sensor channel).
pub const NUM_FEATURES: usize = SensorChannel::COUNT;

/// Feature vector in `SensorChannel::ALL` order.
pub type FeatureVector = [f64; NUM_FEATURES];

/// Per-channel mean / scale fitted on a batch of feature vectors.
///
/// Uses the population standard deviation. A constant channel keeps a
/// scale of 1.0 so it standardizes to all zeros instead of NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: FeatureVector,
    scale: FeatureVector,
}

impl StandardScaler {
    pub fn fit(data: &[FeatureVector]) -> Self {
        let mut mean_v = [0.0; NUM_FEATURES];
        let mut scale = [1.0; NUM_FEATURES];

        for i in 0..NUM_FEATURES {
            let column: Vec<f64> = data.iter().map(|row| row[i]).collect();
            mean_v[i] = mean(&column);
            let std = population_std(&column);
            if std > 0.0 {
                scale[i] = std;
            }
        }

        Self { mean: mean_v, scale }
    }

    pub fn transform(&self, row: &FeatureVector) -> FeatureVector {
        let mut out = [0.0; NUM_FEATURES];
        for i in 0..NUM_FEATURES {
            out[i] = (row[i] - self.mean[i]) / self.scale[i];
        }
        out
    }

    pub fn fit_transform(data: &[FeatureVector]) -> Vec<FeatureVector> {
        let scaler = Self::fit(data);
        data.iter().map(|row| scaler.transform(row)).collect()
    }
}
