//! Anomaly Detector
//!
//! Unsupervised outlier detection over each machine's multi-sensor history.
//!
//! ## Pipeline (per machine)
//! 1. Skip machines with fewer than `min_readings` readings
//! 2. Standardize the 4-channel feature vectors over the machine's own history
//! 3. Fit an isolation forest (`n_estimators` trees, `contamination` outlier
//!    fraction, fixed `seed`)
//! 4. Label every reading anomaly / normal
//! 5. Keep the `max_recent` most recent anomalies
//! 6. Attribute each to the channels with |z| > `z_threshold`, falling back to
//!    the single strongest channel
//!
//! ## Architecture
//! - `scaler`: batch zero-mean / unit-variance standardization
//! - `isolation_forest`: the seeded outlier model
//! - `detector`: per-machine orchestration and sensor attribution

pub mod scaler;
pub mod isolation_forest;
pub mod detector;

pub use detector::AnomalyDetector;
pub use isolation_forest::IsolationForest;
pub use scaler::{FeatureVector, StandardScaler, NUM_FEATURES};
