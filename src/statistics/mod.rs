//! Statistics Aggregator
//!
//! Reduces each machine's recent sensor history to current/mean/min/max/std
//! per channel. The result feeds the dashboard directly and is the cheapest
//! stage of the pipeline.
//!
//! Also hosts the small numeric helpers shared by the later stages (grouping
//! readings per machine, guarded std, least-squares slope) so every stage
//! agrees on the same estimators.

use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::StatisticsConfig;
use crate::types::{ChannelStats, MachineStatistics, SensorChannel, SensorReading};

/// Group readings by machine, each group sorted by timestamp.
///
/// The sort is stable, so readings sharing a timestamp keep insertion order.
pub fn group_by_machine(readings: &[SensorReading]) -> BTreeMap<&str, Vec<&SensorReading>> {
    let mut groups: BTreeMap<&str, Vec<&SensorReading>> = BTreeMap::new();
    for reading in readings {
        groups.entry(reading.machine_id.as_str()).or_default().push(reading);
    }
    for series in groups.values_mut() {
        series.sort_by_key(|r| r.timestamp);
    }
    groups
}

/// The last `window` elements of a chronologically sorted series.
pub fn tail<'a, T>(series: &'a [T], window: usize) -> &'a [T] {
    &series[series.len().saturating_sub(window)..]
}

/// Sample standard deviation (n-1). Zero for fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let std = values.iter().std_dev();
    if std.is_finite() { std } else { 0.0 }
}

/// Population standard deviation (n). Zero for an empty slice.
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let std = values.iter().population_std_dev();
    if std.is_finite() { std } else { 0.0 }
}

/// Arithmetic mean. Zero for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().mean()
}

/// Least-squares slope of `values` against their index (0, 1, 2, ...).
///
/// Returns 0 for fewer than two points or a degenerate fit.
pub fn linear_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(values);

    let (num, den) = values.iter().enumerate().fold((0.0, 0.0), |(num, den), (i, &y)| {
        let dx = i as f64 - x_mean;
        (num + dx * (y - y_mean), den + dx * dx)
    });

    if den == 0.0 || !num.is_finite() {
        0.0
    } else {
        num / den
    }
}

/// Round to a fixed number of decimal places for reporting.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Summarise one channel. `None` for an empty series.
pub fn channel_stats(values: &[f64]) -> Option<ChannelStats> {
    let current = *values.last()?;
    Some(ChannelStats {
        current,
        mean: mean(values),
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        std: sample_std(values),
    })
}

/// Per-machine rolling-window channel summaries.
#[derive(Debug, Clone)]
pub struct StatisticsAggregator {
    window: usize,
}

impl StatisticsAggregator {
    pub fn new(config: &StatisticsConfig) -> Self {
        Self { window: config.window.max(1) }
    }

    /// Summarise one machine's chronologically sorted readings.
    ///
    /// Returns `None` when there are no readings.
    pub fn summarize(&self, series: &[&SensorReading]) -> Option<MachineStatistics> {
        let recent = tail(series, self.window);
        if recent.is_empty() {
            return None;
        }

        let mut stats = MachineStatistics::default();
        for channel in SensorChannel::ALL {
            let values: Vec<f64> = recent.iter().map(|r| r.channel(channel)).collect();
            *stats.channel_mut(channel) = channel_stats(&values)?;
        }
        Some(stats)
    }

    /// Summarise every machine present in `readings`.
    ///
    /// Machines without readings simply do not appear in the map.
    pub fn aggregate(&self, readings: &[SensorReading]) -> BTreeMap<String, MachineStatistics> {
        let groups = group_by_machine(readings);
        let stats: BTreeMap<String, MachineStatistics> = groups
            .iter()
            .filter_map(|(id, series)| self.summarize(series).map(|s| ((*id).to_string(), s)))
            .collect();
        debug!(machines = stats.len(), window = self.window, "Statistics aggregated");
        stats
    }
}

impl Default for StatisticsAggregator {
    fn default() -> Self {
        Self::new(&StatisticsConfig::default())
    }
}
